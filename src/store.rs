//! The external store: parameters, entities, constraints and groups, owned
//! by the caller and borrowed by a solve.
//!
//! Per the "no global mutable state" design note, the solver never reaches
//! for a process-wide singleton. Everything it needs — parameter values,
//! entity definitions, constraint definitions, group membership, and which
//! point/circle/normal (if any) is currently being dragged — comes in
//! through this trait, so tests can build independent stores and run solves
//! in parallel without interference.

use crate::constraints::ConstraintEntry;
use crate::entity::Entity;
use crate::id::{ConstraintId, EntityId, GroupId, ParamId};

/// A hint about which entity the user is interactively moving, if any. The
/// numerical solver gives dragged parameters a smaller least-squares column
/// scale so that large, intentional motions aren't fought by the rest of the
/// system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dragged {
    entity: Option<EntityId>,
}

impl Dragged {
    /// Nothing is being dragged.
    pub fn none() -> Self {
        Self { entity: None }
    }

    /// `entity` (a point, circle, or normal) is being dragged.
    pub fn of(entity: EntityId) -> Self {
        Self {
            entity: Some(entity),
        }
    }

    pub(crate) fn entity(&self) -> Option<EntityId> {
        self.entity
    }
}

/// Everything the solver needs to read from, and write parameter values
/// back to, for one solve call.
pub trait Store {
    /// Current numeric value of a parameter.
    fn param_value(&self, id: ParamId) -> f64;

    /// Write a solved value back to a parameter.
    fn set_param_value(&mut self, id: ParamId, value: f64);

    /// Mark a parameter as having been solved for (or not).
    fn set_param_known(&mut self, id: ParamId, known: bool);

    /// Whether a parameter currently holds a solved (vs. seed) value.
    fn is_param_known(&self, id: ParamId) -> bool;

    /// Look up an entity's definition.
    fn entity(&self, id: EntityId) -> &Entity;

    /// Look up a constraint's definition and priority.
    fn constraint(&self, id: ConstraintId) -> &ConstraintEntry;

    /// All constraints belonging to `group`, in declaration order.
    fn constraints_in_group(&self, group: GroupId) -> Vec<ConstraintId>;

    /// All entities belonging to `group`.
    fn entities_in_group(&self, group: GroupId) -> Vec<EntityId>;

    /// Which entity (if any) is currently being dragged.
    fn dragged(&self) -> Dragged;
}

/// A straightforward in-memory [`Store`] implementation: flat vectors keyed
/// by the raw handle value. This is the store a caller builds up when
/// defining a sketch, and the one the test suite uses as fixtures.
#[derive(Debug, Default)]
pub struct Sketch {
    values: Vec<f64>,
    known: Vec<bool>,
    entities: Vec<Entity>,
    entity_group: Vec<GroupId>,
    constraints: Vec<ConstraintEntry>,
    constraint_group: Vec<GroupId>,
    dragged: Dragged,
}

impl Sketch {
    /// An empty sketch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a parameter slot with the given seed value, returning its
    /// handle. Callers typically go through an [`crate::id::ParamIdGenerator`]
    /// and then call this once per generated id, in order.
    pub fn push_param(&mut self, seed: f64) -> ParamId {
        let id = ParamId::from_raw(self.values.len() as u32);
        self.values.push(seed);
        self.known.push(false);
        id
    }

    /// Register an entity, returning its handle.
    pub fn push_entity(&mut self, entity: Entity, group: GroupId) -> EntityId {
        let id = EntityId::from_raw(self.entities.len() as u32);
        self.entities.push(entity);
        self.entity_group.push(group);
        id
    }

    /// Register a constraint at default (lowest) priority, returning its
    /// handle.
    pub fn push_constraint(&mut self, entry: ConstraintEntry, group: GroupId) -> ConstraintId {
        let id = ConstraintId::from_raw(self.constraints.len() as u32);
        self.constraints.push(entry);
        self.constraint_group.push(group);
        id
    }

    /// Set which entity is currently being dragged.
    pub fn set_dragged(&mut self, dragged: Dragged) {
        self.dragged = dragged;
    }
}

impl Store for Sketch {
    fn param_value(&self, id: ParamId) -> f64 {
        self.values[id.raw() as usize]
    }

    fn set_param_value(&mut self, id: ParamId, value: f64) {
        self.values[id.raw() as usize] = value;
    }

    fn set_param_known(&mut self, id: ParamId, known: bool) {
        self.known[id.raw() as usize] = known;
    }

    fn is_param_known(&self, id: ParamId) -> bool {
        self.known[id.raw() as usize]
    }

    fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.raw() as usize]
    }

    fn constraint(&self, id: ConstraintId) -> &ConstraintEntry {
        &self.constraints[id.raw() as usize]
    }

    fn constraints_in_group(&self, group: GroupId) -> Vec<ConstraintId> {
        self.constraint_group
            .iter()
            .enumerate()
            .filter(|(_, g)| **g == group)
            .map(|(i, _)| ConstraintId::from_raw(i as u32))
            .collect()
    }

    fn entities_in_group(&self, group: GroupId) -> Vec<EntityId> {
        self.entity_group
            .iter()
            .enumerate()
            .filter(|(_, g)| **g == group)
            .map(|(i, _)| EntityId::from_raw(i as u32))
            .collect()
    }

    fn dragged(&self) -> Dragged {
        self.dragged
    }
}
