//! The assembler: for one group, collect the full parameter list and the
//! full equation list (every constraint in the group except possibly one,
//! plus its entities' own intrinsic equations).
//!
//! This plays the same role as the teacher's `Model::new` (in `solver.rs`),
//! but builds a plain list of [`Expr`] equations instead of a sparse
//! symbolic-pattern matrix; the numeric solver builds the matrix itself.

use std::collections::HashSet;

use crate::constraints::{self};
use crate::entity::entity_params;
use crate::expr::Expr;
use crate::id::{ConstraintId, GroupId, ParamId};
use crate::store::Store;

/// One equation row, tagged with which constraint (and sub-index within it)
/// produced it.
#[derive(Debug, Clone)]
pub struct Equation {
    pub constraint: ConstraintId,
    pub sub_index: u8,
    pub expr: Expr,
}

/// A fully assembled, not-yet-solved system for one group.
#[derive(Debug, Clone)]
pub struct AssembledSystem {
    pub params: Vec<ParamId>,
    pub equations: Vec<Equation>,
}

/// Gather every constraint's equations and every entity's parameters for
/// `group`, skipping `except` if given (used by the "what if we drop this
/// constraint" diagnosis pass).
pub fn write_equations_except_for(
    store: &dyn Store,
    group: GroupId,
    except: Option<ConstraintId>,
) -> AssembledSystem {
    let mut equations = Vec::new();
    for cid in store.constraints_in_group(group) {
        if Some(cid) == except {
            continue;
        }
        let entry = store.constraint(cid);
        for (sub_index, expr) in constraints::generate(store, &entry.constraint).into_iter().enumerate() {
            equations.push(Equation {
                constraint: cid,
                sub_index: sub_index as u8,
                expr,
            });
        }
    }

    let mut seen = HashSet::new();
    let mut params = Vec::new();
    for eid in store.entities_in_group(group) {
        for p in entity_params(store, eid) {
            if seen.insert(p) {
                params.push(p);
            }
        }
    }

    AssembledSystem { params, equations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Constraint, ConstraintEntry};
    use crate::entity::Entity;
    use crate::id::{EntityIdGenerator, GroupIdGenerator};
    use crate::store::Sketch;

    #[test]
    fn assembles_params_from_entities_and_equations_from_constraints() {
        let mut sketch = Sketch::new();
        let mut ids = EntityIdGenerator::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();

        let ax = sketch.push_param(0.0);
        let ay = sketch.push_param(0.0);
        let az = sketch.push_param(0.0);
        let a = sketch.push_entity(Entity::Point3 { x: ax, y: ay, z: az }, g);
        let _ = ids.next_id();

        let bx = sketch.push_param(3.0);
        let by = sketch.push_param(4.0);
        let bz = sketch.push_param(0.0);
        let b = sketch.push_entity(Entity::Point3 { x: bx, y: by, z: bz }, g);
        let _ = ids.next_id();

        sketch.push_constraint(
            ConstraintEntry::new(Constraint::PtPtDistance {
                a,
                b,
                in_plane: None,
                distance: 5.0,
            }),
            g,
        );

        let system = write_equations_except_for(&sketch, g, None);
        assert_eq!(system.params.len(), 6);
        assert_eq!(system.equations.len(), 1);
    }

    #[test]
    fn except_skips_the_named_constraint() {
        let mut sketch = Sketch::new();
        let mut ids = EntityIdGenerator::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();
        let ax = sketch.push_param(0.0);
        let ay = sketch.push_param(0.0);
        let az = sketch.push_param(0.0);
        let a = sketch.push_entity(Entity::Point3 { x: ax, y: ay, z: az }, g);
        let _ = ids.next_id();
        let bx = sketch.push_param(3.0);
        let by = sketch.push_param(4.0);
        let bz = sketch.push_param(0.0);
        let b = sketch.push_entity(Entity::Point3 { x: bx, y: by, z: bz }, g);
        let _ = ids.next_id();
        let c1 = sketch.push_constraint(
            ConstraintEntry::new(Constraint::PtPtDistance {
                a,
                b,
                in_plane: None,
                distance: 5.0,
            }),
            g,
        );
        sketch.push_constraint(
            ConstraintEntry::new(Constraint::PtPtDistance {
                a,
                b,
                in_plane: None,
                distance: 6.0,
            }),
            g,
        );

        let system = write_equations_except_for(&sketch, g, Some(c1));
        assert_eq!(system.equations.len(), 1);
    }
}
