//! The numerical solver: turns an assembled system of [`Expr`] equations
//! into solved parameter values.
//!
//! The pipeline is the teacher's own `solver.rs`/`solver/newton.rs`/
//! `solver/find_dof.rs` split, generalized from the teacher's fixed
//! sparse-Jacobian/`faer` vocabulary to a dense hand-rolled least-squares
//! contract over the full entity/constraint catalogue:
//!
//! 1. [`Model::substitute`] eliminates trivial `param(a) - param(b) = 0`
//!    equations by folding one parameter into the other everywhere else.
//! 2. [`alone_pass`] solves, one at a time, any remaining equation that
//!    depends on exactly one still-free parameter.
//! 3. [`newton::solve_newton`] Newton-iterates the main system of whatever
//!    is left.
//! 4. On failure, [`dof::find_which_to_remove_to_fix_jacobian`] (singular
//!    Jacobian) or a residual scan (non-convergence) names the constraints
//!    to report back.
//! 5. [`dof::free_parameters`] optionally reports remaining degrees of
//!    freedom.

mod dof;
mod newton;

use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::constraints::ConstraintEntry;
use crate::entity::{entity_params, Entity};
use crate::error::Error;
use crate::expr::{Expr, ReferencedParams};
use crate::id::{ConstraintId, EntityId, GroupId, ParamId};
use crate::solve_outcome::{SolveReport, SolveStatus};
use crate::store::{Dragged, Store};
use crate::system::{self, Equation};
use crate::warnings;

/// A scratch overlay over a borrowed [`Store`]: parameter writes land in a
/// private map instead of the real store, so a solve that fails partway
/// through never leaves the caller's store in a half-solved state. Entity,
/// constraint and group lookups pass straight through to the real store,
/// which never changes shape during a solve.
struct Scratch<'s> {
    store: &'s dyn Store,
    values: HashMap<ParamId, f64>,
}

impl<'s> Scratch<'s> {
    fn new(store: &'s dyn Store) -> Self {
        Self {
            store,
            values: HashMap::new(),
        }
    }
}

impl Store for Scratch<'_> {
    fn param_value(&self, id: ParamId) -> f64 {
        self.values.get(&id).copied().unwrap_or_else(|| self.store.param_value(id))
    }

    fn set_param_value(&mut self, id: ParamId, value: f64) {
        self.values.insert(id, value);
    }

    fn set_param_known(&mut self, _id: ParamId, _known: bool) {}

    fn is_param_known(&self, id: ParamId) -> bool {
        self.store.is_param_known(id)
    }

    fn entity(&self, id: EntityId) -> &Entity {
        self.store.entity(id)
    }

    fn constraint(&self, id: ConstraintId) -> &ConstraintEntry {
        self.store.constraint(id)
    }

    fn constraints_in_group(&self, group: GroupId) -> Vec<ConstraintId> {
        self.store.constraints_in_group(group)
    }

    fn entities_in_group(&self, group: GroupId) -> Vec<EntityId> {
        self.store.entities_in_group(group)
    }

    fn dragged(&self) -> Dragged {
        self.store.dragged()
    }
}

/// The value a parameter should commit to: its own scratch (or original)
/// value if it's `Free`/`Alone`, or its substitution target's resolved
/// value (following the chain to the end) if it was eliminated.
fn resolved_value(model: &Model, scratch: &Scratch, p: ParamId) -> f64 {
    match model.tag.get(&p) {
        Some(ParamTag::Substituted(target)) => resolved_value(model, scratch, *target),
        _ => scratch.param_value(p),
    }
}

/// What a parameter has become over the course of assembly, in the order
/// the pipeline discovers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamTag {
    /// Still an unknown the main Newton pass must solve for.
    Free,
    /// Eliminated by the substitution pass in favor of another parameter.
    Substituted(ParamId),
    /// Solved by itself in the alone pass, tagged with the pass number it
    /// was solved in (purely informational).
    Alone(usize),
}

/// The mutable bookkeeping the solve pipeline threads through its stages:
/// which parameters are still free, and which equations are still active
/// (an equation stops being active once it has been consumed by
/// substitution or the alone pass).
pub(crate) struct Model {
    pub(crate) params: Vec<ParamId>,
    pub(crate) tag: HashMap<ParamId, ParamTag>,
    pub(crate) equations: Vec<Equation>,
    pub(crate) eq_active: Vec<bool>,
    pub(crate) dragged: HashSet<ParamId>,
}

impl Model {
    fn new(store: &dyn Store, group: GroupId, except: Option<ConstraintId>) -> Self {
        let assembled = system::write_equations_except_for(store, group, except);
        let tag = assembled.params.iter().map(|p| (*p, ParamTag::Free)).collect();
        let dragged = match store.dragged().entity() {
            Some(e) => entity_params(store, e).into_iter().collect(),
            None => HashSet::new(),
        };
        let eq_active = vec![true; assembled.equations.len()];
        Self {
            params: assembled.params,
            tag,
            equations: assembled.equations,
            eq_active,
            dragged,
        }
    }

    fn is_free(&self, p: ParamId) -> bool {
        matches!(self.tag.get(&p), Some(ParamTag::Free))
    }

    pub(crate) fn free_params(&self) -> Vec<ParamId> {
        self.params.iter().copied().filter(|p| self.is_free(*p)).collect()
    }

    pub(crate) fn active_indices(&self) -> Vec<usize> {
        (0..self.equations.len()).filter(|&i| self.eq_active[i]).collect()
    }

    /// Eliminate every equation of the exact shape `param(a) - param(b)`,
    /// folding the eliminated parameter into the survivor across every
    /// other still-active equation. If the dragged entity owns one of the
    /// two parameters, that one survives, so a drag isn't fought by its own
    /// equality constraint.
    fn substitute(&mut self) {
        for i in 0..self.equations.len() {
            if !self.eq_active[i] {
                continue;
            }
            let Some((a, b)) = self.equations[i].expr.as_param_difference() else {
                continue;
            };
            if !self.is_free(a) || !self.is_free(b) {
                continue;
            }
            let (eliminate, survivor) = if self.dragged.contains(&a) && !self.dragged.contains(&b) {
                (b, a)
            } else {
                (a, b)
            };
            self.tag.insert(eliminate, ParamTag::Substituted(survivor));
            self.eq_active[i] = false;
            for j in 0..self.equations.len() {
                if self.eq_active[j] {
                    self.equations[j].expr = self.equations[j].expr.substitute(eliminate, survivor);
                }
            }
        }
    }
}

/// Repeatedly solve, one at a time, any active equation whose only
/// remaining free parameter is a single one — a point pinned to a literal
/// coordinate, say. Per the design decision to keep failure handling
/// uniform, a single-parameter equation that the alone pass can't drive to
/// tolerance aborts the whole solve rather than falling through to the
/// main pass with a partially-solved parameter.
fn alone_pass(model: &mut Model, store: &mut dyn Store, config: &Config) -> Result<usize, SolveStatus> {
    let mut pass = 0usize;
    let mut iterations = 0usize;
    loop {
        let free = model.free_params();
        let candidate = model.active_indices().into_iter().find_map(|i| {
            match model.equations[i].expr.referenced_among(&free) {
                ReferencedParams::One(p) => Some((i, p)),
                _ => None,
            }
        });
        let Some((i, p)) = candidate else {
            return Ok(iterations);
        };
        pass += 1;
        let used = newton::solve_newton(model, store, &[p], &[i], config)?;
        iterations += used;
        model.tag.insert(p, ParamTag::Alone(pass));
        model.eq_active[i] = false;
    }
}

/// Solve every constraint in `group` against the current parameter values
/// in `store`, writing solved values back via [`Store::set_param_value`].
///
/// `find_free` additionally runs a rank-based freedom analysis (expensive:
/// one extra Jacobian rank test per still-free parameter) and populates
/// `SolveReport::dof`.
pub fn solve(store: &mut dyn Store, group: GroupId, find_free: bool, config: Config) -> Result<SolveReport, Error> {
    let constraints: Vec<(ConstraintId, crate::constraints::Constraint)> = store
        .constraints_in_group(group)
        .into_iter()
        .map(|cid| (cid, store.constraint(cid).constraint.clone()))
        .collect();
    let constraint_refs: Vec<(ConstraintId, &crate::constraints::Constraint)> =
        constraints.iter().map(|(cid, c)| (*cid, c)).collect();
    let lint_warnings = warnings::lint(store, &constraint_refs);

    let mut model = Model::new(store, group, None);
    if model.params.is_empty() && model.equations.is_empty() {
        return Err(Error::EmptyGroup(group));
    }

    model.substitute();

    let mut scratch = Scratch::new(store);
    let mut iterations = 0usize;
    let status = match alone_pass(&mut model, &mut scratch, &config) {
        Err(status) => status,
        Ok(used) => {
            iterations += used;
            let rows = model.active_indices();
            let cols = model.free_params();
            if rows.len() > cols.len() {
                SolveStatus::DidntConverge
            } else {
                match newton::solve_newton(&model, &mut scratch, &cols, &rows, &config) {
                    Ok(used) => {
                        iterations += used;
                        SolveStatus::Ok
                    }
                    Err(status) => status,
                }
            }
        }
    };

    let remove = match status {
        SolveStatus::Ok => Vec::new(),
        SolveStatus::SingularJacobian => {
            dof::find_which_to_remove_to_fix_jacobian(store, group, &constraint_refs, &config)
        }
        SolveStatus::DidntConverge => {
            let rows = model.active_indices();
            let culprits: HashSet<ConstraintId> = rows
                .into_iter()
                .filter(|&i| model.equations[i].expr.eval(&|p| scratch.param_value(p)).abs() >= config.convergence_tolerance)
                .map(|i| model.equations[i].constraint)
                .collect();
            culprits.into_iter().collect()
        }
    };

    // Only ever write to the real store here, and only on success: every
    // intermediate Newton step above landed in `scratch`, not `store`, so a
    // failed solve leaves the caller's values untouched. A substituted
    // parameter commits its target's resolved value, never its own stale
    // seed. The resolved values are read out of `scratch` (which still
    // borrows `store`) before that borrow ends, then written back to
    // `store` once it's free to borrow mutably again.
    let committed: Vec<(ParamId, f64)> = if status == SolveStatus::Ok {
        model.params.iter().map(|&p| (p, resolved_value(&model, &scratch, p))).collect()
    } else {
        Vec::new()
    };
    drop(scratch);

    if status == SolveStatus::Ok {
        for (p, value) in committed {
            store.set_param_value(p, value);
            store.set_param_known(p, true);
        }
    } else {
        for p in model.params.iter().copied() {
            store.set_param_known(p, false);
        }
    }

    let dof = if find_free && status == SolveStatus::Ok {
        Some(dof::free_parameters(store, group, &config).len())
    } else {
        None
    };

    Ok(SolveReport {
        status,
        dof,
        remove,
        warnings: lint_warnings,
        iterations,
    })
}

/// Recompute a constraint's own scalar dimension (distance, diameter,
/// ratio, angle degrees...) from the entities' *current* geometry, leaving
/// every other field untouched. Used to refresh a dimension after a drag
/// has moved the geometry it measures, without re-running a solve.
pub fn modify_to_satisfy(store: &dyn Store, constraint: &crate::constraints::Constraint) -> crate::constraints::Constraint {
    use crate::constraints::{direction_cosine, Constraint};
    use crate::entity::{line_vector_exprs, point_exprs, point_exprs_in_workplane, radius_expr};

    let eval = |e: &Expr| e.eval(&|p| store.param_value(p));

    match constraint.clone() {
        Constraint::PtPtDistance { a, b, in_plane, .. } => {
            let distance = match in_plane {
                None => eval(&point_exprs(store, b).minus(&point_exprs(store, a)).magnitude()),
                Some(wp) => eval(
                    &point_exprs_in_workplane(store, wp, b)
                        .minus(&point_exprs_in_workplane(store, wp, a))
                        .magnitude(),
                ),
            };
            Constraint::PtPtDistance { a, b, in_plane, distance }
        }
        Constraint::Diameter { circle, .. } => Constraint::Diameter {
            circle,
            diameter: 2.0 * eval(&radius_expr(store, circle)),
        },
        Constraint::LengthRatio { a, b, .. } => {
            let la = eval(&line_vector_exprs(store, a).magnitude());
            let lb = eval(&line_vector_exprs(store, b).magnitude());
            Constraint::LengthRatio { a, b, ratio: la / lb }
        }
        Constraint::Angle { a, b, in_plane, .. } => {
            let cos = eval(&direction_cosine(store, a, b, in_plane));
            Constraint::Angle {
                a,
                b,
                in_plane,
                degrees: libm::acos(cos.clamp(-1.0, 1.0)) * 180.0 / std::f64::consts::PI,
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Constraint, ConstraintEntry};
    use crate::entity::Entity;
    use crate::id::{EntityIdGenerator, GroupIdGenerator};
    use crate::store::Sketch;

    fn point(sketch: &mut Sketch, ids: &mut EntityIdGenerator, group: GroupId, xy: (f64, f64)) -> crate::id::EntityId {
        let x = sketch.push_param(xy.0);
        let y = sketch.push_param(xy.1);
        let z = sketch.push_param(0.0);
        let _ = ids.next_id();
        sketch.push_entity(Entity::Point3 { x, y, z }, group)
    }

    #[test]
    fn solves_a_single_distance_constraint() {
        let mut sketch = Sketch::new();
        let mut ids = EntityIdGenerator::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();
        let a = point(&mut sketch, &mut ids, g, (0.0, 0.0));
        let b = point(&mut sketch, &mut ids, g, (1.0, 0.0));
        sketch.push_constraint(
            ConstraintEntry::new(Constraint::PtPtDistance {
                a,
                b,
                in_plane: None,
                distance: 5.0,
            }),
            g,
        );
        let report = solve(&mut sketch, g, false, Config::default()).unwrap();
        assert!(report.is_ok());
        let bx = match sketch.entity(b) {
            Entity::Point3 { x, .. } => *x,
            _ => unreachable!(),
        };
        assert!((sketch.param_value(bx) - 5.0).abs() < 1e-6 || (sketch.param_value(bx) + 5.0).abs() < 1e-6);
    }

    #[test]
    fn solves_coincident_points_by_substitution_alone() {
        let mut sketch = Sketch::new();
        let mut ids = EntityIdGenerator::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();
        let a = point(&mut sketch, &mut ids, g, (2.0, 3.0));
        let b = point(&mut sketch, &mut ids, g, (9.0, 9.0));
        sketch.push_constraint(
            ConstraintEntry::new(Constraint::PointsCoincident { a, b, in_plane: None }),
            g,
        );
        let report = solve(&mut sketch, g, false, Config::default()).unwrap();
        assert!(report.is_ok());
        let (ax, ay) = match sketch.entity(a) {
            Entity::Point3 { x, y, .. } => (*x, *y),
            _ => unreachable!(),
        };
        let (bx, by) = match sketch.entity(b) {
            Entity::Point3 { x, y, .. } => (*x, *y),
            _ => unreachable!(),
        };
        assert!((sketch.param_value(ax) - sketch.param_value(bx)).abs() < 1e-9);
        assert!((sketch.param_value(ay) - sketch.param_value(by)).abs() < 1e-9);
    }

    #[test]
    fn equilateral_triangle_from_equal_length_lines() {
        let mut sketch = Sketch::new();
        let mut ids = EntityIdGenerator::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();
        let a = point(&mut sketch, &mut ids, g, (0.0, 0.0));
        let b = point(&mut sketch, &mut ids, g, (1.0, 0.0));
        let c = point(&mut sketch, &mut ids, g, (0.6, 0.6));
        let ab = sketch.push_entity(Entity::LineSegment { p0: a, p1: b }, g);
        let _ = ids.next_id();
        let bc = sketch.push_entity(Entity::LineSegment { p0: b, p1: c }, g);
        let _ = ids.next_id();
        let ca = sketch.push_entity(Entity::LineSegment { p0: c, p1: a }, g);
        let _ = ids.next_id();
        sketch.push_constraint(
            ConstraintEntry::new(Constraint::PtPtDistance {
                a,
                b,
                in_plane: None,
                distance: 1.0,
            }),
            g,
        );
        sketch.push_constraint(ConstraintEntry::new(Constraint::EqualLengthLines { a: ab, b: bc }), g);
        sketch.push_constraint(ConstraintEntry::new(Constraint::EqualLengthLines { a: bc, b: ca }), g);
        let report = solve(&mut sketch, g, false, Config::default()).unwrap();
        assert!(report.is_ok());
        let side_ab = crate::entity::line_vector_exprs(&sketch, ab)
            .magnitude()
            .eval(&|p| sketch.param_value(p));
        let side_bc = crate::entity::line_vector_exprs(&sketch, bc)
            .magnitude()
            .eval(&|p| sketch.param_value(p));
        let side_ca = crate::entity::line_vector_exprs(&sketch, ca)
            .magnitude()
            .eval(&|p| sketch.param_value(p));
        assert!((side_ab - 1.0).abs() < 1e-6);
        assert!((side_bc - 1.0).abs() < 1e-6);
        assert!((side_ca - 1.0).abs() < 1e-6);
    }

    #[test]
    fn overdetermined_group_reports_singular_jacobian() {
        let mut sketch = Sketch::new();
        let mut ids = EntityIdGenerator::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();
        let a = point(&mut sketch, &mut ids, g, (0.0, 0.0));
        let b = point(&mut sketch, &mut ids, g, (3.0, 0.0));
        sketch.push_constraint(
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
        let report = solve(&mut sketch, g, false, Config::default()).unwrap();
        assert_eq!(report.status, SolveStatus::SingularJacobian);
        assert!(!report.remove.is_empty());
    }

    #[test]
    fn empty_group_is_a_structural_error() {
        let mut sketch = Sketch::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();
        assert!(matches!(solve(&mut sketch, g, false, Config::default()), Err(Error::EmptyGroup(_))));
    }
}
