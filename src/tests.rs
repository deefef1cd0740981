//! End-to-end scenarios exercising the whole solve pipeline, as opposed to
//! the unit tests colocated with each module.


use crate::config::Config;
use crate::constraints::{Constraint, ConstraintEntry};
use crate::entity::Entity;
use crate::id::{EntityId, EntityIdGenerator, GroupId, GroupIdGenerator};
use crate::solve_outcome::SolveStatus;
use crate::solver::solve;
use crate::store::Sketch;

fn point(sketch: &mut Sketch, ids: &mut EntityIdGenerator, group: GroupId, xy: (f64, f64)) -> EntityId {
    let x = sketch.push_param(xy.0);
    let y = sketch.push_param(xy.1);
    let z = sketch.push_param(0.0);
    let _ = ids.next_id();
    sketch.push_entity(Entity::Point3 { x, y, z }, group)
}

#[test]
fn point_on_circle_lands_at_radius() {
    let mut sketch = Sketch::new();
    let mut ids = EntityIdGenerator::new();
    let mut groups = GroupIdGenerator::new();
    let g = groups.next_id();
    let center = point(&mut sketch, &mut ids, g, (0.0, 0.0));
    let radius = sketch.push_param(2.0);
    let circle = sketch.push_entity(
        Entity::Circle {
            center,
            radius,
            normal: None,
        },
        g,
    );
    let _ = ids.next_id();
    let p = point(&mut sketch, &mut ids, g, (1.5, 1.5));
    sketch.push_constraint(ConstraintEntry::new(Constraint::PtOnCircle { point: p, circle }), g);

    let report = solve(&mut sketch, g, false, Config::default()).unwrap();
    assert!(report.is_ok());

    let dist = crate::entity::point_exprs(&sketch, p)
        .minus(&crate::entity::point_exprs(&sketch, center))
        .magnitude()
        .eval(&|pid| sketch.param_value(pid));
    assert!((dist - 2.0).abs() < 1e-6);
}

/// An arc swept almost a full half-turn, paired with a line constrained to
/// equal its arc length. This exercises the middle (`asin`) bucket of
/// `equal_line_arc_len`'s trig-branch selection, where `acos` would be
/// numerically flat.
#[test]
fn equal_line_arc_len_near_half_turn() {
    let mut sketch = Sketch::new();
    let mut ids = EntityIdGenerator::new();
    let mut groups = GroupIdGenerator::new();
    let g = groups.next_id();

    let center = point(&mut sketch, &mut ids, g, (0.0, 0.0));
    let start = point(&mut sketch, &mut ids, g, (1.0, 0.0));
    // Just shy of PI radians around from `start`, so delta falls in the
    // middle bucket rather than the near-zero or near-2*PI ones.
    let angle = std::f64::consts::PI * 0.98;
    let end = point(&mut sketch, &mut ids, g, (angle.cos(), angle.sin()));
    let arc = sketch.push_entity(
        Entity::Arc {
            center,
            start,
            end,
            normal: None,
        },
        g,
    );
    let _ = ids.next_id();

    let l0 = point(&mut sketch, &mut ids, g, (0.0, 0.0));
    let l1 = point(&mut sketch, &mut ids, g, (2.0, 0.0));
    let line = sketch.push_entity(Entity::LineSegment { p0: l0, p1: l1 }, g);
    let _ = ids.next_id();

    sketch.push_constraint(ConstraintEntry::new(Constraint::EqualLineArcLen { line, arc }), g);

    let report = solve(&mut sketch, g, false, Config::default()).unwrap();
    assert!(report.is_ok());

    let radius = crate::entity::radius_expr(&sketch, arc).eval(&|p| sketch.param_value(p));
    let line_len = crate::entity::line_vector_exprs(&sketch, line)
        .magnitude()
        .eval(&|p| sketch.param_value(p));
    assert!((radius * angle - line_len).abs() < 1e-6);
}

#[test]
fn overconstrained_distance_is_reported_not_returned_as_err() {
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
            distance: 2.0,
        }),
        g,
    );
    sketch.push_constraint(
        ConstraintEntry::new(Constraint::PtPtDistance {
            a,
            b,
            in_plane: None,
            distance: 3.0,
        }),
        g,
    );
    let report = solve(&mut sketch, g, false, Config::default()).unwrap();
    assert_eq!(report.status, SolveStatus::SingularJacobian);
}

#[test]
fn coincident_points_merge_regardless_of_declaration_order() {
    let mut sketch = Sketch::new();
    let mut ids = EntityIdGenerator::new();
    let mut groups = GroupIdGenerator::new();
    let g = groups.next_id();
    let a = point(&mut sketch, &mut ids, g, (1.0, 1.0));
    let b = point(&mut sketch, &mut ids, g, (-3.0, 4.0));
    sketch.push_constraint(
        ConstraintEntry::new(Constraint::PointsCoincident {
            a,
            b,
            in_plane: None,
        }),
        g,
    );
    let report = solve(&mut sketch, g, false, Config::default()).unwrap();
    assert!(report.is_ok());
    let pa = crate::entity::point_exprs(&sketch, a);
    let pb = crate::entity::point_exprs(&sketch, b);
    let lookup = |p: crate::id::ParamId| sketch.param_value(p);
    assert_eq!(pa.x.eval(&lookup), pb.x.eval(&lookup));
    assert_eq!(pa.y.eval(&lookup), pb.y.eval(&lookup));
}
