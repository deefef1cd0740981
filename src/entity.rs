//! Geometric entities that can be constrained and solved for, and the
//! accessors that turn them into [`Expr`] vectors for the constraint
//! generator.
//!
//! The teacher's `datatypes/inputs.rs` only ever had 2D points built
//! straight from two parameter ids. This generalizes that into points in
//! free 3-space *or* a workplane's `(u, v)`, plus the workplane/normal
//! entities those planar points are measured against, and the line, circle,
//! arc, cubic and face shapes the constraint catalogue dispatches on.

use crate::expr::Expr;
use crate::id::{EntityId, ParamId};
use crate::store::Store;
use crate::vector::{ExprVec2, ExprVec3};

/// A geometric entity. Entities only ever reference parameters (for the
/// leaf kinds) or other entities (for composite kinds); the solver never
/// mutates one directly; it only ever mutates the parameters underneath.
#[derive(Debug, Clone)]
pub enum Entity {
    /// A point free in 3-space.
    Point3 { x: ParamId, y: ParamId, z: ParamId },
    /// A point constrained to lie in a workplane, given in that plane's
    /// own `(u, v)` coordinates.
    PointInPlane {
        workplane: EntityId,
        u: ParamId,
        v: ParamId,
    },
    /// A unit orientation, stored as a quaternion, from which an
    /// orthonormal `(U, V, N)` basis is derived.
    Normal {
        qw: ParamId,
        qx: ParamId,
        qy: ParamId,
        qz: ParamId,
    },
    /// A 2D coordinate system embedded in 3-space.
    Workplane { origin: EntityId, normal: EntityId },
    /// A finite line segment between two points (either kind).
    LineSegment { p0: EntityId, p1: EntityId },
    /// A circle; `normal` is `None` when the circle is known to live in a
    /// workplane (its own plane is then that workplane's).
    Circle {
        center: EntityId,
        radius: ParamId,
        normal: Option<EntityId>,
    },
    /// A circular arc, counter-clockwise from `start` to `end` about `center`.
    Arc {
        center: EntityId,
        start: EntityId,
        end: EntityId,
        normal: Option<EntityId>,
    },
    /// A cubic Bezier: two endpoints and two control points.
    Cubic {
        endpoint0: EntityId,
        ctrl1: EntityId,
        ctrl2: EntityId,
        endpoint1: EntityId,
    },
    /// A planar face, given by a point on it and its normal.
    Face { point: EntityId, normal: EntityId },
}

/// World-space `(x, y, z)` of a point entity. If the point is stored as
/// `(u, v)` in a workplane, it is lifted into world space via that plane's
/// basis: `p = origin + u*U + v*V`.
pub fn point_exprs(store: &dyn Store, id: EntityId) -> ExprVec3 {
    match store.entity(id).clone() {
        Entity::Point3 { x, y, z } => ExprVec3::new(Expr::param(x), Expr::param(y), Expr::param(z)),
        Entity::PointInPlane { workplane, u, v } => {
            let (origin, basis_u, basis_v, _) = workplane_basis_exprs(store, workplane);
            origin
                .plus(&basis_u.scaled_by(Expr::param(u)))
                .plus(&basis_v.scaled_by(Expr::param(v)))
        }
        other => panic!("entity {id:?} is not a point: {other:?}"),
    }
}

/// A point's `(u, v)` within a specific workplane. If the point is already
/// stored in that workplane, this is just its two parameters; otherwise its
/// world position is projected onto the plane's basis.
pub fn point_exprs_in_workplane(store: &dyn Store, workplane: EntityId, point: EntityId) -> ExprVec2 {
    if let Entity::PointInPlane { workplane: w, u, v } = store.entity(point) {
        if *w == workplane {
            return ExprVec2::new(Expr::param(*u), Expr::param(*v));
        }
    }
    let (origin, basis_u, basis_v, _) = workplane_basis_exprs(store, workplane);
    let p = point_exprs(store, point);
    let rel = p.minus(&origin);
    ExprVec2::new(rel.dot(&basis_u), rel.dot(&basis_v))
}

/// The `(origin, U, V, N)` of a workplane: an offset point and an
/// orthonormal basis, `N` being the plane's normal.
pub fn workplane_basis_exprs(
    store: &dyn Store,
    workplane: EntityId,
) -> (ExprVec3, ExprVec3, ExprVec3, ExprVec3) {
    match store.entity(workplane) {
        Entity::Workplane { origin, normal } => {
            let o = point_exprs(store, *origin);
            let (u, v, n) = normal_basis_exprs(store, *normal);
            (o, u, v, n)
        }
        other => panic!("entity {workplane:?} is not a workplane: {other:?}"),
    }
}

/// Orthonormal `(U, V, N)` derived from a quaternion-valued [`Entity::Normal`],
/// via the standard quaternion-to-rotation-matrix formulas applied to the
/// world axes.
pub fn normal_basis_exprs(store: &dyn Store, normal: EntityId) -> (ExprVec3, ExprVec3, ExprVec3) {
    let (qw, qx, qy, qz) = match store.entity(normal) {
        Entity::Normal { qw, qx, qy, qz } => (
            Expr::param(*qw),
            Expr::param(*qx),
            Expr::param(*qy),
            Expr::param(*qz),
        ),
        other => panic!("entity {normal:?} is not a normal: {other:?}"),
    };

    let two = Expr::constant(2.0);
    let one = Expr::constant(1.0);

    // U = first column, V = second column, N = third column of the
    // rotation matrix built from (qw, qx, qy, qz).
    let u = ExprVec3::new(
        one.clone() - two.clone() * (qy.clone().square() + qz.clone().square()),
        two.clone() * (qx.clone() * qy.clone() + qz.clone() * qw.clone()),
        two.clone() * (qx.clone() * qz.clone() - qy.clone() * qw.clone()),
    );
    let v = ExprVec3::new(
        two.clone() * (qx.clone() * qy.clone() - qz.clone() * qw.clone()),
        one.clone() - two.clone() * (qx.clone().square() + qz.clone().square()),
        two.clone() * (qy.clone() * qz.clone() + qx.clone() * qw.clone()),
    );
    let n = ExprVec3::new(
        two.clone() * (qx.clone() * qz.clone() + qy.clone() * qw.clone()),
        two.clone() * (qy.clone() * qz.clone() - qx.clone() * qw.clone()),
        one - two * (qx.square() + qy.square()),
    );
    (u, v, n)
}

/// A line's direction, `p1 - p0`, in world space.
pub fn line_vector_exprs(store: &dyn Store, line: EntityId) -> ExprVec3 {
    match store.entity(line) {
        Entity::LineSegment { p0, p1 } => point_exprs(store, *p1).minus(&point_exprs(store, *p0)),
        other => panic!("entity {line:?} is not a line segment: {other:?}"),
    }
}

/// A line's two endpoint entity handles.
pub fn line_endpoints(store: &dyn Store, line: EntityId) -> (EntityId, EntityId) {
    match store.entity(line) {
        Entity::LineSegment { p0, p1 } => (*p0, *p1),
        other => panic!("entity {line:?} is not a line segment: {other:?}"),
    }
}

/// A circle's radius parameter, as an expression.
pub fn radius_expr(store: &dyn Store, circle: EntityId) -> Expr {
    match store.entity(circle) {
        Entity::Circle { radius, .. } => Expr::param(*radius),
        Entity::Arc { center, start, .. } => point_exprs(store, *start).minus(&point_exprs(store, *center)).magnitude(),
        other => panic!("entity {circle:?} has no radius: {other:?}"),
    }
}

/// The numeric sweep `(theta_start, theta_finish, delta)` of an arc, measured
/// in its own plane (workplane if present, else the world XY plane),
/// evaluated at current parameter values. Used only to pick a stable
/// trigonometric branch, never differentiated.
pub fn arc_sweep_numeric(store: &dyn Store, arc: EntityId) -> (f64, f64, f64) {
    let (center, start, end) = match store.entity(arc) {
        Entity::Arc { center, start, end, .. } => (*center, *start, *end),
        other => panic!("entity {arc:?} is not an arc: {other:?}"),
    };
    let eval = |e: Expr| e.eval(&|p| store.param_value(p));
    let c = point_exprs(store, center);
    let s = point_exprs(store, start);
    let f = point_exprs(store, end);
    let theta_s = crate::expr::atan2(eval(s.y.clone() - c.y.clone()), eval(s.x.clone() - c.x.clone()));
    let theta_f = crate::expr::atan2(eval(f.y.clone() - c.y.clone()), eval(f.x.clone() - c.x.clone()));
    let mut delta = theta_f - theta_s;
    if delta < 0.0 {
        delta += 2.0 * std::f64::consts::PI;
    }
    (theta_s, theta_f, delta)
}

/// A cubic's four control points, indexed 0..=3 as
/// `(endpoint0, ctrl1, ctrl2, endpoint1)`.
pub fn cubic_point(store: &dyn Store, cubic: EntityId, index: usize) -> EntityId {
    match store.entity(cubic) {
        Entity::Cubic {
            endpoint0,
            ctrl1,
            ctrl2,
            endpoint1,
        } => match index {
            0 => *endpoint0,
            1 => *ctrl1,
            2 => *ctrl2,
            3 => *endpoint1,
            _ => panic!("cubic only has 4 control points"),
        },
        other => panic!("entity {cubic:?} is not a cubic: {other:?}"),
    }
}

/// A face's `(point, normal)` expressions: a point known to lie on the
/// plane, and the plane's unit normal.
pub fn face_exprs(store: &dyn Store, face: EntityId) -> (ExprVec3, ExprVec3) {
    match store.entity(face) {
        Entity::Face { point, normal } => {
            let (_, _, n) = normal_basis_exprs(store, *normal);
            (point_exprs(store, *point), n)
        }
        other => panic!("entity {face:?} is not a face: {other:?}"),
    }
}

/// Every parameter reachable from an entity, recursing through composite
/// entities down to their leaf parameters. Used by the assembler to build
/// the full parameter list for a solve group, independent of which
/// parameters happen to appear in the group's equations.
pub fn entity_params(store: &dyn Store, id: EntityId) -> Vec<ParamId> {
    let mut out = Vec::new();
    collect_entity_params(store, id, &mut out);
    out
}

fn collect_entity_params(store: &dyn Store, id: EntityId, out: &mut Vec<ParamId>) {
    match store.entity(id) {
        Entity::Point3 { x, y, z } => out.extend([*x, *y, *z]),
        Entity::PointInPlane { workplane, u, v } => {
            out.extend([*u, *v]);
            collect_entity_params(store, *workplane, out);
        }
        Entity::Normal { qw, qx, qy, qz } => out.extend([*qw, *qx, *qy, *qz]),
        Entity::Workplane { origin, normal } => {
            collect_entity_params(store, *origin, out);
            collect_entity_params(store, *normal, out);
        }
        Entity::LineSegment { p0, p1 } => {
            collect_entity_params(store, *p0, out);
            collect_entity_params(store, *p1, out);
        }
        Entity::Circle { center, radius, normal } => {
            collect_entity_params(store, *center, out);
            out.push(*radius);
            if let Some(n) = normal {
                collect_entity_params(store, *n, out);
            }
        }
        Entity::Arc { center, start, end, normal } => {
            collect_entity_params(store, *center, out);
            collect_entity_params(store, *start, out);
            collect_entity_params(store, *end, out);
            if let Some(n) = normal {
                collect_entity_params(store, *n, out);
            }
        }
        Entity::Cubic {
            endpoint0,
            ctrl1,
            ctrl2,
            endpoint1,
        } => {
            for p in [*endpoint0, *ctrl1, *ctrl2, *endpoint1] {
                collect_entity_params(store, p, out);
            }
        }
        Entity::Face { point, normal } => {
            collect_entity_params(store, *point, out);
            collect_entity_params(store, *normal, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{EntityIdGenerator, GroupIdGenerator, ParamIdGenerator};
    use crate::store::Sketch;

    fn point3(sketch: &mut Sketch, ids: &mut EntityIdGenerator, params: &mut ParamIdGenerator, group: crate::id::GroupId, xyz: (f64, f64, f64)) -> EntityId {
        let x = sketch.push_param(xyz.0);
        let y = sketch.push_param(xyz.1);
        let z = sketch.push_param(xyz.2);
        let _ = params.next_id();
        let _ = params.next_id();
        let _ = params.next_id();
        let _ = ids.next_id();
        sketch.push_entity(Entity::Point3 { x, y, z }, group)
    }

    #[test]
    fn world_point_expression_evaluates_to_its_parameters() {
        let mut sketch = Sketch::new();
        let mut params = ParamIdGenerator::new();
        let mut ids = EntityIdGenerator::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();
        let p = point3(&mut sketch, &mut ids, &mut params, g, (1.0, 2.0, 3.0));
        let v = point_exprs(&sketch, p);
        let lookup = |pid: ParamId| sketch.param_value(pid);
        assert_eq!(v.x.eval(&lookup), 1.0);
        assert_eq!(v.y.eval(&lookup), 2.0);
        assert_eq!(v.z.eval(&lookup), 3.0);
    }

    #[test]
    fn identity_normal_gives_world_axes_as_basis() {
        let mut sketch = Sketch::new();
        let qw = sketch.push_param(1.0);
        let qx = sketch.push_param(0.0);
        let qy = sketch.push_param(0.0);
        let qz = sketch.push_param(0.0);
        let mut ids = EntityIdGenerator::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();
        let n = sketch.push_entity(Entity::Normal { qw, qx, qy, qz }, g);
        let _ = ids.next_id();
        let (u, v, w) = normal_basis_exprs(&sketch, n);
        let lookup = |pid: ParamId| sketch.param_value(pid);
        assert_eq!((u.x.eval(&lookup), u.y.eval(&lookup), u.z.eval(&lookup)), (1.0, 0.0, 0.0));
        assert_eq!((v.x.eval(&lookup), v.y.eval(&lookup), v.z.eval(&lookup)), (0.0, 1.0, 0.0));
        assert_eq!((w.x.eval(&lookup), w.y.eval(&lookup), w.z.eval(&lookup)), (0.0, 0.0, 1.0));
    }
}
