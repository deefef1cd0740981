//! The constraint catalogue: for each kind of user-declared constraint,
//! lowering it to one or more scalar equations `f(params) = 0`.
//!
//! This plays the role the teacher's `constraints.rs` played (one big
//! tagged enum, one dispatch site, hand-derived partials per kind) but the
//! partials are no longer hand-derived: each `generate` arm builds an
//! [`Expr`] from the entity accessors and the solver differentiates it
//! analytically. What survives from the teacher almost unchanged is the
//! *geometric* reasoning baked into specific formulas: the arc-angle bucket
//! selection in [`equal_line_arc_len`], the sweep math, and the
//! pivot-selection trick in [`vectors_parallel`].

use std::f64::consts::PI;

use crate::entity::{
    arc_sweep_numeric, cubic_point, face_exprs, line_endpoints, line_vector_exprs, point_exprs,
    point_exprs_in_workplane, radius_expr,
};
use crate::expr::Expr;
use crate::id::EntityId;
use crate::store::Store;
use crate::vector::{ExprVec2, ExprVec3, Vec3};

/// A constraint together with the priority it should be attempted at during
/// a tiered solve: 0 is highest priority (tried first, alone), and larger
/// values are tried progressively alongside everything already attempted.
#[derive(Debug, Clone)]
pub struct ConstraintEntry {
    pub constraint: Constraint,
    pub priority: u8,
}

impl ConstraintEntry {
    /// The default, lowest priority: tried only once every higher-priority
    /// constraint has already been folded in.
    pub fn new(constraint: Constraint) -> Self {
        Self {
            constraint,
            priority: u8::MAX,
        }
    }

    /// Priority 0: attempted before anything else.
    pub fn highest_priority(constraint: Constraint) -> Self {
        Self {
            constraint,
            priority: 0,
        }
    }
}

/// One user-declared constraint. `in_plane: Some(workplane)` means the
/// constraint is measured in that workplane's `(u, v)`; `None` means it is
/// measured in free 3-space.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Distance between two points.
    PtPtDistance {
        a: EntityId,
        b: EntityId,
        in_plane: Option<EntityId>,
        distance: f64,
    },
    /// Perpendicular distance from a point to a line.
    PtLineDistance {
        point: EntityId,
        line: EntityId,
        in_plane: Option<EntityId>,
        distance: f64,
    },
    /// Distance from a point to a plane.
    PtPlaneDistance {
        point: EntityId,
        plane: EntityId,
        distance: f64,
    },
    /// Point lies in a plane.
    PtInPlane { point: EntityId, plane: EntityId },
    /// Distance from a point to a face.
    PtFaceDistance {
        point: EntityId,
        face: EntityId,
        distance: f64,
    },
    /// Point lies on a face.
    PtOnFace { point: EntityId, face: EntityId },
    /// Two lines have equal length.
    EqualLengthLines { a: EntityId, b: EntityId },
    /// A point is equidistant from two lines.
    EqualPtLineDistances {
        point: EntityId,
        line_a: EntityId,
        line_b: EntityId,
        in_plane: Option<EntityId>,
    },
    /// `|a| / |b| == ratio`.
    LengthRatio { a: EntityId, b: EntityId, ratio: f64 },
    /// A circle's diameter.
    Diameter { circle: EntityId, diameter: f64 },
    /// Two circles/arcs have equal radius.
    EqualRadius { a: EntityId, b: EntityId },
    /// A line and an arc have equal length (`r * theta == |line|`).
    EqualLineArcLen { line: EntityId, arc: EntityId },
    /// Two points coincide.
    PointsCoincident {
        a: EntityId,
        b: EntityId,
        in_plane: Option<EntityId>,
    },
    /// A point lies on a line.
    PtOnLine {
        point: EntityId,
        line: EntityId,
        in_plane: Option<EntityId>,
    },
    /// A point lies on a circle (its plane, projected).
    PtOnCircle { point: EntityId, circle: EntityId },
    /// A point is the midpoint of a line.
    AtMidpoint {
        line: EntityId,
        point: EntityId,
        in_plane: Option<EntityId>,
    },
    /// Two points are symmetric about a line (3D: about a plane containing it).
    Symmetric {
        about_line: EntityId,
        a: EntityId,
        b: EntityId,
        in_plane: Option<EntityId>,
    },
    /// Two points are symmetric about the workplane's horizontal axis.
    SymmetricHoriz {
        a: EntityId,
        b: EntityId,
        in_plane: EntityId,
    },
    /// Two points are symmetric about the workplane's vertical axis.
    SymmetricVert {
        a: EntityId,
        b: EntityId,
        in_plane: EntityId,
    },
    /// A line is horizontal in its workplane.
    Horizontal { line: EntityId, in_plane: EntityId },
    /// A line is vertical in its workplane.
    Vertical { line: EntityId, in_plane: EntityId },
    /// Two normals share the same orientation.
    SameOrientation { a: EntityId, b: EntityId },
    /// Two lines are perpendicular.
    Perpendicular {
        a: EntityId,
        b: EntityId,
        in_plane: Option<EntityId>,
    },
    /// The angle between two lines equals `degrees`.
    Angle {
        a: EntityId,
        b: EntityId,
        in_plane: Option<EntityId>,
        degrees: f64,
    },
    /// `angle(a, b) == angle(c, d)`.
    EqualAngle {
        a: EntityId,
        b: EntityId,
        c: EntityId,
        d: EntityId,
    },
    /// A line is tangent to an arc at the arc's `start` (else `end`) point.
    ArcLineTangent {
        arc: EntityId,
        line: EntityId,
        at_start: bool,
    },
    /// A line is tangent to a cubic at its first (else last) endpoint.
    CubicLineTangent {
        cubic: EntityId,
        line: EntityId,
        at_start: bool,
        in_plane: Option<EntityId>,
    },
    /// Two lines are parallel.
    Parallel {
        a: EntityId,
        b: EntityId,
        in_plane: Option<EntityId>,
    },
    /// Annotation only; contributes no equations.
    Comment,
}

fn eval(store: &dyn Store, e: &Expr) -> f64 {
    e.eval(&|p| store.param_value(p))
}

fn eval_vec3(store: &dyn Store, v: &ExprVec3) -> Vec3 {
    Vec3::new(eval(store, &v.x), eval(store, &v.y), eval(store, &v.z))
}

/// Lift a line's direction into either world `ExprVec3` or a workplane's
/// `ExprVec2`, matched by `in_plane`.
enum Direction {
    World(ExprVec3),
    Planar(ExprVec2),
}

fn line_direction(store: &dyn Store, line: EntityId, in_plane: Option<EntityId>) -> Direction {
    match in_plane {
        None => Direction::World(line_vector_exprs(store, line)),
        Some(wp) => {
            let (p0, p1) = line_endpoints(store, line);
            let a = point_exprs_in_workplane(store, wp, p0);
            let b = point_exprs_in_workplane(store, wp, p1);
            Direction::Planar(b.minus(&a))
        }
    }
}

/// Two 3D vectors are parallel iff their cross product vanishes, but only
/// two of the three cross components are independent; the third is a
/// (possibly ill-conditioned) linear combination of the other two near the
/// pivot axis. This selects the two components away from `a`'s dominant
/// axis at the *current* seed, matching the teacher's hairy-ball workaround,
/// and fixes that pivot for the whole solve rather than re-choosing it every
/// Newton iteration (see the "open question" in the design notes).
fn vectors_parallel(store: &dyn Store, a: &ExprVec3, b: &ExprVec3) -> [Expr; 2] {
    let dominant = eval_vec3(store, a).dominant_component();
    let cross = a.cross(b);
    let axes: Vec<usize> = (0..3).filter(|&c| c != dominant).collect();
    [cross.component(axes[0]), cross.component(axes[1])]
}

/// Emit the equations for `constraint`, in sub-index order.
pub fn generate(store: &dyn Store, constraint: &Constraint) -> Vec<Expr> {
    match constraint {
        Constraint::PtPtDistance {
            a,
            b,
            in_plane,
            distance,
        } => {
            let d = Expr::constant(*distance);
            match in_plane {
                None => {
                    let diff = point_exprs(store, *b).minus(&point_exprs(store, *a));
                    vec![diff.magnitude() - d]
                }
                Some(wp) => {
                    let pa = point_exprs_in_workplane(store, *wp, *a);
                    let pb = point_exprs_in_workplane(store, *wp, *b);
                    vec![pb.minus(&pa).magnitude() - d]
                }
            }
        }

        Constraint::PtLineDistance {
            point,
            line,
            in_plane,
            distance,
        } => {
            let d = Expr::constant(*distance);
            vec![signed_point_line_distance(store, *point, *line, *in_plane) - d]
        }

        Constraint::PtPlaneDistance {
            point,
            plane,
            distance,
        } => {
            let (p, n) = face_exprs(store, *plane);
            let pt = point_exprs(store, *point);
            vec![pt.minus(&p).dot(&n) - Expr::constant(*distance)]
        }

        Constraint::PtInPlane { point, plane } => {
            let (p, n) = face_exprs(store, *plane);
            let pt = point_exprs(store, *point);
            vec![pt.minus(&p).dot(&n)]
        }

        Constraint::PtFaceDistance {
            point,
            face,
            distance,
        } => {
            let (p, n) = face_exprs(store, *face);
            let pt = point_exprs(store, *point);
            vec![pt.minus(&p).dot(&n) - Expr::constant(*distance)]
        }

        Constraint::PtOnFace { point, face } => {
            let (p, n) = face_exprs(store, *face);
            let pt = point_exprs(store, *point);
            vec![pt.minus(&p).dot(&n)]
        }

        Constraint::EqualLengthLines { a, b } => {
            vec![line_vector_exprs(store, *a).magnitude() - line_vector_exprs(store, *b).magnitude()]
        }

        Constraint::EqualPtLineDistances {
            point,
            line_a,
            line_b,
            in_plane,
        } => {
            // Distances squared, not the signed distance: the signed
            // formulation can flip sign across the two lines and falsely
            // report equality broken when it isn't.
            let da = point_line_distance_squared(store, *point, *line_a, *in_plane);
            let db = point_line_distance_squared(store, *point, *line_b, *in_plane);
            vec![da - db]
        }

        Constraint::LengthRatio { a, b, ratio } => {
            let la = line_vector_exprs(store, *a).magnitude();
            let lb = line_vector_exprs(store, *b).magnitude();
            vec![la / lb - Expr::constant(*ratio)]
        }

        Constraint::Diameter { circle, diameter } => {
            vec![Expr::constant(2.0) * radius_expr(store, *circle) - Expr::constant(*diameter)]
        }

        Constraint::EqualRadius { a, b } => vec![radius_expr(store, *a) - radius_expr(store, *b)],

        Constraint::EqualLineArcLen { line, arc } => vec![equal_line_arc_len(store, *line, *arc)],

        Constraint::PointsCoincident { a, b, in_plane } => match in_plane {
            None => {
                let pa = point_exprs(store, *a);
                let pb = point_exprs(store, *b);
                vec![pb.x - pa.x, pb.y - pa.y, pb.z - pa.z]
            }
            Some(wp) => {
                let pa = point_exprs_in_workplane(store, *wp, *a);
                let pb = point_exprs_in_workplane(store, *wp, *b);
                vec![pb.u - pa.u, pb.v - pa.v]
            }
        },

        Constraint::PtOnLine {
            point,
            line,
            in_plane,
        } => match in_plane {
            None => {
                let (p0, p1) = line_endpoints(store, *line);
                let ab = point_exprs(store, p1).minus(&point_exprs(store, p0));
                let p = point_exprs(store, *point);
                // Parallel to whichever endpoint-to-point vector is longer
                // at the seed, to dodge the degenerate (point on an
                // endpoint) case.
                let ap0 = p.minus(&point_exprs(store, p0));
                let ap1 = p.minus(&point_exprs(store, p1));
                let reference = if eval_vec3(store, &ap0).magnitude() >= eval_vec3(store, &ap1).magnitude() {
                    ap0
                } else {
                    ap1
                };
                vectors_parallel(store, &ab, &reference).to_vec()
            }
            Some(_) => vec![signed_point_line_distance(store, *point, *line, *in_plane)],
        },

        Constraint::PtOnCircle { point, circle } => {
            let center = match store.entity(*circle) {
                crate::entity::Entity::Circle { center, .. } => *center,
                crate::entity::Entity::Arc { center, .. } => *center,
                other => panic!("{circle:?} is not a circle or arc: {other:?}"),
            };
            let diff = point_exprs(store, *point).minus(&point_exprs(store, center));
            let r = radius_expr(store, *circle);
            vec![diff.magnitude_squared() - r.square()]
        }

        Constraint::AtMidpoint {
            line,
            point,
            in_plane,
        } => {
            let (p0, p1) = line_endpoints(store, *line);
            match in_plane {
                None => {
                    let mid = point_exprs(store, p0).plus(&point_exprs(store, p1)).scaled_by(Expr::constant(0.5));
                    let p = point_exprs(store, *point);
                    vec![p.x - mid.x, p.y - mid.y, p.z - mid.z]
                }
                Some(wp) => {
                    let a = point_exprs_in_workplane(store, *wp, p0);
                    let b = point_exprs_in_workplane(store, *wp, p1);
                    let mid = a.plus(&b).scaled_by(Expr::constant(0.5));
                    let p = point_exprs_in_workplane(store, *wp, *point);
                    vec![p.u - mid.u, p.v - mid.v]
                }
            }
        }

        Constraint::Symmetric {
            about_line,
            a,
            b,
            in_plane,
        } => {
            let (l0, l1) = line_endpoints(store, *about_line);
            match in_plane {
                Some(wp) => {
                    let la = point_exprs_in_workplane(store, *wp, l0);
                    let lb = point_exprs_in_workplane(store, *wp, l1);
                    let pa = point_exprs_in_workplane(store, *wp, *a);
                    let pb = point_exprs_in_workplane(store, *wp, *b);
                    let mid = pa.plus(&pb).scaled_by(Expr::constant(0.5));
                    let line_dir = lb.minus(&la);
                    let ab = pb.minus(&pa);
                    let mid_rel = mid.minus(&la);
                    vec![line_dir.cross(&ab), line_dir.cross(&mid_rel)]
                }
                None => {
                    let la = point_exprs(store, l0);
                    let lb = point_exprs(store, l1);
                    let pa = point_exprs(store, *a);
                    let pb = point_exprs(store, *b);
                    let mid = pa.plus(&pb).scaled_by(Expr::constant(0.5));
                    let line_dir = lb.minus(&la);
                    let ab = pb.minus(&pa);
                    let mid_rel = mid.minus(&la);
                    let mut eqs = vectors_parallel(store, &line_dir, &ab).to_vec();
                    eqs.push(line_dir.dot(&mid_rel));
                    eqs
                }
            }
        }

        Constraint::SymmetricHoriz { a, b, in_plane } => {
            let pa = point_exprs_in_workplane(store, *in_plane, *a);
            let pb = point_exprs_in_workplane(store, *in_plane, *b);
            vec![pb.v.clone() - pa.v.clone(), pb.u + pa.u]
        }

        Constraint::SymmetricVert { a, b, in_plane } => {
            let pa = point_exprs_in_workplane(store, *in_plane, *a);
            let pb = point_exprs_in_workplane(store, *in_plane, *b);
            vec![pb.u.clone() - pa.u.clone(), pb.v + pa.v]
        }

        Constraint::Horizontal { line, in_plane } => {
            let (p0, p1) = line_endpoints(store, *line);
            let a = point_exprs_in_workplane(store, *in_plane, p0);
            let b = point_exprs_in_workplane(store, *in_plane, p1);
            vec![b.v - a.v]
        }

        Constraint::Vertical { line, in_plane } => {
            let (p0, p1) = line_endpoints(store, *line);
            let a = point_exprs_in_workplane(store, *in_plane, p0);
            let b = point_exprs_in_workplane(store, *in_plane, p1);
            vec![b.u - a.u]
        }

        Constraint::SameOrientation { a, b } => {
            let (au, av, an) = crate::entity::normal_basis_exprs(store, *a);
            let (bu, bv, bn) = crate::entity::normal_basis_exprs(store, *b);
            let mut eqs = vectors_parallel(store, &an, &bn).to_vec();
            // A third equation is needed to pin down rotation about the
            // shared axis; pick whichever cross-axis dot product is
            // smaller in magnitude at the seed, since that one is furthest
            // from being trivially satisfied already.
            let uv = eval(store, &au.dot(&bv));
            let uu = eval(store, &au.dot(&bu));
            let _ = av;
            if uv.abs() <= uu.abs() {
                eqs.push(au.dot(&bv));
            } else {
                eqs.push(au.dot(&bu));
            }
            eqs
        }

        Constraint::Perpendicular { a, b, in_plane } => {
            vec![direction_cosine(store, *a, *b, *in_plane)]
        }

        Constraint::Angle {
            a,
            b,
            in_plane,
            degrees,
        } => {
            let target = (degrees * PI / 180.0).cos();
            vec![direction_cosine(store, *a, *b, *in_plane) - Expr::constant(target)]
        }

        Constraint::EqualAngle { a, b, c, d } => {
            let cos_ab = direction_cosine(store, *a, *b, None);
            let cos_cd = direction_cosine(store, *c, *d, None);
            vec![cos_ab - cos_cd]
        }

        Constraint::ArcLineTangent { arc, line, at_start } => {
            let (center, endpoint) = match store.entity(*arc) {
                crate::entity::Entity::Arc { center, start, end, .. } => {
                    (*center, if *at_start { *start } else { *end })
                }
                other => panic!("{arc:?} is not an arc: {other:?}"),
            };
            let dir = line_vector_exprs(store, *line);
            let radial = point_exprs(store, center).minus(&point_exprs(store, endpoint));
            vec![dir.dot(&radial)]
        }

        Constraint::CubicLineTangent {
            cubic,
            line,
            at_start,
            in_plane,
        } => {
            let (endpoint, ctrl) = if *at_start {
                (cubic_point(store, *cubic, 0), cubic_point(store, *cubic, 1))
            } else {
                (cubic_point(store, *cubic, 3), cubic_point(store, *cubic, 2))
            };
            match in_plane {
                None => {
                    let tangent = point_exprs(store, ctrl).minus(&point_exprs(store, endpoint));
                    let dir = line_vector_exprs(store, *line);
                    vectors_parallel(store, &dir, &tangent).to_vec()
                }
                Some(wp) => {
                    let tangent =
                        point_exprs_in_workplane(store, *wp, ctrl).minus(&point_exprs_in_workplane(store, *wp, endpoint));
                    let (p0, p1) = line_endpoints(store, *line);
                    let dir =
                        point_exprs_in_workplane(store, *wp, p1).minus(&point_exprs_in_workplane(store, *wp, p0));
                    vec![dir.cross(&tangent)]
                }
            }
        }

        Constraint::Parallel { a, b, in_plane } => {
            match (line_direction(store, *a, *in_plane), line_direction(store, *b, *in_plane)) {
                (Direction::World(da), Direction::World(db)) => vectors_parallel(store, &da, &db).to_vec(),
                (Direction::Planar(da), Direction::Planar(db)) => vec![da.cross(&db)],
                _ => unreachable!("both lines share the same in_plane argument"),
            }
        }

        Constraint::Comment => vec![],
    }
}

fn signed_point_line_distance(store: &dyn Store, point: EntityId, line: EntityId, in_plane: Option<EntityId>) -> Expr {
    match in_plane {
        Some(wp) => {
            let (p0, p1) = line_endpoints(store, line);
            let a = point_exprs_in_workplane(store, wp, p0);
            let b = point_exprs_in_workplane(store, wp, p1);
            let p = point_exprs_in_workplane(store, wp, point);
            let dir = b.minus(&a);
            let rel = p.minus(&a);
            dir.cross(&rel) / dir.magnitude()
        }
        None => {
            let (p0, p1) = line_endpoints(store, line);
            let a = point_exprs(store, p0);
            let b = point_exprs(store, p1);
            let p = point_exprs(store, point);
            let dir = b.minus(&a);
            let rel = p.minus(&a);
            dir.cross(&rel).magnitude() / dir.magnitude()
        }
    }
}

fn point_line_distance_squared(store: &dyn Store, point: EntityId, line: EntityId, in_plane: Option<EntityId>) -> Expr {
    match in_plane {
        Some(wp) => {
            let (p0, p1) = line_endpoints(store, line);
            let a = point_exprs_in_workplane(store, wp, p0);
            let b = point_exprs_in_workplane(store, wp, p1);
            let p = point_exprs_in_workplane(store, wp, point);
            let dir = b.minus(&a);
            let rel = p.minus(&a);
            dir.cross(&rel).square() / dir.magnitude_squared()
        }
        None => {
            let (p0, p1) = line_endpoints(store, line);
            let a = point_exprs(store, p0);
            let b = point_exprs(store, p1);
            let p = point_exprs(store, point);
            let dir = b.minus(&a);
            let rel = p.minus(&a);
            dir.cross(&rel).magnitude_squared() / dir.magnitude_squared()
        }
    }
}

pub(crate) fn direction_cosine(store: &dyn Store, a: EntityId, b: EntityId, in_plane: Option<EntityId>) -> Expr {
    match (line_direction(store, a, in_plane), line_direction(store, b, in_plane)) {
        (Direction::World(da), Direction::World(db)) => da.dot(&db) / (da.magnitude() * db.magnitude()),
        (Direction::Planar(da), Direction::Planar(db)) => da.dot(&db) / (da.magnitude() * db.magnitude()),
        _ => unreachable!("both lines share the same in_plane argument"),
    }
}

/// `r * theta - |line|`, where `theta` is the arc's numeric sweep rewritten
/// through whichever of three trig identities stays well-conditioned for
/// the current sweep size. Near a half-turn, `acos` is numerically flat
/// (its derivative blows up), so the middle bucket swaps to `asin` instead.
fn equal_line_arc_len(store: &dyn Store, line: EntityId, arc: EntityId) -> Expr {
    let (_, _, delta) = arc_sweep_numeric(store, arc);
    let (center, start, end) = match store.entity(arc) {
        crate::entity::Entity::Arc { center, start, end, .. } => (*center, *start, *end),
        other => panic!("{arc:?} is not an arc: {other:?}"),
    };
    let c = point_exprs(store, center);
    let s = point_exprs(store, start);
    let f = point_exprs(store, end);
    let r = radius_expr(store, arc);
    let cos_theta = s.minus(&c).dot(&f.minus(&c)) / r.clone().square();
    let sin_theta = s.minus(&c).cross(&f.minus(&c)).magnitude() / r.clone().square();

    let theta = if delta < 3.0 * PI / 4.0 {
        cos_theta.acos()
    } else if delta < 5.0 * PI / 4.0 {
        Expr::constant(PI) - sin_theta.asin()
    } else {
        Expr::constant(2.0 * PI) - cos_theta.acos()
    };

    let line_len = line_vector_exprs(store, line).magnitude();
    r * theta - line_len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::id::{EntityIdGenerator, GroupIdGenerator};
    use crate::store::Sketch;

    fn point(sketch: &mut Sketch, ids: &mut EntityIdGenerator, group: crate::id::GroupId, xy: (f64, f64)) -> EntityId {
        let x = sketch.push_param(xy.0);
        let y = sketch.push_param(xy.1);
        let z = sketch.push_param(0.0);
        let _ = ids.next_id();
        sketch.push_entity(Entity::Point3 { x, y, z }, group)
    }

    #[test]
    fn pt_pt_distance_residual_is_zero_when_already_satisfied() {
        let mut sketch = Sketch::new();
        let mut ids = EntityIdGenerator::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();
        let a = point(&mut sketch, &mut ids, g, (0.0, 0.0));
        let b = point(&mut sketch, &mut ids, g, (3.0, 4.0));
        let c = Constraint::PtPtDistance {
            a,
            b,
            in_plane: None,
            distance: 5.0,
        };
        let eqs = generate(&sketch, &c);
        assert_eq!(eqs.len(), 1);
        assert!((eval(&sketch, &eqs[0])).abs() < 1e-12);
    }

    #[test]
    fn points_coincident_in_3d_emits_three_equations() {
        let mut sketch = Sketch::new();
        let mut ids = EntityIdGenerator::new();
        let mut groups = GroupIdGenerator::new();
        let g = groups.next_id();
        let a = point(&mut sketch, &mut ids, g, (1.0, 2.0));
        let b = point(&mut sketch, &mut ids, g, (4.0, 5.0));
        let c = Constraint::PointsCoincident {
            a,
            b,
            in_plane: None,
        };
        let eqs = generate(&sketch, &c);
        assert_eq!(eqs.len(), 3);
    }

    #[test]
    fn vectors_parallel_picks_axes_off_the_dominant_component() {
        let mut sketch = Sketch::new();
        let x = sketch.push_param(1.0);
        let y = sketch.push_param(0.0);
        let z = sketch.push_param(0.0);
        let a = ExprVec3::new(Expr::param(x), Expr::param(y), Expr::param(z));
        let b = ExprVec3::new(Expr::constant(1.0), Expr::constant(0.0), Expr::constant(0.0));
        let eqs = vectors_parallel(&sketch, &a, &b);
        // dominant component of a=(1,0,0) is x (index 0); remaining axes are y,z.
        for e in &eqs {
            assert!((eval(&sketch, e)).abs() < 1e-12);
        }
    }
}
