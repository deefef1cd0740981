//! Numeric and symbolic vectors.
//!
//! Two flavors live here, matching the teacher's split between "numbers I
//! already know" and "numbers the solver will find": [`Vec2`]/[`Vec3`] hold
//! plain `f64` components (used to make numeric decisions at construction
//! time — which pivot component to use, which arc-sweep branch applies —
//! from the *current* seed values), while [`ExprVec2`]/[`ExprVec3`] hold
//! [`Expr`] components and compose the same dot/cross/magnitude vocabulary
//! symbolically, for use by the constraint generator.

use crate::expr::Expr;

/// A plain 2D numeric vector, e.g. a point's current `(u, v)` at the seed
/// values the solver starts from.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub(crate) struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[inline(always)]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline(always)]
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline(always)]
    pub fn dot(&self, rhs: &Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    #[inline(always)]
    pub fn euclidean_distance(self, rhs: Self) -> f64 {
        (self - rhs).magnitude()
    }

    /// <https://stackoverflow.com/questions/243945/calculating-a-2d-vectors-cross-product>
    #[inline(always)]
    pub fn cross_2d(&self, rhs: &Self) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }
}

impl std::ops::Sub<Self> for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// A plain 3D numeric vector.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub(crate) struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline(always)]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    #[inline(always)]
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline(always)]
    pub fn dot(&self, rhs: &Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline(always)]
    pub fn cross(&self, rhs: &Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    /// The component with the largest absolute value: 0 = x, 1 = y, 2 = z.
    /// Used to choose a stable pivot when only two of three cross-product
    /// components actually constrain a "parallel" relationship.
    pub fn dominant_component(&self) -> usize {
        let ax = self.x.abs();
        let ay = self.y.abs();
        let az = self.z.abs();
        if ax >= ay && ax >= az {
            0
        } else if ay >= az {
            1
        } else {
            2
        }
    }
}

impl std::ops::Sub<Self> for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

/// A 2-component expression vector, e.g. a point's `(u, v)` in a workplane.
#[derive(Clone, Debug)]
pub struct ExprVec2 {
    pub u: Expr,
    pub v: Expr,
}

impl ExprVec2 {
    pub fn new(u: Expr, v: Expr) -> Self {
        Self { u, v }
    }

    pub fn dot(&self, rhs: &Self) -> Expr {
        self.u.clone() * rhs.u.clone() + self.v.clone() * rhs.v.clone()
    }

    /// The (scalar) 2D cross product `u0*v1 - v0*u1`.
    pub fn cross(&self, rhs: &Self) -> Expr {
        self.u.clone() * rhs.v.clone() - self.v.clone() * rhs.u.clone()
    }

    pub fn magnitude_squared(&self) -> Expr {
        self.dot(self)
    }

    pub fn magnitude(&self) -> Expr {
        self.magnitude_squared().sqrt()
    }

    pub fn minus(&self, rhs: &Self) -> Self {
        Self::new(self.u.clone() - rhs.u.clone(), self.v.clone() - rhs.v.clone())
    }

    pub fn plus(&self, rhs: &Self) -> Self {
        Self::new(self.u.clone() + rhs.u.clone(), self.v.clone() + rhs.v.clone())
    }

    pub fn scaled_by(&self, s: Expr) -> Self {
        Self::new(self.u.clone() * s.clone(), self.v.clone() * s)
    }
}

/// A 3-component expression vector, e.g. a point's `(x, y, z)` in world space.
#[derive(Clone, Debug)]
pub struct ExprVec3 {
    pub x: Expr,
    pub y: Expr,
    pub z: Expr,
}

impl ExprVec3 {
    pub fn new(x: Expr, y: Expr, z: Expr) -> Self {
        Self { x, y, z }
    }

    pub fn component(&self, i: usize) -> Expr {
        match i {
            0 => self.x.clone(),
            1 => self.y.clone(),
            2 => self.z.clone(),
            _ => panic!("vector only has 3 components"),
        }
    }

    pub fn dot(&self, rhs: &Self) -> Expr {
        self.x.clone() * rhs.x.clone() + self.y.clone() * rhs.y.clone() + self.z.clone() * rhs.z.clone()
    }

    pub fn cross(&self, rhs: &Self) -> Self {
        Self::new(
            self.y.clone() * rhs.z.clone() - self.z.clone() * rhs.y.clone(),
            self.z.clone() * rhs.x.clone() - self.x.clone() * rhs.z.clone(),
            self.x.clone() * rhs.y.clone() - self.y.clone() * rhs.x.clone(),
        )
    }

    pub fn magnitude_squared(&self) -> Expr {
        self.dot(self)
    }

    pub fn magnitude(&self) -> Expr {
        self.magnitude_squared().sqrt()
    }

    pub fn minus(&self, rhs: &Self) -> Self {
        Self::new(
            self.x.clone() - rhs.x.clone(),
            self.y.clone() - rhs.y.clone(),
            self.z.clone() - rhs.z.clone(),
        )
    }

    pub fn plus(&self, rhs: &Self) -> Self {
        Self::new(
            self.x.clone() + rhs.x.clone(),
            self.y.clone() + rhs.y.clone(),
            self.z.clone() + rhs.z.clone(),
        )
    }

    pub fn scaled_by(&self, s: Expr) -> Self {
        Self::new(self.x.clone() * s.clone(), self.y.clone() * s.clone(), self.z.clone() * s)
    }

    /// Rescale to have the given (expression-valued) magnitude, assuming
    /// the current magnitude is nonzero.
    pub fn with_magnitude(&self, target: Expr) -> Self {
        self.scaled_by(target / self.magnitude())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry() {
        assert_eq!(Vec2::new(-1.0, 0.0).euclidean_distance(Vec2::new(2.0, 4.0)), 5.0);
        assert_eq!(Vec2::new(1.0, 2.0).dot(&Vec2::new(4.0, -5.0)), 4.0 - 10.0);
        assert_eq!(Vec2::new(1.0, 0.0).cross_2d(&Vec2::new(0.0, 1.0)), 1.0);
        assert_eq!(Vec2::new(0.0, 1.0).cross_2d(&Vec2::new(1.0, 0.0)), -1.0);
        assert_eq!(Vec2::new(2.0, 2.0).cross_2d(&Vec2::new(4.0, 4.0)), 0.0);
        assert_eq!(Vec2::new(3.0, 4.0).cross_2d(&Vec2::new(5.0, 6.0)), -2.0);
    }

    #[test]
    fn vec3_cross_of_unit_axes_gives_the_third_axis() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        let z = x.cross(&y);
        assert_eq!((z.x, z.y, z.z), (0.0, 0.0, 1.0));
    }

    #[test]
    fn vec3_dominant_component_picks_largest_magnitude_axis() {
        assert_eq!(Vec3::new(5.0, 1.0, -2.0).dominant_component(), 0);
        assert_eq!(Vec3::new(1.0, -5.0, 2.0).dominant_component(), 1);
        assert_eq!(Vec3::new(1.0, 2.0, -5.0).dominant_component(), 2);
    }

    #[test]
    fn expr_vec3_cross_matches_numeric_cross_at_eval_time() {
        use crate::id::ParamIdGenerator;
        let mut gen = ParamIdGenerator::new();
        let ax = gen.next_id();
        let ay = gen.next_id();
        let az = gen.next_id();
        let a = ExprVec3::new(Expr::param(ax), Expr::param(ay), Expr::param(az));
        let b = ExprVec3::new(Expr::constant(0.0), Expr::constant(1.0), Expr::constant(0.0));
        let c = a.cross(&b);
        let lookup = |p: crate::id::ParamId| {
            if p == ax {
                2.0
            } else if p == ay {
                3.0
            } else if p == az {
                4.0
            } else {
                unreachable!()
            }
        };
        let expected = Vec3::new(2.0, 3.0, 4.0).cross(&Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(c.x.eval(&lookup), expected.x);
        assert_eq!(c.y.eval(&lookup), expected.y);
        assert_eq!(c.z.eval(&lookup), expected.z);
    }
}
