//! A persistent symbolic expression DAG over [`ParamId`]s.
//!
//! The teacher's `equations.rs` built expressions as boxed closures that
//! carried their own derivative alongside their value. That's a fine shape
//! for a flat scalar-calculator but it can't be substituted into, walked for
//! dependency queries, or cheaply tested for which parameters it touches —
//! all things the constraint generator and the substitution pass need. This
//! module keeps the same "build up an expression from constants and named
//! variables, combine with operator overloads, ask for a derivative" feel,
//! but backs it with an immutable, reference-counted tree so that
//! substitution and differentiation can return fresh, structurally-shared
//! trees instead of re-evaluating a closure.

use std::f64::consts::PI;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

use crate::id::{ParamId, RawId};

/// Number of buckets in the cheap "which parameters does this expression
/// touch" bloom filter. A prime keeps the modulo distribution reasonably
/// even; 61 is the value the contract fixes.
const BLOOM_MODULUS: RawId = 61;

fn bloom_bit(p: ParamId) -> u64 {
    1u64 << (p.raw() % BLOOM_MODULUS)
}

#[derive(Debug)]
enum Node {
    Constant(f64),
    Param(ParamId),
    Neg(Expr),
    Square(Expr),
    Sqrt(Expr),
    Sin(Expr),
    Cos(Expr),
    Asin(Expr),
    Acos(Expr),
    Plus(Expr, Expr),
    Minus(Expr, Expr),
    Times(Expr, Expr),
    Divide(Expr, Expr),
}

#[derive(Debug)]
struct Inner {
    node: Node,
    bloom: u64,
}

/// A node in the expression DAG. Cheap to clone (it's a reference-counted
/// pointer); every operation returns a new `Expr` rather than mutating one.
#[derive(Clone, Debug)]
pub struct Expr(Rc<Inner>);

/// The result of asking an expression which parameters (from some set of
/// interest) it mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencedParams {
    /// The expression is constant with respect to every parameter asked about.
    None,
    /// Exactly one parameter is mentioned.
    One(ParamId),
    /// More than one parameter is mentioned.
    Many,
}

impl Expr {
    fn new(node: Node, bloom: u64) -> Self {
        Expr(Rc::new(Inner { node, bloom }))
    }

    /// A constant value.
    pub fn constant(v: f64) -> Self {
        Self::new(Node::Constant(v), 0)
    }

    /// A reference to a single parameter.
    pub fn param(p: ParamId) -> Self {
        Self::new(Node::Param(p), bloom_bit(p))
    }

    fn as_constant(&self) -> Option<f64> {
        match self.0.node {
            Node::Constant(v) => Some(v),
            _ => None,
        }
    }

    fn is_constant(&self, v: f64) -> bool {
        self.as_constant() == Some(v)
    }

    /// 61-bit bloom of parameters this expression mentions: bit `k` is set
    /// if some referenced parameter's raw id is congruent to `k` mod 61.
    /// A zero result over a tested parameter's bit means it is definitely
    /// absent; a set bit only means it might be present.
    pub fn params_bloom(&self) -> u64 {
        self.0.bloom
    }

    /// Evaluate the expression, looking up each parameter's current value
    /// via `value_of`. Division by zero and out-of-domain trig propagate as
    /// `NaN`, per the domain-error convention (no panics, no traps).
    pub fn eval(&self, value_of: &dyn Fn(ParamId) -> f64) -> f64 {
        match &self.0.node {
            Node::Constant(v) => *v,
            Node::Param(p) => value_of(*p),
            Node::Neg(a) => -a.eval(value_of),
            Node::Square(a) => {
                let v = a.eval(value_of);
                v * v
            }
            Node::Sqrt(a) => libm::sqrt(a.eval(value_of)),
            Node::Sin(a) => libm::sin(a.eval(value_of)),
            Node::Cos(a) => libm::cos(a.eval(value_of)),
            Node::Asin(a) => libm::asin(a.eval(value_of)),
            Node::Acos(a) => libm::acos(a.eval(value_of)),
            Node::Plus(a, b) => a.eval(value_of) + b.eval(value_of),
            Node::Minus(a, b) => a.eval(value_of) - b.eval(value_of),
            Node::Times(a, b) => a.eval(value_of) * b.eval(value_of),
            Node::Divide(a, b) => a.eval(value_of) / b.eval(value_of),
        }
    }

    /// Whether the expression's bloom filter rules out mentioning `p`. A
    /// `false` result is a proof of absence; a `true` result only means the
    /// caller should fall back to [`Expr::depends_on`] for a definitive
    /// answer.
    pub fn might_depend_on(&self, p: ParamId) -> bool {
        self.0.bloom & bloom_bit(p) != 0
    }

    /// Exact dependency test: does this expression mention `p` anywhere?
    pub fn depends_on(&self, p: ParamId) -> bool {
        if !self.might_depend_on(p) {
            return false;
        }
        match &self.0.node {
            Node::Constant(_) => false,
            Node::Param(q) => *q == p,
            Node::Neg(a) | Node::Square(a) | Node::Sqrt(a) | Node::Sin(a) | Node::Cos(a) | Node::Asin(a) | Node::Acos(a) => {
                a.depends_on(p)
            }
            Node::Plus(a, b) | Node::Minus(a, b) | Node::Times(a, b) | Node::Divide(a, b) => {
                a.depends_on(p) || b.depends_on(p)
            }
        }
    }

    /// Walk the tree collecting distinct parameters, stopping early once two
    /// distinct ones have been seen (since only `None`/`One`/`Many` matter
    /// to callers).
    pub fn referenced_params(&self) -> ReferencedParams {
        let mut found: Option<ParamId> = None;
        let mut many = false;
        self.collect_params(&mut found, &mut many);
        if many {
            ReferencedParams::Many
        } else if let Some(p) = found {
            ReferencedParams::One(p)
        } else {
            ReferencedParams::None
        }
    }

    fn collect_params(&self, found: &mut Option<ParamId>, many: &mut bool) {
        if *many {
            return;
        }
        match &self.0.node {
            Node::Constant(_) => {}
            Node::Param(p) => match found {
                None => *found = Some(*p),
                Some(existing) if *existing == *p => {}
                Some(_) => *many = true,
            },
            Node::Neg(a) | Node::Square(a) | Node::Sqrt(a) | Node::Sin(a) | Node::Cos(a) | Node::Asin(a) | Node::Acos(a) => {
                a.collect_params(found, many)
            }
            Node::Plus(a, b) | Node::Minus(a, b) | Node::Times(a, b) | Node::Divide(a, b) => {
                a.collect_params(found, many);
                b.collect_params(found, many);
            }
        }
    }

    /// Like [`Expr::referenced_params`], but restricted to the given set of
    /// "still unknown" parameters — used by the solver to ask "how many
    /// outstanding unknowns does this equation have", ignoring parameters
    /// that have already been substituted away or solved.
    pub fn referenced_among(&self, candidates: &[ParamId]) -> ReferencedParams {
        let mut found: Option<ParamId> = None;
        for &p in candidates {
            if self.depends_on(p) {
                match found {
                    None => found = Some(p),
                    Some(existing) if existing == p => {}
                    Some(_) => return ReferencedParams::Many,
                }
            }
        }
        match found {
            None => ReferencedParams::None,
            Some(p) => ReferencedParams::One(p),
        }
    }

    /// If this expression is exactly `param(a) - param(b)` for two distinct
    /// parameters, return `(a, b)`. Used by the substitution pass to spot
    /// trivial equality constraints worth eliminating a variable over.
    pub fn as_param_difference(&self) -> Option<(ParamId, ParamId)> {
        match &self.0.node {
            Node::Minus(a, b) => match (&a.0.node, &b.0.node) {
                (Node::Param(p), Node::Param(q)) if p != q => Some((*p, *q)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Substitute every reference to `a` with a reference to `b`, returning
    /// a freshly built (but maximally shared) tree. Subtrees that provably
    /// don't mention `a` (per the bloom) are returned unchanged.
    pub fn substitute(&self, a: ParamId, b: ParamId) -> Expr {
        if !self.might_depend_on(a) {
            return self.clone();
        }
        match &self.0.node {
            Node::Constant(_) => self.clone(),
            Node::Param(p) => {
                if *p == a {
                    Expr::param(b)
                } else {
                    self.clone()
                }
            }
            Node::Neg(x) => -x.substitute(a, b),
            Node::Square(x) => x.substitute(a, b).square(),
            Node::Sqrt(x) => x.substitute(a, b).sqrt(),
            Node::Sin(x) => x.substitute(a, b).sin(),
            Node::Cos(x) => x.substitute(a, b).cos(),
            Node::Asin(x) => x.substitute(a, b).asin(),
            Node::Acos(x) => x.substitute(a, b).acos(),
            Node::Plus(x, y) => x.substitute(a, b) + y.substitute(a, b),
            Node::Minus(x, y) => x.substitute(a, b) - y.substitute(a, b),
            Node::Times(x, y) => x.substitute(a, b) * y.substitute(a, b),
            Node::Divide(x, y) => x.substitute(a, b) / y.substitute(a, b),
        }
    }

    /// Symbolic partial derivative with respect to `p`, with constant
    /// folding applied to the result. Short-circuits to the constant zero
    /// expression whenever the bloom proves `p` cannot appear.
    pub fn partial_wrt(&self, p: ParamId) -> Expr {
        if !self.might_depend_on(p) {
            return Expr::constant(0.0);
        }
        match &self.0.node {
            Node::Constant(_) => Expr::constant(0.0),
            Node::Param(q) => Expr::constant(if *q == p { 1.0 } else { 0.0 }),
            Node::Neg(a) => -a.partial_wrt(p),
            Node::Square(a) => Expr::constant(2.0) * a.clone() * a.partial_wrt(p),
            Node::Sqrt(a) => a.partial_wrt(p) / (Expr::constant(2.0) * a.clone().sqrt()),
            Node::Sin(a) => a.clone().cos() * a.partial_wrt(p),
            Node::Cos(a) => -(a.clone().sin() * a.partial_wrt(p)),
            Node::Asin(a) => {
                a.partial_wrt(p) / (Expr::constant(1.0) - a.clone().square()).sqrt()
            }
            Node::Acos(a) => {
                -(a.partial_wrt(p) / (Expr::constant(1.0) - a.clone().square()).sqrt())
            }
            Node::Plus(a, b) => a.partial_wrt(p) + b.partial_wrt(p),
            Node::Minus(a, b) => a.partial_wrt(p) - b.partial_wrt(p),
            Node::Times(a, b) => a.clone() * b.partial_wrt(p) + b.clone() * a.partial_wrt(p),
            Node::Divide(a, b) => {
                (a.partial_wrt(p) * b.clone() - b.partial_wrt(p) * a.clone()) / b.clone().square()
            }
        }
    }

    /// `self.square()`, i.e. `self * self`, using a dedicated node so the
    /// derivative rule can apply the power rule directly instead of the
    /// (equivalent but noisier) product rule.
    pub fn square(self) -> Expr {
        if let Some(v) = self.as_constant() {
            return Expr::constant(v * v);
        }
        let bloom = self.0.bloom;
        Expr::new(Node::Square(self), bloom)
    }

    /// Square root.
    pub fn sqrt(self) -> Expr {
        if let Some(v) = self.as_constant() {
            return Expr::constant(libm::sqrt(v));
        }
        let bloom = self.0.bloom;
        Expr::new(Node::Sqrt(self), bloom)
    }

    /// Sine.
    pub fn sin(self) -> Expr {
        if let Some(v) = self.as_constant() {
            return Expr::constant(libm::sin(v));
        }
        let bloom = self.0.bloom;
        Expr::new(Node::Sin(self), bloom)
    }

    /// Cosine.
    pub fn cos(self) -> Expr {
        if let Some(v) = self.as_constant() {
            return Expr::constant(libm::cos(v));
        }
        let bloom = self.0.bloom;
        Expr::new(Node::Cos(self), bloom)
    }

    /// Arcsine.
    pub fn asin(self) -> Expr {
        if let Some(v) = self.as_constant() {
            return Expr::constant(libm::asin(v));
        }
        let bloom = self.0.bloom;
        Expr::new(Node::Asin(self), bloom)
    }

    /// Arccosine.
    pub fn acos(self) -> Expr {
        if let Some(v) = self.as_constant() {
            return Expr::constant(libm::acos(v));
        }
        let bloom = self.0.bloom;
        Expr::new(Node::Acos(self), bloom)
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        if let Some(v) = self.as_constant() {
            return Expr::constant(-v);
        }
        if let Node::Neg(inner) = &self.0.node {
            return inner.clone();
        }
        let bloom = self.0.bloom;
        Expr::new(Node::Neg(self), bloom)
    }
}

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        if self.is_constant(0.0) {
            return rhs;
        }
        if rhs.is_constant(0.0) {
            return self;
        }
        if let (Some(a), Some(b)) = (self.as_constant(), rhs.as_constant()) {
            return Expr::constant(a + b);
        }
        let bloom = self.0.bloom | rhs.0.bloom;
        Expr::new(Node::Plus(self, rhs), bloom)
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        if rhs.is_constant(0.0) {
            return self;
        }
        if let (Some(a), Some(b)) = (self.as_constant(), rhs.as_constant()) {
            return Expr::constant(a - b);
        }
        let bloom = self.0.bloom | rhs.0.bloom;
        Expr::new(Node::Minus(self, rhs), bloom)
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        if self.is_constant(0.0) || rhs.is_constant(0.0) {
            return Expr::constant(0.0);
        }
        if self.is_constant(1.0) {
            return rhs;
        }
        if rhs.is_constant(1.0) {
            return self;
        }
        if let (Some(a), Some(b)) = (self.as_constant(), rhs.as_constant()) {
            return Expr::constant(a * b);
        }
        let bloom = self.0.bloom | rhs.0.bloom;
        Expr::new(Node::Times(self, rhs), bloom)
    }
}

impl Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        if rhs.is_constant(1.0) {
            return self;
        }
        if let (Some(a), Some(b)) = (self.as_constant(), rhs.as_constant()) {
            return Expr::constant(a / b);
        }
        let bloom = self.0.bloom | rhs.0.bloom;
        Expr::new(Node::Divide(self, rhs), bloom)
    }
}

/// `atan2(y, x)`, used by the arc-angle computation in the entity layer.
/// Not an `Expr` node: arcs only need its *numeric* value (to pick a
/// sweep-angle branch), never its derivative, so it is a free function
/// rather than part of the symbolic DAG.
pub fn atan2(y: f64, x: f64) -> f64 {
    libm::atan2(y, x)
}

/// Wrap an angle (radians) into `(-PI, PI]`, matching the teacher's
/// `wrap_angle_delta` helper.
pub fn wrap_angle(theta: f64) -> f64 {
    let mut t = theta % (2.0 * PI);
    if t > PI {
        t -= 2.0 * PI;
    } else if t <= -PI {
        t += 2.0 * PI;
    }
    t
}
