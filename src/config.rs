//! Tunable constants for the numerical contract, gathered into one `Copy`
//! struct so a solve call takes them explicitly rather than reading a
//! global. `Config::default()` matches the stable values named in the
//! external interface: changing them changes convergence behavior, not
//! correctness, so callers doing e.g. precision-sensitive CAM work can
//! tighten them without forking the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Magnitude tolerance used by the Gram-Schmidt rank test. Rows (or
    /// residual components) below this are treated as already-zero.
    pub rank_tolerance: f64,
    /// Per-equation residual tolerance for declaring Newton iteration
    /// converged.
    pub convergence_tolerance: f64,
    /// Pivots in the Gaussian elimination step below this magnitude are
    /// treated as singular.
    pub pivot_floor: f64,
    /// Maximum number of Newton iterations before giving up.
    pub max_iterations: usize,
    /// Least-squares column scale applied to parameters underlying the
    /// currently dragged entity, so large intentional motions in it aren't
    /// fought by the rest of the system.
    pub dragged_column_scale: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rank_tolerance: 1e-4,
            convergence_tolerance: 1e-10,
            pivot_floor: 1e-20,
            max_iterations: 50,
            dragged_column_scale: 1.0 / 20.0,
        }
    }
}
