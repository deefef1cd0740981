//! Dense Gauss-Newton step over a small, hand-rolled linear-algebra kernel:
//! build the symbolic Jacobian once, re-evaluate it numerically each
//! iteration, solve the normal equations `(A Aᵀ) z = b` by Gaussian
//! elimination with partial pivoting, and recover the minimum-norm step
//! `x = Aᵀ z`.
//!
//! Column scaling (the teacher's own `dragged_column_scale`, generalized
//! from "the one point being dragged" to "every parameter that entity
//! owns") is folded into `A` before the Gram matrix is formed, and then
//! applied a second time when the step is recovered, so a dragged column's
//! contribution to the fit is damped twice: once in how much the normal
//! equations let it pull the residual down, once in how far the resulting
//! step actually moves it.

use crate::config::Config;
use crate::expr::Expr;
use crate::id::ParamId;
use crate::solve_outcome::SolveStatus;
use crate::store::Store;

use super::Model;

/// A symbolic Jacobian over a fixed row/column selection: `row_exprs[i]` is
/// equation `i`'s residual, `partials[i][j]` is its derivative with respect
/// to `cols[j]` (already constant-folded; structurally zero if the bloom
/// filter proves the row can't depend on that column).
struct Jacobian {
    cols: Vec<ParamId>,
    row_exprs: Vec<Expr>,
    partials: Vec<Vec<Expr>>,
}

impl Jacobian {
    fn build(model: &Model, rows: &[usize], cols: &[ParamId]) -> Self {
        let row_exprs: Vec<Expr> = rows.iter().map(|&i| model.equations[i].expr.clone()).collect();
        let partials = row_exprs
            .iter()
            .map(|row| {
                cols.iter()
                    .map(|&c| {
                        if row.might_depend_on(c) {
                            row.partial_wrt(c)
                        } else {
                            Expr::constant(0.0)
                        }
                    })
                    .collect()
            })
            .collect();
        Jacobian {
            cols: cols.to_vec(),
            row_exprs,
            partials,
        }
    }

    fn eval_residual(&self, store: &dyn Store) -> Vec<f64> {
        self.row_exprs.iter().map(|e| e.eval(&|p| store.param_value(p))).collect()
    }

    fn eval_partials(&self, store: &dyn Store) -> Vec<Vec<f64>> {
        self.partials
            .iter()
            .map(|row| row.iter().map(|e| e.eval(&|p| store.param_value(p))).collect())
            .collect()
    }
}

/// Gaussian elimination with partial pivoting for a square system `a x = b`.
/// `a` is consumed (used as scratch). Returns `None` if a pivot's magnitude
/// falls below `pivot_floor`, the Jacobian-is-singular signal.
fn gaussian_eliminate(mut a: Vec<Vec<f64>>, mut b: Vec<f64>, pivot_floor: f64) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n).max_by(|&i, &j| a[i][col].abs().partial_cmp(&a[j][col].abs()).unwrap())?;
        if a[pivot_row][col].abs() < pivot_floor {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);
        let pivot = a[col][col];
        for row in (col + 1)..n {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in (row + 1)..n {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

/// One damped Gauss-Newton step, repeated until every row's residual is
/// within `config.convergence_tolerance` or `config.max_iterations` is
/// exhausted. `rows`/`cols` select which equations and parameters this call
/// is responsible for (the alone pass calls this with a single row and a
/// single column; the main pass calls it with everything still free).
pub(super) fn solve_newton(
    model: &Model,
    store: &mut dyn Store,
    cols: &[ParamId],
    rows: &[usize],
    config: &Config,
) -> Result<usize, SolveStatus> {
    if rows.is_empty() {
        return Ok(0);
    }
    let jac = Jacobian::build(model, rows, cols);
    let scale: Vec<f64> = cols
        .iter()
        .map(|c| if model.dragged.contains(c) { config.dragged_column_scale } else { 1.0 })
        .collect();

    for iteration in 0..config.max_iterations {
        let residual = jac.eval_residual(store);
        if residual.iter().all(|r| r.abs() < config.convergence_tolerance) {
            return Ok(iteration);
        }

        let a = jac.eval_partials(store);
        let m = rows.len();
        let n = cols.len();
        let a_scaled: Vec<Vec<f64>> = a
            .iter()
            .map(|row| row.iter().zip(&scale).map(|(v, s)| v * s).collect())
            .collect();

        let mut gram = vec![vec![0.0; m]; m];
        for i in 0..m {
            for j in 0..m {
                gram[i][j] = (0..n).map(|k| a_scaled[i][k] * a_scaled[j][k]).sum();
            }
        }

        let z = gaussian_eliminate(gram, residual.clone(), config.pivot_floor).ok_or(SolveStatus::SingularJacobian)?;

        let mut step = vec![0.0; n];
        for j in 0..n {
            let raw: f64 = (0..m).map(|i| a_scaled[i][j] * z[i]).sum();
            step[j] = raw * scale[j];
        }
        if step.iter().any(|v| v.is_nan()) {
            return Err(SolveStatus::DidntConverge);
        }

        for (j, &p) in cols.iter().enumerate() {
            let current = store.param_value(p);
            store.set_param_value(p, current - step[j]);
        }
    }

    let residual = jac.eval_residual(store);
    if residual.iter().all(|r| r.abs() < config.convergence_tolerance) {
        Ok(config.max_iterations)
    } else {
        Err(SolveStatus::DidntConverge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_eliminate_solves_a_diagonal_system() {
        let a = vec![vec![2.0, 0.0], vec![0.0, 4.0]];
        let b = vec![6.0, 8.0];
        let x = gaussian_eliminate(a, b, 1e-12).unwrap();
        assert!((x[0] - 3.0).abs() < 1e-9);
        assert!((x[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn gaussian_eliminate_detects_a_singular_matrix() {
        let a = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let b = vec![2.0, 2.0];
        assert!(gaussian_eliminate(a, b, 1e-9).is_none());
    }

    #[test]
    fn gaussian_eliminate_needs_partial_pivoting_to_avoid_a_zero_pivot() {
        let a = vec![vec![0.0, 1.0], vec![1.0, 1.0]];
        let b = vec![2.0, 3.0];
        let x = gaussian_eliminate(a, b, 1e-12).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9);
        assert!((x[1] - 2.0).abs() < 1e-9);
    }
}
