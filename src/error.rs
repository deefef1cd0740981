//! Structural errors: malformed input that stops a solve before it can even
//! start. Numerical failure (inconsistent constraints, non-convergence) is
//! *not* represented here — it is ordinary data carried by a successfully
//! returned [`crate::solve_outcome::SolveReport`], per the "errors are data"
//! design: a solve call that gets far enough to assemble a system always
//! returns `Ok`.

use crate::id::GroupId;

/// All errors that can stop a solve before a system is even assembled.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A group was requested that has no constraints or entities.
    #[error("group {0:?} is empty")]
    EmptyGroup(GroupId),
}
