//! Advisory, non-fatal lint over a group's constraints. These never affect
//! solve control flow; they are just handed back alongside the outcome so a
//! caller's UI can flag "did you mean Parallel/Perpendicular" situations.

use crate::constraints::Constraint;
use crate::id::ConstraintId;
use crate::store::Store;

const LINT_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Warning {
    pub about_constraint: ConstraintId,
    pub content: WarningContent,
}

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
#[non_exhaustive]
pub enum WarningContent {
    /// An `Angle` constraint whose value is suspiciously close to 0/180/360
    /// degrees; the author probably meant `Parallel`.
    ShouldBeParallel { degrees: f64 },
    /// An `Angle` constraint whose value is suspiciously close to +/-90
    /// degrees; the author probably meant `Perpendicular`.
    ShouldBePerpendicular { degrees: f64 },
}

impl std::fmt::Display for WarningContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningContent::ShouldBeParallel { degrees } => {
                write!(f, "instead of constraining to an angle of {degrees} degrees, constrain to Parallel")
            }
            WarningContent::ShouldBePerpendicular { degrees } => {
                write!(f, "instead of constraining to an angle of {degrees} degrees, constrain to Perpendicular")
            }
        }
    }
}

fn nearly_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < LINT_EPSILON
}

/// Scan a group's constraints for `Angle` declarations that are nearly a
/// special case, returning advisory warnings. `store` is unused today but
/// kept in the signature since a future lint (e.g. near-degenerate
/// coincident points) will need current parameter values.
pub fn lint(_store: &dyn Store, constraints: &[(ConstraintId, &Constraint)]) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (id, constraint) in constraints {
        if let Constraint::Angle { degrees, .. } = constraint {
            if nearly_eq(*degrees, 0.0) || nearly_eq(*degrees, 180.0) || nearly_eq(*degrees, 360.0) {
                warnings.push(Warning {
                    about_constraint: *id,
                    content: WarningContent::ShouldBeParallel { degrees: *degrees },
                });
            } else if nearly_eq(*degrees, 90.0) || nearly_eq(*degrees, -90.0) {
                warnings.push(Warning {
                    about_constraint: *id,
                    content: WarningContent::ShouldBePerpendicular { degrees: *degrees },
                });
            }
        }
    }
    warnings
}
