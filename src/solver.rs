//! Determinacy classification and the direct linear solve.

use log::debug;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::assembly::EquilibriumSystem;
use crate::errors::AnalysisError;

/// Default relative tolerance for pivots, residuals and zero-force members.
pub const DEFAULT_TOLERANCE: f64 = 1.0e-9;

/// Numerical settings for a solve.
///
/// # Examples
/// ```
/// use truss_statics::SolverOptions;
///
/// let options: SolverOptions = serde_json::from_str(r#"{"tolerance": 1e-6}"#).unwrap();
/// assert_eq!(options.tolerance, 1e-6);
/// assert_eq!(SolverOptions::default().tolerance, 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Relative tolerance. Pivots at or below `tolerance * ||A||` mark a mechanism.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SolverOptions {
    /// Create options with an explicit tolerance.
    #[must_use]
    pub const fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Return a copy of the options after checking they are usable.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidTolerance`] when the tolerance is not a positive,
    /// finite number.
    pub fn validated(&self) -> Result<Self, AnalysisError> {
        if self.tolerance.is_finite() && self.tolerance > 0.0 {
            Ok(*self)
        } else {
            Err(AnalysisError::InvalidTolerance(self.tolerance))
        }
    }
}

/// Classification of a truss by the counting rule `M + R` versus `2J`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Determinacy {
    /// Fewer unknowns than equations.
    Unstable,
    /// As many unknowns as equations.
    Determinate,
    /// More unknowns than equations.
    Indeterminate,
}

impl Determinacy {
    /// Compare the unknown count against the number of equilibrium equations.
    ///
    /// # Examples
    /// ```
    /// use truss_statics::Determinacy;
    ///
    /// assert_eq!(Determinacy::classify(7, 3, 10), Determinacy::Determinate);
    /// assert_eq!(Determinacy::classify(6, 3, 10), Determinacy::Unstable);
    /// assert_eq!(Determinacy::classify(7, 4, 10), Determinacy::Indeterminate);
    /// ```
    #[must_use]
    pub fn classify(members: usize, reactions: usize, equations: usize) -> Self {
        match (members + reactions).cmp(&equations) {
            std::cmp::Ordering::Less => Self::Unstable,
            std::cmp::Ordering::Equal => Self::Determinate,
            std::cmp::Ordering::Greater => Self::Indeterminate,
        }
    }

    /// Turn a non-determinate classification into the matching error.
    pub(crate) fn require_determinate(self, system: &EquilibriumSystem) -> Result<(), AnalysisError> {
        let members = system.member_count();
        let reactions = system.reaction_count();
        let equations = system.equation_count();
        match self {
            Self::Determinate => Ok(()),
            Self::Unstable => Err(AnalysisError::UnstableStructure {
                members,
                reactions,
                equations,
            }),
            Self::Indeterminate => Err(AnalysisError::IndeterminateStructure {
                members,
                reactions,
                equations,
            }),
        }
    }
}

/// Solve the square equilibrium system by LU decomposition with partial pivoting.
///
/// A pivot at or below `tolerance * ||A||` means the counting rule passed but the
/// geometry still admits a mechanism.
pub(crate) fn solve_system(
    system: &EquilibriumSystem,
    options: &SolverOptions,
) -> Result<DVector<f64>, AnalysisError> {
    let matrix = system.matrix();
    if matrix.nrows() == 0 {
        return Ok(DVector::zeros(0));
    }
    let threshold = options.tolerance * matrix.norm();
    let lu = matrix.clone().lu();
    let upper = lu.u();
    for (column, pivot) in upper.diagonal().iter().enumerate() {
        if pivot.abs() <= threshold {
            let unknown = system.unknown_labels()[column].clone();
            debug!("pivot {pivot:e} for {unknown} is below {threshold:e}");
            return Err(AnalysisError::GeometricallyUnstable {
                unknown,
                pivot: pivot.abs(),
            });
        }
    }
    lu.solve(system.rhs())
        .ok_or_else(|| AnalysisError::GeometricallyUnstable {
            unknown: "equilibrium matrix".to_owned(),
            pivot: 0.0,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_rule_boundaries() {
        assert_eq!(Determinacy::classify(0, 0, 0), Determinacy::Determinate);
        assert_eq!(Determinacy::classify(0, 2, 2), Determinacy::Determinate);
        assert_eq!(Determinacy::classify(3, 2, 6), Determinacy::Unstable);
        assert_eq!(Determinacy::classify(3, 4, 6), Determinacy::Indeterminate);
    }

    #[test]
    fn tolerance_must_be_positive_and_finite() {
        for tolerance in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let error = SolverOptions::with_tolerance(tolerance)
                .validated()
                .expect_err("unusable tolerance rejected");
            assert!(matches!(error, AnalysisError::InvalidTolerance(_)));
        }
        assert!(SolverOptions::with_tolerance(1.0e-6).validated().is_ok());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options: SolverOptions = serde_json::from_str("{}").expect("parses");
        assert_eq!(options, SolverOptions::default());
    }
}
