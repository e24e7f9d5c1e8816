//! Parallel solving of independent trusses.

use rayon::prelude::*;

use crate::results::AnalysisReport;
use crate::solver::SolverOptions;
use crate::truss::Truss;

/// Solve every truss on the rayon pool, returning reports in input order.
///
/// Solves share nothing, so one failing truss never affects the others.
///
/// # Examples
/// ```
/// use truss_statics::{solve_batch, SolveStatus, SolverOptions, Truss};
///
/// let reports = solve_batch(&[Truss::new(), Truss::new()], &SolverOptions::default());
/// assert_eq!(reports.len(), 2);
/// assert!(reports.iter().all(|report| report.status == SolveStatus::Determinate));
/// ```
#[must_use]
pub fn solve_batch(trusses: &[Truss], options: &SolverOptions) -> Vec<AnalysisReport> {
    trusses
        .par_iter()
        .map(|truss| truss.analyze(options))
        .collect()
}
