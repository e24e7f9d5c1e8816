#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

mod assembly;
mod batch;
mod errors;
mod geometry;
mod input;
mod parser;
mod report;
mod results;
mod solver;
mod supports;
mod truss;

pub use assembly::EquilibriumSystem;
pub use batch::solve_batch;
pub use errors::{AnalysisError, AssemblyError, ParseError};
pub use geometry::{force, point, Direction, Force, Point};
pub use input::{JointRecord, Material, MemberRecord, TrussInput};
pub use parser::parse_truss;
pub use report::render_report;
pub use results::{AnalysisReport, AxialState, MemberForce, Reaction, SolveStatus, Solution, Warning};
pub use solver::{Determinacy, SolverOptions, DEFAULT_TOLERANCE};
pub use supports::Support;
pub use truss::Truss;
