//! Error types produced while building or solving trusses.

use thiserror::Error;

use crate::results::SolveStatus;

/// Error returned when a truss solve fails.
///
/// Every variant names the joint, member or counts responsible so callers can report
/// something actionable. None of them are retried; a solve is deterministic.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when a member spans zero distance.
    #[error("member {member} has zero length (joints {start} and {end} coincide)")]
    DegenerateMember {
        /// Name of the offending member.
        member: String,
        /// First endpoint of the member.
        start: String,
        /// Second endpoint of the member.
        end: String,
    },
    /// Returned when a roller restraint direction has no usable orientation.
    #[error("joint {joint} has a roller support with a degenerate restraint direction")]
    InvalidSupport {
        /// Name of the offending joint.
        joint: String,
    },
    /// Returned when the structure itself is malformed.
    #[error("invalid truss definition: {0}")]
    Assembly(#[from] AssemblyError),
    /// Returned when there are fewer unknowns than equilibrium equations.
    #[error(
        "structure is unstable: {members} members + {reactions} reactions < {equations} equilibrium equations"
    )]
    UnstableStructure {
        /// Number of members.
        members: usize,
        /// Number of reaction components.
        reactions: usize,
        /// Number of equilibrium equations (twice the active joint count).
        equations: usize,
    },
    /// Returned when there are more unknowns than equilibrium equations.
    #[error(
        "structure is statically indeterminate: {members} members + {reactions} reactions > {equations} equilibrium equations"
    )]
    IndeterminateStructure {
        /// Number of members.
        members: usize,
        /// Number of reaction components.
        reactions: usize,
        /// Number of equilibrium equations (twice the active joint count).
        equations: usize,
    },
    /// Returned when the counting rule passes but the equilibrium matrix is singular.
    #[error("structure is a mechanism: pivot for {unknown} collapsed to {pivot:e}")]
    GeometricallyUnstable {
        /// Description of the unknown whose pivot vanished.
        unknown: String,
        /// Magnitude of the offending pivot.
        pivot: f64,
    },
    /// Returned when the solved forces fail to balance a joint.
    #[error("residual check failed at joint {joint}: {residual:e} exceeds tolerance {tolerance:e}")]
    ResidualCheckFailed {
        /// Name of the joint that is out of balance.
        joint: String,
        /// Magnitude of the out-of-balance force.
        residual: f64,
        /// Tolerance the residual was compared against.
        tolerance: f64,
    },
    /// Returned when the solver options are not usable.
    #[error("solver tolerance must be positive and finite (received {0})")]
    InvalidTolerance(f64),
}

impl AnalysisError {
    /// Classify the error into the status reported to downstream consumers.
    ///
    /// # Examples
    /// ```
    /// use truss_statics::{AnalysisError, SolveStatus};
    ///
    /// let error = AnalysisError::UnstableStructure { members: 1, reactions: 2, equations: 4 };
    /// assert_eq!(error.status(), SolveStatus::Unstable);
    /// ```
    #[must_use]
    pub const fn status(&self) -> SolveStatus {
        match self {
            Self::UnstableStructure { .. } => SolveStatus::Unstable,
            Self::IndeterminateStructure { .. } => SolveStatus::Indeterminate,
            Self::GeometricallyUnstable { .. } => SolveStatus::GeometricInstability,
            Self::DegenerateMember { .. }
            | Self::InvalidSupport { .. }
            | Self::Assembly(_)
            | Self::ResidualCheckFailed { .. }
            | Self::InvalidTolerance(_) => SolveStatus::Error,
        }
    }
}

/// Error returned when a truss is built from inconsistent records.
///
/// # Examples
///
/// ```
/// use truss_statics::{point, AssemblyError, Truss};
///
/// let mut truss = Truss::new();
/// truss.add_joint("A", point(0.0, 0.0)).expect("first joint");
/// let error = truss
///     .add_member("AB", "A", "B")
///     .expect_err("dangling reference is rejected");
/// assert_eq!(
///     error,
///     AssemblyError::DanglingMember { member: "AB".into(), joint: "B".into() }
/// );
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    /// Returned when a member references a joint that does not exist.
    #[error("member {member} references unknown joint {joint}")]
    DanglingMember {
        /// Name of the member.
        member: String,
        /// Name of the missing joint.
        joint: String,
    },
    /// Returned when a support, load or query targets a joint that does not exist.
    #[error("joint {0} does not exist in this truss")]
    UnknownJoint(String),
    /// Returned when a query targets a member that does not exist.
    #[error("member {0} does not exist in this truss")]
    UnknownMember(String),
    /// Returned when a direction is requested from a joint the member does not touch.
    #[error("joint {joint} is not an endpoint of member {member}")]
    NotAnEndpoint {
        /// Name of the member.
        member: String,
        /// Name of the joint.
        joint: String,
    },
    /// Returned when two joints share a name.
    #[error("joint name {0} is already in use")]
    DuplicateJoint(String),
    /// Returned when two members share a name.
    #[error("member name {0} is already in use")]
    DuplicateMember(String),
    /// Returned when two members connect the same pair of joints.
    #[error("member {member} duplicates the connection made by member {existing}")]
    DuplicateConnection {
        /// Name of the rejected member.
        member: String,
        /// Name of the member already spanning the same joints.
        existing: String,
    },
}

/// Error returned when an input file cannot be parsed.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    /// Returned when a keyword line has too few fields.
    #[error("line {line}: `{keyword}` expects {expected} fields")]
    MissingField {
        /// 1-based line number.
        line: usize,
        /// Keyword of the offending line.
        keyword: String,
        /// Number of fields expected after the keyword.
        expected: usize,
    },
    /// Returned when a numeric field cannot be read.
    #[error("line {line}: `{value}` is not a valid number")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// Rejected text.
        value: String,
    },
    /// Returned when a support line names an unrecognised kind.
    #[error("line {line}: unknown support kind `{kind}`")]
    UnknownSupportKind {
        /// 1-based line number.
        line: usize,
        /// Rejected support kind.
        kind: String,
    },
    /// Returned when a node name is declared twice.
    #[error("line {line}: node {name} is declared more than once")]
    DuplicateNode {
        /// 1-based line number.
        line: usize,
        /// Repeated node name.
        name: String,
    },
    /// Returned when a link name is declared twice.
    #[error("line {line}: link {name} is declared more than once")]
    DuplicateLink {
        /// 1-based line number.
        line: usize,
        /// Repeated link name.
        name: String,
    },
    /// Returned when a support or load refers to an undeclared node.
    #[error("line {line}: node {name} is not declared")]
    UnknownNode {
        /// 1-based line number.
        line: usize,
        /// Missing node name.
        name: String,
    },
    /// Returned when a material limit is negative.
    #[error("line {line}: material limits must be non-negative (received {value})")]
    NegativeMaterial {
        /// 1-based line number.
        line: usize,
        /// Rejected value.
        value: f64,
    },
    /// Returned when the static factor is zero or negative.
    #[error("line {line}: static factor must be positive (received {value})")]
    NonPositiveStaticFactor {
        /// 1-based line number.
        line: usize,
        /// Rejected value.
        value: f64,
    },
}
