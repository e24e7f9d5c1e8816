//! Interpretation of solved unknowns as member forces and support reactions.

use std::fmt;

use nalgebra::{DVector, Vector2};
use serde::Serialize;

use crate::assembly::{EquilibriumSystem, Unknown};
use crate::errors::AnalysisError;
use crate::geometry::Force;
use crate::solver::SolverOptions;
use crate::truss::Truss;

/// Outcome classification reported to downstream consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    /// The structure is statically determinate and was solved.
    Determinate,
    /// Too few members and reactions to hold the joints in place.
    Unstable,
    /// More unknowns than equilibrium can resolve.
    Indeterminate,
    /// Counting-determinate, but the geometry forms a mechanism.
    GeometricInstability,
    /// The input is malformed or an internal consistency check failed.
    Error,
}

/// Whether a member is being stretched or squashed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AxialState {
    /// Positive axial force.
    Tension,
    /// Negative axial force.
    Compression,
    /// Force indistinguishable from zero.
    ZeroForce,
}

/// Solved axial force in one member.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemberForce {
    /// Name of the member.
    pub member: String,
    /// Axial force, positive in tension.
    pub force: f64,
    /// Tension/compression classification of `force`.
    pub state: AxialState,
}

/// Solved reaction at one supported joint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reaction {
    /// Name of the joint.
    pub joint: String,
    /// Reaction force applied by the support to the joint.
    pub force: Force,
}

/// Non-fatal observations made while solving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Warning {
    /// A joint had no members, support or load and was ignored.
    IsolatedJoint(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsolatedJoint(joint) => write!(
                f,
                "joint {joint} has no members, support or load and was left out"
            ),
        }
    }
}

/// Member forces and reactions of a determinate truss.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Solution {
    /// Member forces in member declaration order.
    pub member_forces: Vec<MemberForce>,
    /// Reactions in joint declaration order, supported joints only.
    pub reactions: Vec<Reaction>,
    /// Non-fatal observations.
    pub warnings: Vec<Warning>,
}

impl Solution {
    /// Axial force in the named member.
    #[must_use]
    pub fn member_force(&self, member: &str) -> Option<f64> {
        self.member_forces
            .iter()
            .find(|entry| entry.member == member)
            .map(|entry| entry.force)
    }

    /// Reaction at the named joint.
    #[must_use]
    pub fn reaction(&self, joint: &str) -> Option<Force> {
        self.reactions
            .iter()
            .find(|entry| entry.joint == joint)
            .map(|entry| entry.force)
    }

    /// Sum of all reaction forces.
    #[must_use]
    pub fn total_reaction(&self) -> Force {
        self.reactions
            .iter()
            .fold(Vector2::zeros(), |sum, entry| sum + entry.force.to_vector())
            .into()
    }
}

/// Status record produced for every solve, successful or not.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Outcome classification.
    pub status: SolveStatus,
    /// Member forces, empty unless the solve succeeded.
    pub member_forces: Vec<MemberForce>,
    /// Reactions, empty unless the solve succeeded.
    pub reactions: Vec<Reaction>,
    /// Non-fatal observations.
    pub warnings: Vec<Warning>,
    /// Description of the failure, if any.
    pub error: Option<String>,
}

impl From<Result<Solution, AnalysisError>> for AnalysisReport {
    fn from(value: Result<Solution, AnalysisError>) -> Self {
        match value {
            Ok(solution) => Self {
                status: SolveStatus::Determinate,
                member_forces: solution.member_forces,
                reactions: solution.reactions,
                warnings: solution.warnings,
                error: None,
            },
            Err(error) => Self {
                status: error.status(),
                member_forces: Vec::new(),
                reactions: Vec::new(),
                warnings: Vec::new(),
                error: Some(error.to_string()),
            },
        }
    }
}

/// Map the solved unknowns back onto the truss and re-check joint equilibrium.
pub(crate) fn interpret(
    truss: &Truss,
    system: &EquilibriumSystem,
    unknowns: &DVector<f64>,
    options: &SolverOptions,
) -> Result<Solution, AnalysisError> {
    let graph = truss.graph();
    let joint_count = graph.node_count();
    let mut reaction_sums: Vec<Option<Vector2<f64>>> = vec![None; joint_count];
    let mut member_values = Vec::with_capacity(system.member_count());

    for (unknown, value) in system.unknowns().iter().zip(unknowns.iter()) {
        match *unknown {
            Unknown::MemberForce(edge) => member_values.push((edge, *value)),
            Unknown::Reaction {
                joint, direction, ..
            } => {
                let sum = reaction_sums[joint.index()].get_or_insert_with(Vector2::zeros);
                *sum += direction * *value;
            }
        }
    }

    let scale = member_values
        .iter()
        .map(|(_, value)| value.abs())
        .chain(reaction_sums.iter().flatten().map(|sum| sum.amax()))
        .chain(graph.node_weights().map(|joint| joint.load.to_vector().amax()))
        .fold(0.0_f64, f64::max);
    let limit = options.tolerance * scale;

    // Re-balance every joint straight from the geometry rather than the matrix.
    let mut balance: Vec<Vector2<f64>> = graph
        .node_weights()
        .map(|joint| joint.load.to_vector())
        .collect();
    for (node, sum) in reaction_sums.iter().enumerate() {
        if let Some(sum) = sum {
            balance[node] += sum;
        }
    }
    for &(edge, value) in &member_values {
        let (start, end) = truss.edge_joints(edge);
        for joint in [start, end] {
            balance[joint.index()] += truss.direction_away_from(edge, joint)? * value;
        }
    }
    for &node in system.active_joints() {
        let residual = balance[node.index()].norm();
        if residual.is_nan() || residual > limit {
            return Err(AnalysisError::ResidualCheckFailed {
                joint: graph[node].name.clone(),
                residual,
                tolerance: limit,
            });
        }
    }

    let member_forces = member_values
        .into_iter()
        .map(|(edge, force)| {
            let state = if force.abs() <= limit {
                AxialState::ZeroForce
            } else if force > 0.0 {
                AxialState::Tension
            } else {
                AxialState::Compression
            };
            MemberForce {
                member: graph[edge].name.clone(),
                force,
                state,
            }
        })
        .collect();

    let reactions = graph
        .node_indices()
        .filter_map(|node| {
            reaction_sums[node.index()].map(|sum| Reaction {
                joint: graph[node].name.clone(),
                force: sum.into(),
            })
        })
        .collect();

    let warnings = system
        .isolated_joints()
        .iter()
        .map(|name| Warning::IsolatedJoint(name.clone()))
        .collect();

    Ok(Solution {
        member_forces,
        reactions,
        warnings,
    })
}
