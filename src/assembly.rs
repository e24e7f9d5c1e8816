//! Assembly of the joint equilibrium equations.
//!
//! Every active joint contributes two rows (force balance along X then Y). Columns
//! hold one axial force per member in declaration order, followed by the reaction
//! components of each supported joint in declaration order.

use std::collections::HashMap;

use log::{debug, warn};
use nalgebra::{DMatrix, DVector, Vector2};
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::errors::AnalysisError;
use crate::truss::Truss;

/// A single scalar unknown in the equilibrium system.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Unknown {
    /// Axial force in a member, positive in tension.
    MemberForce(EdgeIndex),
    /// Magnitude of one reaction component at a supported joint.
    Reaction {
        /// Joint carrying the reaction.
        joint: NodeIndex,
        /// Position of the component within the joint's support.
        component: usize,
        /// Unit line of action of the component.
        direction: Vector2<f64>,
    },
}

impl Unknown {
    /// Human readable description used in diagnostics.
    fn describe(&self, truss: &Truss) -> String {
        let graph = truss.graph();
        match *self {
            Self::MemberForce(edge) => format!("axial force in member {}", graph[edge].name),
            Self::Reaction {
                joint, component, ..
            } => {
                let name = &graph[joint].name;
                if graph[joint].support.reaction_count() == 1 {
                    format!("roller reaction at joint {name}")
                } else if component == 0 {
                    format!("x reaction at joint {name}")
                } else {
                    format!("y reaction at joint {name}")
                }
            }
        }
    }
}

/// Linear system `A x = b` relating member forces and reactions to applied loads.
#[derive(Clone, Debug)]
pub struct EquilibriumSystem {
    /// Coefficients of the unknowns in each equilibrium equation.
    matrix: DMatrix<f64>,
    /// Negated applied loads.
    rhs: DVector<f64>,
    /// Unknowns in column order.
    unknowns: Vec<Unknown>,
    /// Description of each unknown in column order.
    labels: Vec<String>,
    /// Joints contributing equations, in row-pair order.
    joints: Vec<NodeIndex>,
    /// Names of joints left out because they carry nothing.
    isolated: Vec<String>,
    /// Number of member force unknowns.
    member_count: usize,
    /// Number of reaction unknowns.
    reaction_count: usize,
}

impl EquilibriumSystem {
    /// Build the equilibrium equations for `truss`.
    pub(crate) fn assemble(truss: &Truss) -> Result<Self, AnalysisError> {
        let graph = truss.graph();

        for edge in graph.edge_indices() {
            truss.member_span(edge)?;
        }

        let mut joints = Vec::with_capacity(graph.node_count());
        let mut isolated = Vec::new();
        for node in graph.node_indices() {
            if truss.is_isolated(node) {
                let name = &graph[node].name;
                warn!(
                    "joint {name} has no members, support or load; leaving it out of the equilibrium equations"
                );
                isolated.push(name.clone());
            } else {
                joints.push(node);
            }
        }
        let row_of: HashMap<NodeIndex, usize> = joints
            .iter()
            .enumerate()
            .map(|(idx, node)| (*node, idx * 2))
            .collect();

        let mut unknowns: Vec<Unknown> = graph.edge_indices().map(Unknown::MemberForce).collect();
        let member_count = unknowns.len();
        for &node in &joints {
            let directions = graph[node].support.reaction_directions().ok_or_else(|| {
                AnalysisError::InvalidSupport {
                    joint: graph[node].name.clone(),
                }
            })?;
            for (component, direction) in directions.into_iter().enumerate() {
                unknowns.push(Unknown::Reaction {
                    joint: node,
                    component,
                    direction,
                });
            }
        }
        let reaction_count = unknowns.len() - member_count;

        let rows = joints.len() * 2;
        let mut matrix = DMatrix::zeros(rows, unknowns.len());
        for (column, unknown) in unknowns.iter().enumerate() {
            match *unknown {
                Unknown::MemberForce(edge) => {
                    let (start, end) = truss.edge_joints(edge);
                    for joint in [start, end] {
                        let direction = truss.direction_away_from(edge, joint)?;
                        let row = row_of[&joint];
                        matrix[(row, column)] += direction.x;
                        matrix[(row + 1, column)] += direction.y;
                    }
                }
                Unknown::Reaction {
                    joint, direction, ..
                } => {
                    let row = row_of[&joint];
                    matrix[(row, column)] += direction.x;
                    matrix[(row + 1, column)] += direction.y;
                }
            }
        }

        let mut rhs = DVector::zeros(rows);
        for &node in &joints {
            let row = row_of[&node];
            let load = graph[node].load;
            rhs[row] = -load.x;
            rhs[row + 1] = -load.y;
        }

        let labels = unknowns.iter().map(|unknown| unknown.describe(truss)).collect();
        debug!(
            "assembled {rows} equilibrium equations in {} unknowns",
            unknowns.len()
        );

        Ok(Self {
            matrix,
            rhs,
            unknowns,
            labels,
            joints,
            isolated,
            member_count,
            reaction_count,
        })
    }

    /// Coefficient matrix `A`.
    #[must_use]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Right-hand side `b`, the negated applied loads.
    #[must_use]
    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// Description of each unknown in column order.
    #[must_use]
    pub fn unknown_labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of equilibrium equations, twice the number of active joints.
    #[must_use]
    pub fn equation_count(&self) -> usize {
        self.joints.len() * 2
    }

    /// Number of member force unknowns.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.member_count
    }

    /// Number of reaction unknowns.
    #[must_use]
    pub fn reaction_count(&self) -> usize {
        self.reaction_count
    }

    /// Names of joints with no members, support or load.
    #[must_use]
    pub fn isolated_joints(&self) -> &[String] {
        &self.isolated
    }

    /// Unknowns in column order.
    pub(crate) fn unknowns(&self) -> &[Unknown] {
        &self.unknowns
    }

    /// Joints contributing equations, in row-pair order.
    pub(crate) fn active_joints(&self) -> &[NodeIndex] {
        &self.joints
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{force, point, Direction};
    use crate::supports::Support;

    fn loaded_triangle() -> Truss {
        let mut truss = Truss::new();
        truss.add_joint("A", point(0.0, 0.0)).expect("joint added");
        truss.add_joint("B", point(2.0, 0.0)).expect("joint added");
        truss.add_joint("C", point(1.0, 1.0)).expect("joint added");
        truss.add_member("AB", "A", "B").expect("member added");
        truss.add_member("BC", "B", "C").expect("member added");
        truss.add_member("AC", "A", "C").expect("member added");
        truss.set_support("A", Support::Pin).expect("support applied");
        truss
            .set_support("B", Support::roller_y())
            .expect("support applied");
        truss.set_load("C", force(3.0, -10.0)).expect("load applied");
        truss
    }

    #[test]
    fn columns_follow_declaration_order() {
        let system = loaded_triangle().assemble().expect("assembles");
        assert_eq!(
            system.unknown_labels(),
            [
                "axial force in member AB",
                "axial force in member BC",
                "axial force in member AC",
                "x reaction at joint A",
                "y reaction at joint A",
                "roller reaction at joint B",
            ]
        );
        assert_eq!(system.matrix().shape(), (6, 6));
        assert_eq!(system.member_count(), 3);
        assert_eq!(system.reaction_count(), 3);
    }

    #[test]
    fn member_columns_point_away_from_each_joint() {
        let system = loaded_triangle().assemble().expect("assembles");
        let matrix = system.matrix();
        // Member AB at joint A (rows 0-1) points +X, at joint B (rows 2-3) points -X.
        assert_relative_eq!(matrix[(0, 0)], 1.0);
        assert_relative_eq!(matrix[(2, 0)], -1.0);
        // Member AC at joint C (rows 4-5) points back toward A.
        let half = 0.5_f64.sqrt();
        assert_relative_eq!(matrix[(4, 2)], -half);
        assert_relative_eq!(matrix[(5, 2)], -half);
        // The roller at B acts along Y only.
        assert_relative_eq!(matrix[(2, 5)], 0.0);
        assert_relative_eq!(matrix[(3, 5)], 1.0);
    }

    #[test]
    fn rhs_holds_negated_loads() {
        let system = loaded_triangle().assemble().expect("assembles");
        assert_eq!(system.rhs().as_slice(), [0.0, 0.0, 0.0, 0.0, -3.0, 10.0]);
    }

    #[test]
    fn isolated_unloaded_joint_is_left_out() {
        let mut truss = loaded_triangle();
        truss.add_joint("Lonely", point(5.0, 5.0)).expect("joint added");
        let system = truss.assemble().expect("assembles");
        assert_eq!(system.equation_count(), 6);
        assert_eq!(system.isolated_joints(), ["Lonely"]);
    }

    #[test]
    fn isolated_loaded_joint_keeps_its_equations() {
        let mut truss = loaded_triangle();
        truss.add_joint("Lonely", point(5.0, 5.0)).expect("joint added");
        truss.set_load("Lonely", force(0.0, -1.0)).expect("load applied");
        let system = truss.assemble().expect("assembles");
        assert_eq!(system.equation_count(), 8);
        assert!(system.isolated_joints().is_empty());
    }

    #[test]
    fn degenerate_roller_is_rejected() {
        let mut truss = loaded_triangle();
        truss
            .set_support(
                "B",
                Support::Roller {
                    direction: Direction::new(0.0, 0.0),
                },
            )
            .expect("support applied");
        let error = truss.assemble().expect_err("roller direction is degenerate");
        assert_eq!(error, AnalysisError::InvalidSupport { joint: "B".into() });
    }
}
