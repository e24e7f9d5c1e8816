//! Core data structures for planar truss models.

use std::collections::HashMap;

use log::{debug, info};
use nalgebra::Vector2;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};

use crate::assembly::EquilibriumSystem;
use crate::errors::{AnalysisError, AssemblyError};
use crate::geometry::{angle_degrees, span, Force, Point};
use crate::results::{self, AnalysisReport, Solution, Warning};
use crate::solver::{self, Determinacy, SolverOptions};
use crate::supports::Support;

/// Internal representation of a truss joint.
#[derive(Clone, Debug)]
pub(crate) struct Joint {
    /// Unique name of the joint.
    pub(crate) name: String,
    /// Position of the joint.
    pub(crate) position: Point,
    /// Restraint applied to the joint.
    pub(crate) support: Support,
    /// External load applied to the joint.
    pub(crate) load: Force,
}

impl Joint {
    /// Create a free, unloaded joint at `position`.
    fn new(name: String, position: Point) -> Self {
        Self {
            name,
            position,
            support: Support::Free,
            load: Force::default(),
        }
    }
}

/// Internal representation of a truss member.
#[derive(Clone, Debug)]
pub(crate) struct Member {
    /// Unique name of the member.
    pub(crate) name: String,
}

/// Container for a planar pin-jointed truss model.
///
/// Joints and members are stored in declaration order, which fixes the ordering of
/// equations and unknowns whenever the truss is solved.
#[derive(Clone, Debug, Default)]
pub struct Truss {
    /// Underlying graph storage for joints and members.
    graph: Graph<Joint, Member>,
    /// Lookup from joint name to graph index.
    joint_names: HashMap<String, NodeIndex>,
    /// Lookup from member name to graph index.
    member_names: HashMap<String, EdgeIndex>,
}

impl Truss {
    /// Create an empty truss.
    ///
    /// # Examples
    /// ```
    /// use truss_statics::Truss;
    ///
    /// let truss = Truss::new();
    /// assert_eq!(truss.joint_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of joints in the truss.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of members in the truss.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Add a new, free and unloaded joint to the truss.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::DuplicateJoint`] when `name` is already taken.
    ///
    /// # Examples
    /// ```
    /// use truss_statics::{point, Truss};
    ///
    /// let mut truss = Truss::new();
    /// truss.add_joint("Left", point(0.0, 0.0)).expect("unique name");
    /// assert!(truss.add_joint("Left", point(1.0, 0.0)).is_err());
    /// assert_eq!(truss.joint_count(), 1);
    /// ```
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        position: Point,
    ) -> Result<NodeIndex, AssemblyError> {
        let name = name.into();
        if self.joint_names.contains_key(&name) {
            return Err(AssemblyError::DuplicateJoint(name));
        }
        let index = self.graph.add_node(Joint::new(name.clone(), position));
        self.joint_names.insert(name, index);
        Ok(index)
    }

    /// Connect two named joints with a new member.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::DuplicateMember`] when `name` is taken,
    /// [`AssemblyError::DanglingMember`] when either joint does not exist and
    /// [`AssemblyError::DuplicateConnection`] when another member already joins the
    /// same pair of joints.
    pub fn add_member(
        &mut self,
        name: impl Into<String>,
        start: &str,
        end: &str,
    ) -> Result<EdgeIndex, AssemblyError> {
        let name = name.into();
        if self.member_names.contains_key(&name) {
            return Err(AssemblyError::DuplicateMember(name));
        }
        let start_index = self.endpoint(&name, start)?;
        let end_index = self.endpoint(&name, end)?;
        if let Some((existing, _)) = self.graph.find_edge_undirected(start_index, end_index) {
            return Err(AssemblyError::DuplicateConnection {
                member: name,
                existing: self.graph[existing].name.clone(),
            });
        }
        let index = self.graph.add_edge(
            start_index,
            end_index,
            Member { name: name.clone() },
        );
        self.member_names.insert(name, index);
        Ok(index)
    }

    /// Resolve a member endpoint by name.
    fn endpoint(&self, member: &str, joint: &str) -> Result<NodeIndex, AssemblyError> {
        self.joint_names
            .get(joint)
            .copied()
            .ok_or_else(|| AssemblyError::DanglingMember {
                member: member.to_owned(),
                joint: joint.to_owned(),
            })
    }

    /// Set the restraint for a joint.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::UnknownJoint`] when `joint` is not part of this truss.
    pub fn set_support(&mut self, joint: &str, support: Support) -> Result<(), AssemblyError> {
        let index = self.joint_index(joint)?;
        self.graph[index].support = support;
        Ok(())
    }

    /// Apply a point load to a joint, replacing any previous load.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::UnknownJoint`] when `joint` is not part of this truss.
    pub fn set_load(&mut self, joint: &str, load: Force) -> Result<(), AssemblyError> {
        let index = self.joint_index(joint)?;
        self.graph[index].load = load;
        Ok(())
    }

    /// Resolve a joint by name.
    fn joint_index(&self, joint: &str) -> Result<NodeIndex, AssemblyError> {
        self.joint_names
            .get(joint)
            .copied()
            .ok_or_else(|| AssemblyError::UnknownJoint(joint.to_owned()))
    }

    /// Resolve a member by name.
    fn member_index(&self, member: &str) -> Result<EdgeIndex, AssemblyError> {
        self.member_names
            .get(member)
            .copied()
            .ok_or_else(|| AssemblyError::UnknownMember(member.to_owned()))
    }

    /// Names of all joints in declaration order.
    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|joint| joint.name.as_str())
    }

    /// Names of all members in declaration order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.graph.edge_weights().map(|member| member.name.as_str())
    }

    /// Position of a joint.
    #[must_use]
    pub fn joint_position(&self, joint: &str) -> Option<Point> {
        let index = self.joint_names.get(joint)?;
        Some(self.graph[*index].position)
    }

    /// Support applied to a joint.
    #[must_use]
    pub fn joint_support(&self, joint: &str) -> Option<Support> {
        let index = self.joint_names.get(joint)?;
        Some(self.graph[*index].support)
    }

    /// Load applied to a joint.
    #[must_use]
    pub fn joint_load(&self, joint: &str) -> Option<Force> {
        let index = self.joint_names.get(joint)?;
        Some(self.graph[*index].load)
    }

    /// Names of the two joints a member connects, in declaration order.
    #[must_use]
    pub fn member_endpoints(&self, member: &str) -> Option<(&str, &str)> {
        let index = self.member_names.get(member)?;
        let (start, end) = self.graph.edge_endpoints(*index)?;
        Some((self.graph[start].name.as_str(), self.graph[end].name.as_str()))
    }

    /// Sum of all applied loads.
    #[must_use]
    pub fn total_load(&self) -> Force {
        self.graph
            .node_weights()
            .fold(Vector2::zeros(), |sum, joint| sum + joint.load.to_vector())
            .into()
    }

    /// Length of a member.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DegenerateMember`] when the endpoints coincide and
    /// [`AnalysisError::Assembly`] when the member does not exist.
    ///
    /// # Examples
    /// ```
    /// use truss_statics::{point, Truss};
    ///
    /// let mut truss = Truss::new();
    /// truss.add_joint("A", point(0.0, 0.0)).unwrap();
    /// truss.add_joint("B", point(3.0, 4.0)).unwrap();
    /// truss.add_member("AB", "A", "B").unwrap();
    /// assert_eq!(truss.member_length("AB").unwrap(), 5.0);
    /// ```
    pub fn member_length(&self, member: &str) -> Result<f64, AnalysisError> {
        let edge = self.member_index(member)?;
        let (_, length) = self.member_span(edge)?;
        Ok(length)
    }

    /// Unit vector pointing from `from` along the member toward its other endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DegenerateMember`] when the endpoints coincide and
    /// [`AnalysisError::Assembly`] when the member does not exist or does not touch
    /// `from`.
    pub fn unit_direction(&self, member: &str, from: &str) -> Result<Vector2<f64>, AnalysisError> {
        let edge = self.member_index(member)?;
        let joint = self.joint_index(from)?;
        let (start, end) = self.edge_joints(edge);
        if joint != start && joint != end {
            return Err(AssemblyError::NotAnEndpoint {
                member: member.to_owned(),
                joint: from.to_owned(),
            }
            .into());
        }
        self.direction_away_from(edge, joint)
    }

    /// Orientation of a member from its first to its second endpoint, in degrees
    /// counter-clockwise from the X axis within `[0, 360)`.
    ///
    /// # Errors
    ///
    /// Same as [`Truss::member_length`].
    pub fn member_angle(&self, member: &str) -> Result<f64, AnalysisError> {
        let edge = self.member_index(member)?;
        let (delta, _) = self.member_span(edge)?;
        Ok(angle_degrees(delta))
    }

    /// Joint indices at both ends of an edge.
    pub(crate) fn edge_joints(&self, edge: EdgeIndex) -> (NodeIndex, NodeIndex) {
        // Edges are never removed, so every index handed out remains valid.
        self.graph
            .edge_endpoints(edge)
            .unwrap_or_else(|| unreachable!("edge {edge:?} belongs to this truss"))
    }

    /// Vector from the first to the second endpoint, with its length.
    pub(crate) fn member_span(&self, edge: EdgeIndex) -> Result<(Vector2<f64>, f64), AnalysisError> {
        let (start, end) = self.edge_joints(edge);
        let (delta, length) = span(self.graph[start].position, self.graph[end].position);
        if length > 0.0 && length.is_finite() {
            Ok((delta, length))
        } else {
            Err(AnalysisError::DegenerateMember {
                member: self.graph[edge].name.clone(),
                start: self.graph[start].name.clone(),
                end: self.graph[end].name.clone(),
            })
        }
    }

    /// Unit vector along `edge` pointing away from `joint`.
    pub(crate) fn direction_away_from(
        &self,
        edge: EdgeIndex,
        joint: NodeIndex,
    ) -> Result<Vector2<f64>, AnalysisError> {
        let (start, _) = self.edge_joints(edge);
        let (delta, length) = self.member_span(edge)?;
        let unit = delta / length;
        Ok(if joint == start { unit } else { -unit })
    }

    /// Whether a joint has no members, support or load.
    pub(crate) fn is_isolated(&self, joint: NodeIndex) -> bool {
        let weight = &self.graph[joint];
        self.graph.neighbors_undirected(joint).next().is_none()
            && !weight.support.is_restrained()
            && weight.load == Force::default()
    }

    /// Observations about the model that hold whether or not a solve succeeds.
    ///
    /// # Examples
    /// ```
    /// use truss_statics::{point, Truss, Warning};
    ///
    /// let mut truss = Truss::new();
    /// truss.add_joint("Spare", point(0.0, 0.0)).unwrap();
    /// assert_eq!(truss.warnings(), vec![Warning::IsolatedJoint("Spare".into())]);
    /// ```
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.graph
            .node_indices()
            .filter(|&joint| self.is_isolated(joint))
            .map(|joint| Warning::IsolatedJoint(self.graph[joint].name.clone()))
            .collect()
    }

    /// Read-only access to the underlying graph.
    pub(crate) fn graph(&self) -> &Graph<Joint, Member> {
        &self.graph
    }

    /// Assemble the joint equilibrium equations for the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DegenerateMember`] or [`AnalysisError::InvalidSupport`]
    /// when the geometry or restraints are malformed.
    pub fn assemble(&self) -> Result<EquilibriumSystem, AnalysisError> {
        EquilibriumSystem::assemble(self)
    }

    /// Solve for member forces and support reactions.
    ///
    /// Each call is independent: nothing is cached on the truss.
    ///
    /// # Errors
    ///
    /// Returns an [`AnalysisError`] describing why the structure has no unique static
    /// solution, or why the input is malformed.
    ///
    /// # Examples
    /// ```
    /// use truss_statics::{force, point, SolverOptions, Support, Truss};
    ///
    /// let mut truss = Truss::new();
    /// truss.add_joint("A", point(0.0, 0.0)).unwrap();
    /// truss.add_joint("B", point(2.0, 0.0)).unwrap();
    /// truss.add_joint("C", point(1.0, 1.0)).unwrap();
    /// truss.add_member("AB", "A", "B").unwrap();
    /// truss.add_member("BC", "B", "C").unwrap();
    /// truss.add_member("AC", "A", "C").unwrap();
    /// truss.set_support("A", Support::Pin).unwrap();
    /// truss.set_support("B", Support::roller_y()).unwrap();
    /// truss.set_load("C", force(0.0, -10.0)).unwrap();
    ///
    /// let solution = truss.solve(&SolverOptions::default()).unwrap();
    /// assert!(solution.member_force("AB").unwrap() > 0.0);
    /// assert!(solution.member_force("AC").unwrap() < 0.0);
    /// ```
    pub fn solve(&self, options: &SolverOptions) -> Result<Solution, AnalysisError> {
        let options = options.validated()?;
        let system = self.assemble()?;
        let determinacy = Determinacy::classify(
            system.member_count(),
            system.reaction_count(),
            system.equation_count(),
        );
        info!(
            "truss with {} members, {} reactions and {} equations is {determinacy:?}",
            system.member_count(),
            system.reaction_count(),
            system.equation_count()
        );
        determinacy.require_determinate(&system)?;
        let unknowns = solver::solve_system(&system, &options)?;
        let solution = results::interpret(self, &system, &unknowns, &options)?;
        debug!("solution passed the residual check at every joint");
        Ok(solution)
    }

    /// Solve the truss and fold the outcome into a status record.
    ///
    /// Model warnings are kept on the record even when the solve fails.
    #[must_use]
    pub fn analyze(&self, options: &SolverOptions) -> AnalysisReport {
        let mut report = AnalysisReport::from(self.solve(options));
        if report.error.is_some() {
            report.warnings = self.warnings();
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{force, point};

    fn triangle() -> Truss {
        let mut truss = Truss::new();
        truss.add_joint("A", point(0.0, 0.0)).expect("joint added");
        truss.add_joint("B", point(4.0, 0.0)).expect("joint added");
        truss.add_joint("C", point(0.0, 3.0)).expect("joint added");
        truss.add_member("AB", "A", "B").expect("member added");
        truss.add_member("BC", "B", "C").expect("member added");
        truss.add_member("CA", "C", "A").expect("member added");
        truss
    }

    #[test]
    fn edits_on_unknown_joints_are_rejected() {
        let mut truss = triangle();
        assert_eq!(
            truss.set_support("Z", Support::Pin),
            Err(AssemblyError::UnknownJoint("Z".into()))
        );
        assert_eq!(
            truss.set_load("Z", force(1.0, 0.0)),
            Err(AssemblyError::UnknownJoint("Z".into()))
        );
    }

    #[test]
    fn duplicate_names_and_connections_are_rejected() {
        let mut truss = triangle();
        assert_eq!(
            truss.add_joint("A", point(9.0, 9.0)),
            Err(AssemblyError::DuplicateJoint("A".into()))
        );
        assert_eq!(
            truss.add_member("AB", "A", "C"),
            Err(AssemblyError::DuplicateMember("AB".into()))
        );
        assert_eq!(
            truss.add_member("BA", "B", "A"),
            Err(AssemblyError::DuplicateConnection {
                member: "BA".into(),
                existing: "AB".into(),
            })
        );
        assert_eq!(truss.member_count(), 3);
    }

    #[test]
    fn member_geometry_queries() {
        let truss = triangle();
        assert_relative_eq!(truss.member_length("BC").expect("length"), 5.0);
        assert_relative_eq!(truss.member_angle("AB").expect("angle"), 0.0);
        assert_relative_eq!(truss.member_angle("CA").expect("angle"), 270.0);

        let from_b = truss.unit_direction("BC", "B").expect("direction");
        assert_relative_eq!(from_b.x, -0.8);
        assert_relative_eq!(from_b.y, 0.6);
        let from_c = truss.unit_direction("BC", "C").expect("direction");
        assert_relative_eq!(from_c.x, 0.8);
        assert_relative_eq!(from_c.y, -0.6);
    }

    #[test]
    fn direction_from_foreign_joint_is_rejected() {
        let truss = triangle();
        let error = truss
            .unit_direction("AB", "C")
            .expect_err("C does not touch AB");
        assert_eq!(
            error,
            AnalysisError::Assembly(AssemblyError::NotAnEndpoint {
                member: "AB".into(),
                joint: "C".into(),
            })
        );
    }

    #[test]
    fn coincident_joints_make_a_degenerate_member() {
        let mut truss = Truss::new();
        truss.add_joint("A", point(1.0, 1.0)).expect("joint added");
        truss.add_joint("B", point(1.0, 1.0)).expect("joint added");
        truss.add_member("AB", "A", "B").expect("member added");
        let error = truss.member_length("AB").expect_err("zero length");
        assert_eq!(
            error,
            AnalysisError::DegenerateMember {
                member: "AB".into(),
                start: "A".into(),
                end: "B".into(),
            }
        );
    }

    #[test]
    fn self_connected_member_is_degenerate() {
        let mut truss = Truss::new();
        truss.add_joint("A", point(0.0, 0.0)).expect("joint added");
        truss.add_member("AA", "A", "A").expect("member added");
        assert!(matches!(
            truss.member_length("AA"),
            Err(AnalysisError::DegenerateMember { .. })
        ));
    }

    #[test]
    fn total_load_sums_every_joint() {
        let mut truss = triangle();
        truss.set_load("A", force(1.0, -2.0)).expect("load applied");
        truss.set_load("C", force(-3.0, -4.0)).expect("load applied");
        assert_eq!(truss.total_load(), force(-2.0, -6.0));
    }

    #[test]
    fn right_triangle_under_point_load() {
        let mut truss = triangle();
        truss.set_support("A", Support::Pin).expect("support applied");
        truss
            .set_support("B", Support::roller_y())
            .expect("support applied");
        truss.set_load("C", force(12.0, 0.0)).expect("load applied");

        let solution = truss.solve(&SolverOptions::default()).expect("determinate");

        // Moments about A: B_y * 4 = 12 * 3.
        let reaction_b = solution.reaction("B").expect("roller reaction");
        assert_relative_eq!(reaction_b.y, 9.0, epsilon = 1.0e-9);
        let reaction_a = solution.reaction("A").expect("pin reaction");
        assert_relative_eq!(reaction_a.x, -12.0, epsilon = 1.0e-9);
        assert_relative_eq!(reaction_a.y, -9.0, epsilon = 1.0e-9);

        assert_relative_eq!(solution.member_force("BC").expect("BC"), -15.0, epsilon = 1.0e-9);
        assert_relative_eq!(solution.member_force("AB").expect("AB"), 12.0, epsilon = 1.0e-9);
        assert_relative_eq!(solution.member_force("CA").expect("CA"), 9.0, epsilon = 1.0e-9);
    }
}
