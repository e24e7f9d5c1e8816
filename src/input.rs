//! Record-level description of a truss as handed over by a parser.

use serde::{Deserialize, Serialize};

use crate::errors::AssemblyError;
use crate::geometry::{Force, Point};
use crate::supports::Support;
use crate::truss::Truss;

/// Material limits passed through to stress checks; never read by the solver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Ultimate tensile strength.
    pub ultimate_strength: f64,
    /// Yield strength.
    pub yield_strength: f64,
    /// Modulus of elasticity.
    pub elastic_modulus: f64,
}

/// One joint as declared in the input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointRecord {
    /// Unique joint name.
    pub name: String,
    /// Position of the joint.
    pub position: Point,
    /// Restraint, free when omitted.
    #[serde(default)]
    pub support: Support,
    /// Applied load, zero when omitted.
    #[serde(default)]
    pub load: Force,
}

impl JointRecord {
    /// A free, unloaded joint.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            position,
            support: Support::Free,
            load: Force::default(),
        }
    }
}

/// One member as declared in the input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Unique member name.
    pub name: String,
    /// Name of the first joint.
    pub start: String,
    /// Name of the second joint.
    pub end: String,
}

impl MemberRecord {
    /// Member joining `start` and `end`.
    #[must_use]
    pub fn new(name: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Everything an input file describes about one truss.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrussInput {
    /// Free-form title.
    #[serde(default)]
    pub title: Option<String>,
    /// Material limits, if declared.
    #[serde(default)]
    pub material: Option<Material>,
    /// Required safety margin, if declared.
    #[serde(default)]
    pub static_factor: Option<f64>,
    /// Joints in declaration order.
    #[serde(default)]
    pub joints: Vec<JointRecord>,
    /// Members in declaration order.
    #[serde(default)]
    pub members: Vec<MemberRecord>,
}

impl TrussInput {
    /// Build a [`Truss`] from the records, preserving declaration order.
    ///
    /// # Errors
    ///
    /// Returns an [`AssemblyError`] for duplicate names, duplicate connections or
    /// members that reference undeclared joints.
    ///
    /// # Examples
    /// ```
    /// use truss_statics::{point, AssemblyError, JointRecord, MemberRecord, TrussInput};
    ///
    /// let input = TrussInput {
    ///     joints: vec![JointRecord::new("A", point(0.0, 0.0))],
    ///     members: vec![MemberRecord::new("AB", "A", "B")],
    ///     ..TrussInput::default()
    /// };
    /// assert_eq!(
    ///     input.build().unwrap_err(),
    ///     AssemblyError::DanglingMember { member: "AB".into(), joint: "B".into() }
    /// );
    /// ```
    pub fn build(&self) -> Result<Truss, AssemblyError> {
        let mut truss = Truss::new();
        for joint in &self.joints {
            truss.add_joint(joint.name.clone(), joint.position)?;
            truss.set_support(&joint.name, joint.support)?;
            truss.set_load(&joint.name, joint.load)?;
        }
        for member in &self.members {
            truss.add_member(member.name.clone(), &member.start, &member.end)?;
        }
        Ok(truss)
    }
}
