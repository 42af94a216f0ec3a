use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use super::types::Transform;
use crate::error::{DynamicsError, Result};
use crate::utils::spatial::{SpatialInertia, SpatialTransform, SpatialVec};

/// Type of joint connecting a link to its parent in reduced coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JointType {
    /// 1-DOF Rotational joint.
    Revolute { axis: DVec3 },
    /// 1-DOF Translational joint.
    Prismatic { axis: DVec3 },
    /// 0-DOF Rigid connection.
    Fixed,
}

impl JointType {
    /// Returns the number of degrees of freedom for this joint type.
    pub fn dofs(&self) -> usize {
        match self {
            JointType::Revolute { .. } | JointType::Prismatic { .. } => 1,
            JointType::Fixed => 0,
        }
    }

    /// Coordinate transform across the joint for the joint coordinate `q`.
    pub fn transform(&self, q: f64) -> SpatialTransform {
        match self {
            JointType::Revolute { axis } => SpatialTransform::from_axis_angle(*axis, q),
            JointType::Prismatic { axis } => SpatialTransform::from_translation(*axis * q),
            JointType::Fixed => SpatialTransform::IDENTITY,
        }
    }

    /// Motion subspace S of a 1-DOF joint, `None` for fixed joints.
    pub fn motion_subspace(&self) -> Option<SpatialVec> {
        match self {
            JointType::Revolute { axis } => Some(SpatialVec::new(*axis, DVec3::ZERO)),
            JointType::Prismatic { axis } => Some(SpatialVec::new(DVec3::ZERO, *axis)),
            JointType::Fixed => None,
        }
    }

    fn axis(&self) -> Option<DVec3> {
        match self {
            JointType::Revolute { axis } | JointType::Prismatic { axis } => Some(*axis),
            JointType::Fixed => None,
        }
    }
}

/// A single node in the articulated body tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    /// Index of the parent link. None if this link hangs off the fixed base.
    pub parent_idx: Option<usize>,
    /// The joint connecting this link to its parent.
    pub joint_type: JointType,
    /// The offset of the joint coordinate in q / qd / tau.
    pub q_offset: usize,
    /// Static placement of the joint frame in the parent link frame (at q=0).
    pub parent_to_joint: Transform,
    /// Mass properties expressed in this link's frame.
    pub inertia: SpatialInertia,
}

impl Link {
    pub fn new(name: &str, parent: Option<usize>, joint: JointType) -> Self {
        Self {
            name: name.into(),
            parent_idx: parent,
            joint_type: joint,
            q_offset: 0,
            parent_to_joint: Transform::default(),
            inertia: SpatialInertia::default(),
        }
    }

    pub fn with_parent_to_joint(mut self, pose: Transform) -> Self {
        self.parent_to_joint = pose;
        self
    }

    pub fn with_inertia(mut self, inertia: SpatialInertia) -> Self {
        self.inertia = inertia;
        self
    }

    /// Transform from the parent link frame into this link's frame at joint coordinate `q`.
    ///
    /// `q` is ignored for fixed joints.
    pub fn parent_transform(&self, q: f64) -> SpatialTransform {
        self.joint_type
            .transform(q)
            .compose(&SpatialTransform::from_pose(&self.parent_to_joint))
    }
}

/// A kinematic tree of links for reduced-coordinate dynamics.
///
/// The tree is immutable once handed to a dynamics model; joint state is
/// passed to the algorithms per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Multibody {
    /// Links ordered such that a parent always appears before its children.
    pub links: Vec<Link>,
    /// Total degrees of freedom across all joints.
    pub total_dofs: usize,
}

impl Multibody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link to the multibody and assigns its DOF offset.
    pub fn add_link(&mut self, mut link: Link) -> Result<usize> {
        let idx = self.links.len();
        if let Some(parent) = link.parent_idx {
            if parent >= idx {
                return Err(DynamicsError::invalid_model(format!(
                    "link '{}' references parent {parent}, which is not added yet",
                    link.name
                )));
            }
        }
        if let Some(axis) = link.joint_type.axis() {
            if !axis.is_finite() || (axis.length() - 1.0).abs() > 1e-9 {
                return Err(DynamicsError::invalid_model(format!(
                    "link '{}' has a non-unit joint axis {axis}",
                    link.name
                )));
            }
        }
        if link.inertia.mass.is_nan() || link.inertia.mass < 0.0 {
            return Err(DynamicsError::invalid_model(format!(
                "link '{}' has invalid mass {}",
                link.name, link.inertia.mass
            )));
        }

        link.q_offset = self.total_dofs;
        self.total_dofs += link.joint_type.dofs();
        self.links.push(link);
        Ok(idx)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.name == name)
    }

    /// Joint coordinate of a link, 0 for fixed joints.
    pub(crate) fn coordinate(link: &Link, values: &[f64]) -> f64 {
        if link.joint_type.dofs() == 0 {
            0.0
        } else {
            values[link.q_offset]
        }
    }

    /// Parent-to-link transforms for every link at configuration `q`.
    pub fn parent_transforms(&self, q: &[f64]) -> Vec<SpatialTransform> {
        self.links
            .iter()
            .map(|link| link.parent_transform(Self::coordinate(link, q)))
            .collect()
    }

    /// Pose of every link frame in the base frame at configuration `q`.
    pub fn link_poses(&self, q: &[f64]) -> Vec<Transform> {
        let mut poses: Vec<Transform> = Vec::with_capacity(self.links.len());
        for link in &self.links {
            let joint_pose = match link.joint_type {
                JointType::Revolute { axis } => {
                    Transform::from_rotation(DQuat::from_axis_angle(axis, Self::coordinate(link, q)))
                }
                JointType::Prismatic { axis } => {
                    Transform::from_translation(axis * Self::coordinate(link, q))
                }
                JointType::Fixed => Transform::default(),
            };
            let local = link.parent_to_joint.combine(&joint_pose);
            let pose = match link.parent_idx {
                Some(p_idx) => poses[p_idx].combine(&local),
                None => local,
            };
            poses.push(pose);
        }
        poses
    }
}
