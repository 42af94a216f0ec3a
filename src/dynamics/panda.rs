//! Franka Emika Panda: 7 revolute joints, 14-dimensional state, 7 joint torques.
//!
//! Kinematics follow Franka's modified Denavit-Hartenberg table. Inertial
//! parameters are the identified link masses, centers of mass and inertia
//! tensors (about the COM, in each link frame) used by the MuJoCo Panda model.
//! The state is `[q1..q7, qd1..qd7]` and the control is `[tau1..tau7]`.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{DQuat, DVec3};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::{ArticulatedDynamics, Dimensions, Dynamics};
use crate::config::{DynamicsConfig, PANDA_CONTROL_DIM, PANDA_DOFS, PANDA_STATE_DIM};
use crate::core::articulations::{JointType, Link, Multibody};
use crate::core::types::Transform;
use crate::error::{check_finite, check_len, Result, VectorKind};
use crate::utils::math::inertia_tensor;
use crate::utils::spatial::SpatialInertia;

/// Modified Denavit-Hartenberg parameters of one joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DhParameters {
    pub a: f64,
    pub d: f64,
    pub alpha: f64,
}

impl DhParameters {
    pub const fn new(a: f64, d: f64, alpha: f64) -> Self {
        Self { a, d, alpha }
    }
}

/// Mass properties of a rigid body in its own frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkInertial {
    pub mass: f64,
    pub com: [f64; 3],
    /// `[ixx, iyy, izz, ixy, ixz, iyz]` about the center of mass.
    pub inertia: [f64; 6],
}

impl LinkInertial {
    pub const fn new(mass: f64, com: [f64; 3], inertia: [f64; 6]) -> Self {
        Self { mass, com, inertia }
    }

    pub fn to_spatial(&self) -> SpatialInertia {
        let [ixx, iyy, izz, ixy, ixz, iyz] = self.inertia;
        SpatialInertia::new(
            self.mass,
            DVec3::from_array(self.com),
            inertia_tensor(ixx, iyy, izz, ixy, ixz, iyz),
        )
    }
}

/// A rigid tool rigidly mounted on the last link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndEffector {
    pub inertial: LinkInertial,
    /// Pose of the tool frame in the link-7 frame.
    pub mount: Transform,
}

impl EndEffector {
    /// The Franka hand with its fingers at rest.
    pub fn franka_hand() -> Self {
        Self {
            inertial: LinkInertial::new(
                0.73,
                [-0.01, 0.0, 0.03],
                [0.001, 0.0025, 0.0017, 0.0, 0.0, 0.0],
            ),
            mount: Transform::new(
                DVec3::new(0.0, 0.0, 0.107),
                DQuat::from_rotation_z(-FRAC_PI_4),
            ),
        }
    }
}

/// Kinematic, inertial and limit parameters of the arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PandaParameters {
    pub dh: [DhParameters; PANDA_DOFS],
    pub links: [LinkInertial; PANDA_DOFS],
    pub end_effector: Option<EndEffector>,
    /// `[lower, upper]` joint position limits (rad).
    pub position_limits: [[f64; 2]; PANDA_DOFS],
    /// Symmetric joint velocity limits (rad/s).
    pub velocity_limits: [f64; PANDA_DOFS],
    /// Symmetric joint torque limits (N m).
    pub effort_limits: [f64; PANDA_DOFS],
}

impl Default for PandaParameters {
    fn default() -> Self {
        Self {
            dh: [
                DhParameters::new(0.0, 0.333, 0.0),
                DhParameters::new(0.0, 0.0, -FRAC_PI_2),
                DhParameters::new(0.0, 0.316, FRAC_PI_2),
                DhParameters::new(0.0825, 0.0, FRAC_PI_2),
                DhParameters::new(-0.0825, 0.384, -FRAC_PI_2),
                DhParameters::new(0.0, 0.0, FRAC_PI_2),
                DhParameters::new(0.088, 0.0, FRAC_PI_2),
            ],
            links: [
                LinkInertial::new(
                    4.970684,
                    [0.003875, 0.002081, -0.04762],
                    [0.70337, 0.70661, 0.009117, -0.000139, 0.006772, 0.019169],
                ),
                LinkInertial::new(
                    0.646926,
                    [-0.003141, -0.02872, 0.003495],
                    [0.007962, 0.02811, 0.025995, -0.003925, 0.010254, 0.000704],
                ),
                LinkInertial::new(
                    3.228604,
                    [0.027518, 0.039252, -0.066502],
                    [0.037242, 0.036155, 0.01083, -0.004761, -0.011396, -0.012805],
                ),
                LinkInertial::new(
                    3.587895,
                    [-0.05317, 0.104419, 0.027454],
                    [0.025853, 0.019552, 0.028323, 0.007796, -0.001332, 0.008641],
                ),
                LinkInertial::new(
                    1.225946,
                    [-0.011953, 0.041065, -0.038437],
                    [0.035549, 0.029474, 0.008627, -0.002117, -0.004037, 0.000229],
                ),
                LinkInertial::new(
                    1.666555,
                    [0.060149, -0.014117, -0.010517],
                    [0.001964, 0.004354, 0.005433, 0.000109, -0.001158, 0.000341],
                ),
                LinkInertial::new(
                    0.735522,
                    [0.010517, -0.004252, 0.061597],
                    [0.012516, 0.010027, 0.004815, -0.000428, -0.001196, -0.000741],
                ),
            ],
            end_effector: Some(EndEffector::franka_hand()),
            position_limits: [
                [-2.8973, 2.8973],
                [-1.7628, 1.7628],
                [-2.8973, 2.8973],
                [-3.0718, -0.0698],
                [-2.8973, 2.8973],
                [-0.0175, 3.7525],
                [-2.8973, 2.8973],
            ],
            velocity_limits: [2.175, 2.175, 2.175, 2.175, 2.61, 2.61, 2.61],
            effort_limits: [87.0, 87.0, 87.0, 87.0, 12.0, 12.0, 12.0],
        }
    }
}

impl PandaParameters {
    /// Same arm with no tool mounted on the flange.
    pub fn without_end_effector(mut self) -> Self {
        self.end_effector = None;
        self
    }

    /// Builds the serial chain `link1 .. link7`, with the tool folded into link 7.
    pub fn multibody(&self) -> Result<Multibody> {
        let mut mb = Multibody::new();
        let last = PANDA_DOFS - 1;
        for (i, (dh, inertial)) in self.dh.iter().zip(&self.links).enumerate() {
            let mut inertia = inertial.to_spatial();
            if i == last {
                if let Some(tool) = &self.end_effector {
                    inertia = inertia.add(&tool.inertial.to_spatial().transformed(&tool.mount));
                }
            }
            let parent = i.checked_sub(1);
            let joint = JointType::Revolute { axis: DVec3::Z };
            let link = Link::new(&format!("link{}", i + 1), parent, joint)
                .with_parent_to_joint(Transform::from_modified_dh(dh.a, dh.d, dh.alpha))
                .with_inertia(inertia);
            mb.add_link(link)?;
        }
        Ok(mb)
    }
}

/// Forward dynamics of the Panda arm.
#[derive(Debug, Clone)]
pub struct PandaDynamics {
    inner: ArticulatedDynamics,
    params: PandaParameters,
}

impl Default for PandaDynamics {
    fn default() -> Self {
        Self::new()
    }
}

impl PandaDynamics {
    /// Arm with the Franka hand, default gravity and the CRBA solver.
    pub fn new() -> Self {
        Self::with_parameters(PandaParameters::default())
            .expect("default Panda parameters form a valid chain")
    }

    pub fn with_parameters(params: PandaParameters) -> Result<Self> {
        Self::with_config(params, DynamicsConfig::default())
    }

    pub fn with_config(params: PandaParameters, config: DynamicsConfig) -> Result<Self> {
        let inner = ArticulatedDynamics::new(params.multibody()?, config)?;
        debug_assert_eq!(
            inner.dimensions(),
            Dimensions::new(PANDA_STATE_DIM, PANDA_CONTROL_DIM)
        );
        log::debug!(
            "Panda model ready (end effector: {})",
            params.end_effector.is_some()
        );
        Ok(Self { inner, params })
    }

    pub fn parameters(&self) -> &PandaParameters {
        &self.params
    }

    /// The generic chain model this arm is built on.
    pub fn articulated(&self) -> &ArticulatedDynamics {
        &self.inner
    }

    pub fn mass_matrix(&self, q: &[f64]) -> Result<DMatrix<f64>> {
        self.inner.mass_matrix(q)
    }

    pub fn gravity_torques(&self, q: &[f64]) -> Result<DVector<f64>> {
        self.inner.gravity_torques(q)
    }

    pub fn bias_torques(&self, q: &[f64], qd: &[f64]) -> Result<DVector<f64>> {
        self.inner.bias_torques(q, qd)
    }

    pub fn inverse_dynamics(&self, q: &[f64], qd: &[f64], qdd: &[f64]) -> Result<DVector<f64>> {
        self.inner.inverse_dynamics(q, qd, qdd)
    }

    pub fn forward_dynamics(&self, q: &[f64], qd: &[f64], tau: &[f64]) -> Result<DVector<f64>> {
        self.inner.forward_dynamics(q, qd, tau)
    }

    /// Whether the joint positions and velocities in `x` respect the arm's limits.
    ///
    /// Limits are advisory; `compute_derivatives` evaluates any finite state.
    pub fn within_limits(&self, x: &[f64]) -> Result<bool> {
        check_len(VectorKind::State, x, PANDA_STATE_DIM)?;
        check_finite(VectorKind::State, x)?;
        let (q, qd) = x.split_at(PANDA_DOFS);
        let positions_ok = q
            .iter()
            .zip(&self.params.position_limits)
            .all(|(q, [lo, hi])| (*lo..=*hi).contains(q));
        let velocities_ok = qd
            .iter()
            .zip(&self.params.velocity_limits)
            .all(|(qd, limit)| qd.abs() <= *limit);
        Ok(positions_ok && velocities_ok)
    }

    /// Whether every torque in `u` is inside the effort limits.
    pub fn within_effort_limits(&self, u: &[f64]) -> Result<bool> {
        check_len(VectorKind::Control, u, PANDA_CONTROL_DIM)?;
        check_finite(VectorKind::Control, u)?;
        Ok(u
            .iter()
            .zip(&self.params.effort_limits)
            .all(|(tau, limit)| tau.abs() <= *limit))
    }
}

impl Dynamics for PandaDynamics {
    fn dimensions(&self) -> Dimensions {
        Dimensions::new(PANDA_STATE_DIM, PANDA_CONTROL_DIM)
    }

    fn compute_derivatives(&self, x: &[f64], u: &[f64], xdot: &mut [f64]) -> Result<()> {
        self.inner.compute_derivatives(x, u, xdot)
    }
}
