use glam::DVec3;
use nalgebra::{DMatrix, DVector};

use super::{aba, crba, rnea, Dimensions, Dynamics};
use crate::config::{DynamicsConfig, ForwardDynamicsMethod};
use crate::core::articulations::Multibody;
use crate::error::{check_finite, check_len, DynamicsError, Result, VectorKind};

/// Forward dynamics of a fixed-base kinematic tree.
///
/// State is `x = [q, qd]` (2n entries), control is the joint effort vector
/// `tau` (n entries), and the derivative is `xdot = [qd, qdd]` with
/// `M(q) qdd + C(q, qd) qd + G(q) = tau`.
#[derive(Debug, Clone)]
pub struct ArticulatedDynamics {
    model: Multibody,
    config: DynamicsConfig,
    gravity: DVec3,
    dims: Dimensions,
}

impl ArticulatedDynamics {
    /// Validates the tree and builds the model.
    pub fn new(model: Multibody, config: DynamicsConfig) -> Result<Self> {
        // Rebuild so offsets are consistent even for trees assembled by hand or deserialized.
        let mut checked = Multibody::new();
        for link in model.links {
            checked.add_link(link)?;
        }
        let gravity = config.gravity_vec();
        if !gravity.is_finite() {
            return Err(DynamicsError::invalid_model(format!(
                "gravity {gravity} is not finite"
            )));
        }
        if !config.singularity_tolerance.is_finite() || config.singularity_tolerance < 0.0 {
            return Err(DynamicsError::invalid_model(format!(
                "singularity tolerance {} must be finite and non-negative",
                config.singularity_tolerance
            )));
        }

        let dofs = checked.total_dofs;
        log::debug!(
            "articulated model: {} links, {dofs} dofs, {:?} solver",
            checked.link_count(),
            config.method
        );
        Ok(Self {
            model: checked,
            config,
            gravity,
            dims: Dimensions::new(2 * dofs, dofs),
        })
    }

    pub fn model(&self) -> &Multibody {
        &self.model
    }

    pub fn config(&self) -> &DynamicsConfig {
        &self.config
    }

    pub fn dofs(&self) -> usize {
        self.model.total_dofs
    }

    /// Joint-space mass matrix M(q).
    pub fn mass_matrix(&self, q: &[f64]) -> Result<DMatrix<f64>> {
        self.check_joint_vector(VectorKind::JointPositions, q)?;
        Ok(crba(&self.model, q))
    }

    /// Gravity torques G(q).
    pub fn gravity_torques(&self, q: &[f64]) -> Result<DVector<f64>> {
        self.check_joint_vector(VectorKind::JointPositions, q)?;
        Ok(rnea::gravity_torques(&self.model, self.gravity, q))
    }

    /// Bias torques C(q, qd) qd + G(q).
    pub fn bias_torques(&self, q: &[f64], qd: &[f64]) -> Result<DVector<f64>> {
        self.check_joint_vector(VectorKind::JointPositions, q)?;
        self.check_joint_vector(VectorKind::JointVelocities, qd)?;
        Ok(rnea::bias_torques(&self.model, self.gravity, q, qd))
    }

    /// Torques that produce accelerations `qdd` at state (q, qd).
    pub fn inverse_dynamics(&self, q: &[f64], qd: &[f64], qdd: &[f64]) -> Result<DVector<f64>> {
        self.check_joint_vector(VectorKind::JointPositions, q)?;
        self.check_joint_vector(VectorKind::JointVelocities, qd)?;
        self.check_joint_vector(VectorKind::JointAccelerations, qdd)?;
        Ok(rnea(&self.model, self.gravity, q, qd, qdd))
    }

    /// Joint accelerations produced by torques `tau` at state (q, qd).
    pub fn forward_dynamics(&self, q: &[f64], qd: &[f64], tau: &[f64]) -> Result<DVector<f64>> {
        self.check_joint_vector(VectorKind::JointPositions, q)?;
        self.check_joint_vector(VectorKind::JointVelocities, qd)?;
        self.check_joint_vector(VectorKind::JointTorques, tau)?;
        self.solve_accelerations(q, qd, tau)
    }

    fn check_joint_vector(&self, vector: VectorKind, values: &[f64]) -> Result<()> {
        check_len(vector, values, self.dofs())?;
        check_finite(vector, values)
    }

    /// Inputs are already validated.
    fn solve_accelerations(&self, q: &[f64], qd: &[f64], tau: &[f64]) -> Result<DVector<f64>> {
        let qdd = match self.config.method {
            ForwardDynamicsMethod::Crba => self.solve_with_mass_matrix(q, qd, tau)?,
            ForwardDynamicsMethod::Aba => aba(
                &self.model,
                self.gravity,
                q,
                qd,
                tau,
                self.config.singularity_tolerance,
            )?,
        };
        if let Some(idx) = qdd.iter().position(|v| !v.is_finite()) {
            return Err(DynamicsError::singular(format!(
                "joint acceleration {idx} is not finite"
            )));
        }
        Ok(qdd)
    }

    fn solve_with_mass_matrix(&self, q: &[f64], qd: &[f64], tau: &[f64]) -> Result<DVector<f64>> {
        if self.dofs() == 0 {
            return Ok(DVector::zeros(0));
        }
        let mass = crba(&self.model, q);
        let bias = rnea::bias_torques(&self.model, self.gravity, q, qd);
        let rhs = DVector::from_column_slice(tau) - bias;

        let Some(chol) = mass.cholesky() else {
            return Err(DynamicsError::singular(
                "mass matrix is not positive definite",
            ));
        };

        // Squared pivot ratio bounds the conditioning of M from below.
        let diag = chol.l_dirty().diagonal();
        let (min, max) = (diag.min(), diag.max());
        let ratio = (min / max).powi(2);
        if ratio.is_nan() || ratio <= self.config.singularity_tolerance {
            return Err(DynamicsError::singular(format!(
                "mass matrix is ill-conditioned (pivot ratio {ratio:e})"
            )));
        }

        Ok(chol.solve(&rhs))
    }
}

impl Dynamics for ArticulatedDynamics {
    fn dimensions(&self) -> Dimensions {
        self.dims
    }

    fn compute_derivatives(&self, x: &[f64], u: &[f64], xdot: &mut [f64]) -> Result<()> {
        self.dims.check(x, u, xdot)?;
        let n = self.dofs();
        let (q, qd) = x.split_at(n);

        let qdd = self.solve_accelerations(q, qd, u).inspect_err(|err| {
            log::debug!("derivative evaluation rejected: {err}");
        })?;

        xdot[..n].copy_from_slice(qd);
        xdot[n..].copy_from_slice(qdd.as_slice());
        Ok(())
    }
}
