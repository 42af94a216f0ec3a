//! Continuous-time dynamics models and the rigid-body algorithms behind them.
//!
//! Planners and integrators are written against the [`Dynamics`] trait; the
//! concrete models ([`ArticulatedDynamics`], [`PandaDynamics`]) are chosen by
//! whoever sets up the planning problem.

pub mod aba;
pub mod articulated;
pub mod batch;
pub mod crba;
pub mod panda;
pub mod rnea;

pub use aba::aba;
pub use articulated::ArticulatedDynamics;
pub use batch::evaluate_batch;
pub use crba::crba;
pub use panda::{LinkInertial, PandaDynamics, PandaParameters};
pub use rnea::{bias_torques, gravity_torques, rnea};

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::config::FINITE_DIFFERENCE_STEP;
use crate::error::{check_finite, check_len, Result, VectorKind};

/// The fixed state and control dimensions of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    state_dim: usize,
    control_dim: usize,
}

impl Dimensions {
    pub const fn new(state_dim: usize, control_dim: usize) -> Self {
        Self {
            state_dim,
            control_dim,
        }
    }

    pub const fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub const fn control_dim(&self) -> usize {
        self.control_dim
    }

    /// Validates the lengths of `x` and `u`, then that every entry is finite.
    pub fn check_inputs(&self, x: &[f64], u: &[f64]) -> Result<()> {
        check_len(VectorKind::State, x, self.state_dim)?;
        check_len(VectorKind::Control, u, self.control_dim)?;
        check_finite(VectorKind::State, x)?;
        check_finite(VectorKind::Control, u)
    }

    /// Validates a full `compute_derivatives` call before any work is done.
    pub fn check(&self, x: &[f64], u: &[f64], xdot: &[f64]) -> Result<()> {
        check_len(VectorKind::Derivative, xdot, self.state_dim)?;
        self.check_inputs(x, u)
    }
}

/// Capability set every continuous-time dynamics model provides.
///
/// Implementations hold only immutable configuration, so a single model can be
/// shared across threads and evaluated concurrently with distinct buffers.
pub trait Dynamics: Send + Sync {
    /// State and control dimensions, fixed for the lifetime of the model.
    fn dimensions(&self) -> Dimensions;

    fn state_dim(&self) -> usize {
        self.dimensions().state_dim()
    }

    fn control_dim(&self) -> usize {
        self.dimensions().control_dim()
    }

    /// Writes the time derivative of state `x` under control `u` into `xdot`.
    ///
    /// `x` and `xdot` must have `state_dim()` entries and `u` must have
    /// `control_dim()`. On success every entry of `xdot` is overwritten; on
    /// error `xdot` is left untouched. The result depends only on `x` and `u`.
    fn compute_derivatives(&self, x: &[f64], u: &[f64], xdot: &mut [f64]) -> Result<()>;

    /// Allocating form of [`Dynamics::compute_derivatives`].
    fn derivatives(&self, x: &[f64], u: &[f64]) -> Result<Vec<f64>> {
        let mut xdot = vec![0.0; self.state_dim()];
        self.compute_derivatives(x, u, &mut xdot)?;
        Ok(xdot)
    }

    /// Linearizes the dynamics around `(x, u)` with central finite differences.
    fn linearize(&self, x: &[f64], u: &[f64]) -> Result<Linearization> {
        let dims = self.dimensions();
        dims.check_inputs(x, u)?;
        let (n, m) = (dims.state_dim(), dims.control_dim());

        let xdot = self.derivatives(x, u)?;
        let mut jac_x = DMatrix::zeros(n, n);
        let mut jac_u = DMatrix::zeros(n, m);
        let mut plus = vec![0.0; n];
        let mut minus = vec![0.0; n];

        let mut x_pert = x.to_vec();
        for j in 0..n {
            let step = FINITE_DIFFERENCE_STEP * x[j].abs().max(1.0);
            x_pert[j] = x[j] + step;
            self.compute_derivatives(&x_pert, u, &mut plus)?;
            x_pert[j] = x[j] - step;
            self.compute_derivatives(&x_pert, u, &mut minus)?;
            x_pert[j] = x[j];
            for i in 0..n {
                jac_x[(i, j)] = (plus[i] - minus[i]) / (2.0 * step);
            }
        }

        let mut u_pert = u.to_vec();
        for j in 0..m {
            let step = FINITE_DIFFERENCE_STEP * u[j].abs().max(1.0);
            u_pert[j] = u[j] + step;
            self.compute_derivatives(x, &u_pert, &mut plus)?;
            u_pert[j] = u[j] - step;
            self.compute_derivatives(x, &u_pert, &mut minus)?;
            u_pert[j] = u[j];
            for i in 0..n {
                jac_u[(i, j)] = (plus[i] - minus[i]) / (2.0 * step);
            }
        }

        Ok(Linearization {
            xdot: DVector::from_vec(xdot),
            jac_x,
            jac_u,
        })
    }
}

/// First-order model `xdot ≈ xdot0 + A (x - x0) + B (u - u0)` around an operating point.
#[derive(Debug, Clone, PartialEq)]
pub struct Linearization {
    /// Derivative at the operating point.
    pub xdot: DVector<f64>,
    /// A = d(xdot)/dx, `state_dim x state_dim`.
    pub jac_x: DMatrix<f64>,
    /// B = d(xdot)/du, `state_dim x control_dim`.
    pub jac_u: DMatrix<f64>,
}
