//! Global configuration constants and evaluation settings.

use serde::{Deserialize, Serialize};

/// Default gravity vector (base frame, Z-up).
pub const DEFAULT_GRAVITY: [f64; 3] = [0.0, 0.0, -9.81];

/// Smallest accepted conditioning ratio: squared Cholesky pivot ratio of M(q),
/// or articulated over rigid pivot in the articulated-body algorithm.
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Perturbation used for central finite differences.
pub const FINITE_DIFFERENCE_STEP: f64 = 1e-6;

/// Number of actuated joints on the Panda arm.
pub const PANDA_DOFS: usize = 7;

/// Panda state dimension (positions + velocities).
pub const PANDA_STATE_DIM: usize = 2 * PANDA_DOFS;

/// Panda control dimension (one torque per joint).
pub const PANDA_CONTROL_DIM: usize = PANDA_DOFS;

/// Algorithm used to turn torques into joint accelerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForwardDynamicsMethod {
    /// Assemble M(q) and the bias torques, then solve with a Cholesky factorization.
    #[default]
    Crba,
    /// Featherstone's articulated-body algorithm.
    Aba,
}

/// Settings shared by every articulated dynamics model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub gravity: [f64; 3],
    pub method: ForwardDynamicsMethod,
    pub singularity_tolerance: f64,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            method: ForwardDynamicsMethod::default(),
            singularity_tolerance: SINGULARITY_TOLERANCE,
        }
    }
}

impl DynamicsConfig {
    pub fn with_method(mut self, method: ForwardDynamicsMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_gravity(mut self, gravity: [f64; 3]) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn gravity_vec(&self) -> glam::DVec3 {
        glam::DVec3::from_array(self.gravity)
    }
}
