//! Error types for dynamics evaluation.
//!
//! Every fallible operation returns [`DynamicsError`] through the [`Result`] alias.
//! Failures are reported to the immediate caller; nothing is retried internally.

use std::fmt;

/// Identifies which buffer an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorKind {
    State,
    Control,
    Derivative,
    JointPositions,
    JointVelocities,
    JointAccelerations,
    JointTorques,
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::State => "state",
            Self::Control => "control",
            Self::Derivative => "derivative",
            Self::JointPositions => "joint positions",
            Self::JointVelocities => "joint velocities",
            Self::JointAccelerations => "joint accelerations",
            Self::JointTorques => "joint torques",
        };
        f.write_str(name)
    }
}

/// Main error type for dynamics models.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DynamicsError {
    /// A buffer does not have the length the model was built for.
    #[error("{vector} vector has length {actual}, expected {expected}")]
    DimensionMismatch {
        vector: VectorKind,
        expected: usize,
        actual: usize,
    },
    /// The equations of motion cannot be solved at this configuration.
    #[error("equations of motion are singular: {reason}")]
    NumericalSingularity { reason: String },
    /// An input entry is NaN or infinite.
    #[error("{vector} vector has a non-finite entry at index {index}")]
    NonFiniteInput { vector: VectorKind, index: usize },
    /// The kinematic tree handed to a model is malformed.
    #[error("invalid model: {reason}")]
    InvalidModel { reason: String },
}

impl DynamicsError {
    pub fn singular(reason: impl Into<String>) -> Self {
        Self::NumericalSingularity {
            reason: reason.into(),
        }
    }

    pub fn invalid_model(reason: impl Into<String>) -> Self {
        Self::InvalidModel {
            reason: reason.into(),
        }
    }

    /// Whether the caller may treat this as "configuration infeasible" rather than a bug.
    pub fn is_singularity(&self) -> bool {
        matches!(self, Self::NumericalSingularity { .. })
    }
}

/// Convenient Result type alias for dynamics operations.
pub type Result<T> = std::result::Result<T, DynamicsError>;

/// Fails with [`DynamicsError::DimensionMismatch`] unless `values.len() == expected`.
pub fn check_len(vector: VectorKind, values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(DynamicsError::DimensionMismatch {
            vector,
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

/// Fails with [`DynamicsError::NonFiniteInput`] at the first NaN or infinity.
pub fn check_finite(vector: VectorKind, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(DynamicsError::NonFiniteInput { vector, index }),
        None => Ok(()),
    }
}
