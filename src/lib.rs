//! Manipulator Dynamics – continuous-time dynamics models for Rust.
//!
//! This crate exposes the [`Dynamics`] capability set that trajectory
//! optimizers and integrators evaluate (`xdot = f(x, u)`), a generic
//! [`ArticulatedDynamics`] model for fixed-base kinematic trees, and the
//! [`PandaDynamics`] preset for the 7-DOF Franka Emika Panda arm.

pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;

pub use glam::{DMat3, DQuat, DVec3};

pub use config::{DynamicsConfig, ForwardDynamicsMethod};
pub use crate::core::{
    articulations::{JointType, Link, Multibody},
    types::Transform,
};
pub use dynamics::{
    batch::evaluate_batch,
    panda::{DhParameters, EndEffector, LinkInertial, PandaParameters},
    ArticulatedDynamics, Dimensions, Dynamics, Linearization, PandaDynamics,
};
pub use error::{DynamicsError, Result, VectorKind};
pub use utils::spatial::SpatialInertia;
