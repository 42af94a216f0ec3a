//! Core types describing articulated mechanisms.

pub mod articulations;
pub mod types;

pub use articulations::{JointType, Link, Multibody};
pub use types::Transform;
