//! Utility helpers: math extensions, spatial algebra, and logging.

pub mod logging;
pub mod math;
pub mod spatial;

pub use spatial::{SpatialInertia, SpatialMat, SpatialTransform, SpatialVec};

pub use math::*;
