use glam::{DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Rigid placement of a child frame inside its parent frame.
///
/// A point with coordinates `r` in the child maps to `position + rotation * r` in the parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: DQuat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    pub fn from_translation(position: DVec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn from_rotation(rotation: DQuat) -> Self {
        Self {
            rotation,
            ..Self::default()
        }
    }

    /// Placement of a link frame under the modified Denavit-Hartenberg convention
    /// (`RotX(alpha) * TransX(a) * TransZ(d)`), excluding the joint rotation about z.
    pub fn from_modified_dh(a: f64, d: f64, alpha: f64) -> Self {
        let rotation = DQuat::from_rotation_x(alpha);
        Self {
            position: DVec3::new(a, 0.0, 0.0) + rotation * DVec3::new(0.0, 0.0, d),
            rotation,
        }
    }

    /// Applies another transform on top of this one, returning the composition.
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * other.position,
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.position + self.rotation * point
    }

    pub fn rotation_matrix(&self) -> DMat3 {
        DMat3::from_quat(self.rotation)
    }
}
