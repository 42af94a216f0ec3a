use glam::{DMat3, DVec3};

use super::math::{outer, skew};
use crate::core::types::Transform;

/// A 6D spatial vector combining angular and linear components.
/// In motion space, angular is velocity and linear is translation.
/// In force space, angular is torque and linear is force.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpatialVec {
    pub ang: DVec3,
    pub lin: DVec3,
}

impl SpatialVec {
    pub const ZERO: Self = Self {
        ang: DVec3::ZERO,
        lin: DVec3::ZERO,
    };

    pub fn new(ang: DVec3, lin: DVec3) -> Self {
        Self { ang, lin }
    }

    pub fn dot(&self, other: &SpatialVec) -> f64 {
        self.ang.dot(other.ang) + self.lin.dot(other.lin)
    }

    /// Spatial motion cross product: v1 x_m v2
    pub fn cross_motion(&self, other: &SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.ang.cross(other.ang),
            lin: self.ang.cross(other.lin) + self.lin.cross(other.ang),
        }
    }

    /// Spatial force cross product: v x_f f
    pub fn cross_force(&self, other: &SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.ang.cross(other.ang) + self.lin.cross(other.lin),
            lin: self.ang.cross(other.lin),
        }
    }
}

impl std::ops::Add for SpatialVec {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            ang: self.ang + other.ang,
            lin: self.lin + other.lin,
        }
    }
}

impl std::ops::AddAssign for SpatialVec {
    fn add_assign(&mut self, other: Self) {
        self.ang += other.ang;
        self.lin += other.lin;
    }
}

impl std::ops::Sub for SpatialVec {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            ang: self.ang - other.ang,
            lin: self.lin - other.lin,
        }
    }
}

impl std::ops::Neg for SpatialVec {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            ang: -self.ang,
            lin: -self.lin,
        }
    }
}

impl std::ops::Mul<f64> for SpatialVec {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            ang: self.ang * rhs,
            lin: self.lin * rhs,
        }
    }
}

/// A 6x6 spatial matrix represented as 4 3x3 blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMat {
    pub m00: DMat3,
    pub m01: DMat3,
    pub m10: DMat3,
    pub m11: DMat3,
}

impl Default for SpatialMat {
    fn default() -> Self {
        Self::ZERO
    }
}

impl SpatialMat {
    pub const ZERO: Self = Self {
        m00: DMat3::ZERO,
        m01: DMat3::ZERO,
        m10: DMat3::ZERO,
        m11: DMat3::ZERO,
    };

    pub fn new(m00: DMat3, m01: DMat3, m10: DMat3, m11: DMat3) -> Self {
        Self { m00, m01, m10, m11 }
    }

    pub fn mul_vec(&self, v: SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.m00 * v.ang + self.m01 * v.lin,
            lin: self.m10 * v.ang + self.m11 * v.lin,
        }
    }

    pub fn mul_mat(&self, other: &SpatialMat) -> SpatialMat {
        SpatialMat {
            m00: self.m00 * other.m00 + self.m01 * other.m10,
            m01: self.m00 * other.m01 + self.m01 * other.m11,
            m10: self.m10 * other.m00 + self.m11 * other.m10,
            m11: self.m10 * other.m01 + self.m11 * other.m11,
        }
    }

    pub fn transpose(&self) -> SpatialMat {
        SpatialMat {
            m00: self.m00.transpose(),
            m01: self.m10.transpose(),
            m10: self.m01.transpose(),
            m11: self.m11.transpose(),
        }
    }

    /// Computes the outer product (v * v.T) as a 6x6 matrix.
    pub fn outer_product(v: SpatialVec) -> Self {
        Self {
            m00: outer(v.ang, v.ang),
            m01: outer(v.ang, v.lin),
            m10: outer(v.lin, v.ang),
            m11: outer(v.lin, v.lin),
        }
    }

    /// Row-major 6x6 entry access, mostly for tests and debugging.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let block = match (row < 3, col < 3) {
            (true, true) => &self.m00,
            (true, false) => &self.m01,
            (false, true) => &self.m10,
            (false, false) => &self.m11,
        };
        block.col(col % 3)[row % 3]
    }
}

impl std::ops::Add for SpatialMat {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            m00: self.m00 + other.m00,
            m01: self.m01 + other.m01,
            m10: self.m10 + other.m10,
            m11: self.m11 + other.m11,
        }
    }
}

impl std::ops::Sub for SpatialMat {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            m00: self.m00 - other.m00,
            m01: self.m01 - other.m01,
            m10: self.m10 - other.m10,
            m11: self.m11 - other.m11,
        }
    }
}

impl std::ops::Mul<f64> for SpatialMat {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            m00: self.m00 * rhs,
            m01: self.m01 * rhs,
            m10: self.m10 * rhs,
            m11: self.m11 * rhs,
        }
    }
}

/// Plücker coordinate transform from frame A to frame B.
///
/// `rot` maps A coordinates into B coordinates and `pos` is the origin of B
/// expressed in A, so a point transforms as `r_b = rot * (r_a - pos)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialTransform {
    pub rot: DMat3,
    pub pos: DVec3,
}

impl Default for SpatialTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SpatialTransform {
    pub const IDENTITY: Self = Self {
        rot: DMat3::IDENTITY,
        pos: DVec3::ZERO,
    };

    pub fn new(rot: DMat3, pos: DVec3) -> Self {
        Self { rot, pos }
    }

    /// Coordinate transform into a child frame whose pose in the parent is `pose`.
    pub fn from_pose(pose: &Transform) -> Self {
        Self {
            rot: pose.rotation_matrix().transpose(),
            pos: pose.position,
        }
    }

    /// Coordinate transform into a frame rotated by `angle` about `axis`.
    pub fn from_axis_angle(axis: DVec3, angle: f64) -> Self {
        Self {
            rot: DMat3::from_axis_angle(axis, angle).transpose(),
            pos: DVec3::ZERO,
        }
    }

    /// Coordinate transform into a frame shifted by `offset`.
    pub fn from_translation(offset: DVec3) -> Self {
        Self {
            rot: DMat3::IDENTITY,
            pos: offset,
        }
    }

    /// X * v for a motion vector.
    pub fn apply_motion(&self, v: SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.rot * v.ang,
            lin: self.rot * (v.lin - self.pos.cross(v.ang)),
        }
    }

    /// X^-* * f for a force vector.
    pub fn apply_force(&self, f: SpatialVec) -> SpatialVec {
        SpatialVec {
            ang: self.rot * (f.ang - self.pos.cross(f.lin)),
            lin: self.rot * f.lin,
        }
    }

    /// X^-1 * v, taking a motion vector back from B to A.
    pub fn inv_apply_motion(&self, v: SpatialVec) -> SpatialVec {
        let rt = self.rot.transpose();
        let ang = rt * v.ang;
        SpatialVec {
            ang,
            lin: rt * v.lin + self.pos.cross(ang),
        }
    }

    /// X^T * f, taking a force vector back from B to A.
    pub fn inv_apply_force(&self, f: SpatialVec) -> SpatialVec {
        let rt = self.rot.transpose();
        let lin = rt * f.lin;
        SpatialVec {
            ang: rt * f.ang + self.pos.cross(lin),
            lin,
        }
    }

    /// `self * other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &SpatialTransform) -> SpatialTransform {
        SpatialTransform {
            rot: self.rot * other.rot,
            pos: other.pos + other.rot.transpose() * self.pos,
        }
    }

    pub fn inverse(&self) -> SpatialTransform {
        SpatialTransform {
            rot: self.rot.transpose(),
            pos: -(self.rot * self.pos),
        }
    }

    /// The 6x6 motion transform matrix.
    pub fn motion_matrix(&self) -> SpatialMat {
        SpatialMat {
            m00: self.rot,
            m01: DMat3::ZERO,
            m10: self.rot * skew(self.pos) * -1.0,
            m11: self.rot,
        }
    }

    /// Expresses a B-frame spatial inertia in frame A: X^T * I * X.
    pub fn inv_transform_inertia(&self, inertia: &SpatialMat) -> SpatialMat {
        let x = self.motion_matrix();
        x.transpose().mul_mat(inertia).mul_mat(&x)
    }
}

/// A spatial inertia tensor representing mass, center of mass, and rotational inertia.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpatialInertia {
    pub mass: f64,
    pub com: DVec3,
    /// Rotational inertia about the center of mass.
    pub inertia: DMat3,
}

impl Default for SpatialInertia {
    fn default() -> Self {
        Self {
            mass: 0.0,
            com: DVec3::ZERO,
            inertia: DMat3::ZERO,
        }
    }
}

impl SpatialInertia {
    pub fn new(mass: f64, com: DVec3, inertia: DMat3) -> Self {
        Self { mass, com, inertia }
    }

    pub fn point_mass(mass: f64, com: DVec3) -> Self {
        Self {
            mass,
            com,
            inertia: DMat3::ZERO,
        }
    }

    /// Converts this spatial inertia to its 6x6 matrix representation about the frame origin.
    pub fn to_mat(&self) -> SpatialMat {
        let m = self.mass;
        let c_skew = skew(self.com);
        let mc_skew = c_skew * m;

        // I_origin = I_com - m * c_skew * c_skew
        let i_origin = self.inertia - c_skew * c_skew * m;

        SpatialMat {
            m00: i_origin,
            m01: mc_skew,
            m10: mc_skew.transpose(),
            m11: DMat3::IDENTITY * m,
        }
    }

    /// Multiplies spatial inertia by spatial motion to get spatial force: f = I * v
    pub fn mul_motion(&self, v: SpatialVec) -> SpatialVec {
        let m = self.mass;
        let c = self.com;

        let ang = self.inertia * v.ang + c.cross(v.lin * m) + c.cross(v.ang.cross(c * m));
        let lin = m * (v.lin - c.cross(v.ang));

        SpatialVec { ang, lin }
    }

    /// Adds two spatial inertias in the same coordinate frame.
    pub fn add(&self, other: &Self) -> Self {
        let m_total = self.mass + other.mass;
        if m_total < 1e-12 {
            return *self;
        }

        let com_total = (self.com * self.mass + other.com * other.mass) / m_total;

        // Parallel axis theorem to move both to total COM
        let i1 = self.inertia + inertia_offset(self.com - com_total, self.mass);
        let i2 = other.inertia + inertia_offset(other.com - com_total, other.mass);

        Self {
            mass: m_total,
            com: com_total,
            inertia: i1 + i2,
        }
    }

    /// Re-expresses this inertia in a parent frame, given this frame's pose in the parent.
    pub fn transformed(&self, pose: &Transform) -> Self {
        let r = pose.rotation_matrix();
        Self {
            mass: self.mass,
            com: pose.transform_point(self.com),
            inertia: r * self.inertia * r.transpose(),
        }
    }
}

fn inertia_offset(d: DVec3, m: f64) -> DMat3 {
    (DMat3::from_diagonal(DVec3::splat(d.length_squared())) - outer(d, d)) * m
}
