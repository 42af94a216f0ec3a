//! Additional math helpers layered on top of `glam`.

use glam::{DMat3, DVec3};

/// Cross-product matrix: `skew(a) * b == a.cross(b)`.
pub fn skew(v: DVec3) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(0.0, v.z, -v.y),
        DVec3::new(-v.z, 0.0, v.x),
        DVec3::new(v.y, -v.x, 0.0),
    )
}

/// Outer product `a * b^T`.
pub fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Builds a symmetric inertia tensor from its six independent components.
pub fn inertia_tensor(ixx: f64, iyy: f64, izz: f64, ixy: f64, ixz: f64, iyz: f64) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(ixx, ixy, ixz),
        DVec3::new(ixy, iyy, iyz),
        DVec3::new(ixz, iyz, izz),
    )
}

/// Inertia of a thin rod about its center, lying along `axis`.
pub fn inertia_rod(mass: f64, length: f64, axis: DVec3) -> DMat3 {
    let axis = axis.normalize();
    let transverse = mass * length * length / 12.0;
    (DMat3::IDENTITY - outer(axis, axis)) * transverse
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skew_reproduces_cross_product() {
        let a = DVec3::new(0.3, -1.2, 2.0);
        let b = DVec3::new(-0.5, 0.25, 4.0);
        assert!((skew(a) * b).abs_diff_eq(a.cross(b), 1e-12));
    }

    #[test]
    fn rod_inertia_has_no_axial_component() {
        let i = inertia_rod(2.0, 1.5, DVec3::Y);
        assert!((i * DVec3::Y).length() < 1e-12);
        assert!(((i * DVec3::X).x - 2.0 * 1.5 * 1.5 / 12.0).abs() < 1e-12);
    }
}
