//! Recursive Newton-Euler inverse dynamics.
//!
//! Given (q, qd, qdd), computes the joint torques that produce that motion.
//! With `qdd = 0` the result is the bias torque `C(q, qd) qd + G(q)`, and with
//! `qd = qdd = 0` it is the gravity torque `G(q)`.

use glam::DVec3;
use nalgebra::DVector;

use crate::core::articulations::Multibody;
use crate::utils::spatial::SpatialVec;

/// Runs RNEA and returns tau.
///
/// # Panics
/// Panics if `q`, `qd` or `qdd` are shorter than `mb.total_dofs`.
pub fn rnea(mb: &Multibody, gravity: DVec3, q: &[f64], qd: &[f64], qdd: &[f64]) -> DVector<f64> {
    let n = mb.links.len();
    let mut tau = DVector::zeros(mb.total_dofs);
    if n == 0 {
        return tau;
    }

    let x_up = mb.parent_transforms(q);
    let mut v = vec![SpatialVec::ZERO; n];
    let mut a = vec![SpatialVec::ZERO; n];
    let mut f = vec![SpatialVec::ZERO; n];

    // Fictitious base acceleration stands in for gravity.
    let a_base = SpatialVec::new(DVec3::ZERO, -gravity);

    // --- Pass 1: Outward ---
    for (i, link) in mb.links.iter().enumerate() {
        let (v_joint, a_joint) = match link.joint_type.motion_subspace() {
            Some(s) => (s * qd[link.q_offset], s * qdd[link.q_offset]),
            None => (SpatialVec::ZERO, SpatialVec::ZERO),
        };

        let (v_parent, a_parent) = match link.parent_idx {
            Some(p_idx) => (v[p_idx], a[p_idx]),
            None => (SpatialVec::ZERO, a_base),
        };

        v[i] = x_up[i].apply_motion(v_parent) + v_joint;
        a[i] = x_up[i].apply_motion(a_parent) + a_joint + v[i].cross_motion(&v_joint);

        let inertia = &link.inertia;
        f[i] = inertia.mul_motion(a[i]) + v[i].cross_force(&inertia.mul_motion(v[i]));
    }

    // --- Pass 2: Inward ---
    for i in (0..n).rev() {
        let link = &mb.links[i];
        if let Some(s) = link.joint_type.motion_subspace() {
            tau[link.q_offset] = s.dot(&f[i]);
        }
        if let Some(p_idx) = link.parent_idx {
            let f_parent = x_up[i].inv_apply_force(f[i]);
            f[p_idx] += f_parent;
        }
    }

    tau
}

/// Bias torques `C(q, qd) qd + G(q)`.
pub fn bias_torques(mb: &Multibody, gravity: DVec3, q: &[f64], qd: &[f64]) -> DVector<f64> {
    let zeros = vec![0.0; mb.total_dofs];
    rnea(mb, gravity, q, qd, &zeros)
}

/// Gravity torques `G(q)`: the torques that hold the tree still at `q`.
pub fn gravity_torques(mb: &Multibody, gravity: DVec3, q: &[f64]) -> DVector<f64> {
    let zeros = vec![0.0; mb.total_dofs];
    rnea(mb, gravity, q, &zeros, &zeros)
}
