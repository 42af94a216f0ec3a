//! Articulated-Body Algorithm: forward dynamics in O(n) without forming M(q).

use glam::DVec3;
use nalgebra::DVector;

use crate::core::articulations::Multibody;
use crate::error::{DynamicsError, Result};
use crate::utils::spatial::{SpatialMat, SpatialVec};

/// Solves for generalized accelerations (qdd) using Featherstone's ABA.
///
/// Fails with [`DynamicsError::NumericalSingularity`] when a joint's
/// articulated pivot `S^T I^A S` is at or below `tolerance` times its rigid
/// pivot `S^T I^C S` (the composite inertia of the subtree), e.g. a massless
/// distal chain.
///
/// # Panics
/// Panics if `q`, `qd` or `tau` are shorter than `mb.total_dofs`.
pub fn aba(
    mb: &Multibody,
    gravity: DVec3,
    q: &[f64],
    qd: &[f64],
    tau: &[f64],
    tolerance: f64,
) -> Result<DVector<f64>> {
    let n = mb.links.len();
    let mut qdd = DVector::zeros(mb.total_dofs);
    if n == 0 {
        return Ok(qdd);
    }

    let x_up = mb.parent_transforms(q);

    // State storage for the 3 passes
    let mut v = vec![SpatialVec::ZERO; n];
    let mut c = vec![SpatialVec::ZERO; n];
    let mut i_a = vec![SpatialMat::ZERO; n];
    let mut i_c = vec![SpatialMat::ZERO; n];
    let mut p_a = vec![SpatialVec::ZERO; n];

    let mut u_vec = vec![SpatialVec::ZERO; n]; // U_i = I_i^A * S_i
    let mut d_inv = vec![0.0; n];
    let mut force_u = vec![0.0; n]; // u_i = tau_i - S_i^T * p_i^A

    // --- Pass 1: Outward ---
    // Calculate velocities and bias forces
    for (i, link) in mb.links.iter().enumerate() {
        let v_joint = match link.joint_type.motion_subspace() {
            Some(s) => s * qd[link.q_offset],
            None => SpatialVec::ZERO,
        };

        match link.parent_idx {
            Some(p_idx) => {
                v[i] = x_up[i].apply_motion(v[p_idx]) + v_joint;
                c[i] = v[i].cross_motion(&v_joint);
            }
            None => {
                v[i] = v_joint;
                c[i] = SpatialVec::ZERO;
            }
        }

        i_a[i] = link.inertia.to_mat();
        i_c[i] = i_a[i];
        p_a[i] = v[i].cross_force(&link.inertia.mul_motion(v[i]));
    }

    // --- Pass 2: Inward ---
    for i in (0..n).rev() {
        let link = &mb.links[i];

        let (i_reduced, p_reduced) = match link.joint_type.motion_subspace() {
            Some(s) => {
                let u_i = i_a[i].mul_vec(s);
                let d = s.dot(&u_i);
                let rigid = s.dot(&i_c[i].mul_vec(s));
                if d.is_nan() || d <= tolerance * rigid {
                    return Err(DynamicsError::singular(format!(
                        "articulated inertia of joint '{}' is {d:e} (rigid {rigid:e})",
                        link.name
                    )));
                }
                let di = 1.0 / d;
                u_vec[i] = u_i;
                d_inv[i] = di;
                force_u[i] = tau[link.q_offset] - s.dot(&p_a[i]);

                let i_reduced = i_a[i] - SpatialMat::outer_product(u_i) * di;
                let p_reduced = p_a[i] + i_reduced.mul_vec(c[i]) + u_i * (di * force_u[i]);
                (i_reduced, p_reduced)
            }
            None => (i_a[i], p_a[i] + i_a[i].mul_vec(c[i])),
        };

        if let Some(p_idx) = link.parent_idx {
            // Propagate to parent
            i_a[p_idx] = i_a[p_idx] + x_up[i].inv_transform_inertia(&i_reduced);
            i_c[p_idx] = i_c[p_idx] + x_up[i].inv_transform_inertia(&i_c[i]);
            p_a[p_idx] += x_up[i].inv_apply_force(p_reduced);
        }
    }

    // --- Pass 3: Outward ---
    let a_base = SpatialVec::new(DVec3::ZERO, -gravity);
    let mut a = vec![SpatialVec::ZERO; n];
    for (i, link) in mb.links.iter().enumerate() {
        let a_parent = match link.parent_idx {
            Some(p_idx) => a[p_idx],
            None => a_base,
        };
        let a_hat = x_up[i].apply_motion(a_parent) + c[i];

        match link.joint_type.motion_subspace() {
            Some(s) => {
                let acc = d_inv[i] * (force_u[i] - u_vec[i].dot(&a_hat));
                qdd[link.q_offset] = acc;
                a[i] = a_hat + s * acc;
            }
            // Fixed joint: acceleration is just propagated bias
            None => a[i] = a_hat,
        }
    }

    Ok(qdd)
}
