//! Composite Rigid Body Algorithm: joint-space mass matrix M(q).

use nalgebra::DMatrix;

use crate::core::articulations::Multibody;
use crate::utils::spatial::SpatialMat;

/// Computes the symmetric `total_dofs x total_dofs` mass matrix at `q`.
///
/// # Panics
/// Panics if `q` is shorter than `mb.total_dofs`.
pub fn crba(mb: &Multibody, q: &[f64]) -> DMatrix<f64> {
    let n = mb.links.len();
    let mut mass_matrix = DMatrix::zeros(mb.total_dofs, mb.total_dofs);
    if n == 0 {
        return mass_matrix;
    }

    let x_up = mb.parent_transforms(q);

    // Composite inertias, accumulated leaf to root.
    let mut i_c: Vec<SpatialMat> = mb.links.iter().map(|link| link.inertia.to_mat()).collect();
    for i in (0..n).rev() {
        if let Some(p_idx) = mb.links[i].parent_idx {
            let in_parent = x_up[i].inv_transform_inertia(&i_c[i]);
            i_c[p_idx] = i_c[p_idx] + in_parent;
        }
    }

    for i in 0..n {
        let link = &mb.links[i];
        let Some(s_i) = link.joint_type.motion_subspace() else {
            continue;
        };
        let row = link.q_offset;

        let mut f = i_c[i].mul_vec(s_i);
        mass_matrix[(row, row)] = s_i.dot(&f);

        // Walk up the tree, carrying the force into each ancestor frame.
        let mut j = i;
        while let Some(p_idx) = mb.links[j].parent_idx {
            f = x_up[j].inv_apply_force(f);
            j = p_idx;
            let ancestor = &mb.links[j];
            if let Some(s_j) = ancestor.joint_type.motion_subspace() {
                let col = ancestor.q_offset;
                let value = s_j.dot(&f);
                mass_matrix[(row, col)] = value;
                mass_matrix[(col, row)] = value;
            }
        }
    }

    mass_matrix
}
