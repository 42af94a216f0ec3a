//! Evaluates one model over many packed (x, u) rows.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::Dynamics;
use crate::error::{DynamicsError, Result, VectorKind};
use crate::utils::logging::ScopedTimer;

/// Computes `xdot` for every row of `states` / `controls` into `out`.
///
/// Buffers are row-major: `states` and `out` hold `rows * state_dim` values,
/// `controls` holds `rows * control_dim`. `out` is only written when every row
/// succeeds; otherwise the error of a failing row is returned. With the
/// `parallel` feature the rows are spread over the rayon pool.
pub fn evaluate_batch(
    dynamics: &dyn Dynamics,
    states: &[f64],
    controls: &[f64],
    out: &mut [f64],
) -> Result<()> {
    let n = dynamics.state_dim();
    let m = dynamics.control_dim();
    let rows = row_count(VectorKind::State, states.len(), n)?;
    if controls.len() != rows * m {
        return Err(DynamicsError::DimensionMismatch {
            vector: VectorKind::Control,
            expected: rows * m,
            actual: controls.len(),
        });
    }
    if out.len() != states.len() {
        return Err(DynamicsError::DimensionMismatch {
            vector: VectorKind::Derivative,
            expected: states.len(),
            actual: out.len(),
        });
    }

    let _timer = ScopedTimer::new("evaluate_batch").with_items(rows);
    let mut scratch = vec![0.0; out.len()];
    if n > 0 {
        run_rows(dynamics, states, controls, &mut scratch, n, m)?;
    }
    out.copy_from_slice(&scratch);
    Ok(())
}

fn row_count(vector: VectorKind, len: usize, width: usize) -> Result<usize> {
    if width == 0 {
        return Ok(0);
    }
    if len % width != 0 {
        return Err(DynamicsError::DimensionMismatch {
            vector,
            expected: (len / width + 1) * width,
            actual: len,
        });
    }
    Ok(len / width)
}

#[cfg(feature = "parallel")]
fn run_rows(
    dynamics: &dyn Dynamics,
    states: &[f64],
    controls: &[f64],
    scratch: &mut [f64],
    n: usize,
    m: usize,
) -> Result<()> {
    scratch
        .par_chunks_mut(n)
        .enumerate()
        .try_for_each(|(row, xdot)| {
            let x = &states[row * n..(row + 1) * n];
            let u = &controls[row * m..(row + 1) * m];
            dynamics.compute_derivatives(x, u, xdot)
        })
}

#[cfg(not(feature = "parallel"))]
fn run_rows(
    dynamics: &dyn Dynamics,
    states: &[f64],
    controls: &[f64],
    scratch: &mut [f64],
    n: usize,
    m: usize,
) -> Result<()> {
    for (row, xdot) in scratch.chunks_mut(n).enumerate() {
        let x = &states[row * n..(row + 1) * n];
        let u = &controls[row * m..(row + 1) * m];
        dynamics.compute_derivatives(x, u, xdot)?;
    }
    Ok(())
}
