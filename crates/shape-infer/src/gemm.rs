// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Gemm output shape: `Y = alpha * op(A) @ op(B) + beta * C`.

use crate::broadcast::is_valid_broadcast;
use crate::error::{Result, ShapeError};

/// Computes the `[M, N]` result shape of a Gemm.
///
/// `left_shape` is `[M, K]` (or `[K, M]` when `trans_left`), `right_shape`
/// is `[K, N]` (or `[N, K]` when `trans_right`). The optional bias must
/// broadcast one way into `[M, N]`.
///
/// # Errors
/// Fails if either operand is not rank 2, the contracted dimensions
/// differ, any of `M`, `N`, `K` is zero, or the bias does not broadcast.
pub fn get_shape_of_gemm_result(
    left_shape: &[usize],
    trans_left: bool,
    right_shape: &[usize],
    trans_right: bool,
    bias_shape: Option<&[usize]>,
) -> Result<Vec<usize>> {
    let (&[l0, l1], &[r0, r1]) = (left_shape, right_shape) else {
        return Err(ShapeError::InvalidShape {
            dims: left_shape.iter().chain(right_shape).map(|&d| d as i64).collect(),
            reason: format!(
                "gemm operands must be rank 2, got ranks {} and {}",
                left_shape.len(),
                right_shape.len()
            ),
        });
    };

    let (m, k) = if trans_left { (l1, l0) } else { (l0, l1) };
    let (right_k, n) = if trans_right { (r1, r0) } else { (r0, r1) };
    if right_k != k {
        return Err(ShapeError::shape(
            right_shape,
            format!("contracted dimension {right_k} does not match {k}"),
        ));
    }
    if m == 0 || n == 0 || k == 0 {
        return Err(ShapeError::shape(&[m, n, k], "M, N and K must be positive"));
    }

    let result = vec![m, n];
    if let Some(bias) = bias_shape {
        if !is_valid_broadcast(bias, &result) {
            return Err(ShapeError::shape(
                bias,
                format!("bias does not broadcast to [{m}, {n}]"),
            ));
        }
    }
    Ok(result)
}
