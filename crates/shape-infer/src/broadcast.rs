// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! NumPy-style broadcasting.
//!
//! Shapes are aligned from the rightmost dimension; aligned dimensions are
//! compatible when they are equal or one of them is 1. Incompatibility is
//! an expected outcome, so the shape queries here return `Option` and the
//! elementwise kernels return `Ok(None)` rather than an error.

use tensor_core::{DType, Shape, Tensor};

use crate::error::Result;
use crate::shape::offset_to_indices;

/// Computes the broadcast shape of `a` and `b`, or `None` if they do not
/// broadcast.
///
/// With `is_mat_mul`, the trailing two axes of each operand are combined by
/// the matrix-multiply rule (see [`calc_mat_mul_shape`]) and only the
/// leading "batch" axes broadcast elementwise.
///
/// # Examples
/// ```
/// use shape_infer::broadcast::calc_shape;
/// assert_eq!(calc_shape(&[8, 1, 6, 1], &[7, 1, 5], false), Some(vec![8, 7, 6, 5]));
/// assert_eq!(calc_shape(&[3, 2], &[4], false), None);
/// ```
pub fn calc_shape(a: &[usize], b: &[usize], is_mat_mul: bool) -> Option<Vec<usize>> {
    let (arank, brank) = (a.len(), b.len());
    if arank == 0 {
        return Some(b.to_vec());
    }
    if brank == 0 {
        return Some(a.to_vec());
    }

    let crank = arank.max(brank);
    let mut c = vec![0usize; crank];
    let mut first = 1;
    if is_mat_mul {
        if arank < 2 || brank < 2 {
            return None;
        }
        let [m, n] = calc_mat_mul_shape([a[arank - 2], a[arank - 1]], [b[brank - 2], b[brank - 1]])?;
        c[crank - 2] = m;
        c[crank - 1] = n;
        first = 3;
    }

    for i in first..=crank {
        let alen = if i > arank { 1 } else { a[arank - i] };
        let blen = if i > brank { 1 } else { b[brank - i] };
        if alen != blen && alen > 1 && blen > 1 {
            return None;
        }
        c[crank - i] = alen.max(blen);
    }
    Some(c)
}

/// Matrix-multiply shape rule: `[M, K] x [K, N] -> [M, N]`.
pub fn calc_mat_mul_shape(a: [usize; 2], b: [usize; 2]) -> Option<[usize; 2]> {
    (a[1] == b[0]).then_some([a[0], b[1]])
}

/// Maps an index in the broadcast result back to an index into an operand
/// of shape `original_shape`.
///
/// Leading axes missing from the operand are dropped and every remaining
/// coordinate is reduced modulo the operand's dimension, so stretched
/// size-1 axes map to 0. With `is_mat_mul` the trailing two coordinates
/// are copied unchanged.
pub fn index(broadcasted: &[usize], original_shape: &[usize], is_mat_mul: bool) -> Vec<usize> {
    let rank = original_shape.len();
    let offset = broadcasted.len().saturating_sub(rank);
    original_shape
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            let idx = broadcasted.get(offset + i).copied().unwrap_or(0);
            if is_mat_mul && i + 2 >= rank {
                idx
            } else {
                idx.checked_rem(d).unwrap_or(0)
            }
        })
        .collect()
}

/// Applies `op` elementwise over the broadcast of `a` and `b`.
///
/// The output has `a`'s dtype. Returns `Ok(None)` without allocating if
/// the shapes do not broadcast.
pub fn calc<F>(a: &Tensor, b: &Tensor, op: F) -> Result<Option<Tensor>>
where
    F: Fn(f64, f64) -> f64,
{
    calc_as(a, b, op, a.dtype())
}

/// Like [`calc`], with an explicit output dtype.
pub fn calc_as<F>(a: &Tensor, b: &Tensor, op: F, dtype: DType) -> Result<Option<Tensor>>
where
    F: Fn(f64, f64) -> f64,
{
    let Some(dims) = calc_shape(a.dims(), b.dims(), false) else {
        tracing::debug!(lhs = ?a.dims(), rhs = ?b.dims(), "shapes do not broadcast");
        return Ok(None);
    };

    let mut c = Tensor::zeros(Shape::new(dims), dtype);
    let strides = c.strides().to_vec();
    for offset in 0..c.len() {
        let indices = offset_to_indices(offset, &strides);
        let lhs = a.get(&index(&indices, a.dims(), false))?;
        let rhs = b.get(&index(&indices, b.dims(), false))?;
        c.set_flat(offset, op(lhs, rhs))?;
    }
    Ok(Some(c))
}

/// Applies `op` elementwise, writing the result into `a`.
///
/// Only possible when the broadcast shape equals `a`'s own shape; returns
/// `Ok(false)` and leaves `a` untouched otherwise.
pub fn calc_in_place<F>(a: &mut Tensor, b: &Tensor, op: F) -> Result<bool>
where
    F: Fn(f64, f64) -> f64,
{
    match calc_shape(a.dims(), b.dims(), false) {
        Some(dims) if dims == a.dims() => {}
        _ => {
            tracing::debug!(lhs = ?a.dims(), rhs = ?b.dims(), "cannot broadcast in place");
            return Ok(false);
        }
    }

    let strides = a.strides().to_vec();
    for offset in 0..a.len() {
        let indices = offset_to_indices(offset, &strides);
        let rhs = b.get(&index(&indices, b.dims(), false))?;
        let lhs = a.get_flat(offset)?;
        a.set_flat(offset, op(lhs, rhs))?;
    }
    Ok(true)
}

/// Returns `true` if `shape` broadcasts one way into `final_shape`.
pub fn is_valid_broadcast(shape: &[usize], final_shape: &[usize]) -> bool {
    if shape.len() > final_shape.len() {
        return false;
    }
    shape
        .iter()
        .rev()
        .zip(final_shape.iter().rev())
        .all(|(&s, &f)| s == 1 || s == f)
}

/// Lists the axes of `input` that are stretched to reach `output`.
pub fn broadcast_dims(input: &[usize], output: &[usize]) -> Vec<usize> {
    let rank = input.len();
    (0..rank)
        .filter(|&dim| {
            let from_end = rank - dim;
            let target = output
                .len()
                .checked_sub(from_end)
                .map_or(1, |j| output[j]);
            input[dim] == 1 && target > 1
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_shape_elementwise() {
        assert_eq!(calc_shape(&[2, 3, 4], &[3, 4], false), Some(vec![2, 3, 4]));
        assert_eq!(calc_shape(&[2, 1, 4], &[3, 1], false), Some(vec![2, 3, 4]));
        assert_eq!(calc_shape(&[], &[5], false), Some(vec![5]));
        assert_eq!(calc_shape(&[3, 2], &[4], false), None);
    }

    #[test]
    fn test_calc_shape_mat_mul() {
        assert_eq!(
            calc_shape(&[5, 1, 2, 3], &[4, 3, 7], true),
            Some(vec![5, 4, 2, 7])
        );
        assert_eq!(calc_shape(&[2, 3], &[4, 7], true), None);
        assert_eq!(calc_shape(&[3], &[3, 7], true), None);
        assert_eq!(calc_shape(&[2, 2, 3], &[3, 3, 7], true), None);
    }

    #[test]
    fn test_calc_mat_mul_shape() {
        assert_eq!(calc_mat_mul_shape([2, 3], [3, 4]), Some([2, 4]));
        assert_eq!(calc_mat_mul_shape([2, 3], [5, 4]), None);
    }

    #[test]
    fn test_index_maps_stretched_axes_to_zero() {
        assert_eq!(index(&[1, 2, 3], &[3, 1], false), vec![2, 0]);
        assert_eq!(index(&[1, 2, 3], &[2, 3, 4], false), vec![1, 2, 3]);
        assert!(index(&[1, 2], &[], false).is_empty());
    }

    #[test]
    fn test_index_mat_mul_passes_trailing_axes() {
        assert_eq!(index(&[3, 1, 5, 6], &[1, 2, 9], true), vec![0, 5, 6]);
    }

    #[test]
    fn test_calc_adds_row_vector() {
        let a = Tensor::from_f32(Shape::matrix(2, 3), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = Tensor::from_f32(Shape::vector(3), &[10.0, 20.0, 30.0]).unwrap();
        let c = calc(&a, &b, |x, y| x + y).unwrap().unwrap();
        assert_eq!(c.dims(), &[2, 3]);
        assert_eq!(
            c.as_f32_slice(),
            Some(&[11.0, 22.0, 33.0, 14.0, 25.0, 36.0][..])
        );
    }

    #[test]
    fn test_calc_outer_broadcast() {
        let a = Tensor::from_f64(Shape::matrix(2, 1), &[1.0, 2.0]).unwrap();
        let b = Tensor::from_f64(Shape::matrix(1, 3), &[1.0, 10.0, 100.0]).unwrap();
        let c = calc(&a, &b, |x, y| x * y).unwrap().unwrap();
        assert_eq!(c.to_f64_vec(), vec![1.0, 10.0, 100.0, 2.0, 20.0, 200.0]);
    }

    #[test]
    fn test_calc_incompatible_returns_none() {
        let a = Tensor::zeros(Shape::matrix(3, 2), DType::F32);
        let b = Tensor::zeros(Shape::vector(4), DType::F32);
        assert!(calc(&a, &b, |x, y| x + y).unwrap().is_none());
    }

    #[test]
    fn test_calc_as_keeps_requested_dtype() {
        let a = Tensor::from_f32(Shape::vector(2), &[1.0, 5.0]).unwrap();
        let b = Tensor::from_f32(Shape::vector(1), &[3.0]).unwrap();
        let c = calc_as(&a, &b, |x, y| f64::from(u8::from(x > y)), DType::U8)
            .unwrap()
            .unwrap();
        assert_eq!(c.dtype(), DType::U8);
        assert_eq!(c.to_f64_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_calc_in_place() {
        let mut a = Tensor::from_i32(Shape::matrix(2, 2), &[1, 2, 3, 4]).unwrap();
        let b = Tensor::from_i32(Shape::vector(2), &[10, 20]).unwrap();
        assert!(calc_in_place(&mut a, &b, |x, y| x + y).unwrap());
        assert_eq!(a.to_f64_vec(), vec![11.0, 22.0, 13.0, 24.0]);

        let mut small = Tensor::from_i32(Shape::vector(2), &[1, 2]).unwrap();
        let big = Tensor::from_i32(Shape::matrix(2, 2), &[1, 2, 3, 4]).unwrap();
        assert!(!calc_in_place(&mut small, &big, |x, y| x + y).unwrap());
        assert_eq!(small.to_f64_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_is_valid_broadcast() {
        assert!(is_valid_broadcast(&[1, 4], &[2, 3, 4]));
        assert!(is_valid_broadcast(&[4], &[2, 4]));
        assert!(!is_valid_broadcast(&[3], &[2, 4]));
        assert!(!is_valid_broadcast(&[1, 2, 4], &[2, 4]));
    }

    #[test]
    fn test_broadcast_dims() {
        assert_eq!(broadcast_dims(&[1, 4], &[3, 4]), vec![0]);
        assert_eq!(broadcast_dims(&[3, 1, 1], &[2, 3, 5, 1]), vec![1]);
        assert!(broadcast_dims(&[4], &[2, 4]).is_empty());
    }
}
