// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shape and stride arithmetic.
//!
//! Every routine here is a pure function over row-major dimension lists.
//! Dimensions are `usize`; values that may legitimately be negative in an
//! operator description (axes, reshape hints, raw input dims) are `i64`.

use crate::error::{Result, ShapeError};

/// Largest rank accepted by [`validate_dims`].
pub const MAX_RANK: usize = 6;

/// Largest single dimension accepted by [`validate_dims`].
pub const MAX_DIM: i64 = i32::MAX as i64;

/// Returns the number of elements in a tensor of shape `dims`.
///
/// # Errors
/// Fails if any dimension is zero or the product overflows.
pub fn size(dims: &[usize]) -> Result<usize> {
    size_from_dimension_range(dims, 0, dims.len())
}

/// Product of `dims[axis..]`.
pub fn size_from_dimension(dims: &[usize], axis: usize) -> Result<usize> {
    if axis > dims.len() {
        return Err(ShapeError::AxisOutOfRange {
            axis: axis as i64,
            rank: dims.len(),
        });
    }
    size_from_dimension_range(dims, axis, dims.len())
}

/// Product of `dims[..axis]`.
pub fn size_to_dimension(dims: &[usize], axis: usize) -> Result<usize> {
    if axis > dims.len() {
        return Err(ShapeError::AxisOutOfRange {
            axis: axis as i64,
            rank: dims.len(),
        });
    }
    size_from_dimension_range(dims, 0, axis)
}

fn size_from_dimension_range(dims: &[usize], start: usize, end: usize) -> Result<usize> {
    dims[start..end].iter().try_fold(1usize, |acc, &d| {
        if d == 0 {
            return Err(ShapeError::shape(
                dims,
                "cannot get a valid size from a range containing a non-positive dimension",
            ));
        }
        acc.checked_mul(d)
            .ok_or_else(|| ShapeError::shape(dims, "element count overflows"))
    })
}

/// Computes row-major strides for `dims`.
///
/// A shape of rank below 2 gets `[1]`.
///
/// # Errors
/// Fails with [`ShapeError::InvalidShape`] if a stride overflows `usize`.
pub fn compute_strides(dims: &[usize]) -> Result<Vec<usize>> {
    let rank = dims.len();
    if rank < 2 {
        return Ok(vec![1]);
    }
    let mut strides = vec![1usize; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1]
            .checked_mul(dims[i + 1])
            .ok_or_else(|| ShapeError::shape(dims, "stride overflows"))?;
    }
    Ok(strides)
}

/// Converts a multi-index into a flat offset under `strides`.
///
/// # Errors
/// Fails with [`ShapeError::InvalidShape`] if the offset overflows `usize`.
pub fn indices_to_offset(indices: &[usize], strides: &[usize]) -> Result<usize> {
    indices
        .iter()
        .zip(strides)
        .try_fold(0usize, |acc, (&i, &s)| {
            i.checked_mul(s).and_then(|term| acc.checked_add(term))
        })
        .ok_or_else(|| ShapeError::shape(indices, "flat offset overflows"))
}

/// Converts a flat offset back into a multi-index under `strides`.
///
/// Inverse of [`indices_to_offset`] for offsets inside the shape the
/// strides were computed from. Empty strides give an empty index.
pub fn offset_to_indices(offset: usize, strides: &[usize]) -> Vec<usize> {
    let mut rest = offset;
    strides
        .iter()
        .map(|&s| {
            if s == 0 {
                return 0;
            }
            let i = rest / s;
            rest -= i * s;
            i
        })
        .collect()
}

/// Resolves a possibly negative axis against `rank`.
///
/// Accepts `axis` in `[-rank, rank - 1]`; negative values count from the end.
pub fn get_actual_axis_from_negative_value(axis: i64, rank: usize) -> Result<usize> {
    let r = rank as i64;
    if axis < -r || axis > r - 1 {
        return Err(ShapeError::AxisOutOfRange { axis, rank });
    }
    Ok((if axis < 0 { axis + r } else { axis }) as usize)
}

/// Resolves every axis in `axes` against `rank`.
pub fn normalize_axes(axes: &[i64], rank: usize) -> Result<Vec<usize>> {
    axes.iter()
        .map(|&a| get_actual_axis_from_negative_value(a, rank))
        .collect()
}

/// Advances `index` by one position in row-major order, like an odometer.
///
/// Only the leading `axis_to_increment_on` coordinates take part (all of
/// them when `None`); the last of those moves fastest and carries into
/// the one before it. The index wraps to zero after the final position.
///
/// # Errors
/// Scalars are unsupported. `axis_to_increment_on` must be in `1..=rank`.
pub fn increment_index(
    index: &mut [usize],
    dims: &[usize],
    axis_to_increment_on: Option<usize>,
) -> Result<()> {
    if dims.is_empty() || index.is_empty() {
        return Err(ShapeError::Unsupported(
            "index incrementing on a scalar tensor".into(),
        ));
    }
    let axis = match axis_to_increment_on {
        None => dims.len(),
        Some(a) if a == 0 || a > dims.len() => {
            return Err(ShapeError::AxisOutOfRange {
                axis: a as i64,
                rank: dims.len(),
            })
        }
        Some(a) => a,
    };
    if index.len() < axis {
        return Err(ShapeError::shape(index, "index is shorter than the axes it increments"));
    }

    for k in (0..axis).rev() {
        index[k] += 1;
        if index[k] < dims[k] {
            break;
        }
        index[k] = 0;
    }
    Ok(())
}

/// Resolves the target dimensions of a reshape.
///
/// In `shape_hints`, `0` copies the original dimension at the same
/// position and `-1` marks the single dimension inferred from the
/// remaining element count.
///
/// # Errors
/// Fails on hints below `-1`, on more than one `-1`, on a `0` past the
/// original rank, and when the element counts cannot be made to agree.
pub fn calculate_reshaped_dims(original_dims: &[usize], shape_hints: &[i64]) -> Result<Vec<usize>> {
    let mut reshaped = vec![0usize; shape_hints.len()];
    let mut unknown: Option<usize> = None;
    let mut known_size = 1usize;

    for (i, &hint) in shape_hints.iter().enumerate() {
        match hint {
            h if h < -1 => {
                return Err(ShapeError::attribute(
                    "shape",
                    format!("dimension {h} at position {i} is less than -1"),
                ))
            }
            -1 => {
                if unknown.is_some() {
                    return Err(ShapeError::attribute(
                        "shape",
                        "at most one dimension can be -1",
                    ));
                }
                unknown = Some(i);
                continue;
            }
            0 => {
                reshaped[i] = *original_dims.get(i).ok_or_else(|| {
                    ShapeError::attribute(
                        "shape",
                        format!("zero at position {i} exceeds the input rank {}", original_dims.len()),
                    )
                })?;
            }
            h => reshaped[i] = h as usize,
        }
        known_size = known_size
            .checked_mul(reshaped[i])
            .ok_or_else(|| ShapeError::shape(&reshaped, "element count overflows"))?;
    }

    let original_size = size(original_dims)?;
    match unknown {
        Some(i) => {
            if known_size == 0 || original_size % known_size != 0 {
                return Err(ShapeError::attribute(
                    "shape",
                    format!("input of shape {original_dims:?} cannot be reshaped to {shape_hints:?}"),
                ));
            }
            reshaped[i] = original_size / known_size;
            tracing::debug!(position = i, dim = reshaped[i], "inferred reshape dimension");
        }
        None if known_size != original_size => {
            return Err(ShapeError::attribute(
                "shape",
                format!(
                    "reshaped size {known_size} does not match input size {original_size}"
                ),
            ))
        }
        None => {}
    }
    Ok(reshaped)
}

/// Permutes `a` by `perm`, or reverses it when no permutation is given.
pub fn sort_based_on_perm<T: Copy>(a: &[T], perm: Option<&[usize]>) -> Result<Vec<T>> {
    match perm {
        None => Ok(a.iter().rev().copied().collect()),
        Some(p) => {
            if p.len() != a.len() {
                return Err(ShapeError::attribute(
                    "perm",
                    format!("length {} does not match rank {}", p.len(), a.len()),
                ));
            }
            p.iter()
                .map(|&i| {
                    a.get(i).copied().ok_or(ShapeError::AxisOutOfRange {
                        axis: i as i64,
                        rank: a.len(),
                    })
                })
                .collect()
        }
    }
}

/// Default transpose: the dimensions in reverse order.
pub fn transpose_shape(dims: &[usize]) -> Vec<usize> {
    dims.iter().rev().copied().collect()
}

/// Expands `dims` by head pads `pads[..rank]` and tail pads `pads[rank..]`.
pub fn pad_shape(dims: &[usize], pads: &[i64]) -> Result<Vec<usize>> {
    let rank = dims.len();
    if pads.len() != 2 * rank {
        return Err(ShapeError::attribute(
            "pads",
            format!("expected {} values for rank {rank}, got {}", 2 * rank, pads.len()),
        ));
    }
    dims.iter()
        .enumerate()
        .map(|(i, &d)| {
            let padded = d as i64 + pads[i] + pads[i + rank];
            if padded <= 0 {
                return Err(ShapeError::shape(dims, format!("padding leaves axis {i} empty")));
            }
            Ok(padded as usize)
        })
        .collect()
}

/// Returns `true` if both shapes have the same rank and dimensions.
pub fn are_equal(a: &[usize], b: &[usize]) -> bool {
    a == b
}

/// Splits `dims` into the dimension at `pick` and all the others, in order.
pub fn split_dims_into_two(dims: &[usize], pick: usize) -> (Vec<usize>, Vec<usize>) {
    let mut picked = Vec::with_capacity(1);
    let mut remnants = Vec::with_capacity(dims.len());
    for (i, &d) in dims.iter().enumerate() {
        if i == pick {
            picked.push(d);
        } else {
            remnants.push(d);
        }
    }
    (picked, remnants)
}

/// Checks a raw dimension list and converts it to `usize`.
///
/// # Errors
/// Fails if the rank is outside `1..=6` or any dimension is not in
/// `1..=2^31 - 1`. Rank 0 is reported as unsupported.
pub fn validate_dims(dims: &[i64]) -> Result<Vec<usize>> {
    if dims.is_empty() {
        return Err(ShapeError::Unsupported("scalar tensors are not supported".into()));
    }
    if dims.len() > MAX_RANK {
        return Err(ShapeError::InvalidShape {
            dims: dims.to_vec(),
            reason: format!("rank {} exceeds the maximum of {MAX_RANK}", dims.len()),
        });
    }
    dims.iter()
        .map(|&d| {
            if d <= 0 || d > MAX_DIM {
                return Err(ShapeError::InvalidShape {
                    dims: dims.to_vec(),
                    reason: format!("dimension {d} must be in [1, {MAX_DIM}]"),
                });
            }
            Ok(d as usize)
        })
        .collect()
}

/// Removes size-1 axes.
///
/// With no `axes`, every size-1 dimension goes; otherwise exactly the
/// listed axes go and each of them must have size 1.
pub fn squeeze_shape(dims: &[usize], axes: &[i64]) -> Result<Vec<usize>> {
    let axes = normalize_axes(axes, dims.len())?;
    let mut out = Vec::with_capacity(dims.len());
    for (i, &d) in dims.iter().enumerate() {
        let listed = axes.contains(&i);
        if listed && d != 1 {
            return Err(ShapeError::shape(
                dims,
                format!("cannot squeeze axis {i} of size {d}"),
            ));
        }
        if (axes.is_empty() && d != 1) || (!axes.is_empty() && !listed) {
            out.push(d);
        }
    }
    Ok(out)
}

/// Inserts size-1 axes at the given positions of the output shape.
pub fn unsqueeze_shape(dims: &[usize], axes: &[i64]) -> Result<Vec<usize>> {
    let out_rank = dims.len() + axes.len();
    let mut inserted = vec![false; out_rank];
    for &a in axes {
        let axis = get_actual_axis_from_negative_value(a, out_rank)?;
        if inserted[axis] {
            return Err(ShapeError::attribute("axes", format!("duplicate axis {a}")));
        }
        inserted[axis] = true;
    }

    let mut remaining = dims.iter();
    Ok(inserted
        .iter()
        .map(|&ins| if ins { 1 } else { remaining.next().copied().unwrap_or(1) })
        .collect())
}

/// Collapses `dims` into a matrix split at `axis`.
///
/// `axis` may be in `[-rank, rank]`; the result is
/// `[size_to_dimension(axis), size_from_dimension(axis)]`.
pub fn flatten_shape(dims: &[usize], axis: i64) -> Result<Vec<usize>> {
    let rank = dims.len() as i64;
    if axis < -rank || axis > rank {
        return Err(ShapeError::AxisOutOfRange {
            axis,
            rank: dims.len(),
        });
    }
    let axis = (if axis < 0 { axis + rank } else { axis }) as usize;
    Ok(vec![
        size_to_dimension(dims, axis)?,
        size_from_dimension(dims, axis)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_variants() {
        let dims = [2, 3, 4];
        assert_eq!(size(&dims).unwrap(), 24);
        assert_eq!(size_from_dimension(&dims, 1).unwrap(), 12);
        assert_eq!(size_to_dimension(&dims, 1).unwrap(), 2);
        assert_eq!(size_from_dimension(&dims, 3).unwrap(), 1);
        assert!(size_from_dimension(&dims, 4).is_err());
        assert!(size_to_dimension(&dims, 4).is_err());
    }

    #[test]
    fn test_size_rejects_zero_dimension() {
        assert!(size(&[2, 0, 3]).is_err());
        // A zero outside the requested range is not inspected.
        assert_eq!(size_from_dimension(&[0, 3], 1).unwrap(), 3);
    }

    #[test]
    fn test_compute_strides() {
        assert_eq!(compute_strides(&[2, 3, 4]).unwrap(), vec![12, 4, 1]);
        assert_eq!(compute_strides(&[5]).unwrap(), vec![1]);
        assert_eq!(compute_strides(&[]).unwrap(), vec![1]);
    }

    #[test]
    fn test_offset_indices_conversion() {
        let strides = compute_strides(&[2, 3, 4]).unwrap();
        assert_eq!(indices_to_offset(&[1, 2, 3], &strides).unwrap(), 23);
        assert_eq!(offset_to_indices(23, &strides), vec![1, 2, 3]);
        assert_eq!(indices_to_offset(&[], &[]).unwrap(), 0);
        assert!(offset_to_indices(0, &[]).is_empty());
    }

    #[test]
    fn test_huge_valid_dims_report_overflow() {
        let raw = [MAX_DIM; 4];
        let dims = validate_dims(&raw).unwrap();
        assert!(matches!(size(&dims), Err(ShapeError::InvalidShape { .. })));
        assert!(matches!(
            compute_strides(&dims),
            Err(ShapeError::InvalidShape { .. })
        ));
        assert!(matches!(
            indices_to_offset(&[usize::MAX, 1], &[2, 1]),
            Err(ShapeError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_negative_axis() {
        assert_eq!(get_actual_axis_from_negative_value(-1, 4).unwrap(), 3);
        assert_eq!(get_actual_axis_from_negative_value(-4, 4).unwrap(), 0);
        assert_eq!(get_actual_axis_from_negative_value(2, 4).unwrap(), 2);
        assert!(get_actual_axis_from_negative_value(-5, 4).is_err());
        assert!(get_actual_axis_from_negative_value(4, 4).is_err());
    }

    #[test]
    fn test_increment_index_carries() {
        let dims = [2, 3];
        let mut index = vec![0, 2];
        increment_index(&mut index, &dims, None).unwrap();
        assert_eq!(index, vec![1, 0]);

        let mut last = vec![1, 2];
        increment_index(&mut last, &dims, None).unwrap();
        assert_eq!(last, vec![0, 0]);
    }

    #[test]
    fn test_increment_index_on_leading_axes() {
        let dims = [2, 3, 4];
        let mut index = vec![0, 2, 3];
        increment_index(&mut index, &dims, Some(2)).unwrap();
        assert_eq!(index, vec![1, 0, 3]);
        assert!(increment_index(&mut index, &dims, Some(0)).is_err());
        assert!(increment_index(&mut index, &dims, Some(4)).is_err());
        assert!(increment_index(&mut [], &[], None).is_err());
    }

    #[test]
    fn test_reshape_hints() {
        assert_eq!(calculate_reshaped_dims(&[2, 2], &[0, -1]).unwrap(), vec![2, 2]);
        assert_eq!(calculate_reshaped_dims(&[2, 2], &[4]).unwrap(), vec![4]);
        assert_eq!(
            calculate_reshaped_dims(&[2, 3, 4], &[-1, 4]).unwrap(),
            vec![6, 4]
        );
        assert!(calculate_reshaped_dims(&[2, 2], &[5]).is_err());
    }

    #[test]
    fn test_reshape_rejects_bad_hints() {
        assert!(calculate_reshaped_dims(&[2, 2], &[-1, -1]).is_err());
        assert!(calculate_reshaped_dims(&[2, 2], &[-2, 2]).is_err());
        assert!(calculate_reshaped_dims(&[4], &[2, 0]).is_err());
        assert!(calculate_reshaped_dims(&[2, 5], &[3, -1]).is_err());
    }

    #[test]
    fn test_sort_based_on_perm() {
        assert_eq!(sort_based_on_perm(&[1, 2, 3], None).unwrap(), vec![3, 2, 1]);
        assert_eq!(
            sort_based_on_perm(&[5, 6, 7], Some(&[1, 2, 0][..])).unwrap(),
            vec![6, 7, 5]
        );
        assert!(sort_based_on_perm(&[5, 6], Some(&[0, 2][..])).is_err());
        assert!(sort_based_on_perm(&[5, 6], Some(&[0][..])).is_err());
    }

    #[test]
    fn test_pad_shape() {
        assert_eq!(pad_shape(&[2, 3], &[1, 0, 1, 2]).unwrap(), vec![4, 5]);
        assert!(pad_shape(&[2, 3], &[1, 1]).is_err());
        assert!(pad_shape(&[2], &[-1, -1]).is_err());
    }

    #[test]
    fn test_split_dims_into_two() {
        let (picked, rest) = split_dims_into_two(&[2, 3, 4], 1);
        assert_eq!(picked, vec![3]);
        assert_eq!(rest, vec![2, 4]);
    }

    #[test]
    fn test_validate_dims() {
        assert_eq!(validate_dims(&[1, 3, 224, 224]).unwrap(), vec![1, 3, 224, 224]);
        assert!(matches!(validate_dims(&[]), Err(ShapeError::Unsupported(_))));
        assert!(validate_dims(&[1; 7]).is_err());
        assert!(validate_dims(&[2, 0]).is_err());
        assert!(validate_dims(&[2, -3]).is_err());
        assert!(validate_dims(&[MAX_DIM + 1]).is_err());
        assert!(validate_dims(&[MAX_DIM]).is_ok());
    }

    #[test]
    fn test_squeeze_shape() {
        assert_eq!(squeeze_shape(&[1, 3, 1, 4], &[]).unwrap(), vec![3, 4]);
        assert_eq!(squeeze_shape(&[1, 3, 1, 4], &[-2]).unwrap(), vec![1, 3, 4]);
        assert!(squeeze_shape(&[1, 3], &[1]).is_err());
    }

    #[test]
    fn test_unsqueeze_shape() {
        assert_eq!(unsqueeze_shape(&[3, 4], &[0, 3]).unwrap(), vec![1, 3, 4, 1]);
        assert_eq!(unsqueeze_shape(&[3, 4], &[-1]).unwrap(), vec![3, 4, 1]);
        assert!(unsqueeze_shape(&[3, 4], &[1, 1]).is_err());
        assert!(unsqueeze_shape(&[3, 4], &[3]).is_err());
    }

    #[test]
    fn test_flatten_shape() {
        assert_eq!(flatten_shape(&[2, 3, 4], 1).unwrap(), vec![2, 12]);
        assert_eq!(flatten_shape(&[2, 3, 4], 0).unwrap(), vec![1, 24]);
        assert_eq!(flatten_shape(&[2, 3, 4], -1).unwrap(), vec![6, 4]);
        assert_eq!(flatten_shape(&[2, 3, 4], 3).unwrap(), vec![24, 1]);
        assert!(flatten_shape(&[2, 3, 4], 4).is_err());
    }
}
