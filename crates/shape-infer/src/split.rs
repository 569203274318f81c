// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Split output shapes.

use crate::error::{Result, ShapeError};
use crate::shape::get_actual_axis_from_negative_value;

/// Shapes and start offsets of the pieces produced by a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitShapes {
    /// One shape per output, equal to the input except along the split axis.
    pub shapes: Vec<Vec<usize>>,
    /// Start position of each output along the split axis.
    pub offsets: Vec<usize>,
}

/// Splits `dims` along `axis`.
///
/// With explicit `split` sizes they must add up to `dims[axis]`. With an
/// empty `split`, `dims[axis]` is divided into `num_outputs` equal parts.
///
/// # Errors
/// Fails on an out-of-range axis, on a missing `num_outputs` when `split`
/// is empty, and on sizes that do not partition the axis.
pub fn split_shape(
    dims: &[usize],
    axis: i64,
    split: &[usize],
    num_outputs: Option<usize>,
) -> Result<SplitShapes> {
    let axis = get_actual_axis_from_negative_value(axis, dims.len())?;
    let extent = dims[axis];

    let sizes = if split.is_empty() {
        let parts = num_outputs.filter(|&n| n > 0).ok_or_else(|| {
            ShapeError::attribute(
                "split",
                "number of outputs is required when split sizes are not given",
            )
        })?;
        determine_split(extent, parts)?
    } else {
        let total = split
            .iter()
            .try_fold(0usize, |acc, &s| acc.checked_add(s))
            .ok_or_else(|| {
                ShapeError::attribute("split", format!("sizes {split:?} overflow their sum"))
            })?;
        if total != extent {
            return Err(ShapeError::attribute(
                "split",
                format!("sizes {split:?} do not add up to dimension {extent}"),
            ));
        }
        split.to_vec()
    };

    let mut offsets = Vec::with_capacity(sizes.len());
    let mut start = 0;
    let shapes = sizes
        .iter()
        .map(|&size| {
            offsets.push(start);
            start += size;
            let mut shape = dims.to_vec();
            shape[axis] = size;
            shape
        })
        .collect();
    Ok(SplitShapes { shapes, offsets })
}

fn determine_split(extent: usize, parts: usize) -> Result<Vec<usize>> {
    if extent % parts != 0 {
        return Err(ShapeError::attribute(
            "split",
            format!("cannot split dimension {extent} into {parts} equal parts"),
        ));
    }
    tracing::debug!(extent, parts, "equal split derived");
    Ok(vec![extent / parts; parts])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_split() {
        let out = split_shape(&[1, 9, 4], 1, &[], Some(3)).unwrap();
        assert_eq!(out.shapes, vec![vec![1, 3, 4]; 3]);
        assert_eq!(out.offsets, vec![0, 3, 6]);
    }

    #[test]
    fn test_explicit_split_negative_axis() {
        let out = split_shape(&[2, 10], -1, &[3, 7], None).unwrap();
        assert_eq!(out.shapes, vec![vec![2, 3], vec![2, 7]]);
        assert_eq!(out.offsets, vec![0, 3]);
    }

    #[test]
    fn test_split_errors() {
        assert!(split_shape(&[1, 10, 4], 1, &[], Some(3)).is_err());
        assert!(split_shape(&[1, 9, 4], 1, &[], None).is_err());
        assert!(split_shape(&[1, 9, 4], 1, &[4, 4], None).is_err());
        assert!(split_shape(&[1, 9, 4], 3, &[], Some(3)).is_err());
    }

    #[test]
    fn test_split_sizes_overflowing_sum() {
        let err = split_shape(&[1, 9, 4], 1, &[usize::MAX, 2], None).unwrap_err();
        assert!(matches!(err, ShapeError::InvalidAttribute { .. }));
    }
}
