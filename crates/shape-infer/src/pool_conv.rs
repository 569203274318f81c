// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pooling and convolution attribute normalisation and output shapes.
//!
//! Inputs are laid out `[batch, channels, spatial...]`. Attribute vectors
//! cover the spatial axes only: `kernel_shape`, `strides` and `dilations`
//! have one entry per spatial axis, `pads` holds all head pads followed by
//! all tail pads. An empty `dilations` slice means a dilation of 1
//! everywhere.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ShapeError};

/// Padding policy that derives pads from input, kernel and stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AutoPad {
    /// Use the explicit `pads` attribute.
    #[default]
    NotSet,
    /// No padding.
    Valid,
    /// Pad so that `out = ceil(in / stride)`; the odd pad goes to the tail.
    SameUpper,
    /// Same total pad as [`AutoPad::SameUpper`]; the odd pad goes to the head.
    SameLower,
}

impl AutoPad {
    /// Parses an `auto_pad` attribute value.
    ///
    /// The empty string and `NOTSET` both mean "use explicit pads".
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "" | "NOTSET" => Ok(Self::NotSet),
            "VALID" => Ok(Self::Valid),
            "SAME_UPPER" => Ok(Self::SameUpper),
            "SAME_LOWER" => Ok(Self::SameLower),
            other => Err(ShapeError::Unsupported(format!("auto_pad type '{other}'"))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotSet => "NOTSET",
            Self::Valid => "VALID",
            Self::SameUpper => "SAME_UPPER",
            Self::SameLower => "SAME_LOWER",
        }
    }
}

impl FromStr for AutoPad {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AutoPad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_auto_pad(auto_pad: Option<&str>) -> Result<AutoPad> {
    auto_pad.map_or(Ok(AutoPad::NotSet), AutoPad::parse)
}

fn spatial_rank(input_dims: &[usize]) -> Result<usize> {
    input_dims.len().checked_sub(2).ok_or_else(|| {
        ShapeError::shape(
            input_dims,
            "expected at least batch and channel dimensions",
        )
    })
}

/// Normalises pooling attributes in place.
///
/// For global pooling the kernel is overwritten with the input's spatial
/// extents. Missing strides default to 1 and missing pads to 0. Nothing is
/// written unless every check passes, so callers may pass their own
/// attribute vectors directly.
///
/// # Errors
/// Fails if a non-global kernel does not cover exactly the spatial axes, on
/// strides below 1, on negative pads, on non-positive kernel dimensions,
/// and on any pad not strictly smaller than its kernel dimension.
pub fn adjust_pool_attributes(
    is_global: bool,
    input_dims: &[usize],
    kernel_shape: &mut Vec<i64>,
    strides: &mut Vec<i64>,
    pads: &mut Vec<i64>,
) -> Result<()> {
    let spatial = spatial_rank(input_dims)?;
    if !is_global && kernel_shape.len() != spatial {
        return Err(ShapeError::attribute(
            "kernel_shape",
            format!(
                "expected {spatial} values for input rank {}, got {}",
                input_dims.len(),
                kernel_shape.len()
            ),
        ));
    }

    let mut kernel = kernel_shape.clone();
    if is_global {
        if kernel.len() < spatial {
            kernel.resize(spatial, 0);
        }
        for (k, &d) in kernel.iter_mut().zip(&input_dims[2..]) {
            *k = d as i64;
        }
        tracing::debug!(kernel = ?kernel, "global pooling kernel set from input extents");
    }
    let rank = kernel.len();

    if let Some(&s) = strides.iter().take(rank).find(|&&s| s < 1) {
        return Err(ShapeError::attribute(
            "strides",
            format!("stride {s} must be at least 1"),
        ));
    }
    if let Some(&p) = pads.iter().take(2 * rank).find(|&&p| p < 0) {
        return Err(ShapeError::attribute(
            "pads",
            format!("pad {p} must not be negative"),
        ));
    }

    let mut new_pads = pads.clone();
    if new_pads.len() < 2 * rank {
        new_pads.resize(2 * rank, 0);
    }
    for (dim, &k) in kernel.iter().enumerate() {
        if k <= 0 {
            return Err(ShapeError::attribute(
                "kernel_shape",
                format!("kernel dimension {k} must be greater than 0"),
            ));
        }
        if new_pads[dim] >= k || new_pads[dim + rank] >= k {
            return Err(ShapeError::attribute(
                "pads",
                format!("pads on axis {dim} must be smaller than kernel dimension {k}"),
            ));
        }
    }

    if strides.len() < rank {
        strides.resize(rank, 1);
    }
    *pads = new_pads;
    *kernel_shape = kernel;
    Ok(())
}

/// Recomputes `pads` from the auto-pad policy.
///
/// A no-op when `auto_pad` is absent, empty or `NOTSET`.
///
/// # Errors
/// Fails on attribute lengths that do not match the spatial rank, on
/// unknown policies, and on `SAME_*` combined with a dilation other than 1.
pub fn adjust_pads_based_on_auto_pad(
    input_dims: &[usize],
    strides: &[i64],
    dilations: &[i64],
    kernel_shape: &[i64],
    pads: &mut [i64],
    auto_pad: Option<&str>,
) -> Result<()> {
    let auto_pad = parse_auto_pad(auto_pad)?;
    if auto_pad == AutoPad::NotSet {
        return Ok(());
    }

    let spatial = spatial_rank(input_dims)?;
    if pads.len() != 2 * spatial {
        return Err(ShapeError::attribute(
            "pads",
            format!("expected {} values, got {}", 2 * spatial, pads.len()),
        ));
    }
    check_spatial_lengths(spatial, strides, dilations, kernel_shape)?;

    let mut adjusted = pads.to_vec();
    for dim in 0..spatial {
        adjust_pad_and_return_shape(
            input_dims[dim + 2],
            strides[dim],
            dilation_at(dilations, dim),
            kernel_shape[dim],
            &mut adjusted,
            dim,
            dim + spatial,
            auto_pad,
        )?;
    }
    tracing::debug!(auto_pad = %auto_pad, pads = ?adjusted, "pads derived from auto_pad");
    pads.copy_from_slice(&adjusted);
    Ok(())
}

/// Output shape of a pooling operator: `[batch, channels, spatial...]`.
///
/// Global pooling collapses every spatial axis to 1. Otherwise each axis is
/// derived from the pads, or from `auto_pad` in which case `pads` is
/// rewritten with the derived values.
///
/// # Examples
/// ```
/// use shape_infer::pool_conv::compute_pool_output_shape;
/// let mut pads = vec![0, 0, 0, 0];
/// let out = compute_pool_output_shape(false, &[1, 3, 32, 32], &[1, 1], &[], &[2, 2], &mut pads, None)
///     .unwrap();
/// assert_eq!(out, vec![1, 3, 31, 31]);
/// ```
pub fn compute_pool_output_shape(
    is_global: bool,
    input_dims: &[usize],
    strides: &[i64],
    dilations: &[i64],
    kernel_shape: &[i64],
    pads: &mut [i64],
    auto_pad: Option<&str>,
) -> Result<Vec<usize>> {
    spatial_rank(input_dims)?;
    let mut output = vec![input_dims[0], input_dims[1]];
    compute_shape_helper(
        is_global,
        input_dims,
        &mut output,
        strides,
        dilations,
        kernel_shape,
        pads,
        auto_pad,
    )?;
    Ok(output)
}

/// Output shape of a convolution: `[batch, filters, spatial...]`, where
/// `filters` is the leading dimension of `filter_dims`.
pub fn compute_conv_output_shape(
    input_dims: &[usize],
    filter_dims: &[usize],
    strides: &[i64],
    dilations: &[i64],
    kernel_shape: &[i64],
    pads: &mut [i64],
    auto_pad: Option<&str>,
) -> Result<Vec<usize>> {
    spatial_rank(input_dims)?;
    let Some(&filters) = filter_dims.first() else {
        return Err(ShapeError::shape(filter_dims, "filter must have at least one dimension"));
    };
    let mut output = vec![input_dims[0], filters];
    compute_shape_helper(
        false,
        input_dims,
        &mut output,
        strides,
        dilations,
        kernel_shape,
        pads,
        auto_pad,
    )?;
    Ok(output)
}

#[allow(clippy::too_many_arguments)]
fn compute_shape_helper(
    is_global: bool,
    input_dims: &[usize],
    output: &mut Vec<usize>,
    strides: &[i64],
    dilations: &[i64],
    kernel_shape: &[i64],
    pads: &mut [i64],
    auto_pad: Option<&str>,
) -> Result<()> {
    let spatial = input_dims.len() - 2;
    if is_global {
        output.extend(std::iter::repeat(1).take(spatial));
        return Ok(());
    }

    let auto_pad = parse_auto_pad(auto_pad)?;
    check_spatial_lengths(spatial, strides, dilations, kernel_shape)?;
    if pads.len() != 2 * spatial {
        return Err(ShapeError::attribute(
            "pads",
            format!("expected {} values, got {}", 2 * spatial, pads.len()),
        ));
    }

    let mut adjusted = pads.to_vec();
    for dim in 0..spatial {
        output.push(adjust_pad_and_return_shape(
            input_dims[dim + 2],
            strides[dim],
            dilation_at(dilations, dim),
            kernel_shape[dim],
            &mut adjusted,
            dim,
            dim + spatial,
            auto_pad,
        )?);
    }
    pads.copy_from_slice(&adjusted);
    Ok(())
}

fn check_spatial_lengths(
    spatial: usize,
    strides: &[i64],
    dilations: &[i64],
    kernel_shape: &[i64],
) -> Result<()> {
    if strides.len() != spatial {
        return Err(ShapeError::attribute(
            "strides",
            format!("expected {spatial} values, got {}", strides.len()),
        ));
    }
    if !dilations.is_empty() && dilations.len() != spatial {
        return Err(ShapeError::attribute(
            "dilations",
            format!("expected {spatial} values, got {}", dilations.len()),
        ));
    }
    if kernel_shape.len() != spatial {
        return Err(ShapeError::attribute(
            "kernel_shape",
            format!("expected {spatial} values, got {}", kernel_shape.len()),
        ));
    }
    Ok(())
}

fn dilation_at(dilations: &[i64], dim: usize) -> i64 {
    dilations.get(dim).copied().unwrap_or(1)
}

/// Derives one spatial output extent, rewriting `pads[head]`/`pads[tail]`
/// when an auto-pad policy is active.
#[allow(clippy::too_many_arguments)]
fn adjust_pad_and_return_shape(
    in_size: usize,
    stride: i64,
    dilation: i64,
    kernel: i64,
    pads: &mut [i64],
    head: usize,
    tail: usize,
    auto_pad: AutoPad,
) -> Result<usize> {
    if stride < 1 {
        return Err(ShapeError::attribute(
            "strides",
            format!("stride {stride} must be at least 1"),
        ));
    }
    if dilation < 1 {
        return Err(ShapeError::attribute(
            "dilations",
            format!("dilation {dilation} must be at least 1"),
        ));
    }
    if kernel < 1 {
        return Err(ShapeError::attribute(
            "kernel_shape",
            format!("kernel dimension {kernel} must be greater than 0"),
        ));
    }

    let in_size = in_size as i64;
    let dkernel = dilation * (kernel - 1) + 1;
    let out = match auto_pad {
        AutoPad::NotSet => (in_size + pads[head] + pads[tail] - dkernel).div_euclid(stride) + 1,
        AutoPad::Valid => {
            pads[head] = 0;
            pads[tail] = 0;
            (in_size - dkernel).div_euclid(stride) + 1
        }
        AutoPad::SameUpper | AutoPad::SameLower => {
            if dilation != 1 {
                return Err(ShapeError::Unsupported(format!(
                    "dilation {dilation} with auto_pad {auto_pad}"
                )));
            }
            let target = (in_size + stride - 1) / stride;
            let pad_needed = ((target - 1) * stride + kernel - in_size).max(0);
            let pad_head = if auto_pad == AutoPad::SameLower {
                (pad_needed + 1) / 2
            } else {
                pad_needed / 2
            };
            pads[head] = pad_head;
            pads[tail] = pad_needed - pad_head;
            (in_size + pad_needed - kernel).div_euclid(stride) + 1
        }
    };

    if out < 1 {
        return Err(ShapeError::InvalidShape {
            dims: vec![in_size],
            reason: format!("kernel {dkernel} with stride {stride} leaves an empty output axis"),
        });
    }
    Ok(out as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_pad_parse() {
        assert_eq!(AutoPad::parse("").unwrap(), AutoPad::NotSet);
        assert_eq!("SAME_LOWER".parse::<AutoPad>().unwrap(), AutoPad::SameLower);
        assert!(matches!(
            AutoPad::parse("SAME"),
            Err(ShapeError::Unsupported(_))
        ));
    }

    #[test]
    fn test_adjust_pool_attributes_fills_defaults() {
        let mut kernel = vec![3, 3];
        let mut strides = vec![2];
        let mut pads = vec![1];
        adjust_pool_attributes(false, &[1, 3, 8, 8], &mut kernel, &mut strides, &mut pads).unwrap();
        assert_eq!(kernel, vec![3, 3]);
        assert_eq!(strides, vec![2, 1]);
        assert_eq!(pads, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_adjust_pool_attributes_global_overwrites_kernel() {
        let mut kernel = vec![2];
        let mut strides = vec![];
        let mut pads = vec![];
        adjust_pool_attributes(true, &[2, 4, 7, 5], &mut kernel, &mut strides, &mut pads).unwrap();
        assert_eq!(kernel, vec![7, 5]);
        assert_eq!(strides, vec![1, 1]);
        assert_eq!(pads, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_adjust_pool_attributes_rejects_without_mutating() {
        let mut kernel = vec![2, 2];
        let mut strides = vec![1];
        let mut pads = vec![0, 2];
        let err = adjust_pool_attributes(false, &[1, 1, 4, 4], &mut kernel, &mut strides, &mut pads);
        assert!(err.is_err());
        assert_eq!(strides, vec![1]);
        assert_eq!(pads, vec![0, 2]);
    }

    #[test]
    fn test_adjust_pool_attributes_errors() {
        let run = |kernel: Vec<i64>, strides: Vec<i64>, pads: Vec<i64>| {
            let (mut k, mut s, mut p) = (kernel, strides, pads);
            adjust_pool_attributes(false, &[1, 1, 4, 4], &mut k, &mut s, &mut p)
        };
        assert!(run(vec![2], vec![], vec![]).is_err());
        assert!(run(vec![2, 2], vec![-1], vec![]).is_err());
        assert!(run(vec![2, 2], vec![0, 1], vec![]).is_err());
        assert!(run(vec![2, 2], vec![], vec![-1]).is_err());
        assert!(run(vec![0, 2], vec![], vec![]).is_err());
        assert!(run(vec![2, 2], vec![1, 1], vec![1, 1, 1, 1]).is_ok());
    }

    #[test]
    fn test_auto_pad_same_upper_and_lower() {
        let mut pads = vec![0, 0];
        adjust_pads_based_on_auto_pad(&[1, 1, 32], &[2], &[], &[3], &mut pads, Some("SAME_UPPER"))
            .unwrap();
        assert_eq!(pads, vec![0, 1]);

        let mut pads = vec![0, 0];
        adjust_pads_based_on_auto_pad(&[1, 1, 32], &[2], &[], &[3], &mut pads, Some("SAME_LOWER"))
            .unwrap();
        assert_eq!(pads, vec![1, 0]);
    }

    #[test]
    fn test_same_pads_never_negative_when_stride_exceeds_kernel() {
        for policy in ["SAME_UPPER", "SAME_LOWER"] {
            let mut pads = vec![3, 3];
            let out = compute_pool_output_shape(
                false,
                &[1, 2, 32],
                &[4],
                &[],
                &[1],
                &mut pads,
                Some(policy),
            )
            .unwrap();
            assert_eq!(out, vec![1, 2, 8]);
            assert_eq!(pads, vec![0, 0]);
        }
    }

    #[test]
    fn test_conv_same_pads_split_odd_and_even() {
        let run = |policy: &str| {
            let mut pads = vec![0; 4];
            let out = compute_conv_output_shape(
                &[1, 1, 10, 9],
                &[2, 1, 4, 3],
                &[1, 1],
                &[],
                &[4, 3],
                &mut pads,
                Some(policy),
            )
            .unwrap();
            (out, pads)
        };

        // Height needs 3 padding cells, width needs 2.
        let (out, pads) = run("SAME_LOWER");
        assert_eq!(out, vec![1, 2, 10, 9]);
        assert_eq!(pads, vec![2, 1, 1, 1]);

        let (out, pads) = run("SAME_UPPER");
        assert_eq!(out, vec![1, 2, 10, 9]);
        assert_eq!(pads, vec![1, 1, 2, 1]);
    }

    #[test]
    fn test_auto_pad_noop_and_errors() {
        let mut pads = vec![5, 5];
        adjust_pads_based_on_auto_pad(&[1, 1, 32], &[2], &[], &[3], &mut pads, None).unwrap();
        adjust_pads_based_on_auto_pad(&[1, 1, 32], &[2], &[], &[3], &mut pads, Some("NOTSET"))
            .unwrap();
        assert_eq!(pads, vec![5, 5]);

        assert!(adjust_pads_based_on_auto_pad(&[1, 1, 32], &[2], &[], &[3], &mut [0], Some("VALID"))
            .is_err());
        assert!(
            adjust_pads_based_on_auto_pad(&[1, 1, 32], &[2, 2], &[], &[3], &mut pads, Some("VALID"))
                .is_err()
        );
        assert!(
            adjust_pads_based_on_auto_pad(&[1, 1, 32], &[2], &[], &[3], &mut pads, Some("FULL"))
                .is_err()
        );
        assert!(
            adjust_pads_based_on_auto_pad(&[1, 1, 32], &[1], &[2], &[3], &mut pads, Some("SAME_UPPER"))
                .is_err()
        );
        assert_eq!(pads, vec![5, 5]);
    }

    #[test]
    fn test_pool_output_shape_explicit_pads() {
        let mut pads = vec![0, 0, 0, 0];
        let out =
            compute_pool_output_shape(false, &[1, 3, 32, 32], &[1, 1], &[], &[2, 2], &mut pads, None)
                .unwrap();
        assert_eq!(out, vec![1, 3, 31, 31]);

        let mut pads = vec![1, 1, 1, 1];
        let out =
            compute_pool_output_shape(false, &[1, 3, 7, 7], &[2, 2], &[], &[3, 3], &mut pads, None)
                .unwrap();
        assert_eq!(out, vec![1, 3, 4, 4]);
    }

    #[test]
    fn test_pool_output_shape_auto_pad() {
        let mut pads = vec![0, 0];
        let out = compute_pool_output_shape(
            false,
            &[1, 3, 32],
            &[2],
            &[],
            &[3],
            &mut pads,
            Some("SAME_UPPER"),
        )
        .unwrap();
        assert_eq!(out, vec![1, 3, 16]);
        assert_eq!(pads, vec![0, 1]);

        let mut pads = vec![4, 4];
        let out =
            compute_pool_output_shape(false, &[1, 3, 32], &[2], &[], &[3], &mut pads, Some("VALID"))
                .unwrap();
        assert_eq!(out, vec![1, 3, 15]);
        assert_eq!(pads, vec![0, 0]);
    }

    #[test]
    fn test_global_pool_output_shape() {
        let out = compute_pool_output_shape(true, &[2, 8, 5, 9], &[], &[], &[], &mut [], None).unwrap();
        assert_eq!(out, vec![2, 8, 1, 1]);
    }

    #[test]
    fn test_conv_output_shape() {
        let mut pads = vec![1, 1, 1, 1];
        let out = compute_conv_output_shape(
            &[1, 3, 224, 224],
            &[64, 3, 3, 3],
            &[1, 1],
            &[],
            &[3, 3],
            &mut pads,
            None,
        )
        .unwrap();
        assert_eq!(out, vec![1, 64, 224, 224]);
    }

    #[test]
    fn test_conv_output_shape_with_dilation() {
        let mut pads = vec![0, 0, 0, 0];
        let out = compute_conv_output_shape(
            &[1, 1, 10, 10],
            &[4, 1, 3, 3],
            &[1, 1],
            &[2, 2],
            &[3, 3],
            &mut pads,
            None,
        )
        .unwrap();
        assert_eq!(out, vec![1, 4, 6, 6]);
    }

    #[test]
    fn test_output_shape_rejects_empty_axis() {
        let mut pads = vec![0, 0];
        let result = compute_conv_output_shape(&[1, 1, 2], &[1, 1, 3], &[1], &[], &[3], &mut pads, None);
        assert!(matches!(result, Err(ShapeError::InvalidShape { .. })));
    }

    #[test]
    fn test_output_shape_rejects_zero_stride() {
        let mut pads = vec![0, 0];
        let result = compute_pool_output_shape(false, &[1, 1, 8], &[0], &[], &[2], &mut pads, None);
        assert!(result.is_err());
    }
}
