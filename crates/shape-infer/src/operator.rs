// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator descriptions loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! op = "conv"
//! input = [1, 3, 32, 32]
//! filter = [8, 3, 3, 3]
//!
//! [attributes]
//! kernel_shape = [3, 3]
//! strides = [2, 2]
//! auto_pad = "SAME_UPPER"
//! ```

use std::path::Path;

use crate::error::{Result, ShapeError};
use crate::{broadcast, gemm, pool_conv, shape, split};

/// Convolution and pooling attributes.
///
/// Every field is optional in TOML. Empty `strides` and `pads` take their
/// defaults (1 and 0); an empty convolution `kernel_shape` is read from the
/// filter's spatial dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConvAttributes {
    pub kernel_shape: Vec<i64>,
    pub strides: Vec<i64>,
    pub dilations: Vec<i64>,
    pub pads: Vec<i64>,
    /// `VALID`, `SAME_UPPER`, `SAME_LOWER` or `NOTSET`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_pad: Option<String>,
}

/// A single operator whose output shapes should be inferred.
///
/// Input shapes are given as signed integers and checked with
/// [`shape::validate_dims`] before use.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OperatorSpec {
    Conv {
        input: Vec<i64>,
        filter: Vec<i64>,
        #[serde(default)]
        attributes: ConvAttributes,
    },
    Pool {
        input: Vec<i64>,
        #[serde(default)]
        global: bool,
        #[serde(default)]
        attributes: ConvAttributes,
    },
    Gemm {
        a: Vec<i64>,
        b: Vec<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bias: Option<Vec<i64>>,
        #[serde(default)]
        trans_a: bool,
        #[serde(default)]
        trans_b: bool,
    },
    Reshape {
        input: Vec<i64>,
        shape: Vec<i64>,
    },
    Split {
        input: Vec<i64>,
        #[serde(default)]
        axis: i64,
        #[serde(default)]
        split: Vec<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        num_outputs: Option<usize>,
    },
    Broadcast {
        a: Vec<i64>,
        b: Vec<i64>,
        #[serde(default)]
        matmul: bool,
    },
    Transpose {
        input: Vec<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        perm: Option<Vec<usize>>,
    },
    Squeeze {
        input: Vec<i64>,
        #[serde(default)]
        axes: Vec<i64>,
    },
    Unsqueeze {
        input: Vec<i64>,
        axes: Vec<i64>,
    },
    Flatten {
        input: Vec<i64>,
        #[serde(default = "default_flatten_axis")]
        axis: i64,
    },
}

fn default_flatten_axis() -> i64 {
    1
}

impl OperatorSpec {
    /// Loads an operator description from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ShapeError::Config(format!("cannot read operator file '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses an operator description from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| ShapeError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises the description to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ShapeError::Config(format!("TOML serialise error: {e}")))
    }

    /// Returns the operator name as written in the `op` key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Conv { .. } => "conv",
            Self::Pool { .. } => "pool",
            Self::Gemm { .. } => "gemm",
            Self::Reshape { .. } => "reshape",
            Self::Split { .. } => "split",
            Self::Broadcast { .. } => "broadcast",
            Self::Transpose { .. } => "transpose",
            Self::Squeeze { .. } => "squeeze",
            Self::Unsqueeze { .. } => "unsqueeze",
            Self::Flatten { .. } => "flatten",
        }
    }

    /// Infers the operator's output shapes.
    ///
    /// Every operator yields one shape except `split`, which yields one per
    /// output.
    pub fn infer(&self) -> Result<Vec<Vec<usize>>> {
        tracing::debug!(op = self.name(), "inferring output shapes");
        let single = |dims: Vec<usize>| -> Result<Vec<Vec<usize>>> { Ok(vec![dims]) };
        match self {
            Self::Conv {
                input,
                filter,
                attributes,
            } => {
                let input = shape::validate_dims(input)?;
                let filter = shape::validate_dims(filter)?;
                let spatial = input.len().saturating_sub(2);
                let kernel = if attributes.kernel_shape.is_empty() {
                    filter.iter().skip(2).map(|&d| d as i64).collect()
                } else {
                    attributes.kernel_shape.clone()
                };
                let strides = or_default(&attributes.strides, spatial, 1);
                let mut pads = or_default(&attributes.pads, 2 * spatial, 0);
                single(pool_conv::compute_conv_output_shape(
                    &input,
                    &filter,
                    &strides,
                    &attributes.dilations,
                    &kernel,
                    &mut pads,
                    attributes.auto_pad.as_deref(),
                )?)
            }
            Self::Pool {
                input,
                global,
                attributes,
            } => {
                let input = shape::validate_dims(input)?;
                let mut kernel = attributes.kernel_shape.clone();
                let mut strides = attributes.strides.clone();
                let mut pads = attributes.pads.clone();
                pool_conv::adjust_pool_attributes(
                    *global,
                    &input,
                    &mut kernel,
                    &mut strides,
                    &mut pads,
                )?;
                single(pool_conv::compute_pool_output_shape(
                    *global,
                    &input,
                    &strides,
                    &attributes.dilations,
                    &kernel,
                    &mut pads,
                    attributes.auto_pad.as_deref(),
                )?)
            }
            Self::Gemm {
                a,
                b,
                bias,
                trans_a,
                trans_b,
            } => {
                let bias = bias.as_deref().map(shape::validate_dims).transpose()?;
                single(gemm::get_shape_of_gemm_result(
                    &shape::validate_dims(a)?,
                    *trans_a,
                    &shape::validate_dims(b)?,
                    *trans_b,
                    bias.as_deref(),
                )?)
            }
            Self::Reshape { input, shape: hints } => single(shape::calculate_reshaped_dims(
                &shape::validate_dims(input)?,
                hints,
            )?),
            Self::Split {
                input,
                axis,
                split: sizes,
                num_outputs,
            } => {
                let input = shape::validate_dims(input)?;
                Ok(split::split_shape(&input, *axis, sizes, *num_outputs)?.shapes)
            }
            Self::Broadcast { a, b, matmul } => {
                let (a, b) = (shape::validate_dims(a)?, shape::validate_dims(b)?);
                match broadcast::calc_shape(&a, &b, *matmul) {
                    Some(dims) => single(dims),
                    None => Err(ShapeError::InvalidShape {
                        dims: a.iter().chain(&b).map(|&d| d as i64).collect(),
                        reason: format!("shapes {a:?} and {b:?} do not broadcast"),
                    }),
                }
            }
            Self::Transpose { input, perm } => single(shape::sort_based_on_perm(
                &shape::validate_dims(input)?,
                perm.as_deref(),
            )?),
            Self::Squeeze { input, axes } => {
                single(shape::squeeze_shape(&shape::validate_dims(input)?, axes)?)
            }
            Self::Unsqueeze { input, axes } => {
                single(shape::unsqueeze_shape(&shape::validate_dims(input)?, axes)?)
            }
            Self::Flatten { input, axis } => {
                single(shape::flatten_shape(&shape::validate_dims(input)?, *axis)?)
            }
        }
    }
}

fn or_default(values: &[i64], len: usize, default: i64) -> Vec<i64> {
    if values.is_empty() {
        vec![default; len]
    } else {
        values.to_vec()
    }
}
