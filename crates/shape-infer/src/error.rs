// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for shape inference.
//!
//! Broadcast incompatibility is not an error: broadcast queries return
//! `Option` and callers branch on `None`.

use tensor_core::TensorError;

/// Errors raised by the shape-inference routines.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    /// A shape is malformed or two shapes disagree where they must match.
    #[error("invalid shape {dims:?}: {reason}")]
    InvalidShape { dims: Vec<i64>, reason: String },

    /// An axis lies outside `[-rank, rank - 1]` (or the routine's own range).
    #[error("axis {axis} out of range for rank {rank}")]
    AxisOutOfRange { axis: i64, rank: usize },

    /// An operator attribute is inconsistent or out of range.
    #[error("invalid attribute '{name}': {reason}")]
    InvalidAttribute { name: &'static str, reason: String },

    /// The input asks for something this layer deliberately does not do.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// An operator description could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing a tensor element failed.
    #[error("tensor error: {0}")]
    Tensor(#[from] TensorError),
}

impl ShapeError {
    pub(crate) fn shape(dims: &[usize], reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            dims: dims.iter().map(|&d| d as i64).collect(),
            reason: reason.into(),
        }
    }

    pub(crate) fn attribute(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            name,
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout `shape-infer`.
pub type Result<T> = std::result::Result<T, ShapeError>;
