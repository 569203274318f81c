// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for buffer primitives.

/// Bounds violations detected before a primitive touches its target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The source start index is past the end of the source buffer.
    #[error("source index {index} out of bounds for buffer of {len} elements")]
    SourceIndexOutOfBounds { index: usize, len: usize },

    /// The target start index is past the end of the target buffer.
    #[error("target index {index} out of bounds for buffer of {len} elements")]
    TargetIndexOutOfBounds { index: usize, len: usize },

    /// The source block runs past the end of the source buffer.
    #[error("source block [{index}, {index} + {block_size}) exceeds buffer of {len} elements")]
    SourceRangeOutOfBounds {
        index: usize,
        block_size: usize,
        len: usize,
    },

    /// The target buffer is too small to hold the block.
    #[error("target block [{index}, {index} + {block_size}) exceeds buffer of {len} elements")]
    TargetTooSmall {
        index: usize,
        block_size: usize,
        len: usize,
    },
}
