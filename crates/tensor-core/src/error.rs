// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor buffer access.

use crate::Shape;

/// Errors that can occur while constructing or indexing a tensor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TensorError {
    /// The provided value count does not match the element count of the shape.
    #[error("buffer size mismatch: shape {shape} holds {expected} elements, got {actual}")]
    BufferSizeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    /// A multi-index has the wrong rank or a coordinate outside its dimension.
    #[error("index {index:?} out of bounds for shape {shape}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Shape },

    /// A flat offset lies past the end of the buffer.
    #[error("offset {offset} out of bounds for buffer of {len} elements")]
    OffsetOutOfBounds { offset: usize, len: usize },
}
