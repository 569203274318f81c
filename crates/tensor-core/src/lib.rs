// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Typed, strided tensor buffers for the operator shape-inference layer.
//!
//! This crate provides:
//! - [`Tensor`] — an owned n-dimensional buffer with typed element access
//!   by multi-index.
//! - [`Shape`] — a row-major dimension list with stride computation.
//! - [`DType`] — supported element data types (f32, f64, i32, i8, u8).
//!
//! The inference layer reads dimensions and strides through this crate and
//! allocates output buffers with [`Tensor::zeros`]. Nothing here validates
//! operator semantics; that is the caller's job.

mod dtype;
mod error;
mod shape;
mod tensor;

pub use dtype::DType;
pub use error::TensorError;
pub use shape::Shape;
pub use tensor::Tensor;
