// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # shape-infer
//!
//! Output-shape inference for neural-network tensor operators.
//!
//! Operator implementations call into this crate to derive and validate
//! output shapes *before* allocating output buffers:
//!
//! - [`shape`] — size, stride and index arithmetic, reshape resolution,
//!   transpose/squeeze/unsqueeze/flatten shapes, dimension validation.
//! - [`broadcast`] — NumPy-style broadcast shapes (including batched
//!   matmul) and the generic elementwise broadcast kernel.
//! - [`pool_conv`] — pooling/convolution attribute normalisation, auto-pad
//!   resolution and output shapes.
//! - [`gemm`] and [`split`] — thin shape rules built on the above.
//! - [`type_check`] — dtype and rank guards across operator inputs.
//! - [`operator`] — TOML-described operators dispatched to the routines
//!   above.
//!
//! # Error Model
//! Malformed input fails fast with a [`ShapeError`]. Broadcast
//! incompatibility is an expected outcome and is reported as `None`.
//!
//! # Example
//! ```
//! use shape_infer::{broadcast, shape};
//!
//! let dims = shape::calculate_reshaped_dims(&[2, 3, 4], &[0, -1]).unwrap();
//! assert_eq!(dims, vec![2, 12]);
//! assert_eq!(broadcast::calc_shape(&dims, &[1, 12], false), Some(vec![2, 12]));
//! ```

pub mod broadcast;
mod error;
pub mod gemm;
pub mod operator;
pub mod pool_conv;
pub mod shape;
pub mod split;
pub mod type_check;

pub use error::{Result, ShapeError};
pub use operator::{ConvAttributes, OperatorSpec};
pub use pool_conv::AutoPad;
pub use split::SplitShapes;
