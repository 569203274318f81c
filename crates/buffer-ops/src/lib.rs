// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # buffer-ops
//!
//! Bounds-checked elementwise primitives over flat numeric buffers, used by
//! operator kernels once the output buffer has been allocated.
//!
//! | Primitive | Effect on each element of the block |
//! |---|---|
//! | [`array_copy`] | `target = source` |
//! | [`sqr`] | `target += source²` |
//! | [`axpy`] | `target += alpha · source` |
//! | [`powx`] | `target = source ^ b` |
//! | [`mul`] | `target = source · target` |
//!
//! All of them validate before writing, so a [`BufferError`] guarantees the
//! target is unchanged.
//!
//! # Example
//! ```
//! let mut acc = vec![0.0f32; 4];
//! buffer_ops::sqr(&mut acc, &[1.0, 2.0, 3.0, 4.0], 0, 0, 4).unwrap();
//! assert_eq!(acc, vec![1.0, 4.0, 9.0, 16.0]);
//! assert!(buffer_ops::axpy(&mut acc, &[1.0], 0, 0, 2, 2.0).is_err());
//! ```

mod element;
mod error;
mod math;

pub use element::Element;
pub use error::BufferError;
pub use math::{array_copy, axpy, check_block_bounds, mul, powx, sqr};
