// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Block-wise elementwise primitives over flat buffers.
//!
//! Every primitive reads `source[source_index..source_index + block_size]`
//! and updates `target[target_index..target_index + block_size]`. Bounds
//! are checked up front; on failure neither buffer is touched. `target`
//! and `source` are distinct borrows, so they can never alias.

use crate::element::Element;
use crate::error::BufferError;

/// Validates a `(target_index, source_index, block_size)` triple.
///
/// Both start indices must lie inside their buffers, even for an empty
/// block, and both blocks must end at or before the end of their buffer.
pub fn check_block_bounds(
    target_len: usize,
    source_len: usize,
    target_index: usize,
    source_index: usize,
    block_size: usize,
) -> Result<(), BufferError> {
    let err = if source_index >= source_len {
        BufferError::SourceIndexOutOfBounds {
            index: source_index,
            len: source_len,
        }
    } else if target_index >= target_len {
        BufferError::TargetIndexOutOfBounds {
            index: target_index,
            len: target_len,
        }
    } else if source_index
        .checked_add(block_size)
        .map_or(true, |end| end > source_len)
    {
        BufferError::SourceRangeOutOfBounds {
            index: source_index,
            block_size,
            len: source_len,
        }
    } else if target_index
        .checked_add(block_size)
        .map_or(true, |end| end > target_len)
    {
        BufferError::TargetTooSmall {
            index: target_index,
            block_size,
            len: target_len,
        }
    } else {
        return Ok(());
    };
    tracing::debug!(%err, "buffer block rejected");
    Err(err)
}

fn zip_blocks<T, F>(
    target: &mut [T],
    source: &[T],
    target_index: usize,
    source_index: usize,
    block_size: usize,
    f: F,
) -> Result<(), BufferError>
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    check_block_bounds(target.len(), source.len(), target_index, source_index, block_size)?;
    let dst = &mut target[target_index..target_index + block_size];
    let src = &source[source_index..source_index + block_size];
    for (t, &s) in dst.iter_mut().zip(src) {
        *t = f(*t, s);
    }
    Ok(())
}

/// `target += source²`
pub fn sqr<T: Element>(
    target: &mut [T],
    source: &[T],
    target_index: usize,
    source_index: usize,
    block_size: usize,
) -> Result<(), BufferError> {
    zip_blocks(target, source, target_index, source_index, block_size, |t, s| {
        t.add(s.mul(s))
    })
}

/// `target += alpha * source`
pub fn axpy<T: Element>(
    target: &mut [T],
    source: &[T],
    target_index: usize,
    source_index: usize,
    block_size: usize,
    alpha: T,
) -> Result<(), BufferError> {
    zip_blocks(target, source, target_index, source_index, block_size, |t, s| {
        t.add(alpha.mul(s))
    })
}

/// `target = source ^ b`
pub fn powx<T: Element>(
    target: &mut [T],
    source: &[T],
    target_index: usize,
    source_index: usize,
    block_size: usize,
    b: f64,
) -> Result<(), BufferError> {
    zip_blocks(target, source, target_index, source_index, block_size, |_, s| {
        s.powf(b)
    })
}

/// `target = source * target`
pub fn mul<T: Element>(
    target: &mut [T],
    source: &[T],
    target_index: usize,
    source_index: usize,
    block_size: usize,
) -> Result<(), BufferError> {
    zip_blocks(target, source, target_index, source_index, block_size, |t, s| {
        s.mul(t)
    })
}

/// Copies a block of `source` into `target`.
pub fn array_copy<T: Copy>(
    target: &mut [T],
    source: &[T],
    target_index: usize,
    source_index: usize,
    block_size: usize,
) -> Result<(), BufferError> {
    check_block_bounds(target.len(), source.len(), target_index, source_index, block_size)?;
    target[target_index..target_index + block_size]
        .copy_from_slice(&source[source_index..source_index + block_size]);
    Ok(())
}
