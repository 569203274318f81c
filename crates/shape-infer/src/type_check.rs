// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Input dtype and rank guards shared by operator implementations.

use tensor_core::{DType, Tensor};

use crate::error::{Result, ShapeError};

/// Checks that at least two dtypes are given and all of them agree.
pub fn validate_same_types(types: &[DType]) -> Result<()> {
    let Some((first, rest)) = types.split_first().filter(|_| types.len() >= 2) else {
        return Err(ShapeError::attribute(
            "types",
            format!("need at least 2 types to compare, got {}", types.len()),
        ));
    };
    if let Some(other) = rest.iter().find(|&t| t != first) {
        return Err(ShapeError::attribute(
            "types",
            format!("input types differ: {first} vs {other}"),
        ));
    }
    Ok(())
}

/// Returns `true` if there is one input per expected rank and each input
/// has exactly that rank.
///
/// Unlike the other guards this never fails: a `false` lets the caller pick
/// a fallback path.
pub fn check_inputs_shape(inputs: &[&Tensor], expected_ranks: &[usize]) -> bool {
    inputs.len() == expected_ranks.len()
        && inputs
            .iter()
            .zip(expected_ranks)
            .all(|(t, &rank)| t.shape().rank() == rank)
}
