// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `shape-rt reshape` command: resolve reshape hints against an input shape.

use shape_infer::shape;

use super::format_dims;

pub fn execute(input: Vec<i64>, hints: Vec<i64>) -> anyhow::Result<()> {
    let input = shape::validate_dims(&input)?;
    let dims = shape::calculate_reshaped_dims(&input, &hints)?;
    println!("  {} -> {}", format_dims(&input), format_dims(&dims));
    Ok(())
}
