// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `shape-rt broadcast` command: print the broadcast shape of two inputs.

use shape_infer::{broadcast, shape};

use super::format_dims;

pub fn execute(a: Vec<i64>, b: Vec<i64>, matmul: bool) -> anyhow::Result<()> {
    let a = shape::validate_dims(&a)?;
    let b = shape::validate_dims(&b)?;

    match broadcast::calc_shape(&a, &b, matmul) {
        Some(dims) => {
            println!("  {} x {} -> {}", format_dims(&a), format_dims(&b), format_dims(&dims));
            let stretched_a = broadcast::broadcast_dims(&a, &dims);
            let stretched_b = broadcast::broadcast_dims(&b, &dims);
            tracing::info!(?stretched_a, ?stretched_b, "stretched axes");
            Ok(())
        }
        None => anyhow::bail!(
            "shapes {} and {} are not broadcastable{}",
            format_dims(&a),
            format_dims(&b),
            if matmul { " as a matmul" } else { "" }
        ),
    }
}
