// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `shape-rt infer` command: load an operator description and print its
//! output shapes.

use std::path::PathBuf;

use shape_infer::OperatorSpec;

use super::format_dims;

pub fn execute(op: PathBuf) -> anyhow::Result<()> {
    let spec = OperatorSpec::from_file(&op)
        .map_err(|e| anyhow::anyhow!("failed to load operator from '{}': {e}", op.display()))?;
    tracing::info!("loaded '{}' operator from {}", spec.name(), op.display());

    let shapes = spec
        .infer()
        .map_err(|e| anyhow::anyhow!("shape inference failed for '{}': {e}", spec.name()))?;

    println!("  Operator: {}", spec.name());
    for (i, dims) in shapes.iter().enumerate() {
        println!("  Output {i}: {}", format_dims(dims));
    }
    Ok(())
}
