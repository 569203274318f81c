// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # shape-rt
//!
//! Command-line interface for operator shape inference.
//!
//! ## Usage
//! ```bash
//! # Infer the output shapes of an operator described in TOML
//! shape-rt infer --op ./ops/conv.toml
//!
//! # Broadcast two shapes (optionally as a batched matmul)
//! shape-rt broadcast --a 8,1,6,1 --b 7,1,5
//!
//! # Resolve reshape hints
//! shape-rt reshape --input 2,3,4 --shape 0,-1
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shape-rt",
    about = "Output-shape inference for neural-network tensor operators",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer output shapes for an operator described in a TOML file.
    Infer {
        /// Path to the operator description.
        #[arg(short, long)]
        op: std::path::PathBuf,
    },

    /// Compute the broadcast shape of two input shapes.
    Broadcast {
        /// First shape, comma-separated (e.g., "2,3,4").
        #[arg(long, value_delimiter = ',', required = true)]
        a: Vec<i64>,

        /// Second shape, comma-separated.
        #[arg(long, value_delimiter = ',', required = true)]
        b: Vec<i64>,

        /// Treat the trailing two axes as matrix-multiply operands.
        #[arg(long)]
        matmul: bool,
    },

    /// Resolve a reshape target against an input shape.
    Reshape {
        /// Input shape, comma-separated.
        #[arg(long, value_delimiter = ',', required = true)]
        input: Vec<i64>,

        /// Target hints: 0 copies the input dimension, -1 is inferred.
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        shape: Vec<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Infer { op } => commands::infer::execute(op),
        Commands::Broadcast { a, b, matmul } => commands::broadcast::execute(a, b, matmul),
        Commands::Reshape { input, shape } => commands::reshape::execute(input, shape),
    }
}
