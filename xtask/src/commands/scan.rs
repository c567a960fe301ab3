// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::helpers::*;
use anyhow::{Context, Result};
use clap::Args;
use pyxis_pipeline::{AssetPipeline, PipelineConfig};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args)]
pub struct ScanArgs {
    /// Source directories to scan for assets
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,

    /// Output directory for the identity store, snapshot, and descriptors
    #[arg(long, short, default_value = ".pyxis")]
    pub output: PathBuf,

    /// Restrict scanning to these extensions (lowercase, no dot)
    #[arg(long = "ext")]
    pub extensions: Vec<String>,

    /// Exclude paths containing any of these substrings
    #[arg(long = "ignore")]
    pub ignores: Vec<String>,

    /// Scan dot-prefixed files and directories too
    #[arg(long)]
    pub include_hidden: bool,

    /// Skip descriptor emission (identity bookkeeping only)
    #[arg(long)]
    pub no_emit: bool,
}

pub fn run(args: ScanArgs) -> Result<()> {
    print_task_start("Scanning Assets", ROCKET, MAGENTA);

    let mut config = PipelineConfig::new(args.roots, args.output);
    config.allowed_extensions = args.extensions;
    config.ignore_substrings = args.ignores;
    config.include_hidden = args.include_hidden;
    config.emit_descriptors = !args.no_emit;

    let start = Instant::now();
    let mut pipeline = AssetPipeline::new(config).context("Failed to set up the pipeline")?;
    let summary = pipeline.run_pass();

    println!(
        "{}🔎 Changes:{} {} added, {} modified, {} removed, {} skipped",
        BOLD, RESET, summary.added, summary.modified, summary.removed, summary.skipped
    );
    println!(
        "{}📦 Tracked:{} {} asset(s) in the identity store",
        BOLD,
        RESET,
        pipeline.store().len()
    );
    print_success(&format!(
        "Pipeline pass finished in {:.2}s",
        start.elapsed().as_secs_f64()
    ));
    Ok(())
}
