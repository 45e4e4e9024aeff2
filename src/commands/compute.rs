//! Compute command implementation.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::InputArgs;
use crate::commands::{build_plan, effective_config};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::render::{render, OutputFormat};

/// Run the compute command
pub fn run(
    inputs: &InputArgs,
    format: Option<&str>,
    output: Option<&PathBuf>,
    show_stats: bool,
    config_path: &Path,
) -> Result<()> {
    let config = effective_config(config_path, inputs)?;
    let format: OutputFormat = match format {
        Some(f) => f.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => config.output.format,
    };

    let fs = real_fs();
    let plan = build_plan(fs, &config)?;
    let rendered = render(
        plan.allowed(),
        Some(plan.stats()),
        format,
        &config.output.ipset_name,
    )?;

    if show_stats {
        plan.stats().display();
    }

    match output {
        Some(path) => {
            fs.write(path, rendered.as_bytes())
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
            info!("Wrote {} blocks to {:?}", plan.allowed().len(), path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
