//! CLI command implementations.

pub mod check;
pub mod compute;
pub mod init;
pub mod normalize;

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::InputArgs;
use crate::config::Config;
use crate::fs_abstraction::FileSystem;
use crate::planner::{compute_plan, PlanInputs, RoutePlan};
use crate::sources::{load_feed_source, load_list_source};

/// Load the config file (or defaults) and apply command-line overrides.
pub fn effective_config(config_path: &Path, overrides: &InputArgs) -> Result<Config> {
    let mut config = Config::load_or_default(config_path)?;

    if let Some(ref path) = overrides.exclude {
        config.exclude_file = path.clone();
    }
    if let Some(ref path) = overrides.include {
        config.include_file = path.clone();
    }
    if let Some(ref path) = overrides.feed {
        config.feed_file = Some(path.clone());
    }
    if let Some(cutoff) = overrides.cutoff {
        config.cutoff_prefix = cutoff;
    }

    config.validate()?;
    Ok(config)
}

/// Read every input list and compute the plan.
pub fn build_plan(fs: &dyn FileSystem, config: &Config) -> Result<RoutePlan> {
    let route_config = config.route_config()?;

    let inputs = PlanInputs {
        exclude: load_list_source(fs, "exclude", &config.exclude_file)
            .context("Failed to load exclude list")?,
        country: load_feed_source(fs, config.feed_file.as_deref(), &config.country_code)
            .context("Failed to load country feed")?,
        include: load_list_source(fs, "include", &config.include_file)
            .context("Failed to load include list")?,
    };

    Ok(compute_plan(&route_config, &inputs)?)
}
