//! Check command implementation.

use anyhow::Result;
use std::path::Path;

use crate::cli::InputArgs;
use crate::commands::{build_plan, effective_config};
use crate::fs_abstraction::real_fs;
use crate::planner::Verdict;
use crate::validation::validate_ip;

/// Run the check command
pub fn run(ip_str: &str, inputs: &InputArgs, config_path: &Path) -> Result<()> {
    let addr = validate_ip(ip_str)?;
    let config = effective_config(config_path, inputs)?;
    let plan = build_plan(real_fs(), &config)?;

    println!("{}", describe(&plan.explain(addr)));
    Ok(())
}

fn describe(verdict: &Verdict) -> String {
    let state = if verdict.routed {
        "ROUTED through the tunnel"
    } else {
        "NOT routed"
    };
    match verdict.matched {
        Some(block) => format!(
            "{} is {} ({}: {})",
            verdict.address, state, verdict.reason, block
        ),
        None => format!("{} is {} ({})", verdict.address, state, verdict.reason),
    }
}
