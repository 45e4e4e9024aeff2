//! Normalize command implementation.

use anyhow::Result;
use tracing::warn;

use crate::cidr_set::CidrSet;
use crate::parser::parse_entries;

/// Print the canonical block list covering the given entries.
///
/// Malformed entries are skipped with a warning; the command fails only when
/// nothing parsed.
pub fn run(entries: &[String]) -> Result<()> {
    let set = normalize(entries)?;
    for cidr in set.to_strings() {
        println!("{}", cidr);
    }
    Ok(())
}

fn normalize(entries: &[String]) -> Result<CidrSet> {
    let outcome = parse_entries(entries);
    for reject in &outcome.rejected {
        warn!("Skipping '{}': {}", reject.entry, reject.reason);
    }
    if outcome.accepted() == 0 {
        anyhow::bail!("No valid entries to normalize");
    }
    Ok(CidrSet::from_ranges(outcome.ranges))
}
