//! Diagnostic counts for a computed route plan.
//!
//! These are for observability only; nothing in the computation reads them.

use serde::Serialize;
use std::fmt::Write;

use crate::aggregator::coverage_percent;
use crate::utils::{format_count, format_count_with_separator, truncate};

/// Counts for one input list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceStats {
    pub name: String,
    /// Entries that parsed
    pub accepted: usize,
    /// Entries skipped as malformed
    pub rejected: usize,
    /// Canonical blocks after parsing
    pub blocks: usize,
    pub addresses: u64,
}

/// Counts for a whole plan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanStats {
    pub exclude: SourceStats,
    pub country: SourceStats,
    pub include: SourceStats,
    pub cutoff_prefix: u8,
    /// Country blocks after coarsening to `cutoff_prefix`
    pub country_blocks_aggregated: usize,
    /// Blocks in `exclude ∪ aggregated country`
    pub excluded_blocks: usize,
    /// Blocks in `universe − excluded`
    pub allowed_blocks_before_include: usize,
    pub final_blocks: usize,
    pub final_addresses: u64,
    pub coverage_percent: f64,
}

impl PlanStats {
    /// Total entries rejected across every input
    pub fn total_rejected(&self) -> usize {
        self.exclude.rejected + self.country.rejected + self.include.rejected
    }

    pub fn set_final(&mut self, blocks: usize, addresses: u64) {
        self.final_blocks = blocks;
        self.final_addresses = addresses;
        self.coverage_percent = coverage_percent(addresses);
    }

    /// Print the table to stderr, leaving stdout to the rendered routes.
    pub fn display(&self) {
        eprint!("{}", self.render_table());
    }

    /// Human-readable table
    pub fn render_table(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out);
        let _ = writeln!(out, " SOURCE             ACCEPTED   REJECTED     BLOCKS    ADDRESSES");
        let _ = writeln!(out, " ────────────────── ────────── ────────── ────────── ────────────");
        for source in [&self.exclude, &self.country, &self.include] {
            let _ = writeln!(
                out,
                " {:<18} {:>10} {:>10} {:>10} {:>12}",
                truncate(&source.name, 18),
                format_count_with_separator(source.accepted as u64),
                format_count_with_separator(source.rejected as u64),
                format_count_with_separator(source.blocks as u64),
                format_count(source.addresses),
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            " Country blocks after /{} cutoff: {}",
            self.cutoff_prefix,
            format_count_with_separator(self.country_blocks_aggregated as u64)
        );
        let _ = writeln!(
            out,
            " Excluded blocks after merge: {}",
            format_count_with_separator(self.excluded_blocks as u64)
        );
        let _ = writeln!(
            out,
            " Allowed blocks before include: {}",
            format_count_with_separator(self.allowed_blocks_before_include as u64)
        );
        let _ = writeln!(
            out,
            " Final blocks: {} ({} addresses, {:.2}% of IPv4 space)",
            format_count_with_separator(self.final_blocks as u64),
            format_count(self.final_addresses),
            self.coverage_percent
        );

        out
    }
}
