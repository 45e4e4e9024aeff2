//! Route plan computation.
//!
//! ```text
//! excluded      = exclude ∪ aggregate(country, cutoff)
//! allowed       = universe − excluded
//! final_allowed = allowed ∪ include
//! ```
//!
//! The include list always wins: an address present there is routed no
//! matter which exclusion also covers it. The computation is pure; the same
//! inputs always give the same canonical block list.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::aggregator::aggregate_to_cutoff;
use crate::cidr_set::CidrSet;
use crate::error::SplitrouteError;
use crate::parser::{ParseOutcome, Rejected};
use crate::range::{format_address, Address, CidrBlock, ADDRESS_BITS};
use crate::stats::{PlanStats, SourceStats};
use crate::utils::format_count;

/// Default cutoff for coarsening country networks.
pub const DEFAULT_CUTOFF_PREFIX: u8 = 10;

/// Validated parameters of a plan computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    cutoff_prefix: u8,
    universe: CidrSet,
}

impl RouteConfig {
    /// # Errors
    /// [`SplitrouteError::InvalidConfiguration`] if `cutoff_prefix > 32` or the
    /// universe is empty. Out-of-range values are refused, never clamped.
    pub fn new(cutoff_prefix: u8, universe: CidrSet) -> Result<Self, SplitrouteError> {
        if cutoff_prefix > ADDRESS_BITS {
            return Err(SplitrouteError::InvalidConfiguration(format!(
                "cutoff_prefix {} is outside 0..=32",
                cutoff_prefix
            )));
        }
        if universe.is_empty() {
            return Err(SplitrouteError::InvalidConfiguration(
                "universe must contain at least one block".to_string(),
            ));
        }
        Ok(Self {
            cutoff_prefix,
            universe,
        })
    }

    pub fn cutoff_prefix(&self) -> u8 {
        self.cutoff_prefix
    }

    pub fn universe(&self) -> &CidrSet {
        &self.universe
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            cutoff_prefix: DEFAULT_CUTOFF_PREFIX,
            universe: CidrSet::universe(),
        }
    }
}

/// One parsed input list with its diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSource {
    pub name: String,
    pub set: CidrSet,
    pub accepted: usize,
    pub rejected: Vec<Rejected>,
}

impl ParsedSource {
    /// A source with no entries (missing or empty file).
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_outcome(name: impl Into<String>, outcome: ParseOutcome) -> Self {
        let accepted = outcome.accepted();
        Self {
            name: name.into(),
            set: CidrSet::from_ranges(outcome.ranges),
            accepted,
            rejected: outcome.rejected,
        }
    }

    pub fn from_set(name: impl Into<String>, set: CidrSet) -> Self {
        Self {
            name: name.into(),
            accepted: set.len(),
            set,
            rejected: Vec::new(),
        }
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            name: self.name.clone(),
            accepted: self.accepted,
            rejected: self.rejected.len(),
            blocks: self.set.len(),
            addresses: self.set.address_count(),
        }
    }
}

/// The three lists a plan is computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanInputs {
    pub exclude: ParsedSource,
    pub country: ParsedSource,
    pub include: ParsedSource,
}

impl Default for PlanInputs {
    fn default() -> Self {
        Self {
            exclude: ParsedSource::empty("exclude"),
            country: ParsedSource::empty("country"),
            include: ParsedSource::empty("include"),
        }
    }
}

/// Why an address is or is not routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// In the include list, which overrides every exclusion
    Included,
    /// Outside the configured universe and not included
    OutsideUniverse,
    /// In the local exclude list
    ExcludedLocal,
    /// In a (coarsened) country network
    ExcludedCountry,
    /// In the universe and not excluded
    NotExcluded,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Reason::Included => "listed in include",
            Reason::OutsideUniverse => "outside the universe",
            Reason::ExcludedLocal => "listed in local exclusions",
            Reason::ExcludedCountry => "inside a country network",
            Reason::NotExcluded => "not excluded",
        };
        f.write_str(text)
    }
}

/// Verdict for a single address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub address: String,
    pub routed: bool,
    pub reason: Reason,
    /// Block of the deciding list that holds the address
    pub matched: Option<CidrBlock>,
}

/// A computed plan: the final allowed set plus the intermediate sets
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    allowed: CidrSet,
    universe: CidrSet,
    local_exclude: CidrSet,
    country_aggregated: CidrSet,
    include: CidrSet,
    stats: PlanStats,
}

impl RoutePlan {
    /// The canonical set to route through the tunnel
    pub fn allowed(&self) -> &CidrSet {
        &self.allowed
    }

    /// Country set after coarsening to the cutoff
    pub fn country_aggregated(&self) -> &CidrSet {
        &self.country_aggregated
    }

    pub fn stats(&self) -> &PlanStats {
        &self.stats
    }

    /// Explain the decision for one address.
    pub fn explain(&self, addr: Address) -> Verdict {
        let (routed, reason, matched) = if let Some(b) = self.include.block_containing(addr) {
            (true, Reason::Included, Some(*b))
        } else if !self.universe.contains(addr) {
            (false, Reason::OutsideUniverse, None)
        } else if let Some(b) = self.local_exclude.block_containing(addr) {
            (false, Reason::ExcludedLocal, Some(*b))
        } else if let Some(b) = self.country_aggregated.block_containing(addr) {
            (false, Reason::ExcludedCountry, Some(*b))
        } else {
            (true, Reason::NotExcluded, None)
        };

        Verdict {
            address: format_address(addr),
            routed,
            reason,
            matched,
        }
    }
}

/// Compute the canonical allowed set.
///
/// # Errors
/// Only configuration problems fail; malformed entries were already skipped
/// when the inputs were parsed.
pub fn compute_plan(
    config: &RouteConfig,
    inputs: &PlanInputs,
) -> Result<RoutePlan, SplitrouteError> {
    let cutoff = config.cutoff_prefix();

    info!(
        "Local exclusions: {} entries ({} rejected)",
        inputs.exclude.accepted,
        inputs.exclude.rejected.len()
    );

    let country_aggregated = aggregate_to_cutoff(&inputs.country.set, cutoff)?;
    info!(
        "Country networks: {} blocks, {} after aggregation to /{}",
        inputs.country.set.len(),
        country_aggregated.len(),
        cutoff
    );

    let excluded = inputs.exclude.set.union(&country_aggregated);
    info!("Total exclusions after merge: {} blocks", excluded.len());

    let allowed = config.universe().difference(&excluded);
    debug!("Allowed before include: {} blocks", allowed.len());

    let final_allowed = allowed.union(&inputs.include.set);
    if !inputs.include.set.is_empty() {
        info!("Added from include: {} blocks", inputs.include.set.len());
    }

    let mut stats = PlanStats {
        exclude: inputs.exclude.stats(),
        country: inputs.country.stats(),
        include: inputs.include.stats(),
        cutoff_prefix: cutoff,
        country_blocks_aggregated: country_aggregated.len(),
        excluded_blocks: excluded.len(),
        allowed_blocks_before_include: allowed.len(),
        ..Default::default()
    };
    stats.set_final(final_allowed.len(), final_allowed.address_count());

    info!(
        "Route set: {} blocks ({} addresses)",
        final_allowed.len(),
        format_count(final_allowed.address_count())
    );

    Ok(RoutePlan {
        allowed: final_allowed,
        universe: config.universe().clone(),
        local_exclude: inputs.exclude.set.clone(),
        country_aggregated,
        include: inputs.include.set.clone(),
        stats,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn set_strategy() -> impl Strategy<Value = CidrSet> {
        prop::collection::vec((any::<u32>(), 4u8..=32), 0..10).prop_map(|items| {
            items
                .into_iter()
                .map(|(a, p)| CidrBlock::containing(a, p).unwrap())
                .collect()
        })
    }

    proptest! {
        /// Every included address is routed, whatever the exclusions
        #[test]
        fn prop_include_wins(
            exclude in set_strategy(),
            country in set_strategy(),
            include in set_strategy(),
            cutoff in 0u8..=32
        ) {
            let config = RouteConfig::new(cutoff, CidrSet::universe()).unwrap();
            let plan_inputs = PlanInputs {
                exclude: ParsedSource::from_set("exclude", exclude),
                country: ParsedSource::from_set("country", country),
                include: ParsedSource::from_set("include", include.clone()),
            };
            let plan = compute_plan(&config, &plan_inputs).unwrap();
            prop_assert!(include.is_subset(plan.allowed()));
        }

        /// The explanation agrees with the allowed set
        #[test]
        fn prop_explain_matches_allowed(
            exclude in set_strategy(),
            country in set_strategy(),
            include in set_strategy(),
            probes in prop::collection::vec(any::<u32>(), 1..32)
        ) {
            let config = RouteConfig::new(20, CidrSet::universe()).unwrap();
            let plan_inputs = PlanInputs {
                exclude: ParsedSource::from_set("exclude", exclude),
                country: ParsedSource::from_set("country", country),
                include: ParsedSource::from_set("include", include),
            };
            let plan = compute_plan(&config, &plan_inputs).unwrap();
            for addr in probes {
                prop_assert_eq!(plan.explain(addr).routed, plan.allowed().contains(addr));
            }
        }
    }
}
