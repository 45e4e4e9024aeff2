//! CIDR aggregation for shrinking block lists.

use crate::cidr_set::CidrSet;
use crate::error::SplitrouteError;
use crate::range::{CidrBlock, ADDRESS_BITS, ADDRESS_SPACE_SIZE};

/// Aggregate a list of blocks into the canonical minimal set.
///
/// This is lossless: it only merges contiguous and overlapping blocks.
/// For example: [192.168.0.0/25, 192.168.0.128/25] -> [192.168.0.0/24]
pub fn aggregate(blocks: &[CidrBlock]) -> CidrSet {
    CidrSet::from_blocks(blocks.iter().copied())
}

/// Coarsen every block narrower than `cutoff` to its covering block at `cutoff`.
///
/// Blocks with `prefix_len <= cutoff` pass through unchanged. The result is
/// re-canonicalized, since many narrow blocks usually collapse into the same
/// ancestor. This is lossy and over-inclusive: the output may cover addresses
/// that were not in `set`, never the other way round.
///
/// # Errors
/// Returns [`SplitrouteError::InvalidConfiguration`] if `cutoff > 32`.
///
/// # Examples
/// ```
/// use splitroute::aggregator::aggregate_to_cutoff;
/// use splitroute::cidr_set::CidrSet;
/// let set: CidrSet = ["192.168.5.10/32".parse::<splitroute::range::CidrBlock>().unwrap()].into_iter().collect();
/// let coarse = aggregate_to_cutoff(&set, 24).unwrap();
/// assert_eq!(coarse.to_strings(), vec!["192.168.5.0/24"]);
/// ```
pub fn aggregate_to_cutoff(set: &CidrSet, cutoff: u8) -> Result<CidrSet, SplitrouteError> {
    if cutoff > ADDRESS_BITS {
        return Err(SplitrouteError::InvalidConfiguration(format!(
            "cutoff prefix length {} is outside 0..=32",
            cutoff
        )));
    }

    let coarsened = set
        .iter()
        .map(|block| block.ancestor(cutoff).unwrap_or(*block));

    Ok(CidrSet::from_blocks(coarsened))
}

/// Calculate the total number of addresses covered by a list of blocks.
///
/// Overlapping blocks are counted twice; saturates at `u64::MAX`.
pub fn count_addresses(blocks: &[CidrBlock]) -> u64 {
    blocks
        .iter()
        .map(CidrBlock::size)
        .fold(0u64, |acc, size| acc.saturating_add(size))
}

/// Calculate what percentage of the full IPv4 space an address count covers.
pub fn coverage_percent(address_count: u64) -> f64 {
    (address_count as f64 / ADDRESS_SPACE_SIZE as f64) * 100.0
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy to generate valid blocks
    fn block_strategy() -> impl Strategy<Value = CidrBlock> {
        (any::<u32>(), 0u8..=32)
            .prop_map(|(addr, prefix)| CidrBlock::containing(addr, prefix).unwrap())
    }

    /// Strategy to generate block vectors
    fn block_vec_strategy(max_size: usize) -> impl Strategy<Value = Vec<CidrBlock>> {
        prop::collection::vec(block_strategy(), 0..max_size)
    }

    proptest! {
        /// Aggregation should never increase the number of entries
        #[test]
        fn prop_aggregate_reduces_or_maintains_size(input in block_vec_strategy(100)) {
            let aggregated = aggregate(&input);
            prop_assert!(aggregated.len() <= input.len());
        }

        /// Every output block is at most `cutoff` long and the input is covered
        #[test]
        fn prop_cutoff_monotone(input in block_vec_strategy(50), cutoff in 0u8..=32) {
            let set = aggregate(&input);
            let coarse = aggregate_to_cutoff(&set, cutoff).unwrap();
            for block in coarse.iter() {
                prop_assert!(block.prefix_len() <= cutoff);
            }
            prop_assert!(set.is_subset(&coarse));
        }

        /// Coarsening twice is the same as coarsening once
        #[test]
        fn prop_cutoff_idempotent(input in block_vec_strategy(50), cutoff in 0u8..=32) {
            let once = aggregate_to_cutoff(&aggregate(&input), cutoff).unwrap();
            let twice = aggregate_to_cutoff(&once, cutoff).unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Coverage percent should be within 0..=100 for canonical sets
        #[test]
        fn prop_coverage_bounded(input in block_vec_strategy(20)) {
            let count = aggregate(&input).address_count();
            let coverage = coverage_percent(count);
            prop_assert!((0.0..=100.0).contains(&coverage));
        }
    }
}
