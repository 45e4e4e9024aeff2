//! Canonical CIDR block sets and their set algebra.
//!
//! A [`CidrSet`] is always kept in canonical form: blocks sorted by base,
//! non-overlapping, and no run of blocks that could be expressed with fewer
//! aligned blocks. Two sets are equal iff they cover the same addresses.
//!
//! Every operation works on the maximal runs of contiguous addresses: the
//! runs of both operands are swept once, then re-split into aligned blocks
//! with [`range_to_cidrs`]. Nothing is ever materialized per address.

use serde::Serialize;
use std::iter::FromIterator;

use crate::range::{range_to_cidrs, Address, AddressRange, CidrBlock};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CidrSet {
    blocks: Vec<CidrBlock>,
}

impl CidrSet {
    /// The empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// `{0.0.0.0/0}`
    pub fn universe() -> Self {
        Self {
            blocks: vec![CidrBlock::UNIVERSE],
        }
    }

    /// Canonical set covering the union of arbitrary (possibly overlapping) ranges.
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = AddressRange>,
    {
        let mut runs: Vec<AddressRange> = ranges.into_iter().collect();
        runs.sort_unstable();
        Self::from_runs(coalesce(runs))
    }

    /// Canonical set covering the union of arbitrary (possibly overlapping) blocks.
    pub fn from_blocks<I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = CidrBlock>,
    {
        Self::from_ranges(blocks.into_iter().map(AddressRange::from))
    }

    /// Runs must be sorted, disjoint and non-adjacent.
    fn from_runs(runs: Vec<AddressRange>) -> Self {
        Self {
            blocks: runs.into_iter().flat_map(range_to_cidrs).collect(),
        }
    }

    pub fn blocks(&self) -> &[CidrBlock] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CidrBlock> {
        self.blocks.iter()
    }

    /// Number of blocks in canonical form
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of addresses covered (at most 2^32).
    pub fn address_count(&self) -> u64 {
        self.blocks.iter().map(CidrBlock::size).sum()
    }

    /// Maximal runs of contiguous addresses, in order.
    pub fn ranges(&self) -> Vec<AddressRange> {
        coalesce(self.blocks.iter().map(CidrBlock::to_range))
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.block_containing(addr).is_some()
    }

    /// The block of this set that holds `addr`, if any.
    pub fn block_containing(&self, addr: Address) -> Option<&CidrBlock> {
        let idx = self.blocks.partition_point(|b| b.last() < addr);
        self.blocks.get(idx).filter(|b| b.contains(addr))
    }

    /// True if every address of `range` is in the set.
    pub fn contains_range(&self, range: &AddressRange) -> bool {
        let mut idx = self.blocks.partition_point(|b| b.last() < range.start());
        let mut next = u64::from(range.start());
        let end = u64::from(range.end());

        while let Some(block) = self.blocks.get(idx) {
            if u64::from(block.first()) > next {
                return false;
            }
            next = u64::from(block.last()) + 1;
            if next > end {
                return true;
            }
            idx += 1;
        }
        false
    }

    pub fn contains_block(&self, block: &CidrBlock) -> bool {
        self.contains_range(&block.to_range())
    }

    pub fn is_subset(&self, other: &CidrSet) -> bool {
        self.difference(other).is_empty()
    }

    pub fn union(&self, other: &CidrSet) -> CidrSet {
        let merged = merge_sorted(&self.ranges(), &other.ranges());
        Self::from_runs(coalesce(merged))
    }

    /// Addresses in `self` that are not in `other`.
    pub fn difference(&self, other: &CidrSet) -> CidrSet {
        if other.is_empty() {
            return self.clone();
        }
        let remaining = subtract_runs(&self.ranges(), &other.ranges());
        Self::from_runs(coalesce(remaining))
    }

    pub fn intersection(&self, other: &CidrSet) -> CidrSet {
        let common = intersect_runs(&self.ranges(), &other.ranges());
        Self::from_runs(coalesce(common))
    }

    /// Everything in the IPv4 space that is not in `self`.
    pub fn complement(&self) -> CidrSet {
        Self::universe().difference(self)
    }

    /// Everything in `universe` that is not in `self`.
    pub fn complement_within(&self, universe: &CidrSet) -> CidrSet {
        universe.difference(self)
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.blocks.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<CidrBlock> for CidrSet {
    fn from_iter<I: IntoIterator<Item = CidrBlock>>(iter: I) -> Self {
        Self::from_blocks(iter)
    }
}

impl FromIterator<AddressRange> for CidrSet {
    fn from_iter<I: IntoIterator<Item = AddressRange>>(iter: I) -> Self {
        Self::from_ranges(iter)
    }
}

impl<'a> IntoIterator for &'a CidrSet {
    type Item = &'a CidrBlock;
    type IntoIter = std::slice::Iter<'a, CidrBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Merge overlapping or adjacent ranges. Input must be sorted by start.
fn coalesce<I>(sorted: I) -> Vec<AddressRange>
where
    I: IntoIterator<Item = AddressRange>,
{
    let mut out: Vec<AddressRange> = Vec::new();
    for r in sorted {
        if let Some(last) = out.last_mut() {
            if u64::from(r.start()) <= u64::from(last.end()) + 1 {
                if r.end() > last.end() {
                    *last = AddressRange::new_unchecked(last.start(), r.end());
                }
                continue;
            }
        }
        out.push(r);
    }
    out
}

/// Two-way merge of sorted run lists.
fn merge_sorted(a: &[AddressRange], b: &[AddressRange]) -> Vec<AddressRange> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Sweep `a` removing every part covered by `b`. Both must be sorted and disjoint.
fn subtract_runs(a: &[AddressRange], b: &[AddressRange]) -> Vec<AddressRange> {
    let mut out = Vec::with_capacity(a.len());
    let mut j = 0;

    for run in a {
        let end = u64::from(run.end());
        let mut cursor = u64::from(run.start());

        while j < b.len() && u64::from(b[j].end()) < cursor {
            j += 1;
        }

        // b[j] may overlap the next run of `a` too, so scan with a separate index
        let mut k = j;
        while k < b.len() && u64::from(b[k].start()) <= end {
            let cut = b[k];
            if u64::from(cut.start()) > cursor {
                out.push(AddressRange::new_unchecked(cursor as u32, cut.start() - 1));
            }
            cursor = cursor.max(u64::from(cut.end()) + 1);
            if cursor > end {
                break;
            }
            k += 1;
        }

        if cursor <= end {
            out.push(AddressRange::new_unchecked(cursor as u32, run.end()));
        }
    }

    out
}

/// Pairwise overlap of two sorted, disjoint run lists.
fn intersect_runs(a: &[AddressRange], b: &[AddressRange]) -> Vec<AddressRange> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let lo = a[i].start().max(b[j].start());
        let hi = a[i].end().min(b[j].end());
        if lo <= hi {
            out.push(AddressRange::new_unchecked(lo, hi));
        }
        if a[i].end() < b[j].end() {
            i += 1;
        } else {
            j += 1;
        }
    }

    out
}
