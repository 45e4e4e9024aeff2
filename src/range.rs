//! IPv4 address ranges, CIDR blocks and range-to-CIDR decomposition.
//!
//! Addresses are plain `u32` values. Block arithmetic that can reach the top
//! of the address space (`255.255.255.255 + 1`) is done in `u64`.

use ipnet::Ipv4Net;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::SplitrouteError;

/// An IPv4 address as a 32-bit unsigned integer.
pub type Address = u32;

/// Width of an IPv4 address in bits.
pub const ADDRESS_BITS: u8 = 32;

/// Number of addresses in the full IPv4 space (2^32).
pub const ADDRESS_SPACE_SIZE: u64 = 1 << ADDRESS_BITS;

/// Mask selecting the host bits of a prefix.
///
/// # Examples
/// ```
/// use splitroute::range::host_mask;
/// assert_eq!(host_mask(24), 0x0000_00FF);
/// assert_eq!(host_mask(0), u32::MAX);
/// assert_eq!(host_mask(32), 0);
/// ```
pub fn host_mask(prefix_len: u8) -> u32 {
    debug_assert!(prefix_len <= ADDRESS_BITS);
    ((1u64 << (ADDRESS_BITS - prefix_len)) - 1) as u32
}

/// Mask selecting the network bits of a prefix.
pub fn network_mask(prefix_len: u8) -> u32 {
    !host_mask(prefix_len)
}

/// Parse a dotted-quad IPv4 address.
pub fn parse_address(s: &str) -> Result<Address, SplitrouteError> {
    s.trim()
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| SplitrouteError::malformed(s, "invalid IPv4 address"))
}

/// Format an address in dotted-quad notation.
pub fn format_address(addr: Address) -> String {
    Ipv4Addr::from(addr).to_string()
}

/// Inclusive `[start, end]` range of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressRange {
    start: Address,
    end: Address,
}

impl AddressRange {
    /// The whole IPv4 space.
    pub const FULL: AddressRange = AddressRange {
        start: 0,
        end: u32::MAX,
    };

    pub fn new(start: Address, end: Address) -> Result<Self, SplitrouteError> {
        if start > end {
            return Err(SplitrouteError::malformed(
                format!("{}-{}", format_address(start), format_address(end)),
                "range start is greater than range end",
            ));
        }
        Ok(Self { start, end })
    }

    /// Caller guarantees `start <= end`.
    pub(crate) const fn new_unchecked(start: Address, end: Address) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub const fn single(addr: Address) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    /// Number of addresses in the range (1..=2^32).
    pub fn size(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.start <= addr && addr <= self.end
    }

    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Minimal list of aligned blocks covering exactly this range.
    pub fn to_cidrs(&self) -> Vec<CidrBlock> {
        range_to_cidrs(*self)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            Ipv4Addr::from(self.start),
            Ipv4Addr::from(self.end)
        )
    }
}

impl From<CidrBlock> for AddressRange {
    fn from(block: CidrBlock) -> Self {
        block.to_range()
    }
}

/// A prefix-aligned block `base/prefix_len`.
///
/// The base never has host bits set; constructors reject or mask them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CidrBlock {
    base: Address,
    prefix_len: u8,
}

impl CidrBlock {
    /// `0.0.0.0/0`
    pub const UNIVERSE: CidrBlock = CidrBlock {
        base: 0,
        prefix_len: 0,
    };

    /// Build a block, rejecting prefixes above 32 and bases with host bits set.
    pub fn new(base: Address, prefix_len: u8) -> Result<Self, SplitrouteError> {
        if prefix_len > ADDRESS_BITS {
            return Err(SplitrouteError::malformed(
                format!("{}/{}", format_address(base), prefix_len),
                "prefix length must be between 0 and 32",
            ));
        }
        if base & host_mask(prefix_len) != 0 {
            return Err(SplitrouteError::malformed(
                format!("{}/{}", format_address(base), prefix_len),
                "address has host bits set",
            ));
        }
        Ok(Self { base, prefix_len })
    }

    /// The unique block of length `prefix_len` that contains `addr`.
    pub fn containing(addr: Address, prefix_len: u8) -> Result<Self, SplitrouteError> {
        if prefix_len > ADDRESS_BITS {
            return Err(SplitrouteError::malformed(
                format!("{}/{}", format_address(addr), prefix_len),
                "prefix length must be between 0 and 32",
            ));
        }
        Ok(Self {
            base: addr & network_mask(prefix_len),
            prefix_len,
        })
    }

    /// A single-address `/32` block.
    pub const fn host(addr: Address) -> Self {
        Self {
            base: addr,
            prefix_len: ADDRESS_BITS,
        }
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn first(&self) -> Address {
        self.base
    }

    pub fn last(&self) -> Address {
        self.base | host_mask(self.prefix_len)
    }

    /// Number of addresses in the block (1..=2^32).
    pub fn size(&self) -> u64 {
        1u64 << (ADDRESS_BITS - self.prefix_len)
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr & network_mask(self.prefix_len) == self.base
    }

    /// True if `other` lies entirely inside this block.
    pub fn covers(&self, other: &CidrBlock) -> bool {
        other.prefix_len >= self.prefix_len && self.contains(other.base)
    }

    /// The enclosing block at a shorter (or equal) prefix length.
    ///
    /// Returns `None` when `prefix_len` is longer than this block's prefix.
    pub fn ancestor(&self, prefix_len: u8) -> Option<CidrBlock> {
        if prefix_len > self.prefix_len {
            return None;
        }
        Some(Self {
            base: self.base & network_mask(prefix_len),
            prefix_len,
        })
    }

    pub fn to_range(&self) -> AddressRange {
        AddressRange {
            start: self.first(),
            end: self.last(),
        }
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", Ipv4Addr::from(self.base), self.prefix_len)
    }
}

/// Strict parsing: the base must be aligned to the prefix.
impl FromStr for CidrBlock {
    type Err = SplitrouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (addr, prefix) = trimmed
            .split_once('/')
            .ok_or_else(|| SplitrouteError::malformed(s, "missing '/prefix'"))?;
        let base = parse_address(addr)
            .map_err(|_| SplitrouteError::malformed(s, "invalid IPv4 address"))?;
        let prefix_len: u8 = prefix
            .parse()
            .map_err(|_| SplitrouteError::malformed(s, "invalid prefix length"))?;
        Self::new(base, prefix_len).map_err(|e| match e {
            SplitrouteError::MalformedEntry { reason, .. } => SplitrouteError::malformed(s, reason),
            other => other,
        })
    }
}

/// Masks host bits away, like `Ipv4Net::trunc`.
impl From<Ipv4Net> for CidrBlock {
    fn from(net: Ipv4Net) -> Self {
        Self {
            base: u32::from(net.network()),
            prefix_len: net.prefix_len(),
        }
    }
}

impl Serialize for CidrBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Decompose a range into the minimal ordered list of aligned blocks.
///
/// At each step the largest block that is both aligned at the cursor and
/// does not run past `end` is emitted.
///
/// # Examples
/// ```
/// use splitroute::range::{parse_address, range_to_cidrs, AddressRange};
/// let range = AddressRange::new(
///     parse_address("10.0.0.1").unwrap(),
///     parse_address("10.0.0.3").unwrap(),
/// ).unwrap();
/// let blocks: Vec<String> = range_to_cidrs(range).iter().map(|b| b.to_string()).collect();
/// assert_eq!(blocks, vec!["10.0.0.1/32", "10.0.0.2/31"]);
/// ```
pub fn range_to_cidrs(range: AddressRange) -> Vec<CidrBlock> {
    let end = u64::from(range.end);
    let mut cur = u64::from(range.start);
    let mut out = Vec::new();

    while cur <= end {
        // trailing_zeros(0) == 32, so a range starting at 0.0.0.0 may take the whole space
        let align_bits = (cur as u32).trailing_zeros();
        let remaining = end - cur + 1;
        let fit_bits = 63 - remaining.leading_zeros();
        let host_bits = align_bits.min(fit_bits);

        out.push(CidrBlock {
            base: cur as u32,
            prefix_len: ADDRESS_BITS - host_bits as u8,
        });
        cur += 1u64 << host_bits;
    }

    out
}
