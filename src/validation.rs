//! Centralized validation functions for splitroute configuration.
//!
//! This module provides unified validation for:
//! - the aggregation cutoff
//! - country codes
//! - ipset names
//! - universe entries and probe addresses

use anyhow::{bail, Result};

use crate::range::{parse_address, Address, CidrBlock, ADDRESS_BITS};

/// Longest set name accepted by the kernel's ipset module
pub const MAX_IPSET_NAME_LEN: usize = 31;

/// Validate the aggregation cutoff prefix.
///
/// # Examples
/// ```
/// use splitroute::validation::validate_cutoff;
/// assert!(validate_cutoff(10).is_ok());
/// assert!(validate_cutoff(32).is_ok());
/// assert!(validate_cutoff(33).is_err());
/// ```
pub fn validate_cutoff(cutoff: u8) -> Result<()> {
    if cutoff > ADDRESS_BITS {
        bail!("Invalid cutoff_prefix {}. Must be between 0 and 32", cutoff);
    }
    Ok(())
}

/// Validate an ISO 3166 alpha-2 country code (two uppercase ASCII letters).
///
/// # Examples
/// ```
/// use splitroute::validation::validate_country_code;
/// assert!(validate_country_code("RU").is_ok());
/// assert!(validate_country_code("ru").is_err());
/// assert!(validate_country_code("RUS").is_err());
/// ```
pub fn validate_country_code(code: &str) -> Result<()> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        bail!(
            "Invalid country_code '{}'. Use two uppercase letters like 'RU'",
            code
        );
    }
    Ok(())
}

/// Validate an ipset set name.
///
/// Names are passed to `ipset restore`, so only ASCII alphanumerics, `_`
/// and `-` are allowed.
pub fn validate_ipset_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("ipset name cannot be empty");
    }
    if name.len() > MAX_IPSET_NAME_LEN {
        bail!(
            "ipset name '{}' is too long ({} chars, max {})",
            name,
            name.len(),
            MAX_IPSET_NAME_LEN
        );
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        bail!(
            "Invalid ipset name '{}'. Only letters, digits, '_' and '-' are allowed",
            name
        );
    }
    Ok(())
}

/// Validate a universe entry: a strict CIDR with no host bits set.
///
/// # Examples
/// ```
/// use splitroute::validation::validate_universe_entry;
/// assert!(validate_universe_entry("0.0.0.0/0").is_ok());
/// assert!(validate_universe_entry("10.0.0.1/8").is_err());
/// ```
pub fn validate_universe_entry(entry: &str) -> Result<CidrBlock> {
    entry
        .trim()
        .parse::<CidrBlock>()
        .map_err(|e| anyhow::anyhow!("Invalid universe entry '{}': {}", entry, e))
}

/// Validate a single IPv4 address given on the command line.
pub fn validate_ip(ip_str: &str) -> Result<Address> {
    parse_address(ip_str.trim()).map_err(|_| anyhow::anyhow!("Invalid IPv4 address: {}", ip_str))
}
