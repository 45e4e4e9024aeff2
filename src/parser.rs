//! Parsing of textual address entries.
//!
//! Three forms are recognized:
//! - a bare address (`192.0.2.1`), taken as a single address
//! - a CIDR (`192.0.2.0/24`), host bits are masked away
//! - a registry-style range (`192.0.2.0-192.0.2.255`)
//!
//! A bad entry never aborts a list: it is recorded in [`ParseOutcome::rejected`]
//! and parsing moves on to the next line.

use ipnet::Ipv4Net;
use serde::Serialize;
use tracing::debug;

use crate::error::SplitrouteError;
use crate::range::{parse_address, AddressRange, CidrBlock};

/// An entry that was skipped because it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejected {
    /// 1-based line (or feed item) number
    pub line: usize,
    pub entry: String,
    pub reason: String,
}

/// Result of parsing a list of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub ranges: Vec<AddressRange>,
    pub rejected: Vec<Rejected>,
}

impl ParseOutcome {
    /// Number of entries that parsed successfully
    pub fn accepted(&self) -> usize {
        self.ranges.len()
    }

    fn record(&mut self, line: usize, entry: &str, result: Result<AddressRange, SplitrouteError>) {
        match result {
            Ok(range) => self.ranges.push(range),
            Err(e) => {
                let reason = match e {
                    SplitrouteError::MalformedEntry { reason, .. } => reason,
                    other => other.to_string(),
                };
                self.rejected.push(Rejected {
                    line,
                    entry: entry.to_string(),
                    reason,
                });
            }
        }
    }
}

/// Parse a single entry into an address range.
///
/// # Examples
/// ```
/// use splitroute::parser::parse_entry;
/// assert_eq!(parse_entry("10.0.0.1").unwrap().size(), 1);
/// assert_eq!(parse_entry("10.0.0.0/24").unwrap().size(), 256);
/// assert_eq!(parse_entry("10.0.0.0-10.0.0.9").unwrap().size(), 10);
/// assert!(parse_entry("not-an-ip").is_err());
/// ```
pub fn parse_entry(token: &str) -> Result<AddressRange, SplitrouteError> {
    let entry = token.trim();
    if entry.is_empty() {
        return Err(SplitrouteError::malformed(token, "empty entry"));
    }

    if let Some((start, end)) = entry.split_once('-') {
        let start = parse_address(start)
            .map_err(|_| SplitrouteError::malformed(entry, "invalid range start address"))?;
        let end = parse_address(end)
            .map_err(|_| SplitrouteError::malformed(entry, "invalid range end address"))?;
        return AddressRange::new(start, end).map_err(|_| {
            SplitrouteError::malformed(entry, "range start is greater than range end")
        });
    }

    if entry.contains('/') {
        let net: Ipv4Net = entry.parse().map_err(|_| {
            SplitrouteError::malformed(entry, "invalid CIDR (expected a.b.c.d/0-32)")
        })?;
        let block = CidrBlock::from(net);
        if u32::from(net.addr()) != block.base() {
            debug!("Host bits set in {}, using {}", entry, block);
        }
        return Ok(block.to_range());
    }

    parse_address(entry)
        .map(AddressRange::single)
        .map_err(|_| SplitrouteError::malformed(entry, "invalid IPv4 address"))
}

/// Parse newline-delimited text.
///
/// Blank lines and `#` comments (whole-line or trailing) are ignored.
pub fn parse_list(content: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for (idx, line) in content.lines().enumerate() {
        let entry = strip_comment(line);
        if entry.is_empty() {
            continue;
        }
        outcome.record(idx + 1, entry, parse_entry(entry));
    }

    outcome
}

/// Parse an already-split sequence of entries, such as a feed's JSON array.
///
/// Blank items are ignored; numbering is 1-based over the whole sequence.
pub fn parse_entries<I, S>(entries: I) -> ParseOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut outcome = ParseOutcome::default();

    for (idx, item) in entries.into_iter().enumerate() {
        let entry = item.as_ref().trim();
        if entry.is_empty() {
            continue;
        }
        outcome.record(idx + 1, entry, parse_entry(entry));
    }

    outcome
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::parse_address;

    fn addr(s: &str) -> u32 {
        parse_address(s).unwrap()
    }

    #[test]
    fn test_parse_entry_single_address() {
        let range = parse_entry("192.168.1.1").unwrap();
        assert_eq!(range, AddressRange::single(addr("192.168.1.1")));
    }

    #[test]
    fn test_parse_entry_cidr() {
        let range = parse_entry("10.0.0.0/8").unwrap();
        assert_eq!(range.start(), addr("10.0.0.0"));
        assert_eq!(range.end(), addr("10.255.255.255"));
    }

    #[test]
    fn test_parse_entry_cidr_host_bits_masked() {
        let range = parse_entry("10.1.2.3/8").unwrap();
        assert_eq!(range.start(), addr("10.0.0.0"));
        assert_eq!(range.end(), addr("10.255.255.255"));
    }

    #[test]
    fn test_parse_entry_ripe_range_is_one_block() {
        let range = parse_entry("203.0.113.0-203.0.113.255").unwrap();
        let blocks: Vec<String> = range.to_cidrs().iter().map(|b| b.to_string()).collect();
        assert_eq!(blocks, vec!["203.0.113.0/24"]);
    }

    #[test]
    fn test_parse_entry_range_with_spaces() {
        let range = parse_entry(" 10.0.0.0 - 10.0.0.255 ").unwrap();
        assert_eq!(range.size(), 256);
    }

    #[test]
    fn test_parse_entry_inverted_range() {
        let err = parse_entry("10.0.0.9-10.0.0.1").unwrap_err();
        assert!(err.is_malformed_entry());
        assert!(err.to_string().contains("greater"));
    }

    #[test]
    fn test_parse_entry_invalid_forms() {
        assert!(parse_entry("not-an-ip").is_err());
        assert!(parse_entry("").is_err());
        assert!(parse_entry("   ").is_err());
        assert!(parse_entry("256.0.0.1").is_err());
        assert!(parse_entry("1.2.3").is_err());
        assert!(parse_entry("10.0.0.0/33").is_err());
        assert!(parse_entry("10.0.0.0/").is_err());
        assert!(parse_entry("/24").is_err());
        assert!(parse_entry("10.0.0.1-").is_err());
        assert!(parse_entry("2001:db8::/32").is_err());
    }

    #[test]
    fn test_parse_entry_full_space() {
        assert_eq!(parse_entry("0.0.0.0/0").unwrap(), AddressRange::FULL);
        assert_eq!(
            parse_entry("0.0.0.0-255.255.255.255").unwrap(),
            AddressRange::FULL
        );
    }

    #[test]
    fn test_parse_list_skips_malformed_lines() {
        let content = "10.0.0.0/8\nnot-an-ip\n192.168.0.0/16\n";
        let outcome = parse_list(content);
        assert_eq!(outcome.accepted(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].line, 2);
        assert_eq!(outcome.rejected[0].entry, "not-an-ip");
    }

    #[test]
    fn test_parse_list_comments_and_blanks() {
        let content = "# local exclusions\n\n10.0.0.0/8   # office\n   \n  # indented comment\n";
        let outcome = parse_list(content);
        assert_eq!(outcome.accepted(), 1);
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn test_parse_list_crlf() {
        let outcome = parse_list("10.0.0.1\r\n10.0.0.2\r\n");
        assert_eq!(outcome.accepted(), 2);
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn test_parse_list_empty() {
        let outcome = parse_list("");
        assert_eq!(outcome, ParseOutcome::default());
    }

    #[test]
    fn test_parse_entries_numbering() {
        let outcome = parse_entries(["1.0.0.0/24", "", "bogus", "2.0.0.0-2.0.0.3"]);
        assert_eq!(outcome.accepted(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].line, 3);
    }
}
