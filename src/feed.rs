//! Country feed payload decoding.
//!
//! The feed is fetched by an external collaborator; this module only turns
//! its payload into a list of entry strings. Three shapes are accepted:
//! - the registry's country-resource-list JSON document
//! - a bare JSON array of entry strings
//! - a plain newline-delimited list (one entry per line, `#` comments)

use serde::Deserialize;
use tracing::debug;

use crate::error::SplitrouteError;
use crate::parser::{parse_entries, parse_list, ParseOutcome};

/// Base URL of the registry's country resource list.
pub const COUNTRY_RESOURCE_URL: &str =
    "https://stat.ripe.net/data/country-resource-list/data.json";

/// Decoded feed payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedPayload {
    /// Entries from a JSON document, with the country code it describes (if stated)
    Registry {
        resource: Option<String>,
        entries: Vec<String>,
    },
    /// Raw newline-delimited text
    PlainText(String),
}

impl FeedPayload {
    /// Number of raw entries before parsing (comments and blanks excluded for text)
    pub fn raw_count(&self) -> usize {
        match self {
            FeedPayload::Registry { entries, .. } => entries.len(),
            FeedPayload::PlainText(text) => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .count(),
        }
    }

    /// Country code the payload declares, if any
    pub fn resource(&self) -> Option<&str> {
        match self {
            FeedPayload::Registry { resource, .. } => resource.as_deref(),
            FeedPayload::PlainText(_) => None,
        }
    }

    /// Fail if the payload declares a country other than `country_code`.
    ///
    /// Payloads without a declared country are accepted.
    pub fn ensure_country(&self, country_code: &str) -> Result<(), SplitrouteError> {
        match self.resource() {
            Some(resource) if !resource.eq_ignore_ascii_case(country_code) => {
                Err(SplitrouteError::Feed(format!(
                    "feed describes country '{}', expected '{}'",
                    resource, country_code
                )))
            }
            _ => Ok(()),
        }
    }

    /// Parse every entry, collecting rejects.
    pub fn parse(&self) -> ParseOutcome {
        match self {
            FeedPayload::Registry { entries, .. } => parse_entries(entries),
            FeedPayload::PlainText(text) => parse_list(text),
        }
    }
}

#[derive(Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    status: Option<String>,
    data: Option<RegistryData>,
}

#[derive(Deserialize)]
struct RegistryData {
    #[serde(default)]
    resource: Option<String>,
    resources: Option<RegistryResources>,
}

#[derive(Deserialize)]
struct RegistryResources {
    ipv4: Option<Vec<String>>,
}

/// Decode a feed payload.
///
/// A payload whose first non-blank character is `{` is treated as the
/// registry JSON document, `[` as a JSON array of entries; anything else is
/// a plain list.
///
/// # Errors
/// Returns [`SplitrouteError::Feed`] for malformed JSON, a non-`ok` status,
/// or a document without `data.resources.ipv4`.
pub fn parse_feed(content: &str) -> Result<FeedPayload, SplitrouteError> {
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        let entries: Vec<String> = serde_json::from_str(content)
            .map_err(|e| SplitrouteError::Feed(format!("invalid JSON array: {}", e)))?;
        debug!("Feed payload is a JSON array of {} entries", entries.len());
        return Ok(FeedPayload::Registry {
            resource: None,
            entries,
        });
    }

    if !trimmed.starts_with('{') {
        debug!("Feed payload is plain text");
        return Ok(FeedPayload::PlainText(content.to_string()));
    }

    let doc: RegistryDocument = serde_json::from_str(content)
        .map_err(|e| SplitrouteError::Feed(format!("invalid JSON: {}", e)))?;

    if let Some(status) = doc.status.as_deref() {
        if status != "ok" {
            return Err(SplitrouteError::Feed(format!(
                "registry returned status '{}'",
                status
            )));
        }
    }

    let data = doc
        .data
        .ok_or_else(|| SplitrouteError::Feed("missing 'data' object".to_string()))?;
    let entries = data
        .resources
        .and_then(|r| r.ipv4)
        .ok_or_else(|| SplitrouteError::Feed("missing 'data.resources.ipv4' list".to_string()))?;

    debug!(
        "Registry feed for {} with {} IPv4 entries",
        data.resource.as_deref().unwrap_or("unknown resource"),
        entries.len()
    );

    Ok(FeedPayload::Registry {
        resource: data.resource,
        entries,
    })
}

/// URL an external fetcher should download for a country code.
///
/// # Examples
/// ```
/// use splitroute::feed::country_resource_url;
/// assert!(country_resource_url("RU").ends_with("?resource=RU"));
/// ```
pub fn country_resource_url(country_code: &str) -> String {
    format!("{}?resource={}", COUNTRY_RESOURCE_URL, country_code)
}
