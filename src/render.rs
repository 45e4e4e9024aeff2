//! Rendering of a computed route set for the tools that apply it.
//!
//! Nothing here touches the system: the output is printed or written to a
//! file and handed to `wg`/`ipset restore`/a custom script.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::cidr_set::CidrSet;
use crate::error::SplitrouteError;
use crate::stats::PlanStats;

/// Default ipset name used by the `ipset` format
pub const DEFAULT_IPSET_NAME: &str = "wg_allowed_ips";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One CIDR per line
    #[default]
    Plain,
    /// A WireGuard `AllowedIPs = ...` line
    AllowedIps,
    /// An `ipset restore` script
    Ipset,
    /// CIDRs and statistics as JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(OutputFormat::Plain),
            "allowed-ips" | "allowedips" | "wireguard" => Ok(OutputFormat::AllowedIps),
            "ipset" => Ok(OutputFormat::Ipset),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown format: {}. Use plain, allowed-ips, ipset, or json",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Plain => "plain",
            OutputFormat::AllowedIps => "allowed-ips",
            OutputFormat::Ipset => "ipset",
            OutputFormat::Json => "json",
        };
        f.write_str(name)
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    cidrs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<&'a PlanStats>,
}

/// Render a set in the requested format. Output always ends with a newline.
///
/// `stats` is only used by the JSON format.
pub fn render(
    set: &CidrSet,
    stats: Option<&PlanStats>,
    format: OutputFormat,
    ipset_name: &str,
) -> Result<String, SplitrouteError> {
    let cidrs = set.to_strings();
    let mut out = String::new();

    match format {
        OutputFormat::Plain => {
            for cidr in &cidrs {
                out.push_str(cidr);
                out.push('\n');
            }
        }
        OutputFormat::AllowedIps => {
            out.push_str("AllowedIPs = ");
            out.push_str(&cidrs.join(", "));
            out.push('\n');
        }
        OutputFormat::Ipset => {
            let _ = writeln!(out, "create {} hash:net family inet -exist", ipset_name);
            let _ = writeln!(out, "flush {}", ipset_name);
            for cidr in &cidrs {
                let _ = writeln!(out, "add {} {}", ipset_name, cidr);
            }
        }
        OutputFormat::Json => {
            let doc = JsonOutput { cidrs, stats };
            out = serde_json::to_string_pretty(&doc)
                .map_err(|e| SplitrouteError::Render(e.to_string()))?;
            out.push('\n');
        }
    }

    Ok(out)
}
