//! # splitroute - Split-Tunnel Route Set Calculator
//!
//! Computes the exact list of IPv4 CIDR blocks to send through a tunnel
//! interface, keeping local networks and one country's address space on the
//! direct path:
//!
//! ```text
//! excluded = exclude ∪ aggregate(country, cutoff_prefix)
//! allowed  = (universe − excluded) ∪ include
//! ```
//!
//! The result is canonical: sorted, non-overlapping, no two blocks that
//! could be merged, every block aligned to its prefix. Equal address sets
//! always render to the same bytes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       splitroute                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: compute, check, normalize, init, version   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── cutoff, universe, list paths, output format          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Sources (FileSystem trait)                                 │
//! │    ├── exclude / include lists                              │
//! │    └── country feed (registry JSON or plain list)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Planner                                                    │
//! │    ├── Parser: address, CIDR, range → AddressRange          │
//! │    ├── CidrSet: union, difference, intersection, complement │
//! │    └── Aggregator: coarsen country blocks to the cutoff     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Render                                                     │
//! │    └── plain, AllowedIPs line, ipset restore script, JSON   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Applying the result (ipset, policy routing, the tunnel daemon's config)
//! is left to the caller.
//!
//! ## Example Usage
//!
//! ```
//! use splitroute::cidr_set::CidrSet;
//! use splitroute::parser::parse_list;
//! use splitroute::planner::{compute_plan, ParsedSource, PlanInputs, RouteConfig};
//!
//! let exclude = ParsedSource::from_outcome("exclude", parse_list("10.0.0.0/8\n"));
//! let include = ParsedSource::from_outcome("include", parse_list("10.5.5.5\n"));
//! let inputs = PlanInputs {
//!     exclude,
//!     include,
//!     ..Default::default()
//! };
//!
//! let config = RouteConfig::new(32, CidrSet::universe()).unwrap();
//! let plan = compute_plan(&config, &inputs).unwrap();
//! assert!(plan.allowed().contains(0x0A05_0505));
//! assert!(!plan.allowed().contains(0x0A05_0506));
//! ```
//!
//! ## Modules
//!
//! - [`range`] - Addresses, ranges, CIDR blocks and range-to-CIDR decomposition
//! - [`parser`] - Entry and list parsing with per-line rejects
//! - [`cidr_set`] - Canonical CIDR sets and their set algebra
//! - [`aggregator`] - Canonicalization and cutoff coarsening
//! - [`planner`] - Route plan computation and per-address explanation
//! - [`feed`] - Country feed payload decoding
//! - [`sources`] - Loading list files and the feed file
//! - [`render`] - Output formats for external tools
//! - [`stats`] - Diagnostic counts
//! - [`config`] - Configuration parsing and validation
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`utils`] - Common utility functions (formatting, truncation)

pub mod aggregator;
pub mod cidr_set;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod feed;
pub mod fs_abstraction;
pub mod parser;
pub mod planner;
pub mod range;
pub mod render;
pub mod sources;
pub mod stats;
pub mod utils;
pub mod validation;

pub use cidr_set::CidrSet;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::SplitrouteError;
pub use range::{AddressRange, CidrBlock};
