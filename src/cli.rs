//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "splitroute")]
#[command(author, version, about = "Split-tunnel IPv4 route set calculator")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (missing file means defaults)
    #[arg(short, long, default_value = "/etc/splitroute/config.yaml", global = true)]
    pub config: PathBuf,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Input overrides shared by `compute` and `check`
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Local exclude list (overrides config)
    #[arg(long)]
    pub exclude: Option<PathBuf>,

    /// Local include list (overrides config)
    #[arg(long)]
    pub include: Option<PathBuf>,

    /// Country feed file (overrides config)
    #[arg(long)]
    pub feed: Option<PathBuf>,

    /// Aggregation cutoff prefix, 0-32 (overrides config)
    #[arg(long)]
    pub cutoff: Option<u8>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the route set and print it
    Compute {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output format (plain, allowed-ips, ipset, json)
        #[arg(long, short)]
        format: Option<String>,

        /// Write the result to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Explain whether an address is routed and which list decided it
    Check {
        /// IPv4 address to check
        ip: String,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Normalize entries to canonical CIDR blocks
    Normalize {
        /// Addresses, CIDRs or ranges
        #[arg(required = true)]
        entries: Vec<String>,
    },

    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show version
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compute_with_overrides() {
        let cli = Cli::try_parse_from([
            "splitroute",
            "compute",
            "--exclude",
            "/tmp/ex.txt",
            "--cutoff",
            "16",
            "--format",
            "ipset",
        ])
        .unwrap();
        match cli.command {
            Commands::Compute {
                inputs,
                format,
                output,
                stats,
            } => {
                assert_eq!(inputs.exclude, Some(PathBuf::from("/tmp/ex.txt")));
                assert_eq!(inputs.cutoff, Some(16));
                assert_eq!(format.as_deref(), Some("ipset"));
                assert!(output.is_none());
                assert!(!stats);
            }
            _ => panic!("expected compute"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["splitroute", "check", "8.8.8.8", "-v", "-c", "/x.yaml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("/x.yaml"));
    }

    #[test]
    fn test_normalize_requires_entries() {
        assert!(Cli::try_parse_from(["splitroute", "normalize"]).is_err());
    }

    #[test]
    fn test_cutoff_must_be_numeric() {
        assert!(Cli::try_parse_from(["splitroute", "compute", "--cutoff", "ten"]).is_err());
    }
}
