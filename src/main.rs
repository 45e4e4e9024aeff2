//! splitroute - split-tunnel IPv4 route set calculator
//!
//! Prints the canonical CIDR list to route through a tunnel interface.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use splitroute::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    // stdout is reserved for the rendered route set
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Compute {
            inputs,
            format,
            output,
            stats,
        } => splitroute::commands::compute::run(
            &inputs,
            format.as_deref(),
            output.as_ref(),
            stats,
            &cli.config,
        ),
        Commands::Check { ip, inputs } => {
            splitroute::commands::check::run(&ip, &inputs, &cli.config)
        }
        Commands::Normalize { entries } => splitroute::commands::normalize::run(&entries),
        Commands::Init { force } => splitroute::commands::init::run(force, &cli.config),
        Commands::Version => {
            println!("splitroute {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
