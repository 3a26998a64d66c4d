//! hubnet - replay subnet moves
//!
//! Usage:
//!   hubnet run                          # built-in reference scenario
//!   hubnet run -s moves.toml -f json    # scripted scenario, JSON report
//!   hubnet reference > moves.toml       # starting point for new scenarios

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hub_subnet_manager::{Scenario, ScenarioReport, TracingSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Replay router and target moves against a subnet manager
#[derive(Parser)]
#[command(name = "hubnet")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print every step's events and resulting membership
    Run {
        /// Scenario file (TOML); the reference scenario is used when omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Override the scenario's hub offset
        #[arg(long)]
        hub_offset: Option<u64>,

        /// Skip invariant verification after each move
        #[arg(long)]
        no_verify: bool,
    },
    /// Print the reference scenario as TOML
    Reference,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            format,
            hub_offset,
            no_verify,
        } => {
            let mut scenario = match scenario {
                Some(path) => load_scenario(&path)?,
                None => Scenario::reference(),
            };
            if let Some(offset) = hub_offset {
                scenario.manager.hub_offset = offset;
            }
            if no_verify {
                scenario.manager.verify_invariants = false;
            }

            let report = scenario
                .run_with_sink(Some(Arc::new(TracingSink)))
                .context("Scenario run failed")?;

            match format {
                OutputFormat::Table => print_table(&report),
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&report)
                        .context("Failed to serialize report")?;
                    println!("{json}");
                }
            }
        }
        Commands::Reference => {
            let text = Scenario::reference()
                .to_toml()
                .context("Failed to serialize reference scenario")?;
            print!("{text}");
        }
    }

    Ok(())
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

    Scenario::from_toml(&content)
        .with_context(|| format!("Failed to parse scenario file: {}", path.display()))
}

fn print_table(report: &ScenarioReport) {
    print!("{}", report.initial);

    for step in &report.steps {
        println!();
        println!("{}", step.step);
        for event in &step.events {
            println!("  Sending {}", event);
        }
        print!("{}", step.snapshot);
    }
}
