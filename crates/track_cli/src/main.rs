//! `track` command-line runner.
//!
//! ```bash
//! # Reference circuit summary
//! track simulate
//!
//! # Full trajectory as JSON, heavier car
//! track simulate --mass 950 --json > lap.json
//!
//! # Grid search over forces and radii
//! track sweep --force-range 10000:40000:10000 --radius-range 5:20:5 --top 10
//! ```

mod args;
mod config;
mod report;

use anyhow::{Context, Result};
use args::{Cli, Command};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use track_core::sweep::sweep;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Simulate { setup, json } => {
            let constants = config::load_constants(&setup)?;
            let circuit = config::load_circuit(&setup)?;
            info!(
                straights = circuit.straights.len(),
                corners = circuit.corners.len(),
                dt = constants.dt,
                "simulating circuit"
            );
            let trajectory = circuit
                .simulate(&constants)
                .context("Circuit simulation failed.")?;
            if json {
                let text = serde_json::to_string_pretty(&trajectory)
                    .context("Failed to serialize trajectory.")?;
                println!("{text}");
            } else {
                report::print_trajectory(&trajectory, &constants);
            }
        }
        Command::Sweep {
            setup,
            grid,
            force_range,
            radius_range,
            top,
        } => {
            let constants = config::load_constants(&setup)?;
            let circuit = config::load_circuit(&setup)?;
            let grid = match grid {
                Some(path) => config::load_grid(&path)?,
                None => {
                    let forces = config::parse_range(&force_range)?;
                    let radii = config::parse_range(&radius_range)?;
                    config::uniform_grid(&circuit, &forces, &radii)
                }
            };
            info!(candidates = grid.len(), "running sweep");
            let report = sweep(&circuit, &grid, &constants).context("Sweep failed.")?;
            report::print_sweep(&report, top);
        }
    }

    Ok(())
}
