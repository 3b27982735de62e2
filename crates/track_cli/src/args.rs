use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Point-mass lap simulator
#[derive(Parser, Debug)]
#[command(name = "track")]
#[command(author, version, about = "Simulate a car over straights and corners", long_about = None)]
pub struct Cli {
    /// Log filter, overridden by RUST_LOG when set
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one circuit and report its timing and limits
    Simulate {
        #[command(flatten)]
        setup: Setup,

        /// Dump the full trajectory as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Search force and radius combinations for the fastest lap
    Sweep {
        #[command(flatten)]
        setup: Setup,

        /// JSON file with an explicit grid; overrides the ranges below
        #[arg(long)]
        grid: Option<PathBuf>,

        /// Force range applied to every straight, MIN:MAX:STEP in newtons
        #[arg(long, default_value = "5000:45000:5000")]
        force_range: String,

        /// Radius range applied to every corner, MIN:MAX:STEP in meters
        #[arg(long, default_value = "4:20:4")]
        radius_range: String,

        /// Number of ranked candidates to print
        #[arg(long, default_value = "5")]
        top: usize,
    },
}

/// Options shared by every command.
#[derive(Args, Debug)]
pub struct Setup {
    /// JSON file with simulation constants
    #[arg(long)]
    pub constants: Option<PathBuf>,

    /// JSON file with the circuit; the built-in reference circuit is used otherwise
    #[arg(long)]
    pub circuit: Option<PathBuf>,

    /// Vehicle mass override, kg
    #[arg(long)]
    pub mass: Option<f64>,

    /// Time step override, s
    #[arg(long)]
    pub dt: Option<f64>,

    /// Acceleration limit override, multiples of g
    #[arg(long)]
    pub g_factor: Option<f64>,

    /// Lateral limit handling in corners
    #[arg(long, value_enum)]
    pub policy: Option<Policy>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    HardCap,
    Diagnostic,
}
