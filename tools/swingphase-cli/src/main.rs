//! SwingPhase CLI: command-line interface for swing phase detection.
//!
//! Usage:
//!   swingphase analyze <FRAMES>       Detect swing phases in one landmark stream
//!   swingphase analyze <FRAMES> --include-pose
//!                                     Also report the landmark series
//!   swingphase batch <FRAMES>...      Analyze many streams concurrently
//!   swingphase validate <FRAMES>      Check a landmark stream before analysis
//!   swingphase init-config            Write the default configuration file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use swingphase_common::config::AppConfig;
use swingphase_pose_model::HandType;

mod commands;

#[derive(Parser)]
#[command(
    name = "swingphase",
    about = "Golf swing phase detection from pose landmarks",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect swing phases in a landmark stream
    Analyze {
        /// Path to the frames JSONL file
        path: PathBuf,

        /// Leading hand of the golfer: R or L
        #[arg(long, default_value = "R")]
        hand: HandType,

        /// Video frame rate, overrides the configured value
        #[arg(long)]
        fps: Option<u32>,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,

        /// Include the per-joint landmark series in the report
        #[arg(long)]
        include_pose: bool,
    },

    /// Analyze several landmark streams concurrently
    Batch {
        /// Paths to frames JSONL files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Leading hand of the golfer(s): R or L
        #[arg(long, default_value = "R")]
        hand: HandType,

        /// Per-session time limit in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },

    /// Check a landmark stream for problems
    Validate {
        /// Path to the frames JSONL file
        path: PathBuf,
    },

    /// Write the default configuration file
    InitConfig {
        /// Output path (defaults to the user config location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    swingphase_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Analyze {
            path,
            hand,
            fps,
            pretty,
            include_pose,
        } => commands::analyze::run(path, hand, config, fps, pretty, include_pose),
        Commands::Batch {
            paths,
            hand,
            timeout_secs,
        } => commands::batch::run(paths, hand, config, timeout_secs).await,
        Commands::Validate { path } => commands::validate::run(path, &config),
        Commands::InitConfig { output, force } => commands::init_config::run(output, force),
    }
}
