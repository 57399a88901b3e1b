//! Headless tower-defense runner.
//!
//! Replays a scripted scenario against a level layout without graphics.
//! The run report is written to stdout as JSON; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Replay a scenario
//! cargo run -p td_headless -- run \
//!     --level assets/levels/meadow.ron \
//!     --scenario assets/scenarios/first_tower.ron
//!
//! # Same, with the final grid rendered as ASCII on stderr
//! cargo run -p td_headless -- run \
//!     --level assets/levels/meadow.ron \
//!     --scenario assets/scenarios/first_tower.ron \
//!     --ascii
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use td_headless::runner::{render_grid, HeadlessRunner};
use td_headless::scenario::{load_level, load_scenario};

#[derive(Parser)]
#[command(name = "td_headless")]
#[command(about = "Headless tower-defense runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario against a level and print a JSON report
    Run {
        /// Level layout file (RON)
        #[arg(short, long)]
        level: PathBuf,

        /// Scenario script file (RON)
        #[arg(short, long)]
        scenario: PathBuf,

        /// Render final grid occupancy as ASCII to stderr
        #[arg(long)]
        ascii: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Run {
            level,
            scenario,
            ascii,
        } => {
            let layout = load_level(&level)?;
            let script = load_scenario(&scenario)?;
            tracing::info!(
                scenario = %script.name,
                width = layout.width,
                height = layout.height,
                "starting run"
            );

            let outcome = HeadlessRunner::new(&layout, script).run()?;
            if ascii {
                eprintln!("{}", render_grid(outcome.game.grid()));
            }
            println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli.command) {
        tracing::error!(%error, "run failed");
        std::process::exit(1);
    }
}
