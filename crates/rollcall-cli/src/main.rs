//! `rollcall` - presence and exit controller for a three-reader site.
//!
//! ```sh
//! rollcall run --config site.toml
//! rollcall simulate --config site.toml --scenario sneak.toml
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rollcall_cli::scenario::{self, Scenario};
use rollcall_cli::{Config, logging, runtime};

#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the controller: commands on stdin, events on stdout
    Run {
        /// Path to TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Replay a scripted scenario on a synthetic clock
    Simulate {
        /// Path to TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to TOML scenario file
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let config = Config::load(config.as_deref())?;
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(runtime::run(config))
        }
        Commands::Simulate { config, scenario } => {
            let config = Config::load(config.as_deref())?;
            let scenario = Scenario::from_file(&scenario)?;
            let stdout = std::io::stdout();
            let summary = scenario::simulate(&config, &scenario, &mut stdout.lock())?;
            if summary.bus_violations > 0 {
                anyhow::bail!("reader bus contention detected ({} events)", summary.bus_violations);
            }
            Ok(())
        }
    }
}
