mod cli;
mod config;
mod error;
mod logging;
mod progress;

use crate::cli::{Cli, Commands, MinimizeArgs};
use crate::error::{CliError, Result};
use crate::progress::CliProgressHandler;
use clap::Parser;
use gmxem::core::runner::process::{ProcessRunner, check_engine_available};
use gmxem::engine::progress::ProgressReporter;
use gmxem::workflows;
use std::fs;
use std::time::Duration;
use tracing::{debug, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\nError: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("GMXEM CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    match cli.command {
        Commands::Minimize(args) => run_minimize(args),
    }
}

fn run_minimize(args: MinimizeArgs) -> Result<()> {
    let request = config::load_request(&args.job)?;

    if !args.no_probe {
        let banner = check_engine_available(&request.engine)?;
        info!("Engine available: {banner}");
    }

    let runner = ProcessRunner::new();
    let handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(handler.get_callback());
    let timeout = args.timeout.map(Duration::from_secs);

    let outcome = workflows::minimize::run(request, &runner, &reporter, timeout)?;
    handler.clear();

    let molecule = outcome
        .molecules
        .first()
        .ok_or_else(|| CliError::Config("pipeline returned no molecule".to_string()))?;
    molecule.to_file(&args.output)?;
    info!("Minimized structure written to '{}'.", args.output.display());

    if let Some(dir) = &args.trajectory_dir {
        fs::create_dir_all(dir)?;
        for (label, trajectory) in &outcome.trajectories {
            let path = dir.join(format!("{label}.trr"));
            trajectory.to_file(&path)?;
            info!("Trajectory '{label}' written to '{}'.", path.display());
        }
    }

    Ok(())
}
