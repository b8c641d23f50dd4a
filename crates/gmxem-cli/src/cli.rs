use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "GMXEM CLI - A command-line interface for running GROMACS energy minimization through the staged GMXEM pipeline.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an energy minimization described by a TOML job file.
    Minimize(MinimizeArgs),
}

/// Arguments for the `minimize` subcommand.
#[derive(Args, Debug)]
pub struct MinimizeArgs {
    /// Path to the minimization job file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub job: PathBuf,

    /// Path for the minimized output structure file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Directory to write the labeled trajectories into (one file per label).
    #[arg(short = 't', long, value_name = "DIR")]
    pub trajectory_dir: Option<PathBuf>,

    /// Per-invocation timeout in seconds for the external engine.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip the engine availability probe before starting the run.
    #[arg(long)]
    pub no_probe: bool,
}
