//! Command-line argument definitions for espruino-build.

use camino::Utf8PathBuf;
use clap::Parser;

use crate::graph::TaskId;

/// Command-line interface for espruino-build.
#[derive(Debug, Parser)]
#[command(name = "espruino-build")]
#[command(
    author,
    version,
    about = "Compile, bundle and flash TypeScript projects for Espruino boards"
)]
pub struct Cli {
    /// Task to run.
    #[arg(value_enum, default_value_t = TaskId::Build)]
    pub task: TaskId,

    /// Path to the settings file.
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Root directory of the Espruino project.
    #[arg(long)]
    pub project_dir: Option<Utf8PathBuf>,

    /// Print the task graph and exit.
    #[arg(long, conflicts_with = "dry_run")]
    pub list: bool,

    /// Print the execution plan of the selected task without running it.
    #[arg(long)]
    pub dry_run: bool,
}
