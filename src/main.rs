//! `espruino-build` application entry point.
//!
//! Runs one task of the Espruino build pipeline, together with everything it
//! depends on. Uses `eyre` for opaque error handling at the application
//! boundary, converting domain-specific errors into human-readable reports.
//!
//! Settings are loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Settings file (`.espruino-build.toml` or path from `ESPRUINO_BUILD_CONFIG_PATH`)
//! 3. Environment variables (`ESPRUINO_BUILD_*`)
//! 4. Command-line arguments

use clap::Parser;
use eyre::{Report, Result as EyreResult};
use espruino_build::api::{TaskListing, list_tasks, plan_task, run_task};
use espruino_build::config::{BuildSettings, Cli, load_settings};
use espruino_build::graph::TaskId;
use espruino_build::logging::init_logging;
use espruino_build::tool::SystemCommandRunner;

/// Application entry point.
///
/// A failing task surfaces as an error report and a non-zero exit code.
fn main() -> EyreResult<()> {
    let cli = Cli::parse();
    let env = mockable::DefaultEnv::new();
    init_logging(&env);

    if cli.list {
        print_listing(&list_tasks().map_err(Report::from)?);
        return Ok(());
    }
    if cli.dry_run {
        print_plan(cli.task, &plan_task(cli.task).map_err(Report::from)?);
        return Ok(());
    }

    let settings = load_settings(&cli, &env).map_err(Report::from)?;
    run(&settings, cli.task)
}

/// Run the selected task on a fresh runtime.
fn run(settings: &BuildSettings, task: TaskId) -> EyreResult<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime
        .block_on(run_task(settings, task, &SystemCommandRunner))
        .map_err(Report::from)?;
    tracing::info!(task = %report.entry(), tasks = report.completed().len(), "finished");
    Ok(())
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_listing(listing: &[TaskListing]) {
    for row in listing {
        let dependencies: Vec<&str> = row.dependencies.iter().copied().map(TaskId::name).collect();
        let marker = if row.concurrent { " (concurrent)" } else { "" };
        if dependencies.is_empty() {
            println!("{}{marker}", row.task);
        } else {
            println!("{}{marker} <- {}", row.task, dependencies.join(", "));
        }
    }
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_plan(entry: TaskId, plan: &[TaskId]) {
    println!("{entry}:");
    for (step, task) in plan.iter().enumerate() {
        println!("  {}. {task}", step + 1);
    }
}
