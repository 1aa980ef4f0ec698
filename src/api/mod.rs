//! Orchestration API for espruino-build.
//!
//! [`run_task`] is the whole pipeline behind one call: it plans the selected
//! task over the standard graph, opens the project, loads the board
//! parameters when a planned task needs them, and drives the scheduler.
//! [`plan_task`] and [`list_tasks`] back the `--dry-run` and `--list` flags.
//!
//! Functions here accept library-owned types (not clap types), never print
//! and never exit the process. The binary owns presentation.

use crate::config::{BuildSettings, EnvironmentConfig};
use crate::error::Result;
use crate::graph::{RunReport, Scheduler, TaskGraph, TaskId};
use crate::tasks::{PipelineContext, PipelineExecutor};
use crate::tool::CommandRunner;

/// One row of the task listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListing {
    /// The task.
    pub task: TaskId,
    /// Direct dependencies, in declaration order.
    pub dependencies: Vec<TaskId>,
    /// Whether the task may overlap with its concurrent siblings.
    pub concurrent: bool,
}

/// Describe every task of the standard graph.
///
/// # Errors
///
/// Returns `TaskError` if the standard graph fails validation.
pub fn list_tasks() -> Result<Vec<TaskListing>> {
    let graph = TaskGraph::standard()?;
    Ok(graph
        .nodes()
        .iter()
        .map(|node| TaskListing {
            task: node.id(),
            dependencies: node.dependencies().to_vec(),
            concurrent: node.is_concurrent(),
        })
        .collect())
}

/// Return the tasks `entry` would run, dependencies first.
///
/// # Errors
///
/// Returns `TaskError` if the standard graph fails validation.
pub fn plan_task(entry: TaskId) -> Result<Vec<TaskId>> {
    TaskGraph::standard()?.plan(entry)
}

/// Open the project and load what the planned tasks need.
///
/// The environment configuration is read only when one of `plan` needs
/// board parameters, so configuration-only tasks work on projects without
/// an `env-config.yaml`.
///
/// # Errors
///
/// Returns `FilesystemError` when the project cannot be opened and the
/// errors of [`EnvironmentConfig::load`].
pub fn prepare_context(settings: &BuildSettings, plan: &[TaskId]) -> Result<PipelineContext> {
    let context = PipelineContext::open(settings)?;
    if !plan.iter().any(|task| task.needs_environment()) {
        return Ok(context);
    }

    let environment = EnvironmentConfig::load(context.project(), &context.paths().env_config)?;
    tracing::debug!(
        board = %environment.board,
        port = %environment.port,
        "loaded board parameters"
    );
    Ok(context.with_environment(environment))
}

/// Run `entry` and its dependencies against the project in `settings`.
///
/// External tools are spawned through `runner`.
///
/// # Errors
///
/// Returns any error of [`prepare_context`], or the first task failure as
/// `TaskError::Failed`.
pub async fn run_task<R>(settings: &BuildSettings, entry: TaskId, runner: &R) -> Result<RunReport>
where
    R: CommandRunner + Sync + ?Sized,
{
    let graph = TaskGraph::standard()?;
    let plan = graph.plan(entry)?;
    let context = prepare_context(settings, &plan)?;
    let executor = PipelineExecutor::new(&context, runner);
    Scheduler::new(&graph, &executor).run(entry).await
}
