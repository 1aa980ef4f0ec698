//! Dependency-ordered execution of a task graph.
//!
//! The scheduler runs on the caller's task: ready tasks are polled together
//! through a `FuturesUnordered` set, so concurrent tasks overlap whenever one
//! of them is waiting on a child process or a blocking worker. The first
//! failure drops every in-flight future and ends the run.

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error, info};

use super::{TaskGraph, TaskId};
use crate::error::{Result, TaskError};

/// Boxed future type returned by [`TaskExecutor::execute`].
pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

type InFlight<'a> = Pin<Box<dyn Future<Output = (TaskId, Result<()>)> + Send + 'a>>;

/// Behaviour required to run the body of a single task.
///
/// This abstraction keeps scheduling testable without touching the
/// filesystem or spawning external tools.
pub trait TaskExecutor {
    /// Run the body of `task`. Dependencies have already completed.
    fn execute(&self, task: TaskId) -> TaskFuture<'_>;
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    entry: TaskId,
    completed: Vec<TaskId>,
}

impl RunReport {
    /// Return the task the run was started from.
    #[must_use]
    pub const fn entry(&self) -> TaskId {
        self.entry
    }

    /// Return the tasks in the order they completed.
    #[must_use]
    pub fn completed(&self) -> &[TaskId] {
        &self.completed
    }
}

/// Runs the dependency closure of an entry task.
pub struct Scheduler<'a, E> {
    graph: &'a TaskGraph,
    executor: &'a E,
}

impl<'a, E: TaskExecutor> Scheduler<'a, E> {
    /// Create a scheduler over `graph` that delegates task bodies to `executor`.
    #[must_use]
    pub const fn new(graph: &'a TaskGraph, executor: &'a E) -> Self {
        Self { graph, executor }
    }

    /// Execute `entry` and everything it depends on.
    ///
    /// Each task runs exactly once. A task starts only after all of its
    /// dependencies completed; concurrent tasks may overlap with each other,
    /// every other task runs alone.
    ///
    /// # Errors
    ///
    /// Returns the graph's planning errors, or `TaskError::Failed` naming the
    /// first task whose body failed. No task starts after a failure.
    pub async fn run(&self, entry: TaskId) -> Result<RunReport> {
        let mut pending = self.graph.plan(entry)?;
        let mut completed = Vec::with_capacity(pending.len());
        let mut running: Vec<TaskId> = Vec::new();
        let mut in_flight: FuturesUnordered<InFlight<'_>> = FuturesUnordered::new();

        info!(entry = %entry, tasks = pending.len(), "starting run");

        loop {
            for task in self.admit(&pending, &completed, &running) {
                debug!(task = %task, "starting task");
                pending.retain(|candidate| *candidate != task);
                running.push(task);
                in_flight.push(self.launch(task));
            }

            let Some((task, outcome)) = in_flight.next().await else {
                break;
            };
            running.retain(|candidate| *candidate != task);

            if let Err(source) = outcome {
                error!(task = %task, error = %source, "task failed; halting run");
                return Err(TaskError::Failed {
                    task,
                    source: Box::new(source),
                }
                .into());
            }
            info!(task = %task, "finished task");
            completed.push(task);
        }

        if let Some(&stalled) = pending.first() {
            return Err(TaskError::Cycle { task: stalled }.into());
        }

        Ok(RunReport { entry, completed })
    }

    fn launch(&self, task: TaskId) -> InFlight<'a> {
        let body = self.executor.execute(task);
        Box::pin(async move { (task, body.await) })
    }

    /// Select the pending tasks that may start now.
    ///
    /// A task is ready when its dependencies completed. A ready task that is
    /// not concurrent starts only when nothing else is running; concurrent
    /// tasks start together as long as everything running is concurrent too.
    fn admit(&self, pending: &[TaskId], completed: &[TaskId], running: &[TaskId]) -> Vec<TaskId> {
        let is_concurrent = |task: TaskId| {
            self.graph
                .node(task)
                .is_some_and(super::TaskNode::is_concurrent)
        };

        let mut admitted: Vec<TaskId> = Vec::new();
        for &task in pending {
            let ready = self.graph.node(task).is_some_and(|node| {
                node.dependencies()
                    .iter()
                    .all(|dependency| completed.contains(dependency))
            });
            if !ready {
                continue;
            }

            let idle = running.is_empty() && admitted.is_empty();
            let shareable = is_concurrent(task)
                && running
                    .iter()
                    .chain(admitted.iter())
                    .all(|other| is_concurrent(*other));
            if idle || shareable {
                admitted.push(task);
                if !is_concurrent(task) {
                    break;
                }
            }
        }
        admitted
    }
}
