//! The fixed task graph of the build pipeline.
//!
//! Tasks are hand-declared nodes with explicit dependency edges. The graph is
//! validated once at construction (no duplicate nodes, no undeclared
//! dependencies, no cycles) and is immutable afterwards. [`Scheduler`] walks
//! the dependency closure of a selected entry task.
//!
//! ```text
//! build ──> prepare-for-espruino ──┬──> compile-ts ──> gen-config-ts
//!                                  └──> content-to-dist
//! espruino-console ──> clear-espurino-watch-file
//! send-to-espurino-console
//! ```

mod scheduler;


use std::fmt;

use clap::ValueEnum;

use crate::error::{Result, TaskError};

pub use scheduler::{RunReport, Scheduler, TaskExecutor, TaskFuture};

/// Names of the tasks the runner knows about.
///
/// The kebab-case names are the CLI surface; the `espurino` spelling is kept
/// for compatibility with existing project scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum TaskId {
    /// Full build: everything needed to produce the board-ready bundle.
    #[value(name = "build")]
    Build,
    /// Strip the module marker from the entry point and bundle it.
    #[value(name = "prepare-for-espruino")]
    PrepareForEspruino,
    /// Compile the TypeScript sources.
    #[value(name = "compile-ts")]
    CompileTs,
    /// Copy plain JavaScript sources to the output directory.
    #[value(name = "content-to-dist")]
    ContentToDist,
    /// Merge the application configuration into a generated module.
    #[value(name = "gen-config-ts")]
    GenConfigTs,
    /// Relay the bundle to the live console through the watched file.
    #[value(name = "send-to-espurino-console")]
    SendToEspurinoConsole,
    /// Truncate the watched file.
    #[value(name = "clear-espurino-watch-file")]
    ClearEspurinoWatchFile,
    /// Start an interactive console session against the board.
    #[value(name = "espruino-console")]
    EspruinoConsole,
}

impl TaskId {
    /// Every task, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Build,
        Self::PrepareForEspruino,
        Self::CompileTs,
        Self::ContentToDist,
        Self::GenConfigTs,
        Self::SendToEspurinoConsole,
        Self::ClearEspurinoWatchFile,
        Self::EspruinoConsole,
    ];

    /// Return the CLI name of the task.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::PrepareForEspruino => "prepare-for-espruino",
            Self::CompileTs => "compile-ts",
            Self::ContentToDist => "content-to-dist",
            Self::GenConfigTs => "gen-config-ts",
            Self::SendToEspurinoConsole => "send-to-espurino-console",
            Self::ClearEspurinoWatchFile => "clear-espurino-watch-file",
            Self::EspruinoConsole => "espruino-console",
        }
    }

    /// Whether the task body needs the board parameters from the environment
    /// configuration file.
    #[must_use]
    pub const fn needs_environment(self) -> bool {
        matches!(self, Self::PrepareForEspruino | Self::EspruinoConsole)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the task graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    id: TaskId,
    dependencies: Vec<TaskId>,
    concurrent: bool,
}

impl TaskNode {
    /// Declare a task that runs alone.
    #[must_use]
    pub fn new(id: TaskId, dependencies: &[TaskId]) -> Self {
        Self {
            id,
            dependencies: dependencies.to_vec(),
            concurrent: false,
        }
    }

    /// Mark the task as touching a file set disjoint from every other
    /// concurrent task, so it may run alongside them.
    #[must_use]
    pub const fn concurrent(mut self) -> Self {
        self.concurrent = true;
        self
    }

    /// Return the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Return the tasks that must complete before this one starts.
    #[must_use]
    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    /// Return whether the task may overlap with other concurrent tasks.
    #[must_use]
    pub const fn is_concurrent(&self) -> bool {
        self.concurrent
    }
}

/// A validated directed acyclic graph of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGraph {
    nodes: Vec<TaskNode>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl TaskGraph {
    /// Build and validate a graph from its nodes.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Duplicate` when a task is declared twice,
    /// `TaskError::UnknownDependency` when an edge names an undeclared task,
    /// and `TaskError::Cycle` when the edges are not acyclic.
    pub fn new(nodes: Vec<TaskNode>) -> Result<Self> {
        for (position, node) in nodes.iter().enumerate() {
            if nodes
                .iter()
                .skip(position.saturating_add(1))
                .any(|other| other.id == node.id)
            {
                return Err(TaskError::Duplicate { task: node.id }.into());
            }
        }

        for node in &nodes {
            if let Some(&dependency) = node
                .dependencies
                .iter()
                .find(|dependency| !nodes.iter().any(|other| other.id == **dependency))
            {
                return Err(TaskError::UnknownDependency {
                    task: node.id,
                    dependency,
                }
                .into());
            }
        }

        let graph = Self { nodes };
        for node in &graph.nodes {
            graph.plan(node.id)?;
        }
        Ok(graph)
    }

    /// The project's task table.
    ///
    /// `gen-config-ts`, `compile-ts` and `content-to-dist` touch disjoint file
    /// sets (the generated module, the compiler outputs and the plain `.js`
    /// sources), so they are declared concurrent.
    ///
    /// # Errors
    ///
    /// Fails only if the table itself is inconsistent.
    pub fn standard() -> Result<Self> {
        Self::new(vec![
            TaskNode::new(TaskId::Build, &[TaskId::PrepareForEspruino]),
            TaskNode::new(
                TaskId::PrepareForEspruino,
                &[TaskId::CompileTs, TaskId::ContentToDist],
            ),
            TaskNode::new(TaskId::CompileTs, &[TaskId::GenConfigTs]).concurrent(),
            TaskNode::new(TaskId::ContentToDist, &[]).concurrent(),
            TaskNode::new(TaskId::GenConfigTs, &[]).concurrent(),
            TaskNode::new(TaskId::SendToEspurinoConsole, &[]),
            TaskNode::new(TaskId::ClearEspurinoWatchFile, &[]),
            TaskNode::new(TaskId::EspruinoConsole, &[TaskId::ClearEspurinoWatchFile]),
        ])
    }

    /// Return the declared nodes in declaration order.
    #[must_use]
    pub fn nodes(&self) -> &[TaskNode] {
        &self.nodes
    }

    /// Look up a node by identifier.
    #[must_use]
    pub fn node(&self, id: TaskId) -> Option<&TaskNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Return the dependency closure of `entry` in topological order.
    ///
    /// Dependencies are visited in declaration order, so the plan is
    /// deterministic; `entry` is always last.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::UnknownTask` when `entry` is not declared and
    /// `TaskError::Cycle` when a cycle is reachable from it.
    pub fn plan(&self, entry: TaskId) -> Result<Vec<TaskId>> {
        if self.node(entry).is_none() {
            return Err(TaskError::UnknownTask { task: entry }.into());
        }

        let mut marks = [Mark::Unvisited; TaskId::ALL.len()];
        let mut order = Vec::new();
        self.visit(entry, &mut marks, &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        id: TaskId,
        marks: &mut [Mark; TaskId::ALL.len()],
        order: &mut Vec<TaskId>,
    ) -> Result<()> {
        let slot = id as usize;
        match marks.get(slot).copied() {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => return Err(TaskError::Cycle { task: id }.into()),
            _ => {}
        }
        if let Some(mark) = marks.get_mut(slot) {
            *mark = Mark::InProgress;
        }

        let node = self.node(id).ok_or(TaskError::UnknownTask { task: id })?;
        for &dependency in &node.dependencies {
            self.visit(dependency, marks, order)?;
        }

        if let Some(mark) = marks.get_mut(slot) {
            *mark = Mark::Done;
        }
        order.push(id);
        Ok(())
    }
}
