//! External tool invocation behind a small trait seam.
//!
//! The compiler and the Espruino command-line tool are only ever reached
//! through [`CommandRunner`], so task bodies can be unit-tested without
//! spawning processes. [`SystemCommandRunner`] is the real implementation on
//! top of `tokio::process`; children are spawned with `kill_on_drop` so a run
//! halted by a failing sibling does not leak them.

use std::future::Future;
use std::io;
use std::pin::Pin;

use camino::{Utf8Path, Utf8PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{ConfigError, Result, ToolError};

/// Boxed future type returned by [`CommandRunner::run`].
pub type RunToolFuture<'a> = Pin<Box<dyn Future<Output = io::Result<ToolExit>> + Send + 'a>>;

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    program: String,
    args: Vec<String>,
    working_dir: Utf8PathBuf,
}

impl ToolInvocation {
    /// Build an invocation from a configured command prefix and the
    /// task-specific arguments.
    ///
    /// The first element of `command` is the program; any remaining elements
    /// are passed before `args`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when `command` is empty or its
    /// program is blank.
    pub fn from_command(
        command: &[String],
        args: impl IntoIterator<Item = String>,
        working_dir: impl Into<Utf8PathBuf>,
    ) -> Result<Self> {
        let (program, prefix) = command
            .split_first()
            .filter(|(program, _)| !program.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: String::from("tools command"),
            })?;

        Ok(Self {
            program: program.clone(),
            args: prefix.iter().cloned().chain(args).collect(),
            working_dir: working_dir.into(),
        })
    }

    /// Return the program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Return the arguments passed to the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Return the directory the program runs in.
    #[must_use]
    pub fn working_dir(&self) -> &Utf8Path {
        &self.working_dir
    }

    /// Render the command line for logs and dry runs.
    #[must_use]
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status reported by a finished tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolExit {
    code: Option<i32>,
}

impl ToolExit {
    /// Create an exit status. `None` means the process was terminated by a
    /// signal.
    #[must_use]
    pub const fn new(code: Option<i32>) -> Self {
        Self { code }
    }

    /// A successful exit.
    #[must_use]
    pub const fn success() -> Self {
        Self { code: Some(0) }
    }

    /// Return the exit code, if the process reported one.
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        self.code
    }

    /// Return whether the process exited with code zero.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Behaviour required to run an external tool to completion.
///
/// This abstraction keeps task bodies testable without spawning processes.
pub trait CommandRunner {
    /// Spawn the invocation with inherited terminal streams and wait for it
    /// to exit.
    fn run(&self, invocation: &ToolInvocation) -> RunToolFuture<'_>;
}

/// Runs tools as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, invocation: &ToolInvocation) -> RunToolFuture<'_> {
        let owned = invocation.clone();
        Box::pin(async move {
            let status = Command::new(&owned.program)
                .args(&owned.args)
                .current_dir(owned.working_dir.as_std_path())
                .kill_on_drop(true)
                .status()
                .await?;
            Ok(ToolExit::new(status.code()))
        })
    }
}

/// How a non-zero exit status is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// A non-zero exit or a signal termination is an error.
    #[default]
    Strict,
    /// The status is logged as a warning and the step succeeds.
    Lenient,
}

impl ExitPolicy {
    /// Select the policy from the `allow_tool_failure` setting.
    #[must_use]
    pub const fn from_allow_failure(allow_tool_failure: bool) -> Self {
        if allow_tool_failure {
            Self::Lenient
        } else {
            Self::Strict
        }
    }
}

/// Run `invocation` through `runner` and check its exit status against
/// `policy`.
///
/// # Errors
///
/// Returns `ToolError::SpawnFailed` when the process cannot be started. In
/// strict mode also returns `ToolError::NonZeroExit` or
/// `ToolError::Terminated` for an unsuccessful exit.
pub async fn run_tool<R: CommandRunner + ?Sized>(
    runner: &R,
    invocation: &ToolInvocation,
    policy: ExitPolicy,
) -> Result<ToolExit> {
    info!(
        command = %invocation.display_command(),
        cwd = %invocation.working_dir(),
        "running tool"
    );

    let exit = runner
        .run(invocation)
        .await
        .map_err(|error| ToolError::SpawnFailed {
            program: invocation.program.clone(),
            message: error.to_string(),
        })?;

    if exit.is_success() {
        return Ok(exit);
    }

    let failure = exit.code().map_or_else(
        || ToolError::Terminated {
            program: invocation.program.clone(),
        },
        |code| ToolError::NonZeroExit {
            program: invocation.program.clone(),
            code,
        },
    );

    match policy {
        ExitPolicy::Strict => Err(failure.into()),
        ExitPolicy::Lenient => {
            warn!(error = %failure, "tool failed; continuing because tool failures are allowed");
            Ok(exit)
        }
    }
}
