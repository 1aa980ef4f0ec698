//! Semantic error types for espruino-build.
//!
//! Library code returns the semantic enums defined here (via `thiserror`) so
//! callers can tell a malformed configuration file from a missing build
//! artefact or a failing external tool. The binary converts them into
//! `eyre::Report` at the process boundary.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::graph::TaskId;

/// Errors raised while loading runner settings or project configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: Utf8PathBuf,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error, including the offending path.
        message: String,
    },

    /// A YAML document parsed, but its root is not a key-value mapping.
    #[error("expected a mapping at the root of {path}")]
    NotAMapping {
        /// The offending file.
        path: Utf8PathBuf,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging settings layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised when an expected build artefact is absent.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The compiled entry point was not produced.
    #[error("main app file does not exist: {path}")]
    MainFileMissing {
        /// The expected location of the entry point.
        path: Utf8PathBuf,
    },

    /// The board-ready bundle has not been built yet.
    #[error("bundle file does not exist: {path}")]
    BundleMissing {
        /// The expected location of the bundle.
        path: Utf8PathBuf,
    },
}

/// Errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// A file or directory was not found.
    #[error("path not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: Utf8PathBuf,
    },

    /// Permission denied when accessing a path.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be accessed.
        path: Utf8PathBuf,
    },

    /// An I/O error occurred.
    #[error("I/O error at '{path}': {message}")]
    IoError {
        /// The path where the error occurred.
        path: Utf8PathBuf,
        /// A description of the I/O error.
        message: String,
    },
}

impl FilesystemError {
    /// Classify an I/O error raised while touching `path`.
    #[must_use]
    pub fn from_io(path: impl Into<Utf8PathBuf>, error: &io::Error) -> Self {
        let path_buf = path.into();
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path: path_buf },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path: path_buf },
            _ => Self::IoError {
                path: path_buf,
                message: error.to_string(),
            },
        }
    }
}

/// Errors raised by external tool invocations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The process could not be started at all.
    #[error("failed to start '{program}': {message}")]
    SpawnFailed {
        /// The program that failed to start.
        program: String,
        /// A description of the spawn failure.
        message: String,
    },

    /// The process ran to completion with a non-zero exit code.
    #[error("'{program}' exited with code {code}")]
    NonZeroExit {
        /// The program that failed.
        program: String,
        /// The exit code it reported.
        code: i32,
    },

    /// The process was terminated by a signal before reporting an exit code.
    #[error("'{program}' was terminated before it could exit")]
    Terminated {
        /// The program that was terminated.
        program: String,
    },
}

/// Errors raised by the task graph and its scheduler.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A task declares a dependency that is not part of the graph.
    #[error("task '{task}' depends on undeclared task '{dependency}'")]
    UnknownDependency {
        /// The declaring task.
        task: TaskId,
        /// The undeclared dependency.
        dependency: TaskId,
    },

    /// The dependency edges contain a cycle through `task`.
    #[error("dependency cycle detected at task '{task}'")]
    Cycle {
        /// A task on the cycle.
        task: TaskId,
    },

    /// The requested task is not part of the graph.
    #[error("unknown task '{task}'")]
    UnknownTask {
        /// The requested task.
        task: TaskId,
    },

    /// A task was declared twice.
    #[error("task '{task}' is declared more than once")]
    Duplicate {
        /// The repeated task.
        task: TaskId,
    },

    /// A task body returned an error; the run was halted.
    #[error("task '{task}' failed: {source}")]
    Failed {
        /// The failing task.
        task: TaskId,
        /// The underlying failure.
        source: Box<BuildError>,
    },

    /// A task's worker thread panicked or was cancelled.
    #[error("task '{task}' was interrupted: {message}")]
    Interrupted {
        /// The interrupted task.
        task: TaskId,
        /// A description of the interruption.
        message: String,
    },
}

/// Top-level error type for espruino-build.
///
/// Aggregates all domain-specific errors into a single type. At the binary
/// boundary these errors are converted to `eyre::Report`.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An error occurred while loading configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An expected artefact was missing.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// An error occurred during filesystem operations.
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// An external tool failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The task graph rejected the run or a task failed.
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// A specialised `Result` type for espruino-build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
