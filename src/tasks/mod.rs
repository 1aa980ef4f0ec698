//! Task bodies of the build pipeline.
//!
//! [`PipelineExecutor`] maps every [`TaskId`] to its action. File work (the
//! configuration merge, the static copy, the strip and the console relay)
//! runs on blocking worker threads against a capability handle on the
//! project directory; external tools go through a [`CommandRunner`].

pub mod bundle;
pub mod compile;
pub mod console;
pub mod copy;
pub mod strip;


use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::info;

use crate::app_config::generate_config_module;
use crate::config::{BuildSettings, EnvironmentConfig, PathsConfig, ToolsConfig};
use crate::error::{ConfigError, FilesystemError, Result, TaskError};
use crate::graph::{TaskExecutor, TaskFuture, TaskId};
use crate::tool::{CommandRunner, ExitPolicy, run_tool};

/// Everything a task body needs to know about the project.
#[derive(Debug)]
pub struct PipelineContext {
    project_dir: Utf8PathBuf,
    project: Arc<Dir>,
    paths: PathsConfig,
    tools: ToolsConfig,
    environment: Option<EnvironmentConfig>,
}

impl PipelineContext {
    /// Open the project directory named by `settings`.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError` when the project directory cannot be opened.
    pub fn open(settings: &BuildSettings) -> Result<Self> {
        let project_dir = settings.project_dir();
        let project = Dir::open_ambient_dir(project_dir, ambient_authority())
            .map_err(|e| FilesystemError::from_io(project_dir, &e))?;
        Ok(Self::new(
            project_dir,
            project,
            settings.paths.clone(),
            settings.tools.clone(),
        ))
    }

    /// Assemble a context from an already opened project directory.
    #[must_use]
    pub fn new(
        project_dir: impl Into<Utf8PathBuf>,
        project: Dir,
        paths: PathsConfig,
        tools: ToolsConfig,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            project: Arc::new(project),
            paths,
            tools,
            environment: None,
        }
    }

    /// Attach the board parameters.
    #[must_use]
    pub fn with_environment(mut self, environment: EnvironmentConfig) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Return the project directory as given in the settings.
    #[must_use]
    pub fn project_dir(&self) -> &Utf8Path {
        &self.project_dir
    }

    /// Return the capability handle on the project directory.
    #[must_use]
    pub fn project(&self) -> &Dir {
        &self.project
    }

    /// Return the project file layout.
    #[must_use]
    pub const fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    /// Return the board parameters.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when no environment
    /// configuration was loaded.
    pub fn environment(&self) -> Result<&EnvironmentConfig> {
        self.environment.as_ref().ok_or_else(|| {
            ConfigError::MissingRequired {
                field: format!("environment configuration ({})", self.paths.env_config),
            }
            .into()
        })
    }

    /// Return how exit codes of the Espruino tool are treated.
    #[must_use]
    pub const fn exit_policy(&self) -> ExitPolicy {
        ExitPolicy::from_allow_failure(self.tools.allow_tool_failure)
    }
}

/// Runs task bodies against a project.
pub struct PipelineExecutor<'a, R: ?Sized> {
    context: &'a PipelineContext,
    runner: &'a R,
}

impl<'a, R: CommandRunner + Sync + ?Sized> PipelineExecutor<'a, R> {
    /// Create an executor that spawns tools through `runner`.
    #[must_use]
    pub const fn new(context: &'a PipelineContext, runner: &'a R) -> Self {
        Self { context, runner }
    }

    /// Run `body` on a blocking worker thread with the project handle and
    /// file layout.
    async fn blocking<F>(&self, task: TaskId, body: F) -> Result<()>
    where
        F: FnOnce(&Dir, &PathsConfig) -> Result<()> + Send + 'static,
    {
        let project = Arc::clone(&self.context.project);
        let paths = self.context.paths.clone();
        tokio::task::spawn_blocking(move || body(&project, &paths))
            .await
            .map_err(|e| TaskError::Interrupted {
                task,
                message: e.to_string(),
            })?
    }

    async fn compile(&self) -> Result<()> {
        let invocation = compile::compiler_invocation(
            &self.context.tools,
            &self.context.paths,
            &self.context.project_dir,
        )?;
        // Compile errors always abort the run, whatever the exit policy says.
        run_tool(self.runner, &invocation, ExitPolicy::Strict).await?;
        Ok(())
    }

    async fn prepare_for_espruino(&self) -> Result<()> {
        let environment = self.context.environment()?;

        self.blocking(TaskId::PrepareForEspruino, |project, paths| {
            strip::strip_main_file(project, &paths.main_path()).map(|_| ())
        })
        .await?;

        let invocation = bundle::bundle_invocation(
            &self.context.tools,
            &self.context.paths,
            environment,
            &self.context.project_dir,
        )?;
        run_tool(self.runner, &invocation, self.context.exit_policy()).await?;
        info!(bundle = %self.context.paths.bundle_path(), "bundle ready");
        Ok(())
    }

    async fn console_session(&self) -> Result<()> {
        let environment = self.context.environment()?;
        let invocation = console::console_invocation(
            &self.context.tools,
            &self.context.paths,
            environment,
            &self.context.project_dir,
        )?;
        run_tool(self.runner, &invocation, self.context.exit_policy()).await?;
        Ok(())
    }
}

impl<R: CommandRunner + Sync + ?Sized> TaskExecutor for PipelineExecutor<'_, R> {
    fn execute(&self, task: TaskId) -> TaskFuture<'_> {
        Box::pin(async move {
            match task {
                TaskId::Build => Ok(()),
                TaskId::PrepareForEspruino => self.prepare_for_espruino().await,
                TaskId::CompileTs => self.compile().await,
                TaskId::ContentToDist => {
                    self.blocking(task, |project, paths| {
                        let copied =
                            copy::copy_js_sources(project, &paths.src_dir, &paths.dist_dir)?;
                        info!(files = copied.len(), dist = %paths.dist_dir, "copied JavaScript sources");
                        Ok(())
                    })
                    .await
                }
                TaskId::GenConfigTs => {
                    self.blocking(task, |project, paths| {
                        generate_config_module(project, paths).map(|_| ())
                    })
                    .await
                }
                TaskId::SendToEspurinoConsole => {
                    self.blocking(task, |project, paths| {
                        console::send_bundle(project, paths).map(|_| ())
                    })
                    .await
                }
                TaskId::ClearEspurinoWatchFile => {
                    self.blocking(task, console::clear_watch_file).await
                }
                TaskId::EspruinoConsole => self.console_session().await,
            }
        })
    }
}
