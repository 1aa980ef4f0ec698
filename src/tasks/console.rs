//! Console relay: the watched file and the live console session.
//!
//! The Espruino tool, started in watch mode, uploads the watched file to the
//! board whenever it changes. Writing the bundle into that file pushes the
//! program to the running console; truncating it resets the session input.

use camino::Utf8Path;
use cap_std::fs_utf8::Dir;
use tracing::info;

use crate::config::{EnvironmentConfig, PathsConfig, ToolsConfig};
use crate::error::{ArtifactError, FilesystemError, Result};
use crate::tool::ToolInvocation;

/// Truncate the watched file, creating it and the output directory if
/// needed.
///
/// # Errors
///
/// Returns `FilesystemError` when the directory or file cannot be written.
pub fn clear_watch_file(project: &Dir, paths: &PathsConfig) -> Result<()> {
    project
        .create_dir_all(&paths.dist_dir)
        .map_err(|e| FilesystemError::from_io(paths.dist_dir.as_path(), &e))?;
    let watch_path = paths.watch_path();
    project
        .write(&watch_path, "")
        .map_err(|e| FilesystemError::from_io(watch_path.as_path(), &e))?;
    info!(path = %watch_path, "cleared console watch file");
    Ok(())
}

/// Copy the bundle bytes into the watched file.
///
/// # Errors
///
/// Returns `ArtifactError::BundleMissing` when no bundle has been built, and
/// `FilesystemError` when either file cannot be read or written.
pub fn send_bundle(project: &Dir, paths: &PathsConfig) -> Result<usize> {
    let bundle_path = paths.bundle_path();
    if !project.exists(&bundle_path) {
        return Err(ArtifactError::BundleMissing { path: bundle_path }.into());
    }

    let bundle = project
        .read(&bundle_path)
        .map_err(|e| FilesystemError::from_io(bundle_path.as_path(), &e))?;
    let watch_path = paths.watch_path();
    project
        .write(&watch_path, &bundle)
        .map_err(|e| FilesystemError::from_io(watch_path.as_path(), &e))?;
    info!(path = %watch_path, bytes = bundle.len(), "sent bundle to console");
    Ok(bundle.len())
}

/// Build the long-running console command.
///
/// The tool runs inside the output directory and watches the console file
/// by bare name.
///
/// # Errors
///
/// Returns `ConfigError::MissingRequired` when the Espruino command is empty.
pub fn console_invocation(
    tools: &ToolsConfig,
    paths: &PathsConfig,
    environment: &EnvironmentConfig,
    project_dir: &Utf8Path,
) -> Result<ToolInvocation> {
    ToolInvocation::from_command(
        &tools.espruino,
        [
            String::from("--board"),
            environment.board.clone(),
            String::from("-b"),
            environment.port_speed.to_string(),
            String::from("--port"),
            environment.port.clone(),
            String::from("-w"),
            paths.watch_file.clone(),
        ],
        project_dir.join(&paths.dist_dir),
    )
}
