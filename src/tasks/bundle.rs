//! Board bundle production through the Espruino command-line tool.

use camino::Utf8Path;

use crate::config::{EnvironmentConfig, PathsConfig, ToolsConfig};
use crate::error::Result;
use crate::tool::ToolInvocation;

/// Build the bundling command.
///
/// The tool runs inside the output directory, reading the entry point and
/// writing the bundle by bare file name.
///
/// # Errors
///
/// Returns `ConfigError::MissingRequired` when the Espruino command is empty.
pub fn bundle_invocation(
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
            paths.main_file.clone(),
            String::from("-o"),
            paths.bundle_file.clone(),
        ],
        project_dir.join(&paths.dist_dir),
    )
}
