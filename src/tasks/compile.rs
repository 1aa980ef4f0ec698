//! TypeScript compiler invocation.

use camino::Utf8Path;

use crate::config::{PathsConfig, ToolsConfig};
use crate::error::Result;
use crate::tool::ToolInvocation;

/// Build the compiler command for the project.
///
/// The compiler runs in the project directory with
/// `--project <tsconfig> --outDir <dist>`.
///
/// # Errors
///
/// Returns `ConfigError::MissingRequired` when the compiler command is empty.
pub fn compiler_invocation(
    tools: &ToolsConfig,
    paths: &PathsConfig,
    project_dir: &Utf8Path,
) -> Result<ToolInvocation> {
    ToolInvocation::from_command(
        &tools.compiler,
        [
            String::from("--project"),
            paths.tsconfig.to_string(),
            String::from("--outDir"),
            paths.dist_dir.to_string(),
        ],
        project_dir,
    )
}
