//! Runner settings types for espruino-build.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Locations of the project's inputs and outputs, relative to the project
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the TypeScript and plain JavaScript sources.
    pub src_dir: Utf8PathBuf,

    /// Directory receiving compiler output, copied sources and the bundle.
    pub dist_dir: Utf8PathBuf,

    /// YAML file with the board parameters (`board`, `port`, `port_speed`).
    pub env_config: Utf8PathBuf,

    /// Tracked base application configuration.
    pub app_config: Utf8PathBuf,

    /// Untracked per-user overrides of the application configuration.
    pub user_app_config: Utf8PathBuf,

    /// Generated module exporting the merged application configuration.
    /// Defaults to `app-config.ts` inside `src_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_module: Option<Utf8PathBuf>,

    /// Compiler project file.
    pub tsconfig: Utf8PathBuf,

    /// File name of the compiled entry point inside `dist_dir`.
    pub main_file: String,

    /// File name of the board-ready bundle inside `dist_dir`.
    pub bundle_file: String,

    /// File name watched by the live console inside `dist_dir`.
    pub watch_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src_dir: Utf8PathBuf::from("src"),
            dist_dir: Utf8PathBuf::from("dist"),
            env_config: Utf8PathBuf::from("env-config.yaml"),
            app_config: Utf8PathBuf::from("app-config.yaml"),
            user_app_config: Utf8PathBuf::from("app-config.user.yaml"),
            generated_module: None,
            tsconfig: Utf8PathBuf::from("tsconfig.json"),
            main_file: String::from("app.js"),
            bundle_file: String::from("bundle.js"),
            watch_file: String::from("esp-console-input.js"),
        }
    }
}

impl PathsConfig {
    /// Path of the generated configuration module, relative to the project
    /// directory.
    #[must_use]
    pub fn generated_module_path(&self) -> Utf8PathBuf {
        self.generated_module
            .clone()
            .unwrap_or_else(|| self.src_dir.join("app-config.ts"))
    }

    /// Path of the compiled entry point, relative to the project directory.
    #[must_use]
    pub fn main_path(&self) -> Utf8PathBuf {
        self.dist_dir.join(&self.main_file)
    }

    /// Path of the bundle, relative to the project directory.
    #[must_use]
    pub fn bundle_path(&self) -> Utf8PathBuf {
        self.dist_dir.join(&self.bundle_file)
    }

    /// Path of the watched console file, relative to the project directory.
    #[must_use]
    pub fn watch_path(&self) -> Utf8PathBuf {
        self.dist_dir.join(&self.watch_file)
    }

    /// Validates that every location stays inside the project directory.
    ///
    /// Project files are reached through a capability handle on the project
    /// directory, which cannot follow absolute paths or `..` components. The
    /// three output names must be bare file names inside `dist_dir`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let generated_module = self.generated_module_path();
        let relative_fields: [(&str, &Utf8Path); 7] = [
            ("paths.src_dir", &self.src_dir),
            ("paths.dist_dir", &self.dist_dir),
            ("paths.env_config", &self.env_config),
            ("paths.app_config", &self.app_config),
            ("paths.user_app_config", &self.user_app_config),
            ("paths.generated_module", &generated_module),
            ("paths.tsconfig", &self.tsconfig),
        ];
        for (field, path) in relative_fields {
            validate_project_relative(field, path)?;
        }

        let file_names: [(&str, &str); 3] = [
            ("paths.main_file", &self.main_file),
            ("paths.bundle_file", &self.bundle_file),
            ("paths.watch_file", &self.watch_file),
        ];
        for (field, name) in file_names {
            validate_bare_file_name(field, name)?;
        }
        Ok(())
    }
}

fn validate_project_relative(field: &str, path: &Utf8Path) -> Result<()> {
    if path.as_str().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    for component in path.components() {
        match component {
            Utf8Component::Normal(_) | Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                return Err(invalid(field, "must not leave the project directory"));
            }
            Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                return Err(invalid(field, "must be relative to the project directory"));
            }
        }
    }
    Ok(())
}

fn validate_bare_file_name(field: &str, name: &str) -> Result<()> {
    let mut components = Utf8Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Utf8Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid(field, "must be a plain file name")),
    }
}

fn invalid(field: &str, reason: &str) -> crate::error::BuildError {
    ConfigError::InvalidValue {
        field: String::from(field),
        reason: String::from(reason),
    }
    .into()
}

/// External tool commands and how their exit status is treated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Command prefix for the TypeScript compiler.
    pub compiler: Vec<String>,

    /// Command prefix for the Espruino command-line tool.
    pub espruino: Vec<String>,

    /// Log non-zero Espruino tool exits as warnings instead of failing the
    /// task. Compiler failures always fail.
    pub allow_tool_failure: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            compiler: vec![String::from("npx"), String::from("tsc")],
            espruino: vec![String::from("npx"), String::from("espruino")],
            allow_tool_failure: false,
        }
    }
}

impl ToolsConfig {
    /// Validates that both command prefixes name a program.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` listing the empty commands.
    pub fn validate(&self) -> Result<()> {
        let is_blank = |command: &[String]| command.first().is_none_or(|program| program.trim().is_empty());
        let mut missing = Vec::new();
        if is_blank(&self.compiler) {
            missing.push("tools.compiler");
        }
        if is_blank(&self.espruino) {
            missing.push("tools.espruino");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: missing.join(", "),
            }
            .into());
        }
        Ok(())
    }
}

/// Root runner settings.
///
/// Loaded from defaults, a TOML settings file, environment variables and
/// command-line arguments with layered precedence (lowest to highest in that
/// order).
///
/// Settings files are discovered in this order:
/// 1. Path given by `--config`, when it exists
/// 2. Path specified via the `ESPRUINO_BUILD_CONFIG_PATH` environment variable
/// 3. `.espruino-build.toml` in the current working directory
/// 4. `.espruino-build.toml` in the home directory
/// 5. `~/.config/espruino-build/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "ESPRUINO_BUILD",
    discovery(
        app_name = "espruino-build",
        env_var = "ESPRUINO_BUILD_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".espruino-build.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct BuildSettings {
    /// Root of the Espruino project. Defaults to the current directory.
    pub project_dir: Option<Utf8PathBuf>,

    /// Project file layout.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub paths: PathsConfig,

    /// External tool commands.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub tools: ToolsConfig,
}

impl BuildSettings {
    /// Return the project directory, falling back to the current directory.
    #[must_use]
    pub fn project_dir(&self) -> &Utf8Path {
        self.project_dir
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new("."))
    }

    /// Validates the merged settings.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` reported by the `paths` or `tools`
    /// sections.
    pub fn validate(&self) -> Result<()> {
        self.paths.validate()?;
        self.tools.validate()
    }
}
