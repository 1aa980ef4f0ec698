//! Settings loading with layered precedence.
//!
//! This module loads [`BuildSettings`] with the precedence order (lowest to
//! highest): application defaults, settings file, environment variables,
//! command-line arguments.
//!
//! The layers are composed manually with `MergeComposer` rather than through
//! the derived `load()`, because the task selection and the `--list` and
//! `--dry-run` switches belong to [`Cli`], not to the settings struct, and
//! because typed environment variables must fail fast. Figment's environment
//! layer silently ignores unparseable values.
//!
//! # Environment Variable Handling
//!
//! String fields (e.g. `ESPRUINO_BUILD_DIST_DIR`) are always accepted.
//! `ESPRUINO_BUILD_ALLOW_TOOL_FAILURE` must be `true` or `false`. Command
//! variables (`ESPRUINO_BUILD_COMPILER`, `ESPRUINO_BUILD_ESPRUINO`) are split
//! on whitespace into a command prefix.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};
use tracing::debug;

use crate::config::{BuildSettings, Cli};
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Boolean value (`true`/`false`). Invalid values return an error.
    Bool,
    /// Whitespace-separated command line, stored as an array of words.
    Command,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g. `ESPRUINO_BUILD_DIST_DIR`).
    env_var: &'static str,
    /// The JSON path segments (e.g. `["paths", "dist_dir"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "ESPRUINO_BUILD_PROJECT_DIR",
        path: &["project_dir"],
        var_type: EnvVarType::String,
    },
    // Paths
    EnvVarSpec {
        env_var: "ESPRUINO_BUILD_SRC_DIR",
        path: &["paths", "src_dir"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "ESPRUINO_BUILD_DIST_DIR",
        path: &["paths", "dist_dir"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "ESPRUINO_BUILD_ENV_CONFIG",
        path: &["paths", "env_config"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "ESPRUINO_BUILD_APP_CONFIG",
        path: &["paths", "app_config"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "ESPRUINO_BUILD_USER_APP_CONFIG",
        path: &["paths", "user_app_config"],
        var_type: EnvVarType::String,
    },
    // Tools
    EnvVarSpec {
        env_var: "ESPRUINO_BUILD_COMPILER",
        path: &["tools", "compiler"],
        var_type: EnvVarType::Command,
    },
    EnvVarSpec {
        env_var: "ESPRUINO_BUILD_ESPRUINO",
        path: &["tools", "espruino"],
        var_type: EnvVarType::Command,
    },
    EnvVarSpec {
        env_var: "ESPRUINO_BUILD_ALLOW_TOOL_FAILURE",
        path: &["tools", "allow_tool_failure"],
        var_type: EnvVarType::Bool,
    },
];

/// Returns the list of environment variable names recognised by the loader.
///
/// Tests use this to clear every `ESPRUINO_BUILD_*` variable without keeping
/// a second hard-coded list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a settings file and push it to the composer.
fn load_settings_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    debug!(path = %path, "loaded settings file");
    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Resolve the settings file: the CLI path when it exists, otherwise the
/// first discovered candidate.
fn resolve_settings_path(cli: &Cli) -> Option<Utf8PathBuf> {
    cli.config.clone().filter(|p| p.exists()).or_else(|| {
        let discovery = ConfigDiscovery::builder("espruino-build")
            .env_var("ESPRUINO_BUILD_CONFIG_PATH")
            .config_file_name("config.toml")
            .dotfile_name(".espruino-build.toml")
            .build();
        discovery
            .candidates()
            .into_iter()
            .filter(|p| p.exists())
            .find_map(|p| Utf8PathBuf::try_from(p).ok())
    })
}

/// Load settings with full layer precedence.
///
/// 1. Application defaults defined in the structs
/// 2. Settings file (`--config`, or discovered)
/// 3. Environment variables prefixed with `ESPRUINO_BUILD_`, read via `env`
/// 4. Command-line arguments
///
/// Later sources override earlier ones. The merged settings are validated
/// before they are returned.
///
/// # Errors
///
/// Returns `ConfigError` if loading fails due to:
/// - A malformed settings file
/// - An invalid typed environment variable (e.g. a non-boolean
///   `ESPRUINO_BUILD_ALLOW_TOOL_FAILURE`)
/// - Paths that escape the project directory, or empty tool commands
pub fn load_settings<E: mockable::Env>(cli: &Cli, env: &E) -> Result<BuildSettings> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(BuildSettings::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(ref path) = resolve_settings_path(cli) {
        load_settings_file(path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let settings =
        BuildSettings::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    settings.validate()?;
    Ok(settings)
}

/// Collect `ESPRUINO_BUILD_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed variable has an
/// unparseable value, or a command variable is blank.
fn collect_env_vars<E: mockable::Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::Bool => match raw_value.parse::<bool>() {
                Ok(b) => Value::Bool(b),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: String::from(spec.env_var),
                        reason: format!("expected bool (true/false), got '{raw_value}'"),
                    }
                    .into());
                }
            },
            EnvVarType::Command => {
                let words: Vec<Value> = raw_value
                    .split_whitespace()
                    .map(|word| Value::String(String::from(word)))
                    .collect();
                if words.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: String::from(spec.env_var),
                        reason: String::from("expected a command, got an empty value"),
                    }
                    .into());
                }
                Value::Array(words)
            }
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating intermediate
/// objects as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(String::from(segment))
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(String::from(field), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref project_dir) = cli.project_dir {
        overrides.insert(
            String::from("project_dir"),
            Value::String(project_dir.to_string()),
        );
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
