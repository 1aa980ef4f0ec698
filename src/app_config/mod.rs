//! Generation of the application configuration module.
//!
//! The project keeps a tracked base configuration (`app-config.yaml`) and an
//! untracked per-user override file (`app-config.user.yaml`). The override is
//! bootstrapped on first use as a fully commented copy of the base, so it
//! documents every available key without changing anything. Both files are
//! parsed as YAML, merged shallowly (override keys replace base keys
//! wholesale) and written as a source module:
//!
//! ```text
//! export default {"led":"LED1","interval":500};
//! ```
//!
//! The pure steps ([`commented_copy`], [`parse_mapping`], [`shallow_merge`],
//! [`render_module`]) carry no I/O; [`generate_config_module`] wires them to a
//! project directory handle.

use camino::Utf8Path;
use cap_std::fs_utf8::Dir;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::PathsConfig;
use crate::error::{ConfigError, FilesystemError, Result};

/// A configuration mapping. Key order follows the source documents.
pub type AppConfigMap = Map<String, Value>;

/// Outcome of a successful module generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedConfig {
    bootstrapped: bool,
    merged: AppConfigMap,
}

impl GeneratedConfig {
    /// Whether the override file was created during this run.
    #[must_use]
    pub const fn bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// The merged mapping written to the module.
    #[must_use]
    pub const fn merged(&self) -> &AppConfigMap {
        &self.merged
    }
}

/// Return `text` with every line commented out.
///
/// Lines are split and re-joined on `\n`, so a trailing newline yields a
/// trailing `# ` line and `\r` characters are kept in place.
#[must_use]
pub fn commented_copy(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("# {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a YAML document into a configuration mapping.
///
/// An empty document, or one holding only comments, is an empty mapping.
/// Merge keys (`<<`) are resolved. Scalar keys are converted to strings.
/// `path` names the document in error messages.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` for malformed YAML and
/// `ConfigError::NotAMapping` when the root is a sequence or a scalar.
pub fn parse_mapping(text: &str, path: &Utf8Path) -> Result<AppConfigMap> {
    if is_blank_document(text) {
        return Ok(AppConfigMap::new());
    }

    let mut document: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;
    document
        .apply_merge()
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to resolve merge keys in {path}: {e}"),
        })?;

    let value = serde_json::to_value(&document).map_err(|e| ConfigError::ParseError {
        message: format!("failed to convert {path}: {e}"),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(AppConfigMap::new()),
        _ => Err(ConfigError::NotAMapping {
            path: path.to_owned(),
        }
        .into()),
    }
}

fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    })
}

/// Merge `overrides` over `base`.
///
/// Every override key replaces the base value wholesale; nested mappings are
/// not merged. Base keys keep their positions and new keys are appended.
#[must_use]
pub fn shallow_merge(base: AppConfigMap, overrides: AppConfigMap) -> AppConfigMap {
    let mut merged = base;
    for (key, value) in overrides {
        merged.insert(key, value);
    }
    merged
}

/// Render the merged mapping as the generated source module.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` if the mapping cannot be serialised.
pub fn render_module(config: &AppConfigMap) -> Result<String> {
    let json = serde_json::to_string(config).map_err(|e| ConfigError::ParseError {
        message: format!("failed to serialise merged configuration: {e}"),
    })?;
    Ok(format!("export default {json};"))
}

/// Bootstrap the override file if needed, merge both configuration files and
/// write the generated module.
///
/// Nothing is written to the generated module unless both files parse.
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` when the base file is absent, the
/// parse errors of [`parse_mapping`], and `FilesystemError` for failed reads
/// or writes.
pub fn generate_config_module(project: &Dir, paths: &PathsConfig) -> Result<GeneratedConfig> {
    let base_text = read_config_file(project, &paths.app_config)?;

    let bootstrapped = !project.exists(&paths.user_app_config);
    if bootstrapped {
        write_file(project, &paths.user_app_config, &commented_copy(&base_text))?;
        info!(path = %paths.user_app_config, "created user configuration from base");
    }
    let override_text = read_config_file(project, &paths.user_app_config)?;

    let base = parse_mapping(&base_text, &paths.app_config)?;
    let overrides = parse_mapping(&override_text, &paths.user_app_config)?;
    debug!(
        base_keys = base.len(),
        override_keys = overrides.len(),
        "merging application configuration"
    );
    let merged = shallow_merge(base, overrides);
    let module = render_module(&merged)?;

    let generated_module = paths.generated_module_path();
    if let Some(parent) = generated_module
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
    {
        project
            .create_dir_all(parent)
            .map_err(|e| FilesystemError::from_io(parent, &e))?;
    }
    write_file(project, &generated_module, &module)?;
    info!(path = %generated_module, keys = merged.len(), "generated configuration module");

    Ok(GeneratedConfig {
        bootstrapped,
        merged,
    })
}

fn read_config_file(project: &Dir, path: &Utf8Path) -> Result<String> {
    project.read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: path.to_owned(),
            }
            .into()
        } else {
            FilesystemError::from_io(path, &e).into()
        }
    })
}

fn write_file(project: &Dir, path: &Utf8Path, contents: &str) -> Result<()> {
    project
        .write(path, contents)
        .map_err(|e| FilesystemError::from_io(path, &e).into())
}
