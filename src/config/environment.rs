//! Board parameters read from the project's environment configuration file.

use camino::Utf8Path;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;

use crate::error::{BuildError, ConfigError, FilesystemError, Result};

/// Board identity and serial connection parameters.
///
/// Loaded once per invocation, and only when the selected task closure needs
/// to talk to the board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentConfig {
    /// Board identifier passed to `--board`.
    pub board: String,

    /// Serial port the board is attached to.
    pub port: String,

    /// Baud rate of the serial port.
    pub port_speed: u32,
}

impl EnvironmentConfig {
    /// Parse the environment configuration from YAML text.
    ///
    /// `path` is only used to name the file in error messages.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for malformed YAML or missing and
    /// mistyped keys, and `ConfigError::MissingRequired` when `board` or
    /// `port` is blank.
    pub fn from_yaml_str(text: &str, path: &Utf8Path) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

        let mut missing = Vec::new();
        if config.board.trim().is_empty() {
            missing.push("board");
        }
        if config.port.trim().is_empty() {
            missing.push("port");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: format!("{} in {path}", missing.join(", ")),
            }
            .into());
        }
        Ok(config)
    }

    /// Read and parse the environment configuration at `path` inside the
    /// project directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::FileNotFound` when the file is absent, a
    /// `FilesystemError` when it cannot be read, and the errors of
    /// [`Self::from_yaml_str`] otherwise.
    pub fn load(project: &Dir, path: &Utf8Path) -> Result<Self> {
        let text = project.read_to_string(path).map_err(|e| -> BuildError {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_owned(),
                }
                .into()
            } else {
                FilesystemError::from_io(path, &e).into()
            }
        })?;
        Self::from_yaml_str(&text, path)
    }
}
