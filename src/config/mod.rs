//! Runner settings and project configuration for espruino-build.
//!
//! [`BuildSettings`] describes where the project lives and which external
//! tools to run. It is loaded with layered precedence by [`load_settings`]:
//! CLI flags override environment variables, which override the settings
//! file, which overrides defaults. [`EnvironmentConfig`] holds the board
//! parameters read from the project's own `env-config.yaml`.
//!
//! # Example Settings File
//!
//! ```toml
//! project_dir = "/home/user/blinky"
//!
//! [paths]
//! src_dir = "src"
//! dist_dir = "dist"
//! env_config = "env-config.yaml"
//! app_config = "app-config.yaml"
//! user_app_config = "app-config.user.yaml"
//! generated_module = "src/app-config.ts" # defaults to <src_dir>/app-config.ts
//! tsconfig = "tsconfig.json"
//! main_file = "app.js"
//! bundle_file = "bundle.js"
//! watch_file = "esp-console-input.js"
//!
//! [tools]
//! compiler = ["npx", "tsc"]
//! espruino = ["npx", "espruino"]
//! allow_tool_failure = false
//! ```

mod cli;
mod environment;
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use cli::Cli;
pub use environment::EnvironmentConfig;
pub use loader::{env_var_names, load_settings};
pub use types::{BuildSettings, PathsConfig, ToolsConfig};
