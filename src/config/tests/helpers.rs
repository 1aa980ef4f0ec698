//! Shared fixtures and helper functions for settings tests.

use std::sync::Arc;

use ortho_config::MergeComposer;
use rstest::fixture;

use crate::config::BuildSettings;

/// Fixture providing `BuildSettings` parsed from a full TOML example.
#[fixture]
pub fn settings_from_full_toml() -> BuildSettings {
    let toml = r#"
        project_dir = "/home/user/blinky"

        [paths]
        src_dir = "lib"
        dist_dir = "out"
        env_config = "config/env.yaml"
        main_file = "main.js"

        [tools]
        compiler = ["node", "node_modules/typescript/bin/tsc"]
        espruino = ["espruino"]
        allow_tool_failure = true
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing `BuildSettings` parsed from a minimal TOML example.
#[fixture]
pub fn settings_from_partial_toml() -> BuildSettings {
    let toml = r#"
        [paths]
        dist_dir = "build"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(BuildSettings::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `BuildSettings`.
pub fn merge_settings(
    composer: MergeComposer,
) -> Result<BuildSettings, Arc<ortho_config::OrthoError>> {
    BuildSettings::merge_from_layers(composer.layers())
}

/// Helper: Asserts that settings carry the default project layout.
pub fn assert_settings_have_defaults(settings: &BuildSettings) {
    assert!(settings.project_dir.is_none(), "project_dir should be None");
    assert_eq!(settings.project_dir().as_str(), ".");
    assert_eq!(settings.paths.src_dir.as_str(), "src");
    assert_eq!(settings.paths.dist_dir.as_str(), "dist");
    assert_eq!(settings.paths.env_config.as_str(), "env-config.yaml");
    assert_eq!(settings.paths.app_config.as_str(), "app-config.yaml");
    assert_eq!(settings.paths.user_app_config.as_str(), "app-config.user.yaml");
    assert!(settings.paths.generated_module.is_none());
    assert_eq!(settings.paths.generated_module_path().as_str(), "src/app-config.ts");
    assert_eq!(settings.paths.tsconfig.as_str(), "tsconfig.json");
    assert_eq!(settings.tools.compiler, ["npx", "tsc"]);
    assert_eq!(settings.tools.espruino, ["npx", "espruino"]);
    assert!(
        !settings.tools.allow_tool_failure,
        "tool failures should be fatal by default"
    );
}
