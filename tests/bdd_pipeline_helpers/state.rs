//! Scenario state for build pipeline behavioural tests.

use std::sync::Arc;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tempfile::TempDir;

use super::toolchain::FakeToolchain;

/// Scratch project directory, kept alive for the whole scenario.
#[derive(Debug, Clone)]
pub(crate) struct ScratchProject {
    _temp: Arc<TempDir>,
    pub(crate) root: Utf8PathBuf,
}

impl ScratchProject {
    pub(crate) fn new() -> Result<Self, String> {
        let temp = TempDir::new().map_err(|e| format!("failed to create temp dir: {e}"))?;
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|path| format!("temp dir is not UTF-8: {}", path.display()))?;
        Ok(Self {
            _temp: Arc::new(temp),
            root,
        })
    }

    pub(crate) fn write(&self, relative: &str, contents: &str) -> Result<(), String> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {parent}: {e}"))?;
        }
        std::fs::write(&path, contents).map_err(|e| format!("failed to write {path}: {e}"))
    }

    pub(crate) fn read(&self, relative: &str) -> Result<String, String> {
        let path = self.root.join(relative);
        std::fs::read_to_string(&path).map_err(|e| format!("failed to read {path}: {e}"))
    }
}

/// High-level outcome of a pipeline run.
#[derive(Debug, Clone)]
pub(crate) enum RunOutcome {
    /// Every planned task completed.
    Succeeded,
    /// The run stopped with this error.
    Failed(String),
}

#[derive(Default, ScenarioState)]
pub(crate) struct PipelineState {
    pub(crate) project: Slot<ScratchProject>,
    pub(crate) toolchain: Slot<FakeToolchain>,
    pub(crate) allow_tool_failure: Slot<bool>,
    pub(crate) outcome: Slot<RunOutcome>,
}

#[fixture]
pub(crate) fn pipeline_state() -> PipelineState {
    let state = PipelineState::default();
    state.toolchain.set(FakeToolchain::default());
    state.allow_tool_failure.set(false);
    state
}
