//! Behavioural helpers for build pipeline scenarios.

mod assertions;
mod state;
mod steps;
mod toolchain;

pub(crate) type StepResult<T> = Result<T, String>;

#[expect(
    unused_imports,
    reason = "rstest-bdd discovers step functions via attributes, not runtime usage"
)]
pub(crate) use assertions::*;
pub(crate) use state::{PipelineState, pipeline_state};
#[expect(
    unused_imports,
    reason = "rstest-bdd discovers step functions via attributes, not runtime usage"
)]
pub(crate) use steps::*;

/// Strip optional surrounding quotes from a step argument.
pub(crate) fn unquote(raw: &str) -> String {
    raw.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(raw)
        .replace("\\\"", "\"")
}
