//! Assertion helpers for build pipeline behavioural tests.

use espruino_build::tasks::strip::MODULE_MARKER;
use rstest_bdd_macros::then;

use super::state::{PipelineState, RunOutcome};
use super::steps::project;
use super::toolchain::{COMPILER, Call, ESPRUINO};
use super::{StepResult, unquote};

fn outcome(pipeline_state: &PipelineState) -> StepResult<RunOutcome> {
    pipeline_state
        .outcome
        .get()
        .ok_or_else(|| String::from("outcome should be set"))
}

fn calls(pipeline_state: &PipelineState) -> StepResult<Vec<Call>> {
    pipeline_state
        .toolchain
        .get()
        .map(|toolchain| toolchain.calls())
        .ok_or_else(|| String::from("toolchain should be configured"))
}

#[then("the run succeeds")]
fn run_succeeds(pipeline_state: &PipelineState) -> StepResult<()> {
    match outcome(pipeline_state)? {
        RunOutcome::Succeeded => Ok(()),
        RunOutcome::Failed(message) => Err(format!("expected success, got error: {message}")),
    }
}

#[then("the run fails mentioning {fragment}")]
fn run_fails_mentioning(pipeline_state: &PipelineState, fragment: String) -> StepResult<()> {
    let expected = unquote(&fragment);
    match outcome(pipeline_state)? {
        RunOutcome::Failed(message) if message.contains(&expected) => Ok(()),
        RunOutcome::Failed(message) => Err(format!("expected '{expected}' in '{message}'")),
        RunOutcome::Succeeded => Err(format!("expected failure mentioning '{expected}'")),
    }
}

#[then("the compiler ran before the espruino tool")]
fn compiler_ran_first(pipeline_state: &PipelineState) -> StepResult<()> {
    let programs: Vec<String> = calls(pipeline_state)?
        .into_iter()
        .map(|call| call.program)
        .collect();
    if programs == [COMPILER, ESPRUINO] {
        Ok(())
    } else {
        Err(format!("unexpected tool order: {programs:?}"))
    }
}

#[then("the espruino tool was never invoked")]
fn espruino_never_invoked(pipeline_state: &PipelineState) -> StepResult<()> {
    let recorded = calls(pipeline_state)?;
    if recorded.iter().any(|call| call.program == ESPRUINO) {
        Err(format!("espruino tool was invoked: {recorded:?}"))
    } else {
        Ok(())
    }
}

#[then("the espruino tool was last invoked with {arguments}")]
fn espruino_last_invoked_with(pipeline_state: &PipelineState, arguments: String) -> StepResult<()> {
    let expected = unquote(&arguments);
    let last = calls(pipeline_state)?
        .into_iter()
        .rev()
        .find(|call| call.program == ESPRUINO)
        .ok_or_else(|| String::from("espruino tool was never invoked"))?;
    let actual = last.args.join(" ");
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected arguments '{expected}', got '{actual}'"))
    }
}

#[then("the main output no longer contains the module marker")]
fn main_output_stripped(pipeline_state: &PipelineState) -> StepResult<()> {
    let main = project(pipeline_state)?.read("dist/app.js")?;
    if main.contains(MODULE_MARKER) {
        Err(format!("module marker still present in: {main}"))
    } else {
        Ok(())
    }
}

#[then("the file {path} exists")]
fn path_exists(pipeline_state: &PipelineState, path: String) -> StepResult<()> {
    let relative = unquote(&path);
    if project(pipeline_state)?.root.join(&relative).is_file() {
        Ok(())
    } else {
        Err(format!("{relative} should exist"))
    }
}

#[then("the watch file reads {expected}")]
fn watch_file_reads(pipeline_state: &PipelineState, expected: String) -> StepResult<()> {
    let contents = project(pipeline_state)?.read("dist/esp-console-input.js")?;
    let wanted = unquote(&expected);
    if contents == wanted {
        Ok(())
    } else {
        Err(format!("expected watch file '{wanted}', got '{contents}'"))
    }
}

#[then("the watch file is empty")]
fn watch_file_empty(pipeline_state: &PipelineState) -> StepResult<()> {
    let contents = project(pipeline_state)?.read("dist/esp-console-input.js")?;
    if contents.is_empty() {
        Ok(())
    } else {
        Err(format!("expected an empty watch file, got '{contents}'"))
    }
}
