//! Given/when steps for build pipeline scenarios.

use clap::ValueEnum;
use espruino_build::api::run_task;
use espruino_build::config::{BuildSettings, ToolsConfig};
use espruino_build::graph::TaskId;
use rstest_bdd_macros::{given, when};

use super::state::{PipelineState, RunOutcome, ScratchProject};
use super::toolchain::{COMPILER, CompilerBehaviour, ESPRUINO, FakeToolchain};
use super::{StepResult, unquote};

pub(crate) fn project(pipeline_state: &PipelineState) -> StepResult<ScratchProject> {
    pipeline_state
        .project
        .get()
        .ok_or_else(|| String::from("project should be set up"))
}

#[given("a project targeting board {board} on port {port}")]
fn project_targeting_board(
    pipeline_state: &PipelineState,
    board: String,
    port: String,
) -> StepResult<()> {
    let scratch = ScratchProject::new()?;
    scratch.write(
        "env-config.yaml",
        &format!(
            "board: {}\nport: {}\nport_speed: 115200\n",
            unquote(&board),
            unquote(&port)
        ),
    )?;
    scratch.write("app-config.yaml", "led: LED1\ninterval: 500\n")?;
    scratch.write("src/app.ts", "LED1.set();\n")?;
    pipeline_state.project.set(scratch);
    Ok(())
}

#[given("a plain JavaScript source {path}")]
fn plain_javascript_source(pipeline_state: &PipelineState, path: String) -> StepResult<()> {
    project(pipeline_state)?.write(
        &format!("src/{}", unquote(&path)),
        "module.exports = {};\n",
    )
}

#[given("an existing bundle {contents}")]
fn existing_bundle(pipeline_state: &PipelineState, contents: String) -> StepResult<()> {
    project(pipeline_state)?.write("dist/bundle.js", &unquote(&contents))
}

#[given("a watch file containing {contents}")]
fn watch_file_containing(pipeline_state: &PipelineState, contents: String) -> StepResult<()> {
    project(pipeline_state)?.write("dist/esp-console-input.js", &unquote(&contents))
}

#[given("a toolchain that compiles successfully")]
fn toolchain_compiles(pipeline_state: &PipelineState) {
    pipeline_state
        .toolchain
        .set(FakeToolchain::new(CompilerBehaviour::Succeeds));
}

#[given("a toolchain whose compiler emits nothing")]
fn toolchain_emits_nothing(pipeline_state: &PipelineState) {
    pipeline_state
        .toolchain
        .set(FakeToolchain::new(CompilerBehaviour::EmitsNothing));
}

#[given("a toolchain whose compiler exits with code {code}")]
fn toolchain_exits(pipeline_state: &PipelineState, code: i32) {
    pipeline_state
        .toolchain
        .set(FakeToolchain::new(CompilerBehaviour::Exits(code)));
}

#[given("a toolchain whose bundler exits with code {code}")]
fn toolchain_bundler_exits(pipeline_state: &PipelineState, code: i32) {
    pipeline_state
        .toolchain
        .set(FakeToolchain::new(CompilerBehaviour::Succeeds).with_bundler_exit(code));
}

#[given("tool failures are allowed")]
fn tool_failures_allowed(pipeline_state: &PipelineState) {
    pipeline_state.allow_tool_failure.set(true);
}

#[when("the {task} task runs")]
fn task_runs(pipeline_state: &PipelineState, task: String) -> StepResult<()> {
    let name = unquote(&task);
    let entry = <TaskId as ValueEnum>::from_str(&name, false)
        .map_err(|e| format!("unknown task {name}: {e}"))?;
    let scratch = project(pipeline_state)?;
    let toolchain = pipeline_state
        .toolchain
        .get()
        .ok_or_else(|| String::from("toolchain should be configured"))?;

    let settings = BuildSettings {
        project_dir: Some(scratch.root.clone()),
        tools: ToolsConfig {
            compiler: vec![String::from(COMPILER)],
            espruino: vec![String::from(ESPRUINO)],
            allow_tool_failure: pipeline_state.allow_tool_failure.get().unwrap_or(false),
        },
        ..BuildSettings::default()
    };

    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| format!("failed to create runtime: {e}"))?;
    let outcome = match runtime.block_on(run_task(&settings, entry, &toolchain)) {
        Ok(_) => RunOutcome::Succeeded,
        Err(e) => RunOutcome::Failed(e.to_string()),
    };
    pipeline_state.outcome.set(outcome);
    Ok(())
}
