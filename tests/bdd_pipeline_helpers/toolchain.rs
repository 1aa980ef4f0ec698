//! A stand-in for the TypeScript compiler and the Espruino tool.

use std::io;
use std::sync::{Arc, Mutex};

use espruino_build::tasks::strip::MODULE_MARKER;
use espruino_build::tool::{CommandRunner, RunToolFuture, ToolExit, ToolInvocation};

pub(crate) const COMPILER: &str = "tsc";
pub(crate) const ESPRUINO: &str = "espruino";

/// How the fake compiler behaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum CompilerBehaviour {
    /// Emit `app.js` with the module marker.
    #[default]
    Succeeds,
    /// Exit cleanly without writing anything.
    EmitsNothing,
    /// Exit with the given status.
    Exits(i32),
}

/// One recorded invocation: program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
}

/// Plays the external tools against the real project directory.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeToolchain {
    behaviour: CompilerBehaviour,
    bundler_exit: Option<i32>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeToolchain {
    pub(crate) fn new(behaviour: CompilerBehaviour) -> Self {
        Self {
            behaviour,
            bundler_exit: None,
            calls: Arc::default(),
        }
    }

    /// Make every Espruino invocation exit with `code` without writing a
    /// bundle.
    pub(crate) const fn with_bundler_exit(mut self, code: i32) -> Self {
        self.bundler_exit = Some(code);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn compile(&self, invocation: &ToolInvocation) -> io::Result<ToolExit> {
        match self.behaviour {
            CompilerBehaviour::Exits(code) => Ok(ToolExit::new(Some(code))),
            CompilerBehaviour::EmitsNothing => Ok(ToolExit::success()),
            CompilerBehaviour::Succeeds => {
                let out_dir = flag_value(invocation.args(), "--outDir").unwrap_or("dist");
                let dist = invocation.working_dir().join(out_dir);
                std::fs::create_dir_all(&dist)?;
                std::fs::write(
                    dist.join("app.js"),
                    format!("\"use strict\";\n{MODULE_MARKER}\nLED1.set();\n"),
                )?;
                Ok(ToolExit::success())
            }
        }
    }

    fn espruino(&self, invocation: &ToolInvocation) -> io::Result<ToolExit> {
        if let Some(code) = self.bundler_exit {
            return Ok(ToolExit::new(Some(code)));
        }
        let dist = invocation.working_dir();
        if let Some(bundle) = flag_value(invocation.args(), "-o") {
            let input = invocation
                .args()
                .iter()
                .position(|arg| arg == "-o")
                .and_then(|index| index.checked_sub(1))
                .and_then(|index| invocation.args().get(index))
                .ok_or_else(|| io::Error::other("missing input file"))?;
            let source = std::fs::read_to_string(dist.join(input))?;
            std::fs::write(dist.join(bundle), source)?;
        }
        Ok(ToolExit::success())
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}

impl CommandRunner for FakeToolchain {
    fn run(&self, invocation: &ToolInvocation) -> RunToolFuture<'_> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(Call {
                program: String::from(invocation.program()),
                args: invocation.args().to_vec(),
            });
        }
        let outcome = match invocation.program() {
            COMPILER => self.compile(invocation),
            ESPRUINO => self.espruino(invocation),
            other => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("unexpected program {other}"),
            )),
        };
        Box::pin(async move { outcome })
    }
}

