//! External programs the pipeline drives.
//!
//! Each tool is run exactly once per step with its stdout and stderr wired to
//! the step's output streams. A nonzero exit is a step failure; there are no
//! retries.

pub mod openscad;
pub mod slicer;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::config::CommandOptions;
use crate::error::{MakeError, Result};
use crate::runner::interrupt;

/// A program the pipeline knows how to launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    OpenScad,
    Slicer,
}

impl Tool {
    /// Name used in messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::OpenScad => "OpenSCAD",
            Tool::Slicer => "slicer",
        }
    }

    /// Executable looked up on `PATH` when no override is configured.
    pub fn default_program(&self) -> &'static str {
        match self {
            Tool::OpenScad => "openscad",
            Tool::Slicer => "prusa-slicer",
        }
    }

    /// Executable to launch, honouring `openscad_path` / `slicer_path`.
    pub fn program(&self, options: &CommandOptions) -> PathBuf {
        let configured = match self {
            Tool::OpenScad => options.openscad_path.as_deref(),
            Tool::Slicer => options.slicer_path.as_deref(),
        };
        PathBuf::from(configured.unwrap_or(self.default_program()))
    }
}

/// One command line for a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool: Tool,
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new(tool: Tool, options: &CommandOptions) -> Self {
        Self {
            tool,
            program: tool.program(options),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments as lossy strings, for assertions and logs.
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Run to completion with the given stdio targets.
    pub fn run(&self, stdout: Stdio, stderr: Stdio) -> Result<()> {
        debug!(
            "Running {} {}",
            self.program.display(),
            self.display_args().join(" ")
        );

        let status = {
            let _child = interrupt::child_running();
            Command::new(&self.program)
                .args(&self.args)
                .stdin(Stdio::null())
                .stdout(stdout)
                .stderr(stderr)
                .status()
                .map_err(|source| MakeError::ToolLaunch {
                    tool: self.tool.display_name().to_string(),
                    path: self.program.clone(),
                    source,
                })?
        };

        // A Ctrl-C reaches the child too; report it as an interrupt, not a tool failure.
        interrupt::check()?;

        if !status.success() {
            debug!("{} exited with {:?}", self.tool.display_name(), status.code());
            return Err(MakeError::ToolFailed {
                tool: self.tool.display_name().to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }
}
