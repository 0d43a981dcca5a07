//! Sequential execution of a resolved plan.
//!
//! Pipeline steps each get a fresh indenting [`StreamMux`] that is closed
//! before the next step starts, so one step's output (including anything
//! its child processes print) is fully flushed before the next heading.

use std::sync::Arc;

use tracing::debug;

use crate::actions::{Action, Context, ExecutionPlan};
use crate::error::{MakeError, Result};
use crate::stream::{Output, Sink, StreamMux};
use crate::ui;

use super::interrupt;

/// Spaces in front of every line a pipeline step prints.
pub const STEP_INDENT: usize = 4;

/// Printed after the last step of a completed pipeline.
pub const COMPLETION_MARKER: &str = "Done.";

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// An isolated action ran; no completion marker was printed.
    Isolated,
    /// Every pipeline step ran.
    Completed,
}

/// Runs plans against one output sink.
pub struct Executor {
    sink: Sink,
    color: bool,
    interrupted: fn() -> bool,
}

impl Executor {
    /// An executor with plain headings.
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            color: false,
            interrupted: interrupt::is_interrupted,
        }
    }

    /// Print headings in bold.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Replace the check consulted after each step.
    pub fn with_interrupt_check(mut self, check: fn() -> bool) -> Self {
        self.interrupted = check;
        self
    }

    /// Run every step of `plan` in order, stopping at the first failure.
    pub fn run(&self, plan: &ExecutionPlan<'_>, ctx: &mut Context) -> Result<RunOutcome> {
        let direct = Output::Direct(Arc::clone(&self.sink));

        for action in plan.iter() {
            if action.flags.isolated {
                debug!("Running isolated action {}", action.name);
                let debug_out = if action.flags.needs_options && ctx.debug() {
                    direct.clone()
                } else {
                    Output::Discard
                };
                (action.handler)(ctx, &direct, &debug_out)?;
                return Ok(RunOutcome::Isolated);
            }

            if !action.flags.internal {
                writeln!(direct, "\n{}", ui::heading(&action.heading(), self.color))?;
            }
            self.run_step(action, ctx)?;

            if (self.interrupted)() {
                return Err(MakeError::Interrupted);
            }
        }

        writeln!(direct, "\n{}", COMPLETION_MARKER)?;
        Ok(RunOutcome::Completed)
    }

    fn run_step(&self, action: &Action, ctx: &mut Context) -> Result<()> {
        debug!("Running step {}", action.name);
        let mux = Arc::new(StreamMux::indent(Arc::clone(&self.sink), STEP_INDENT)?);
        let out = Output::Stream(Arc::clone(&mux));
        let debug_out = if ctx.debug() {
            out.clone()
        } else {
            Output::Discard
        };

        let result = (action.handler)(ctx, &out, &debug_out);
        mux.close();
        result
    }
}
