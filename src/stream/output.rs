//! Output handles passed to action handlers.

use std::fmt;
use std::io;
use std::process::Stdio;
use std::sync::Arc;

use super::mux::{discard_sink, Sink, StreamMux};

/// Where an action's text and child-process output goes.
///
/// Cloning is cheap; clones of a [`Output::Stream`] share the same pipe.
#[derive(Clone)]
pub enum Output {
    /// Unwrapped output straight into the sink (isolated actions).
    ///
    /// Child processes inherit the real stdout.
    Direct(Sink),

    /// Output through a multiplexer.
    Stream(Arc<StreamMux>),

    /// Everything is dropped; child processes get the null device.
    Discard,
}

impl Output {
    /// Write text.
    pub fn write_str(&self, text: &str) -> io::Result<()> {
        match self {
            Output::Direct(sink) => {
                let mut out = sink.lock().unwrap_or_else(|p| p.into_inner());
                out.write_all(text.as_bytes())?;
                out.flush()
            }
            Output::Stream(mux) => mux.write_str(text),
            Output::Discard => Ok(()),
        }
    }

    /// Target of `write!` and `writeln!`.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> io::Result<()> {
        if self.is_discard() {
            return Ok(());
        }
        match args.as_str() {
            Some(text) => self.write_str(text),
            None => self.write_str(&args.to_string()),
        }
    }

    /// Handle for a child process's stdout or stderr.
    pub fn stdio(&self) -> io::Result<Stdio> {
        match self {
            Output::Direct(_) => Ok(Stdio::inherit()),
            Output::Stream(mux) => mux.stdio(),
            Output::Discard => Ok(Stdio::null()),
        }
    }

    /// Sink that feeds into this output, for wrapping it in another stream.
    pub fn as_sink(&self) -> io::Result<Sink> {
        match self {
            Output::Direct(sink) => Ok(Arc::clone(sink)),
            Output::Stream(mux) => mux.as_sink(),
            Output::Discard => Ok(discard_sink()),
        }
    }

    pub fn is_discard(&self) -> bool {
        matches!(self, Output::Discard)
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Direct(_) => f.write_str("Output::Direct"),
            Output::Stream(mux) => f.debug_tuple("Output::Stream").field(mux).finish(),
            Output::Discard => f.write_str("Output::Discard"),
        }
    }
}
