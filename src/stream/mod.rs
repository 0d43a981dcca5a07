//! Line-oriented output multiplexing.
//!
//! Every pipeline step writes through its own [`StreamMux`], which lets the
//! step and any child process it launches share one output channel. See
//! [`mux`] for the shutdown handshake that keeps consecutive steps from
//! interleaving.

pub mod filters;
pub mod mux;
pub mod output;

pub use filters::{is_slicer_error, should_print_openscad_log};
pub use mux::{discard_sink, stdout_sink, CapturedOutput, LinePredicate, LineTransform, Sink, StreamMux};
pub use output::Output;
