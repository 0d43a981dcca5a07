//! Plan execution and interrupt handling.

pub mod executor;
pub mod interrupt;

pub use executor::{Executor, RunOutcome, COMPLETION_MARKER, STEP_INDENT};
pub use interrupt::{install_handler, is_interrupted, INTERRUPT_EXIT_CODE};
