//! Command-line interface for threedmake.
//!
//! - [`args`] - Flag definitions using clap's derive macros
//! - [`invocation`] - Splitting positional words into actions and an input file
//! - [`driver`] - Loading options, preparing files and running the plan

pub mod args;
pub mod driver;
pub mod invocation;

pub use args::{parse_scale, Cli};
pub use driver::Driver;
pub use invocation::Invocation;
