//! Actions: the named steps users combine on the command line.
//!
//! - [`catalog`] holds the ordered action table and request resolution
//! - [`context`] is the state threaded through a run
//! - [`builtin`] registers the actions the binary ships with

pub mod builtin;
pub mod catalog;
pub mod context;

pub use builtin::create_project;
pub use catalog::{Action, ActionCatalog, ActionFlags, ActionFn, ExecutionPlan, RequestedSet};
pub use context::Context;
