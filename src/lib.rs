//! threedmake - Accessible 3-D printing workflow automation.
//!
//! Users name the actions they want (`build`, `slice`, `print`, ...) and
//! threedmake works out the implied steps, orders them, and runs them one
//! at a time with tidy, indented output.
//!
//! # Modules
//!
//! - [`actions`] - The action catalog, request resolution and built-in actions
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Options loading, merging and project file layout
//! - [`error`] - Error types and result aliases
//! - [`gcode`] - Sliced G-code statistics and slicer reports
//! - [`mesh`] - STL loading and bounding boxes
//! - [`octoprint`] - Print server uploads
//! - [`runner`] - Plan execution and interrupt handling
//! - [`stream`] - Line-oriented output multiplexing
//! - [`tools`] - External program invocations
//! - [`ui`] - Terminal styling and prompts
//!
//! # Example
//!
//! ```
//! use threedmake::actions::{ActionCatalog, RequestedSet};
//!
//! let catalog = ActionCatalog::builtin();
//! let mut requested: RequestedSet = ["print".to_string()].into_iter().collect();
//! let plan = catalog.resolve(&mut requested).unwrap();
//! assert_eq!(plan.names(), vec!["slice", "print"]);
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod gcode;
pub mod mesh;
pub mod octoprint;
pub mod runner;
pub mod stream;
pub mod tools;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use error::{MakeError, Result};
