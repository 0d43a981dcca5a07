//! Error types for threedmake operations.
//!
//! This module defines [`MakeError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Validation errors (unknown action, conflicts) are raised before any
//!   action runs, so they never leave partial artifacts behind
//! - Runtime step errors are reported by the driver as a single line
//! - Use `anyhow::Error` (via `MakeError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for threedmake operations.
#[derive(Debug, Error)]
pub enum MakeError {
    /// Requested action is not in the catalog (or is internal).
    #[error("Unknown action '{name}'")]
    UnknownAction { name: String },

    /// An isolated action was requested together with other actions.
    #[error("The action '{action}' can only be used on its own")]
    IsolatedConflict { action: String },

    /// A last-in-chain action was combined with actions that run after it.
    #[error("The action '{action}' must be the last step, but it would run before: {later}")]
    ChainOrder { action: String, later: String },

    /// Invalid combination of command-line arguments.
    #[error("{message}")]
    Usage { message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Something an action depends on is missing (file, option, upstream slot).
    #[error("{message}")]
    MissingPrecondition { message: String },

    /// An external tool could not be started.
    #[error("Could not run {tool} ({path}): {source}")]
    ToolLaunch {
        tool: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited with a nonzero status.
    #[error("The {tool} program reported an error. There should be more info above this line.")]
    ToolFailed { tool: String, code: Option<i32> },

    /// An external tool exited successfully but printed an error.
    #[error("The {tool} program reported an error: {line}")]
    ToolReportedError { tool: String, line: String },

    /// Print server rejected the upload.
    #[error("Failed to upload to {host} (status {status}): {body}")]
    UploadFailed {
        host: String,
        status: u16,
        body: String,
    },

    /// The user interrupted the run.
    #[error("Interrupted")]
    Interrupted,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MakeError {
    /// Shorthand for a [`MakeError::Usage`] error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Shorthand for a [`MakeError::MissingPrecondition`] error.
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingPrecondition {
            message: message.into(),
        }
    }

    /// True for errors raised while validating the request, before any action ran.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownAction { .. } | Self::IsolatedConflict { .. } | Self::ChainOrder { .. }
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Result type alias for threedmake operations.
pub type Result<T> = std::result::Result<T, MakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_displays_name() {
        let err = MakeError::UnknownAction {
            name: "frobnicate".into(),
        };
        assert_eq!(err.to_string(), "Unknown action 'frobnicate'");
    }

    #[test]
    fn chain_order_displays_later_actions() {
        let err = MakeError::ChainOrder {
            action: "image".into(),
            later: "print".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("image"));
        assert!(msg.contains("print"));
    }

    #[test]
    fn tool_failed_points_at_output_above() {
        let err = MakeError::ToolFailed {
            tool: "OpenSCAD".into(),
            code: Some(1),
        };
        assert_eq!(
            err.to_string(),
            "The OpenSCAD program reported an error. There should be more info above this line."
        );
    }

    #[test]
    fn validation_errors_are_classified() {
        assert!(MakeError::IsolatedConflict {
            action: "version".into()
        }
        .is_validation());
        assert!(!MakeError::usage("nope").is_validation());
    }

    #[test]
    fn interrupt_has_distinct_exit_code() {
        assert_eq!(MakeError::Interrupted.exit_code(), 130);
        assert_eq!(MakeError::missing("x").exit_code(), 1);
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: MakeError = io_err.into();
        assert!(matches!(err, MakeError::Io(_)));
    }
}
