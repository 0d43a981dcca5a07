//! Configuration loading and project file layout.
//!
//! - Options record in [`options`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Artifact paths in [`files`]
//! - Printer profiles and slicer overlays in [`profiles`]
//!
//! # Example
//!
//! ```
//! use threedmake::config::load_options;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let config_dir = TempDir::new().unwrap();
//! let project = TempDir::new().unwrap();
//! fs::write(config_dir.path().join("defaults.toml"), "printer_profile = \"mk4\"").unwrap();
//! fs::write(project.path().join("3dmake.toml"), "scale = 1.5").unwrap();
//!
//! let loaded = load_options(config_dir.path(), project.path()).unwrap();
//! assert_eq!(loaded.options.printer_profile.as_deref(), Some("mk4"));
//! assert_eq!(loaded.options.scale, 1.5);
//! ```

pub mod files;
pub mod loader;
pub mod merger;
pub mod options;
pub mod profiles;

pub use files::{FileSet, InputKind};
pub use loader::{
    config_dir, load_config_value, load_options, validate, ConfigPaths, LoadedConfig,
    CONFIG_DIR_ENV, GLOBAL_CONFIG_FILE, PROJECT_CONFIG_FILE,
};
pub use merger::{deep_merge, merge_configs};
pub use options::CommandOptions;
pub use profiles::{
    list_overlays, list_printer_profiles, profile_path, read_ini_values, resolve_ini_files,
    write_ini_value, OverlayName,
};
