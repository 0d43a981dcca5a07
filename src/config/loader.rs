//! Configuration discovery and loading.
//!
//! Options come from two files, later overriding earlier:
//! 1. Global defaults (`<config dir>/defaults.toml`)
//! 2. Project config (`./3dmake.toml`)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::merger::merge_configs;
use crate::config::options::CommandOptions;
use crate::error::{MakeError, Result};

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "THREEDMAKE_CONFIG_DIR";

/// Name of the global defaults file inside the config dir.
pub const GLOBAL_CONFIG_FILE: &str = "defaults.toml";

/// Name of the project config file.
pub const PROJECT_CONFIG_FILE: &str = "3dmake.toml";

/// The per-user configuration directory.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("3dmake"))
        .ok_or_else(|| MakeError::ConfigValidationError {
            message: format!("Could not determine a configuration directory; set {}", CONFIG_DIR_ENV),
        })
}

/// Locations of the two configuration layers.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// `<config dir>/defaults.toml`, if it exists.
    pub global: Option<PathBuf>,

    /// `<project>/3dmake.toml`, if it exists.
    pub project: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn discover(config_dir: &Path, working_dir: &Path) -> Self {
        let existing = |path: PathBuf| path.is_file().then_some(path);
        Self {
            global: existing(config_dir.join(GLOBAL_CONFIG_FILE)),
            project: existing(working_dir.join(PROJECT_CONFIG_FILE)),
        }
    }

    /// Directory holding the project config, if there is one.
    pub fn project_root(&self) -> Option<PathBuf> {
        self.project
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
    }
}

/// Read one config file as a raw TOML value.
pub fn load_config_value(path: &Path) -> Result<toml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MakeError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            MakeError::Io(e)
        }
    })?;

    toml::from_str(&content).map_err(|e| MakeError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Options plus the project root they were loaded for.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub options: CommandOptions,
    pub project_root: Option<PathBuf>,
}

/// Load and merge the global and project configuration.
///
/// Missing files are skipped. A project without `project_name` is named
/// after its directory.
pub fn load_options(config_dir: &Path, working_dir: &Path) -> Result<LoadedConfig> {
    let paths = ConfigPaths::discover(config_dir, working_dir);

    let mut layers = Vec::new();
    for path in [&paths.global, &paths.project].into_iter().flatten() {
        debug!("Loading config from {}", path.display());
        layers.push(load_config_value(path)?);
    }

    let merged = merge_configs(&layers);
    let source = paths
        .project
        .clone()
        .or_else(|| paths.global.clone())
        .unwrap_or_else(|| config_dir.join(GLOBAL_CONFIG_FILE));
    let mut options: CommandOptions = merged.try_into().map_err(|e: toml::de::Error| {
        MakeError::ConfigParseError {
            path: source,
            message: e.to_string(),
        }
    })?;

    let project_root = paths.project_root();
    if let Some(root) = &project_root {
        if options.project_name.is_none() {
            options.project_name = root
                .canonicalize()
                .unwrap_or_else(|_| root.clone())
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }
    }

    validate(&options)?;
    Ok(LoadedConfig {
        options,
        project_root,
    })
}

/// Reject values no action could work with.
pub fn validate(options: &CommandOptions) -> Result<()> {
    if !(options.scale.is_finite() && options.scale > 0.0) {
        return Err(MakeError::ConfigValidationError {
            message: format!("scale must be a positive number, got {}", options.scale),
        });
    }
    if options.model_name.trim().is_empty() {
        return Err(MakeError::ConfigValidationError {
            message: "model_name must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn project_overrides_global() {
        let config = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(
            config.path().join(GLOBAL_CONFIG_FILE),
            "printer_profile = \"mk3\"\noverlays = [\"supports\"]\n",
        )
        .unwrap();
        fs::write(
            project.path().join(PROJECT_CONFIG_FILE),
            "overlays = [\"draft\"]\nproject_name = \"widget\"\n",
        )
        .unwrap();

        let loaded = load_options(config.path(), project.path()).unwrap();

        assert_eq!(loaded.options.printer_profile.as_deref(), Some("mk3"));
        assert_eq!(loaded.options.overlays, vec!["draft"]);
        assert_eq!(loaded.options.project_name.as_deref(), Some("widget"));
        assert_eq!(loaded.project_root.as_deref(), Some(project.path()));
    }

    #[test]
    fn project_name_defaults_to_directory() {
        let config = TempDir::new().unwrap();
        let parent = TempDir::new().unwrap();
        let project = parent.path().join("birdhouse");
        fs::create_dir(&project).unwrap();
        fs::write(project.join(PROJECT_CONFIG_FILE), "").unwrap();

        let loaded = load_options(config.path(), &project).unwrap();

        assert_eq!(loaded.options.project_name.as_deref(), Some("birdhouse"));
    }

    #[test]
    fn no_files_gives_defaults_and_no_project() {
        let config = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();

        let loaded = load_options(config.path(), cwd.path()).unwrap();

        assert_eq!(loaded.options, CommandOptions::default());
        assert!(loaded.project_root.is_none());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let config = TempDir::new().unwrap();
        fs::write(config.path().join(GLOBAL_CONFIG_FILE), "scale = [").unwrap();

        let err = load_options(config.path(), config.path()).unwrap_err();
        assert!(matches!(err, MakeError::ConfigParseError { .. }));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let config = TempDir::new().unwrap();
        fs::write(config.path().join(GLOBAL_CONFIG_FILE), "scale = \"auto\"").unwrap();

        let err = load_options(config.path(), config.path()).unwrap_err();
        assert!(matches!(err, MakeError::ConfigParseError { .. }));
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let options = CommandOptions {
            scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            validate(&options),
            Err(MakeError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_config_value(Path::new("/nonexistent/defaults.toml")).unwrap_err();
        assert!(matches!(err, MakeError::ConfigNotFound { .. }));
    }
}
