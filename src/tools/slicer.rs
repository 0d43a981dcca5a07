//! Slicer command line.

use std::path::{Path, PathBuf};

use super::{Tool, ToolInvocation};
use crate::config::CommandOptions;

/// G-code path for `model`: `<build_dir>/<project>-<model stem>.gcode`.
pub fn gcode_path(build_dir: &Path, project_name: Option<&str>, model: &Path) -> PathBuf {
    let stem = model
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    let name = match project_name {
        Some(project) if !project.is_empty() => format!("{}-{}.gcode", project, stem),
        _ => format!("{}.gcode", stem),
    };
    build_dir.join(name)
}

/// Slice `model` into `gcode` using the given ini files in order.
pub fn slice_invocation(options: &CommandOptions, model: &Path, gcode: &Path, ini_files: &[PathBuf]) -> ToolInvocation {
    let invocation = ToolInvocation::new(Tool::Slicer, options)
        .arg("--export-gcode")
        .arg("-o")
        .arg(gcode)
        // Errors only; progress chatter still shows up and is filtered by the caller.
        .arg("--loglevel=1")
        .arg("--scale")
        .arg(options.scale.to_string())
        .arg(model);

    ini_files
        .iter()
        .fold(invocation, |inv, ini| inv.arg("--load").arg(ini))
}
