//! Printer profiles and slicer overlays in the config directory.
//!
//! ```text
//! <config dir>/profiles/<profile>.ini
//! <config dir>/overlays/default/<overlay>.ini
//! <config dir>/overlays/<profile>/<overlay>.ini
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MakeError, Result};

const DEFAULT_OVERLAY_DIR: &str = "default";

/// An overlay file and the profile it is limited to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OverlayName {
    pub name: String,
    /// `None` for overlays that apply to any printer.
    pub profile: Option<String>,
}

impl OverlayName {
    pub fn path(&self, config_dir: &Path) -> PathBuf {
        config_dir
            .join("overlays")
            .join(self.profile.as_deref().unwrap_or(DEFAULT_OVERLAY_DIR))
            .join(format!("{}.ini", self.name))
    }
}

fn ini_stems(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut stems = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_ini = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ini"));
        if is_ini && path.is_file() {
            if let Some(stem) = path.file_stem() {
                stems.push(stem.to_string_lossy().into_owned());
            }
        }
    }
    stems.sort();
    Ok(stems)
}

/// Available printer profile names, sorted.
pub fn list_printer_profiles(config_dir: &Path) -> Result<Vec<String>> {
    ini_stems(&config_dir.join("profiles"))
}

/// Every overlay, sorted by name; the default variant sorts first.
pub fn list_overlays(config_dir: &Path) -> Result<Vec<OverlayName>> {
    let overlays_dir = config_dir.join("overlays");
    if !overlays_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut overlays = Vec::new();
    for entry in fs::read_dir(&overlays_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let dir_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let profile = (dir_name != DEFAULT_OVERLAY_DIR).then_some(dir_name);

        for name in ini_stems(&path)? {
            overlays.push(OverlayName {
                name,
                profile: profile.clone(),
            });
        }
    }
    overlays.sort();
    Ok(overlays)
}

/// Slicer ini files for a profile and its overlays, in load order.
///
/// A profile-specific overlay is preferred over the default one.
pub fn resolve_ini_files(config_dir: &Path, profile: &str, overlays: &[String]) -> Result<Vec<PathBuf>> {
    let profile_ini = config_dir.join("profiles").join(format!("{}.ini", profile));
    if !profile_ini.is_file() {
        return Err(MakeError::missing(format!(
            "Printer profile '{}' does not exist",
            profile
        )));
    }

    let mut files = vec![profile_ini];
    for overlay in overlays {
        let specific = OverlayName {
            name: overlay.clone(),
            profile: Some(profile.to_string()),
        }
        .path(config_dir);
        let default = OverlayName {
            name: overlay.clone(),
            profile: None,
        }
        .path(config_dir);

        if specific.is_file() {
            files.push(specific);
        } else if default.is_file() {
            files.push(default);
        } else {
            return Err(MakeError::missing(format!(
                "Could not find overlay '{}' for profile '{}'",
                overlay, profile
            )));
        }
    }
    Ok(files)
}

/// Path of a printer profile's ini file.
pub fn profile_path(config_dir: &Path, profile: &str) -> PathBuf {
    config_dir.join("profiles").join(format!("{}.ini", profile))
}

/// `key` of a `key = value` line, skipping blanks, comments and sections.
fn ini_key(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(['#', ';', '[']) {
        return None;
    }
    trimmed
        .split_once('=')
        .map(|(key, value)| (key.trim(), value.trim()))
}

/// Every `key = value` pair of a slicer ini file; later lines win.
pub fn read_ini_values(path: &Path) -> Result<BTreeMap<String, String>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .filter_map(ini_key)
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect())
}

/// Replace the first `key = ...` line of an ini file, or append one.
pub fn write_ini_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let replacement = format!("{} = {}", key, value);

    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    match lines
        .iter()
        .position(|line| ini_key(line).is_some_and(|(k, _)| k == key))
    {
        Some(index) => lines[index] = replacement,
        None => lines.push(replacement),
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    fs::write(path, updated)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for file in [
            "profiles/prusa_mk4.ini",
            "profiles/bambu_a1.ini",
            "profiles/README.txt",
            "overlays/default/supports.ini",
            "overlays/default/preview.ini",
            "overlays/prusa_mk4/supports.ini",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        temp
    }

    #[test]
    fn profiles_are_ini_stems() {
        let temp = config_dir();
        assert_eq!(
            list_printer_profiles(temp.path()).unwrap(),
            vec!["bambu_a1", "prusa_mk4"]
        );
    }

    #[test]
    fn overlays_sort_by_name() {
        let temp = config_dir();
        let overlays = list_overlays(temp.path()).unwrap();

        assert_eq!(overlays.len(), 3);
        assert_eq!(overlays[0].profile, None);
        assert_eq!(overlays[2].profile.as_deref(), Some("prusa_mk4"));
    }

    #[test]
    fn profile_specific_overlay_wins() {
        let temp = config_dir();
        let files = resolve_ini_files(
            temp.path(),
            "prusa_mk4",
            &["preview".to_string(), "supports".to_string()],
        )
        .unwrap();

        assert_eq!(files[0], temp.path().join("profiles/prusa_mk4.ini"));
        assert_eq!(files[1], temp.path().join("overlays/default/preview.ini"));
        assert_eq!(files[2], temp.path().join("overlays/prusa_mk4/supports.ini"));
    }

    #[test]
    fn missing_overlay_is_an_error() {
        let temp = config_dir();
        let err = resolve_ini_files(temp.path(), "bambu_a1", &["brim".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Could not find overlay 'brim'"));
    }

    #[test]
    fn missing_profile_is_an_error() {
        let temp = config_dir();
        assert!(resolve_ini_files(temp.path(), "ender3", &[]).is_err());
    }

    #[test]
    fn ini_values_skip_comments() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mk4.ini");
        fs::write(
            &path,
            "# generated\n[print:mk4]\nlayer_height = 0.2\n; start_gcode = old\nstart_gcode = G28\\nG1 Z5\n",
        )
        .unwrap();

        let values = read_ini_values(&path).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["layer_height"], "0.2");
        assert_eq!(values["start_gcode"], "G28\\nG1 Z5");
    }

    #[test]
    fn ini_value_is_replaced_in_place() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mk4.ini");
        fs::write(&path, "start_gcode = G28\nlayer_height = 0.2\n").unwrap();

        write_ini_value(&path, "start_gcode", "G28 W").unwrap();
        write_ini_value(&path, "end_gcode", "M84").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "start_gcode = G28 W\nlayer_height = 0.2\nend_gcode = M84\n"
        );
    }

    #[test]
    fn missing_dirs_list_nothing() {
        let temp = TempDir::new().unwrap();
        assert!(list_printer_profiles(temp.path()).unwrap().is_empty());
        assert!(list_overlays(temp.path()).unwrap().is_empty());
    }
}
