use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use console::Term;

use crate::actions::Context;
use crate::config::{profiles, CommandOptions, OverlayName, GLOBAL_CONFIG_FILE};
use crate::error::{MakeError, Result};
use crate::runner::interrupt;
use crate::stream::Output;
use crate::ui::prompts;

/// Editor command from the options, the environment, or a platform default.
fn choose_editor(options: &CommandOptions, env: impl Fn(&str) -> Option<String>) -> String {
    if let Some(editor) = options.editor.as_deref().filter(|e| !e.trim().is_empty()) {
        return editor.to_string();
    }
    if cfg!(windows) {
        return "notepad".to_string();
    }
    env("VISUAL")
        .or_else(|| env("EDITOR"))
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "nano".to_string())
}

fn launch_editor(options: &CommandOptions, path: &Path) -> Result<()> {
    let editor = choose_editor(options, |key| std::env::var(key).ok());
    let mut words = editor.split_whitespace();
    let program = words.next().unwrap_or("nano");

    debug!("Opening {} with {}", path.display(), editor);
    let _child = interrupt::child_running();
    let status = Command::new(program)
        .args(words)
        .arg(path)
        .status()
        .map_err(|source| MakeError::ToolLaunch {
            tool: "editor".to_string(),
            path: PathBuf::from(program),
            source,
        })?;

    if !status.success() {
        return Err(MakeError::ToolFailed {
            tool: "editor".to_string(),
            code: status.code(),
        });
    }
    Ok(())
}

pub(super) fn edit_global_config(ctx: &mut Context, _out: &Output, _debug: &Output) -> Result<()> {
    fs::create_dir_all(&ctx.config_dir)?;
    launch_editor(ctx.options()?, &ctx.config_dir.join(GLOBAL_CONFIG_FILE))
}

pub(super) fn edit_model(ctx: &mut Context, _out: &Output, _debug: &Output) -> Result<()> {
    let source = ctx
        .files()?
        .scad_source
        .clone()
        .ok_or_else(|| MakeError::missing("This model has no OpenSCAD source"))?;
    launch_editor(ctx.options()?, &source)
}

/// The selected printer profile, which must exist.
fn existing_profile<'a>(config_dir: &Path, options: &'a CommandOptions) -> Result<&'a str> {
    let profile = options
        .printer_profile
        .as_deref()
        .ok_or_else(|| MakeError::missing("No printer profile selected; set printer_profile or pass --profile"))?;

    if !profiles::list_printer_profiles(config_dir)?
        .iter()
        .any(|p| p == profile)
    {
        return Err(MakeError::missing(format!(
            "Printer profile '{}' does not exist.",
            profile
        )));
    }
    Ok(profile)
}

pub(super) fn edit_profile(ctx: &mut Context, _out: &Output, _debug: &Output) -> Result<()> {
    let options = ctx.options()?;
    let profile = existing_profile(&ctx.config_dir, options)?;
    launch_editor(options, &profiles::profile_path(&ctx.config_dir, profile))
}

/// `*_gcode` keys that hold something other than G-code.
const NOT_GCODE: &[&str] = &["binary_gcode"];

/// Ini-escaped G-code to the multi-line text shown in the editor.
fn unescape_gcode(escaped: &str) -> String {
    escaped
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\\"", "\"")
        .replace("\\'", "'")
}

/// Edited G-code back to a single ini line.
fn escape_gcode(text: &str) -> String {
    text.trim()
        .replace('"', "\\\"")
        .replace('\'', "\\'")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
}

/// Editable G-code keys of a profile, sorted.
fn gcode_keys(values: &BTreeMap<String, String>) -> Vec<String> {
    values
        .keys()
        .filter(|key| key.ends_with("_gcode") && !NOT_GCODE.contains(&key.as_str()))
        .cloned()
        .collect()
}

/// Open one G-code value of a profile in the editor and store the result.
fn edit_gcode_value(options: &CommandOptions, profile_ini: &Path, key: &str, current: &str) -> Result<()> {
    let scratch = tempfile::Builder::new()
        .prefix(key)
        .suffix(".gcode")
        .tempfile()?;
    fs::write(scratch.path(), unescape_gcode(current))?;

    launch_editor(options, scratch.path())?;

    let edited = fs::read_to_string(scratch.path())?;
    profiles::write_ini_value(profile_ini, key, &escape_gcode(&edited))
}

pub(super) fn edit_profile_gcode(ctx: &mut Context, out: &Output, _debug: &Output) -> Result<()> {
    let options = ctx.options()?;
    let profile = existing_profile(&ctx.config_dir, options)?;
    let path = profiles::profile_path(&ctx.config_dir, profile);

    let values = profiles::read_ini_values(&path)?;
    let keys = gcode_keys(&values);
    if keys.is_empty() {
        writeln!(out, "No G-code settings found in this profile.")?;
        return Ok(());
    }

    let key = match keys.as_slice() {
        [only] => only.clone(),
        _ if ctx.interactive => {
            writeln!(out, "G-code settings in profile '{}':\n", profile)?;
            let index = prompts::select_item("Choose a G-code setting to edit", &keys, &Term::stderr())?;
            keys[index].clone()
        }
        _ => {
            return Err(MakeError::usage(
                "Choosing a G-code setting to edit needs an interactive terminal",
            ))
        }
    };

    writeln!(out, "Opening {} for editing...", key)?;
    let current = values.get(&key).map(String::as_str).unwrap_or_default();
    edit_gcode_value(options, &path, &key, current)?;
    writeln!(out, "Updated {} in profile '{}'", key, profile)?;
    Ok(())
}

/// Overlay file to edit: an existing one for `name`, or a new default one.
///
/// With several matches the one for `profile` wins.
fn overlay_path(config_dir: &Path, name: &str, profile: Option<&str>) -> Result<PathBuf> {
    let matches: Vec<OverlayName> = profiles::list_overlays(config_dir)?
        .into_iter()
        .filter(|o| o.name == name)
        .collect();

    let chosen = matches
        .iter()
        .find(|o| o.profile.is_some() && o.profile.as_deref() == profile)
        .or_else(|| matches.first());

    Ok(match chosen {
        Some(overlay) => overlay.path(config_dir),
        None => OverlayName {
            name: name.to_string(),
            profile: None,
        }
        .path(config_dir),
    })
}

pub(super) fn edit_overlay(ctx: &mut Context, out: &Output, _debug: &Output) -> Result<()> {
    let name = match ctx.explicit_overlay_arg.as_slice() {
        [single] => single.clone(),
        _ if ctx.interactive => prompts::prompt_line("Which overlay?", &Term::stderr())?,
        _ => {
            return Err(MakeError::usage(
                "Choose the overlay to edit with a single --overlay argument",
            ))
        }
    };
    if name.is_empty() {
        return Err(MakeError::usage("No overlay name given"));
    }

    let options = ctx.options()?;
    let path = overlay_path(&ctx.config_dir, &name, options.printer_profile.as_deref())?;
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, "")?;
        writeln!(out, "Created new overlay {}", path.display())?;
    }
    launch_editor(options, &path)
}
