use std::fs;

use tracing::{debug, warn};

use crate::actions::Context;
use crate::config::profiles;
use crate::error::{MakeError, Result};
use crate::gcode::{
    extract_slicer_keys, format_mm_length, parse_gcode_stats, reformat_gcode_time,
    render_feature_report, FILAMENT_USED_MM, NORMAL_MODE_TIME, SILENT_MODE_TIME,
};
use crate::stream::{is_slicer_error, Output, StreamMux};
use crate::tools::{slicer, Tool};

pub(super) fn slice(ctx: &mut Context, out: &Output, debug_out: &Output) -> Result<()> {
    let options = ctx.options()?;
    let files = ctx.files()?;

    let model = files
        .model_to_slice()
        .filter(|m| m.exists())
        .ok_or_else(|| MakeError::missing("Model has not been built"))?;
    let profile = options.printer_profile.as_deref().ok_or_else(|| {
        MakeError::missing("No printer profile selected; set printer_profile or pass --profile")
    })?;

    let ini_files = profiles::resolve_ini_files(&ctx.config_dir, profile, &options.overlays)?;
    let gcode = slicer::gcode_path(&files.build_dir, options.project_name.as_deref(), model);
    fs::create_dir_all(&files.build_dir)?;

    // The slicer's log level switch does not silence progress output, so stdout
    // only shows in debug mode. Errors arrive on stderr, sometimes with exit 0.
    let invocation = slicer::slice_invocation(options, model, &gcode, &ini_files);
    let (stderr, captured) = StreamMux::store_and_forward(out.as_sink()?)?;
    let result = invocation.run(debug_out.stdio()?, stderr.stdio()?);
    stderr.close();
    result?;

    if let Some(line) = captured.find_line(is_slicer_error) {
        return Err(MakeError::ToolReportedError {
            tool: Tool::Slicer.display_name().to_string(),
            line,
        });
    }

    debug!("G-code written to {}", gcode.display());
    report(&gcode, out)?;
    ctx.files_mut()?.sliced_gcode = Some(gcode);
    Ok(())
}

/// Print time, filament and the per-feature breakdown of a sliced file.
fn report(gcode: &std::path::Path, out: &Output) -> Result<()> {
    let keys = extract_slicer_keys(gcode)?;

    let time = keys.get(NORMAL_MODE_TIME).or_else(|| keys.get(SILENT_MODE_TIME));
    if let Some(time) = time {
        writeln!(out, "Estimated print time: {}", reformat_gcode_time(time))?;
    }
    if let Some(length) = keys.get(FILAMENT_USED_MM) {
        writeln!(out, "Filament used: {}", format_mm_length(length))?;
    }

    match parse_gcode_stats(gcode) {
        Ok(stats) => {
            if let Some(table) = render_feature_report(&stats) {
                writeln!(out)?;
                out.write_str(&table)?;
            }
        }
        Err(e) => warn!("Could not compute feature statistics: {}", e),
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::{CommandOptions, FileSet, InputKind};
    use crate::test_support::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Writes a small G-code file wherever `-o` points.
    const FAKE_SLICER: &str = "while [ $# -gt 0 ]; do\n\
        if [ \"$1\" = \"-o\" ]; then shift; out=\"$1\"; fi\n\
        shift\n\
        done\n\
        cat > \"$out\" <<'GCODE'\n\
        G1 X0 Y0 F600\n\
        ;TYPE:Perimeter\n\
        G1 X100 E10\n\
        G1 X0 E20\n\
        ; objects_info = {}\n\
        ; filament used [mm] = 20.0\n\
        ; estimated printing time (normal mode) = 1m 1s\n\
        GCODE";

    fn setup(temp: &Path, script: &str) -> Context {
        fs::create_dir_all(temp.join("config/profiles")).unwrap();
        fs::write(temp.join("config/profiles/mk4.ini"), "").unwrap();
        let model = temp.join("gear.stl");
        fs::write(&model, "solid\n").unwrap();
        let slicer = fake_tool(temp, "fake-slicer", script);

        let mut ctx = Context::new(temp.join("config"), temp.to_path_buf());
        ctx.options = Some(CommandOptions {
            project_name: Some("widget".into()),
            printer_profile: Some("mk4".into()),
            slicer_path: Some(slicer.to_string_lossy().into_owned()),
            ..Default::default()
        });
        ctx.files = Some(FileSet::for_input_file(&model, InputKind::Stl, temp.join("build")));
        ctx
    }

    #[test]
    fn slicing_reports_time_filament_and_features() {
        let temp = TempDir::new().unwrap();
        let mut ctx = setup(temp.path(), FAKE_SLICER);
        let (buf, out) = buffer_output();

        slice(&mut ctx, &out, &Output::Discard).unwrap();

        let gcode = temp.path().join("build/widget-gear.gcode");
        assert_eq!(ctx.files().unwrap().sliced_gcode.as_deref(), Some(gcode.as_path()));
        let text = contents(&buf);
        assert!(text.contains("Estimated print time: 1 minute 1 second\n"));
        assert!(text.contains("Filament used: about 2.0 centimeters\n"));
        assert!(text.contains("Perimeter"));
    }

    #[test]
    fn error_on_stderr_fails_despite_exit_zero() {
        let temp = TempDir::new().unwrap();
        let mut ctx = setup(temp.path(), "echo 'error: Objects could not fit on the bed' >&2");
        let (buf, out) = buffer_output();

        let err = slice(&mut ctx, &out, &Output::Discard).unwrap_err();

        assert!(matches!(err, MakeError::ToolReportedError { ref line, .. } if line.contains("fit on the bed")));
        assert!(contents(&buf).contains("error: Objects could not fit on the bed"));
        assert!(ctx.files().unwrap().sliced_gcode.is_none());
    }

    #[test]
    fn profile_is_required() {
        let temp = TempDir::new().unwrap();
        let mut ctx = setup(temp.path(), FAKE_SLICER);
        ctx.options_mut().unwrap().printer_profile = None;

        let err = slice(&mut ctx, &Output::Discard, &Output::Discard).unwrap_err();
        assert!(err.to_string().contains("printer profile"));
    }

    #[test]
    fn missing_overlay_is_reported() {
        let temp = TempDir::new().unwrap();
        let mut ctx = setup(temp.path(), FAKE_SLICER);
        ctx.options_mut().unwrap().overlays = vec!["supports".into()];

        let err = slice(&mut ctx, &Output::Discard, &Output::Discard).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find overlay 'supports' for profile 'mk4'"
        );
    }

    #[test]
    fn unbuilt_model_is_reported() {
        let temp = TempDir::new().unwrap();
        let mut ctx = setup(temp.path(), FAKE_SLICER);
        ctx.files = Some(FileSet::for_project(temp.path(), "main"));

        let err = slice(&mut ctx, &Output::Discard, &Output::Discard).unwrap_err();
        assert_eq!(err.to_string(), "Model has not been built");
    }
}
