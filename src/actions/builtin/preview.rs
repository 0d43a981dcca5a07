use std::fs;
use std::path;

use tracing::debug;

use crate::actions::Context;
use crate::error::{MakeError, Result};
use crate::stream::Output;
use crate::tools::openscad;

/// Overlay applied when slicing a flat preview.
const PREVIEW_OVERLAY: &str = "preview";

pub(super) fn preview(ctx: &mut Context, out: &Output, debug_out: &Output) -> Result<()> {
    let options = ctx.options()?;
    let files = ctx.files()?;
    let metrics = ctx.mesh_metrics()?;

    let model = files
        .model_to_project()
        .ok_or_else(|| MakeError::missing("There is no model to preview"))?;
    // OpenSCAD resolves import() paths relative to its input file.
    let model = path::absolute(model)?;
    let output = files
        .build_dir
        .join(format!("{}-{}.stl", super::stem(&model), options.view));

    fs::create_dir_all(&files.build_dir)?;
    let invocation = openscad::projection_invocation(options, &options.view, &model, metrics, &output)?;
    super::run_openscad(&invocation, options.debug, out, debug_out)?;

    debug!("Preview written to {}", output.display());
    ctx.files_mut()?.projected_model = Some(output);
    ctx.options_mut()?
        .overlays
        .insert(0, PREVIEW_OVERLAY.to_string());
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::{CommandOptions, FileSet};
    use crate::mesh::MeshMetrics;
    use crate::test_support::*;
    use tempfile::TempDir;

    /// Writes a stub file wherever `-o` points.
    const WRITES_OUTPUT: &str = "while [ $# -gt 0 ]; do\n\
        if [ \"$1\" = \"-o\" ]; then shift; echo solid > \"$1\"; fi\n\
        shift\n\
        done";

    #[test]
    fn projection_becomes_the_model_to_slice() {
        let temp = TempDir::new().unwrap();
        let script = fake_tool(temp.path(), "fake-openscad", WRITES_OUTPUT);

        let mut ctx = Context::new(temp.path().join("config"), temp.path().to_path_buf());
        ctx.options = Some(CommandOptions {
            view: "topsil".into(),
            overlays: vec!["supports".into()],
            openscad_path: Some(script.to_string_lossy().into_owned()),
            ..Default::default()
        });
        ctx.files = Some(FileSet::for_project(temp.path(), "main"));
        ctx.mesh_metrics = Some(MeshMetrics {
            xrange: (0.0, 10.0),
            yrange: (0.0, 10.0),
            zrange: (0.0, 10.0),
        });

        preview(&mut ctx, &Output::Discard, &Output::Discard).unwrap();

        let expected = temp.path().join("build/main-topsil.stl");
        assert!(expected.is_file());
        let files = ctx.files().unwrap();
        assert_eq!(files.projected_model.as_deref(), Some(expected.as_path()));
        assert_eq!(files.model_to_slice(), Some(expected.as_path()));
        assert_eq!(ctx.options().unwrap().overlays, vec!["preview", "supports"]);
    }

    #[test]
    fn unknown_view_fails_before_running() {
        let temp = TempDir::new().unwrap();
        let mut ctx = Context::new(temp.path().join("config"), temp.path().to_path_buf());
        ctx.options = Some(CommandOptions {
            view: "sideways".into(),
            openscad_path: Some("/nonexistent/openscad".into()),
            ..Default::default()
        });
        ctx.files = Some(FileSet::for_project(temp.path(), "main"));
        ctx.mesh_metrics = Some(MeshMetrics {
            xrange: (0.0, 1.0),
            yrange: (0.0, 1.0),
            zrange: (0.0, 1.0),
        });

        let err = preview(&mut ctx, &Output::Discard, &Output::Discard).unwrap_err();
        assert!(err.to_string().contains("sideways"));
        assert!(ctx.options().unwrap().overlays.is_empty());
    }
}
