use std::fs;

use crate::actions::Context;
use crate::error::{MakeError, Result};
use crate::stream::Output;
use crate::tools::openscad;

pub(super) fn build(ctx: &mut Context, out: &Output, debug_out: &Output) -> Result<()> {
    let options = ctx.options()?;
    let files = ctx.files()?;

    let source = files
        .scad_source
        .as_deref()
        .ok_or_else(|| MakeError::missing("Cannot build without an OpenSCAD source file"))?;
    if !source.exists() {
        return Err(MakeError::missing(format!(
            "Source file {} does not exist",
            source.display()
        )));
    }
    let model = files
        .model
        .as_deref()
        .ok_or_else(|| MakeError::missing("No output path for the built model"))?;

    fs::create_dir_all(&files.build_dir)?;
    let invocation = openscad::build_invocation(options, source, model);
    super::run_openscad(&invocation, options.debug, out, debug_out)
}
