use std::fs;
use std::path;

use tracing::debug;

use crate::actions::Context;
use crate::error::{MakeError, Result};
use crate::stream::Output;
use crate::tools::openscad;

pub(super) fn image(ctx: &mut Context, out: &Output, debug_out: &Output) -> Result<()> {
    let options = ctx.options()?;
    openscad::validate_image_options(options)?;

    let files = ctx.files()?;
    let metrics = ctx.mesh_metrics()?;
    let model = files
        .model_to_slice()
        .ok_or_else(|| MakeError::missing("There is no model to render"))?;
    let model = path::absolute(model)?;
    let stem = super::stem(&model);
    fs::create_dir_all(&files.build_dir)?;

    let mut rendered = Vec::with_capacity(options.image_angles.len());
    for angle in &options.image_angles {
        let output = files.build_dir.join(format!("{}-{}.png", stem, angle));
        let invocation = openscad::image_invocation(options, angle, &model, metrics, &output)?;
        super::run_openscad(&invocation, options.debug, out, debug_out)?;

        debug!("Rendered {} view to {}", angle, output.display());
        rendered.push((angle.clone(), output));
    }

    ctx.files_mut()?.rendered_images.extend(rendered);
    Ok(())
}
