use tracing::debug;

use crate::actions::Context;
use crate::error::{MakeError, Result};
use crate::mesh;
use crate::stream::Output;

/// Load the model once so later steps can share its mesh and bounds.
pub(super) fn measure_model(ctx: &mut Context, _out: &Output, _debug: &Output) -> Result<()> {
    let path = ctx
        .files()?
        .model_to_project()
        .ok_or_else(|| MakeError::missing("There is no model to measure"))?
        .to_path_buf();

    let (mesh, metrics) = mesh::measure(&path)?;
    debug!("Measured {}: {:?}", path.display(), metrics);

    ctx.mesh = Some(mesh);
    ctx.mesh_metrics = Some(metrics);
    Ok(())
}

pub(super) fn info(ctx: &mut Context, out: &Output, _debug: &Output) -> Result<()> {
    let metrics = ctx.mesh_metrics()?;
    let size = metrics.sizes();
    let mid = metrics.midpoints();

    writeln!(out, "Mesh size: x={:.2}, y={:.2}, z={:.2}", size.x, size.y, size.z)?;
    writeln!(out, "Mesh center: x={:.2}, y={:.2}, z={:.2}", mid.x, mid.y, mid.z)?;
    Ok(())
}
