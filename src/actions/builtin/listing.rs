use crate::actions::Context;
use crate::config::profiles;
use crate::error::Result;
use crate::stream::Output;

pub(super) fn list_profiles(ctx: &mut Context, out: &Output, _debug: &Output) -> Result<()> {
    writeln!(out, "Available printer profiles:")?;
    for name in profiles::list_printer_profiles(&ctx.config_dir)? {
        writeln!(out, "{}", name)?;
    }
    writeln!(out)?;
    Ok(())
}

pub(super) fn list_overlays(ctx: &mut Context, out: &Output, _debug: &Output) -> Result<()> {
    writeln!(out, "Available overlays:")?;
    for overlay in profiles::list_overlays(&ctx.config_dir)? {
        match &overlay.profile {
            Some(profile) => writeln!(out, "{} (for profile {})", overlay.name, profile)?,
            None => writeln!(out, "{}", overlay.name)?,
        }
    }
    writeln!(out)?;
    Ok(())
}
