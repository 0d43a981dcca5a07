use crate::actions::catalog::ActionCatalog;
use crate::actions::Context;
use crate::error::Result;
use crate::stream::Output;

const USAGE: &str = "\
Usage: threedmake ACTIONS... [OPTIONS]... [INPUT_FILE]

Examples:
    threedmake build
    threedmake build slice --model cover --overlay supports
    threedmake info alpaca.stl
    threedmake preview alpaca.stl
    threedmake slice print alpaca.stl
";

const OPTIONS: &str = "\
Options:
    -s, --scale FACTOR      Scale by a decimal factor
    -m, --model NAME        Choose a model in a multi-model project
    -p, --profile NAME      Select a printer profile
    -o, --overlay NAME      Apply an overlay to slicer settings; can be used multiple times
    -v, --view NAME         The type of preview to produce
    -a, --angle NAME        Viewpoint (e.g. \"top\") for image export; can be used multiple times
        --colorscheme NAME  Color scheme for image export
        --image-size WxH    Image dimensions in pixels (default: 1080x720)
        --debug             Show full tool output and error details
";

/// Usage text with one line per visible action.
pub(super) fn help_text(catalog: &ActionCatalog) -> String {
    let width = catalog.visible().map(|a| a.name.len()).max().unwrap_or(0);
    let actions: String = catalog
        .visible()
        .map(|a| format!("    {:<w$}  {}\n", a.name, a.doc, w = width))
        .collect();

    format!("{}\nActions:\n{}\n{}", USAGE, actions, OPTIONS)
}

pub(super) fn help(_ctx: &mut Context, out: &Output, _debug: &Output) -> Result<()> {
    out.write_str(&help_text(&ActionCatalog::builtin()))?;
    Ok(())
}

pub(super) fn version(ctx: &mut Context, out: &Output, _debug: &Output) -> Result<()> {
    writeln!(out, "threedmake version {}", env!("CARGO_PKG_VERSION"))?;
    if let Ok(exe) = std::env::current_exe() {
        writeln!(out, "Program location: {}", exe.display())?;
    }
    writeln!(out, "Configuration dir: {}", ctx.config_dir.display())?;
    Ok(())
}
