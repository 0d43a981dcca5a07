//! The built-in actions, registered in canonical order.

mod build;
mod connect;
mod edit;
mod help;
mod image;
mod listing;
mod measure;
mod preview;
mod print;
mod project;
mod slice;

use std::path::Path;

use super::catalog::{Action, ActionCatalog};
use crate::error::Result;
use crate::stream::{should_print_openscad_log, Output, StreamMux};
use crate::tools::ToolInvocation;

pub use project::create_project;

impl ActionCatalog {
    /// Every action the command line offers.
    pub fn builtin() -> Self {
        let mut catalog = ActionCatalog::new();
        catalog
            .register(Action::isolated("help", "Display this message", help::help))
            .register(Action::isolated(
                "version",
                "Print the version and configuration paths",
                help::version,
            ))
            .register(Action::isolated(
                "new",
                "Create a new project skeleton",
                project::new_project,
            ))
            .register(
                Action::isolated("list-profiles", "List available printer profiles", listing::list_profiles)
                    .needs_options(),
            )
            .register(
                Action::isolated(
                    "list-overlays",
                    "List available slicer setting overlays",
                    listing::list_overlays,
                )
                .needs_options(),
            )
            .register(
                Action::isolated(
                    "edit-global-config",
                    "Edit the global settings file (default printer, print server, ...)",
                    edit::edit_global_config,
                )
                .needs_options(),
            )
            .register(
                Action::isolated(
                    "edit-model",
                    "Open the model's OpenSCAD source in your editor (affected by -m)",
                    edit::edit_model,
                )
                .needs_options(),
            )
            .register(
                Action::isolated(
                    "edit-profile",
                    "Open the printer profile in your editor (affected by -p)",
                    edit::edit_profile,
                )
                .needs_options(),
            )
            .register(
                Action::isolated(
                    "edit-profile-gcode",
                    "Edit a G-code script of the printer profile (affected by -p)",
                    edit::edit_profile_gcode,
                )
                .needs_options(),
            )
            .register(
                Action::isolated(
                    "edit-overlay",
                    "Open a slicer overlay in your editor (affected by -o)",
                    edit::edit_overlay,
                )
                .needs_options(),
            )
            .register(
                Action::isolated(
                    "test-connect",
                    "Test the connection to the configured print server",
                    connect::test_connect,
                )
                .needs_options(),
            )
            .register(Action::pipeline(
                "build",
                "Build the OpenSCAD model and produce an STL file",
                build::build,
            ))
            .register(Action::internal("measure-model", measure::measure_model))
            .register(
                Action::pipeline(
                    "info",
                    "Print basic dimensional info about the model",
                    measure::info,
                )
                .gerund("examining")
                .implies(&["measure-model"]),
            )
            .register(
                Action::pipeline(
                    "preview",
                    "Produce a flat 2-D projection of the model for quick printing",
                    preview::preview,
                )
                .gerund("preparing preview")
                .implies(&["measure-model"]),
            )
            .register(
                Action::pipeline(
                    "slice",
                    "Slice the model and produce a printable G-code file",
                    slice::slice,
                )
                .gerund("slicing"),
            )
            .register(
                Action::pipeline(
                    "image",
                    "Export rendered images of the model (affected by -a)",
                    image::image,
                )
                .gerund("imaging")
                .implies(&["measure-model"])
                .last_in_chain(),
            )
            .register(
                Action::pipeline(
                    "print",
                    "Send the sliced model to OctoPrint",
                    print::print,
                )
                .implies(&["slice"]),
            );
        catalog
    }
}

/// Run OpenSCAD with its stderr log filtered down to warnings and errors.
///
/// In debug mode the log is passed through untouched.
fn run_openscad(invocation: &ToolInvocation, debug: bool, out: &Output, debug_out: &Output) -> Result<()> {
    if debug {
        return invocation.run(debug_out.stdio()?, out.stdio()?);
    }

    let filter = StreamMux::filter(out.as_sink()?, should_print_openscad_log, None)?;
    let result = invocation.run(debug_out.stdio()?, filter.stdio()?);
    filter.close();
    result
}

/// File stem as an owned string.
fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}
