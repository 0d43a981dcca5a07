//! The merged options record every action reads.

use serde::{Deserialize, Serialize};

/// Options merged from the global defaults, the project file and CLI flags.
///
/// Every field has a default so partial files deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandOptions {
    /// Prefix for sliced output; defaults to the project directory name.
    pub project_name: Option<String>,

    /// Model stem inside `src/` and `build/`.
    pub model_name: String,

    /// Projection used by `preview`.
    pub view: String,

    /// Printer profile, the stem of an ini file under `profiles/`.
    pub printer_profile: Option<String>,

    /// Uniform scale factor passed to the slicer.
    pub scale: f64,

    /// Slicer overlays applied on top of the profile, in order.
    pub overlays: Vec<String>,

    pub octoprint_host: Option<String>,
    pub octoprint_key: Option<String>,

    /// Start printing right after upload.
    pub auto_start_prints: bool,

    /// Show unfiltered tool output and full error chains.
    pub debug: bool,

    /// Make OpenSCAD treat warnings as errors.
    pub strict_warnings: bool,

    /// Editor command for the `edit-*` actions.
    pub editor: Option<String>,

    /// Camera angles rendered by `image`.
    pub image_angles: Vec<String>,

    pub colorscheme: String,

    /// Rendered image size as `WIDTHxHEIGHT`.
    pub image_size: String,

    /// OpenSCAD executable; looked up on `PATH` when unset.
    pub openscad_path: Option<String>,

    /// Slicer executable; looked up on `PATH` when unset.
    pub slicer_path: Option<String>,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            project_name: None,
            model_name: "main".to_string(),
            view: "3sil".to_string(),
            printer_profile: None,
            scale: 1.0,
            overlays: Vec::new(),
            octoprint_host: None,
            octoprint_key: None,
            auto_start_prints: false,
            debug: false,
            strict_warnings: false,
            editor: None,
            image_angles: vec!["iso_front_left".to_string()],
            colorscheme: "slicer_light".to_string(),
            image_size: "1080x720".to_string(),
            openscad_path: None,
            slicer_path: None,
        }
    }
}

impl CommandOptions {
    /// Parse `image_size` into pixels.
    pub fn image_dimensions(&self) -> Option<(u32, u32)> {
        let (width, height) = self.image_size.split_once(['x', 'X'])?;
        let width = width.trim().parse().ok()?;
        let height = height.trim().parse().ok()?;
        (width > 0 && height > 0).then_some((width, height))
    }
}
