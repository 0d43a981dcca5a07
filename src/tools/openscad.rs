//! OpenSCAD command lines for building, projecting and rendering.

use std::path::Path;

use super::{Tool, ToolInvocation};
use crate::config::CommandOptions;
use crate::error::{MakeError, Result};
use crate::mesh::MeshMetrics;

/// OpenSCAD reads `-D` code from the command line, so the input file can be empty.
#[cfg(windows)]
const NULL_INPUT: &str = "NUL";
#[cfg(not(windows))]
const NULL_INPUT: &str = "/dev/null";

const SILHOUETTE_PRELUDE: &str = "HEIGHT = .6; SPACING = 10; \
    module model() { translate([-x_mid, -y_mid, -z_mid]) import(stl_file); }";

/// Flat projection views available to `preview`, with the code extruding them.
///
/// The code receives `stl_file`, `x_mid`, `y_mid`, `z_mid`, `x_size`,
/// `y_size` and `z_size`.
pub const PROJECTIONS: &[(&str, &str)] = &[
    (
        "3sil",
        "linear_extrude(HEIGHT) { \
            translate([0, y_size/2 + z_size/2 + SPACING, 0]) projection() model(); \
            translate([-x_size/2 - y_size/2 - SPACING, 0, 0]) projection() rotate([-90, 90, 0]) model(); \
            projection() rotate([-90, 0, 0]) model(); \
        }",
    ),
    ("topsil", "linear_extrude(HEIGHT) { projection() model(); }"),
    ("leftsil", "linear_extrude(HEIGHT) { projection() rotate([-90, 90, 0]) model(); }"),
    ("rightsil", "linear_extrude(HEIGHT) { projection() rotate([-90, -90, 0]) model(); }"),
    ("frontsil", "linear_extrude(HEIGHT) { projection() rotate([-90, 0, 0]) model(); }"),
    ("backsil", "linear_extrude(HEIGHT) { projection() rotate([-90, 180, 0]) model(); }"),
];

/// Camera directions for `image`, as (name, eye offset from the model center).
pub const VIEWPOINTS: &[(&str, [f64; 3])] = &[
    ("left", [-1.0, 0.0, 0.0]),
    ("right", [1.0, 0.0, 0.0]),
    ("back", [0.0, 1.0, 0.0]),
    ("front", [0.0, -1.0, 0.0]),
    ("bottom", [0.0, 0.0, -1.0]),
    ("top", [0.0, 0.0, 1.0]),
    ("iso_front_left", [-1.0, -1.0, 1.0]),
    ("iso_front_right", [1.0, -1.0, 1.0]),
    ("iso_back_left", [1.0, 1.0, 1.0]),
    ("iso_back_right", [-1.0, 1.0, 1.0]),
];

/// Image color schemes and the OpenSCAD scheme each maps to.
pub const COLORSCHEMES: &[(&str, &str)] = &[
    ("slicer_light", "Tomorrow"),
    ("slicer_dark", "Tomorrow Night"),
    ("light_on_dark", "Metallic"),
];

fn lookup<'a, T>(table: &'a [(&str, T)], kind: &str, key: &str) -> Result<&'a T> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value)
        .ok_or_else(|| {
            let choices: Vec<&str> = table.iter().map(|(name, _)| *name).collect();
            MakeError::ConfigValidationError {
                message: format!(
                    "The {} '{}' does not exist. Choose one of: {}",
                    kind,
                    key,
                    choices.join(", ")
                ),
            }
        })
}

/// Quote a path as an OpenSCAD string literal.
fn scad_string(path: &Path) -> String {
    let text = path.to_string_lossy();
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn geometry_defines(model: &Path, metrics: &MeshMetrics) -> Vec<String> {
    let mid = metrics.midpoints();
    let size = metrics.sizes();
    vec![
        format!("stl_file={};", scad_string(model)),
        format!("x_mid={:.2};", mid.x),
        format!("y_mid={:.2};", mid.y),
        format!("z_mid={:.2};", mid.z),
        format!("x_size={:.2};", size.x),
        format!("y_size={:.2};", size.y),
        format!("z_size={:.2};", size.z),
    ]
}

fn defines(invocation: ToolInvocation, defines: impl IntoIterator<Item = String>) -> ToolInvocation {
    defines
        .into_iter()
        .fold(invocation, |inv, define| inv.arg("-D").arg(define))
}

/// Compile `source` into a binary STL at `model`.
pub fn build_invocation(options: &CommandOptions, source: &Path, model: &Path) -> ToolInvocation {
    // --quiet would hide warnings too.
    let mut invocation = ToolInvocation::new(Tool::OpenScad, options)
        .args(["--export-format", "binstl", "-o"])
        .arg(model);
    if options.strict_warnings {
        invocation = invocation.arg("--hardwarnings");
    }
    invocation.arg(source)
}

/// Extrude a flat projection of `model` for `view` into `output`.
pub fn projection_invocation(
    options: &CommandOptions,
    view: &str,
    model: &Path,
    metrics: &MeshMetrics,
    output: &Path,
) -> Result<ToolInvocation> {
    let code = lookup(PROJECTIONS, "preview view", view)?;

    let invocation = ToolInvocation::new(Tool::OpenScad, options)
        .args(["--quiet", "--hardwarnings", "--export-format", "binstl", "-o"])
        .arg(output);
    let invocation = defines(invocation, geometry_defines(model, metrics));
    Ok(defines(invocation, [format!("{} {}", SILHOUETTE_PRELUDE, code)]).arg(NULL_INPUT))
}

/// Render `model` from the `angle` viewpoint into a PNG at `output`.
pub fn image_invocation(
    options: &CommandOptions,
    angle: &str,
    model: &Path,
    metrics: &MeshMetrics,
    output: &Path,
) -> Result<ToolInvocation> {
    let direction = lookup(VIEWPOINTS, "viewpoint angle", angle)?;
    let scheme = lookup(COLORSCHEMES, "color scheme", &options.colorscheme)?;
    let (width, height) = options.image_dimensions().ok_or_else(|| MakeError::ConfigValidationError {
        message: format!("image_size must look like 1080x720, got '{}'", options.image_size),
    })?;

    let center = metrics.midpoints();
    let distance = metrics.max_size().max(1.0) * 3.0;
    let camera = format!(
        "--camera={:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
        center.x + direction[0] * distance,
        center.y + direction[1] * distance,
        center.z + direction[2] * distance,
        center.x,
        center.y,
        center.z
    );

    let invocation = ToolInvocation::new(Tool::OpenScad, options)
        .args(["--quiet", "--export-format", "png", "-o"])
        .arg(output)
        .arg(camera)
        .arg("--viewall")
        .arg(format!("--imgsize={},{}", width, height))
        .arg(format!("--colorscheme={}", scheme));
    let invocation = defines(
        invocation,
        [
            format!("stl_file={};", scad_string(model)),
            "import(stl_file);".to_string(),
        ],
    );
    Ok(invocation.arg(NULL_INPUT))
}

/// Check image settings before any rendering starts.
pub fn validate_image_options(options: &CommandOptions) -> Result<()> {
    lookup(COLORSCHEMES, "color scheme", &options.colorscheme)?;
    for angle in &options.image_angles {
        lookup(VIEWPOINTS, "viewpoint angle", angle)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn metrics() -> MeshMetrics {
        MeshMetrics {
            xrange: (0.0, 20.0),
            yrange: (-5.0, 5.0),
            zrange: (0.0, 3.0),
        }
    }

    #[test]
    fn build_adds_hardwarnings_when_strict() {
        let mut options = CommandOptions::default();
        let src = PathBuf::from("src/main.scad");
        let model = PathBuf::from("build/main.stl");

        let relaxed = build_invocation(&options, &src, &model).display_args();
        assert_eq!(relaxed, vec!["--export-format", "binstl", "-o", "build/main.stl", "src/main.scad"]);

        options.strict_warnings = true;
        let strict = build_invocation(&options, &src, &model).display_args();
        assert!(strict.contains(&"--hardwarnings".to_string()));
        assert_eq!(strict.last().map(String::as_str), Some("src/main.scad"));
    }

    #[test]
    fn projection_passes_geometry() {
        let options = CommandOptions::default();
        let args = projection_invocation(
            &options,
            "topsil",
            Path::new("build/main.stl"),
            &metrics(),
            Path::new("build/main-topsil.stl"),
        )
        .unwrap()
        .display_args();

        assert!(args.contains(&"stl_file=\"build/main.stl\";".to_string()));
        assert!(args.contains(&"x_mid=10.00;".to_string()));
        assert!(args.contains(&"y_size=10.00;".to_string()));
        assert!(args.iter().any(|a| a.contains("projection() model();")));
        assert_eq!(args.last().map(String::as_str), Some(NULL_INPUT));
    }

    #[test]
    fn unknown_view_is_rejected() {
        let err = projection_invocation(
            &CommandOptions::default(),
            "sideways",
            Path::new("m.stl"),
            &metrics(),
            Path::new("o.stl"),
        )
        .unwrap_err();

        assert!(err.to_string().contains("'sideways' does not exist"));
    }

    #[test]
    fn image_uses_scheme_and_size() {
        let options = CommandOptions {
            colorscheme: "slicer_dark".into(),
            image_size: "640x480".into(),
            ..Default::default()
        };
        let args = image_invocation(&options, "top", Path::new("m.stl"), &metrics(), Path::new("m-top.png"))
            .unwrap()
            .display_args();

        assert!(args.contains(&"--colorscheme=Tomorrow Night".to_string()));
        assert!(args.contains(&"--imgsize=640,480".to_string()));
        assert!(args.contains(&"--camera=10.00,0.00,61.50,10.00,0.00,1.50".to_string()));
    }

    #[test]
    fn paths_are_escaped_for_scad() {
        assert_eq!(scad_string(Path::new(r#"a\b"c.stl"#)), r#""a\\b\"c.stl""#);
    }

    #[test]
    fn image_options_are_validated() {
        let mut options = CommandOptions::default();
        assert!(validate_image_options(&options).is_ok());

        options.image_angles.push("diagonal".into());
        assert!(validate_image_options(&options).is_err());
    }
}
