//! Paths of the artifacts produced along the pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{MakeError, Result};

/// Kind of input file given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A ready mesh; no build needed.
    Stl,
    /// OpenSCAD source that must be built first.
    Scad,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("stl") => Ok(Self::Stl),
            Some("scad") => Ok(Self::Scad),
            _ => Err(MakeError::usage(
                "Unsupported file format. Supported formats are .stl and .scad",
            )),
        }
    }
}

/// Where each stage reads and writes its files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSet {
    pub build_dir: PathBuf,
    pub scad_source: Option<PathBuf>,
    pub model: Option<PathBuf>,
    pub oriented_model: Option<PathBuf>,
    pub projected_model: Option<PathBuf>,
    pub sliced_gcode: Option<PathBuf>,
    /// Rendered image per camera angle.
    pub rendered_images: BTreeMap<String, PathBuf>,
}

impl FileSet {
    /// Layout of a project directory: `src/<model>.scad` built into `build/<model>.stl`.
    pub fn for_project(project_root: &Path, model_name: &str) -> Self {
        let build_dir = project_root.join("build");
        Self {
            scad_source: Some(project_root.join("src").join(format!("{}.scad", model_name))),
            model: Some(build_dir.join(format!("{}.stl", model_name))),
            build_dir,
            ..Default::default()
        }
    }

    /// Layout for a single input file processed in a scratch `build_dir`.
    pub fn for_input_file(input: &Path, kind: InputKind, build_dir: PathBuf) -> Self {
        match kind {
            InputKind::Stl => Self {
                model: Some(input.to_path_buf()),
                build_dir,
                ..Default::default()
            },
            InputKind::Scad => Self {
                scad_source: Some(input.to_path_buf()),
                model: Some(build_dir.join("model.stl")),
                build_dir,
                ..Default::default()
            },
        }
    }

    /// Mesh used for measuring and projecting.
    pub fn model_to_project(&self) -> Option<&Path> {
        self.oriented_model.as_deref().or(self.model.as_deref())
    }

    /// Mesh handed to the slicer.
    pub fn model_to_slice(&self) -> Option<&Path> {
        self.projected_model
            .as_deref()
            .or(self.oriented_model.as_deref())
            .or(self.model.as_deref())
    }

    /// The most processed artifact of the run.
    pub fn final_output(&self) -> Option<&Path> {
        self.sliced_gcode.as_deref().or_else(|| self.model_to_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_layout() {
        let files = FileSet::for_project(Path::new("/work/widget"), "lid");

        assert_eq!(files.build_dir, Path::new("/work/widget/build"));
        assert_eq!(files.scad_source.as_deref(), Some(Path::new("/work/widget/src/lid.scad")));
        assert_eq!(files.model.as_deref(), Some(Path::new("/work/widget/build/lid.stl")));
    }

    #[test]
    fn later_stages_take_precedence() {
        let mut files = FileSet::for_project(Path::new("/p"), "main");
        assert_eq!(files.final_output(), Some(Path::new("/p/build/main.stl")));

        files.projected_model = Some(PathBuf::from("/p/build/main-3sil.stl"));
        assert_eq!(files.model_to_project(), Some(Path::new("/p/build/main.stl")));
        assert_eq!(files.model_to_slice(), Some(Path::new("/p/build/main-3sil.stl")));

        files.sliced_gcode = Some(PathBuf::from("/p/build/p-main-3sil.gcode"));
        assert_eq!(files.final_output(), Some(Path::new("/p/build/p-main-3sil.gcode")));
    }

    #[test]
    fn scad_input_builds_into_scratch_dir() {
        let kind = InputKind::from_path(Path::new("Gear.SCAD")).unwrap();
        let files = FileSet::for_input_file(Path::new("Gear.SCAD"), kind, PathBuf::from("/tmp/b"));

        assert_eq!(kind, InputKind::Scad);
        assert_eq!(files.model.as_deref(), Some(Path::new("/tmp/b/model.stl")));
    }

    #[test]
    fn unsupported_input_is_a_usage_error() {
        let err = InputKind::from_path(Path::new("part.obj")).unwrap_err();
        assert!(matches!(err, MakeError::Usage { .. }));
    }
}
