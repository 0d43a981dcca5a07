//! State threaded through every action of one run.

use std::path::PathBuf;

use stl_io::IndexedMesh;

use crate::config::{CommandOptions, FileSet};
use crate::error::{MakeError, Result};
use crate::mesh::MeshMetrics;

/// Mutable record shared by the steps of one invocation.
///
/// Steps run one at a time, so no locking is needed. Upstream steps fill
/// slots (the mesh, its metrics, artifact paths) that later steps read.
#[derive(Debug)]
pub struct Context {
    pub config_dir: PathBuf,
    pub working_dir: PathBuf,
    pub options: Option<CommandOptions>,
    pub files: Option<FileSet>,
    /// Overlays given with `--overlay`, kept apart from the merged options.
    pub explicit_overlay_arg: Vec<String>,
    /// Whether prompts may be shown.
    pub interactive: bool,
    pub mesh: Option<IndexedMesh>,
    pub mesh_metrics: Option<MeshMetrics>,
}

impl Context {
    pub fn new(config_dir: PathBuf, working_dir: PathBuf) -> Self {
        Self {
            config_dir,
            working_dir,
            options: None,
            files: None,
            explicit_overlay_arg: Vec::new(),
            interactive: false,
            mesh: None,
            mesh_metrics: None,
        }
    }

    pub fn options(&self) -> Result<&CommandOptions> {
        self.options
            .as_ref()
            .ok_or_else(|| MakeError::missing("Options have not been loaded"))
    }

    pub fn options_mut(&mut self) -> Result<&mut CommandOptions> {
        self.options
            .as_mut()
            .ok_or_else(|| MakeError::missing("Options have not been loaded"))
    }

    pub fn files(&self) -> Result<&FileSet> {
        self.files.as_ref().ok_or_else(|| {
            MakeError::missing("Must either specify an input file or run in a 3dmake project directory")
        })
    }

    pub fn files_mut(&mut self) -> Result<&mut FileSet> {
        self.files.as_mut().ok_or_else(|| {
            MakeError::missing("Must either specify an input file or run in a 3dmake project directory")
        })
    }

    pub fn mesh_metrics(&self) -> Result<&MeshMetrics> {
        self.mesh_metrics
            .as_ref()
            .ok_or_else(|| MakeError::missing("The model has not been measured"))
    }

    /// Whether debug output was requested.
    pub fn debug(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.debug)
    }
}
