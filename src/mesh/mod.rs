//! STL loading and bounding-box metrics.

use std::fs::File;
use std::path::Path;

use stl_io::IndexedMesh;
use tracing::debug;

use crate::error::{MakeError, Result};

/// A point or extent along the three axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Axis-aligned bounds of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMetrics {
    pub xrange: (f64, f64),
    pub yrange: (f64, f64),
    pub zrange: (f64, f64),
}

impl MeshMetrics {
    /// Bounds of every vertex in `mesh`; `None` for an empty mesh.
    pub fn from_mesh(mesh: &IndexedMesh) -> Option<Self> {
        let mut vertices = mesh.vertices.iter();
        let first = vertices.next()?;
        let start = |axis: usize| (first[axis] as f64, first[axis] as f64);
        let mut ranges = [start(0), start(1), start(2)];

        for vertex in vertices {
            for (axis, range) in ranges.iter_mut().enumerate() {
                let value = vertex[axis] as f64;
                range.0 = range.0.min(value);
                range.1 = range.1.max(value);
            }
        }

        Some(Self {
            xrange: ranges[0],
            yrange: ranges[1],
            zrange: ranges[2],
        })
    }

    pub fn sizes(&self) -> Vec3 {
        Vec3 {
            x: self.xrange.1 - self.xrange.0,
            y: self.yrange.1 - self.yrange.0,
            z: self.zrange.1 - self.zrange.0,
        }
    }

    pub fn midpoints(&self) -> Vec3 {
        Vec3 {
            x: (self.xrange.0 + self.xrange.1) / 2.0,
            y: (self.yrange.0 + self.yrange.1) / 2.0,
            z: (self.zrange.0 + self.zrange.1) / 2.0,
        }
    }

    /// Largest extent along any axis.
    pub fn max_size(&self) -> f64 {
        let sizes = self.sizes();
        sizes.x.max(sizes.y).max(sizes.z)
    }
}

/// Read an ASCII or binary STL file.
pub fn load_mesh(path: &Path) -> Result<IndexedMesh> {
    debug!("Loading mesh from {}", path.display());

    let mut file = File::open(path).map_err(|e| {
        MakeError::missing(format!("Could not open model {}: {}", path.display(), e))
    })?;
    let mesh = stl_io::read_stl(&mut file)
        .map_err(|e| anyhow::anyhow!("Failed to parse STL file {}: {}", path.display(), e))?;

    debug!("Mesh has {} faces", mesh.faces.len());
    Ok(mesh)
}

/// Load a mesh and compute its metrics in one go.
pub fn measure(path: &Path) -> Result<(IndexedMesh, MeshMetrics)> {
    let mesh = load_mesh(path)?;
    let metrics = MeshMetrics::from_mesh(&mesh)
        .ok_or_else(|| MakeError::missing(format!("Model {} has no geometry", path.display())))?;
    Ok((mesh, metrics))
}
