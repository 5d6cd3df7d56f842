//! Mesh file I/O.
//!
//! This module provides functions for loading and saving meshes in various formats.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | Polygon faces and loose edges (`l`) |
//! | STL | `.stl` | ✓ | ✓ | Triangles only; loose geometry dropped on save |
//! | PLY | `.ply` | ✓ | ✓ | Polygon faces; edge elements for loose edges |
//!
//! Loaders accept the dirty meshes cleanup exists for: duplicate vertices,
//! degenerate face loops, wireframe edges, and isolated vertices all load
//! without error. Only dangling references (a face or line naming a vertex
//! that does not exist) are rejected.
//!
//! # Usage
//!
//! The easiest way to load and save meshes is using the automatic format detection:
//!
//! ```no_run
//! use swarf::io::{load, save};
//! use swarf::mesh::Mesh;
//!
//! // Load with automatic format detection
//! let mesh: Mesh = load("model.obj").unwrap();
//!
//! // Save with automatic format detection
//! save(&mesh, "output.stl").unwrap();
//! ```
//!
//! You can also use format-specific functions:
//!
//! ```no_run
//! use swarf::io::obj;
//! use swarf::mesh::Mesh;
//!
//! let mesh: Mesh = obj::load("model.obj").unwrap();
//! obj::save(&mesh, "output.obj").unwrap();
//! ```

pub mod obj;
pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

/// Load a mesh from a file with automatic format detection.
///
/// The format is determined by the file extension.
///
/// # Example
///
/// ```no_run
/// use swarf::io::load;
/// use swarf::mesh::Mesh;
///
/// let mesh: Mesh = load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    match format {
        Format::Obj => obj::load(path),
        Format::Stl => stl::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Save a mesh to a file with automatic format detection.
///
/// The format is determined by the file extension.
///
/// # Example
///
/// ```no_run
/// use swarf::io::save;
/// use swarf::mesh::Mesh;
///
/// let mesh = Mesh::new();
/// save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    match format {
        Format::Obj => obj::save(mesh, path),
        Format::Stl => stl::save(mesh, path),
        Format::Ply => ply::save(mesh, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_extension("obj"), Some(Format::Obj));
        assert_eq!(Format::from_extension("OBJ"), Some(Format::Obj));
        assert_eq!(Format::from_extension("stl"), Some(Format::Stl));
        assert_eq!(Format::from_extension("ply"), Some(Format::Ply));
        assert_eq!(Format::from_extension("gltf"), None);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path("models/bunny.obj"), Some(Format::Obj));
        assert_eq!(Format::from_path("noextension"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load("mesh.xyz").unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { .. }));
    }
}
