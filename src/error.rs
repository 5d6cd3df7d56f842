//! Error types for swarf.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh violates referential closure: an edge or face references
    /// an entity that does not exist, or incidence sets are inconsistent.
    #[error("malformed mesh: {entity}: {detail}")]
    MalformedMesh {
        /// The offending entity, e.g. `E(12)` or `F(3)`.
        entity: String,
        /// Description of the violation.
        detail: String,
    },

    /// A face or line element references a vertex index outside the mesh.
    #[error("{element} {index} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The element kind ("face" or "line").
        element: &'static str,
        /// The element index.
        index: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face loop has fewer than three entries.
    #[error("face {face} has only {len} vertices (minimum is 3)")]
    FaceTooShort {
        /// The face index.
        face: usize,
        /// Number of loop entries.
        len: usize,
    },

    /// A cleanup pass left the mesh with broken referential closure.
    ///
    /// This indicates an implementation defect, not bad input.
    #[error("invariant broken after {stage} stage: {source}")]
    StageInvariant {
        /// Name of the pass that broke the invariant.
        stage: &'static str,
        /// The underlying closure violation.
        #[source]
        source: Box<MeshError>,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Wrap a closure violation as a stage-invariant defect.
    pub fn stage_invariant(stage: &'static str, source: MeshError) -> Self {
        MeshError::StageInvariant {
            stage,
            source: Box::new(source),
        }
    }
}
