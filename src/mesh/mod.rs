//! Core mesh data structures.
//!
//! This module provides the incidence-mesh representation the cleanup
//! passes operate on and conversions to and from the indexed face-vertex
//! interchange form used by file formats.
//!
//! # Overview
//!
//! The primary type is [`Mesh`], which stores vertices, edges, and faces in
//! id-indexed maps with explicit incidence sets: each vertex knows its
//! incident edges, each edge its incident faces, and each face stores an
//! ordered vertex cycle. This representation tolerates the states cleanup
//! exists to fix: duplicate vertices, zero-length edges, degenerate face
//! loops, wireframe edges, and isolated vertices.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe id wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`EdgeId`] - Identifies an edge
//! - [`FaceId`] - Identifies a face
//!
//! Ids are never reused after removal, so iteration in ascending id order
//! is deterministic across runs.
//!
//! # Construction
//!
//! Meshes are typically constructed from file I/O or from indexed polygon
//! lists:
//!
//! ```
//! use swarf::mesh::{Mesh, build_from_polygons};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![vec![0, 1, 2]];
//!
//! let mesh: Mesh = build_from_polygons(&positions, &faces, &[]).unwrap();
//! assert_eq!(mesh.num_vertices(), 3);
//! assert_eq!(mesh.num_faces(), 1);
//! ```

mod builder;
mod incidence;
mod index;

pub use builder::{build_from_polygons, to_polygons};
pub use incidence::{Edge, Face, Mesh, Vertex};
pub use index::{EdgeId, FaceId, VertexId};
