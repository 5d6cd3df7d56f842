//! # Swarf
//!
//! A mesh cleanup library and command-line tool.
//!
//! Swarf removes the debris that accumulates in polygon meshes during
//! modeling: duplicate vertices, zero-length edges, collapsed faces, loose
//! geometry, and two-edged vertices left behind by edge subdivision. The
//! passes run as one deterministic pipeline and report exactly what they
//! removed.
//!
//! ## Pipeline
//!
//! 1. **Merge doubles**: vertices within a distance threshold collapse
//!    into one, with all edges and faces rewired
//! 2. **Dissolve degenerates**: zero-length edges and faces with fewer
//!    than three distinct vertices are removed
//! 3. **Prune loose elements**: edges with no faces and vertices with no
//!    edges are deleted (faces are preserved unless asked otherwise)
//! 4. **Dissolve two-edged vertices**: near-collinear vertices with
//!    exactly two incident edges collapse, merging their edges
//!
//! ## Quick Start
//!
//! ```no_run
//! use swarf::prelude::*;
//!
//! // Load a mesh
//! let mut mesh = swarf::io::load("model.obj").unwrap();
//!
//! // Clean it up
//! let report = cleanup(&mut mesh, &CleanupOptions::default()).unwrap();
//! println!("{}", report);
//!
//! // Save the result
//! swarf::io::save(&mesh, "output.obj").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use swarf::prelude::*;
//! use nalgebra::Point3;
//!
//! // Two triangles that should share a corner, except the second one
//! // references a stray duplicate of it
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 1.0, 1e-6),
//!     Point3::new(-0.5, 1.0, 0.0),
//! ];
//! let faces = vec![vec![0, 1, 2], vec![0, 3, 4]];
//!
//! let mut mesh = build_from_polygons(&positions, &faces, &[]).unwrap();
//! let report = cleanup(&mut mesh, &CleanupOptions::default()).unwrap();
//!
//! assert_eq!(report.vertices_merged, 1);
//! assert_eq!(mesh.num_vertices(), 4);
//! ```
//!
//! ## Batch Processing
//!
//! Meshes are independent, so a batch cleans in parallel, with one result
//! per mesh and failures isolated:
//!
//! ```no_run
//! use swarf::prelude::*;
//!
//! let mut meshes: Vec<Mesh> = vec![/* ... */];
//! for result in cleanup_all(&mut meshes, &CleanupOptions::default()) {
//!     match result {
//!         Ok(report) => println!("{}", report),
//!         Err(e) => eprintln!("skipped: {}", e),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clean;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use swarf::prelude::*;
/// ```
pub mod prelude {
    pub use crate::clean::{
        cleanup, cleanup_all, cleanup_with_progress, CleanupOptions, CleanupReport, Progress,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, to_polygons, EdgeId, FaceId, Mesh, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
