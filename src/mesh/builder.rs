//! Mesh construction utilities.
//!
//! This module provides functions for building incidence meshes from the
//! indexed face-vertex form commonly found in mesh file formats, and for
//! converting back.
//!
//! Construction validates referential closure only: every face loop and
//! line element must reference an existing vertex. Degenerate geometry
//! (repeated loop vertices, zero-length edges, coincident positions) is
//! accepted as-is; resolving it is the cleanup pipeline's job.

use nalgebra::Point3;

use super::incidence::Mesh;
use super::index::VertexId;
use crate::error::{MeshError, Result};

/// Build an incidence mesh from vertex positions, polygon face loops, and
/// loose line segments.
///
/// # Arguments
/// * `positions` - List of vertex positions
/// * `faces` - List of face loops, each an ordered cycle of ≥3 vertex indices
/// * `lines` - List of wireframe edges as [v0, v1] index pairs
///
/// # Returns
/// A mesh, or an error if any element references a vertex that does not
/// exist or a face loop is shorter than 3.
///
/// # Example
/// ```
/// use swarf::mesh::{Mesh, build_from_polygons};
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3]];
///
/// let mesh: Mesh = build_from_polygons(&positions, &faces, &[]).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.num_edges(), 4);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_polygons(
    positions: &[Point3<f64>],
    faces: &[Vec<usize>],
    lines: &[[usize; 2]],
) -> Result<Mesh> {
    // Validate references before mutating anything
    for (fi, face) in faces.iter().enumerate() {
        if face.len() < 3 {
            return Err(MeshError::FaceTooShort {
                face: fi,
                len: face.len(),
            });
        }
        for &vi in face {
            if vi >= positions.len() {
                return Err(MeshError::InvalidVertexIndex {
                    element: "face",
                    index: fi,
                    vertex: vi,
                });
            }
        }
    }
    for (li, line) in lines.iter().enumerate() {
        for &vi in line {
            if vi >= positions.len() {
                return Err(MeshError::InvalidVertexIndex {
                    element: "line",
                    index: li,
                    vertex: vi,
                });
            }
        }
    }

    let mut mesh = Mesh::new();

    let vertex_ids: Vec<VertexId> = positions.iter().map(|&pos| mesh.add_vertex(pos)).collect();

    for face in faces {
        let cycle: Vec<VertexId> = face.iter().map(|&vi| vertex_ids[vi]).collect();
        mesh.add_face(&cycle);
    }

    for &[a, b] in lines {
        mesh.add_edge(vertex_ids[a], vertex_ids[b]);
    }

    Ok(mesh)
}

/// Convert a mesh back to the indexed face-vertex form.
///
/// Returns (positions, face loops, loose lines). Vertices are emitted in
/// ascending id order and faces reference them by their position in that
/// order. Only edges with no incident face appear in the line list; all
/// other edges are implied by the face loops.
pub fn to_polygons(mesh: &Mesh) -> (Vec<Point3<f64>>, Vec<Vec<usize>>, Vec<[usize; 2]>) {
    let mut positions = Vec::with_capacity(mesh.num_vertices());
    let mut remap = std::collections::HashMap::with_capacity(mesh.num_vertices());

    for v in mesh.vertex_ids() {
        remap.insert(v, positions.len());
        positions.push(*mesh.position(v));
    }

    let faces: Vec<Vec<usize>> = mesh
        .face_ids()
        .map(|f| mesh.face_cycle(f).iter().map(|v| remap[v]).collect())
        .collect();

    let lines: Vec<[usize; 2]> = mesh
        .edge_ids()
        .filter(|&e| mesh.edge_face_count(e) == 0)
        .map(|e| {
            let [a, b] = mesh.edge_endpoints(e);
            [remap[&a], remap[&b]]
        })
        .collect();

    (positions, faces, lines)
}
