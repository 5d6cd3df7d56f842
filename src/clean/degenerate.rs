//! Degenerate geometry dissolution.
//!
//! Removes the topologically invalid leftovers of vertex merging:
//! zero-length edges (equal endpoints) and faces whose cycle no longer
//! spans three distinct vertices. Face cycles that are salvageable have
//! their repeated consecutive vertices collapsed instead of losing the
//! whole face.
//!
//! Merely-unused elements (edges with no faces, vertices with no edges)
//! are not touched here; that is the loose-element pruner's job.

use std::collections::BTreeSet;

use crate::mesh::{Mesh, VertexId};

/// Remove degenerate edges and faces.
///
/// Runs after vertex deduplication, which is the primary source of
/// degeneracies. Returns `(edges_removed, faces_removed)`.
pub fn dissolve_degenerate(mesh: &mut Mesh) -> (usize, usize) {
    let mut faces_removed = 0;

    // Normalize face cycles first so zero-length edges lose their faces
    for f in mesh.face_ids().collect::<Vec<_>>() {
        let cycle = mesh.face_cycle(f).to_vec();
        let collapsed = collapse_consecutive(&cycle);
        let distinct: BTreeSet<VertexId> = collapsed.iter().copied().collect();

        if collapsed.len() < 3 || distinct.len() < 3 {
            mesh.remove_face(f);
            faces_removed += 1;
        } else if collapsed != cycle {
            mesh.replace_face_cycle(f, collapsed);
        }
    }

    let mut edges_removed = 0;
    for e in mesh.edge_ids().collect::<Vec<_>>() {
        let [a, b] = mesh.edge_endpoints(e);
        if a == b {
            mesh.remove_edge(e);
            edges_removed += 1;
        }
    }

    (edges_removed, faces_removed)
}

/// Collapse repeated consecutive vertices of a cycle, treating it as
/// cyclic (the last entry may repeat the first).
fn collapse_consecutive(cycle: &[VertexId]) -> Vec<VertexId> {
    let mut out: Vec<VertexId> = Vec::with_capacity(cycle.len());
    for &v in cycle {
        if out.last() != Some(&v) {
            out.push(v);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;
    use nalgebra::Point3;

    fn positions(n: usize) -> Vec<Point3<f64>> {
        // Distinct positions on a parabola so nothing merges by accident
        (0..n)
            .map(|i| Point3::new(i as f64, (i * i) as f64, 0.0))
            .collect()
    }

    #[test]
    fn test_collapse_consecutive() {
        let v: Vec<VertexId> = [0, 0, 1, 2, 2, 0].iter().map(|&i| VertexId::new(i)).collect();
        let collapsed = collapse_consecutive(&v);
        let expected: Vec<VertexId> = [0, 1, 2].iter().map(|&i| VertexId::new(i)).collect();
        assert_eq!(collapsed, expected);
    }

    #[test]
    fn test_repeated_vertex_face_normalized() {
        let mut mesh = build_from_polygons(&positions(4), &[vec![0, 0, 1, 2, 3]], &[]).unwrap();
        assert!(mesh.edge_between(VertexId::new(0), VertexId::new(0)).is_some());

        let (edges, faces) = dissolve_degenerate(&mut mesh);
        assert_eq!(edges, 1); // the (0,0) self-loop
        assert_eq!(faces, 0);
        assert_eq!(mesh.face_cycle(mesh.face_ids().next().unwrap()).len(), 4);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_two_distinct_vertices_face_removed() {
        let mut mesh = build_from_polygons(&positions(2), &[vec![0, 1, 0, 1]], &[]).unwrap();

        let (_, faces) = dissolve_degenerate(&mut mesh);
        assert_eq!(faces, 1);
        assert_eq!(mesh.num_faces(), 0);
        // The 0-1 edge is merely unused now, and pruning is not this
        // pass's job
        assert_eq!(mesh.num_edges(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_collapsed_triangle_removed() {
        let mut mesh = build_from_polygons(&positions(2), &[vec![0, 0, 1]], &[]).unwrap();

        let (edges, faces) = dissolve_degenerate(&mut mesh);
        assert_eq!(faces, 1);
        assert_eq!(edges, 1);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_wrap_around_duplicate() {
        // Last cycle entry repeats the first; cyclically that is one
        // consecutive duplicate
        let mut mesh = build_from_polygons(&positions(3), &[vec![0, 1, 2, 0]], &[]).unwrap();

        let (edges, faces) = dissolve_degenerate(&mut mesh);
        assert_eq!(faces, 0);
        assert_eq!(edges, 1);
        assert_eq!(
            mesh.face_cycle(mesh.face_ids().next().unwrap()),
            &[VertexId::new(0), VertexId::new(1), VertexId::new(2)]
        );
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_clean_mesh_untouched() {
        let mut mesh =
            build_from_polygons(&positions(3), &[vec![0, 1, 2]], &[[0, 1]]).unwrap();

        let (edges, faces) = dissolve_degenerate(&mut mesh);
        assert_eq!((edges, faces), (0, 0));
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_edges(), 3);
    }

    #[test]
    fn test_idempotent() {
        let mut mesh = build_from_polygons(&positions(4), &[vec![0, 0, 1, 2, 3]], &[]).unwrap();
        dissolve_degenerate(&mut mesh);
        let (edges, faces) = dissolve_degenerate(&mut mesh);
        assert_eq!((edges, faces), (0, 0));
    }
}
