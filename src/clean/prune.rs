//! Loose element pruning.
//!
//! Deletes geometry nothing else references: vertices with no incident
//! edges and edges with no incident faces. Removing a loose edge can
//! orphan its endpoints, so the pass iterates until nothing more can be
//! removed.
//!
//! Faces are preserved by default. With `prune_faces` enabled, faces with
//! no edge shared with another face are removed first (one pass over the
//! initial state), and the edges and vertices they strand are then picked
//! up by the fixed-point loop.

use crate::mesh::Mesh;

/// Counts of loose elements removed by [`prune_loose`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneCounts {
    /// Vertices removed (no incident edges).
    pub vertices: usize,
    /// Edges removed (no incident faces).
    pub edges: usize,
    /// Faces removed (no edge shared with another face); zero unless
    /// face pruning was requested.
    pub faces: usize,
}

/// Remove loose vertices and edges, and optionally loose faces.
///
/// Runs to a fixed point: afterwards no vertex has zero incident edges
/// and no edge has zero incident faces. When `prune_faces` is false,
/// faces are never removed regardless of any defect.
pub fn prune_loose(mesh: &mut Mesh, prune_faces: bool) -> PruneCounts {
    let mut counts = PruneCounts::default();

    if prune_faces {
        // Loose faces are judged against the initial state, then removed
        // together, matching delete-loose semantics
        let loose: Vec<_> = mesh
            .face_ids()
            .filter(|&f| {
                mesh.face_edges(f)
                    .iter()
                    .all(|&e| mesh.edge_face_count(e) <= 1)
            })
            .collect();
        for f in loose {
            mesh.remove_face(f);
            counts.faces += 1;
        }
    }

    loop {
        let loose_edges: Vec<_> = mesh
            .edge_ids()
            .filter(|&e| mesh.edge_face_count(e) == 0)
            .collect();
        for e in &loose_edges {
            mesh.remove_edge(*e);
        }
        counts.edges += loose_edges.len();

        let loose_vertices: Vec<_> = mesh
            .vertex_ids()
            .filter(|&v| mesh.vertex_edge_count(v) == 0)
            .collect();
        for v in &loose_vertices {
            mesh.remove_vertex(*v);
        }
        counts.vertices += loose_vertices.len();

        if loose_edges.is_empty() && loose_vertices.is_empty() {
            break;
        }
    }

    counts
}
