//! Two-edged vertex dissolution (limited dissolve).
//!
//! A vertex with exactly two incident edges subdivides what is
//! geometrically a single edge. When the two edge directions deviate from
//! collinear by no more than the tolerance, the vertex is dissolved: its
//! two edges merge into one spanning its former neighbors, and every face
//! cycle passing through it drops the vertex.
//!
//! Candidates are processed in ascending vertex-id order from a worklist.
//! Dissolving a vertex can change its neighbors' edge counts, so neighbors
//! are re-queued and re-evaluated; the pass runs to a fixed point and a
//! second run removes nothing.

use std::collections::BTreeSet;

use crate::mesh::{EdgeId, Mesh, VertexId};

/// Dissolve two-edged vertices whose edges deviate from collinear by at
/// most `angle` radians.
///
/// Returns the number of vertices dissolved. Faces reduced below three
/// distinct vertices by a dissolve are removed, along with any edges and
/// vertices that removal strands (the loose-element pass has already run
/// by this point in the pipeline, so nothing else will pick them up).
pub fn dissolve_two_edged(mesh: &mut Mesh, angle: f64) -> usize {
    let mut worklist: BTreeSet<VertexId> = mesh
        .vertex_ids()
        .filter(|&v| mesh.vertex_edge_count(v) == 2)
        .collect();

    let mut removed = 0;

    while let Some(v) = worklist.pop_first() {
        if !mesh.contains_vertex(v) || mesh.vertex_edge_count(v) != 2 {
            continue;
        }

        let edges: Vec<EdgeId> = mesh.vertex_edges(v).collect();
        let (e1, e2) = (edges[0], edges[1]);
        let a = other_endpoint(mesh, e1, v);
        let b = other_endpoint(mesh, e2, v);

        // Self-loops and parallel edges have no meaningful direction pair
        if a == v || b == v || a == b {
            continue;
        }
        if !within_tolerance(mesh, v, a, b, angle) {
            continue;
        }

        // Rewrite every face cycle passing through v. All such faces are
        // incident to e1 or e2, since v has no other edges.
        let mut faces: BTreeSet<_> = mesh.edge_faces(e1).collect();
        faces.extend(mesh.edge_faces(e2));

        let mut stranded_check: BTreeSet<EdgeId> = BTreeSet::new();
        for f in faces {
            let cycle: Vec<VertexId> = mesh
                .face_cycle(f)
                .iter()
                .copied()
                .filter(|&u| u != v)
                .collect();
            let distinct: BTreeSet<VertexId> = cycle.iter().copied().collect();

            if cycle.len() < 3 || distinct.len() < 3 {
                stranded_check.extend(mesh.face_edges(f));
                mesh.remove_face(f);
            } else {
                mesh.replace_face_cycle(f, cycle);
            }
        }

        mesh.remove_edge(e1);
        mesh.remove_edge(e2);
        mesh.remove_vertex(v);
        removed += 1;

        // The merged edge; reuses an existing a-b edge if there is one
        mesh.add_edge(a, b);

        // Edges of removed faces left without any face would otherwise
        // survive as wire geometry the pruner has already run past
        for e in stranded_check {
            if !mesh.contains_edge(e) || mesh.edge_face_count(e) > 0 {
                continue;
            }
            let endpoints = mesh.edge_endpoints(e);
            mesh.remove_edge(e);
            for u in endpoints {
                if mesh.contains_vertex(u) && mesh.vertex_edge_count(u) == 0 {
                    mesh.remove_vertex(u);
                }
            }
        }

        // Neighbors may have become (or stopped being) candidates
        for u in [a, b] {
            if mesh.contains_vertex(u) {
                worklist.insert(u);
            }
        }
    }

    removed
}

fn other_endpoint(mesh: &Mesh, e: EdgeId, v: VertexId) -> VertexId {
    let [a, b] = mesh.edge_endpoints(e);
    if a == v {
        b
    } else {
        a
    }
}

/// Check whether the path a-v-b deviates from a straight line by at most
/// `tolerance` radians.
fn within_tolerance(mesh: &Mesh, v: VertexId, a: VertexId, b: VertexId, tolerance: f64) -> bool {
    let pv = mesh.position(v);
    let da = mesh.position(a) - pv;
    let db = mesh.position(b) - pv;

    let (na, nb) = (da.norm(), db.norm());
    if na < f64::EPSILON || nb < f64::EPSILON {
        // Zero-length edge; direction is undefined
        return false;
    }

    let cos = (da.dot(&db) / (na * nb)).clamp(-1.0, 1.0);
    let deviation = std::f64::consts::PI - cos.acos();
    deviation <= tolerance
}
