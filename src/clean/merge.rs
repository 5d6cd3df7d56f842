//! Vertex deduplication (remove doubles).
//!
//! Two pieces: a spatial hash grid for proximity queries, and the merge
//! pass that collapses each group of near-coincident vertices into its
//! lowest-id member, rewiring every edge and face that referenced the
//! others.
//!
//! Merging is greedy: scanning vertices in ascending id order, an
//! unclaimed vertex within the merge distance of the scan vertex joins
//! the scan vertex's group. This matches remove-doubles semantics, where
//! a vertex merges into the nearest surviving representative rather than
//! into a transitive closure of the whole cluster.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;

use crate::mesh::{Mesh, VertexId};

/// A uniform spatial hash grid over vertex positions.
///
/// Cells are sized to twice the query radius, so all vertices within the
/// radius of a point lie in the point's cell or one of its 26 neighbors.
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<(i64, i64, i64), Vec<VertexId>>,
}

impl SpatialGrid {
    /// Build a grid over all vertices of a mesh, for queries up to `radius`.
    ///
    /// `radius` must be positive; exact-coincidence grouping does not need
    /// a grid.
    pub fn build(mesh: &Mesh, radius: f64) -> Self {
        debug_assert!(radius > 0.0);
        let cell_size = radius * 2.0;
        let mut cells: HashMap<(i64, i64, i64), Vec<VertexId>> = HashMap::new();

        for v in mesh.vertex_ids() {
            let cell = pos_to_cell(mesh.position(v), cell_size);
            cells.entry(cell).or_default().push(v);
        }

        Self { cell_size, cells }
    }

    /// Iterate over all vertices in the 3x3x3 cell neighborhood of a point.
    pub fn neighbors(&self, pos: Point3<f64>) -> impl Iterator<Item = VertexId> + '_ {
        let center = pos_to_cell(&pos, self.cell_size);
        NEIGHBOR_OFFSETS.iter().flat_map(move |&(dx, dy, dz)| {
            self.cells
                .get(&(center.0 + dx, center.1 + dy, center.2 + dz))
                .into_iter()
                .flatten()
                .copied()
        })
    }
}

const NEIGHBOR_OFFSETS: [(i64, i64, i64); 27] = {
    let mut offsets = [(0, 0, 0); 27];
    let mut i = 0;
    let mut dx = -1;
    while dx <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dz = -1;
            while dz <= 1 {
                offsets[i] = (dx, dy, dz);
                i += 1;
                dz += 1;
            }
            dy += 1;
        }
        dx += 1;
    }
    offsets
};

/// Convert a position to a spatial hash cell.
fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}

/// Partition the mesh's vertices into merge groups.
///
/// Each group lists the vertices that will collapse into the group's first
/// (lowest-id) member: every other member lies within `epsilon` of it.
/// Vertices that merge with nothing form singleton groups, so the result
/// is always a complete partition of the vertex set.
///
/// With `epsilon == 0` only exactly-coincident vertices are grouped.
pub fn merge_groups(mesh: &Mesh, epsilon: f64) -> Vec<Vec<VertexId>> {
    if epsilon == 0.0 {
        return exact_groups(mesh);
    }

    let grid = SpatialGrid::build(mesh, epsilon);
    let mut claimed: HashSet<VertexId> = HashSet::new();
    let mut groups = Vec::new();

    for v in mesh.vertex_ids() {
        if claimed.contains(&v) {
            continue;
        }

        let pos = *mesh.position(v);
        let mut group = vec![v];
        for other in grid.neighbors(pos) {
            if other <= v || claimed.contains(&other) {
                continue;
            }
            if (mesh.position(other) - pos).norm() <= epsilon {
                claimed.insert(other);
                group.push(other);
            }
        }
        group.sort_unstable();
        groups.push(group);
    }

    groups
}

/// Group vertices with bit-identical positions.
fn exact_groups(mesh: &Mesh) -> Vec<Vec<VertexId>> {
    let mut index: HashMap<(u64, u64, u64), usize> = HashMap::new();
    let mut groups: Vec<Vec<VertexId>> = Vec::new();

    for v in mesh.vertex_ids() {
        let pos = mesh.position(v);
        let key = (pos.x.to_bits(), pos.y.to_bits(), pos.z.to_bits());
        match index.get(&key) {
            Some(&i) => groups[i].push(v),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![v]);
            }
        }
    }

    groups
}

/// Merge duplicate vertices within `epsilon` of each other.
///
/// For each merge group the lowest-id vertex survives; edges and face
/// cycles referencing the others are rewritten to reference it, then the
/// others are removed. Edges whose endpoints become equal are left in
/// place for the degenerate resolver; edges whose rewritten endpoint pair
/// collides with an existing edge are folded into it.
///
/// Returns the number of vertices removed. Running again with the same
/// `epsilon` removes nothing.
pub fn dedup_vertices(mesh: &mut Mesh, epsilon: f64) -> usize {
    let groups = merge_groups(mesh, epsilon);
    let mut removed = 0;

    for group in &groups {
        let Some((&survivor, rest)) = group.split_first() else {
            continue;
        };
        for &dead in rest {
            // Rewrite face cycles first; this detaches the dead vertex's
            // edges from their faces and attaches the rewritten pairs.
            for f in mesh.vertex_faces(dead) {
                let cycle: Vec<VertexId> = mesh
                    .face_cycle(f)
                    .iter()
                    .map(|&v| if v == dead { survivor } else { v })
                    .collect();
                mesh.replace_face_cycle(f, cycle);
            }

            // Rewire whatever edges remain on the dead vertex (wireframe
            // edges and the now-faceless originals).
            let edges: Vec<_> = mesh.vertex_edges(dead).collect();
            for e in edges {
                mesh.rewire_edge_endpoint(e, dead, survivor);
            }

            mesh.remove_vertex(dead);
            removed += 1;
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;

    #[test]
    fn test_groups_trivial_partition() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let mesh = build_from_polygons(&positions, &[], &[]).unwrap();

        let groups = merge_groups(&mesh, 0.01);
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.len() == 1));
    }

    #[test]
    fn test_groups_near_pair() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.005, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let mesh = build_from_polygons(&positions, &[], &[]).unwrap();

        let groups = merge_groups(&mesh, 0.01);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_groups_exact_epsilon_zero() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1e-12, 0.0, 0.0), // close but not identical
        ];
        let mesh = build_from_polygons(&positions, &[], &[]).unwrap();

        let groups = merge_groups(&mesh, 0.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_groups_straddling_cell_boundary() {
        // Two vertices within epsilon but in different grid cells
        let positions = vec![
            Point3::new(-0.001, 0.0, 0.0),
            Point3::new(0.001, 0.0, 0.0),
        ];
        let mesh = build_from_polygons(&positions, &[], &[]).unwrap();

        let groups = merge_groups(&mesh, 0.01);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_dedup_rewires_faces() {
        // Two triangles that should share the edge 0-2 but reference a
        // duplicated vertex 3 instead of vertex 2
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 1.0001, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2], vec![0, 3, 4]];
        let mut mesh = build_from_polygons(&positions, &faces, &[]).unwrap();

        let removed = dedup_vertices(&mut mesh, 0.01);
        assert_eq!(removed, 1);
        assert_eq!(mesh.num_vertices(), 4);
        assert!(mesh.validate().is_ok());

        // Both faces now reference the surviving vertex
        let survivor = VertexId::new(2);
        let dead = VertexId::new(3);
        for f in mesh.face_ids().collect::<Vec<_>>() {
            assert!(mesh.face_cycle(f).contains(&survivor));
            assert!(!mesh.face_cycle(f).contains(&dead));
        }
        assert!(!mesh.contains_vertex(dead));
    }

    #[test]
    fn test_dedup_leaves_zero_length_edge_for_resolver() {
        // An edge between two coincident vertices collapses to a
        // self-loop, which dedup must not delete
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let mut mesh = build_from_polygons(&positions, &[], &[[0, 1]]).unwrap();

        let removed = dedup_vertices(&mut mesh, 0.0);
        assert_eq!(removed, 1);
        assert_eq!(mesh.num_vertices(), 1);
        assert_eq!(mesh.num_edges(), 1);

        let e = mesh.edge_ids().next().unwrap();
        let [a, b] = mesh.edge_endpoints(e);
        assert_eq!(a, b);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_dedup_idempotent() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.001, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![vec![0, 2, 3], vec![1, 2, 3]];
        let mut mesh = build_from_polygons(&positions, &faces, &[]).unwrap();

        let first = dedup_vertices(&mut mesh, 0.01);
        assert_eq!(first, 1);
        let second = dedup_vertices(&mut mesh, 0.01);
        assert_eq!(second, 0);
    }

    #[test]
    fn test_dedup_folds_duplicate_edges() {
        // Faces [0,2,3] and [1,2,3] become identical cycles after the
        // merge; their edges must fold together rather than duplicate
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.001, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![vec![0, 2, 3], vec![1, 2, 3]];
        let mut mesh = build_from_polygons(&positions, &faces, &[]).unwrap();

        dedup_vertices(&mut mesh, 0.01);
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_edges(), 3);
        assert!(mesh.validate().is_ok());
    }
}
