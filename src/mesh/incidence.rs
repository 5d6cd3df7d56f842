//! Incidence mesh data structure.
//!
//! This module provides the id-indexed mesh representation the cleanup
//! passes operate on. Unlike a half-edge structure it has no manifoldness
//! requirement: it happily represents wireframe edges, isolated vertices,
//! and edges shared by any number of faces, all of which occur in meshes
//! that need cleaning.
//!
//! # Structure
//!
//! - Each **vertex** stores a position and the set of its incident edges
//! - Each **edge** stores its endpoint pair and the set of its incident faces
//! - Each **face** stores an ordered cycle of vertex ids; its edges are
//!   derived through the mesh's endpoint-pair lookup
//!
//! # Referential closure
//!
//! Every id stored inside the mesh names an entity that exists in the mesh,
//! and incidence is symmetric: an edge appears in both endpoints' incidence
//! sets, and a face appears in the face set of every edge its cycle derives.
//! [`Mesh::validate`] checks this and reports the first offending entity.
//!
//! Entities live in id-ordered maps and ids are never reused, so iteration
//! order is ascending id and deterministic across runs.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use nalgebra::Point3;

use super::index::{EdgeId, FaceId, VertexId};
use crate::error::{MeshError, Result};

/// A vertex in the mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Edges incident to this vertex.
    pub(crate) edges: BTreeSet<EdgeId>,
}

impl Vertex {
    fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            edges: BTreeSet::new(),
        }
    }
}

/// An edge in the mesh.
#[derive(Debug, Clone)]
pub struct Edge {
    /// The two endpoint vertex ids. Equal endpoints occur only transiently,
    /// between vertex deduplication and degenerate resolution.
    pub(crate) endpoints: [VertexId; 2],

    /// Faces incident to this edge.
    pub(crate) faces: BTreeSet<FaceId>,
}

/// A face in the mesh: an ordered cycle of vertex ids.
#[derive(Debug, Clone)]
pub struct Face {
    /// The vertex cycle, in winding order.
    pub(crate) cycle: Vec<VertexId>,
}

/// An id-indexed mesh of vertices, edges, and faces with incidence sets.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: BTreeMap<VertexId, Vertex>,
    edges: BTreeMap<EdgeId, Edge>,
    faces: BTreeMap<FaceId, Face>,

    /// Normalized endpoint pair -> edge id. Bijective with `edges`.
    edge_lookup: HashMap<(VertexId, VertexId), EdgeId>,

    next_vertex: u32,
    next_edge: u32,
    next_face: u32,
}

/// Normalize an endpoint pair so lookup is orientation-independent.
#[inline]
fn pair_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Check whether a vertex id is present in the mesh.
    #[inline]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains_key(&v)
    }

    /// Check whether an edge id is present in the mesh.
    #[inline]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains_key(&e)
    }

    /// Check whether a face id is present in the mesh.
    #[inline]
    pub fn contains_face(&self, f: FaceId) -> bool {
        self.faces.contains_key(&f)
    }

    /// Get the position of a vertex.
    ///
    /// # Panics
    /// Panics if the vertex is not in the mesh.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertices[&v].position
    }

    /// Set the position of a vertex. Does nothing if the vertex is not in
    /// the mesh.
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        if let Some(vertex) = self.vertices.get_mut(&v) {
            vertex.position = pos;
        }
    }

    /// Get the endpoint pair of an edge.
    ///
    /// # Panics
    /// Panics if the edge is not in the mesh.
    #[inline]
    pub fn edge_endpoints(&self, e: EdgeId) -> [VertexId; 2] {
        self.edges[&e].endpoints
    }

    /// Get the vertex cycle of a face.
    ///
    /// # Panics
    /// Panics if the face is not in the mesh.
    #[inline]
    pub fn face_cycle(&self, f: FaceId) -> &[VertexId] {
        &self.faces[&f].cycle
    }

    // ==================== Topology Queries ====================

    /// Find the edge connecting two vertices, if any.
    #[inline]
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_lookup.get(&pair_key(a, b)).copied()
    }

    /// Iterate over the edges incident to a vertex, in ascending id order.
    pub fn vertex_edges(&self, v: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.vertices[&v].edges.iter().copied()
    }

    /// Get the number of edges incident to a vertex.
    #[inline]
    pub fn vertex_edge_count(&self, v: VertexId) -> usize {
        self.vertices[&v].edges.len()
    }

    /// Iterate over the faces incident to an edge, in ascending id order.
    pub fn edge_faces(&self, e: EdgeId) -> impl Iterator<Item = FaceId> + '_ {
        self.edges[&e].faces.iter().copied()
    }

    /// Get the number of faces incident to an edge.
    #[inline]
    pub fn edge_face_count(&self, e: EdgeId) -> usize {
        self.edges[&e].faces.len()
    }

    /// Faces whose cycles reference a vertex.
    ///
    /// Derived from the vertex's incident edges: a face can only reference
    /// a vertex through the two cycle edges meeting there.
    pub fn vertex_faces(&self, v: VertexId) -> BTreeSet<FaceId> {
        let mut faces = BTreeSet::new();
        for e in &self.vertices[&v].edges {
            faces.extend(self.edges[e].faces.iter().copied());
        }
        faces
    }

    /// The edges derived from a face's cycle, in cycle order.
    ///
    /// Cycle pairs without a matching edge are skipped; a closure-valid
    /// mesh has none.
    pub fn face_edges(&self, f: FaceId) -> Vec<EdgeId> {
        let cycle = &self.faces[&f].cycle;
        cycle_pairs(cycle)
            .filter_map(|(a, b)| self.edge_between(a, b))
            .collect()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex ids in ascending order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys().copied()
    }

    /// Iterate over all edge ids in ascending order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().copied()
    }

    /// Iterate over all face ids in ascending order.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.keys().copied()
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its id.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId::new(self.next_vertex);
        self.next_vertex += 1;
        self.vertices.insert(id, Vertex::new(position));
        id
    }

    /// Add an edge between two vertices, or return the existing one.
    ///
    /// Equal endpoints are permitted; such an edge is degenerate and will be
    /// removed by the degenerate resolver.
    ///
    /// # Panics
    /// Panics if either vertex is not in the mesh.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        assert!(self.contains_vertex(a) && self.contains_vertex(b));

        let key = pair_key(a, b);
        if let Some(&e) = self.edge_lookup.get(&key) {
            return e;
        }

        let id = EdgeId::new(self.next_edge);
        self.next_edge += 1;
        self.edges.insert(
            id,
            Edge {
                endpoints: [a, b],
                faces: BTreeSet::new(),
            },
        );
        self.edge_lookup.insert(key, id);
        if let Some(v) = self.vertices.get_mut(&a) {
            v.edges.insert(id);
        }
        if let Some(v) = self.vertices.get_mut(&b) {
            v.edges.insert(id);
        }
        id
    }

    /// Add a face from a vertex cycle, creating any missing edges.
    ///
    /// The cycle must have at least three entries. Entries need not be
    /// distinct: degenerate cycles are accepted and left for the cleanup
    /// passes to resolve.
    ///
    /// # Panics
    /// Panics if the cycle is shorter than 3 or references a missing vertex.
    pub fn add_face(&mut self, cycle: &[VertexId]) -> FaceId {
        assert!(cycle.len() >= 3, "face cycle needs at least 3 vertices");

        let id = FaceId::new(self.next_face);
        self.next_face += 1;
        self.faces.insert(
            id,
            Face {
                cycle: cycle.to_vec(),
            },
        );
        self.attach_face_edges(id);
        id
    }

    // ==================== Removal ====================

    /// Remove a face, detaching it from its derived edges.
    ///
    /// The face's edges and vertices are left in place.
    pub fn remove_face(&mut self, f: FaceId) {
        self.detach_face_edges(f);
        self.faces.remove(&f);
    }

    /// Remove an edge, detaching it from its endpoint vertices.
    ///
    /// The edge must have no incident faces.
    pub fn remove_edge(&mut self, e: EdgeId) {
        let Some(edge) = self.edges.remove(&e) else {
            return;
        };
        debug_assert!(edge.faces.is_empty(), "removing edge with incident faces");

        let [a, b] = edge.endpoints;
        let key = pair_key(a, b);
        if self.edge_lookup.get(&key) == Some(&e) {
            self.edge_lookup.remove(&key);
        }
        if let Some(v) = self.vertices.get_mut(&a) {
            v.edges.remove(&e);
        }
        if let Some(v) = self.vertices.get_mut(&b) {
            v.edges.remove(&e);
        }
    }

    /// Remove a vertex. The vertex must have no incident edges.
    pub fn remove_vertex(&mut self, v: VertexId) {
        debug_assert!(
            self.vertices
                .get(&v)
                .map_or(true, |vertex| vertex.edges.is_empty()),
            "removing vertex with incident edges"
        );
        self.vertices.remove(&v);
    }

    // ==================== Rewiring (cleanup passes) ====================

    /// Replace a face's cycle, rewiring derived-edge incidence on both sides.
    ///
    /// Missing edges for the new cycle are created, so passes can merge or
    /// reroute loops without managing edges by hand.
    pub(crate) fn replace_face_cycle(&mut self, f: FaceId, cycle: Vec<VertexId>) {
        debug_assert!(cycle.len() >= 3);
        self.detach_face_edges(f);
        if let Some(face) = self.faces.get_mut(&f) {
            face.cycle = cycle;
        }
        self.attach_face_edges(f);
    }

    /// Substitute one endpoint of an edge for another vertex.
    ///
    /// If the rewritten endpoint pair collides with an existing edge, this
    /// edge's face incidences are unioned onto the existing edge and the
    /// edge itself is dropped. Returns the id of the surviving edge.
    pub(crate) fn rewire_edge_endpoint(
        &mut self,
        e: EdgeId,
        from: VertexId,
        to: VertexId,
    ) -> EdgeId {
        if from == to {
            return e;
        }

        let old = self.edges[&e].endpoints;
        let new = [
            if old[0] == from { to } else { old[0] },
            if old[1] == from { to } else { old[1] },
        ];
        if new == old {
            return e;
        }

        let old_key = pair_key(old[0], old[1]);
        if self.edge_lookup.get(&old_key) == Some(&e) {
            self.edge_lookup.remove(&old_key);
        }
        if let Some(v) = self.vertices.get_mut(&from) {
            v.edges.remove(&e);
        }

        let new_key = pair_key(new[0], new[1]);
        if let Some(&existing) = self.edge_lookup.get(&new_key) {
            // Pair collision: fold this edge into the one already there.
            let faces = self
                .edges
                .get(&e)
                .map(|edge| edge.faces.clone())
                .unwrap_or_default();
            if let Some(surviving) = self.edges.get_mut(&existing) {
                surviving.faces.extend(faces);
            }
            for endpoint in old {
                if let Some(v) = self.vertices.get_mut(&endpoint) {
                    v.edges.remove(&e);
                }
            }
            self.edges.remove(&e);
            return existing;
        }

        if let Some(edge) = self.edges.get_mut(&e) {
            edge.endpoints = new;
        }
        self.edge_lookup.insert(new_key, e);
        for endpoint in new {
            if let Some(v) = self.vertices.get_mut(&endpoint) {
                v.edges.insert(e);
            }
        }
        e
    }

    fn attach_face_edges(&mut self, f: FaceId) {
        let cycle = self.faces[&f].cycle.clone();
        for (a, b) in cycle_pairs(&cycle) {
            let e = self.add_edge(a, b);
            if let Some(edge) = self.edges.get_mut(&e) {
                edge.faces.insert(f);
            }
        }
    }

    fn detach_face_edges(&mut self, f: FaceId) {
        let cycle = self.faces[&f].cycle.clone();
        for (a, b) in cycle_pairs(&cycle) {
            if let Some(e) = self.edge_between(a, b) {
                if let Some(edge) = self.edges.get_mut(&e) {
                    edge.faces.remove(&f);
                }
            }
        }
    }

    // ==================== Validation ====================

    /// Check referential closure.
    ///
    /// Verifies that every id stored in the mesh names an existing entity
    /// and that incidence is symmetric. Returns the first violation found,
    /// in ascending entity-id order.
    pub fn validate(&self) -> Result<()> {
        for (&e, edge) in &self.edges {
            for &v in &edge.endpoints {
                let Some(vertex) = self.vertices.get(&v) else {
                    return Err(closure_error(e, format!("endpoint {v:?} does not exist")));
                };
                if !vertex.edges.contains(&e) {
                    return Err(closure_error(
                        e,
                        format!("endpoint {v:?} does not list this edge as incident"),
                    ));
                }
            }
            let key = pair_key(edge.endpoints[0], edge.endpoints[1]);
            if self.edge_lookup.get(&key) != Some(&e) {
                return Err(closure_error(e, "endpoint lookup is out of sync".into()));
            }
            for &f in &edge.faces {
                let Some(face) = self.faces.get(&f) else {
                    return Err(closure_error(e, format!("incident face {f:?} does not exist")));
                };
                let derives = cycle_pairs(&face.cycle)
                    .any(|(a, b)| pair_key(a, b) == key);
                if !derives {
                    return Err(closure_error(
                        e,
                        format!("incident face {f:?} does not derive this edge"),
                    ));
                }
            }
        }

        for (&v, vertex) in &self.vertices {
            for &e in &vertex.edges {
                let Some(edge) = self.edges.get(&e) else {
                    return Err(closure_error(v, format!("incident edge {e:?} does not exist")));
                };
                if !edge.endpoints.contains(&v) {
                    return Err(closure_error(
                        v,
                        format!("incident edge {e:?} does not end here"),
                    ));
                }
            }
        }

        for (&f, face) in &self.faces {
            if face.cycle.len() < 3 {
                return Err(closure_error(f, "cycle has fewer than 3 entries".into()));
            }
            for (a, b) in cycle_pairs(&face.cycle) {
                if !self.contains_vertex(a) {
                    return Err(closure_error(f, format!("cycle vertex {a:?} does not exist")));
                }
                let Some(e) = self.edge_between(a, b) else {
                    return Err(closure_error(
                        f,
                        format!("no edge between cycle vertices {a:?} and {b:?}"),
                    ));
                };
                if !self.edges[&e].faces.contains(&f) {
                    return Err(closure_error(
                        f,
                        format!("derived edge {e:?} does not list this face as incident"),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Iterate the cyclic consecutive pairs of a cycle, including last→first.
fn cycle_pairs(cycle: &[VertexId]) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
    let n = cycle.len();
    (0..n).map(move |i| (cycle[i], cycle[(i + 1) % n]))
}

fn closure_error(entity: impl std::fmt::Debug, detail: String) -> MeshError {
    MeshError::MalformedMesh {
        entity: format!("{entity:?}"),
        detail,
    }
}
