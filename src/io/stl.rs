//! STL (stereolithography) format support.
//!
//! This module provides loading and saving of meshes in the STL format,
//! commonly used for 3D printing. Both binary and ASCII formats are
//! supported on load.
//!
//! STL has no notion of shared vertices, loose edges, or isolated
//! vertices: loading reconstructs shared topology by exact-position
//! deduplication, polygon faces are fan-triangulated on save, and loose
//! geometry is dropped on save.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, to_polygons, Mesh};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format.
///
/// # Example
///
/// ```no_run
/// use swarf::io::stl;
/// use swarf::mesh::Mesh;
///
/// let mesh: Mesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    // STL stores vertices per-triangle; rebuild shared topology with an
    // exact-tolerance scan. Near-duplicates are deliberately kept: merging
    // them is the cleanup pipeline's job, with a user-chosen threshold.
    const EPSILON: f64 = 1e-10;

    fn find_or_add_vertex(positions: &mut Vec<Point3<f64>>, p: Point3<f64>) -> usize {
        for (i, v) in positions.iter().enumerate() {
            if (v - p).norm() < EPSILON {
                return i;
            }
        }
        let idx = positions.len();
        positions.push(p);
        idx
    }

    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();

    for tri in &stl.faces {
        // tri.vertices contains indices into stl.vertices
        let vtx0 = &stl.vertices[tri.vertices[0]];
        let vtx1 = &stl.vertices[tri.vertices[1]];
        let vtx2 = &stl.vertices[tri.vertices[2]];

        let v0 = Point3::new(vtx0[0] as f64, vtx0[1] as f64, vtx0[2] as f64);
        let v1 = Point3::new(vtx1[0] as f64, vtx1[1] as f64, vtx1[2] as f64);
        let v2 = Point3::new(vtx2[0] as f64, vtx2[1] as f64, vtx2[2] as f64);

        let i0 = find_or_add_vertex(&mut positions, v0);
        let i1 = find_or_add_vertex(&mut positions, v1);
        let i2 = find_or_add_vertex(&mut positions, v2);

        // Degenerate triangles load as-is; the degenerate resolver will
        // count and remove them
        faces.push(vec![i0, i1, i2]);
    }

    build_from_polygons(&positions, &faces, &[])
}

/// Save a mesh to a binary STL file.
///
/// Polygon faces are fan-triangulated. Loose edges and isolated vertices
/// cannot be represented in STL and are dropped.
///
/// # Example
///
/// ```no_run
/// use swarf::io::stl;
/// use swarf::mesh::Mesh;
///
/// let mesh = Mesh::new();
/// stl::save(&mesh, "output.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (positions, faces, _) = to_polygons(mesh);

    let mut triangles: Vec<stl_io::Triangle> = Vec::with_capacity(faces.len());
    for face in &faces {
        for i in 1..face.len() - 1 {
            let p0 = &positions[face[0]];
            let p1 = &positions[face[i]];
            let p2 = &positions[face[i + 1]];

            // Compute normal
            let e1 = p1 - p0;
            let e2 = p2 - p0;
            let n = e1.cross(&e2);
            let n = if n.norm() > 0.0 {
                n.normalize()
            } else {
                n // degenerate triangle, write a zero normal
            };

            triangles.push(stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [
                    stl_io::Vertex::new([p0.x as f32, p0.y as f32, p0.z as f32]),
                    stl_io::Vertex::new([p1.x as f32, p1.y as f32, p1.z as f32]),
                    stl_io::Vertex::new([p2.x as f32, p2.y as f32, p2.z as f32]),
                ],
            });
        }
    }

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![
            vec![0, 2, 1],
            vec![0, 1, 3],
            vec![1, 2, 3],
            vec![2, 0, 3],
        ];
        let mesh = build_from_polygons(&positions, &faces, &[]).unwrap();

        let mut path = std::env::temp_dir();
        path.push(format!("swarf_stl_roundtrip_{}.stl", std::process::id()));
        save(&mesh, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), 4);
        assert_eq!(loaded.num_faces(), 4);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_quad_triangulated_on_save() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2, 3]];
        let mesh = build_from_polygons(&positions, &faces, &[]).unwrap();

        let mut path = std::env::temp_dir();
        path.push(format!("swarf_stl_quad_{}.stl", std::process::id()));
        save(&mesh, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), 4);
        assert_eq!(loaded.num_faces(), 2);
    }
}
