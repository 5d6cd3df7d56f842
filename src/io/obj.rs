//! Wavefront OBJ format support.
//!
//! This module provides loading and saving of meshes in the OBJ format.
//! OBJ is the only supported format that carries loose edges: `l` line
//! elements load as wireframe edges and edges with no incident face are
//! written back as `l` elements.
//!
//! Texture and normal references in face entries (`v/vt/vn`) are parsed
//! and discarded; only positions and connectivity survive a round trip.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, to_polygons, Mesh};

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use swarf::io::obj;
/// use swarf::mesh::Mesh;
///
/// let mesh: Mesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();
    let mut lines: Vec<[usize; 2]> = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let coords: Vec<f64> = tokens
                    .take(3)
                    .map(str::parse)
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| load_error(path, lineno, format!("bad vertex: {e}")))?;
                if coords.len() != 3 {
                    return Err(load_error(path, lineno, "vertex needs 3 coordinates".into()));
                }
                positions.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            "f" => {
                let face: Vec<usize> = tokens
                    .map(|t| parse_vertex_ref(t, positions.len()))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| load_error(path, lineno, e))?;
                if face.len() < 3 {
                    return Err(load_error(path, lineno, "face needs at least 3 vertices".into()));
                }
                faces.push(face);
            }
            "l" => {
                let polyline: Vec<usize> = tokens
                    .map(|t| parse_vertex_ref(t, positions.len()))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| load_error(path, lineno, e))?;
                if polyline.len() < 2 {
                    return Err(load_error(path, lineno, "line needs at least 2 vertices".into()));
                }
                for pair in polyline.windows(2) {
                    lines.push([pair[0], pair[1]]);
                }
            }
            // Normals, texture coordinates, groups, materials: ignored
            _ => {}
        }
    }

    build_from_polygons(&positions, &faces, &lines)
}

/// Parse a face/line vertex reference (`7`, `7/1`, `7//2`, `-1`) into a
/// zero-based vertex index.
fn parse_vertex_ref(token: &str, num_vertices: usize) -> std::result::Result<usize, String> {
    let index_part = token.split('/').next().unwrap_or(token);
    let raw: i64 = index_part
        .parse()
        .map_err(|e| format!("bad vertex reference {token:?}: {e}"))?;

    let index = if raw < 0 {
        // Negative references count back from the most recent vertex
        num_vertices as i64 + raw
    } else {
        raw - 1
    };
    if index < 0 {
        return Err(format!("vertex reference {token:?} resolves before the first vertex"));
    }
    Ok(index as usize)
}

fn load_error(path: &Path, lineno: usize, message: String) -> MeshError {
    MeshError::LoadError {
        path: path.to_path_buf(),
        message: format!("line {}: {}", lineno + 1, message),
    }
}

/// Save a mesh to an OBJ file.
///
/// Faces are written as `f` elements and edges with no incident face as
/// `l` elements; isolated vertices survive as unreferenced `v` entries.
///
/// # Example
///
/// ```no_run
/// use swarf::io::obj;
/// use swarf::mesh::Mesh;
///
/// let mesh = Mesh::new();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (positions, faces, lines) = to_polygons(mesh);

    writeln!(writer, "# Generated by swarf")?;
    for p in &positions {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for face in &faces {
        write!(writer, "f")?;
        for &vi in face {
            write!(writer, " {}", vi + 1)?;
        }
        writeln!(writer)?;
    }
    for &[a, b] in &lines {
        writeln!(writer, "l {} {}", a + 1, b + 1)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("swarf_{}_{}.obj", name, std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_triangles_and_lines() {
        let path = write_temp(
            "obj_tris_lines",
            "# comment\n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             v 5 5 5\n\
             f 1 2 3\n\
             l 3 4\n",
        );
        let mesh = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_edges(), 4);
    }

    #[test]
    fn test_load_slashed_and_negative_refs() {
        let path = write_temp(
            "obj_slashed",
            "v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             f 1/1/1 2//2 -1\n",
        );
        let mesh = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_vertices(), 3);
    }

    #[test]
    fn test_load_dangling_reference_rejected() {
        let path = write_temp("obj_dangling", "v 0 0 0\nf 1 2 3\n");
        let result = load(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { .. })
        ));
    }

    #[test]
    fn test_roundtrip() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(2.0, 2.0, 2.0),
            Point3::new(3.0, 2.0, 2.0),
        ];
        let faces = vec![vec![0, 1, 2]];
        let lines = vec![[3, 4]];
        let mesh = build_from_polygons(&positions, &faces, &lines).unwrap();

        let mut path = std::env::temp_dir();
        path.push(format!("swarf_obj_roundtrip_{}.obj", std::process::id()));
        save(&mesh, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), 5);
        assert_eq!(loaded.num_faces(), 1);
        assert_eq!(loaded.num_edges(), 4);

        let (out_positions, out_faces, out_lines) = to_polygons(&loaded);
        assert_eq!(out_faces, faces);
        assert_eq!(out_lines, lines);
        for (a, b) in positions.iter().zip(out_positions.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }
}
