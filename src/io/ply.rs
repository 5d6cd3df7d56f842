//! PLY (Stanford polygon) format support.
//!
//! This module provides loading and saving of meshes in the PLY format,
//! also known as the Polygon File Format or Stanford Triangle Format.
//! Face elements keep their full polygon loops, and loose edges are
//! carried through the optional `edge` element.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, to_polygons, Mesh};

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use swarf::io::ply;
/// use swarf::mesh::Mesh;
///
/// let mesh: Mesh = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    // Extract vertices
    let vertex_element = ply.payload.get("vertex").ok_or_else(|| MeshError::LoadError {
        path: path.to_path_buf(),
        message: "PLY file has no vertex element".to_string(),
    })?;

    let mut positions: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let x = get_float_property(vertex, "x").ok_or_else(|| MeshError::LoadError {
            path: path.to_path_buf(),
            message: "vertex missing x coordinate".to_string(),
        })?;
        let y = get_float_property(vertex, "y").ok_or_else(|| MeshError::LoadError {
            path: path.to_path_buf(),
            message: "vertex missing y coordinate".to_string(),
        })?;
        let z = get_float_property(vertex, "z").ok_or_else(|| MeshError::LoadError {
            path: path.to_path_buf(),
            message: "vertex missing z coordinate".to_string(),
        })?;
        positions.push(Point3::new(x, y, z));
    }

    // Extract faces, keeping polygon loops intact
    let mut faces: Vec<Vec<usize>> = Vec::new();
    if let Some(face_element) = ply.payload.get("face") {
        faces.reserve(face_element.len());
        for face in face_element {
            let indices = get_list_property(face, "vertex_indices")
                .or_else(|| get_list_property(face, "vertex_index"))
                .ok_or_else(|| MeshError::LoadError {
                    path: path.to_path_buf(),
                    message: "face missing vertex_indices property".to_string(),
                })?;
            if indices.len() < 3 {
                return Err(MeshError::LoadError {
                    path: path.to_path_buf(),
                    message: format!("face with {} vertices", indices.len()),
                });
            }
            faces.push(indices);
        }
    }

    // Loose edges travel in the optional edge element
    let mut lines: Vec<[usize; 2]> = Vec::new();
    if let Some(edge_element) = ply.payload.get("edge") {
        lines.reserve(edge_element.len());
        for edge in edge_element {
            let v1 = get_int_property(edge, "vertex1");
            let v2 = get_int_property(edge, "vertex2");
            let (Some(v1), Some(v2)) = (v1, v2) else {
                return Err(MeshError::LoadError {
                    path: path.to_path_buf(),
                    message: "edge missing vertex1/vertex2 properties".to_string(),
                });
            };
            lines.push([v1, v2]);
        }
    }

    build_from_polygons(&positions, &faces, &lines)
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_int_property(element: &DefaultElement, name: &str) -> Option<usize> {
    match element.get(name)? {
        Property::Int(v) => Some(*v as usize),
        Property::UInt(v) => Some(*v as usize),
        Property::Short(v) => Some(*v as usize),
        Property::UShort(v) => Some(*v as usize),
        Property::Char(v) => Some(*v as usize),
        Property::UChar(v) => Some(*v as usize),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a mesh to a PLY file (ASCII format).
///
/// # Example
///
/// ```no_run
/// use swarf::io::ply;
/// use swarf::mesh::Mesh;
///
/// let mesh = Mesh::new();
/// ply::save(&mesh, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (positions, faces, lines) = to_polygons(mesh);

    // Write header
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by swarf")?;
    writeln!(writer, "element vertex {}", positions.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "element face {}", faces.len())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    if !lines.is_empty() {
        writeln!(writer, "element edge {}", lines.len())?;
        writeln!(writer, "property int vertex1")?;
        writeln!(writer, "property int vertex2")?;
    }
    writeln!(writer, "end_header")?;

    // Write vertices
    for p in &positions {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    // Write faces
    for face in &faces {
        write!(writer, "{}", face.len())?;
        for &vi in face {
            write!(writer, " {}", vi)?;
        }
        writeln!(writer)?;
    }

    // Write loose edges
    for &[a, b] in &lines {
        writeln!(writer, "{} {}", a, b)?;
    }

    writer.flush()?;
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
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(6.0, 5.0, 5.0),
        ];
        let faces = vec![vec![0, 1, 2, 3]];
        let lines = vec![[4, 5]];
        let mesh = build_from_polygons(&positions, &faces, &lines).unwrap();

        let mut path = std::env::temp_dir();
        path.push(format!("swarf_ply_roundtrip_{}.ply", std::process::id()));
        save(&mesh, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), 6);
        assert_eq!(loaded.num_faces(), 1);

        let (_, out_faces, out_lines) = to_polygons(&loaded);
        assert_eq!(out_faces, faces);
        assert_eq!(out_lines, lines);
    }

    #[test]
    fn test_vertex_only_roundtrip() {
        let positions = vec![Point3::new(1.0, 2.0, 3.0)];
        let mesh = build_from_polygons(&positions, &[], &[]).unwrap();

        let mut path = std::env::temp_dir();
        path.push(format!("swarf_ply_vertex_only_{}.ply", std::process::id()));
        save(&mesh, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), 1);
        assert_eq!(loaded.num_faces(), 0);
    }
}
