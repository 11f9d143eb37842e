//! Wavefront OBJ subset loader: `v` and `f` records only.
//!
//! `v` lines carry exactly three float components. `f` lines carry 3 or 4
//! `index[/...]` tokens (only the first slash-field is used), 1-based and
//! converted to 0-based; quads are split into two triangles by `Mesh`.
//! Malformed records fail with an error naming the file and line.

use std::path::Path;

use glam::Vec3;

use crate::error::FurError;
use crate::mesh::{Mesh, SourceFace};

pub fn load_obj(path: impl AsRef<Path>) -> Result<Mesh, FurError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| FurError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_obj(&text, path)
}

fn format_error(path: &Path, line: usize, message: impl Into<String>) -> FurError {
    FurError::MeshFormat {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

pub(crate) fn parse_obj(text: &str, path: &Path) -> Result<Mesh, FurError> {
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut faces: Vec<SourceFace> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let num = idx + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut components = [0.0f32; 3];
                let mut count = 0;
                for token in tokens {
                    if count == 3 {
                        count += 1;
                        break;
                    }
                    components[count] = token.parse().map_err(|_| {
                        format_error(path, num, format!("bad vertex component `{token}`"))
                    })?;
                    count += 1;
                }
                if count != 3 {
                    return Err(format_error(
                        path,
                        num,
                        "v must be followed by exactly 3 float components",
                    ));
                }
                vertices.push(Vec3::from_array(components));
            }
            Some("f") => {
                let mut indices: Vec<u32> = Vec::with_capacity(4);
                for token in tokens {
                    let first = token.split('/').next().unwrap_or_default();
                    let index: u32 = first.parse().map_err(|_| {
                        format_error(path, num, format!("bad face index `{token}`"))
                    })?;
                    if index == 0 {
                        return Err(format_error(
                            path,
                            num,
                            "face indices are 1-based; 0 is out of range",
                        ));
                    }
                    indices.push(index - 1);
                }
                match indices[..] {
                    [a, b, c] => faces.push(SourceFace::Triangle([a, b, c])),
                    [a, b, c, d] => faces.push(SourceFace::Quad([a, b, c, d])),
                    _ => {
                        return Err(format_error(
                            path,
                            num,
                            format!("f must be followed by 3 or 4 index tokens, got {}", indices.len()),
                        ));
                    }
                }
            }
            // Comments, vt/vn/usemtl records, and blank lines are skipped.
            _ => {}
        }
    }

    Mesh::from_source_faces(vertices, &faces, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Mesh, FurError> {
        parse_obj(text, Path::new("test.obj"))
    }

    #[test]
    fn parses_vertices_and_triangles_one_based() {
        let mesh = parse("# comment\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.faces(), &[[0, 1, 2]]);
    }

    #[test]
    fn slash_tokens_use_only_the_vertex_index() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/4/7 2/5 3//9\n").unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2]]);
    }

    #[test]
    fn quads_are_split_into_two_triangles() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn wrong_vertex_arity_names_the_line() {
        let err = parse("v 0 0 0\nv 1 2\n").unwrap_err();
        match err {
            FurError::MeshFormat { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("3 float components"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_face_arity_names_the_line() {
        let err = parse("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, FurError::MeshFormat { line: 3, .. }));
    }

    #[test]
    fn zero_face_index_is_rejected() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, FurError::MeshFormat { line: 4, .. }));
    }

    #[test]
    fn out_of_range_face_index_is_rejected() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n").unwrap_err();
        assert!(matches!(err, FurError::FaceIndexOutOfRange { index: 8, .. }));
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let err = load_obj("does/not/exist.obj").unwrap_err();
        assert!(matches!(err, FurError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.obj"));
    }
}
