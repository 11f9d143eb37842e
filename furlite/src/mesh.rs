//! Triangulated mesh data: positions, unit normals, triangle faces.
//!
//! A `Mesh` is built once (from an OBJ file or a procedural generator) and is
//! immutable afterward. Quad faces from source data are split into two
//! triangles before a `Mesh` exists; the rest of the pipeline only ever sees
//! triangle lists.

use glam::Vec3;

use crate::error::FurError;

/// A face as it appears in source data. Quads are legal here and nowhere else.
#[derive(Clone, Copy, Debug)]
pub enum SourceFace {
    Triangle([u32; 3]),
    Quad([u32; 4]),
}

#[derive(Debug)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Build a mesh from triangle faces. Face indices are validated against the
    /// vertex count; when `normals` is `None` they are computed from the face
    /// windings.
    pub fn new(
        vertices: Vec<Vec3>,
        faces: Vec<[u32; 3]>,
        normals: Option<Vec<Vec3>>,
    ) -> Result<Self, FurError> {
        for (fi, face) in faces.iter().enumerate() {
            for &index in face {
                if index as usize >= vertices.len() {
                    return Err(FurError::FaceIndexOutOfRange {
                        face: fi,
                        index,
                        count: vertices.len(),
                    });
                }
            }
        }
        let normals = match normals {
            Some(normals) => {
                if normals.len() != vertices.len() {
                    return Err(FurError::AttributeLengthMismatch {
                        name: "normal",
                        got: normals.len(),
                        expected: vertices.len(),
                    });
                }
                normals
            }
            None => accumulate_normals(&vertices, &faces)?,
        };
        Ok(Self {
            vertices,
            normals,
            faces,
        })
    }

    /// Build a mesh from source faces, splitting quads into two triangles.
    pub fn from_source_faces(
        vertices: Vec<Vec3>,
        source_faces: &[SourceFace],
        normals: Option<Vec<Vec3>>,
    ) -> Result<Self, FurError> {
        let mut faces = Vec::with_capacity(source_faces.len());
        for face in source_faces {
            match *face {
                SourceFace::Triangle(tri) => faces.push(tri),
                SourceFace::Quad([a, b, c, d]) => {
                    faces.push([a, b, c]);
                    faces.push([a, c, d]);
                }
            }
        }
        Self::new(vertices, faces, normals)
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Unit cube centered on the origin: 8 vertices, 6 quads split into 12
    /// triangles. Normals come out of the winding accumulation as the
    /// normalized corner directions.
    pub fn cube() -> Self {
        let p = |x: f32, y: f32, z: f32| Vec3::new(x, y, z) * 0.5;
        let vertices = vec![
            p(-1.0, -1.0, -1.0),
            p(1.0, -1.0, -1.0),
            p(1.0, 1.0, -1.0),
            p(-1.0, 1.0, -1.0),
            p(-1.0, -1.0, 1.0),
            p(1.0, -1.0, 1.0),
            p(1.0, 1.0, 1.0),
            p(-1.0, 1.0, 1.0),
        ];
        let quads = [
            SourceFace::Quad([4, 5, 6, 7]),
            SourceFace::Quad([1, 0, 3, 2]),
            SourceFace::Quad([5, 1, 2, 6]),
            SourceFace::Quad([0, 4, 7, 3]),
            SourceFace::Quad([7, 6, 2, 3]),
            SourceFace::Quad([0, 1, 5, 4]),
        ];
        // The cube is well-formed by construction.
        match Self::from_source_faces(vertices, &quads, None) {
            Ok(mesh) => mesh,
            Err(_) => unreachable!("cube construction is statically valid"),
        }
    }

    /// Unit sphere centered on the origin, tessellated as a latitude/longitude
    /// grid with a duplicated seam column. Normals are the positions
    /// themselves.
    pub fn uv_sphere(stacks: u32, slices: u32) -> Result<Self, FurError> {
        if stacks < 2 || slices < 3 {
            return Err(FurError::BadTessellation { stacks, slices });
        }
        let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
        for i in 0..=stacks {
            let theta = std::f32::consts::PI * i as f32 / stacks as f32;
            let (st, ct) = theta.sin_cos();
            for j in 0..=slices {
                let phi = std::f32::consts::TAU * j as f32 / slices as f32;
                let (sp, cp) = phi.sin_cos();
                vertices.push(Vec3::new(st * cp, ct, st * sp));
            }
        }
        let ring = slices + 1;
        let mut quads = Vec::with_capacity((stacks * slices) as usize);
        for i in 0..stacks {
            for j in 0..slices {
                let a = i * ring + j;
                let b = (i + 1) * ring + j;
                quads.push(SourceFace::Quad([a, a + 1, b + 1, b]));
            }
        }
        let normals = vertices.clone();
        Self::from_source_faces(vertices, &quads, Some(normals))
    }
}

/// Accumulate the cross product of two edge vectors of each face into every
/// referenced vertex, then renormalize. A vertex whose accumulated normal has
/// zero length (no faces, or only zero-area ones) is an error.
fn accumulate_normals(vertices: &[Vec3], faces: &[[u32; 3]]) -> Result<Vec<Vec3>, FurError> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];
    for face in faces {
        let a = vertices[face[0] as usize];
        let b = vertices[face[1] as usize];
        let c = vertices[face[2] as usize];
        let n = (b - a).cross(c - a);
        for &index in face {
            normals[index as usize] += n;
        }
    }
    for (i, n) in normals.iter_mut().enumerate() {
        let len = n.length();
        if len <= f32::EPSILON {
            return Err(FurError::DegenerateNormal(i));
        }
        *n /= len;
    }
    Ok(normals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_expected_counts_and_unit_corner_normals() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertices().len(), 8);
        assert_eq!(cube.faces().len(), 12);
        let corner = 1.0 / 3.0f32.sqrt();
        for (v, n) in cube.vertices().iter().zip(cube.normals()) {
            assert!((n.length() - 1.0).abs() < 1e-6);
            // Corner normals point along the corner direction.
            let expected = v.normalize();
            assert!((*n - expected).length() < 1e-5, "{n} vs {expected}");
            assert!((n.x.abs() - corner).abs() < 1e-5);
        }
    }

    #[test]
    fn quad_faces_are_split_into_two_triangles() {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh =
            Mesh::from_source_faces(vertices, &[SourceFace::Quad([0, 1, 2, 3])], None).unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 3]]);
        for n in mesh.normals() {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn out_of_range_face_index_is_rejected() {
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let err = Mesh::new(vertices, vec![[0, 1, 3]], None).unwrap_err();
        assert!(matches!(
            err,
            FurError::FaceIndexOutOfRange {
                face: 0,
                index: 3,
                count: 3
            }
        ));
    }

    #[test]
    fn colinear_face_yields_degenerate_normal_error() {
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        let err = Mesh::new(vertices, vec![[0, 1, 2]], None).unwrap_err();
        assert!(matches!(err, FurError::DegenerateNormal(_)));
    }

    #[test]
    fn mismatched_normal_count_is_rejected() {
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let err = Mesh::new(vertices, vec![[0, 1, 2]], Some(vec![Vec3::Z])).unwrap_err();
        assert!(matches!(err, FurError::AttributeLengthMismatch { .. }));
    }

    #[test]
    fn uv_sphere_lies_on_the_unit_sphere() {
        let sphere = Mesh::uv_sphere(8, 12).unwrap();
        assert_eq!(sphere.vertices().len(), 9 * 13);
        assert_eq!(sphere.faces().len(), (8 * 12 * 2) as usize);
        for (v, n) in sphere.vertices().iter().zip(sphere.normals()) {
            assert!((v.length() - 1.0).abs() < 1e-5);
            assert!((*v - *n).length() < 1e-6);
        }
    }

    #[test]
    fn too_coarse_sphere_tessellation_is_rejected() {
        assert!(matches!(
            Mesh::uv_sphere(1, 12),
            Err(FurError::BadTessellation { .. })
        ));
    }
}
