//! Shell expansion: tile a base mesh into `L` outward-offset copies.
//!
//! Copy `i` is translated along each vertex normal by `length * (i / L)` and
//! carries a parallel layer-fraction attribute with value `i / L`. Face
//! indices in copy `i` are offset by `i * base_vertex_count` so they keep
//! addressing the correct vertex copy. Expansion happens once per mesh or
//! layer-count change, never per frame.

use glam::Vec3;

use crate::error::FurError;
use crate::mesh::Mesh;

/// A base mesh expanded into concentric shells, ready for one-time GPU upload.
/// Shell blocks are ordered innermost first.
pub struct ShellMesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Layer fraction per expanded vertex: `i / layer_count`, in `[0, 1)`.
    pub layers: Vec<f32>,
    pub faces: Vec<[u32; 3]>,
    pub layer_count: u32,
    pub base_vertex_count: usize,
}

impl ShellMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.faces.len() * 3
    }

    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }
}

/// Expand `mesh` into `layers` shells with maximum outward offset `length`.
///
/// `layers == 1` is valid but degenerate: positions are untouched and every
/// layer fraction is zero (innermost shell only). Callers wanting a credible
/// fur effect pass `layers >= 8`.
pub fn expand(mesh: &Mesh, layers: u32, length: f32) -> Result<ShellMesh, FurError> {
    if layers == 0 {
        return Err(FurError::InvalidLayerCount);
    }
    if !length.is_finite() || length < 0.0 {
        return Err(FurError::InvalidLength(length));
    }

    let base_vertex_count = mesh.vertices().len();
    let base_face_count = mesh.faces().len();
    let total = layers as usize;

    let mut vertices: Vec<Vec3> = Vec::with_capacity(base_vertex_count * total);
    let mut normals: Vec<Vec3> = Vec::with_capacity(base_vertex_count * total);
    let mut fractions: Vec<f32> = Vec::with_capacity(base_vertex_count * total);
    let mut faces: Vec<[u32; 3]> = Vec::with_capacity(base_face_count * total);

    for i in 0..layers {
        let frac = i as f32 / layers as f32;

        // Block-copy the base arrays, then offset the fresh block in place.
        let block_start = vertices.len();
        vertices.extend_from_slice(mesh.vertices());
        if frac > 0.0 && length > 0.0 {
            let offset = length * frac;
            for (v, n) in vertices[block_start..].iter_mut().zip(mesh.normals()) {
                *v += *n * offset;
            }
        }
        normals.extend_from_slice(mesh.normals());
        fractions.resize(fractions.len() + base_vertex_count, frac);

        let face_start = faces.len();
        faces.extend_from_slice(mesh.faces());
        let index_offset = i * base_vertex_count as u32;
        if index_offset > 0 {
            for face in &mut faces[face_start..] {
                for index in face {
                    *index += index_offset;
                }
            }
        }
    }

    log::debug!(
        "expanded mesh: {} shells, {} vertices, {} faces",
        layers,
        vertices.len(),
        faces.len()
    );

    Ok(ShellMesh {
        vertices,
        normals,
        layers: fractions,
        faces,
        layer_count: layers,
        base_vertex_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_layers_is_a_contract_violation() {
        let cube = Mesh::cube();
        assert!(matches!(
            expand(&cube, 0, 0.1),
            Err(FurError::InvalidLayerCount)
        ));
    }

    #[test]
    fn negative_or_non_finite_length_is_rejected() {
        let cube = Mesh::cube();
        assert!(matches!(
            expand(&cube, 4, -0.1),
            Err(FurError::InvalidLength(_))
        ));
        assert!(matches!(
            expand(&cube, 4, f32::NAN),
            Err(FurError::InvalidLength(_))
        ));
    }

    #[test]
    fn output_sizes_scale_with_layer_count() {
        let cube = Mesh::cube();
        for layers in [1u32, 2, 8, 16] {
            let shell = expand(&cube, layers, 0.3).unwrap();
            assert_eq!(shell.vertices.len(), layers as usize * cube.vertices().len());
            assert_eq!(shell.normals.len(), shell.vertices.len());
            assert_eq!(shell.layers.len(), shell.vertices.len());
            assert_eq!(shell.faces.len(), layers as usize * cube.faces().len());
        }
    }

    #[test]
    fn face_indices_resolve_block_relative_to_the_base_mesh() {
        let cube = Mesh::cube();
        let layers = 5u32;
        let shell = expand(&cube, layers, 0.2).unwrap();
        let base_v = cube.vertices().len() as u32;
        let base_f = cube.faces().len();
        for (fi, face) in shell.faces.iter().enumerate() {
            let block = (fi / base_f) as u32;
            for &index in face {
                assert!(index < layers * base_v);
                let local = index - block * base_v;
                assert!((local as usize) < cube.vertices().len());
            }
            assert_eq!(*face, {
                let base = cube.faces()[fi % base_f];
                base.map(|i| i + block * base_v)
            });
        }
    }

    #[test]
    fn layer_fractions_are_constant_per_block_and_monotone() {
        let cube = Mesh::cube();
        let layers = 6u32;
        let shell = expand(&cube, layers, 0.2).unwrap();
        let base_v = cube.vertices().len();
        let mut previous = -1.0f32;
        for block in 0..layers as usize {
            let expected = block as f32 / layers as f32;
            assert!(expected >= 0.0 && expected < 1.0);
            assert!(expected > previous);
            for &frac in &shell.layers[block * base_v..(block + 1) * base_v] {
                assert_eq!(frac, expected);
            }
            previous = expected;
        }
    }

    #[test]
    fn single_layer_is_the_identity_on_positions() {
        let cube = Mesh::cube();
        let shell = expand(&cube, 1, 0.5).unwrap();
        assert_eq!(shell.vertices.len(), cube.vertices().len());
        for (a, b) in shell.vertices.iter().zip(cube.vertices()) {
            assert_eq!(a, b);
        }
        assert!(shell.layers.iter().all(|&l| l == 0.0));
    }

    #[test]
    fn outermost_cube_shell_is_offset_by_length_times_last_fraction() {
        let cube = Mesh::cube();
        let shell = expand(&cube, 4, 0.1).unwrap();
        let base_v = cube.vertices().len();
        let outer = &shell.vertices[3 * base_v..];
        for ((v, base), n) in outer.iter().zip(cube.vertices()).zip(cube.normals()) {
            let offset = *v - *base;
            assert!((offset.length() - 0.075).abs() < 1e-6);
            // Offset lies along the vertex normal.
            assert!((offset.normalize() - *n).length() < 1e-5);
        }
    }

    #[test]
    fn zero_length_keeps_every_block_at_base_positions() {
        let cube = Mesh::cube();
        let shell = expand(&cube, 3, 0.0).unwrap();
        let base_v = cube.vertices().len();
        for block in 0..3 {
            for (v, base) in shell.vertices[block * base_v..(block + 1) * base_v]
                .iter()
                .zip(cube.vertices())
            {
                assert_eq!(v, base);
            }
        }
    }
}
