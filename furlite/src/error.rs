//! Error taxonomy for the fur pipeline.
//!
//! Contract violations and lifecycle errors are fatal to the operation that
//! hit them; nothing here is retried. Interactive parameter rejections are
//! deliberately *not* errors (see `FurParameters`).

use std::path::PathBuf;

use thiserror::Error;

use crate::uniforms::UniformKind;

#[derive(Debug, Error)]
pub enum FurError {
    #[error("shell layer count must be at least 1")]
    InvalidLayerCount,

    #[error("shell length must be finite and non-negative, got {0}")]
    InvalidLength(f32),

    #[error("attribute length mismatch: {name} has {got} entries, expected {expected}")]
    AttributeLengthMismatch {
        name: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("face {face} references vertex {index}, but the mesh has {count} vertices")]
    FaceIndexOutOfRange { face: usize, index: u32, count: usize },

    #[error("face must have 3 or 4 vertices, got {0}")]
    BadFaceArity(usize),

    #[error("degenerate normal at vertex {0}: surrounding faces have zero area")]
    DegenerateNormal(usize),

    #[error("sphere tessellation needs at least 2 stacks and 3 slices, got {stacks}x{slices}")]
    BadTessellation { stacks: u32, slices: u32 },

    #[error("{}: line {line}: {message}", path.display())]
    MeshFormat {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no such uniform: {0}")]
    NoSuchUniform(String),

    #[error("uniform {name} was registered as {registered:?}, got a {got:?} value")]
    UniformTypeMismatch {
        name: String,
        registered: UniformKind,
        got: UniformKind,
    },

    #[error("draw requested before any shell mesh was uploaded")]
    NotUploaded,

    #[error("gpu error: {0}")]
    Gpu(String),
}
