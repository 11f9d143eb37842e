//! Named uniform block with offsets resolved once, at registration time.
//!
//! Values are a tagged variant over the shader-visible kinds; setting a name
//! that was never registered, or setting a registered name with the wrong
//! kind, fails immediately rather than every frame at draw time. The staged
//! bytes follow WGSL uniform address-space layout rules and are uploaded with
//! a single `write_buffer` per bind.

use glam::{Mat3, Mat4, Vec3};

use crate::error::FurError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Int,
    Float,
    Vec3,
    Mat3,
    Mat4,
}

impl UniformKind {
    fn align(self) -> usize {
        match self {
            UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec3 | UniformKind::Mat3 | UniformKind::Mat4 => 16,
        }
    }

    fn size(self) -> usize {
        match self {
            UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec3 => 12,
            // mat3x3 columns are padded to vec4.
            UniformKind::Mat3 => 48,
            UniformKind::Mat4 => 64,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Mat3(_) => UniformKind::Mat3,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

#[derive(Default)]
pub struct UniformBlock {
    fields: Vec<(String, UniformKind, usize)>,
    data: Vec<u8>,
}

impl UniformBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named uniform and return its byte offset in the block.
    pub fn register(&mut self, name: &str, kind: UniformKind) -> usize {
        let offset = align_up(self.data.len(), kind.align());
        self.data.resize(offset + kind.size(), 0);
        self.fields.push((name.to_string(), kind, offset));
        offset
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|(n, ..)| n == name)
            .map(|&(_, _, offset)| offset)
    }

    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), FurError> {
        let &(_, kind, offset) = self
            .fields
            .iter()
            .find(|(n, ..)| n == name)
            .ok_or_else(|| FurError::NoSuchUniform(name.to_string()))?;
        if value.kind() != kind {
            return Err(FurError::UniformTypeMismatch {
                name: name.to_string(),
                registered: kind,
                got: value.kind(),
            });
        }
        match value {
            UniformValue::Int(v) => {
                self.data[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
            }
            UniformValue::Float(v) => {
                self.data[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
            }
            UniformValue::Vec3(v) => {
                self.data[offset..offset + 12].copy_from_slice(bytemuck::bytes_of(&v));
            }
            UniformValue::Mat3(m) => {
                for (c, column) in m.to_cols_array_2d().iter().enumerate() {
                    let at = offset + c * 16;
                    self.data[at..at + 12].copy_from_slice(bytemuck::cast_slice(column));
                }
            }
            UniformValue::Mat4(m) => {
                self.data[offset..offset + 64].copy_from_slice(bytemuck::bytes_of(&m));
            }
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Buffer size rounded to the uniform struct alignment.
    pub fn padded_size(&self) -> u64 {
        align_up(self.data.len(), 16) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_wgsl_uniform_layout() {
        let mut block = UniformBlock::new();
        assert_eq!(block.register("m4", UniformKind::Mat4), 0);
        assert_eq!(block.register("m3", UniformKind::Mat3), 64);
        assert_eq!(block.register("dir", UniformKind::Vec3), 112);
        // A scalar packs into the tail of the vec3 slot.
        assert_eq!(block.register("scale", UniformKind::Float), 124);
        assert_eq!(block.register("mode", UniformKind::Int), 128);
        // The next vec3 realigns to 16.
        assert_eq!(block.register("color", UniformKind::Vec3), 144);
        assert_eq!(block.padded_size(), 160);
    }

    #[test]
    fn unknown_name_fails_fast() {
        let mut block = UniformBlock::new();
        block.register("density", UniformKind::Float);
        let err = block.set("densty", UniformValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, FurError::NoSuchUniform(name) if name == "densty"));
    }

    #[test]
    fn kind_mismatch_fails_fast() {
        let mut block = UniformBlock::new();
        block.register("gravity", UniformKind::Vec3);
        let err = block.set("gravity", UniformValue::Float(1.0)).unwrap_err();
        assert!(matches!(
            err,
            FurError::UniformTypeMismatch {
                registered: UniformKind::Vec3,
                got: UniformKind::Float,
                ..
            }
        ));
    }

    #[test]
    fn scalar_writes_land_at_their_registered_offset() {
        let mut block = UniformBlock::new();
        block.register("m4", UniformKind::Mat4);
        let offset = block.register("density", UniformKind::Float);
        block.set("density", UniformValue::Float(2.5)).unwrap();
        let bytes = &block.as_bytes()[offset..offset + 4];
        assert_eq!(bytes, 2.5f32.to_le_bytes());
    }

    #[test]
    fn mat3_columns_are_padded_to_vec4() {
        let mut block = UniformBlock::new();
        let offset = block.register("m3", UniformKind::Mat3);
        let m = Mat3::from_cols(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(7.0, 8.0, 9.0),
        );
        block.set("m3", UniformValue::Mat3(m)).unwrap();
        let bytes = block.as_bytes();
        for (c, expected) in [[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]
            .iter()
            .enumerate()
        {
            let at = offset + c * 16;
            let got: &[f32] = bytemuck::cast_slice(&bytes[at..at + 12]);
            assert_eq!(got, expected);
        }
    }
}
