//! GPU-resident buffers for an expanded shell mesh.
//!
//! Three named attribute buffers (position, normal, layer fraction) plus an
//! optional index buffer. Upload happens once per mesh or layer-count change;
//! per-frame work is limited to binding. A re-upload replaces the previous
//! buffer set wholesale, so a partially written state is never observable and
//! the old allocations are released when the handles drop.

use crate::error::FurError;
use crate::shell::ShellMesh;

#[derive(Default)]
pub struct GpuMeshBuffer {
    position_buf: Option<wgpu::Buffer>,
    normal_buf: Option<wgpu::Buffer>,
    layer_buf: Option<wgpu::Buffer>,
    index_buf: Option<wgpu::Buffer>,
    vertex_count: u32,
    index_count: u32,
}

impl GpuMeshBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload the expanded geometry. Index-buffer existence tracks face
    /// presence exactly: a shell mesh without faces drops any previous index
    /// buffer, one with faces recreates it.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shell: &ShellMesh,
    ) -> Result<(), FurError> {
        let vertex_count = shell.vertices.len();
        if shell.normals.len() != vertex_count {
            return Err(FurError::AttributeLengthMismatch {
                name: "normal",
                got: shell.normals.len(),
                expected: vertex_count,
            });
        }
        if shell.layers.len() != vertex_count {
            return Err(FurError::AttributeLengthMismatch {
                name: "layer",
                got: shell.layers.len(),
                expected: vertex_count,
            });
        }

        let make = |label: &str, bytes: &[u8], usage: wgpu::BufferUsages| {
            let buf = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: bytes.len() as u64,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            queue.write_buffer(&buf, 0, bytes);
            buf
        };

        self.position_buf = Some(make(
            "fur_position",
            bytemuck::cast_slice(&shell.vertices),
            wgpu::BufferUsages::VERTEX,
        ));
        self.normal_buf = Some(make(
            "fur_normal",
            bytemuck::cast_slice(&shell.normals),
            wgpu::BufferUsages::VERTEX,
        ));
        self.layer_buf = Some(make(
            "fur_layer",
            bytemuck::cast_slice(&shell.layers),
            wgpu::BufferUsages::VERTEX,
        ));
        if shell.has_faces() {
            self.index_buf = Some(make(
                "fur_index",
                bytemuck::cast_slice(&shell.faces),
                wgpu::BufferUsages::INDEX,
            ));
            self.index_count = shell.index_count() as u32;
        } else {
            self.index_buf = None;
            self.index_count = 0;
        }
        self.vertex_count = vertex_count as u32;

        log::debug!(
            "uploaded shell mesh: {} vertices, {} indices",
            self.vertex_count,
            self.index_count
        );
        Ok(())
    }

    pub fn is_uploaded(&self) -> bool {
        self.position_buf.is_some()
    }

    /// Bind the attribute buffers and issue the draw. Recording before any
    /// upload is a programming error, fatal to the frame.
    pub fn record(&self, rp: &mut wgpu::RenderPass<'_>) -> Result<(), FurError> {
        let (Some(position), Some(normal), Some(layer)) =
            (&self.position_buf, &self.normal_buf, &self.layer_buf)
        else {
            return Err(FurError::NotUploaded);
        };
        rp.set_vertex_buffer(0, position.slice(..));
        rp.set_vertex_buffer(1, normal.slice(..));
        rp.set_vertex_buffer(2, layer.slice(..));
        match &self.index_buf {
            Some(index) => {
                rp.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
                rp.draw_indexed(0..self.index_count, 0, 0..1);
            }
            None => rp.draw(0..self.vertex_count, 0..1),
        }
        Ok(())
    }
}
