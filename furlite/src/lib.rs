//! Furlite: shell-fur renderer. Expand a triangulated mesh into concentric
//! offset shells, upload the expanded geometry once, and draw every shell in
//! a single call per frame with tunable fur parameters.

pub mod buffer;
pub mod camera;
pub mod config;
pub mod error;
pub mod fur_pass;
pub mod material;
pub mod mesh;
pub mod noise;
pub mod obj;
pub mod shell;
pub mod uniforms;

pub use buffer::GpuMeshBuffer;
pub use camera::OrbitCamera;
pub use config::{DroopCurve, FurConfig, GravityScale, NoiseKind};
pub use error::FurError;
pub use fur_pass::FurPass;
pub use material::{FurMaterial, FurParameters};
pub use mesh::Mesh;
pub use obj::load_obj;
pub use shell::{expand, ShellMesh};

use glam::Mat4;

struct DepthTarget {
    texture: wgpu::Texture,
    width: u32,
    height: u32,
}

/// Owns the device, queue, and fur pass; drives one frame at a time. The GPU
/// context is a single exclusively owned resource handed between upload, bind,
/// and draw in sequence on one thread.
pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: FurConfig,
    fur_pass: FurPass,
    depth: Option<DepthTarget>,
}

impl Renderer {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: FurConfig,
    ) -> Result<Self, FurError> {
        let fur_pass = FurPass::new(&device, config.swapchain_format, Self::DEPTH_FORMAT)?;
        Ok(Self {
            device,
            queue,
            config,
            fur_pass,
            depth: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn config(&self) -> &FurConfig {
        &self.config
    }

    pub fn create_material(&self, params: FurParameters) -> Result<FurMaterial, FurError> {
        FurMaterial::new(
            &self.device,
            &self.queue,
            &self.fur_pass,
            self.config.clone(),
            params,
        )
    }

    fn ensure_depth(&mut self, width: u32, height: u32) -> Result<(), FurError> {
        if width == 0 || height == 0 {
            return Err(FurError::Gpu("zero-sized frame".to_string()));
        }
        if let Some(depth) = &self.depth {
            if depth.width == width && depth.height == height {
                return Ok(());
            }
        }
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("fur_depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        self.depth = Some(DepthTarget {
            texture,
            width,
            height,
        });
        Ok(())
    }

    /// Encode one frame into the given encoder: clear, bind the material with
    /// the current camera transforms, draw the shell mesh.
    #[allow(clippy::too_many_arguments)]
    pub fn encode_frame(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        width: u32,
        height: u32,
        proj: Mat4,
        view: Mat4,
        model: Mat4,
        material: &mut FurMaterial,
        mesh: &GpuMeshBuffer,
    ) -> Result<(), FurError> {
        self.ensure_depth(width, height)?;
        material.bind(&self.queue, proj, view, model)?;
        let depth_view = match &self.depth {
            Some(depth) => depth.texture.create_view(&Default::default()),
            None => return Err(FurError::Gpu("depth target missing".to_string())),
        };
        self.fur_pass.encode(
            encoder,
            surface_view,
            &depth_view,
            self.config.clear_color,
            material,
            mesh,
        )
    }

    /// Encode a full frame and return the finished command buffer.
    #[allow(clippy::too_many_arguments)]
    pub fn render_frame(
        &mut self,
        surface_view: &wgpu::TextureView,
        width: u32,
        height: u32,
        proj: Mat4,
        view: Mat4,
        model: Mat4,
        material: &mut FurMaterial,
        mesh: &GpuMeshBuffer,
    ) -> Result<wgpu::CommandBuffer, FurError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("fur_frame"),
            });
        self.encode_frame(
            &mut encoder,
            surface_view,
            width,
            height,
            proj,
            view,
            model,
            material,
            mesh,
        )?;
        Ok(encoder.finish())
    }

    pub fn submit(&self, command_buffers: impl IntoIterator<Item = wgpu::CommandBuffer>) {
        self.queue.submit(command_buffers);
    }
}
