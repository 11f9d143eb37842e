//! Fur parameters and the material that binds them to the fur pipeline.
//!
//! Interactive setters are best-effort: a non-positive density or length is
//! silently ignored and the prior valid value kept. These rejections are
//! routine (a key held one tick too long), not errors.

use glam::{Mat3, Mat4, Vec3};

use crate::config::{FurConfig, GravityScale};
use crate::error::FurError;
use crate::fur_pass::FurPass;
use crate::noise;
use crate::uniforms::{UniformBlock, UniformValue};

/// Direction the fur leans toward before any `set_direction` rotation.
pub const SEED_GRAVITY: Vec3 = Vec3::new(0.0, -0.2, 0.0);

#[derive(Clone, Copy, Debug)]
pub struct FurParameters {
    density: f32,
    length: f32,
    gravity: Vec3,
    seed_gravity: Vec3,
}

impl Default for FurParameters {
    fn default() -> Self {
        Self {
            density: 10.0,
            length: 0.2,
            gravity: SEED_GRAVITY,
            seed_gravity: SEED_GRAVITY,
        }
    }
}

impl FurParameters {
    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_density(&mut self, density: f32) {
        if !density.is_finite() || density <= 0.0 {
            log::debug!("ignoring non-positive density update: {density}");
            return;
        }
        self.density = density;
    }

    pub fn set_length(&mut self, length: f32) {
        if !length.is_finite() || length <= 0.0 {
            log::debug!("ignoring non-positive length update: {length}");
            return;
        }
        self.length = length;
    }

    /// Re-aim the lean direction: rotate the fixed seed vector through
    /// `R_x(theta) * R_y(phi)`. The magnitude of the seed vector is preserved.
    pub fn set_direction(&mut self, theta: f32, phi: f32) {
        let rotation = Mat3::from_rotation_x(theta) * Mat3::from_rotation_y(phi);
        self.gravity = rotation * self.seed_gravity;
    }
}

/// Owns the noise texture, the uniform block, and the bind group for the fur
/// pipeline. All GPU handles release deterministically when the material
/// drops.
pub struct FurMaterial {
    params: FurParameters,
    config: FurConfig,
    block: UniformBlock,
    uniform_buf: wgpu::Buffer,
    _noise_texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl FurMaterial {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pass: &FurPass,
        config: FurConfig,
        params: FurParameters,
    ) -> Result<Self, FurError> {
        let mut block = UniformBlock::new();
        for &(name, kind) in FurPass::UNIFORMS {
            block.register(name, kind);
        }
        let uniform_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fur_uniforms"),
            size: block.padded_size(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let size = config.noise_size;
        let samples = noise::generate(config.noise, config.noise_seed, size);
        let texels = noise::quantize(&samples);
        let extent = wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        };
        let noise_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("fur_noise"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &noise_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &texels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size),
                rows_per_image: Some(size),
            },
            extent,
        );
        let noise_view = noise_texture.create_view(&Default::default());
        let bind_group = pass.create_bind_group(device, &uniform_buf, &noise_view);

        Ok(Self {
            params,
            config,
            block,
            uniform_buf,
            _noise_texture: noise_texture,
            bind_group,
        })
    }

    pub fn params(&self) -> &FurParameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut FurParameters {
        &mut self.params
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Compute the combined transforms and push them, the current parameters,
    /// and the shading constants to the shader in one buffer write.
    pub fn bind(
        &mut self,
        queue: &wgpu::Queue,
        proj: Mat4,
        view: Mat4,
        model: Mat4,
    ) -> Result<(), FurError> {
        let model_view = view * model;
        // Inverse-transpose of the upper 3x3 keeps normals correct under
        // non-uniform scale.
        let normal_mat = Mat3::from_mat4(model_view).inverse().transpose();
        let gravity_scale = match self.config.gravity_scale {
            GravityScale::None => 1.0,
            GravityScale::ByLength => self.params.length(),
        };

        let block = &mut self.block;
        block.set("proj_model_view", UniformValue::Mat4(proj * model_view))?;
        block.set("model_view", UniformValue::Mat4(model_view))?;
        block.set("normal_mat", UniformValue::Mat3(normal_mat))?;
        block.set("gravity", UniformValue::Vec3(self.params.gravity()))?;
        block.set("density", UniformValue::Float(self.params.density()))?;
        block.set("fur_length", UniformValue::Float(self.params.length()))?;
        block.set(
            "droop_exponent",
            UniformValue::Float(self.config.droop.exponent()),
        )?;
        block.set("gravity_scale", UniformValue::Float(gravity_scale))?;
        block.set(
            "light_dir",
            UniformValue::Vec3(Vec3::from(self.config.light_dir).normalize_or_zero()),
        )?;
        block.set("ambient", UniformValue::Float(self.config.ambient))?;
        block.set(
            "base_color",
            UniformValue::Vec3(Vec3::from(self.config.base_color)),
        )?;

        queue.write_buffer(&self.uniform_buf, 0, self.block.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_density_updates_keep_the_prior_value() {
        let mut params = FurParameters::default();
        params.set_density(-1.0);
        assert_eq!(params.density(), 10.0);
        params.set_density(0.0);
        assert_eq!(params.density(), 10.0);
        params.set_density(2.5);
        assert_eq!(params.density(), 2.5);
        params.set_density(f32::NAN);
        assert_eq!(params.density(), 2.5);
    }

    #[test]
    fn non_positive_length_updates_keep_the_prior_value() {
        let mut params = FurParameters::default();
        params.set_length(0.0);
        assert_eq!(params.length(), 0.2);
        params.set_length(-0.5);
        assert_eq!(params.length(), 0.2);
        params.set_length(0.35);
        assert_eq!(params.length(), 0.35);
    }

    #[test]
    fn set_direction_preserves_the_seed_magnitude() {
        let mut params = FurParameters::default();
        let magnitude = SEED_GRAVITY.length();
        for (theta, phi) in [
            (0.0, 0.0),
            (0.5, 1.2),
            (-2.0, 3.0),
            (std::f32::consts::PI, std::f32::consts::FRAC_PI_2),
        ] {
            params.set_direction(theta, phi);
            assert!((params.gravity().length() - magnitude).abs() < 1e-6);
        }
    }

    #[test]
    fn set_direction_rotates_from_the_seed_not_cumulatively() {
        let mut params = FurParameters::default();
        params.set_direction(1.0, 2.0);
        params.set_direction(0.0, 0.0);
        assert!((params.gravity() - SEED_GRAVITY).length() < 1e-6);
    }
}
