//! Fur renderer configuration: shell styling, noise field, shading, swapchain.
//!
//! Everything the source material kept as shared mutable defaults lives here
//! as an explicit struct handed to `FurMaterial::new`; instances never share
//! state.

/// How the gravity lean grows along shell depth. The source variants disagree
/// on linear vs cubic droop, so it is configuration, not a fixed law.
#[derive(Clone, Copy, Debug, Default)]
pub enum DroopCurve {
    Linear,
    /// Tip droops much more than the root.
    #[default]
    Cubic,
}

impl DroopCurve {
    pub fn exponent(self) -> f32 {
        match self {
            DroopCurve::Linear => 1.0,
            DroopCurve::Cubic => 3.0,
        }
    }
}

/// Whether the gravity contribution is additionally scaled by the current fur
/// length before it reaches the shader.
#[derive(Clone, Copy, Debug, Default)]
pub enum GravityScale {
    #[default]
    None,
    ByLength,
}

/// Distribution the noise field is drawn from. Affects the visual clumpiness
/// of the strands, not the geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoiseKind {
    /// Uniform 0/1 samples: hard strand mask.
    #[default]
    Binary,
    /// Clamped normal distribution (mean 0.5, sd 0.5): softer clumps.
    Gaussian,
}

#[derive(Clone, Debug)]
pub struct FurConfig {
    pub droop: DroopCurve,
    pub gravity_scale: GravityScale,
    pub noise: NoiseKind,
    /// Seed for the reproducible noise field.
    pub noise_seed: u64,
    /// Side length of the square single-channel noise texture.
    pub noise_size: u32,
    pub base_color: [f32; 3],
    /// Light direction in eye space.
    pub light_dir: [f32; 3],
    pub ambient: f32,
    pub clear_color: wgpu::Color,
    /// Swapchain texture format the fur pipeline renders into.
    pub swapchain_format: wgpu::TextureFormat,
}

impl Default for FurConfig {
    fn default() -> Self {
        Self {
            droop: DroopCurve::default(),
            gravity_scale: GravityScale::default(),
            noise: NoiseKind::default(),
            noise_seed: 0x5eed_f00d,
            noise_size: 512,
            base_color: [0.55, 0.38, 0.22],
            light_dir: [-0.3, -0.6, -0.74],
            ambient: 0.25,
            clear_color: wgpu::Color::BLACK,
            swapchain_format: wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}
