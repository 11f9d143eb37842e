//! Fur pass: one pipeline drawing every shell of the expanded mesh in a
//! single indexed call. Shell blocks are ordered inner to outer in the
//! buffers, so draw order matches blend order.

use wgpu::CommandEncoder;

use crate::buffer::GpuMeshBuffer;
use crate::error::FurError;
use crate::material::FurMaterial;
use crate::uniforms::UniformKind;

const FUR_SHADER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/fur.wgsl"));

pub struct FurPass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl FurPass {
    /// Registration order of the material's uniform block. Offsets computed
    /// from this sequence must match the `FurUniforms` struct in `fur.wgsl`.
    pub const UNIFORMS: &'static [(&'static str, UniformKind)] = &[
        ("proj_model_view", UniformKind::Mat4),
        ("model_view", UniformKind::Mat4),
        ("normal_mat", UniformKind::Mat3),
        ("gravity", UniformKind::Vec3),
        ("density", UniformKind::Float),
        ("fur_length", UniformKind::Float),
        ("droop_exponent", UniformKind::Float),
        ("gravity_scale", UniformKind::Float),
        ("light_dir", UniformKind::Vec3),
        ("ambient", UniformKind::Float),
        ("base_color", UniformKind::Vec3),
    ];

    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Result<Self, FurError> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fur_shader"),
            source: wgpu::ShaderSource::Wgsl(FUR_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fur_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fur_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fur_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: 12,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 12,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x3,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 4,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Float32,
                        }],
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: output_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("fur_noise_sampler"),
            address_mode_u: wgpu::AddressMode::MirrorRepeat,
            address_mode_v: wgpu::AddressMode::MirrorRepeat,
            address_mode_w: wgpu::AddressMode::MirrorRepeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            sampler,
        })
    }

    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        uniform_buf: &wgpu::Buffer,
        noise_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fur_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(noise_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    pub fn encode(
        &self,
        encoder: &mut CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        clear_color: wgpu::Color,
        material: &FurMaterial,
        mesh: &GpuMeshBuffer,
    ) -> Result<(), FurError> {
        let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fur_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rp.set_pipeline(&self.pipeline);
        rp.set_bind_group(0, material.bind_group(), &[]);
        mesh.record(&mut rp)?;
        drop(rp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::uniforms::UniformBlock;

    use super::*;

    #[test]
    fn registration_offsets_match_the_wgsl_struct() {
        let mut block = UniformBlock::new();
        for &(name, kind) in FurPass::UNIFORMS {
            block.register(name, kind);
        }
        // Offsets of the FurUniforms struct in shaders/fur.wgsl.
        assert_eq!(block.offset_of("proj_model_view"), Some(0));
        assert_eq!(block.offset_of("model_view"), Some(64));
        assert_eq!(block.offset_of("normal_mat"), Some(128));
        assert_eq!(block.offset_of("gravity"), Some(176));
        assert_eq!(block.offset_of("density"), Some(188));
        assert_eq!(block.offset_of("fur_length"), Some(192));
        assert_eq!(block.offset_of("droop_exponent"), Some(196));
        assert_eq!(block.offset_of("gravity_scale"), Some(200));
        assert_eq!(block.offset_of("light_dir"), Some(208));
        assert_eq!(block.offset_of("ambient"), Some(220));
        assert_eq!(block.offset_of("base_color"), Some(224));
        assert_eq!(block.padded_size(), 240);
    }
}
