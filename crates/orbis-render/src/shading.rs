//! Planet shading: the per-frame uniform block and the surface, atmosphere,
//! and aurora pipelines.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

use crate::buffer::{MeshBuffer, VertexPositionNormalUv};
use crate::camera::CameraUniform;
use crate::depth::{DepthBuffer, DepthMode};
use crate::post::HDR_FORMAT;
use crate::shader::{SceneShader, ShaderError, ShaderLibrary};
use crate::texture::{GpuTexture, create_sampler};

/// The uniform block every scene shader reads at group 0. Written once per
/// frame, after the sun direction has been resolved.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobeUniforms {
    pub camera: CameraUniform,
    pub earth_model: [[f32; 4]; 4],
    pub sun_dir: [f32; 4],
    /// Cloud offset, aurora time, displacement scale, displacement bias.
    pub params: [f32; 4],
}

/// World state feeding [`GlobeUniforms`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobeFrame {
    pub earth_model: Mat4,
    pub sun_direction: Vec3,
    pub cloud_offset: f32,
    pub aurora_time: f32,
    pub displace_scale: f32,
    pub displace_bias: f32,
}

impl GlobeUniforms {
    pub fn new(camera: CameraUniform, globe: &GlobeFrame) -> Self {
        Self {
            camera,
            earth_model: globe.earth_model.to_cols_array_2d(),
            sun_dir: globe.sun_direction.normalize_or_zero().extend(0.0).to_array(),
            params: [
                globe.cloud_offset,
                globe.aurora_time,
                globe.displace_scale,
                globe.displace_bias,
            ],
        }
    }
}

/// Uniform buffer and bind group for [`GlobeUniforms`].
pub struct FrameBinding {
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    buffer: wgpu::Buffer,
}

impl FrameBinding {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<GlobeUniforms>() as u64),
                },
                count: None,
            }],
        });
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame-uniforms"),
            contents: bytemuck::bytes_of(&GlobeUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            layout,
            bind_group,
            buffer,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniforms: &GlobeUniforms) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniforms));
    }
}

/// Color blending for a scene pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blending {
    Opaque,
    Alpha,
    /// `src·alpha + dst`.
    Additive,
}

impl Blending {
    pub fn state(self) -> Option<wgpu::BlendState> {
        match self {
            Blending::Opaque => None,
            Blending::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
            Blending::Additive => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            }),
        }
    }
}

/// Fixed-function state for one scene pipeline.
pub(crate) struct PipelineSpec<'a> {
    pub label: &'a str,
    pub layout: &'a wgpu::PipelineLayout,
    pub shader: &'a wgpu::ShaderModule,
    pub buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub topology: wgpu::PrimitiveTopology,
    pub cull_mode: Option<wgpu::Face>,
    pub blending: Blending,
    pub depth: DepthMode,
}

pub(crate) fn create_scene_pipeline(
    device: &wgpu::Device,
    spec: PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(spec.layout),
        vertex: wgpu::VertexState {
            module: spec.shader,
            entry_point: Some("vs_main"),
            buffers: spec.buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: spec.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(DepthBuffer::state(spec.depth)),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: spec.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: spec.blending.state(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

/// Textures sampled by the surface shader.
pub struct SurfaceTextures<'a> {
    pub day: &'a GpuTexture,
    pub night: &'a GpuTexture,
    pub clouds: &'a GpuTexture,
    pub height: &'a GpuTexture,
}

/// Surface, atmosphere, and aurora pipelines sharing one sphere mesh.
pub struct GlobePipelines {
    surface: wgpu::RenderPipeline,
    atmosphere: wgpu::RenderPipeline,
    aurora: wgpu::RenderPipeline,
    surface_bind_group: wgpu::BindGroup,
}

impl GlobePipelines {
    pub fn new(
        device: &wgpu::Device,
        shaders: &ShaderLibrary,
        frame: &FrameBinding,
        textures: SurfaceTextures<'_>,
    ) -> Result<Self, ShaderError> {
        let texture_entry = |binding: u32, visibility: wgpu::ShaderStages| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }
        };
        let sampler_entry = |binding: u32, visibility: wgpu::ShaderStages| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            }
        };
        let fragment = wgpu::ShaderStages::FRAGMENT;
        let both = wgpu::ShaderStages::VERTEX_FRAGMENT;

        let surface_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("surface-textures-bgl"),
            entries: &[
                texture_entry(0, fragment),
                texture_entry(1, fragment),
                texture_entry(2, fragment),
                texture_entry(3, both),
                sampler_entry(4, both),
                sampler_entry(5, fragment),
            ],
        });

        let clamp_sampler = create_sampler(device, wgpu::AddressMode::ClampToEdge, "globe-clamp");
        let repeat_sampler = create_sampler(device, wgpu::AddressMode::Repeat, "cloud-repeat");

        let surface_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("surface-textures"),
            layout: &surface_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&textures.day.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&textures.night.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&textures.clouds.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&textures.height.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&clamp_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&repeat_sampler),
                },
            ],
        });

        let surface_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("surface-pipeline-layout"),
            bind_group_layouts: &[&frame.layout, &surface_bgl],
            immediate_size: 0,
        });
        let shell_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shell-pipeline-layout"),
            bind_group_layouts: &[&frame.layout],
            immediate_size: 0,
        });

        let buffers = [VertexPositionNormalUv::layout()];
        let surface = create_scene_pipeline(
            device,
            PipelineSpec {
                label: "surface-pipeline",
                layout: &surface_layout,
                shader: &*shaders.require(SceneShader::Surface)?,
                buffers: &buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                blending: Blending::Opaque,
                depth: DepthMode::Opaque,
            },
        );
        // Drawn from inside so the glow wraps the limb.
        let atmosphere = create_scene_pipeline(
            device,
            PipelineSpec {
                label: "atmosphere-pipeline",
                layout: &shell_layout,
                shader: &*shaders.require(SceneShader::Atmosphere)?,
                buffers: &buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Front),
                blending: Blending::Additive,
                depth: DepthMode::Ignore,
            },
        );
        let aurora = create_scene_pipeline(
            device,
            PipelineSpec {
                label: "aurora-pipeline",
                layout: &shell_layout,
                shader: &*shaders.require(SceneShader::Aurora)?,
                buffers: &buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                blending: Blending::Additive,
                depth: DepthMode::TestOnly,
            },
        );

        Ok(Self {
            surface,
            atmosphere,
            aurora,
            surface_bind_group,
        })
    }

    pub fn draw_surface<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        frame: &'a FrameBinding,
        sphere: &'a MeshBuffer,
    ) {
        pass.set_pipeline(&self.surface);
        pass.set_bind_group(0, &frame.bind_group, &[]);
        pass.set_bind_group(1, &self.surface_bind_group, &[]);
        sphere.bind(pass);
        sphere.draw(pass);
    }

    pub fn draw_atmosphere<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        frame: &'a FrameBinding,
        sphere: &'a MeshBuffer,
    ) {
        self.draw_shell(pass, &self.atmosphere, frame, sphere);
    }

    pub fn draw_aurora<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        frame: &'a FrameBinding,
        sphere: &'a MeshBuffer,
    ) {
        self.draw_shell(pass, &self.aurora, frame, sphere);
    }

    fn draw_shell<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        pipeline: &'a wgpu::RenderPipeline,
        frame: &'a FrameBinding,
        sphere: &'a MeshBuffer,
    ) {
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &frame.bind_group, &[]);
        sphere.bind(pass);
        sphere.draw(pass);
    }
}
