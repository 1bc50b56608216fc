//! HDR scene target, bloom chain, and the final resolve onto the surface.
//!
//! The scene always renders into an `Rgba16Float` target. With bloom off the
//! resolve pass copies it straight to the swapchain; with bloom on, bright
//! pixels are extracted at half resolution, blurred down and back up a mip
//! chain, and added during the resolve.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Format of the scene target and bloom mips.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

const POST_SHADER_SOURCE: &str = include_str!("shaders/post.wgsl");

/// Bloom parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct BloomConfig {
    /// Luminance above which pixels contribute.
    pub threshold: f32,
    /// Width of the soft threshold knee.
    pub soft_knee: f32,
    /// Multiplier applied to the blurred glow in the resolve pass.
    pub strength: f32,
    /// Tap spread during upsampling.
    pub radius: f32,
    /// Mip levels in the blur chain.
    pub iterations: u32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            threshold: 0.95,
            soft_knee: 0.1,
            strength: 0.25,
            radius: 0.3,
            iterations: 5,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct PostParams {
    threshold: f32,
    soft_knee: f32,
    strength: f32,
    radius: f32,
}

impl PostParams {
    fn new(config: &BloomConfig, enabled: bool) -> Self {
        Self {
            threshold: config.threshold,
            soft_knee: config.soft_knee,
            strength: if enabled { config.strength } else { 0.0 },
            radius: config.radius,
        }
    }
}

struct RenderTarget {
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

/// Post-processing chain owning the HDR scene target.
pub struct PostProcess {
    config: BloomConfig,
    texture_bgl: wgpu::BindGroupLayout,
    extract_pipeline: wgpu::RenderPipeline,
    downsample_pipeline: wgpu::RenderPipeline,
    upsample_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
    scene: RenderTarget,
    mips: Vec<RenderTarget>,
}

impl PostProcess {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: BloomConfig,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post-shader"),
            source: wgpu::ShaderSource::Wgsl(POST_SHADER_SOURCE.into()),
        });

        let params_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post-params-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(16),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post-texture-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let chain_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("post-chain-layout"),
            bind_group_layouts: &[&params_bgl, &texture_bgl],
            immediate_size: 0,
        });
        let composite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("post-composite-layout"),
            bind_group_layouts: &[&params_bgl, &texture_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent::OVER,
        };

        let extract_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &chain_layout,
            "fs_extract",
            HDR_FORMAT,
            None,
            "bloom-extract",
        );
        let downsample_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &chain_layout,
            "fs_downsample",
            HDR_FORMAT,
            None,
            "bloom-downsample",
        );
        let upsample_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &chain_layout,
            "fs_upsample",
            HDR_FORMAT,
            Some(additive),
            "bloom-upsample",
        );
        let composite_pipeline = create_fullscreen_pipeline(
            device,
            &shader,
            &composite_layout,
            "fs_composite",
            surface_format,
            None,
            "post-composite",
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("post-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("post-params"),
            contents: bytemuck::cast_slice(&[PostParams::new(&config, false)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("post-params-bg"),
            layout: &params_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        let scene = create_target(device, &texture_bgl, &sampler, width, height, "scene-hdr");
        let mips = create_mip_chain(device, &texture_bgl, &sampler, width, height, &config);

        Self {
            config,
            texture_bgl,
            extract_pipeline,
            downsample_pipeline,
            upsample_pipeline,
            composite_pipeline,
            sampler,
            params_buffer,
            params_bind_group,
            scene,
            mips,
        }
    }

    /// The view the scene pass renders into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.scene.view
    }

    pub fn config(&self) -> &BloomConfig {
        &self.config
    }

    /// Recreate the scene target and mip chain after a resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.scene = create_target(
            device,
            &self.texture_bgl,
            &self.sampler,
            width,
            height,
            "scene-hdr",
        );
        self.mips = create_mip_chain(
            device,
            &self.texture_bgl,
            &self.sampler,
            width,
            height,
            &self.config,
        );
    }

    /// Upload this frame's bloom strength. Zero when bloom is disabled.
    pub fn set_strength(&mut self, queue: &wgpu::Queue, strength: f32, enabled: bool) {
        self.config.strength = strength;
        let params = PostParams::new(&self.config, enabled);
        queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));
    }

    /// Resolve the scene onto `surface_view`, running the bloom chain first
    /// when `bloom_enabled`.
    pub fn execute(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        bloom_enabled: bool,
    ) {
        let levels = (self.config.iterations as usize).min(self.mips.len());
        if bloom_enabled && levels > 0 {
            self.run_bloom_chain(encoder, levels);
        }

        let Some(glow) = self.mips.first() else {
            return;
        };
        let mut pass = begin_fullscreen_pass(
            encoder,
            surface_view,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            "post-composite",
        );
        pass.set_pipeline(&self.composite_pipeline);
        pass.set_bind_group(0, &self.params_bind_group, &[]);
        pass.set_bind_group(1, &self.scene.bind_group, &[]);
        pass.set_bind_group(2, &glow.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    fn run_bloom_chain(&self, encoder: &mut wgpu::CommandEncoder, levels: usize) {
        self.run_pass(
            encoder,
            &self.extract_pipeline,
            &self.scene.bind_group,
            &self.mips[0].view,
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            "bloom-extract",
        );

        for i in 1..levels {
            self.run_pass(
                encoder,
                &self.downsample_pipeline,
                &self.mips[i - 1].bind_group,
                &self.mips[i].view,
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                "bloom-downsample",
            );
        }

        for i in (0..levels - 1).rev() {
            self.run_pass(
                encoder,
                &self.upsample_pipeline,
                &self.mips[i + 1].bind_group,
                &self.mips[i].view,
                wgpu::LoadOp::Load,
                "bloom-upsample",
            );
        }
    }

    fn run_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipeline: &wgpu::RenderPipeline,
        input: &wgpu::BindGroup,
        target: &wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
        label: &str,
    ) {
        let mut pass = begin_fullscreen_pass(encoder, target, load, label);
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.params_bind_group, &[]);
        pass.set_bind_group(1, input, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn begin_fullscreen_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    target: &'e wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
    label: &str,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    fragment_entry: &str,
    target_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_fullscreen"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

fn create_target(
    device: &wgpu::Device,
    texture_bgl: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    label: &str,
) -> RenderTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: texture_bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    RenderTarget { view, bind_group }
}

/// Mip sizes starting at half resolution. Always at least one level so the
/// resolve pass has a glow input to bind.
pub fn mip_chain_sizes(width: u32, height: u32, iterations: u32) -> Vec<(u32, u32)> {
    let mut sizes = Vec::new();
    let mut w = (width / 2).max(1);
    let mut h = (height / 2).max(1);
    for _ in 0..iterations.max(1) {
        sizes.push((w, h));
        w = (w / 2).max(1);
        h = (h / 2).max(1);
    }
    sizes
}

fn create_mip_chain(
    device: &wgpu::Device,
    texture_bgl: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    config: &BloomConfig,
) -> Vec<RenderTarget> {
    mip_chain_sizes(width, height, config.iterations)
        .into_iter()
        .map(|(w, h)| {
            log::trace!("Bloom mip {w}x{h}");
            create_target(device, texture_bgl, sampler, w, h, "bloom-mip")
        })
        .collect()
}
