//! Pipelines for everything besides the planet: textured or flat bodies,
//! world-space polylines, and point sprites.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

use crate::buffer::{
    DynamicVertexBuffer, MeshBuffer, PointInstance, VertexPositionColor, VertexPositionNormalUv,
};
use crate::depth::DepthMode;
use crate::shader::{SceneShader, ShaderError, ShaderLibrary};
use crate::shading::{Blending, FrameBinding, PipelineSpec, create_scene_pipeline};
use crate::texture::{GpuTexture, create_sampler};

/// Per-body uniform at group 1.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BodyUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// rgb emissive, `w` 1.0 when sun-lit.
    pub emissive: [f32; 4],
}

/// Surface appearance of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMaterial {
    /// Multiplied with the texture; alpha is the opacity.
    pub color: Vec4,
    pub emissive: Vec3,
    /// Shade by the sun direction instead of drawing at full brightness.
    pub lit: bool,
}

impl BodyMaterial {
    /// Unlit, full brightness.
    pub fn basic(color: Vec4) -> Self {
        Self {
            color,
            emissive: Vec3::ZERO,
            lit: false,
        }
    }

    /// Diffuse-lit with an emissive floor.
    pub fn lit(color: Vec4, emissive: Vec3) -> Self {
        Self {
            color,
            emissive,
            lit: true,
        }
    }

    pub fn to_uniform(&self, model: Mat4) -> BodyUniform {
        BodyUniform {
            model: model.to_cols_array_2d(),
            color: self.color.to_array(),
            emissive: self
                .emissive
                .extend(if self.lit { 1.0 } else { 0.0 })
                .to_array(),
        }
    }
}

/// How a body is composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStyle {
    /// Depth-tested and written, back faces culled.
    Solid,
    /// Seen from inside, behind everything else.
    Backdrop,
    /// Alpha blended, both faces, no depth write.
    Translucent,
}

/// GPU handle for one body: its uniform and texture binding.
pub struct BodyInstance {
    pub style: BodyStyle,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl BodyInstance {
    pub fn update(&self, queue: &wgpu::Queue, model: Mat4, material: &BodyMaterial) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::bytes_of(&material.to_uniform(model)),
        );
    }
}

pub struct BodyPipeline {
    solid: wgpu::RenderPipeline,
    backdrop: wgpu::RenderPipeline,
    translucent: wgpu::RenderPipeline,
    body_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl BodyPipeline {
    pub fn new(
        device: &wgpu::Device,
        shaders: &ShaderLibrary,
        frame: &FrameBinding,
    ) -> Result<Self, ShaderError> {
        let body_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("body-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<BodyUniform>() as u64
                        ),
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
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("body-pipeline-layout"),
            bind_group_layouts: &[&frame.layout, &body_bgl],
            immediate_size: 0,
        });
        let shader = shaders.require(SceneShader::Body)?;
        let buffers = [VertexPositionNormalUv::layout()];
        let spec = |label, cull_mode, blending, depth| PipelineSpec {
            label,
            layout: &layout,
            shader: &*shader,
            buffers: &buffers,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode,
            blending,
            depth,
        };

        Ok(Self {
            solid: create_scene_pipeline(
                device,
                spec(
                    "body-solid",
                    Some(wgpu::Face::Back),
                    Blending::Opaque,
                    DepthMode::Opaque,
                ),
            ),
            backdrop: create_scene_pipeline(
                device,
                spec(
                    "body-backdrop",
                    Some(wgpu::Face::Front),
                    Blending::Opaque,
                    DepthMode::TestOnly,
                ),
            ),
            translucent: create_scene_pipeline(
                device,
                spec(
                    "body-translucent",
                    None,
                    Blending::Alpha,
                    DepthMode::TestOnly,
                ),
            ),
            body_bgl,
            sampler: create_sampler(device, wgpu::AddressMode::ClampToEdge, "body-sampler"),
        })
    }

    pub fn create_instance(
        &self,
        device: &wgpu::Device,
        texture: &GpuTexture,
        style: BodyStyle,
        label: &str,
    ) -> BodyInstance {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(
                &BodyMaterial::basic(Vec4::ONE).to_uniform(Mat4::IDENTITY),
            ),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.body_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        BodyInstance {
            style,
            buffer,
            bind_group,
        }
    }

    pub fn draw<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        frame: &'a FrameBinding,
        body: &'a BodyInstance,
        mesh: &'a MeshBuffer,
    ) {
        let pipeline = match body.style {
            BodyStyle::Solid => &self.solid,
            BodyStyle::Backdrop => &self.backdrop,
            BodyStyle::Translucent => &self.translucent,
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &frame.bind_group, &[]);
        pass.set_bind_group(1, &body.bind_group, &[]);
        mesh.bind(pass);
        mesh.draw(pass);
    }
}

/// Line-list pipelines, one per blending mode.
pub struct LinePipeline {
    alpha: wgpu::RenderPipeline,
    additive: wgpu::RenderPipeline,
}

impl LinePipeline {
    pub fn new(
        device: &wgpu::Device,
        shaders: &ShaderLibrary,
        frame: &FrameBinding,
    ) -> Result<Self, ShaderError> {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line-pipeline-layout"),
            bind_group_layouts: &[&frame.layout],
            immediate_size: 0,
        });
        let shader = shaders.require(SceneShader::Line)?;
        let buffers = [VertexPositionColor::layout()];
        let spec = |label, blending| PipelineSpec {
            label,
            layout: &layout,
            shader: &*shader,
            buffers: &buffers,
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
            blending,
            depth: DepthMode::TestOnly,
        };
        Ok(Self {
            alpha: create_scene_pipeline(device, spec("line-alpha", Blending::Alpha)),
            additive: create_scene_pipeline(device, spec("line-additive", Blending::Additive)),
        })
    }

    /// Draw segment pairs from `vertices`.
    pub fn draw<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        frame: &'a FrameBinding,
        vertices: &'a DynamicVertexBuffer,
        blending: Blending,
    ) {
        if vertices.is_empty() {
            return;
        }
        pass.set_pipeline(match blending {
            Blending::Additive => &self.additive,
            Blending::Alpha | Blending::Opaque => &self.alpha,
        });
        pass.set_bind_group(0, &frame.bind_group, &[]);
        pass.set_vertex_buffer(0, vertices.slice());
        pass.draw(0..vertices.len(), 0..1);
    }
}

/// Instanced point-sprite pipeline.
pub struct PointPipeline {
    pipeline: wgpu::RenderPipeline,
}

impl PointPipeline {
    pub fn new(
        device: &wgpu::Device,
        shaders: &ShaderLibrary,
        frame: &FrameBinding,
    ) -> Result<Self, ShaderError> {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("point-pipeline-layout"),
            bind_group_layouts: &[&frame.layout],
            immediate_size: 0,
        });
        let shader = shaders.require(SceneShader::Point)?;
        let buffers = [PointInstance::layout()];
        let pipeline = create_scene_pipeline(
            device,
            PipelineSpec {
                label: "point-pipeline",
                layout: &layout,
                shader: &*shader,
                buffers: &buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                blending: Blending::Alpha,
                depth: DepthMode::TestOnly,
            },
        );
        Ok(Self { pipeline })
    }

    pub fn draw<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        frame: &'a FrameBinding,
        instances: &'a DynamicVertexBuffer,
    ) {
        if instances.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &frame.bind_group, &[]);
        pass.set_vertex_buffer(0, instances.slice());
        pass.draw(0..6, 0..instances.len());
    }
}

/// World diameter of a sprite that matches a distance-attenuated point of
/// `size` in a perspective with vertical field of view `fov_y`.
pub fn attenuated_point_diameter(size: f32, fov_y: f32) -> f32 {
    size * (fov_y * 0.5).tan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_uniform_size() {
        assert_eq!(std::mem::size_of::<BodyUniform>(), 96);
    }

    #[test]
    fn test_lit_flag_packs_into_emissive_w() {
        let lit = BodyMaterial::lit(Vec4::ONE, Vec3::splat(0.1)).to_uniform(Mat4::IDENTITY);
        let basic = BodyMaterial::basic(Vec4::ONE).to_uniform(Mat4::IDENTITY);
        assert_eq!(lit.emissive, [0.1, 0.1, 0.1, 1.0]);
        assert_eq!(basic.emissive[3], 0.0);
    }

    #[test]
    fn test_point_diameter_scales_with_fov() {
        let d45 = attenuated_point_diameter(0.5, 45f32.to_radians());
        assert!((d45 - 0.5 * 22.5f32.to_radians().tan()).abs() < 1e-6);
        assert!(attenuated_point_diameter(0.5, 90f32.to_radians()) > d45);
    }
}
