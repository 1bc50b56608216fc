//! wgpu rendering for the globe: surface management, the HDR scene pass,
//! planet and body shading, and the bloom resolve.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod mesh;
pub mod pass;
pub mod post;
pub mod primitives;
pub mod shader;
pub mod shading;
pub mod texture;
pub mod viewport;

#[cfg(test)]
mod test_support;

pub use buffer::{
    BufferAllocator, DynamicVertexBuffer, IndexData, MeshBuffer, PointInstance,
    VertexPositionColor, VertexPositionNormalUv,
};
pub use camera::{Camera, CameraUniform, Ray};
pub use depth::{DepthBuffer, DepthMode};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use mesh::{MeshData, ring, uv_sphere};
pub use pass::{FrameEncoder, RenderPassBuilder, SPACE_BLACK};
pub use post::{BloomConfig, HDR_FORMAT, PostProcess};
pub use primitives::{
    BodyInstance, BodyMaterial, BodyPipeline, BodyStyle, LinePipeline, PointPipeline,
    attenuated_point_diameter,
};
pub use shader::{SceneShader, ShaderError, ShaderLibrary};
pub use shading::{Blending, FrameBinding, GlobeFrame, GlobePipelines, GlobeUniforms, SurfaceTextures};
pub use texture::{GpuTexture, TextureEncoding, TextureError, solid_color_image};
pub use viewport::{Viewport, ViewportResize};
