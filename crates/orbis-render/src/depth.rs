//! Reverse-Z depth buffer and the depth states used by the scene's materials.
//!
//! Near maps to 1.0 and far to 0.0, so the clear value is 0.0 and closer
//! fragments win with `GreaterEqual`.

/// How a material interacts with the depth buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthMode {
    /// Opaque geometry: test and write.
    Opaque,
    /// Translucent geometry hidden behind opaque surfaces: test, no write.
    TestOnly,
    /// Always drawn on top of whatever is already there.
    Ignore,
}

/// Depth buffer sized to the surface.
pub struct DepthBuffer {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    /// 32-bit float depth for reverse-Z precision.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Reverse-Z clear value: 0.0 represents the far plane.
    pub const CLEAR_VALUE: f32 = 0.0;

    /// Reverse-Z depth comparison: closer objects have higher depth values.
    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::GreaterEqual;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-buffer"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Recreate at a new size; no-op when unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width == width.max(1) && self.height == height.max(1) {
            return;
        }
        *self = Self::new(device, width, height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pipeline depth state for a material.
    pub fn state(mode: DepthMode) -> wgpu::DepthStencilState {
        let (depth_write_enabled, depth_compare) = match mode {
            DepthMode::Opaque => (true, Self::COMPARE_FUNCTION),
            DepthMode::TestOnly => (false, Self::COMPARE_FUNCTION),
            DepthMode::Ignore => (false, wgpu::CompareFunction::Always),
        };
        wgpu::DepthStencilState {
            format: Self::FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_device;

    #[test]
    fn test_reverse_z_constants() {
        assert_eq!(DepthBuffer::FORMAT, wgpu::TextureFormat::Depth32Float);
        assert_eq!(DepthBuffer::CLEAR_VALUE, 0.0);
        assert_eq!(
            DepthBuffer::COMPARE_FUNCTION,
            wgpu::CompareFunction::GreaterEqual
        );
    }

    #[test]
    fn test_material_depth_states() {
        let opaque = DepthBuffer::state(DepthMode::Opaque);
        assert!(opaque.depth_write_enabled);
        assert_eq!(opaque.depth_compare, wgpu::CompareFunction::GreaterEqual);

        let shell = DepthBuffer::state(DepthMode::TestOnly);
        assert!(!shell.depth_write_enabled);
        assert_eq!(shell.depth_compare, wgpu::CompareFunction::GreaterEqual);

        let overlay = DepthBuffer::state(DepthMode::Ignore);
        assert!(!overlay.depth_write_enabled);
        assert_eq!(overlay.depth_compare, wgpu::CompareFunction::Always);
    }

    #[test]
    fn test_depth_dimensions_and_resize() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut depth = DepthBuffer::new(&device, 1920, 1080);
        assert_eq!((depth.width(), depth.height()), (1920, 1080));

        depth.resize(&device, 800, 0);
        assert_eq!((depth.width(), depth.height()), (800, 1));
    }
}
