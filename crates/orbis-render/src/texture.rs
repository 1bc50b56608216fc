//! GPU textures built from decoded RGBA images.

use image::RgbaImage;

/// A sampled texture with its default view.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub dimensions: (u32, u32),
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("{width}x{height} exceeds the device limit of {limit}")]
    TooLarge { width: u32, height: u32, limit: u32 },
}

/// How the shader interprets texel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureEncoding {
    /// Color imagery, decoded from sRGB on sample.
    Srgb,
    /// Data such as heightmaps and cloud masks, sampled as-is.
    Linear,
}

impl TextureEncoding {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureEncoding::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureEncoding::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// A 1×1 image of a single color, used when an asset is unavailable.
pub fn solid_color_image(rgb: u32) -> RgbaImage {
    let [_, r, g, b] = rgb.to_be_bytes();
    RgbaImage::from_pixel(1, 1, image::Rgba([r, g, b, 255]))
}

impl GpuTexture {
    /// Upload `image`. Images larger than the device allows are rejected so
    /// callers can fall back to a smaller asset.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        encoding: TextureEncoding,
        label: &str,
    ) -> Result<Self, TextureError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroDimensions { width, height });
        }
        let limit = device.limits().max_texture_dimension_2d;
        if width > limit || height > limit {
            return Err(TextureError::TooLarge {
                width,
                height,
                limit,
            });
        }
        Ok(Self::upload(device, queue, image, encoding, label))
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        encoding: TextureEncoding,
        label: &str,
    ) -> Self {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: encoding.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("Uploaded texture '{label}' ({width}x{height}, {encoding:?})");
        Self {
            texture,
            view,
            dimensions: (width, height),
        }
    }

    /// Upload `image`, substituting a flat `fallback_rgb` texel when the
    /// image cannot be used.
    pub fn from_image_or_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: Option<&RgbaImage>,
        fallback_rgb: u32,
        encoding: TextureEncoding,
        label: &str,
    ) -> Self {
        if let Some(image) = image {
            match Self::from_image(device, queue, image, encoding, label) {
                Ok(texture) => return texture,
                Err(e) => log::warn!("Texture '{label}' unusable, using flat color: {e}"),
            }
        }
        Self::upload(device, queue, &solid_color_image(fallback_rgb), encoding, label)
    }
}

/// Linear filtering sampler with the given horizontal addressing.
pub fn create_sampler(
    device: &wgpu::Device,
    address_mode_u: wgpu::AddressMode,
    label: &str,
) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
