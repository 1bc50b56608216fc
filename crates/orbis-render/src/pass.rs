//! Render pass configuration and per-frame command encoding.
//!
//! [`RenderPassBuilder`] describes the scene pass declaratively and
//! [`FrameEncoder`] owns the encoder plus the acquired swapchain image until
//! the frame is submitted and presented.

/// Deep space clear color.
pub const SPACE_BLACK: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Configuration for the depth attachment.
#[derive(Debug)]
pub struct DepthAttachmentConfig<'a> {
    pub view: &'a wgpu::TextureView,
    pub clear_value: f32,
}

/// Builder for render pass descriptors.
#[derive(Debug)]
pub struct RenderPassBuilder<'a> {
    load: wgpu::LoadOp<wgpu::Color>,
    depth_attachment: Option<DepthAttachmentConfig<'a>>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RenderPassBuilder<'a> {
    /// A pass that clears to [`SPACE_BLACK`] with no depth attachment.
    pub fn new() -> Self {
        Self {
            load: wgpu::LoadOp::Clear(SPACE_BLACK),
            depth_attachment: None,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.load = wgpu::LoadOp::Clear(color);
        self
    }

    /// Keep the existing color contents instead of clearing.
    pub fn load_existing(mut self) -> Self {
        self.load = wgpu::LoadOp::Load;
        self
    }

    /// Attach a depth buffer, cleared to `clear_value` at pass start.
    pub fn depth(mut self, view: &'a wgpu::TextureView, clear_value: f32) -> Self {
        self.depth_attachment = Some(DepthAttachmentConfig { view, clear_value });
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn has_depth(&self) -> bool {
        self.depth_attachment.is_some()
    }

    /// Begin the pass on `encoder`, drawing into `color_view`.
    pub fn begin<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        color_view: &'e wgpu::TextureView,
    ) -> wgpu::RenderPass<'e> {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: self.load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        let depth_stencil_attachment =
            self.depth_attachment
                .as_ref()
                .map(|depth| wgpu::RenderPassDepthStencilAttachment {
                    view: depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(depth.clear_value),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// One frame's command encoder and swapchain image.
pub struct FrameEncoder {
    encoder: wgpu::CommandEncoder,
    surface_texture: wgpu::SurfaceTexture,
    surface_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(device: &wgpu::Device, surface_texture: wgpu::SurfaceTexture) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            encoder,
            surface_texture,
            surface_view,
        }
    }

    /// Borrow the encoder together with the swapchain view.
    pub fn parts(&mut self) -> (&mut wgpu::CommandEncoder, &wgpu::TextureView) {
        (&mut self.encoder, &self.surface_view)
    }

    pub fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        &mut self.encoder
    }

    /// Submit recorded commands and present the swapchain image.
    pub fn submit(self, queue: &wgpu::Queue) {
        let Self {
            encoder,
            surface_texture,
            ..
        } = self;
        queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pass_clears_to_black() {
        let builder = RenderPassBuilder::new();
        assert!(matches!(builder.load, wgpu::LoadOp::Clear(c) if c == SPACE_BLACK));
        assert!(!builder.has_depth());
    }

    #[test]
    fn test_load_existing_overrides_clear() {
        let builder = RenderPassBuilder::new()
            .clear_color(wgpu::Color::WHITE)
            .load_existing()
            .label("overlay");
        assert!(matches!(builder.load, wgpu::LoadOp::Load));
        assert_eq!(builder.label, Some("overlay"));
    }

    #[test]
    fn test_depth_attachment_is_recorded() {
        let Some((device, _queue)) = crate::test_support::create_test_device() else {
            return;
        };
        let depth = crate::DepthBuffer::new(&device, 64, 64);
        let builder = RenderPassBuilder::new().depth(&depth.view, crate::DepthBuffer::CLEAR_VALUE);
        assert!(builder.has_depth());
    }
}
