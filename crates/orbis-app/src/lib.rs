//! Orbis viewer: the frame scheduler, the GPU scene renderer, the network
//! collaborators and the winit event loop that ties them together.

pub mod clock;
pub mod collaborators;
pub mod controller;
pub mod dispatch;
pub mod hud;
pub mod picking;
pub mod platform;
pub mod renderer;
pub mod scheduler;
pub mod window;

use orbis_config::ConfigError;
use orbis_render::RenderContextError;

use crate::platform::PlatformError;
use crate::renderer::RendererError;

/// Anything that stops the viewer from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),
    #[error("renderer setup failed: {0}")]
    Renderer(#[from] RendererError),
}
