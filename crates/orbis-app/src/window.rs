//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: it owns the GPU
//! context and the renderer, forwards input into frame-coherent state, runs
//! one [`FrameScheduler`] frame per redraw and hands the frame's requests to
//! the [`Dispatcher`].

use std::sync::Arc;

use glam::Vec2;
use orbis_config::Config;
use orbis_input::{KeyBindings, KeyboardState, MouseState};
use orbis_overlay::FeedInbox;
use orbis_render::{
    RenderContext, SurfaceError, Viewport, ViewportResize, init_render_context_blocking,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{CursorIcon, Fullscreen, Window, WindowAttributes, WindowId};

use crate::AppError;
use crate::collaborators::DirectoryAssets;
use crate::dispatch::Dispatcher;
use crate::renderer::SceneRenderer;
use crate::scheduler::{CursorHint, FrameInput, FrameScheduler, Request};

/// Default window width in logical pixels.
pub const DEFAULT_WIDTH: f64 = 1280.0;
/// Default window height in logical pixels.
pub const DEFAULT_HEIGHT: f64 = 720.0;
/// Default window title.
pub const DEFAULT_TITLE: &str = "Orbis";

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
        .with_fullscreen(
            config
                .window
                .fullscreen
                .then_some(Fullscreen::Borderless(None)),
        )
}

/// Returns the default [`WindowAttributes`] for the viewer window.
pub fn default_window_attributes() -> WindowAttributes {
    WindowAttributes::default()
        .with_title(DEFAULT_TITLE)
        .with_inner_size(winit::dpi::LogicalSize::new(DEFAULT_WIDTH, DEFAULT_HEIGHT))
}

/// Gather this frame's input for the scheduler.
pub fn frame_input(
    keyboard: &KeyboardState,
    mouse: &MouseState,
    bindings: &KeyBindings,
    viewport: &Viewport,
) -> FrameInput {
    FrameInput {
        commands: bindings.resolve(keyboard),
        drag: mouse.drag(),
        scroll: mouse.scroll(),
        pointer: mouse.cursor_in_window().then(|| mouse.position()),
        clicked: mouse.clicked(),
        viewport: Vec2::new(viewport.width() as f32, viewport.height() as f32),
    }
}

fn cursor_icon(hint: CursorHint) -> CursorIcon {
    match hint {
        CursorHint::Default => CursorIcon::Default,
        CursorHint::Pointer => CursorIcon::Pointer,
    }
}

/// Application state: window, GPU context, scene and collaborators.
pub struct AppState {
    pub config: Config,
    pub window: Option<Arc<Window>>,
    pub gpu: Option<RenderContext>,
    renderer: Option<SceneRenderer>,
    pub viewport: Viewport,
    pub scheduler: FrameScheduler,
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
    bindings: KeyBindings,
    inbox: FeedInbox,
    dispatcher: Dispatcher,
    title: String,
    fatal: Option<AppError>,
}

impl AppState {
    /// Build the scene from `config`. `fly_to` is searched once the first
    /// frame runs.
    pub fn new(config: Config, fly_to: Option<&str>) -> Self {
        let (poster, inbox) = FeedInbox::channel();
        let dispatcher = Dispatcher::from_config(&config.feeds, poster);
        let mut scheduler = FrameScheduler::new(&config);
        if let Some(query) = fly_to {
            scheduler.search(query);
        }

        Self {
            viewport: Viewport::new(config.window.width, config.window.height, 1.0),
            title: config.window.title.clone(),
            config,
            window: None,
            gpu: None,
            renderer: None,
            scheduler,
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            bindings: KeyBindings::default(),
            inbox,
            dispatcher,
            fatal: None,
        }
    }

    /// Returns the current physical surface width.
    pub fn surface_width(&self) -> u32 {
        self.viewport.width()
    }

    /// Returns the current physical surface height.
    pub fn surface_height(&self) -> u32 {
        self.viewport.height()
    }

    /// Error that stopped the event loop, if any.
    pub fn take_fatal(&mut self) -> Option<AppError> {
        self.fatal.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: AppError) {
        self.fatal = Some(e);
        event_loop.exit();
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);

        let scale_factor = window.scale_factor();
        let inner_size = window.inner_size();
        self.viewport = Viewport::new(inner_size.width, inner_size.height, scale_factor);
        self.scheduler
            .resize(self.viewport.width(), self.viewport.height());
        info!(
            "Viewport initialized: {}x{} (scale: {:.2})",
            inner_size.width, inner_size.height, scale_factor
        );

        let gpu = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        let assets = DirectoryAssets::new(&self.config.assets.texture_dir);
        let renderer = SceneRenderer::new(&gpu, &self.config, &assets, &self.scheduler)?;

        self.renderer = Some(renderer);
        self.gpu = Some(gpu);
        self.window = Some(window);
        self.dispatcher.start_station_watch();
        Ok(())
    }

    fn apply_resize(&mut self, resize: ViewportResize) {
        self.scheduler.resize(resize.width, resize.height);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(resize.width, resize.height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, resize.width, resize.height);
            }
        }
    }

    fn dispatch(&self, request: Request) {
        debug!(?request, "Dispatching");
        match request {
            Request::FetchLayer(layer) => self.dispatcher.fetch_layer(layer),
            Request::Summary(name) => self.dispatcher.lookup_summary(&name),
            Request::Search(query) => self.dispatcher.search(&query),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let input = frame_input(&self.keyboard, &self.mouse, &self.bindings, &self.viewport);
        let output = self.scheduler.frame(&input, self.inbox.drain());
        for request in output.requests {
            self.dispatch(request);
        }
        if output.quit {
            info!("Quit requested, shutting down");
            event_loop.exit();
            return;
        }

        if let Some(window) = &self.window {
            window.set_cursor(cursor_icon(output.cursor));
            let title = self
                .scheduler
                .hud()
                .window_title(&self.config.window.title, self.config.debug.show_fps);
            if title != self.title {
                window.set_title(&title);
                self.title = title;
            }
        }

        if self.viewport.is_presentable()
            && let (Some(gpu), Some(renderer)) = (&mut self.gpu, &mut self.renderer)
        {
            match renderer.render(gpu, &self.scheduler) {
                Ok(()) => {}
                Err(SurfaceError::Lost) => {
                    gpu.resize(self.viewport.width(), self.viewport.height());
                }
                Err(SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory");
                    event_loop.exit();
                }
                Err(SurfaceError::Timeout) => {
                    warn!("Surface timeout, skipping frame");
                }
            }
        }

        self.keyboard.clear_transients();
        self.mouse.clear_transients();

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            self.fail(event_loop, e);
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self
                    .viewport
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.apply_resize(resize);
                    info!(
                        "Window resized to {}x{} (scale: {:.2})",
                        resize.width, resize.height, resize.scale_factor
                    );
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let Some(new_inner) = self.window.as_ref().map(|w| w.inner_size()) else {
                    return;
                };
                if let Some(resize) = self.viewport.handle_scale_factor_changed(
                    scale_factor,
                    new_inner.width,
                    new_inner.height,
                ) {
                    self.apply_resize(resize);
                    info!(
                        "Scale factor changed to {:.2}, resized to {}x{}",
                        scale_factor, resize.width, resize.height
                    );
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse.on_scroll(delta);
            }
            WindowEvent::CursorEntered { .. } => {
                self.mouse.on_cursor_entered();
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse.on_cursor_left();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer until the window closes.
#[instrument(skip(config))]
pub fn run_with_config(config: Config, fly_to: Option<&str>) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, fly_to);
    event_loop.run_app(&mut app)?;
    match app.take_fatal() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
