//! Per-frame orchestration of the scene model.
//!
//! [`FrameScheduler::step`] runs the fixed frame order: clock, feed
//! messages, body updates, camera, transform propagation, sun direction,
//! picking, label projection and bloom strength. The renderer then reads the
//! result through the accessors. Nothing here touches the GPU or a thread,
//! so the whole frame can be driven from tests.

use glam::{Mat4, Vec2, Vec3};
use orbis_config::{Config, Diagnostic, DiagnosticsConfig};
use orbis_geo::{lerp, smoothstep};
use orbis_input::InputCommand;
use orbis_overlay::{
    CITIES, FeedMessage, IngestOutcome, LAYER_ORDER, LIVE_EVENTS, LIVE_QUAKES, LayerManager,
};
use orbis_render::Camera;
use orbis_sky::{EarthOrbits, Globe, SceneRoot, SolarSystem, StarField};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::clock::{FrameClock, FrameTime};
use crate::controller::{CameraController, ControllerEvent};
use crate::hud::{
    CityLabel, FpsCounter, HudSnapshot, PopulationCounter, StarLabelView, Telemetry, city_label_at,
    city_record, project_city_labels, project_star_labels, star_label_at,
};
use crate::picking::{self, HoverTracker};

/// Camera distances over which bloom ramps from near to far strength.
const BLOOM_RAMP_START: f32 = 1.5;
const BLOOM_RAMP_END: f32 = 4.0;

/// Work the frame asks the collaborators to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    FetchLayer(&'static str),
    Summary(String),
    Search(String),
}

/// Pointer state the window hands to the scheduler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub commands: Vec<InputCommand>,
    /// Pixels dragged with the primary button this frame.
    pub drag: Vec2,
    /// Wheel lines, positive away from the user.
    pub scroll: f32,
    /// Pointer in window pixels; `None` while outside the window.
    pub pointer: Option<Vec2>,
    pub clicked: bool,
    /// Window size in pixels.
    pub viewport: Vec2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorHint {
    #[default]
    Default,
    /// Over something that reacts to a click or hover.
    Pointer,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    pub requests: Vec<Request>,
    pub cursor: CursorHint,
    pub quit: bool,
}

pub struct FrameScheduler {
    clock: FrameClock,
    time: FrameTime,
    diagnostics: DiagnosticsConfig,
    bloom_near: f32,
    bloom_far: f32,

    root: SceneRoot,
    globe: Globe,
    orbits: EarthOrbits,
    solar: SolarSystem,
    stars: StarField,
    layers: LayerManager,

    camera: Camera,
    controller: CameraController,
    hover: HoverTracker,

    city_labels: Vec<CityLabel>,
    star_labels: Vec<StarLabelView>,
    inspect: Option<String>,
    sun_direction: Vec3,
    bloom_strength: f32,

    fps: FpsCounter,
    population: PopulationCounter,
    rng: StdRng,
    station: Option<(f32, f32)>,
    crew: Option<u32>,

    pending: Vec<Request>,
}

impl FrameScheduler {
    pub fn new(config: &Config) -> Self {
        let seed = config.render.sky_seed;
        let globe = Globe::new();
        let solar = SolarSystem::new(globe.sun_local(), seed);

        let camera_config = &config.camera;
        let mut camera = Camera::new(
            Vec3::new(0.0, 0.0, camera_config.start_distance),
            camera_config.fov_y_degrees,
            camera_config.near,
            camera_config.far,
        );
        camera.set_aspect_ratio(config.window.width as f32, config.window.height as f32);

        let root = SceneRoot::new();
        let sun_direction = globe.sun_direction(&root.matrix());

        let mut scheduler = Self {
            clock: FrameClock::new(),
            time: FrameTime {
                delta: 0.0,
                elapsed: 0.0,
                total: 0.0,
                frame: 0,
            },
            diagnostics: config.diagnostics,
            bloom_near: config.render.bloom.strength_near,
            bloom_far: config.render.bloom.strength_far,
            root,
            globe,
            orbits: EarthOrbits::new(seed),
            solar,
            stars: StarField::new(seed),
            layers: LayerManager::new(),
            camera,
            controller: CameraController::new(camera_config),
            hover: HoverTracker::new(),
            city_labels: Vec::new(),
            star_labels: Vec::new(),
            inspect: None,
            sun_direction,
            bloom_strength: config.render.bloom.strength_near,
            fps: FpsCounter::new(),
            population: PopulationCounter::new(),
            rng: StdRng::seed_from_u64(seed),
            station: None,
            crew: None,
            pending: Vec::new(),
        };
        for name in &config.overlays.active_layers {
            scheduler.activate_layer(name);
        }
        scheduler.bloom_strength = scheduler.compute_bloom_strength();
        scheduler
    }

    /// Queue a place search; the first result becomes a flight.
    pub fn search(&mut self, query: &str) {
        self.pending.push(Request::Search(query.to_string()));
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera
            .set_aspect_ratio(width.max(1) as f32, height.max(1) as f32);
    }

    /// Run one frame measured against the wall clock.
    pub fn frame(
        &mut self,
        input: &FrameInput,
        messages: impl IntoIterator<Item = FeedMessage>,
    ) -> FrameOutput {
        let time = self.clock.tick();
        self.run(time, input, messages)
    }

    /// Run one frame of `seconds`.
    pub fn step(
        &mut self,
        seconds: f32,
        input: &FrameInput,
        messages: impl IntoIterator<Item = FeedMessage>,
    ) -> FrameOutput {
        let time = self.clock.advance(seconds);
        self.run(time, input, messages)
    }

    fn run(
        &mut self,
        time: FrameTime,
        input: &FrameInput,
        messages: impl IntoIterator<Item = FeedMessage>,
    ) -> FrameOutput {
        self.time = time;
        let mut output = FrameOutput::default();

        for message in messages {
            self.handle_message(message);
        }
        for command in &input.commands {
            if self.apply_command(*command) {
                output.quit = true;
            }
        }

        self.update_bodies();

        self.controller.rotate(input.drag);
        self.controller.zoom(input.scroll);
        if let Some(ControllerEvent::Arrived { label }) =
            self.controller.update(&mut self.camera, time.delta)
        {
            debug!(place = %label, "Camera arrived");
        }
        self.root.advance(time.delta, self.controller.is_flying());

        let root = self.root.matrix();
        self.sun_direction = self.globe.sun_direction(&root);

        self.inspect = None;
        let mut hovering = false;
        if self.diagnostics.picking {
            hovering |= self.update_picking(input, &root);
        }
        hovering |= self.update_labels(input, &root);
        if hovering {
            output.cursor = CursorHint::Pointer;
        }

        self.bloom_strength = self.compute_bloom_strength();

        if let Some(fps) = self.fps.record_frame(time.elapsed) {
            debug!(fps, "Frame rate");
        }
        self.population.advance(time.delta, &mut self.rng);

        output.requests = std::mem::take(&mut self.pending);
        output
    }

    fn handle_message(&mut self, message: FeedMessage) {
        match message {
            FeedMessage::LayerRecords { layer, records } => {
                if self.layers.ingest_feed(&layer, records) == IngestOutcome::UnknownLayer {
                    warn!(layer = %layer, "Feed records for unknown layer dropped");
                }
            }
            FeedMessage::LayerFailed { layer, reason } => {
                self.layers.feed_failed(&layer);
                warn!(layer = %layer, "Live feed unavailable: {reason}");
            }
            FeedMessage::StationPosition { lat, lon } => self.station = Some((lat, lon)),
            FeedMessage::CrewCount(count) => self.crew = Some(count),
            FeedMessage::SearchResults { query, places } => match places.first() {
                Some(place) => {
                    let short = place.name.split(',').next().unwrap_or("").trim().to_string();
                    self.fly_to(place.lat, place.lon, &short);
                    self.pending.push(Request::Summary(short));
                }
                None => info!("NO RESULTS FOR: {}", query.to_uppercase()),
            },
            FeedMessage::Summary {
                name,
                summary: Some(summary),
            } => {
                info!(name = %name, url = ?summary.page_url, "{}: {}", summary.title, summary.extract);
            }
            FeedMessage::Summary { summary: None, .. } => {}
            FeedMessage::Status(line) => info!("{line}"),
        }
    }

    /// Apply one key command. Returns true for quit.
    fn apply_command(&mut self, command: InputCommand) -> bool {
        match command {
            InputCommand::Toggle(diagnostic) => {
                let enabled = self.diagnostics.toggle(diagnostic);
                match serde_json::to_string(&self.diagnostics) {
                    Ok(json) => info!("[DIAG] {json}"),
                    Err(e) => warn!("Failed to serialize diagnostics: {e}"),
                }
                if diagnostic == Diagnostic::Picking && !enabled {
                    self.hover.clear();
                }
                false
            }
            InputCommand::ToggleLayer(slot) => {
                if let Some(name) = LAYER_ORDER.get(slot) {
                    self.activate_layer(name);
                }
                false
            }
            InputCommand::Quit => true,
        }
    }

    /// Toggle a layer; a live layer turned on also claims its fetch.
    fn activate_layer(&mut self, name: &str) {
        let active = self.layers.toggle_layer(name);
        if !active {
            if self.hover.current().is_some_and(|key| key.layer == name) {
                self.hover.clear();
            }
            return;
        }
        for live in [LIVE_QUAKES, LIVE_EVENTS] {
            if name == live && self.layers.request_feed(live) {
                self.pending.push(Request::FetchLayer(live));
            }
        }
    }

    fn update_bodies(&mut self) {
        let FrameTime { delta, elapsed, .. } = self.time;
        if self.diagnostics.orbits {
            self.orbits.update(elapsed);
        }
        if self.diagnostics.solar {
            self.solar.update(elapsed);
        }
        self.globe.advance(delta, elapsed, self.diagnostics.aurora);
        self.globe.expire_ping(self.time.elapsed_duration());
    }

    /// Returns true while an overlay record is hovered.
    fn update_picking(&mut self, input: &FrameInput, root: &Mat4) -> bool {
        let Some(pointer) = input.pointer else {
            self.hover.clear();
            return false;
        };
        let ndc = pointer_ndc(pointer, input.viewport);
        let ray = self.camera.ray_through(ndc);
        let key = picking::pick(&ray, root, self.layers.pickable()).and_then(|hit| hit.key());

        let transition = self.hover.update(key);
        if let Some(left) = transition.left {
            debug!(layer = left.layer, index = left.index, "Hover left");
        }
        let Some(current) = self.hover.current() else {
            return false;
        };
        if let Some(record) = picking::resolve(current, self.layers.pickable()) {
            if transition.entered.is_some() {
                debug!(
                    layer = current.layer,
                    title = %record.title,
                    detail = %record.detail,
                    "Hover entered"
                );
            }
            self.inspect = Some(format!("{}: {}", record.category, record.title));
        }
        true
    }

    /// Returns true while a label is under the pointer.
    fn update_labels(&mut self, input: &FrameInput, root: &Mat4) -> bool {
        if self.diagnostics.labels {
            self.city_labels = project_city_labels(CITIES, &self.camera, root, input.viewport);
        } else {
            self.city_labels.clear();
        }
        if self.diagnostics.stars {
            self.star_labels =
                project_star_labels(self.stars.labels(), &self.camera, root, input.viewport);
        } else {
            self.star_labels.clear();
        }

        let Some(pointer) = input.pointer else {
            return false;
        };
        if let Some(label) = city_label_at(&self.city_labels, pointer) {
            let city = label.city;
            let record = city_record(city);
            self.inspect = Some(format!("{}: {}", record.category, record.title));
            if input.clicked && self.controller.input_enabled() {
                self.fly_to(city.lat, city.lon, city.name);
                self.pending.push(Request::Summary(city.name.to_string()));
            }
            return true;
        }
        if let Some(label) = star_label_at(&self.star_labels, pointer) {
            let name = label.name;
            self.inspect = Some(name.to_uppercase());
            if input.clicked {
                self.pending.push(Request::Summary(name.to_string()));
            }
            return true;
        }
        false
    }

    fn fly_to(&mut self, lat: f32, lon: f32, label: &str) {
        self.controller
            .fly_to(&self.camera, lat, lon, label, &self.root.matrix());
        self.globe
            .place_ping(lat, lon, self.time.elapsed_duration());
    }

    fn compute_bloom_strength(&self) -> f32 {
        let t = smoothstep(BLOOM_RAMP_START, BLOOM_RAMP_END, self.camera.distance());
        lerp(self.bloom_near, self.bloom_far, t)
    }

    // --- Read access for the renderer and the window ---

    pub fn time(&self) -> FrameTime {
        self.time
    }

    pub fn diagnostics(&self) -> &DiagnosticsConfig {
        &self.diagnostics
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    /// World transform of the root, and so of the earth.
    pub fn root_matrix(&self) -> Mat4 {
        self.root.matrix()
    }

    pub fn globe(&self) -> &Globe {
        &self.globe
    }

    pub fn orbits(&self) -> &EarthOrbits {
        &self.orbits
    }

    /// Whether the moon, station, satellites and trail are drawn.
    pub fn orbits_visible(&self) -> bool {
        self.diagnostics.orbits
    }

    /// Whether the planets, their rings and orbit paths are drawn.
    pub fn solar_visible(&self) -> bool {
        self.diagnostics.solar
    }

    pub fn solar(&self) -> &SolarSystem {
        &self.solar
    }

    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn city_labels(&self) -> &[CityLabel] {
        &self.city_labels
    }

    pub fn star_labels(&self) -> &[StarLabelView] {
        &self.star_labels
    }

    pub fn sun_direction(&self) -> Vec3 {
        self.sun_direction
    }

    pub fn bloom_strength(&self) -> f32 {
        self.bloom_strength
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            telemetry: Telemetry::from_camera(self.camera.position, &self.root.matrix()),
            fps: self.fps.fps(),
            population: self.population.value(),
            station: self.station,
            crew: self.crew,
            inspect: self.inspect.clone(),
        }
    }
}

/// Window pixels to NDC, y up.
fn pointer_ndc(pointer: Vec2, viewport: Vec2) -> Vec2 {
    let size = viewport.max(Vec2::ONE);
    Vec2::new(pointer.x / size.x * 2.0 - 1.0, 1.0 - pointer.y / size.y * 2.0)
}
