//! GPU side of the frame: owns every pipeline, mesh and per-body uniform and
//! records one scene pass plus the post-process resolve from the state the
//! [`FrameScheduler`] left behind.

use glam::{Mat4, Vec3, Vec4};
use orbis_config::Config;
use orbis_geo::{hex_rgba, hex_to_linear};
use orbis_overlay::LayerGeometry;
use orbis_render::{
    BloomConfig, BodyInstance, BodyMaterial, BodyPipeline, BodyStyle, Blending, BufferAllocator,
    DepthBuffer, DynamicVertexBuffer, FrameBinding, FrameEncoder, GlobeFrame, GlobePipelines,
    GlobeUniforms, GpuTexture, IndexData, LinePipeline, MeshBuffer, MeshData, PointInstance,
    PointPipeline, PostProcess, RenderContext, RenderPassBuilder, ShaderError, ShaderLibrary,
    SurfaceError, SurfaceTextures, TextureEncoding, VertexPositionColor,
    attenuated_point_diameter, ring, uv_sphere,
};
use orbis_sky::{
    Body, MOON_EMISSIVE, PING_COLOR, Polyline, RING_COLOR, RING_OPACITY, SATELLITE_RADIUS,
    STATION_COLOR, Sprite, milky_way_matrix,
};
use tracing::{debug, info, warn};

use crate::collaborators::{AssetProvider, TextureId};
use crate::scheduler::FrameScheduler;

const BODY_SPHERE_SEGMENTS: (u32, u32) = (64, 32);
const RING_SEGMENTS: u32 = 128;
const CITY_MARKER_SIZE: f32 = 0.02;
const CITY_MARKER_COLOR: u32 = 0xffffff;
const CITY_MARKER_OPACITY: f32 = 0.7;
const STAR_MARKER_SIZE: f32 = 0.6;
const STAR_MARKER_COLOR: u32 = 0xaaccff;
const STAR_MARKER_OPACITY: f32 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

struct RingInstance {
    planet: usize,
    instance: BodyInstance,
    mesh: MeshBuffer,
}

pub struct SceneRenderer {
    depth: DepthBuffer,
    post: PostProcess,
    frame: FrameBinding,
    globe: GlobePipelines,
    bodies: BodyPipeline,
    lines: LinePipeline,
    points: PointPipeline,

    globe_sphere: MeshBuffer,
    body_sphere: MeshBuffer,

    backdrop: Option<BodyInstance>,
    sun: BodyInstance,
    moon: BodyInstance,
    station: BodyInstance,
    satellites: Vec<BodyInstance>,
    planets: Vec<BodyInstance>,
    rings: Vec<RingInstance>,
    ping: BodyInstance,

    sky_points: DynamicVertexBuffer,
    overlay_points: DynamicVertexBuffer,
    alpha_lines: DynamicVertexBuffer,
    additive_lines: DynamicVertexBuffer,

    displace_scale: f32,
    displace_bias: f32,
}

impl SceneRenderer {
    pub fn new(
        gpu: &RenderContext,
        config: &Config,
        assets: &dyn AssetProvider,
        scene: &FrameScheduler,
    ) -> Result<Self, RendererError> {
        let device = &gpu.device;
        let (width, height) = gpu.size();

        let shaders = ShaderLibrary::with_scene_shaders(device);
        let frame = FrameBinding::new(device);

        let day = load_texture(gpu, assets, TextureId::EarthDay);
        let night = load_texture(gpu, assets, TextureId::EarthNight);
        let clouds = load_texture(gpu, assets, TextureId::EarthClouds);
        let height_map = load_texture(gpu, assets, TextureId::EarthHeight);
        let globe = GlobePipelines::new(
            device,
            &shaders,
            &frame,
            SurfaceTextures {
                day: &day,
                night: &night,
                clouds: &clouds,
                height: &height_map,
            },
        )?;
        let bodies = BodyPipeline::new(device, &shaders, &frame)?;
        let lines = LinePipeline::new(device, &shaders, &frame)?;
        let points = PointPipeline::new(device, &shaders, &frame)?;

        let bloom = &config.render.bloom;
        let post = PostProcess::new(
            device,
            gpu.surface_format,
            width,
            height,
            BloomConfig {
                threshold: bloom.threshold,
                strength: bloom.strength_near,
                radius: bloom.radius,
                iterations: bloom.iterations,
                ..BloomConfig::default()
            },
        );

        let allocator = BufferAllocator::new(device);
        let globe_sphere = upload_mesh(
            &allocator,
            "globe-sphere",
            &uv_sphere(
                config.render.globe_width_segments,
                config.render.globe_height_segments,
            ),
        );
        let body_sphere = upload_mesh(
            &allocator,
            "body-sphere",
            &uv_sphere(BODY_SPHERE_SEGMENTS.0, BODY_SPHERE_SEGMENTS.1),
        );

        let white = GpuTexture::from_image_or_color(
            device,
            &gpu.queue,
            None,
            0xffffff,
            TextureEncoding::Srgb,
            "white",
        );
        let solid = |label: &str| bodies.create_instance(device, &white, BodyStyle::Solid, label);

        let backdrop = match assets.load_texture(TextureId::MilkyWay) {
            Ok(image) => {
                let texture = GpuTexture::from_image_or_color(
                    device,
                    &gpu.queue,
                    Some(&image),
                    TextureId::MilkyWay.fallback_color(),
                    TextureId::MilkyWay.encoding(),
                    TextureId::MilkyWay.name(),
                );
                Some(bodies.create_instance(device, &texture, BodyStyle::Backdrop, "milky-way"))
            }
            Err(e) => {
                warn!("Backdrop unavailable, sky stays black: {e}");
                None
            }
        };

        let sun_texture = load_texture(gpu, assets, TextureId::Sun);
        let moon_texture = load_texture(gpu, assets, TextureId::Moon);
        let sun = bodies.create_instance(device, &sun_texture, BodyStyle::Solid, "sun");
        let moon = bodies.create_instance(device, &moon_texture, BodyStyle::Solid, "moon");

        let satellites = (0..scene.orbits().satellites().len())
            .map(|i| solid(&format!("satellite-{i}")))
            .collect();
        let planets = scene
            .solar()
            .planets()
            .iter()
            .map(|p| solid(&format!("planet-{}", p.descriptor.name)))
            .collect();
        let rings = scene
            .solar()
            .planets()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.descriptor.has_rings)
            .map(|(i, p)| {
                let (inner, outer) = p.ring_radii();
                let label = format!("ring-{}", p.descriptor.name);
                RingInstance {
                    planet: i,
                    instance: bodies.create_instance(
                        device,
                        &white,
                        BodyStyle::Translucent,
                        &label,
                    ),
                    mesh: upload_mesh(&allocator, &label, &ring(inner, outer, RING_SEGMENTS)),
                }
            })
            .collect();

        info!(
            "Scene renderer ready: {}x{}, {} planets, backdrop {}",
            width,
            height,
            scene.solar().planets().len(),
            if backdrop.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            depth: DepthBuffer::new(device, width, height),
            post,
            globe,
            station: solid("station"),
            ping: solid("ping"),
            bodies,
            lines,
            points,
            frame,
            globe_sphere,
            body_sphere,
            backdrop,
            sun,
            moon,
            satellites,
            planets,
            rings,
            sky_points: DynamicVertexBuffer::new(device, "sky-points"),
            overlay_points: DynamicVertexBuffer::new(device, "overlay-points"),
            alpha_lines: DynamicVertexBuffer::new(device, "alpha-lines"),
            additive_lines: DynamicVertexBuffer::new(device, "additive-lines"),
            displace_scale: config.render.displace_scale,
            displace_bias: config.render.displace_bias,
        })
    }

    /// Recreate size-dependent targets.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
        self.post.resize(device, width, height);
    }

    /// Upload this frame's state and draw it to the swapchain.
    pub fn render(&mut self, gpu: &RenderContext, scene: &FrameScheduler) -> Result<(), SurfaceError> {
        let queue = &gpu.queue;
        let device = &gpu.device;
        let camera = scene.camera();
        let root = scene.root_matrix();
        let diagnostics = scene.diagnostics();

        self.frame.write(
            queue,
            &GlobeUniforms::new(
                camera.to_uniform(),
                &GlobeFrame {
                    earth_model: root,
                    sun_direction: scene.sun_direction(),
                    cloud_offset: scene.globe().cloud_offset(),
                    aurora_time: scene.globe().aurora_time(),
                    displace_scale: self.displace_scale,
                    displace_bias: self.displace_bias,
                },
            ),
        );
        self.update_bodies(queue, scene, &root);

        let fov_y = camera.fov_y;
        let stars = scene.stars();
        let sky: Vec<PointInstance> = stars
            .field()
            .iter()
            .chain(stars.catalog())
            .map(|sprite| sprite_instance(sprite, &root, fov_y))
            .collect();
        self.sky_points.write(device, queue, &sky);

        let mut overlay = overlay_instances(scene, &root, fov_y);
        overlay.extend(label_markers(scene, fov_y));
        self.overlay_points.write(device, queue, &overlay);

        let (alpha, additive) = line_vertices(scene, &root);
        self.alpha_lines.write(device, queue, &alpha);
        self.additive_lines.write(device, queue, &additive);

        self.post
            .set_strength(queue, scene.bloom_strength(), diagnostics.bloom);

        let surface_texture = gpu.get_current_texture()?;
        let mut frame_encoder = FrameEncoder::new(device, surface_texture);
        {
            let (encoder, surface_view) = frame_encoder.parts();
            {
                let mut pass = RenderPassBuilder::new()
                    .depth(&self.depth.view, DepthBuffer::CLEAR_VALUE)
                    .label("scene-pass")
                    .begin(encoder, self.post.scene_view());

                if let Some(backdrop) = &self.backdrop {
                    self.bodies
                        .draw(&mut pass, &self.frame, backdrop, &self.body_sphere);
                }
                self.globe
                    .draw_surface(&mut pass, &self.frame, &self.globe_sphere);

                self.bodies
                    .draw(&mut pass, &self.frame, &self.sun, &self.body_sphere);
                if scene.orbits_visible() {
                    for body in [&self.moon, &self.station]
                        .into_iter()
                        .chain(&self.satellites)
                    {
                        self.bodies
                            .draw(&mut pass, &self.frame, body, &self.body_sphere);
                    }
                }
                if scene.solar_visible() {
                    for body in &self.planets {
                        self.bodies
                            .draw(&mut pass, &self.frame, body, &self.body_sphere);
                    }
                }
                if scene.globe().ping().is_some() {
                    self.bodies
                        .draw(&mut pass, &self.frame, &self.ping, &self.body_sphere);
                }

                self.points.draw(&mut pass, &self.frame, &self.sky_points);
                self.lines
                    .draw(&mut pass, &self.frame, &self.alpha_lines, Blending::Alpha);
                self.lines.draw(
                    &mut pass,
                    &self.frame,
                    &self.additive_lines,
                    Blending::Additive,
                );
                self.points
                    .draw(&mut pass, &self.frame, &self.overlay_points);

                if scene.solar_visible() {
                    for ring in &self.rings {
                        self.bodies
                            .draw(&mut pass, &self.frame, &ring.instance, &ring.mesh);
                    }
                }
                if diagnostics.atmosphere {
                    self.globe
                        .draw_atmosphere(&mut pass, &self.frame, &self.globe_sphere);
                }
                if diagnostics.aurora {
                    self.globe
                        .draw_aurora(&mut pass, &self.frame, &self.globe_sphere);
                }
            }
            self.post.execute(encoder, surface_view, diagnostics.bloom);
        }
        frame_encoder.submit(queue);
        Ok(())
    }

    fn update_bodies(&self, queue: &wgpu::Queue, scene: &FrameScheduler, root: &Mat4) {
        let place = |body: Body| *root * body.local_matrix();

        if let Some(backdrop) = &self.backdrop {
            backdrop.update(
                queue,
                *root * milky_way_matrix(),
                &BodyMaterial::basic(Vec4::ONE),
            );
        }
        self.sun.update(
            queue,
            place(scene.globe().sun_body()),
            &BodyMaterial::basic(Vec4::ONE),
        );
        self.moon.update(
            queue,
            place(scene.orbits().moon()),
            &BodyMaterial::lit(Vec4::ONE, hex_to_linear(MOON_EMISSIVE)),
        );
        self.station.update(
            queue,
            place(scene.orbits().station()),
            &BodyMaterial::basic(hex_rgba(STATION_COLOR, 1.0)),
        );
        for (instance, satellite) in self.satellites.iter().zip(scene.orbits().satellites()) {
            instance.update(
                queue,
                place(Body::new(satellite.position, SATELLITE_RADIUS)),
                &BodyMaterial::basic(hex_rgba(satellite.color, 1.0)),
            );
        }

        let planets = scene.solar().planets();
        for (instance, planet) in self.planets.iter().zip(planets) {
            instance.update(
                queue,
                place(planet.body),
                &BodyMaterial::lit(planet.color(), Vec3::ZERO),
            );
        }
        for ring in &self.rings {
            let Some(matrix) = planets.get(ring.planet).and_then(|p| p.ring_matrix()) else {
                continue;
            };
            ring.instance.update(
                queue,
                *root * matrix,
                &BodyMaterial::basic(hex_rgba(RING_COLOR, RING_OPACITY)),
            );
        }

        if let Some(ping) = scene.globe().ping() {
            self.ping.update(
                queue,
                place(ping.body()),
                &BodyMaterial::basic(hex_rgba(PING_COLOR, 1.0)),
            );
        }
    }
}

/// Load a texture, falling back to its flat colour on any failure.
fn load_texture(gpu: &RenderContext, assets: &dyn AssetProvider, id: TextureId) -> GpuTexture {
    let image = match assets.load_texture(id) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(texture = id.name(), "Using flat colour: {e}");
            None
        }
    };
    debug!(texture = id.name(), loaded = image.is_some(), "Texture resolved");
    GpuTexture::from_image_or_color(
        &gpu.device,
        &gpu.queue,
        image.as_ref(),
        id.fallback_color(),
        id.encoding(),
        id.name(),
    )
}

fn upload_mesh(allocator: &BufferAllocator, label: &str, mesh: &MeshData) -> MeshBuffer {
    allocator.create_mesh(
        label,
        bytemuck::cast_slice(&mesh.vertices),
        IndexData::U32(&mesh.indices),
    )
}

/// A root-local sprite placed in the world.
fn sprite_instance(sprite: &Sprite, root: &Mat4, fov_y: f32) -> PointInstance {
    PointInstance {
        center: root.transform_point3(sprite.position).to_array(),
        size: attenuated_point_diameter(sprite.size, fov_y),
        color: sprite.color.to_array(),
    }
}

/// Points of every visible point layer, in world space.
fn overlay_instances(scene: &FrameScheduler, earth_world: &Mat4, fov_y: f32) -> Vec<PointInstance> {
    let mut instances = Vec::new();
    for (_, layer) in scene.layers().visible() {
        let Some(cloud) = layer.geometry().and_then(|g| g.points()) else {
            continue;
        };
        let size = attenuated_point_diameter(layer.style.size, fov_y);
        let color = layer.style.rgba().to_array();
        instances.extend(cloud.positions().iter().map(|local| PointInstance {
            center: earth_world.transform_point3(*local).to_array(),
            size,
            color,
        }));
    }
    instances
}

/// Line-list vertices for every visible arc layer.
fn arc_vertices(scene: &FrameScheduler, earth_world: &Mat4) -> Vec<VertexPositionColor> {
    let mut vertices = Vec::new();
    for (_, layer) in scene.layers().visible() {
        let Some(LayerGeometry::Arcs(arcs)) = layer.geometry() else {
            continue;
        };
        let color = layer.style.rgba();
        for arc in arcs {
            push_segments(
                &mut vertices,
                arc.windows(2).map(|w| (w[0], w[1])),
                color,
                earth_world,
            );
        }
    }
    vertices
}

/// Marker dots under the projected city and star labels.
fn label_markers(scene: &FrameScheduler, fov_y: f32) -> Vec<PointInstance> {
    let city = hex_rgba(CITY_MARKER_COLOR, CITY_MARKER_OPACITY).to_array();
    let star = hex_rgba(STAR_MARKER_COLOR, STAR_MARKER_OPACITY).to_array();
    let city_size = attenuated_point_diameter(CITY_MARKER_SIZE, fov_y);
    let star_size = attenuated_point_diameter(STAR_MARKER_SIZE, fov_y);
    let cities = scene.city_labels().iter().map(|label| PointInstance {
        center: label.world.to_array(),
        size: city_size,
        color: city,
    });
    let stars = scene.star_labels().iter().map(|label| PointInstance {
        center: label.world.to_array(),
        size: star_size,
        color: star,
    });
    cities.chain(stars).collect()
}

/// Alpha-blended and additive line-list vertices for the frame. The trail
/// and orbit paths follow their body toggles.
fn line_vertices(
    scene: &FrameScheduler,
    root: &Mat4,
) -> (Vec<VertexPositionColor>, Vec<VertexPositionColor>) {
    let stars = scene.stars();
    let mut alpha = Vec::new();
    push_segments(
        &mut alpha,
        stars.segments().iter().copied(),
        stars.segment_color(),
        root,
    );
    let mut additive = arc_vertices(scene, root);

    let trail = scene
        .orbits_visible()
        .then(|| scene.orbits().trail_polyline());
    let rings: &[Polyline] = if scene.solar_visible() {
        scene.solar().orbit_rings()
    } else {
        &[]
    };
    for line in trail.iter().chain(rings) {
        let target = if line.additive { &mut additive } else { &mut alpha };
        push_polyline(target, line, root);
    }
    (alpha, additive)
}

fn push_polyline(out: &mut Vec<VertexPositionColor>, line: &Polyline, root: &Mat4) {
    push_segments(out, line.segments(), line.color, root);
}

fn push_segments(
    out: &mut Vec<VertexPositionColor>,
    segments: impl Iterator<Item = (Vec3, Vec3)>,
    color: Vec4,
    transform: &Mat4,
) {
    let color = color.to_array();
    for (a, b) in segments {
        for p in [a, b] {
            out.push(VertexPositionColor {
                position: transform.transform_point3(p).to_array(),
                color,
            });
        }
    }
}
