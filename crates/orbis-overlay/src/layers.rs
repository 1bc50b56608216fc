//! Named overlay layers: geometry, style and an active flag per layer.
//!
//! A layer is part of the live scene only while it is active *and* has
//! geometry. Live layers start without geometry and receive it from
//! [`LayerManager::ingest_feed`] once their fetch completes.

use std::collections::BTreeMap;

use glam::{Vec3, Vec4};
use orbis_geo::{GreatCircleArc, geodetic_to_cartesian, hex_rgba};

use crate::datasets::{
    CABLES, FLIGHT_ROUTES, Route, conflict_records, nuclear_records, population_records,
    seismic_records,
};
use crate::record::OverlayRecord;

/// Overlay points float just above the displaced surface.
pub const POINT_RADIUS: f32 = 1.008;

pub const NUCLEAR: &str = "nuclear";
pub const CONFLICTS: &str = "conflicts";
pub const CABLES_LAYER: &str = "cables";
pub const FLIGHTS: &str = "flights";
pub const SEISMIC: &str = "seismic";
pub const POPULATION: &str = "population";
pub const LIVE_QUAKES: &str = "livequakes";
pub const LIVE_EVENTS: &str = "liveevents";

/// Every layer, in toggle-key order (digits 1 through 8).
pub const LAYER_ORDER: [&str; 8] = [
    NUCLEAR,
    CONFLICTS,
    CABLES_LAYER,
    FLIGHTS,
    SEISMIC,
    POPULATION,
    LIVE_QUAKES,
    LIVE_EVENTS,
];

/// Fixed appearance of a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub color: u32,
    /// Point size in world units; ignored for arc layers.
    pub size: f32,
    pub opacity: f32,
    pub additive: bool,
    /// Points carry records and take part in picking.
    pub interactive: bool,
}

impl LayerStyle {
    const fn points(color: u32, size: f32, opacity: f32) -> Self {
        Self {
            color,
            size,
            opacity,
            additive: false,
            interactive: true,
        }
    }

    const fn arcs(color: u32, opacity: f32) -> Self {
        Self {
            color,
            size: 0.0,
            opacity,
            additive: true,
            interactive: false,
        }
    }

    /// Linear RGBA.
    pub fn rgba(&self) -> Vec4 {
        hex_rgba(self.color, self.opacity)
    }
}

/// Points with one record per point, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    positions: Vec<Vec3>,
    records: Vec<OverlayRecord>,
}

impl PointCloud {
    pub fn from_records(records: Vec<OverlayRecord>) -> Self {
        let positions = records
            .iter()
            .map(|r| geodetic_to_cartesian(r.lat, r.lon, POINT_RADIUS))
            .collect();
        Self { positions, records }
    }

    /// Globe-local positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn records(&self) -> &[OverlayRecord] {
        &self.records
    }

    /// Record behind the point at `index`, as reported by a picking hit.
    pub fn record(&self, index: usize) -> Option<&OverlayRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerGeometry {
    Points(PointCloud),
    /// One polyline per route, globe-local.
    Arcs(Vec<Vec<Vec3>>),
}

impl LayerGeometry {
    fn arcs(routes: &[Route]) -> Self {
        Self::Arcs(
            routes
                .iter()
                .map(|r| GreatCircleArc::between(r.from.0, r.from.1, r.to.0, r.to.1).collect())
                .collect(),
        )
    }

    pub fn points(&self) -> Option<&PointCloud> {
        match self {
            Self::Points(cloud) => Some(cloud),
            Self::Arcs(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub style: LayerStyle,
    geometry: Option<LayerGeometry>,
    active: bool,
    fetch_pending: bool,
}

impl Layer {
    fn new(style: LayerStyle, geometry: Option<LayerGeometry>) -> Self {
        Self {
            style,
            geometry,
            active: false,
            fetch_pending: false,
        }
    }

    pub fn geometry(&self) -> Option<&LayerGeometry> {
        self.geometry.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Active with geometry to draw.
    pub fn is_visible(&self) -> bool {
        self.active && self.geometry.is_some()
    }

    pub fn is_fetch_pending(&self) -> bool {
        self.fetch_pending
    }
}

/// Result of handing feed records to a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Geometry built from this many records.
    Created(usize),
    /// The layer already had data; the records were dropped.
    Duplicate,
    UnknownLayer,
}

#[derive(Debug, Clone)]
pub struct LayerManager {
    layers: BTreeMap<&'static str, Layer>,
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerManager {
    /// Build the static layers and register the live ones. Every layer
    /// starts inactive.
    pub fn new() -> Self {
        let points = |records| Some(LayerGeometry::Points(PointCloud::from_records(records)));
        let mut layers = BTreeMap::new();
        layers.insert(
            NUCLEAR,
            Layer::new(LayerStyle::points(0xff003c, 0.015, 0.9), points(nuclear_records())),
        );
        layers.insert(
            CONFLICTS,
            Layer::new(LayerStyle::points(0xff3c00, 0.02, 0.8), points(conflict_records())),
        );
        layers.insert(
            CABLES_LAYER,
            Layer::new(LayerStyle::arcs(0x00f0ff, 0.4), Some(LayerGeometry::arcs(CABLES))),
        );
        layers.insert(
            FLIGHTS,
            Layer::new(
                LayerStyle::arcs(0x00ff80, 0.3),
                Some(LayerGeometry::arcs(FLIGHT_ROUTES)),
            ),
        );
        layers.insert(
            SEISMIC,
            Layer::new(LayerStyle::points(0xffa500, 0.03, 0.9), points(seismic_records())),
        );
        layers.insert(
            POPULATION,
            Layer::new(
                LayerStyle::points(0xff00ff, 0.008, 0.5),
                points(population_records()),
            ),
        );
        layers.insert(
            LIVE_QUAKES,
            Layer::new(LayerStyle::points(0xffeb3b, 0.02, 1.0), None),
        );
        layers.insert(
            LIVE_EVENTS,
            Layer::new(LayerStyle::points(0xff00ff, 0.025, 0.9), None),
        );
        Self { layers }
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// Flip a layer's active flag and return the new state. Unknown names
    /// stay inactive.
    pub fn toggle_layer(&mut self, name: &str) -> bool {
        let Some(layer) = self.layers.get_mut(name) else {
            tracing::warn!(layer = name, "Toggle for unknown overlay layer ignored");
            return false;
        };
        layer.active = !layer.active;
        tracing::debug!(
            layer = name,
            active = layer.active,
            has_geometry = layer.geometry.is_some(),
            "Overlay layer toggled"
        );
        layer.active
    }

    /// Claim the fetch for a live layer. True only when the layer has no
    /// data and no fetch is already in flight.
    pub fn request_feed(&mut self, name: &str) -> bool {
        match self.layers.get_mut(name) {
            Some(layer) if layer.geometry.is_none() && !layer.fetch_pending => {
                layer.fetch_pending = true;
                true
            }
            _ => false,
        }
    }

    /// Release a failed fetch so a later request may retry.
    pub fn feed_failed(&mut self, name: &str) {
        if let Some(layer) = self.layers.get_mut(name) {
            layer.fetch_pending = false;
        }
    }

    /// Build a layer's points from fetched records. An empty list still
    /// produces an (empty) layer so toggling keeps working.
    pub fn ingest_feed(&mut self, name: &str, records: Vec<OverlayRecord>) -> IngestOutcome {
        let Some(layer) = self.layers.get_mut(name) else {
            return IngestOutcome::UnknownLayer;
        };
        layer.fetch_pending = false;
        if layer.geometry.is_some() {
            tracing::debug!(layer = name, "Duplicate feed result dropped");
            return IngestOutcome::Duplicate;
        }
        let count = records.len();
        layer.geometry = Some(LayerGeometry::Points(PointCloud::from_records(records)));
        tracing::info!(layer = name, count, "Overlay feed ingested");
        IngestOutcome::Created(count)
    }

    /// Layers currently in the scene, in name order.
    pub fn visible(&self) -> impl Iterator<Item = (&'static str, &Layer)> {
        self.layers
            .iter()
            .filter(|(_, layer)| layer.is_visible())
            .map(|(name, layer)| (*name, layer))
    }

    /// Visible interactive point clouds, for picking.
    pub fn pickable(&self) -> impl Iterator<Item = (&'static str, &PointCloud)> {
        self.visible().filter_map(|(name, layer)| {
            if !layer.style.interactive {
                return None;
            }
            layer.geometry()?.points().map(|cloud| (name, cloud))
        })
    }
}
