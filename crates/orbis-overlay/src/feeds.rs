//! Results from background collaborators and the channel that carries them
//! back to the frame loop.
//!
//! Worker threads hold a [`FeedPoster`]; the frame loop owns the matching
//! [`FeedInbox`] and drains it once per frame without blocking.

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::Deserialize;

use crate::record::OverlayRecord;

pub const QUAKE_NARRATIVE: &str =
    "Tectonic plates shifting. Everything you build will eventually fall down.";
pub const DISASTER_NARRATIVE: &str = "Nature aggressively rejecting human habitation. Beautiful.";

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Malformed feed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A place returned by a geocoding search.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub lat: f32,
    pub lon: f32,
}

/// An encyclopedia summary for a place or object.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub title: String,
    pub extract: String,
    pub page_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// Records for a live overlay layer.
    LayerRecords {
        layer: String,
        records: Vec<OverlayRecord>,
    },
    LayerFailed {
        layer: String,
        reason: String,
    },
    StationPosition {
        lat: f32,
        lon: f32,
    },
    CrewCount(u32),
    SearchResults {
        query: String,
        places: Vec<Place>,
    },
    /// `None` when the lookup failed.
    Summary {
        name: String,
        summary: Option<Summary>,
    },
    /// A one-line status update for the ticker.
    Status(String),
}

/// Sending half, cloned into each worker.
#[derive(Debug, Clone)]
pub struct FeedPoster {
    sender: Sender<FeedMessage>,
}

impl FeedPoster {
    /// Returns false once the inbox has been dropped.
    pub fn post(&self, message: FeedMessage) -> bool {
        self.sender.send(message).is_ok()
    }
}

/// Receiving half, owned by the frame loop.
#[derive(Debug)]
pub struct FeedInbox {
    receiver: Receiver<FeedMessage>,
}

impl FeedInbox {
    pub fn channel() -> (FeedPoster, FeedInbox) {
        let (sender, receiver) = unbounded();
        (FeedPoster { sender }, FeedInbox { receiver })
    }

    /// Everything posted since the last drain, in arrival order.
    pub fn drain(&self) -> Vec<FeedMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            messages.push(message);
        }
        messages
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

#[derive(Deserialize)]
struct UsgsCollection {
    features: Vec<UsgsFeature>,
}

#[derive(Deserialize)]
struct UsgsFeature {
    geometry: UsgsGeometry,
    properties: UsgsProperties,
}

#[derive(Deserialize)]
struct UsgsGeometry {
    coordinates: Vec<f64>,
}

#[derive(Deserialize)]
struct UsgsProperties {
    place: Option<String>,
    mag: Option<f64>,
}

/// Normalize a USGS GeoJSON summary feed. Features without a full
/// `[lon, lat, depth]` triple are skipped.
pub fn normalize_usgs(payload: &str) -> Result<Vec<OverlayRecord>, FeedError> {
    let collection: UsgsCollection = serde_json::from_str(payload)?;
    Ok(collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let [lon, lat, depth] = feature.geometry.coordinates[..] else {
                return None;
            };
            let magnitude = feature
                .properties
                .mag
                .map_or_else(|| "?".to_owned(), |m| m.to_string());
            Some(
                OverlayRecord::new(lat as f32, lon as f32)
                    .with_category("LIVE QUAKE")
                    .with_title(feature.properties.place.unwrap_or_default())
                    .with_detail(format!("Magnitude: {magnitude} | Depth: {depth}km"))
                    .with_narrative(QUAKE_NARRATIVE),
            )
        })
        .collect())
}

#[derive(Deserialize)]
struct EonetResponse {
    events: Vec<EonetEvent>,
}

#[derive(Deserialize)]
struct EonetEvent {
    title: String,
    #[serde(default)]
    categories: Vec<EonetCategory>,
    #[serde(default)]
    geometry: Vec<EonetGeometry>,
}

#[derive(Deserialize)]
struct EonetCategory {
    title: String,
}

#[derive(Deserialize)]
struct EonetGeometry {
    coordinates: serde_json::Value,
}

/// Normalize NASA EONET events. Only events whose first geometry is a
/// single `[lon, lat]` point are kept; polygons are dropped.
pub fn normalize_eonet(payload: &str) -> Result<Vec<OverlayRecord>, FeedError> {
    let response: EonetResponse = serde_json::from_str(payload)?;
    Ok(response
        .events
        .into_iter()
        .filter_map(|event| {
            let (lon, lat) = point_coordinates(&event.geometry.first()?.coordinates)?;
            let categories = event
                .categories
                .iter()
                .map(|c| c.title.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Some(
                OverlayRecord::new(lat, lon)
                    .with_category("LIVE DISASTER")
                    .with_title(event.title)
                    .with_detail(categories)
                    .with_narrative(DISASTER_NARRATIVE),
            )
        })
        .collect())
}

fn point_coordinates(value: &serde_json::Value) -> Option<(f32, f32)> {
    match value.as_array()?.as_slice() {
        [lon, lat] => Some((lon.as_f64()? as f32, lat.as_f64()? as f32)),
        _ => None,
    }
}
