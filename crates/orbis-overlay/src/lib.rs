//! Overlay data on the globe: static and live point layers, route arcs,
//! the city table, and the message channel live feeds report through.

mod datasets;
mod feeds;
mod layers;
mod record;

pub use datasets::{
    CABLES, CITIES, CONFLICT_ZONES, City, ConflictZone, FLIGHT_ROUTES, MAX_CITY_TIER,
    NUCLEAR_SITES, NuclearSite, POP_CENTERS, PopulationCenter, Route, SEISMIC_ZONES,
    SeismicZone,
};
pub use feeds::{
    FeedError, FeedInbox, FeedMessage, FeedPoster, Place, Summary, normalize_eonet,
    normalize_usgs,
};
pub use layers::{
    CABLES_LAYER, CONFLICTS, FLIGHTS, IngestOutcome, LAYER_ORDER, LIVE_EVENTS, LIVE_QUAKES,
    Layer, LayerGeometry, LayerManager, LayerStyle, NUCLEAR, POINT_RADIUS, POPULATION,
    PointCloud, SEISMIC,
};
pub use record::OverlayRecord;
