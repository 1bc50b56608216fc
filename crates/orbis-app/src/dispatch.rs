//! Runs collaborator calls on worker threads and posts the outcome to the
//! frame loop's [`FeedInbox`](orbis_overlay::FeedInbox).

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use orbis_config::FeedConfig;
use orbis_overlay::{FeedMessage, FeedPoster};
use tracing::{debug, info, warn};

use crate::collaborators::{
    CatalogGeocoder, CollaboratorError, EonetEvents, FeedSource, Geocoder, KnowledgeSource,
    NominatimGeocoder, StationSource, StationTelemetry, UsgsQuakes, WikipediaSummaries,
};

/// Status line posted when a summary lookup fails.
pub const KNOWLEDGE_UNAVAILABLE: &str = "INTELLIGENCE FEED UNAVAILABLE.";

struct StationWatch {
    source: Arc<dyn StationSource>,
    refresh: Duration,
    crew_delay: Duration,
}

pub struct Dispatcher {
    poster: FeedPoster,
    geocoder: Arc<dyn Geocoder>,
    knowledge: Option<Arc<dyn KnowledgeSource>>,
    feeds: Vec<Arc<dyn FeedSource>>,
    station: Option<StationWatch>,
}

impl Dispatcher {
    /// A dispatcher with only a geocoder; add the other collaborators with
    /// the `with_*` builders.
    pub fn new(poster: FeedPoster, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            poster,
            geocoder,
            knowledge: None,
            feeds: Vec::new(),
            station: None,
        }
    }

    /// The HTTP adapters named by `config`, or the offline catalog alone.
    pub fn from_config(config: &FeedConfig, poster: FeedPoster) -> Self {
        if config.offline {
            info!("Offline mode: searching the built-in city catalog only");
            return Self::new(poster, Arc::new(CatalogGeocoder));
        }
        Self::new(poster, Arc::new(NominatimGeocoder::new(config)))
            .with_knowledge(Arc::new(WikipediaSummaries::new(config)))
            .with_feed(Arc::new(UsgsQuakes::new(config)))
            .with_feed(Arc::new(EonetEvents::new(config)))
            .with_station(
                Arc::new(StationTelemetry::new(config)),
                Duration::from_secs(config.station_refresh_seconds),
                Duration::from_secs(config.crew_delay_seconds),
            )
    }

    pub fn with_knowledge(mut self, knowledge: Arc<dyn KnowledgeSource>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn with_feed(mut self, feed: Arc<dyn FeedSource>) -> Self {
        self.feeds.push(feed);
        self
    }

    pub fn with_station(
        mut self,
        source: Arc<dyn StationSource>,
        refresh: Duration,
        crew_delay: Duration,
    ) -> Self {
        self.station = Some(StationWatch {
            source,
            refresh,
            crew_delay,
        });
        self
    }

    /// Fetch the live records for `layer` in the background. A layer with no
    /// source fails immediately.
    pub fn fetch_layer(&self, layer: &str) {
        let Some(feed) = self.feeds.iter().find(|f| f.layer() == layer).cloned() else {
            self.poster.post(FeedMessage::LayerFailed {
                layer: layer.to_string(),
                reason: CollaboratorError::Offline.to_string(),
            });
            return;
        };
        let poster = self.poster.clone();
        spawn_worker(format!("feed-{layer}"), move || {
            let layer = feed.layer().to_string();
            let message = match feed.fetch() {
                Ok(records) => {
                    debug!(layer = %layer, count = records.len(), "Feed fetched");
                    FeedMessage::LayerRecords { layer, records }
                }
                Err(e) => FeedMessage::LayerFailed {
                    layer,
                    reason: e.to_string(),
                },
            };
            poster.post(message);
        });
    }

    /// Look up an encyclopedia summary for `name`. Failure posts an empty
    /// summary and the unavailable status line.
    pub fn lookup_summary(&self, name: &str) {
        let name = name.to_string();
        let Some(knowledge) = self.knowledge.clone() else {
            post_summary_failure(&self.poster, name);
            return;
        };
        let poster = self.poster.clone();
        spawn_worker("knowledge".to_string(), move || match knowledge.summary(&name) {
            Ok(summary) => {
                poster.post(FeedMessage::Summary {
                    name,
                    summary: Some(summary),
                });
            }
            Err(e) => {
                warn!(name = %name, "Summary lookup failed: {e}");
                post_summary_failure(&poster, name);
            }
        });
    }

    pub fn search(&self, query: &str) {
        let query = query.to_string();
        let geocoder = Arc::clone(&self.geocoder);
        let poster = self.poster.clone();
        spawn_worker("geocoder".to_string(), move || match geocoder.search(&query) {
            Ok(places) => {
                poster.post(FeedMessage::SearchResults { query, places });
            }
            Err(e) => {
                warn!(query = %query, "Search failed: {e}");
                poster.post(FeedMessage::Status(format!("SEARCH FAILED: {query}")));
            }
        });
    }

    /// Poll the station position on its refresh interval and fetch the crew
    /// count once after its delay. Both workers stop when the inbox is gone.
    pub fn start_station_watch(&self) {
        let Some(watch) = &self.station else {
            return;
        };

        let source = Arc::clone(&watch.source);
        let poster = self.poster.clone();
        let refresh = watch.refresh;
        spawn_worker("station".to_string(), move || {
            loop {
                match source.position() {
                    Ok((lat, lon)) => {
                        if !poster.post(FeedMessage::StationPosition { lat, lon }) {
                            return;
                        }
                    }
                    Err(e) => warn!("Station telemetry failed: {e}"),
                }
                thread::sleep(refresh);
            }
        });

        let source = Arc::clone(&watch.source);
        let poster = self.poster.clone();
        let delay = watch.crew_delay;
        spawn_worker("crew".to_string(), move || {
            thread::sleep(delay);
            match source.crew_count() {
                Ok(count) => {
                    poster.post(FeedMessage::CrewCount(count));
                }
                Err(e) => warn!("Crew count failed: {e}"),
            }
        });
    }

    pub fn is_offline(&self) -> bool {
        self.knowledge.is_none() && self.feeds.is_empty()
    }
}

fn post_summary_failure(poster: &FeedPoster, name: String) {
    poster.post(FeedMessage::Summary {
        name,
        summary: None,
    });
    poster.post(FeedMessage::Status(KNOWLEDGE_UNAVAILABLE.to_string()));
}

fn spawn_worker(name: String, work: impl FnOnce() + Send + 'static) {
    if let Err(e) = thread::Builder::new().name(name.clone()).spawn(work) {
        warn!(worker = %name, "Failed to spawn worker thread: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_overlay::{FeedInbox, LIVE_QUAKES, OverlayRecord, Place, Summary};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedFeed(Vec<OverlayRecord>);

    impl FeedSource for FixedFeed {
        fn layer(&self) -> &'static str {
            LIVE_QUAKES
        }
        fn fetch(&self) -> Result<Vec<OverlayRecord>, CollaboratorError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenKnowledge;

    impl KnowledgeSource for BrokenKnowledge {
        fn summary(&self, _name: &str) -> Result<Summary, CollaboratorError> {
            Err(CollaboratorError::Http("status 503".to_string()))
        }
    }

    struct EchoKnowledge;

    impl KnowledgeSource for EchoKnowledge {
        fn summary(&self, name: &str) -> Result<Summary, CollaboratorError> {
            Ok(Summary {
                title: name.to_string(),
                extract: format!("About {name}"),
                page_url: None,
            })
        }
    }

    struct CountingStation {
        polls: AtomicUsize,
    }

    impl StationSource for CountingStation {
        fn position(&self) -> Result<(f32, f32), CollaboratorError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok((10.0, 20.0))
        }
        fn crew_count(&self) -> Result<u32, CollaboratorError> {
            Ok(7)
        }
    }

    fn collect(inbox: &FeedInbox, want: usize) -> Vec<FeedMessage> {
        let mut messages = Vec::new();
        for _ in 0..400 {
            messages.extend(inbox.drain());
            if messages.len() >= want {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        messages
    }

    #[test]
    fn test_search_posts_results() {
        let (poster, inbox) = FeedInbox::channel();
        let dispatcher = Dispatcher::new(poster, Arc::new(CatalogGeocoder));
        dispatcher.search("Tokyo");
        let messages = collect(&inbox, 1);
        match &messages[..] {
            [FeedMessage::SearchResults { query, places }] => {
                assert_eq!(query, "Tokyo");
                assert_eq!(places.first().map(|p: &Place| p.name.as_str()), Some("Tokyo"));
            }
            other => panic!("unexpected messages {other:?}"),
        }
    }

    #[test]
    fn test_feed_records_arrive_for_their_layer() {
        let (poster, inbox) = FeedInbox::channel();
        let dispatcher = Dispatcher::new(poster, Arc::new(CatalogGeocoder))
            .with_feed(Arc::new(FixedFeed(vec![OverlayRecord::new(1.0, 2.0)])));
        dispatcher.fetch_layer(LIVE_QUAKES);
        let messages = collect(&inbox, 1);
        assert!(matches!(
            &messages[..],
            [FeedMessage::LayerRecords { layer, records }] if layer == LIVE_QUAKES && records.len() == 1
        ));
    }

    #[test]
    fn test_layer_without_source_fails_immediately() {
        let (poster, inbox) = FeedInbox::channel();
        let dispatcher = Dispatcher::new(poster, Arc::new(CatalogGeocoder));
        assert!(dispatcher.is_offline());
        dispatcher.fetch_layer("liveevents");
        assert!(matches!(
            &inbox.drain()[..],
            [FeedMessage::LayerFailed { layer, .. }] if layer == "liveevents"
        ));
    }

    #[test]
    fn test_failed_summary_posts_unavailable() {
        let (poster, inbox) = FeedInbox::channel();
        let dispatcher = Dispatcher::new(poster, Arc::new(CatalogGeocoder))
            .with_knowledge(Arc::new(BrokenKnowledge));
        dispatcher.lookup_summary("Paris");
        let messages = collect(&inbox, 2);
        assert_eq!(
            messages,
            vec![
                FeedMessage::Summary {
                    name: "Paris".to_string(),
                    summary: None
                },
                FeedMessage::Status(KNOWLEDGE_UNAVAILABLE.to_string()),
            ]
        );
    }

    #[test]
    fn test_summary_success() {
        let (poster, inbox) = FeedInbox::channel();
        let dispatcher = Dispatcher::new(poster, Arc::new(CatalogGeocoder))
            .with_knowledge(Arc::new(EchoKnowledge));
        dispatcher.lookup_summary("Lagos");
        let messages = collect(&inbox, 1);
        assert!(matches!(
            &messages[..],
            [FeedMessage::Summary { summary: Some(s), .. }] if s.extract == "About Lagos"
        ));
    }

    #[test]
    fn test_offline_summary_fails_without_a_thread() {
        let (poster, inbox) = FeedInbox::channel();
        let dispatcher = Dispatcher::from_config(
            &FeedConfig {
                offline: true,
                ..FeedConfig::default()
            },
            poster,
        );
        dispatcher.lookup_summary("Oslo");
        assert_eq!(inbox.drain().len(), 2);
    }

    #[test]
    fn test_station_watch_posts_position_and_crew() {
        let (poster, inbox) = FeedInbox::channel();
        let station = Arc::new(CountingStation {
            polls: AtomicUsize::new(0),
        });
        let dispatcher = Dispatcher::new(poster, Arc::new(CatalogGeocoder)).with_station(
            station.clone(),
            Duration::from_millis(10),
            Duration::from_millis(20),
        );
        dispatcher.start_station_watch();

        let mut messages = Vec::new();
        for _ in 0..400 {
            messages.extend(inbox.drain());
            if messages.contains(&FeedMessage::CrewCount(7)) {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(messages.contains(&FeedMessage::StationPosition {
            lat: 10.0,
            lon: 20.0
        }));
        let crew = messages
            .iter()
            .filter(|m| matches!(m, FeedMessage::CrewCount(_)))
            .count();
        assert_eq!(crew, 1);
        assert!(station.polls.load(Ordering::SeqCst) >= 1);
    }
}
