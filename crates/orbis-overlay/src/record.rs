//! Inspectable data attached to overlay points.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "DATA POINT";
pub const DEFAULT_TITLE: &str = "Unknown";
pub const DEFAULT_NARRATIVE: &str = "More activity on the crust.";

/// One geodetic point with the text shown when it is inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRecord {
    pub lat: f32,
    pub lon: f32,
    pub category: String,
    pub title: String,
    pub detail: String,
    pub narrative: String,
}

impl OverlayRecord {
    /// A record at `(lat, lon)` with every text field defaulted.
    pub fn new(lat: f32, lon: f32) -> Self {
        Self {
            lat,
            lon,
            category: DEFAULT_CATEGORY.to_owned(),
            title: DEFAULT_TITLE.to_owned(),
            detail: String::new(),
            narrative: DEFAULT_NARRATIVE.to_owned(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_empty_or(category.into(), DEFAULT_CATEGORY);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty_or(title.into(), DEFAULT_TITLE);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = non_empty_or(narrative.into(), DEFAULT_NARRATIVE);
        self
    }

    /// Coordinate line, e.g. `LAT 51.50 // LON -0.12`.
    pub fn stats(&self) -> String {
        format!("LAT {:.2} // LON {:.2}", self.lat, self.lon)
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_owned()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let record = OverlayRecord::new(10.0, 20.0);
        assert_eq!(record.category, "DATA POINT");
        assert_eq!(record.title, "Unknown");
        assert_eq!(record.detail, "");
        assert_eq!(record.narrative, "More activity on the crust.");
    }

    #[test]
    fn test_stats_format() {
        let record = OverlayRecord::new(51.5, -0.1234);
        assert_eq!(record.stats(), "LAT 51.50 // LON -0.12");
    }

    #[test]
    fn test_empty_strings_fall_back() {
        let record = OverlayRecord::new(0.0, 0.0)
            .with_title("")
            .with_category("")
            .with_narrative("")
            .with_detail("x");
        assert_eq!(record.title, DEFAULT_TITLE);
        assert_eq!(record.category, DEFAULT_CATEGORY);
        assert_eq!(record.narrative, DEFAULT_NARRATIVE);
        assert_eq!(record.detail, "x");
    }
}
