//! Named runtime switches that gate individual rendering subsystems.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One named switch in [`DiagnosticsConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    Bloom,
    Aurora,
    Atmosphere,
    Orbits,
    Solar,
    Labels,
    Stars,
    Picking,
}

impl Diagnostic {
    /// Every switch, in display order.
    pub const ALL: [Diagnostic; 8] = [
        Diagnostic::Bloom,
        Diagnostic::Aurora,
        Diagnostic::Atmosphere,
        Diagnostic::Orbits,
        Diagnostic::Solar,
        Diagnostic::Labels,
        Diagnostic::Stars,
        Diagnostic::Picking,
    ];

    /// Lowercase name used in logs and config files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bloom => "bloom",
            Self::Aurora => "aurora",
            Self::Atmosphere => "atmosphere",
            Self::Orbits => "orbits",
            Self::Solar => "solar",
            Self::Labels => "labels",
            Self::Stars => "stars",
            Self::Picking => "picking",
        }
    }

    /// The key that flips this switch.
    pub fn key_hint(self) -> char {
        match self {
            Self::Bloom => 'B',
            Self::Aurora => 'A',
            Self::Atmosphere => 'T',
            Self::Orbits => 'O',
            Self::Solar => 'S',
            Self::Labels => 'L',
            Self::Stars => 'R',
            Self::Picking => 'X',
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The full toggle set. Everything starts on except bloom.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub bloom: bool,
    pub aurora: bool,
    pub atmosphere: bool,
    pub orbits: bool,
    pub solar: bool,
    pub labels: bool,
    pub stars: bool,
    pub picking: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            bloom: false,
            aurora: true,
            atmosphere: true,
            orbits: true,
            solar: true,
            labels: true,
            stars: true,
            picking: true,
        }
    }
}

impl DiagnosticsConfig {
    /// Current state of one switch.
    pub fn is_enabled(&self, diagnostic: Diagnostic) -> bool {
        match diagnostic {
            Diagnostic::Bloom => self.bloom,
            Diagnostic::Aurora => self.aurora,
            Diagnostic::Atmosphere => self.atmosphere,
            Diagnostic::Orbits => self.orbits,
            Diagnostic::Solar => self.solar,
            Diagnostic::Labels => self.labels,
            Diagnostic::Stars => self.stars,
            Diagnostic::Picking => self.picking,
        }
    }

    /// Flip one switch and return its new state.
    pub fn toggle(&mut self, diagnostic: Diagnostic) -> bool {
        let slot = match diagnostic {
            Diagnostic::Bloom => &mut self.bloom,
            Diagnostic::Aurora => &mut self.aurora,
            Diagnostic::Atmosphere => &mut self.atmosphere,
            Diagnostic::Orbits => &mut self.orbits,
            Diagnostic::Solar => &mut self.solar,
            Diagnostic::Labels => &mut self.labels,
            Diagnostic::Stars => &mut self.stars,
            Diagnostic::Picking => &mut self.picking,
        };
        *slot = !*slot;
        *slot
    }

    /// One-line summary such as `[B] bloom: OFF  [A] aurora: ON ...`.
    pub fn summary(&self) -> String {
        Diagnostic::ALL
            .iter()
            .map(|&d| {
                let state = if self.is_enabled(d) { "ON" } else { "OFF" };
                format!("[{}] {}: {}", d.key_hint(), d.name(), state)
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_all_on_except_bloom() {
        let diag = DiagnosticsConfig::default();
        for d in Diagnostic::ALL {
            assert_eq!(diag.is_enabled(d), d != Diagnostic::Bloom, "{d}");
        }
    }

    #[test]
    fn test_toggle_flips_only_one_switch() {
        let mut diag = DiagnosticsConfig::default();
        assert!(!diag.toggle(Diagnostic::Aurora));
        assert!(!diag.aurora);
        assert!(diag.atmosphere);
        assert!(diag.toggle(Diagnostic::Aurora));
        assert_eq!(diag, DiagnosticsConfig::default());
    }

    #[test]
    fn test_summary_lists_every_switch() {
        let summary = DiagnosticsConfig::default().summary();
        assert!(summary.starts_with("[B] bloom: OFF"));
        assert!(summary.contains("[X] picking: ON"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&DiagnosticsConfig::default()).unwrap();
        assert!(json.contains("\"bloom\":false"));
        assert!(json.contains("\"picking\":true"));
    }
}
