//! Built-in tables behind the static overlay layers and city labels.

use crate::record::OverlayRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NuclearSite {
    pub name: &'static str,
    pub lat: f32,
    pub lon: f32,
    /// Year of the first detonation.
    pub year: u16,
    pub tests: u16,
    pub note: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictZone {
    pub name: &'static str,
    pub lat: f32,
    pub lon: f32,
    pub severity: &'static str,
    pub note: &'static str,
}

/// A great-circle route between two `(lat, lon)` endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub name: &'static str,
    pub from: (f32, f32),
    pub to: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeismicZone {
    pub lat: f32,
    pub lon: f32,
    /// Largest expected magnitude.
    pub magnitude: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationCenter {
    pub name: &'static str,
    pub lat: f32,
    pub lon: f32,
    pub density: f32,
}

/// A labelled city. Tier 0 is the most prominent; higher tiers appear as
/// the camera closes in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub lat: f32,
    pub lon: f32,
    pub tier: u8,
}

pub const MAX_CITY_TIER: u8 = 4;

const fn site(
    name: &'static str,
    lat: f32,
    lon: f32,
    year: u16,
    tests: u16,
    note: &'static str,
) -> NuclearSite {
    NuclearSite {
        name,
        lat,
        lon,
        year,
        tests,
        note,
    }
}

const fn zone(
    name: &'static str,
    lat: f32,
    lon: f32,
    severity: &'static str,
    note: &'static str,
) -> ConflictZone {
    ConflictZone {
        name,
        lat,
        lon,
        severity,
        note,
    }
}

const fn route(name: &'static str, from: (f32, f32), to: (f32, f32)) -> Route {
    Route { name, from, to }
}

const fn fault(lat: f32, lon: f32, magnitude: f32) -> SeismicZone {
    SeismicZone {
        lat,
        lon,
        magnitude,
    }
}

const fn hub(name: &'static str, lat: f32, lon: f32, density: f32) -> PopulationCenter {
    PopulationCenter {
        name,
        lat,
        lon,
        density,
    }
}

const fn city(name: &'static str, lat: f32, lon: f32, tier: u8) -> City {
    City {
        name,
        lat,
        lon,
        tier,
    }
}

pub const NUCLEAR_SITES: &[NuclearSite] = &[
    site("Trinity", 33.68, -106.48, 1945, 1, "The first sun made by hand. The sand turned to glass."),
    site("Nevada Test Site", 37.12, -116.05, 1951, 928, "Tourists watched the mushroom clouds from Las Vegas hotel rooftops."),
    site("Semipalatinsk", 50.07, 78.43, 1949, 456, "The steppe remembers every one of them."),
    site("Novaya Zemlya", 73.37, 54.98, 1955, 130, "Tsar Bomba. Fifty megatons, because they could."),
    site("Lop Nur", 41.53, 88.72, 1964, 45, "A dry lake that was never asked."),
    site("Moruroa", -21.83, -138.90, 1966, 181, "The atoll is slowly cracking. Paradise, annotated."),
    site("Bikini Atoll", 11.58, 165.38, 1946, 23, "They named a swimsuit after it."),
    site("Enewetak", 11.50, 162.33, 1948, 43, "The waste sits under a concrete dome. The sea is rising."),
    site("Maralinga", -30.16, 131.58, 1956, 7, "Nobody asked the people who already lived there."),
    site("Reggane", 26.72, 0.17, 1960, 4, "Gerboise Bleue. The desert keeps the dust."),
    site("Pokhran", 26.95, 71.75, 1974, 6, "The Buddha smiled, allegedly."),
    site("Ras Koh", 28.83, 64.95, 1998, 6, "The mountain turned white from the inside."),
    site("Punggye-ri", 41.28, 129.08, 2006, 6, "The mountain is tired. Tunnels keep collapsing."),
    site("Kiritimati", 1.87, -157.40, 1957, 30, "Christmas Island, where the birds went blind."),
];

pub const CONFLICT_ZONES: &[ConflictZone] = &[
    zone("Donbas", 48.00, 37.80, "CRITICAL", "Trenches again. The century learned nothing."),
    zone("Gaza", 31.40, 34.35, "CRITICAL", "The most surveilled strip of land on the planet."),
    zone("Khartoum", 15.50, 32.56, "HIGH", "A capital city emptied by two generals."),
    zone("Sahel", 16.00, -1.50, "HIGH", "Borders drawn with a ruler, defended with rifles."),
    zone("Eastern DRC", -1.68, 29.22, "HIGH", "Your phone battery has a supply chain."),
    zone("Yemen", 15.37, 44.19, "HIGH", "Famine as strategy."),
    zone("Myanmar", 21.91, 95.96, "HIGH", "The junta counts on the world forgetting."),
    zone("Syria", 35.00, 38.50, "ELEVATED", "Thirteen years. Everyone moved on except the people there."),
    zone("Tigray", 13.50, 39.47, "ELEVATED", "A ceasefire holding its breath."),
    zone("Haiti", 18.54, -72.34, "HIGH", "Gangs govern the capital."),
    zone("Kashmir", 34.08, 74.80, "ELEVATED", "Two nuclear states and one valley."),
    zone("Sahel Lake Chad", 13.00, 14.00, "ELEVATED", "The lake shrinks. The fighting doesn't."),
];

pub const CABLES: &[Route] = &[
    route("TAT-14", (40.00, -74.00), (50.83, -4.55)),
    route("MAREA", (36.85, -75.98), (43.26, -2.93)),
    route("SEA-ME-WE 3", (43.30, 5.37), (1.29, 103.85)),
    route("FASTER", (45.00, -123.90), (34.90, 139.90)),
    route("Unity", (34.00, -118.50), (34.95, 139.95)),
    route("SAm-1", (26.10, -80.10), (-3.72, -38.54)),
    route("Southern Cross", (-33.87, 151.21), (21.30, -157.80)),
    route("EllaLink", (37.95, -8.87), (-3.72, -38.54)),
    route("APG", (1.29, 103.85), (35.00, 139.80)),
    route("PEACE", (43.30, 5.37), (24.86, 67.00)),
    route("Hawaiki", (-33.87, 151.21), (45.00, -123.90)),
    route("2Africa", (50.83, -4.55), (-33.92, 18.42)),
    route("WACS", (-33.92, 18.42), (51.50, -0.12)),
    route("EASSy", (-29.86, 31.03), (11.59, 43.15)),
];

const LHR: (f32, f32) = (51.47, -0.45);
const JFK: (f32, f32) = (40.64, -73.78);
const LAX: (f32, f32) = (33.94, -118.41);
const NRT: (f32, f32) = (35.77, 140.39);
const HKG: (f32, f32) = (22.31, 113.91);
const SIN: (f32, f32) = (1.36, 103.99);
const DXB: (f32, f32) = (25.25, 55.36);
const SYD: (f32, f32) = (-33.95, 151.18);
const GRU: (f32, f32) = (-23.43, -46.47);
const JNB: (f32, f32) = (-26.14, 28.24);
const FRA: (f32, f32) = (50.03, 8.57);
const CDG: (f32, f32) = (49.01, 2.55);
const ORD: (f32, f32) = (41.97, -87.90);
const PEK: (f32, f32) = (40.08, 116.58);
const DEL: (f32, f32) = (28.56, 77.10);

pub const FLIGHT_ROUTES: &[Route] = &[
    route("LHR-JFK", LHR, JFK),
    route("JFK-LAX", JFK, LAX),
    route("LAX-NRT", LAX, NRT),
    route("LHR-DXB", LHR, DXB),
    route("DXB-SIN", DXB, SIN),
    route("SIN-SYD", SIN, SYD),
    route("HKG-LHR", HKG, LHR),
    route("FRA-ORD", FRA, ORD),
    route("CDG-GRU", CDG, GRU),
    route("JNB-DXB", JNB, DXB),
    route("PEK-FRA", PEK, FRA),
    route("DEL-LHR", DEL, LHR),
    route("SYD-LAX", SYD, LAX),
    route("NRT-HKG", NRT, HKG),
    route("GRU-JFK", GRU, JFK),
];

pub const SEISMIC_ZONES: &[SeismicZone] = &[
    fault(36.00, -120.50, 8.0),
    fault(45.00, -125.00, 9.0),
    fault(38.30, 142.40, 9.1),
    fault(3.30, 95.90, 9.1),
    fault(-38.20, -73.00, 9.5),
    fault(61.00, -147.70, 9.2),
    fault(28.20, 84.70, 8.4),
    fault(40.70, 30.00, 7.8),
    fault(-43.50, 170.50, 8.1),
    fault(17.00, -100.00, 8.0),
    fault(35.70, 51.40, 7.7),
    fault(-20.00, -175.00, 8.3),
    fault(-6.10, 106.80, 8.5),
    fault(14.60, 121.00, 8.0),
];

pub const POP_CENTERS: &[PopulationCenter] = &[
    hub("Tokyo", 35.68, 139.69, 9.8),
    hub("Delhi", 28.61, 77.21, 9.6),
    hub("Shanghai", 31.23, 121.47, 9.4),
    hub("Dhaka", 23.81, 90.41, 9.9),
    hub("Sao Paulo", -23.55, -46.63, 8.7),
    hub("Cairo", 30.04, 31.24, 8.9),
    hub("Mexico City", 19.43, -99.13, 8.6),
    hub("Beijing", 39.90, 116.41, 8.8),
    hub("Mumbai", 19.08, 72.88, 9.7),
    hub("Osaka", 34.69, 135.50, 8.1),
    hub("Karachi", 24.86, 67.00, 9.1),
    hub("Chongqing", 29.56, 106.55, 8.3),
    hub("Istanbul", 41.01, 28.98, 8.2),
    hub("Buenos Aires", -34.60, -58.38, 7.6),
    hub("Kolkata", 22.57, 88.36, 9.3),
    hub("Lagos", 6.52, 3.38, 9.2),
    hub("Kinshasa", -4.44, 15.27, 8.5),
    hub("Manila", 14.60, 120.98, 9.5),
    hub("Guangzhou", 23.13, 113.26, 8.4),
    hub("Jakarta", -6.21, 106.85, 8.9),
    hub("Lahore", 31.55, 74.34, 8.8),
    hub("Moscow", 55.76, 37.62, 7.4),
];

pub const CITIES: &[City] = &[
    city("London", 51.50, -0.12, 0),
    city("New York", 40.71, -74.01, 0),
    city("Tokyo", 35.68, 139.69, 0),
    city("Beijing", 39.90, 116.41, 0),
    city("Moscow", 55.76, 37.62, 0),
    city("Sydney", -33.87, 151.21, 0),
    city("Cairo", 30.04, 31.24, 0),
    city("Sao Paulo", -23.55, -46.63, 0),
    city("Paris", 48.86, 2.35, 1),
    city("Los Angeles", 34.05, -118.24, 1),
    city("Mumbai", 19.08, 72.88, 1),
    city("Shanghai", 31.23, 121.47, 1),
    city("Lagos", 6.52, 3.38, 1),
    city("Mexico City", 19.43, -99.13, 1),
    city("Buenos Aires", -34.60, -58.38, 1),
    city("Singapore", 1.35, 103.82, 1),
    city("Dubai", 25.20, 55.27, 1),
    city("Berlin", 52.52, 13.40, 2),
    city("Madrid", 40.42, -3.70, 2),
    city("Rome", 41.90, 12.50, 2),
    city("Istanbul", 41.01, 28.98, 2),
    city("Toronto", 43.65, -79.38, 2),
    city("Chicago", 41.88, -87.63, 2),
    city("Seoul", 37.57, 126.98, 2),
    city("Delhi", 28.61, 77.21, 2),
    city("Johannesburg", -26.20, 28.05, 2),
    city("Jakarta", -6.21, 106.85, 2),
    city("Nairobi", -1.29, 36.82, 3),
    city("Lima", -12.05, -77.04, 3),
    city("Bangkok", 13.76, 100.50, 3),
    city("Tehran", 35.69, 51.39, 3),
    city("Stockholm", 59.33, 18.07, 3),
    city("Vancouver", 49.28, -123.12, 3),
    city("Hong Kong", 22.32, 114.17, 3),
    city("Auckland", -36.85, 174.76, 3),
    city("Anchorage", 61.22, -149.90, 3),
    city("Reykjavik", 64.15, -21.94, 4),
    city("Honolulu", 21.31, -157.86, 4),
    city("Ulaanbaatar", 47.89, 106.91, 4),
    city("Dakar", 14.72, -17.47, 4),
    city("Lisbon", 38.72, -9.14, 4),
    city("Havana", 23.11, -82.37, 4),
    city("Perth", -31.95, 115.86, 4),
    city("Kyiv", 50.45, 30.52, 4),
];

const SEISMIC_NARRATIVE: &str = "The earth waiting to shrug off the parasites.";
const POPULATION_NARRATIVE: &str =
    "Swarming biological vectors converting carbon into anxiety and waste heat.";

pub fn nuclear_records() -> Vec<OverlayRecord> {
    NUCLEAR_SITES
        .iter()
        .map(|s| {
            OverlayRecord::new(s.lat, s.lon)
                .with_category("NUCLEAR SITE")
                .with_title(s.name)
                .with_detail(format!("Detonated: {} | Tests: {}", s.year, s.tests))
                .with_narrative(s.note)
        })
        .collect()
}

pub fn conflict_records() -> Vec<OverlayRecord> {
    CONFLICT_ZONES
        .iter()
        .map(|z| {
            OverlayRecord::new(z.lat, z.lon)
                .with_category("CONFLICT ZONE")
                .with_title(z.name)
                .with_detail(format!("Severity: {}", z.severity))
                .with_narrative(z.note)
        })
        .collect()
}

pub fn seismic_records() -> Vec<OverlayRecord> {
    SEISMIC_ZONES
        .iter()
        .map(|z| {
            OverlayRecord::new(z.lat, z.lon)
                .with_category("SEISMIC RISK")
                .with_title("FAULT LINE")
                .with_detail(format!("Magnitude Potential: {}", z.magnitude))
                .with_narrative(SEISMIC_NARRATIVE)
        })
        .collect()
}

pub fn population_records() -> Vec<OverlayRecord> {
    POP_CENTERS
        .iter()
        .map(|p| {
            OverlayRecord::new(p.lat, p.lon)
                .with_category("POPULATION HUB")
                .with_title(p.name)
                .with_detail(format!("Density Factor: {}", p.density))
                .with_narrative(POPULATION_NARRATIVE)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_hold_valid_coordinates() {
        let points = NUCLEAR_SITES
            .iter()
            .map(|s| (s.lat, s.lon))
            .chain(CONFLICT_ZONES.iter().map(|z| (z.lat, z.lon)))
            .chain(SEISMIC_ZONES.iter().map(|z| (z.lat, z.lon)))
            .chain(POP_CENTERS.iter().map(|p| (p.lat, p.lon)))
            .chain(CITIES.iter().map(|c| (c.lat, c.lon)))
            .chain(CABLES.iter().chain(FLIGHT_ROUTES).flat_map(|r| [r.from, r.to]));
        for (lat, lon) in points {
            assert!((-90.0..=90.0).contains(&lat), "lat {lat}");
            assert!((-180.0..=180.0).contains(&lon), "lon {lon}");
        }
    }

    #[test]
    fn test_every_tier_is_populated() {
        for tier in 0..=MAX_CITY_TIER {
            assert!(CITIES.iter().any(|c| c.tier == tier), "tier {tier} empty");
        }
    }

    #[test]
    fn test_nuclear_record_text() {
        let records = nuclear_records();
        assert_eq!(records.len(), NUCLEAR_SITES.len());
        let trinity = &records[0];
        assert_eq!(trinity.category, "NUCLEAR SITE");
        assert_eq!(trinity.title, "Trinity");
        assert_eq!(trinity.detail, "Detonated: 1945 | Tests: 1");
    }

    #[test]
    fn test_seismic_records_are_fault_lines() {
        let records = seismic_records();
        assert!(records.iter().all(|r| r.title == "FAULT LINE"));
        assert_eq!(records[1].detail, "Magnitude Potential: 9");
    }
}
