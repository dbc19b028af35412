//! Static gazetteer of Korean administrative districts.
//!
//! The dataset is embedded at build time and loaded exactly once into
//! process-wide immutable state; everything exposed from here is a read-only
//! query. Coordinates are per-city only, which makes [`Gazetteer::city_coordinates`]
//! intentionally coarse — it is the resolution fallback, not a geocode.

use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Coordinates, SEGMENT_SEPARATOR};

const DATASET: &str = include_str!("../data/korea_districts.json");

static GLOBAL: OnceLock<Gazetteer> = OnceLock::new();

#[derive(Debug, Deserialize)]
struct CityRecord {
    /// Romanized city name, display only.
    en: String,
    lat: f64,
    lon: f64,
}

/// In-memory district dataset: city coordinates plus the ordered list of
/// hierarchical district names used for search-as-you-type.
#[derive(Debug, Deserialize)]
pub struct Gazetteer {
    cities: HashMap<String, CityRecord>,
    districts: Vec<String>,
}

/// Structural split of a hierarchical name; no validation against the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDistrict<'a> {
    pub city: &'a str,
    pub district: Option<&'a str>,
    pub dong: Option<&'a str>,
}

impl Gazetteer {
    /// The process-wide dataset, parsed from the embedded asset on first use.
    pub fn global() -> &'static Gazetteer {
        GLOBAL.get_or_init(|| {
            Gazetteer::from_json(DATASET).expect("embedded korea_districts.json must parse")
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse gazetteer dataset")
    }

    /// Case-insensitive substring search against any hierarchical segment,
    /// in dataset declaration order, truncated to `limit`.
    ///
    /// A query matching only a middle segment still matches; empty or
    /// whitespace-only queries return nothing (no "browse all" mode).
    pub fn search(&self, query: &str, limit: usize) -> Vec<&str> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let needle = trimmed.to_lowercase();

        self.districts
            .iter()
            .filter(|district| {
                district
                    .split(SEGMENT_SEPARATOR)
                    .any(|segment| segment.to_lowercase().contains(&needle))
            })
            .map(String::as_str)
            .take(limit)
            .collect()
    }

    /// Coordinates of the coarsest (first) segment's city, if registered.
    pub fn city_coordinates(&self, full_name: &str) -> Option<Coordinates> {
        let city = full_name.split(SEGMENT_SEPARATOR).next()?;
        self.cities
            .get(city)
            .map(|record| Coordinates { lat: record.lat, lon: record.lon })
    }

    /// Romanized name of a city key, if registered.
    pub fn city_english_name(&self, city: &str) -> Option<&str> {
        self.cities.get(city).map(|record| record.en.as_str())
    }

    /// Split a full name into its (up to three) hierarchy levels.
    pub fn parse<'a>(&self, full_name: &'a str) -> ParsedDistrict<'a> {
        let mut parts = full_name.split(SEGMENT_SEPARATOR);
        ParsedDistrict {
            city: parts.next().unwrap_or(full_name),
            district: parts.next(),
            dong: parts.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Gazetteer {
        Gazetteer::from_json(
            r#"{
                "cities": {
                    "Seoul": { "en": "Seoul", "lat": 37.5665, "lon": 126.978 },
                    "Busan": { "en": "Busan", "lat": 35.1796, "lon": 129.0756 }
                },
                "districts": [
                    "Seoul-Jongno-Cheongun",
                    "Seoul-Jongno-Samcheong",
                    "Seoul-Gangnam-Yeoksam",
                    "Busan-Haeundae-U"
                ]
            }"#,
        )
        .expect("fixture must parse")
    }

    #[test]
    fn search_matches_any_segment_case_insensitively() {
        let gazetteer = fixture();

        let hits = gazetteer.search("jongno", 10);
        assert_eq!(hits, vec!["Seoul-Jongno-Cheongun", "Seoul-Jongno-Samcheong"]);

        // Middle-segment-only matches still count.
        let hits = gazetteer.search("HAEUNDAE", 10);
        assert_eq!(hits, vec!["Busan-Haeundae-U"]);
    }

    #[test]
    fn search_keeps_declaration_order_and_truncates() {
        let gazetteer = fixture();

        let hits = gazetteer.search("seoul", 2);
        assert_eq!(hits, vec!["Seoul-Jongno-Cheongun", "Seoul-Jongno-Samcheong"]);
    }

    #[test]
    fn search_rejects_blank_queries() {
        let gazetteer = fixture();

        assert!(gazetteer.search("", 10).is_empty());
        assert!(gazetteer.search("   ", 10).is_empty());
    }

    #[test]
    fn city_coordinates_uses_only_the_first_segment() {
        let gazetteer = fixture();

        let coords = gazetteer.city_coordinates("Seoul-Jongno-Cheongun").unwrap();
        assert_eq!(coords.lat, 37.5665);
        assert_eq!(coords.lon, 126.978);

        // Unregistered city key, even with plausible finer segments.
        assert!(gazetteer.city_coordinates("Daejeon-Seo-Dunsan").is_none());
    }

    #[test]
    fn parse_is_purely_structural() {
        let gazetteer = fixture();

        let parsed = gazetteer.parse("Seoul-Jongno-Cheongun");
        assert_eq!(parsed.city, "Seoul");
        assert_eq!(parsed.district, Some("Jongno"));
        assert_eq!(parsed.dong, Some("Cheongun"));

        let parsed = gazetteer.parse("Nowhere");
        assert_eq!(parsed.city, "Nowhere");
        assert_eq!(parsed.district, None);
        assert_eq!(parsed.dong, None);
    }

    #[test]
    fn embedded_dataset_loads_and_serves_korean_queries() {
        let gazetteer = Gazetteer::global();

        let hits = gazetteer.search("종로", 10);
        assert!(hits.contains(&"서울특별시-종로구-청운동"));

        let coords = gazetteer.city_coordinates("서울특별시-종로구-청운동").unwrap();
        assert!((coords.lat - 37.5665).abs() < 1e-6);
        assert_eq!(gazetteer.city_english_name("서울특별시"), Some("Seoul"));
    }
}
