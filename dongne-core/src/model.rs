use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hierarchical place names join their segments with this separator,
/// coarse to fine: `시-구-동`.
pub const SEGMENT_SEPARATOR: char = '-';

/// Human-readable form of a hierarchical place name: separators become spaces.
pub fn display_name(full_name: &str) -> String {
    full_name.replace(SEGMENT_SEPARATOR, " ")
}

/// The finest segment of a hierarchical place name (the `동` for a full
/// three-segment name, or whatever the name ends with).
pub fn finest_segment(full_name: &str) -> &str {
    full_name
        .rsplit(SEGMENT_SEPARATOR)
        .next()
        .unwrap_or(full_name)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A place name bound to concrete coordinates, ready for weather lookup.
///
/// Only exists after a resolution succeeds; an in-flight or failed resolution
/// is the absence of this value, never a zero coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub display_name: String,
    pub full_name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Normalized current-conditions reading from the weather provider.
#[derive(Debug, Clone)]
pub struct CurrentConditions {
    /// Station name as reported by the provider.
    pub station_name: String,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    /// UTC offset of the observed location in seconds. "Today" and hourly
    /// times are computed against this, not the machine timezone.
    pub utc_offset_secs: i32,
}

/// One normalized entry of the provider's 3-hourly forecast list.
#[derive(Debug, Clone)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temp: f64,
    pub description: String,
    pub icon: String,
}

/// Display-ready weather summary for one coordinate pair.
///
/// All temperatures are whole degrees: current and hourly temps round to
/// nearest, the daily min/max floor the extrema they cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: String,
    pub current_temp: i32,
    pub temp_min: i32,
    pub temp_max: i32,
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: i32,
    pub hourly: Vec<HourlyPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    /// Location-local wall clock, 24h `HH:MM`.
    pub time: String,
    pub temp: i32,
    pub icon: String,
    pub description: String,
}

/// A user-pinned location as persisted by the favorites store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: String,
    pub full_name: String,
    pub alias: String,
    pub lat: f64,
    pub lon: f64,
    /// Unix milliseconds at creation.
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_replaces_all_separators() {
        assert_eq!(display_name("서울특별시-종로구-청운동"), "서울특별시 종로구 청운동");
        assert_eq!(display_name("세종특별자치시"), "세종특별자치시");
    }

    #[test]
    fn finest_segment_takes_the_last_part() {
        assert_eq!(finest_segment("서울특별시-종로구-청운동"), "청운동");
        assert_eq!(finest_segment("세종특별자치시-조치원읍"), "조치원읍");
        assert_eq!(finest_segment("제주특별자치도"), "제주특별자치도");
    }
}
