//! Weather aggregation: two provider reads reduced into one display-ready
//! snapshot.
//!
//! The fetch is all-or-nothing — a snapshot is never half-filled — and the
//! reduction itself is a pure function of the two payloads and the clock, so
//! it is unit-tested without any network.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{CurrentConditions, ForecastEntry, HourlyPoint, WeatherSnapshot};
use crate::provider::WeatherProvider;

/// Hourly strip length cap. Raw provider cadence is preserved up to this.
pub const HOURLY_CAP: usize = 12;

#[derive(Debug)]
pub struct WeatherAggregator {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherAggregator {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Fetch current conditions and forecast for one coordinate pair and
    /// reduce them into a snapshot.
    ///
    /// `(0, 0)` is the "no location" sentinel and fails before any network
    /// call. Either read failing fails the whole aggregation.
    pub async fn fetch(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot> {
        if lat == 0.0 && lon == 0.0 {
            return Err(Error::NoLocation);
        }

        debug!(lat, lon, "fetching weather snapshot");

        let (current, forecast) = tokio::join!(
            self.provider.current(lat, lon),
            self.provider.forecast(lat, lon),
        );

        let current = current.map_err(Error::Current)?;
        let forecast = forecast.map_err(Error::Forecast)?;

        Ok(reduce(current, forecast, Utc::now()))
    }
}

/// Reduce the two provider payloads into a snapshot.
///
/// "Today" and the `HH:MM` labels use the location's UTC offset as reported
/// by the provider, so the result does not depend on the machine timezone.
pub fn reduce(
    current: CurrentConditions,
    mut forecast: Vec<ForecastEntry>,
    now: DateTime<Utc>,
) -> WeatherSnapshot {
    let offset = local_offset(current.utc_offset_secs);
    forecast.sort_by_key(|entry| entry.timestamp);

    let today = now.with_timezone(&offset).date_naive();
    let todays_temps: Vec<f64> = forecast
        .iter()
        .filter(|entry| entry.timestamp.with_timezone(&offset).date_naive() == today)
        .map(|entry| entry.temp)
        .collect();

    let (temp_min, temp_max) = daily_min_max(&current, &todays_temps);

    let hourly = forecast
        .iter()
        .take(HOURLY_CAP)
        .map(|entry| HourlyPoint {
            time: entry.timestamp.with_timezone(&offset).format("%H:%M").to_string(),
            temp: entry.temp.round() as i32,
            icon: entry.icon.clone(),
            description: entry.description.clone(),
        })
        .collect();

    WeatherSnapshot {
        location: current.station_name,
        current_temp: current.temp.round() as i32,
        temp_min,
        temp_max,
        description: current.description,
        icon: current.icon,
        humidity: current.humidity,
        wind_speed: current.wind_speed.round() as i32,
        hourly,
    }
}

fn local_offset(utc_offset_secs: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_secs).unwrap_or_else(|| Utc.fix())
}

/// Today's temperature range.
///
/// With no forecast entries on today's calendar date the provider's own
/// min/max stand as-is; otherwise the range is the floor-rounded extrema over
/// today's forecast temps, the current reading, and the provider min/max —
/// the provider min/max always count, even when narrower than the forecast.
fn daily_min_max(current: &CurrentConditions, todays_temps: &[f64]) -> (i32, i32) {
    if todays_temps.is_empty() {
        return (current.temp_min.floor() as i32, current.temp_max.floor() as i32);
    }

    let mut min = current.temp_min.min(current.temp_max).min(current.temp);
    let mut max = current.temp_max.max(current.temp_min).max(current.temp);
    for &temp in todays_temps {
        min = min.min(temp);
        max = max.max(temp);
    }

    (min.floor() as i32, max.floor() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::TimeZone;

    const KST: i32 = 9 * 3600;

    fn current(temp: f64, temp_min: f64, temp_max: f64) -> CurrentConditions {
        CurrentConditions {
            station_name: "Jongno-gu".to_string(),
            temp,
            temp_min,
            temp_max,
            humidity: 60,
            wind_speed: 3.6,
            description: "맑음".to_string(),
            icon: "01d".to_string(),
            utc_offset_secs: KST,
        }
    }

    fn entry(timestamp: DateTime<Utc>, temp: f64) -> ForecastEntry {
        ForecastEntry {
            timestamp,
            temp,
            description: "구름조금".to_string(),
            icon: "02d".to_string(),
        }
    }

    // 2023-11-15 03:00 KST
    fn noon_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 15, 3, 0, 0).unwrap()
    }

    #[test]
    fn daily_range_covers_forecast_current_and_provider_bounds() {
        // current temp_min=10, temp_max=15, today's forecast [12, 18], current 16
        // → min 10, max 18.
        let now = noon_utc();
        let forecast = vec![
            entry(now + chrono::Duration::hours(3), 12.0),
            entry(now + chrono::Duration::hours(6), 18.0),
        ];

        let snapshot = reduce(current(16.0, 10.0, 15.0), forecast, now);

        assert_eq!(snapshot.temp_min, 10);
        assert_eq!(snapshot.temp_max, 18);
        assert_eq!(snapshot.current_temp, 16);
    }

    #[test]
    fn daily_range_falls_back_to_provider_bounds_without_todays_entries() {
        let now = noon_utc();
        // All entries land on the next local calendar date.
        let forecast = vec![
            entry(now + chrono::Duration::hours(24), 25.0),
            entry(now + chrono::Duration::hours(27), 26.0),
        ];

        let snapshot = reduce(current(12.4, 10.6, 15.9), forecast, now);

        assert_eq!(snapshot.temp_min, 10);
        assert_eq!(snapshot.temp_max, 15);
    }

    #[test]
    fn min_max_bracket_the_current_reading_when_today_has_entries() {
        let now = noon_utc();
        let forecast = vec![entry(now + chrono::Duration::hours(2), 13.0)];

        let snapshot = reduce(current(14.0, 13.5, 13.8), forecast, now);

        assert!(snapshot.temp_min <= snapshot.current_temp);
        assert!(snapshot.current_temp <= snapshot.temp_max);
    }

    #[test]
    fn today_filter_uses_the_location_offset_not_utc() {
        // 2023-11-15 23:30 KST is 14:30 UTC; an entry at 16:00 UTC the same
        // UTC day is already 2023-11-16 in KST and must not count as today.
        let now = Utc.with_ymd_and_hms(2023, 11, 15, 14, 30, 0).unwrap();
        let tomorrow_kst = Utc.with_ymd_and_hms(2023, 11, 15, 16, 0, 0).unwrap();

        let snapshot = reduce(current(5.0, 3.0, 6.0), vec![entry(tomorrow_kst, -10.0)], now);

        // Forecast entry excluded → provider bounds stand.
        assert_eq!(snapshot.temp_min, 3);
        assert_eq!(snapshot.temp_max, 6);
    }

    #[test]
    fn hourly_is_capped_ordered_and_formatted_in_local_time() {
        let now = noon_utc();
        // Feed entries in reverse order to prove sorting.
        let forecast: Vec<ForecastEntry> = (0..16)
            .rev()
            .map(|i| entry(now + chrono::Duration::hours(3 * i), 10.0 + i as f64))
            .collect();

        let snapshot = reduce(current(12.0, 10.0, 15.0), forecast, now);

        assert_eq!(snapshot.hourly.len(), HOURLY_CAP);
        // 03:00 UTC = 12:00 KST, then every 3 hours.
        assert_eq!(snapshot.hourly[0].time, "12:00");
        assert_eq!(snapshot.hourly[1].time, "15:00");

        // Temps encode the source index, so ascending temps prove the strip
        // follows ascending source timestamps despite the reversed input.
        let temps: Vec<i32> = snapshot.hourly.iter().map(|p| p.temp).collect();
        assert_eq!(temps, (10..10 + HOURLY_CAP as i32).collect::<Vec<_>>());
    }

    #[test]
    fn temps_and_wind_round_to_whole_numbers() {
        let now = noon_utc();
        let forecast = vec![entry(now + chrono::Duration::hours(1), 12.6)];

        let snapshot = reduce(current(16.4, 10.2, 15.8), forecast, now);

        assert_eq!(snapshot.current_temp, 16);
        assert_eq!(snapshot.wind_speed, 4);
        assert_eq!(snapshot.hourly[0].temp, 13);
    }

    #[derive(Debug)]
    struct StaticProvider {
        fail_forecast: bool,
    }

    #[async_trait]
    impl WeatherProvider for StaticProvider {
        async fn current(&self, _lat: f64, _lon: f64) -> anyhow::Result<CurrentConditions> {
            Ok(current(16.0, 10.0, 15.0))
        }

        async fn forecast(&self, _lat: f64, _lon: f64) -> anyhow::Result<Vec<ForecastEntry>> {
            if self.fail_forecast {
                Err(anyhow!("forecast endpoint unavailable"))
            } else {
                Ok(vec![entry(Utc::now(), 12.0)])
            }
        }
    }

    #[tokio::test]
    async fn zero_zero_is_rejected_before_any_fetch() {
        let aggregator = WeatherAggregator::new(Box::new(StaticProvider { fail_forecast: false }));

        let err = aggregator.fetch(0.0, 0.0).await.unwrap_err();
        assert!(matches!(err, Error::NoLocation));
    }

    #[tokio::test]
    async fn one_failing_read_fails_the_whole_snapshot() {
        let aggregator = WeatherAggregator::new(Box::new(StaticProvider { fail_forecast: true }));

        let err = aggregator.fetch(37.5665, 126.978).await.unwrap_err();
        assert!(matches!(err, Error::Forecast(_)));
    }

    #[tokio::test]
    async fn both_reads_succeeding_produce_a_snapshot() {
        let aggregator = WeatherAggregator::new(Box::new(StaticProvider { fail_forecast: false }));

        let snapshot = aggregator.fetch(37.5665, 126.978).await.unwrap();
        assert_eq!(snapshot.location, "Jongno-gu");
        assert!(snapshot.hourly.len() <= HOURLY_CAP);
    }
}
