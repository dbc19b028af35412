use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::model::{CurrentConditions, ForecastEntry};

use super::WeatherProvider;

const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

/// Deterministic icon URL for a provider icon code. Display only.
pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }

    async fn fetch_json(&self, url: &str, lat: f64, lon: f64, what: &str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .query(&[("lat", lat), ("lon", lon)])
            .query(&[
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "kr"),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    timezone: i32,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastItem>,
}

fn leading_condition(weather: Vec<OwWeather>) -> (String, String) {
    weather
        .into_iter()
        .next()
        .map(|w| (w.description, w.icon))
        .unwrap_or_else(|| ("알 수 없음".to_string(), String::new()))
}

fn current_from(parsed: OwCurrentResponse) -> CurrentConditions {
    let (description, icon) = leading_condition(parsed.weather);

    CurrentConditions {
        station_name: parsed.name,
        temp: parsed.main.temp,
        temp_min: parsed.main.temp_min,
        temp_max: parsed.main.temp_max,
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        description,
        icon,
        utc_offset_secs: parsed.timezone,
    }
}

fn entries_from(parsed: OwForecastResponse) -> Vec<ForecastEntry> {
    parsed
        .list
        .into_iter()
        .filter_map(|item| {
            let timestamp = unix_to_utc(item.dt)?;
            let (description, icon) = leading_condition(item.weather);
            Some(ForecastEntry { timestamp, temp: item.main.temp, description, icon })
        })
        .collect()
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, lat: f64, lon: f64) -> Result<CurrentConditions> {
        let body = self.fetch_json(CURRENT_URL, lat, lon, "current weather").await?;

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        Ok(current_from(parsed))
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<Vec<ForecastEntry>> {
        let body = self.fetch_json(FORECAST_URL, lat, lon, "5-day forecast").await?;

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather forecast JSON")?;

        Ok(entries_from(parsed))
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let cut: String = body.chars().take(MAX).collect();
        format!("{cut}...")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_from_maps_the_fields_the_aggregator_needs() {
        let body = r#"{
            "name": "Jongno-gu",
            "timezone": 32400,
            "main": { "temp": 16.4, "temp_min": 10.2, "temp_max": 15.8, "humidity": 62 },
            "weather": [ { "description": "맑음", "icon": "01d" } ],
            "wind": { "speed": 3.6 }
        }"#;

        let parsed: OwCurrentResponse = serde_json::from_str(body).unwrap();
        let current = current_from(parsed);

        assert_eq!(current.station_name, "Jongno-gu");
        assert_eq!(current.utc_offset_secs, 32400);
        assert_eq!(current.description, "맑음");
        assert_eq!(current.icon, "01d");
        assert_eq!(current.humidity, 62);
        assert!((current.temp - 16.4).abs() < 1e-9);
    }

    #[test]
    fn current_from_tolerates_an_empty_weather_array() {
        let body = r#"{
            "name": "Jongno-gu",
            "timezone": 32400,
            "main": { "temp": 1.0, "temp_min": 0.0, "temp_max": 2.0, "humidity": 50 },
            "weather": [],
            "wind": { "speed": 1.0 }
        }"#;

        let parsed: OwCurrentResponse = serde_json::from_str(body).unwrap();
        let current = current_from(parsed);

        assert_eq!(current.description, "알 수 없음");
        assert!(current.icon.is_empty());
    }

    #[test]
    fn entries_from_keeps_provider_order() {
        let body = r#"{
            "list": [
                { "dt": 1700000000, "main": { "temp": 12.3 }, "weather": [ { "description": "구름조금", "icon": "02d" } ] },
                { "dt": 1700010800, "main": { "temp": 13.9 }, "weather": [ { "description": "맑음", "icon": "01d" } ] }
            ]
        }"#;

        let parsed: OwForecastResponse = serde_json::from_str(body).unwrap();
        let entries = entries_from(parsed);

        assert_eq!(entries.len(), 2);
        assert!(entries[0].timestamp < entries[1].timestamp);
        assert_eq!(entries[1].icon, "01d");
    }

    #[test]
    fn icon_url_is_keyed_by_the_provider_code() {
        assert_eq!(icon_url("10n"), "https://openweathermap.org/img/wn/10n@2x.png");
    }
}
