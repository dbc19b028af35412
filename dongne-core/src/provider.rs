use crate::{
    config::{Config, ServiceId},
    model::{CurrentConditions, ForecastEntry},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Read-only weather data source for one coordinate pair.
///
/// The two reads are separate so the aggregator can issue them concurrently;
/// both must succeed for a snapshot to exist.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, lat: f64, lon: f64) -> anyhow::Result<CurrentConditions>;

    /// The 5-day/3-hour forecast list, in provider order.
    async fn forecast(&self, lat: f64, lon: f64) -> anyhow::Result<Vec<ForecastEntry>>;
}

/// Construct the weather provider from config.
pub fn weather_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.service_api_key(ServiceId::OpenWeather).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for service 'openweather'.\n\
                 Hint: run `dongne configure openweather` and enter your API key."
        )
    })?;

    Ok(Box::new(OpenWeatherProvider::new(api_key.to_owned())))
}
