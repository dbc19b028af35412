//! Core library for the `dongne` weather app.
//!
//! This crate defines:
//! - The embedded district gazetteer and its search/lookup queries
//! - Location resolution (search session state, geocoder-with-fallback)
//! - Weather aggregation into one display-ready snapshot
//! - The bounded, persisted favorites store
//! - Configuration & credentials handling
//!
//! It is used by `dongne-cli`, but can also be reused by other binaries or
//! services.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod favorites;
pub mod gazetteer;
pub mod geocode;
pub mod model;
pub mod provider;
pub mod resolver;

pub use aggregate::{HOURLY_CAP, WeatherAggregator};
pub use config::{Config, ServiceConfig, ServiceId};
pub use error::Error;
pub use favorites::{FavoriteCandidate, FavoritesStore, MAX_ALIAS_CHARS, MAX_FAVORITES};
pub use gazetteer::Gazetteer;
pub use geocode::{GeocodeProvider, GeocodedPoint, KakaoGeocoder, geocoder_from_config};
pub use model::{
    Coordinates, CurrentConditions, FavoriteEntry, ForecastEntry, HourlyPoint, ResolvedLocation,
    WeatherSnapshot,
};
pub use provider::{WeatherProvider, weather_provider_from_config};
pub use resolver::{LocationResolver, ResolutionTicket, SearchPhase, SearchSession};
