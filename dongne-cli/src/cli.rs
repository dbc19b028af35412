use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use dongne_core::{
    Config, FavoriteCandidate, FavoritesStore, Gazetteer, LocationResolver, ResolvedLocation,
    SearchSession, ServiceId, WeatherAggregator, WeatherSnapshot, geocoder_from_config,
    model::{SEGMENT_SEPARATOR, display_name},
    weather_provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dongne", version, about = "Neighborhood weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a service ("openweather" or "kakao").
    Configure {
        /// Service short name.
        service: String,
    },

    /// Search districts by name fragment.
    Search {
        /// Any part of a district name, e.g. "종로" or "해운대".
        query: String,
    },

    /// Resolve a district and show its weather.
    Show {
        /// District name fragment or full hierarchical name.
        name: String,
    },

    /// Manage pinned locations.
    #[command(subcommand)]
    Fav(FavCommand),
}

#[derive(Debug, Subcommand)]
pub enum FavCommand {
    /// List pinned locations.
    List,

    /// Pin a district.
    Add {
        /// District name fragment or full hierarchical name.
        name: String,
    },

    /// Unpin by id.
    Remove { id: String },

    /// Rename a pin's alias.
    Rename { id: String, alias: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { service } => configure(&service),
            Command::Search { query } => {
                search(&query);
                Ok(())
            }
            Command::Show { name } => show(&name).await,
            Command::Fav(cmd) => fav(cmd).await,
        }
    }
}

fn configure(service: &str) -> anyhow::Result<()> {
    let id = ServiceId::try_from(service)?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let mut config = Config::load()?;
    config.upsert_service_api_key(id, api_key);
    config.save()?;

    println!("Saved credentials for '{id}'.");
    Ok(())
}

fn search(query: &str) {
    let gazetteer = Gazetteer::global();
    let hits = gazetteer.search(query, 10);

    if hits.is_empty() {
        println!("No districts match '{query}'.");
        return;
    }

    for full_name in hits {
        println!("{}", display_name(full_name));
    }
}

/// Drive one search session end to end: suggestions, selection, resolution.
async fn resolve(name: &str) -> anyhow::Result<Option<ResolvedLocation>> {
    let gazetteer = Gazetteer::global();
    let config = Config::load()?;

    let mut session = SearchSession::new(gazetteer);
    session.set_query(name);

    // A full hierarchical name is selected as-is; a fragment takes the first
    // suggestion, the same pick a user confirms with Enter.
    let full_name = if name.contains(SEGMENT_SEPARATOR) {
        name.to_string()
    } else if let Some(first) = session.suggestions().first() {
        first.clone()
    } else {
        bail!("No district matches '{name}'. Try `dongne search`.");
    };

    let mut resolver = LocationResolver::new(gazetteer);
    if let Some(geocoder) = geocoder_from_config(&config) {
        resolver = resolver.with_geocoder(Box::new(geocoder));
    }

    let ticket = session.select(&full_name);
    let outcome = resolver.resolve(ticket.full_name()).await;
    session.complete(ticket, outcome);

    Ok(session.resolved().cloned())
}

async fn show(name: &str) -> anyhow::Result<()> {
    let Some(location) = resolve(name).await? else {
        bail!("Could not find coordinates for '{name}'.");
    };

    let config = Config::load()?;
    let aggregator = WeatherAggregator::new(weather_provider_from_config(&config)?);

    let snapshot = aggregator
        .fetch(location.lat, location.lon)
        .await
        .context("Weather lookup failed, try again")?;

    print_snapshot(&location, &snapshot);
    Ok(())
}

fn print_snapshot(location: &ResolvedLocation, snapshot: &WeatherSnapshot) {
    println!("{} ({})", location.display_name, snapshot.location);
    println!(
        "  {}°C ({}) · 최저 {}° / 최고 {}°",
        snapshot.current_temp, snapshot.description, snapshot.temp_min, snapshot.temp_max
    );
    println!("  습도 {}% · 바람 {} m/s", snapshot.humidity, snapshot.wind_speed);

    if !snapshot.hourly.is_empty() {
        println!();
        for point in &snapshot.hourly {
            println!("  {}  {:>3}°C  {}", point.time, point.temp, point.description);
        }
    }
}

async fn fav(cmd: FavCommand) -> anyhow::Result<()> {
    let mut store = FavoritesStore::load()?;

    match cmd {
        FavCommand::List => {
            if store.is_empty() {
                println!("No pinned locations yet.");
                return Ok(());
            }

            for entry in store.entries() {
                let pinned_on = DateTime::<Utc>::from_timestamp_millis(entry.created_at)
                    .map(|dt| dt.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {} ({})  [{:.4}, {:.4}]  pinned {}",
                    entry.id,
                    entry.alias,
                    display_name(&entry.full_name),
                    entry.lat,
                    entry.lon,
                    pinned_on,
                );
            }
        }
        FavCommand::Add { name } => {
            let Some(location) = resolve(&name).await? else {
                bail!("Could not find coordinates for '{name}'.");
            };

            // The store rejects silently; surface the reason up front.
            if store.is_favorite(&location.full_name) {
                println!("'{}' is already pinned.", location.display_name);
                return Ok(());
            }
            if !store.can_add_more() {
                bail!("Favorites are full ({} max). Remove one first.", dongne_core::MAX_FAVORITES);
            }

            store.add(FavoriteCandidate::from_location(&location))?;
            println!("Pinned '{}'.", location.display_name);
        }
        FavCommand::Remove { id } => {
            if !store.entries().iter().any(|entry| entry.id == id) {
                bail!("No pinned location with id '{id}'.");
            }
            store.remove(&id)?;
            println!("Unpinned.");
        }
        FavCommand::Rename { id, alias } => {
            if !store.entries().iter().any(|entry| entry.id == id) {
                bail!("No pinned location with id '{id}'.");
            }
            store.rename(&id, &alias)?;
            let current = store
                .entries()
                .iter()
                .find(|entry| entry.id == id)
                .map(|entry| entry.alias.clone())
                .unwrap_or_default();
            println!("Alias is now '{current}'.");
        }
    }

    Ok(())
}
