//! Bounded, deduplicated, persisted favorites.
//!
//! The whole collection round-trips through one JSON file: loaded once at
//! startup, written back after every mutation, never on read. A missing,
//! corrupt or unrecognized payload loads as an empty collection — persistence
//! problems are never fatal on the read side.

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::warn;
use uuid::Uuid;

use crate::model::{FavoriteEntry, ResolvedLocation, finest_segment};

pub const MAX_FAVORITES: usize = 6;
/// Alias limit in characters, not bytes — aliases are usually Korean.
pub const MAX_ALIAS_CHARS: usize = 20;

const STORE_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "favorites.json";

/// On-disk envelope. The version field exists so an old or foreign payload
/// can be recognized and dropped instead of half-parsed.
#[derive(Debug, Serialize, Deserialize)]
struct StoredFavorites {
    version: u32,
    favorites: Vec<FavoriteEntry>,
}

/// What a caller submits to `add`; id and creation time are assigned by the
/// store.
#[derive(Debug, Clone)]
pub struct FavoriteCandidate {
    pub full_name: String,
    pub alias: String,
    pub lat: f64,
    pub lon: f64,
}

impl FavoriteCandidate {
    /// Candidate for a resolved location, with the alias defaulted to the
    /// finest place segment.
    pub fn from_location(location: &ResolvedLocation) -> Self {
        Self {
            full_name: location.full_name.clone(),
            alias: finest_segment(&location.full_name).to_string(),
            lat: location.lat,
            lon: location.lon,
        }
    }
}

#[derive(Debug)]
pub struct FavoritesStore {
    entries: Vec<FavoriteEntry>,
    path: PathBuf,
}

impl FavoritesStore {
    /// Load the store from the platform data directory.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(Self::data_file_path()?))
    }

    /// Load from a specific path. Anything unreadable loads as empty.
    pub fn load_from(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(payload) => decode(&payload).unwrap_or_else(|| {
                warn!(path = %path.display(), "unreadable favorites payload, starting empty");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };

        Self { entries, path }
    }

    /// Path to the favorites file.
    pub fn data_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "dongne", "dongne-cli")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join(STORE_FILE_NAME))
    }

    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_favorite(&self, full_name: &str) -> bool {
        self.entries.iter().any(|entry| entry.full_name == full_name)
    }

    pub fn can_add_more(&self) -> bool {
        self.entries.len() < MAX_FAVORITES
    }

    /// Append a new favorite and persist.
    ///
    /// Silently a no-op when the store is full, the place is already pinned,
    /// or the alias exceeds the limit — callers wanting feedback check
    /// `can_add_more`/`is_favorite` first.
    pub fn add(&mut self, candidate: FavoriteCandidate) -> Result<()> {
        if !self.can_add_more() || self.is_favorite(&candidate.full_name) {
            return Ok(());
        }

        let alias = candidate.alias.trim();
        let alias: String = if alias.is_empty() { finest_segment(&candidate.full_name).to_string() } else { alias.to_string() };
        if alias.chars().count() > MAX_ALIAS_CHARS {
            return Ok(());
        }

        self.entries.push(FavoriteEntry {
            id: Uuid::new_v4().to_string(),
            full_name: candidate.full_name,
            alias,
            lat: candidate.lat,
            lon: candidate.lon,
            created_at: Utc::now().timestamp_millis(),
        });

        self.persist()
    }

    /// Remove by id and persist; unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);

        if self.entries.len() == before {
            return Ok(());
        }

        self.persist()
    }

    /// Rename an alias and persist.
    ///
    /// The alias is trimmed first; empty, unchanged, over-limit aliases and
    /// unknown ids are a no-op (reject-on-exceed, no truncation).
    pub fn rename(&mut self, id: &str, alias: &str) -> Result<()> {
        let trimmed = alias.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_ALIAS_CHARS {
            return Ok(());
        }

        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return Ok(());
        };

        if entry.alias == trimmed {
            return Ok(());
        }

        entry.alias = trimmed.to_string();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create favorites directory: {}", parent.display())
            })?;
        }

        let stored = StoredFavorites {
            version: STORE_VERSION,
            favorites: self.entries.clone(),
        };

        let payload =
            serde_json::to_string_pretty(&stored).context("Failed to serialize favorites")?;

        fs::write(&self.path, payload)
            .with_context(|| format!("Failed to write favorites file: {}", self.path.display()))?;

        Ok(())
    }
}

fn decode(payload: &str) -> Option<Vec<FavoriteEntry>> {
    let stored: StoredFavorites = serde_json::from_str(payload).ok()?;
    if stored.version != STORE_VERSION {
        return None;
    }
    Some(stored.favorites)
}
