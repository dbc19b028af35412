//! Location resolution: search-as-you-type session state plus the
//! geocoder-then-gazetteer resolution protocol.
//!
//! One resolution may be in flight per session. Every query edit or new
//! selection bumps a monotonically increasing generation token; an in-flight
//! resolution completing against a stale token is discarded, so the last
//! request wins regardless of network arrival order.

use tracing::{debug, warn};

use crate::gazetteer::Gazetteer;
use crate::geocode::GeocodeProvider;
use crate::model::{Coordinates, ResolvedLocation, display_name};

/// Suggestions shown while typing.
pub const SUGGESTION_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Empty query, nothing selected.
    Idle,
    /// Query text present, suggestions live, nothing selected.
    Typing,
    /// A suggestion was chosen, resolution in flight.
    Resolving,
    /// Coordinates available.
    Resolved,
}

/// Handle for one in-flight resolution. Completing it against the session
/// only applies if the session has not moved on since.
#[derive(Debug)]
pub struct ResolutionTicket {
    full_name: String,
    generation: u64,
}

impl ResolutionTicket {
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

/// Per-search session state machine:
/// `Idle → Typing → Resolving → Resolved`, back to `Idle`/`Typing` on clear
/// or query edit.
#[derive(Debug)]
pub struct SearchSession<'g> {
    gazetteer: &'g Gazetteer,
    query: String,
    suggestions: Vec<String>,
    phase: SearchPhase,
    resolved: Option<ResolvedLocation>,
    generation: u64,
}

impl<'g> SearchSession<'g> {
    pub fn new(gazetteer: &'g Gazetteer) -> Self {
        Self {
            gazetteer,
            query: String::new(),
            suggestions: Vec::new(),
            phase: SearchPhase::Idle,
            resolved: None,
            generation: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn resolved(&self) -> Option<&ResolvedLocation> {
        self.resolved.as_ref()
    }

    /// Replace the query text. Any previously resolved location is dropped
    /// immediately — a stale pin must never be shown beside an edited query —
    /// and suggestions are recomputed.
    pub fn set_query(&mut self, text: &str) {
        self.generation += 1;
        self.resolved = None;
        self.query = text.to_string();

        if text.trim().is_empty() {
            self.phase = SearchPhase::Idle;
            self.suggestions.clear();
        } else {
            self.phase = SearchPhase::Typing;
            self.suggestions = self
                .gazetteer
                .search(text, SUGGESTION_LIMIT)
                .into_iter()
                .map(str::to_string)
                .collect();
        }
    }

    /// Choose a suggestion. The query becomes the human-readable place name,
    /// suggestions close, and the returned ticket supersedes any resolution
    /// still in flight.
    pub fn select(&mut self, full_name: &str) -> ResolutionTicket {
        self.generation += 1;
        self.resolved = None;
        self.query = display_name(full_name);
        self.suggestions.clear();
        self.phase = SearchPhase::Resolving;

        ResolutionTicket {
            full_name: full_name.to_string(),
            generation: self.generation,
        }
    }

    /// Apply a resolution outcome, unless the session has moved on since the
    /// ticket was issued.
    ///
    /// `None` means both the geocoder and the gazetteer came up empty: the
    /// chosen name stays in the query, but there is no pin.
    pub fn complete(&mut self, ticket: ResolutionTicket, outcome: Option<Coordinates>) {
        if ticket.generation != self.generation {
            debug!(
                full_name = %ticket.full_name,
                "discarding superseded resolution outcome"
            );
            return;
        }

        match outcome {
            Some(coordinates) => {
                self.resolved = Some(ResolvedLocation {
                    display_name: display_name(&ticket.full_name),
                    full_name: ticket.full_name,
                    lat: coordinates.lat,
                    lon: coordinates.lon,
                });
                self.phase = SearchPhase::Resolved;
            }
            None => {
                self.phase = SearchPhase::Typing;
            }
        }
    }

    /// Back to `Idle`: query, suggestions and selection all discarded.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.query.clear();
        self.suggestions.clear();
        self.resolved = None;
        self.phase = SearchPhase::Idle;
    }
}

/// Resolution protocol: geocoder first, gazetteer city coordinates second.
///
/// The geocoder call always runs to completion (match, no-match or failure)
/// before the fallback is consulted; there is no speculative parallelism.
/// Geocoder failures are logged and swallowed — resolution degrades, it never
/// raises.
#[derive(Debug)]
pub struct LocationResolver<'g> {
    gazetteer: &'g Gazetteer,
    geocoder: Option<Box<dyn GeocodeProvider>>,
}

impl<'g> LocationResolver<'g> {
    pub fn new(gazetteer: &'g Gazetteer) -> Self {
        Self { gazetteer, geocoder: None }
    }

    pub fn with_geocoder(mut self, geocoder: Box<dyn GeocodeProvider>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub async fn resolve(&self, full_name: &str) -> Option<Coordinates> {
        if let Some(geocoder) = &self.geocoder {
            let address = display_name(full_name);
            match geocoder.lookup(&address).await {
                Ok(Some(point)) => {
                    debug!(%address, lat = point.lat, lon = point.lon, "geocoder match");
                    return Some(Coordinates { lat: point.lat, lon: point.lon });
                }
                Ok(None) => {
                    debug!(%address, "geocoder had no match, falling back to gazetteer");
                }
                Err(err) => {
                    warn!(%address, error = %err, "geocoder lookup failed, falling back to gazetteer");
                }
            }
        }

        self.gazetteer.city_coordinates(full_name)
    }
}
