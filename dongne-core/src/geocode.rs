//! Geocoder adapter boundary.
//!
//! Wraps the Kakao local address search behind a trait so the resolver can be
//! exercised without the network. A lookup has three outcomes: a match, no
//! match (`Ok(None)`, a normal result), or an adapter error — the resolver
//! treats the latter two the same way and falls back to the gazetteer.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::config::{Config, ServiceId};

const KAKAO_ADDRESS_URL: &str = "https://dapi.kakao.com/v2/local/search/address.json";

/// A single geocoded coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodedPoint {
    pub lat: f64,
    pub lon: f64,
}

#[async_trait]
pub trait GeocodeProvider: Send + Sync + Debug {
    /// Look up a free-text address. `Ok(None)` means the provider found
    /// nothing, which is an expected outcome, not an error.
    async fn lookup(&self, address: &str) -> Result<Option<GeocodedPoint>>;
}

#[derive(Debug, Clone)]
pub struct KakaoGeocoder {
    api_key: String,
    http: Client,
}

impl KakaoGeocoder {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }
}

/// Construct the geocoder from config, if a Kakao key is present.
///
/// Absence is not an error: resolution degrades to the gazetteer fallback.
pub fn geocoder_from_config(config: &Config) -> Option<KakaoGeocoder> {
    config
        .service_api_key(ServiceId::KakaoLocal)
        .map(|key| KakaoGeocoder::new(key.to_owned()))
}

// Kakao returns coordinates as strings: x is longitude, y is latitude.
#[derive(Debug, Deserialize)]
struct KakaoDocument {
    x: String,
    y: String,
}

#[derive(Debug, Deserialize)]
struct KakaoAddressResponse {
    documents: Vec<KakaoDocument>,
}

fn point_from_document(document: &KakaoDocument) -> Result<GeocodedPoint> {
    let lat: f64 = document
        .y
        .parse()
        .with_context(|| format!("Invalid latitude in Kakao document: {}", document.y))?;
    let lon: f64 = document
        .x
        .parse()
        .with_context(|| format!("Invalid longitude in Kakao document: {}", document.x))?;

    Ok(GeocodedPoint { lat, lon })
}

#[async_trait]
impl GeocodeProvider for KakaoGeocoder {
    async fn lookup(&self, address: &str) -> Result<Option<GeocodedPoint>> {
        let res = self
            .http
            .get(KAKAO_ADDRESS_URL)
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .query(&[("query", address)])
            .send()
            .await
            .context("Failed to send request to Kakao address search")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Kakao address search response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Kakao address search failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: KakaoAddressResponse =
            serde_json::from_str(&body).context("Failed to parse Kakao address search JSON")?;

        // First document wins.
        match parsed.documents.first() {
            Some(document) => Ok(Some(point_from_document(document)?)),
            None => Ok(None),
        }
    }
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
