use thiserror::Error;

/// Failure taxonomy for the aggregation pipeline.
///
/// Adapter-level problems (transport, bad payloads) arrive as `anyhow` sources;
/// this enum only distinguishes the outcomes callers react to differently.
#[derive(Debug, Error)]
pub enum Error {
    /// The `(0, 0)` coordinate pair is the "no location" sentinel and must
    /// never reach the network.
    #[error("weather lookup requires a resolved location")]
    NoLocation,

    /// Current-conditions fetch failed; the whole snapshot is abandoned.
    #[error("current conditions fetch failed: {0}")]
    Current(#[source] anyhow::Error),

    /// Forecast fetch failed; the whole snapshot is abandoned.
    #[error("forecast fetch failed: {0}")]
    Forecast(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
