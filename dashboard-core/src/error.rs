//! Error types for the dashboard core.
//!
//! Every failure the widget can run into is caught at the operation that
//! produced it and turned into a notification; these types are what the
//! operations return afterwards so callers can still tell what happened.

use thiserror::Error;

/// Failure talking to the remote weather service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status { endpoint: &'static str, status: u16, body: String },

    #[error("failed to parse {endpoint} response: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} response contained no data")]
    Empty { endpoint: &'static str },
}

/// Failure of the platform geolocation capability.
#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Reverse geocoding failed: {0}")]
    Lookup(#[from] ServiceError),
}

/// Which of the four snapshot retrievals failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPart {
    FiveDay,
    CurrentDay,
    LocationInfo,
    Hourly,
}

impl SnapshotPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotPart::FiveDay => "five-day forecast",
            SnapshotPart::CurrentDay => "current conditions",
            SnapshotPart::LocationInfo => "location info",
            SnapshotPart::Hourly => "hourly forecast",
        }
    }
}

impl std::fmt::Display for SnapshotPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The snapshot could not be assembled; nothing of it may be rendered.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("failed to fetch {part} for location {key}: {source}")]
    Retrieval {
        key: String,
        part: SnapshotPart,
        #[source]
        source: ServiceError,
    },

    #[error("incomplete weather data for location {key}: {reason}")]
    Incomplete { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read location store {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse location store {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write location store {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize location store: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level error of the dashboard operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error("city search failed: {0}")]
    Search(#[source] ServiceError),

    #[error("'{label}' does not match any location from the last search")]
    InvalidLocationSelection { label: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
