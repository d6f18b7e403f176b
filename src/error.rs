//! Error handling types and utilities.

use std::path::PathBuf;

/// Errors raised while validating a search request or compiling it into a query.
///
/// All of these are local and deterministic: retrying the same input yields the
/// same error, so callers should correct the request instead of retrying.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// `wait_time` was not one of the five known buckets.
    #[error(
        "Invalid wait time '{0}': expected one of one_week, two_weeks, three_weeks, month, longer"
    )]
    InvalidWaitTime(String),

    /// `order` was not `relevance` or `distance`.
    #[error("Invalid order '{0}': expected relevance or distance")]
    InvalidOrder(String),

    /// Distance ordering needs an origin to measure from.
    #[error("Ordering by distance requires a location")]
    MissingLocationForDistanceOrder,

    #[error("Invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("Invalid distance {0}: must be at least 1 mile")]
    InvalidDistance(i64),

    #[error("Polygon needs at least 3 points, got {0}")]
    PolygonTooSmall(usize),
}

/// Error returned when a reference data snapshot cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate node id '{0}'")]
    DuplicateId(String),

    #[error("Node '{node}' references missing parent '{parent}'")]
    DanglingParent { node: String, parent: String },

    #[error("Cycle detected through node '{0}'")]
    Cycle(String),

    #[error("Duplicate collection slug '{0}'")]
    DuplicateSlug(String),
}

/// Error returned when the search configuration cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
