//! Error types shared across the crate.

use thiserror::Error;

/// Invalid geographic input.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GeoError {
    #[error("invalid latitude {0}: must be within -90..=90")]
    InvalidLatitude(f64),
    #[error("invalid longitude {0}: must be within -180..=180")]
    InvalidLongitude(f64),
}

#[derive(Debug, Error)]
pub enum ItemError {
    /// The item is not attached to a map, so there is no projection to
    /// convert geographic input with.
    #[error("item is not attached to a map projection")]
    NoProjection,
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid initial view: {0}")]
    InvalidView(#[from] GeoError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed session file: {0}")]
    Parse(#[from] serde_json::Error),
}
