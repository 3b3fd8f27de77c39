//! Error types for nearby

use crate::route::RouteStage;
use thiserror::Error;

/// Main error type for nearby operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Locator failed to load: {message}")]
    LocatorLoad {
        message: String,
        cause: Option<String>,
    },

    #[error("Route task failed to load: {message}")]
    RouteLoad {
        message: String,
        cause: Option<String>,
    },

    #[error("Routing failed at stage {stage}: {message}")]
    Route { stage: RouteStage, message: String },

    #[error("Locator has not been configured")]
    NotConfigured,

    #[error("Locator is not loaded")]
    LocatorNotLoaded,

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Geo error: {0}")]
    Geo(String),
}

impl Error {
    /// Underlying cause reported alongside a load failure, if any
    pub fn cause(&self) -> Option<&str> {
        match self {
            Self::LocatorLoad { cause, .. } | Self::RouteLoad { cause, .. } => cause.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for nearby operations
pub type Result<T> = std::result::Result<T, Error>;
