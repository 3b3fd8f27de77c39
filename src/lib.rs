//! nearby: place search and walking routes
//!
//! A library and CLI tool that finds places of interest around a location,
//! reports how far away and in which direction each one is, and plans walking
//! routes to them.
//!
//! ## Features
//!
//! - Category search through the ArcGIS World Geocoding Service
//! - Geodesic distance and compass bearing from the user's location
//! - Envelope restriction and category filtering of results
//! - Walking routes with turn-by-turn directions
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nearby::geo::GeocodeParameters;
//! use nearby::geometry::GeoPoint;
//! use nearby::{Config, LocationService};
//!
//! # async fn example() -> nearby::Result<()> {
//! let config = Config::default();
//! let service = LocationService::arcgis(&config);
//! service.configure(&config.locator.url).await?;
//! service
//!     .set_current_location(Some(GeoPoint::wgs84(-117.195, 34.057)))
//!     .await?;
//!
//! for place in service.search(GeocodeParameters::default()).await? {
//!     println!("{} {}", place.name, place.format_distance());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod geo;
pub mod geometry;
pub mod place;
pub mod route;
pub mod server;
pub mod service;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geometry::{Envelope, GeoPoint, SpatialReference};
pub use place::{Bearing, Place};
pub use service::LocationService;
