//! Output formatters
//!
//! Provides trait-based output formatting for search results and routes.

pub mod gpx;
pub mod json;
pub mod text;
pub mod url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::place::Place;
use crate::route::RouteResult;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format the places of a search
    ///
    /// # Arguments
    /// * `places` - Places in display order
    /// * `config` - Application config (for url providers, etc.)
    fn format(&self, places: &[Place], config: &Config) -> Result<String>;

    /// Format a solved route
    fn format_route(&self, _route: &RouteResult, _config: &Config) -> Result<String> {
        Err(Error::Config(format!(
            "Format {} does not support routes",
            self.name()
        )))
    }
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        "url" => Some(Box::new(url::UrlFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    vec![
        FormatInfo {
            name: "json".to_string(),
            description: "Full JSON response".to_string(),
        },
        FormatInfo {
            name: "text".to_string(),
            description: "Human-readable text".to_string(),
        },
        FormatInfo {
            name: "gpx".to_string(),
            description: "GPX waypoints and route track".to_string(),
        },
        FormatInfo {
            name: "url".to_string(),
            description: "Map URL per place".to_string(),
        },
    ]
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::geometry::GeoPoint;
    use crate::place::{Bearing, Place};

    pub fn places() -> Vec<Place> {
        let mut cafe = Place::new(
            "Cafe & Bakery",
            "Coffee Shop",
            Some(GeoPoint::wgs84(-117.195, 34.057)),
        );
        cafe.address = Some("380 New York St, Redlands".to_string());
        cafe.distance = Some(350);
        cafe.bearing = Some(Bearing::NE);

        let hotel = Place::new("Hotel", "Hotel", None);
        vec![cafe, hotel]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter("json").is_some());
        assert!(get_formatter("text").is_some());
        assert!(get_formatter("gpx").is_some());
        assert!(get_formatter("url").is_some());
        assert!(get_formatter("unknown").is_none());
    }

    #[test]
    fn test_get_formatter_case_insensitive() {
        assert!(get_formatter("JSON").is_some());
        assert!(get_formatter("Text").is_some());
        assert!(get_formatter("GPX").is_some());
    }

    #[test]
    fn test_available_formats() {
        let formats = available_formats();
        assert_eq!(formats.len(), 4);
        for format in &formats {
            assert!(get_formatter(&format.name).is_some());
        }
    }

    #[test]
    fn test_url_rejects_routes() {
        let route = crate::route::memory::sample_result();
        let formatter = get_formatter("url").unwrap();
        assert!(formatter.format_route(&route, &Config::default()).is_err());
    }
}
