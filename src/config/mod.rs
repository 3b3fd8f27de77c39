//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/nearby/config.toml

pub mod defaults;

use crate::constants::api::{ARCGIS_GEOCODE_URL, ARCGIS_ROUTE_URL};
use crate::error::{Error, Result};
use crate::geometry::GeoPoint;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Geocoding service settings
    #[serde(default)]
    pub locator: LocatorConfig,

    /// Routing service settings
    #[serde(default)]
    pub route: RouteConfig,

    /// Search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Category filter settings
    #[serde(default)]
    pub filter: FilterConfig,

    /// Location settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// URL generation settings
    #[serde(default)]
    pub url: UrlConfig,

    /// API keys for various services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Locator service URL
    #[serde(default = "default_locator_url")]
    pub url: String,
}

/// Routing service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Route layer URL
    #[serde(default = "default_route_url")]
    pub url: String,
}

/// Search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Categories appended to every search
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Maximum results per search
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Buffer around cached places for the result envelope, in degrees
    #[serde(default = "default_envelope_buffer")]
    pub envelope_buffer: f64,
}

/// Category filter settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Place types removed from results
    #[serde(default)]
    pub excluded_types: Vec<String>,
}

/// Location settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude used when no location is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    /// Longitude used when no location is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// ArcGIS location services API key
    #[serde(default)]
    pub arcgis: String,
}

// Default value functions for serde
fn default_locator_url() -> String {
    ARCGIS_GEOCODE_URL.to_string()
}
fn default_route_url() -> String {
    ARCGIS_ROUTE_URL.to_string()
}
fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}
fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}
fn default_envelope_buffer() -> f64 {
    DEFAULT_ENVELOPE_BUFFER
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/search/?api=1&query={lat},{lng}".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lng}#map=18/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?q={name}&ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            url: default_locator_url(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            url: default_route_url(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            max_results: default_max_results(),
            envelope_buffer: default_envelope_buffer(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl LocationConfig {
    /// Configured location, when both coordinates are set
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::wgs84(lng, lat)),
            _ => None,
        }
    }
}

/// Split a comma-separated list, dropping blanks
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

/// Parse an optional coordinate; an empty value unsets it
fn parse_coordinate(value: &str) -> Result<Option<f64>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| Error::Config(format!("Invalid coordinate value: {}", value)))
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key". Lists are joined with commas.
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["locator", "url"] => Some(self.locator.url.clone()),
            ["route", "url"] => Some(self.route.url.clone()),

            ["search", "categories"] => Some(self.search.categories.join(",")),
            ["search", "max_results"] => Some(self.search.max_results.to_string()),
            ["search", "envelope_buffer"] => Some(self.search.envelope_buffer.to_string()),

            ["filter", "excluded_types"] => Some(self.filter.excluded_types.join(",")),

            ["location", "lat"] => Some(self.location.lat.map(|v| v.to_string()).unwrap_or_default()),
            ["location", "lng"] => Some(self.location.lng.map(|v| v.to_string()).unwrap_or_default()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["output", "format"] => Some(self.output.format.clone()),

            ["url", "default"] => Some(self.url.default.clone()),

            ["api_keys", "arcgis"] => Some(self.api_keys.arcgis.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["locator", "url"] => {
                self.locator.url = value.to_string();
            }
            ["route", "url"] => {
                self.route.url = value.to_string();
            }

            ["search", "categories"] => {
                self.search.categories = parse_list(value);
            }
            ["search", "max_results"] => {
                self.search.max_results = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid max_results value: {}", value))
                })?;
            }
            ["search", "envelope_buffer"] => {
                let buffer: f64 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid envelope_buffer value: {}", value))
                })?;
                if !buffer.is_finite() || buffer < 0.0 {
                    return Err(Error::Config(format!(
                        "envelope_buffer must be a non-negative number: {}",
                        value
                    )));
                }
                self.search.envelope_buffer = buffer;
            }

            ["filter", "excluded_types"] => {
                self.filter.excluded_types = parse_list(value);
            }

            ["location", "lat"] => {
                self.location.lat = parse_coordinate(value)?;
            }
            ["location", "lng"] => {
                self.location.lng = parse_coordinate(value)?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["output", "format"] => {
                self.output.format = value.to_string();
            }

            ["url", "default"] => {
                self.url.default = value.to_string();
            }

            ["api_keys", "arcgis"] => {
                self.api_keys.arcgis = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "locator.url",
            "route.url",
            "search.categories",
            "search.max_results",
            "search.envelope_buffer",
            "filter.excluded_types",
            "location.lat",
            "location.lng",
            "server.host",
            "server.port",
            "output.format",
            "url.default",
            "api_keys.arcgis",
        ]
    }

    /// Format a URL using the specified provider
    ///
    /// Replaces {lat}, {lng} and {name} placeholders. The name is URL-encoded
    /// and empty when not given.
    pub fn format_url(
        &self,
        provider: Option<&str>,
        lat: f64,
        lng: f64,
        name: Option<&str>,
    ) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string())
            .replace("{name}", &urlencoding::encode(name.unwrap_or_default())))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn with_temp_config<F: FnOnce()>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(
            config.search.categories,
            vec!["Food", "Hotel", "Pizza", "Coffee Shop", "Bar or Pub"]
        );
        assert_eq!(config.search.envelope_buffer, 0.0007);
        assert!(config.filter.excluded_types.is_empty());
        assert!(config.location.point().is_none());
        assert_eq!(config.server.port, 7879);
        assert!(config.locator.url.starts_with("https://"));
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("output.format"), Some("text".to_string()));

        config.set("output.format", "json").unwrap();
        assert_eq!(config.get("output.format"), Some("json".to_string()));

        config.set("search.max_results", "20").unwrap();
        assert_eq!(config.search.max_results, 20);
    }

    #[test]
    fn test_set_lists() {
        let mut config = Config::default();

        config.set("filter.excluded_types", "Bar or Pub, Hotel,").unwrap();
        assert_eq!(config.filter.excluded_types, vec!["Bar or Pub", "Hotel"]);
        assert_eq!(config.get("filter.excluded_types"), Some("Bar or Pub,Hotel".to_string()));

        config.set("search.categories", "Museum").unwrap();
        assert_eq!(config.search.categories, vec!["Museum"]);
    }

    #[test]
    fn test_set_location() {
        let mut config = Config::default();

        config.set("location.lat", "34.057").unwrap();
        assert!(config.location.point().is_none());

        config.set("location.lng", "-117.195").unwrap();
        let point = config.location.point().unwrap();
        assert_eq!(point.x, -117.195);
        assert_eq!(point.y, 34.057);

        config.set("location.lat", "").unwrap();
        assert!(config.location.lat.is_none());
        assert_eq!(config.get("location.lat"), Some(String::new()));
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        let result = config.set("invalid.key", "value");
        assert!(result.is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("search.max_results", "many").is_err());
        assert!(config.set("search.envelope_buffer", "-1").is_err());
        assert!(config.set("location.lat", "north").is_err());
    }

    #[test]
    fn test_format_url() {
        let config = Config::default();

        let url = config
            .format_url(Some("openstreetmap"), 34.057, -117.195, None)
            .unwrap();
        assert_eq!(
            url,
            "https://www.openstreetmap.org/?mlat=34.057&mlon=-117.195#map=18/34.057/-117.195"
        );

        let url = config
            .format_url(Some("apple"), 34.057, -117.195, Some("Joe's Pizza"))
            .unwrap();
        assert_eq!(url, "https://maps.apple.com/?q=Joe%27s%20Pizza&ll=34.057,-117.195");
    }

    #[test]
    fn test_format_url_default_provider() {
        let config = Config::default();
        let url = config.format_url(None, 34.057, -117.195, None).unwrap();
        assert!(url.contains("google.com"));
    }

    #[test]
    fn test_format_url_unknown_provider() {
        let config = Config::default();
        let result = config.format_url(Some("unknown"), 34.057, -117.195, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.filter.excluded_types = vec!["Hotel".to_string()];
            config.location.lat = Some(34.057);
            config.save().unwrap();

            let loaded = Config::load().unwrap();
            assert_eq!(loaded.filter.excluded_types, vec!["Hotel"]);
            assert_eq!(loaded.location.lat, Some(34.057));
            assert!(loaded.location.lng.is_none());
        });
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[search]\nmax_results = 5\n").unwrap();
        assert_eq!(loaded.search.max_results, 5);
        assert_eq!(loaded.search.categories.len(), 5);
        assert_eq!(loaded.server.port, 7879);
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[locator]"));
        assert!(toml.contains("[search]"));
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[url.providers]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7879");
    }

    #[test]
    fn test_available_keys() {
        let keys = Config::available_keys();
        for key in &keys {
            assert!(Config::default().get(key).is_some(), "{} has no getter", key);
        }
        assert!(keys.contains(&"filter.excluded_types"));
    }
}
