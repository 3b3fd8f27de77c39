//! URL output formatter

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::OutputFormatter;
use crate::geometry::SpatialReference;
use crate::place::Place;

/// URL formatter - outputs one map URL per place
pub struct UrlFormatter;

impl UrlFormatter {
    /// Format URLs with optional provider override
    pub fn format_with_provider(
        &self,
        places: &[Place],
        config: &Config,
        provider: Option<&str>,
    ) -> Result<String> {
        let mut output = String::new();
        for place in places {
            let Some(location) = place.location else {
                continue;
            };
            let point = location.project(SpatialReference::Wgs84);
            output.push_str(&config.format_url(provider, point.y, point.x, Some(&place.name))?);
            output.push('\n');
        }

        if output.is_empty() {
            return Err(Error::Config("No place with a location to link to".to_string()));
        }
        Ok(output)
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map URL per place"
    }

    fn format(&self, places: &[Place], config: &Config) -> Result<String> {
        self.format_with_provider(places, config, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;

    #[test]
    fn test_url_format_default_provider() {
        let output = UrlFormatter
            .format(&fixtures::places(), &Config::default())
            .unwrap();

        assert!(output.contains("google.com/maps"));
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_url_format_with_provider() {
        let output = UrlFormatter
            .format_with_provider(&fixtures::places(), &Config::default(), Some("apple"))
            .unwrap();

        assert_eq!(
            output,
            "https://maps.apple.com/?q=Cafe%20%26%20Bakery&ll=34.057,-117.195\n"
        );
    }

    #[test]
    fn test_url_format_without_locations() {
        let places = vec![Place::new("Nowhere", "Food", None)];
        assert!(UrlFormatter.format(&places, &Config::default()).is_err());
    }

    #[test]
    fn test_url_formatter_info() {
        assert_eq!(UrlFormatter.name(), "url");
        assert!(!UrlFormatter.description().is_empty());
    }
}
