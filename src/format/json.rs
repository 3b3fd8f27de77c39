//! JSON output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::place::Place;
use crate::route::RouteResult;

/// JSON formatter - outputs places or routes as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON response"
    }

    fn format(&self, places: &[Place], _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(places)?)
    }

    fn format_route(&self, route: &RouteResult, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(route)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;

    #[test]
    fn test_json_format() {
        let output = JsonFormatter
            .format(&fixtures::places(), &Config::default())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["name"], "Cafe & Bakery");
        assert_eq!(parsed[0]["type"], "Coffee Shop");
        assert_eq!(parsed[0]["bearing"], "NE");
        assert!(parsed[1].get("distance").is_none());
    }

    #[test]
    fn test_json_route() {
        let route = crate::route::memory::sample_result();
        let output = JsonFormatter.format_route(&route, &Config::default()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["units"], "imperial");
        assert_eq!(parsed["routes"][0]["directions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_json_formatter_info() {
        assert_eq!(JsonFormatter.name(), "json");
        assert!(!JsonFormatter.description().is_empty());
    }
}
