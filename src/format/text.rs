//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::place::Place;
use crate::route::{RouteResult, UnitSystem};

/// Text formatter - outputs a human-readable listing
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, places: &[Place], _config: &Config) -> Result<String> {
        if places.is_empty() {
            return Ok("No places found\n".to_string());
        }

        let mut output = format!("{} places:\n", places.len());
        for place in places {
            output.push_str(&format!("  {} [{}]", place.name, place.place_type));
            let distance = place.format_distance();
            if !distance.is_empty() {
                output.push_str(&format!("  {}", distance));
            }
            output.push('\n');

            if let Some(address) = &place.address {
                output.push_str(&format!("    {}\n", address));
            }
            if let Some(phone) = &place.phone {
                output.push_str(&format!("    {}\n", phone));
            }
            if let Some(url) = &place.url {
                output.push_str(&format!("    {}\n", url));
            }
        }

        Ok(output)
    }

    fn format_route(&self, route: &RouteResult, _config: &Config) -> Result<String> {
        let units = match route.units {
            UnitSystem::Imperial => "mi",
            UnitSystem::Metric => "km",
        };

        let mut output = String::new();
        for r in &route.routes {
            output.push_str(&format!(
                "{}: {:.2} {}, {:.1} min\n",
                r.name, r.total_length, units, r.total_time_minutes
            ));
            for (i, step) in r.directions.iter().enumerate() {
                output.push_str(&format!("  {}. {}", i + 1, step.text));
                if step.length > 0.0 {
                    output.push_str(&format!(" ({:.2} {})", step.length, units));
                }
                output.push('\n');
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;

    #[test]
    fn test_text_format() {
        let output = TextFormatter
            .format(&fixtures::places(), &Config::default())
            .unwrap();

        assert!(output.starts_with("2 places:"));
        assert!(output.contains("Cafe & Bakery [Coffee Shop]  350 m NE"));
        assert!(output.contains("380 New York St"));
        assert!(output.contains("  Hotel [Hotel]\n"));
    }

    #[test]
    fn test_text_format_empty() {
        let output = TextFormatter.format(&[], &Config::default()).unwrap();
        assert_eq!(output, "No places found\n");
    }

    #[test]
    fn test_text_route() {
        let route = crate::route::memory::sample_result();
        let output = TextFormatter.format_route(&route, &Config::default()).unwrap();

        assert!(output.contains("Location 1 - Location 2: 0.60 mi, 12.5 min"));
        assert!(output.contains("  1. Start at Location 1\n"));
        assert!(output.contains("  2. Go east on Redlands Blvd (0.60 mi)"));
    }
}
