//! Places found by a search
//!
//! This module handles:
//! - The `Place` record built from a geocode result
//! - Compass bearing and distance from the user's location
//! - Category filtering and the per-search result cache

pub mod cache;
pub mod filter;

use crate::constants::attributes;
use crate::error::Result;
use crate::geo::GeocodeResult;
use crate::geometry::{geodesic_distance_azimuth, GeoPoint};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use cache::PlaceCache;
pub use filter::CategoryFilter;

/// One of the 8 compass octants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bearing {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Bearing {
    /// Map an azimuth in degrees (-180..180) to its octant
    ///
    /// Buckets are half-open, `(lower, upper]`, centered on each direction.
    /// South takes both ends of the range. NaN falls in no bucket.
    pub fn from_azimuth(degrees: f64) -> Option<Self> {
        if degrees > -22.5 && degrees <= 22.5 {
            Some(Self::N)
        } else if degrees > 22.5 && degrees <= 67.5 {
            Some(Self::NE)
        } else if degrees > 67.5 && degrees <= 112.5 {
            Some(Self::E)
        } else if degrees > 112.5 && degrees <= 157.5 {
            Some(Self::SE)
        } else if degrees > 157.5 || degrees <= -157.5 {
            Some(Self::S)
        } else if degrees > -157.5 && degrees <= -112.5 {
            Some(Self::SW)
        } else if degrees > -112.5 && degrees <= -67.5 {
            Some(Self::W)
        } else if degrees > -67.5 && degrees <= -22.5 {
            Some(Self::NW)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Bearing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        };
        write!(f, "{}", label)
    }
}

/// A place returned by the locator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,

    /// Category/type reported by the locator (e.g. "Coffee Shop")
    #[serde(rename = "type")]
    pub place_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Distance from the user's location in whole meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u64>,

    /// Compass bearing from the user's location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearing: Option<Bearing>,
}

impl Place {
    /// Create a place with only a name, type and location
    pub fn new(name: impl Into<String>, place_type: impl Into<String>, location: Option<GeoPoint>) -> Self {
        Self {
            name: name.into(),
            place_type: place_type.into(),
            location,
            address: None,
            url: None,
            phone: None,
            distance: None,
            bearing: None,
        }
    }

    /// Build a place from a raw geocode result
    ///
    /// A missing `PlaceName` falls back to the result label. An attribute that
    /// is present but not a string is an error.
    pub fn from_geocode_result(result: &GeocodeResult) -> Result<Self> {
        let name = result
            .string_attribute(attributes::NAME)?
            .unwrap_or_else(|| result.label.clone());
        let place_type = result
            .string_attribute(attributes::TYPE)?
            .unwrap_or_default();

        Ok(Self {
            name,
            place_type,
            location: result.display_location,
            address: result.string_attribute(attributes::ADDRESS)?,
            url: result.string_attribute(attributes::URL)?,
            phone: result.string_attribute(attributes::PHONE)?,
            distance: None,
            bearing: None,
        })
    }

    /// Set distance and bearing relative to `from`
    ///
    /// Leaves both unset when either point is missing.
    pub fn annotate(&mut self, from: Option<&GeoPoint>) {
        let (Some(from), Some(to)) = (from, self.location.as_ref()) else {
            self.distance = None;
            self.bearing = None;
            return;
        };

        let (distance, azimuth) = geodesic_distance_azimuth(from, to);
        self.distance = Some(distance.round() as u64);
        self.bearing = Bearing::from_azimuth(azimuth);
        if self.bearing.is_none() {
            warn!("Can't find bearing for {} ({})", self.name, azimuth);
        }
    }

    /// Distance and bearing as "350 m NE", if known
    pub fn format_distance(&self) -> String {
        match (self.distance, self.bearing) {
            (Some(d), Some(b)) => format!("{} m {}", d, b),
            (Some(d), None) => format!("{} m", d),
            _ => String::new(),
        }
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.place_type)?;
        if let Some(address) = &self.address {
            write!(f, ", {}", address)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_with(attributes: serde_json::Value) -> GeocodeResult {
        GeocodeResult {
            label: "Fallback Label".to_string(),
            score: 100.0,
            attributes: attributes.as_object().cloned().unwrap_or_default(),
            display_location: Some(GeoPoint::wgs84(-117.19, 34.05)),
        }
    }

    #[test]
    fn test_bearing_centers() {
        assert_eq!(Bearing::from_azimuth(0.0), Some(Bearing::N));
        assert_eq!(Bearing::from_azimuth(45.0), Some(Bearing::NE));
        assert_eq!(Bearing::from_azimuth(90.0), Some(Bearing::E));
        assert_eq!(Bearing::from_azimuth(135.0), Some(Bearing::SE));
        assert_eq!(Bearing::from_azimuth(180.0), Some(Bearing::S));
        assert_eq!(Bearing::from_azimuth(-180.0), Some(Bearing::S));
        assert_eq!(Bearing::from_azimuth(-135.0), Some(Bearing::SW));
        assert_eq!(Bearing::from_azimuth(-90.0), Some(Bearing::W));
        assert_eq!(Bearing::from_azimuth(-45.0), Some(Bearing::NW));
    }

    #[test]
    fn test_bearing_breakpoints() {
        // Upper bound is inclusive, so each breakpoint belongs to the bucket below it
        let cases = [
            (22.5, Bearing::N, Bearing::NE),
            (67.5, Bearing::NE, Bearing::E),
            (112.5, Bearing::E, Bearing::SE),
            (157.5, Bearing::SE, Bearing::S),
            (-157.5, Bearing::S, Bearing::SW),
            (-112.5, Bearing::SW, Bearing::W),
            (-67.5, Bearing::W, Bearing::NW),
            (-22.5, Bearing::NW, Bearing::N),
        ];
        for (breakpoint, at, above) in cases {
            assert_eq!(Bearing::from_azimuth(breakpoint), Some(at), "at {}", breakpoint);
            assert_eq!(
                Bearing::from_azimuth(breakpoint + 1e-9),
                Some(above),
                "above {}",
                breakpoint
            );
        }
    }

    #[test]
    fn test_bearing_full_coverage() {
        let mut degrees = -179.9;
        while degrees <= 180.0 {
            assert!(Bearing::from_azimuth(degrees).is_some(), "no bucket for {}", degrees);
            degrees += 0.1;
        }
    }

    #[test]
    fn test_bearing_nan() {
        assert_eq!(Bearing::from_azimuth(f64::NAN), None);
    }

    #[test]
    fn test_bearing_display() {
        assert_eq!(Bearing::NE.to_string(), "NE");
        assert_eq!(Bearing::S.to_string(), "S");
    }

    #[test]
    fn test_annotate_due_north() {
        let mut place = Place::new("North", "Food", Some(GeoPoint::wgs84(0.0, 1.0)));
        place.annotate(Some(&GeoPoint::wgs84(0.0, 0.0)));

        assert_eq!(place.bearing, Some(Bearing::N));
        assert_eq!(place.distance, Some(110_574));
    }

    #[test]
    fn test_annotate_without_location() {
        let mut place = Place::new("Somewhere", "Food", Some(GeoPoint::wgs84(0.0, 1.0)));
        place.annotate(None);
        assert_eq!(place.bearing, None);
        assert_eq!(place.distance, None);

        let mut place = Place::new("Nowhere", "Food", None);
        place.annotate(Some(&GeoPoint::wgs84(0.0, 0.0)));
        assert_eq!(place.bearing, None);
        assert_eq!(place.distance, None);
    }

    #[test]
    fn test_from_geocode_result() {
        let result = result_with(json!({
            "PlaceName": "Blue Bottle",
            "Type": "Coffee Shop",
            "Place_addr": "1 Main St",
            "Phone": "555-0100",
            "URL": "https://example.com",
            "Score": 100
        }));

        let place = Place::from_geocode_result(&result).unwrap();
        assert_eq!(place.name, "Blue Bottle");
        assert_eq!(place.place_type, "Coffee Shop");
        assert_eq!(place.address.as_deref(), Some("1 Main St"));
        assert_eq!(place.phone.as_deref(), Some("555-0100"));
        assert_eq!(place.url.as_deref(), Some("https://example.com"));
        assert_eq!(place.location, result.display_location);
    }

    #[test]
    fn test_from_geocode_result_missing_fields() {
        let result = result_with(json!({ "Phone": null }));
        let place = Place::from_geocode_result(&result).unwrap();

        assert_eq!(place.name, "Fallback Label");
        assert_eq!(place.place_type, "");
        assert!(place.phone.is_none());
        assert!(place.address.is_none());
    }

    #[test]
    fn test_from_geocode_result_wrong_type() {
        let result = result_with(json!({ "PlaceName": "Bar", "Phone": 5550100 }));
        assert!(Place::from_geocode_result(&result).is_err());
    }

    #[test]
    fn test_place_serialization() {
        let mut place = Place::new("Pizza Place", "Pizza", Some(GeoPoint::wgs84(1.0, 2.0)));
        place.distance = Some(42);
        place.bearing = Some(Bearing::SW);

        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["type"], "Pizza");
        assert_eq!(json["bearing"], "SW");
        assert!(json.get("phone").is_none());

        let parsed: Place = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, place);
    }

    #[test]
    fn test_format_distance() {
        let mut place = Place::new("Hotel", "Hotel", None);
        assert_eq!(place.format_distance(), "");
        place.distance = Some(350);
        assert_eq!(place.format_distance(), "350 m");
        place.bearing = Some(Bearing::NE);
        assert_eq!(place.format_distance(), "350 m NE");
    }
}
