//! Geometry primitives
//!
//! Points and envelopes tagged with a spatial reference, reprojection between
//! WGS84 and Web Mercator, and the handful of spatial operations the service
//! needs: containment, geodesic distance/azimuth and buffered extents.
//! The heavy lifting is done by the `geo` crate; everything here is expressed
//! in WGS84 before it is handed over.

use crate::constants::geo::{
    WEB_MERCATOR_LEGACY_WKID, WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_WKID, WGS84_SEMI_MAJOR_AXIS,
    WGS84_WKID,
};
use crate::error::{Error, Result};
use geo::{BoundingRect, Contains, Coord, GeodesicBearing, MultiPoint, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Coordinate system used to interpret point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialReference {
    /// Geographic longitude/latitude in degrees
    #[default]
    Wgs84,
    /// Spherical Web Mercator in meters
    WebMercator,
}

impl SpatialReference {
    /// Well-known ID of this reference
    pub fn wkid(&self) -> u32 {
        match self {
            Self::Wgs84 => WGS84_WKID,
            Self::WebMercator => WEB_MERCATOR_WKID,
        }
    }

    /// Look up a reference by well-known ID
    pub fn from_wkid(wkid: u32) -> Option<Self> {
        match wkid {
            WGS84_WKID => Some(Self::Wgs84),
            WEB_MERCATOR_WKID | WEB_MERCATOR_LEGACY_WKID => Some(Self::WebMercator),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wgs84 => write!(f, "wgs84"),
            Self::WebMercator => write!(f, "web_mercator"),
        }
    }
}

impl std::str::FromStr for SpatialReference {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wgs84" | "4326" => Ok(Self::Wgs84),
            "web_mercator" | "web-mercator" | "webmercator" | "3857" | "102100" => {
                Ok(Self::WebMercator)
            }
            _ => Err(format!("Unknown spatial reference: {}", s)),
        }
    }
}

/// A point with its spatial reference
///
/// In WGS84, `x` is longitude and `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub spatial_reference: SpatialReference,
}

impl GeoPoint {
    pub fn new(x: f64, y: f64, spatial_reference: SpatialReference) -> Self {
        Self {
            x,
            y,
            spatial_reference,
        }
    }

    /// Create a WGS84 point from longitude and latitude
    pub fn wgs84(lng: f64, lat: f64) -> Self {
        Self::new(lng, lat, SpatialReference::Wgs84)
    }

    /// Validate that a WGS84 point is within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if self.spatial_reference != SpatialReference::Wgs84 {
            return Ok(());
        }
        if self.y < -90.0 || self.y > 90.0 {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.y
            )));
        }
        if self.x < -180.0 || self.x > 180.0 {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.x
            )));
        }
        Ok(())
    }

    /// Reproject into another spatial reference
    pub fn project(&self, to: SpatialReference) -> GeoPoint {
        match (self.spatial_reference, to) {
            (SpatialReference::Wgs84, SpatialReference::WebMercator) => {
                let (x, y) = wgs84_to_web_mercator(self.x, self.y);
                GeoPoint::new(x, y, to)
            }
            (SpatialReference::WebMercator, SpatialReference::Wgs84) => {
                let (x, y) = web_mercator_to_wgs84(self.x, self.y);
                GeoPoint::new(x, y, to)
            }
            _ => *self,
        }
    }

    /// WGS84 `geo` point for the geodesic and containment algorithms
    fn to_geo(self) -> geo::Point<f64> {
        let p = self.project(SpatialReference::Wgs84);
        geo::Point::new(p.x, p.y)
    }
}

impl std::str::FromStr for GeoPoint {
    type Err = String;

    /// Parse "lat,lng" into a WGS84 point
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [lat, lng] = parts.as_slice() else {
            return Err(format!("Expected \"lat,lng\", got: {}", s));
        };
        let lat: f64 = lat.parse().map_err(|_| format!("Invalid latitude: {}", lat))?;
        let lng: f64 = lng.parse().map_err(|_| format!("Invalid longitude: {}", lng))?;
        Ok(GeoPoint::wgs84(lng, lat))
    }
}

/// Axis-aligned bounding rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    #[serde(default)]
    pub spatial_reference: SpatialReference,
}

impl Envelope {
    /// Create an envelope; corners are normalized so min <= max
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, spatial_reference: SpatialReference) -> Self {
        Self {
            xmin: x1.min(x2),
            ymin: y1.min(y2),
            xmax: x1.max(x2),
            ymax: y1.max(y2),
            spatial_reference,
        }
    }

    /// Reproject into another spatial reference
    pub fn project(&self, to: SpatialReference) -> Envelope {
        if self.spatial_reference == to {
            return *self;
        }
        let min = GeoPoint::new(self.xmin, self.ymin, self.spatial_reference).project(to);
        let max = GeoPoint::new(self.xmax, self.ymax, self.spatial_reference).project(to);
        Envelope::new(min.x, min.y, max.x, max.y, to)
    }

    /// Whether the point lies strictly inside the envelope
    ///
    /// Both geometries are compared in WGS84.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.to_rect().contains(&point.to_geo())
    }

    fn to_rect(self) -> Rect<f64> {
        let e = self.project(SpatialReference::Wgs84);
        Rect::new(
            Coord { x: e.xmin, y: e.ymin },
            Coord { x: e.xmax, y: e.ymax },
        )
    }
}

impl std::str::FromStr for Envelope {
    type Err = String;

    /// Parse "xmin,ymin,xmax,ymax" in WGS84 degrees
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid envelope value: {}", v))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let [xmin, ymin, xmax, ymax] = values.as_slice() else {
            return Err(format!("Expected \"xmin,ymin,xmax,ymax\", got: {}", s));
        };
        Ok(Envelope::new(*xmin, *ymin, *xmax, *ymax, SpatialReference::Wgs84))
    }
}

/// Geodesic distance in meters and initial azimuth in degrees (-180..180)
///
/// Computed on the WGS84 ellipsoid.
pub fn geodesic_distance_azimuth(from: &GeoPoint, to: &GeoPoint) -> (f64, f64) {
    let (azimuth, distance) = from.to_geo().geodesic_bearing_distance(to.to_geo());
    (distance, azimuth)
}

/// Bounding extent of a set of points, grown by `tolerance` degrees on every side
///
/// Buffering every point by a radius and taking the extent of the union is the
/// same as growing the extent of the points by that radius.
/// Returns `None` for an empty set.
pub fn buffered_extent(points: &[GeoPoint], tolerance: f64) -> Option<Envelope> {
    let multi_point: MultiPoint<f64> = points.iter().map(|p| p.to_geo()).collect();
    let rect = multi_point.bounding_rect()?;

    Some(Envelope::new(
        rect.min().x - tolerance,
        rect.min().y - tolerance,
        rect.max().x + tolerance,
        rect.max().y + tolerance,
        SpatialReference::Wgs84,
    ))
}

fn wgs84_to_web_mercator(lng: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT);
    let x = WGS84_SEMI_MAJOR_AXIS * lng.to_radians();
    let y = WGS84_SEMI_MAJOR_AXIS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

fn web_mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lng = (x / WGS84_SEMI_MAJOR_AXIS).to_degrees();
    let lat = (2.0 * (y / WGS84_SEMI_MAJOR_AXIS).exp().atan() - PI / 2.0).to_degrees();
    (lng, lat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spatial_reference_wkid() {
        assert_eq!(SpatialReference::Wgs84.wkid(), 4326);
        assert_eq!(SpatialReference::from_wkid(102100), Some(SpatialReference::WebMercator));
        assert_eq!(SpatialReference::from_wkid(2193), None);
    }

    #[test]
    fn test_project_known_point() {
        // 180 degrees of longitude is half the equator
        let p = GeoPoint::wgs84(180.0, 0.0).project(SpatialReference::WebMercator);
        assert_relative_eq!(p.x, 20_037_508.342_789_244, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);

        let back = p.project(SpatialReference::Wgs84);
        assert_relative_eq!(back.x, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_same_reference_is_identity() {
        let p = GeoPoint::wgs84(-74.006, 40.7128);
        assert_eq!(p.project(SpatialReference::Wgs84), p);
    }

    #[test]
    fn test_validate() {
        assert!(GeoPoint::wgs84(-74.006, 40.7128).validate().is_ok());
        assert!(GeoPoint::wgs84(0.0, 91.0).validate().is_err());
        assert!(GeoPoint::wgs84(181.0, 0.0).validate().is_err());
        // Mercator meters are never range checked
        assert!(GeoPoint::new(5_000_000.0, 0.0, SpatialReference::WebMercator)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_envelope_contains() {
        let envelope = Envelope::new(-1.0, -1.0, 1.0, 1.0, SpatialReference::Wgs84);
        assert!(envelope.contains(&GeoPoint::wgs84(0.5, 0.5)));
        assert!(!envelope.contains(&GeoPoint::wgs84(2.0, 0.0)));
    }

    #[test]
    fn test_envelope_contains_across_references() {
        let envelope = Envelope::new(-1.0, -1.0, 1.0, 1.0, SpatialReference::Wgs84)
            .project(SpatialReference::WebMercator);
        let inside = GeoPoint::wgs84(0.25, -0.25).project(SpatialReference::WebMercator);
        let outside = GeoPoint::wgs84(0.25, 1.5);

        assert!(envelope.contains(&inside));
        assert!(!envelope.contains(&outside));
    }

    #[test]
    fn test_envelope_normalizes_corners() {
        let envelope = Envelope::new(1.0, 2.0, -1.0, -2.0, SpatialReference::Wgs84);
        assert_eq!(envelope.xmin, -1.0);
        assert_eq!(envelope.ymax, 2.0);
        assert_eq!(envelope.xmax, 1.0);
        assert_eq!(envelope.ymin, -2.0);
    }

    #[test]
    fn test_parse_envelope() {
        let envelope: Envelope = "-74.1, 40.7, -73.9, 40.8".parse().unwrap();
        assert_eq!(envelope.xmin, -74.1);
        assert_eq!(envelope.ymax, 40.8);
        assert!("1,2,3".parse::<Envelope>().is_err());
        assert!("a,b,c,d".parse::<Envelope>().is_err());
    }

    #[test]
    fn test_parse_point() {
        let point: GeoPoint = "40.7128,-74.0060".parse().unwrap();
        assert_eq!(point.y, 40.7128);
        assert_eq!(point.x, -74.0060);
        assert!("40.7".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn test_geodesic_due_north() {
        let (distance, azimuth) =
            geodesic_distance_azimuth(&GeoPoint::wgs84(0.0, 0.0), &GeoPoint::wgs84(0.0, 1.0));
        // One degree of latitude at the equator on WGS84
        assert_relative_eq!(distance, 110_574.389, epsilon = 0.01);
        assert_relative_eq!(azimuth, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_geodesic_due_west() {
        let (_, azimuth) =
            geodesic_distance_azimuth(&GeoPoint::wgs84(0.0, 0.0), &GeoPoint::wgs84(-1.0, 0.0));
        assert_relative_eq!(azimuth, -90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_buffered_extent() {
        let points = vec![GeoPoint::wgs84(1.0, 2.0), GeoPoint::wgs84(3.0, 4.0)];
        let extent = buffered_extent(&points, 0.5).unwrap();

        assert_eq!(extent.spatial_reference, SpatialReference::Wgs84);
        assert_relative_eq!(extent.xmin, 0.5);
        assert_relative_eq!(extent.ymin, 1.5);
        assert_relative_eq!(extent.xmax, 3.5);
        assert_relative_eq!(extent.ymax, 4.5);
    }

    #[test]
    fn test_buffered_extent_empty() {
        assert!(buffered_extent(&[], 0.0007).is_none());
    }
}
