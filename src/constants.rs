//! Centralized constants for the nearby crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// WGS84 well-known ID
    pub const WGS84_WKID: u32 = 4326;

    /// Web Mercator well-known ID
    pub const WEB_MERCATOR_WKID: u32 = 3857;

    /// Legacy ESRI id for Web Mercator, still returned by some services
    pub const WEB_MERCATOR_LEGACY_WKID: u32 = 102100;

    /// Semi-major axis of the WGS84 ellipsoid in meters (spherical mercator radius)
    pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

    /// Web Mercator latitude clamp in degrees
    pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;
}

/// External API endpoints
pub mod api {
    /// ArcGIS World Geocoding Service
    pub const ARCGIS_GEOCODE_URL: &str =
        "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer";

    /// ArcGIS World Route Service
    pub const ARCGIS_ROUTE_URL: &str =
        "https://route.arcgis.com/arcgis/rest/services/World/Route/NAServer/Route_World";
}

/// Geocode attribute names read from each result
pub mod attributes {
    pub const ADDRESS: &str = "Place_addr";
    pub const NAME: &str = "PlaceName";
    pub const PHONE: &str = "Phone";
    pub const URL: &str = "URL";
    pub const TYPE: &str = "Type";

    /// Request every attribute the locator has
    pub const ALL_FIELDS: &str = "*";
}

/// Routing settings forced onto every route request
pub mod routing {
    /// Travel mode name for walking
    pub const WALK_MODE_NAME: &str = "Walking Time";
}
