//! ArcGIS geocoding backend
//!
//! Talks to an ArcGIS GeocodeServer (by default the World Geocoding Service)
//! over its REST API. Place search uses `findAddressCandidates` with an empty
//! query and a category list.

use crate::constants::api::ARCGIS_GEOCODE_URL;
use crate::error::{Error, Result};
use crate::geo::{GeocodeParameters, GeocodeResult, Locator, LocatorInfo};
use crate::geometry::{GeoPoint, SpatialReference};
use serde::Deserialize;

const USER_AGENT: &str = concat!("nearby/", env!("CARGO_PKG_VERSION"));

/// ArcGIS locator backend
#[derive(Debug, Clone)]
pub struct ArcGisLocator {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

/// Error object ArcGIS embeds in a 200 response
#[derive(Debug, Deserialize)]
pub(crate) struct ServiceError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl ServiceError {
    /// Message prefixed with the error code, when there is one
    pub(crate) fn describe(&self) -> String {
        match self.code {
            Some(code) => format!("{} (code {})", self.message, code),
            None => self.message.clone(),
        }
    }

    /// Details joined into a single cause string
    pub(crate) fn cause(&self) -> Option<String> {
        if self.details.is_empty() {
            None
        } else {
            Some(self.details.join("; "))
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSpatialReference {
    pub wkid: Option<u32>,
    #[serde(rename = "latestWkid")]
    pub latest_wkid: Option<u32>,
}

impl WireSpatialReference {
    pub(crate) fn resolve(&self) -> Option<SpatialReference> {
        self.latest_wkid
            .and_then(SpatialReference::from_wkid)
            .or_else(|| self.wkid.and_then(SpatialReference::from_wkid))
    }

    /// Reference of returned geometry
    ///
    /// An absent reference means WGS84. A reference we cannot project from
    /// is an error, never a silent WGS84.
    pub(crate) fn for_geometry(
        wire: Option<&Self>,
    ) -> std::result::Result<SpatialReference, String> {
        let Some(wire) = wire else {
            return Ok(SpatialReference::default());
        };
        wire.resolve().ok_or_else(|| match wire.latest_wkid.or(wire.wkid) {
            Some(wkid) => format!("Unsupported spatial reference (wkid {})", wkid),
            None => "Spatial reference without a wkid".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CategoryNode {
    name: String,
}

/// GeocodeServer description (`GET {url}?f=json`)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceInfo {
    #[serde(default)]
    service_description: String,
    #[serde(default)]
    capabilities: String,
    #[serde(default)]
    categories: Vec<CategoryNode>,
    spatial_reference: Option<WireSpatialReference>,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct WirePoint {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    address: String,
    location: Option<WirePoint>,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

/// `findAddressCandidates` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatesResponse {
    spatial_reference: Option<WireSpatialReference>,
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ServiceError>,
}

impl ArcGisLocator {
    /// Create a locator for the GeocodeServer at `url`
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach an API key; an empty key is ignored
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the `findAddressCandidates` query string
    fn candidate_query(&self, query: &str, parameters: &GeocodeParameters) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("f", "json".to_string()),
            ("SingleLine", query.to_string()),
            ("outFields", parameters.result_attribute_names.join(",")),
        ];

        if !parameters.categories.is_empty() {
            params.push(("category", parameters.categories.join(",")));
        }
        if let Some(max) = parameters.max_results {
            params.push(("maxLocations", max.to_string()));
        }
        if let Some(point) = &parameters.preferred_search_location {
            let p = point.project(SpatialReference::Wgs84);
            params.push(("location", format!("{},{}", p.x, p.y)));
        }
        if let Some(area) = &parameters.search_area {
            let e = area.project(SpatialReference::Wgs84);
            params.push((
                "searchExtent",
                format!("{},{},{},{}", e.xmin, e.ymin, e.xmax, e.ymax),
            ));
        }
        if let Some(sr) = parameters.output_spatial_reference {
            params.push(("outSR", sr.wkid().to_string()));
        }
        if let Some(token) = &self.token {
            params.push(("token", token.clone()));
        }

        params
    }

    fn parse_service_info(info: ServiceInfo) -> Result<LocatorInfo> {
        if let Some(err) = info.error {
            return Err(Error::LocatorLoad {
                cause: err.cause(),
                message: err.message,
            });
        }

        Ok(LocatorInfo {
            description: info.service_description,
            capabilities: info
                .capabilities
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect(),
            categories: info.categories.into_iter().map(|c| c.name).collect(),
            spatial_reference: info.spatial_reference.and_then(|sr| sr.resolve()),
        })
    }

    fn parse_candidates(response: CandidatesResponse) -> Result<Vec<GeocodeResult>> {
        if let Some(err) = response.error {
            return Err(Error::Geocoding(match err.cause() {
                Some(cause) => format!("{}: {}", err.describe(), cause),
                None => err.describe(),
            }));
        }

        let spatial_reference =
            WireSpatialReference::for_geometry(response.spatial_reference.as_ref())
                .map_err(Error::Geocoding)?;

        Ok(response
            .candidates
            .into_iter()
            .map(|c| {
                // DisplayX/DisplayY is where the place is drawn; location is the routing point
                let display = match (
                    c.attributes.get("DisplayX").and_then(|v| v.as_f64()),
                    c.attributes.get("DisplayY").and_then(|v| v.as_f64()),
                ) {
                    (Some(x), Some(y)) => Some(GeoPoint::new(x, y, spatial_reference)),
                    _ => c
                        .location
                        .map(|p| GeoPoint::new(p.x, p.y, spatial_reference)),
                };

                GeocodeResult {
                    label: c.address,
                    score: c.score,
                    attributes: c.attributes,
                    display_location: display,
                }
            })
            .collect())
    }
}

impl Default for ArcGisLocator {
    fn default() -> Self {
        Self::new(ARCGIS_GEOCODE_URL)
    }
}

impl Locator for ArcGisLocator {
    async fn load(&self) -> Result<LocatorInfo> {
        let mut query = vec![("f", "json".to_string())];
        if let Some(token) = &self.token {
            query.push(("token", token.clone()));
        }

        let response = self
            .client
            .get(&self.url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::LocatorLoad {
                message: format!("Request to {} failed", self.url),
                cause: Some(e.to_string()),
            })?;

        if !response.status().is_success() {
            return Err(Error::LocatorLoad {
                message: format!("Locator returned status: {}", response.status()),
                cause: None,
            });
        }

        let info: ServiceInfo = response.json().await.map_err(|e| Error::LocatorLoad {
            message: "Failed to parse locator description".to_string(),
            cause: Some(e.to_string()),
        })?;

        Self::parse_service_info(info)
    }

    async fn geocode(&self, query: &str, parameters: &GeocodeParameters) -> Result<Vec<GeocodeResult>> {
        let url = format!("{}/findAddressCandidates", self.url);

        let response = self
            .client
            .get(&url)
            .query(&self.candidate_query(query, parameters))
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Geocode request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Locator returned status: {}",
                response.status()
            )));
        }

        let body: CandidatesResponse = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse geocode response: {}", e)))?;

        Self::parse_candidates(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Envelope;
    use serde_json::json;

    fn lookup<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_candidate_query() {
        let locator = ArcGisLocator::default().with_token("secret");
        let params = GeocodeParameters {
            categories: vec!["Food".to_string(), "Coffee Shop".to_string()],
            result_attribute_names: vec!["*".to_string()],
            max_results: Some(20),
            preferred_search_location: Some(GeoPoint::wgs84(-117.19, 34.05)),
            search_area: Some(Envelope::new(-118.0, 34.0, -117.0, 35.0, SpatialReference::Wgs84)),
            output_spatial_reference: Some(SpatialReference::Wgs84),
        };

        let query = locator.candidate_query("", &params);
        assert_eq!(lookup(&query, "SingleLine"), Some(""));
        assert_eq!(lookup(&query, "outFields"), Some("*"));
        assert_eq!(lookup(&query, "category"), Some("Food,Coffee Shop"));
        assert_eq!(lookup(&query, "maxLocations"), Some("20"));
        assert_eq!(lookup(&query, "location"), Some("-117.19,34.05"));
        assert_eq!(lookup(&query, "searchExtent"), Some("-118,34,-117,35"));
        assert_eq!(lookup(&query, "outSR"), Some("4326"));
        assert_eq!(lookup(&query, "token"), Some("secret"));
    }

    #[test]
    fn test_candidate_query_minimal() {
        let locator = ArcGisLocator::new("https://example.com/GeocodeServer/").with_token("");
        let query = locator.candidate_query("coffee", &GeocodeParameters::default());

        assert_eq!(locator.url(), "https://example.com/GeocodeServer");
        assert_eq!(lookup(&query, "SingleLine"), Some("coffee"));
        assert!(lookup(&query, "category").is_none());
        assert!(lookup(&query, "token").is_none());
    }

    #[test]
    fn test_parse_service_info() {
        let info: ServiceInfo = serde_json::from_value(json!({
            "serviceDescription": "World Geocoder",
            "capabilities": "Geocode,ReverseGeocode, Suggest",
            "categories": [{ "name": "Address" }, { "name": "POI" }],
            "spatialReference": { "wkid": 4326, "latestWkid": 4326 }
        }))
        .unwrap();

        let info = ArcGisLocator::parse_service_info(info).unwrap();
        assert_eq!(info.description, "World Geocoder");
        assert_eq!(info.capabilities, vec!["Geocode", "ReverseGeocode", "Suggest"]);
        assert_eq!(info.categories, vec!["Address", "POI"]);
        assert_eq!(info.spatial_reference, Some(SpatialReference::Wgs84));
    }

    #[test]
    fn test_parse_service_info_error() {
        let info: ServiceInfo = serde_json::from_value(json!({
            "error": { "code": 498, "message": "Invalid token.", "details": ["Token expired"] }
        }))
        .unwrap();

        match ArcGisLocator::parse_service_info(info) {
            Err(Error::LocatorLoad { message, cause }) => {
                assert_eq!(message, "Invalid token.");
                assert_eq!(cause.as_deref(), Some("Token expired"));
            }
            other => panic!("expected load error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_candidates_prefers_display_point() {
        let response: CandidatesResponse = serde_json::from_value(json!({
            "spatialReference": { "wkid": 102100, "latestWkid": 3857 },
            "candidates": [
                {
                    "address": "Blue Bottle",
                    "location": { "x": 1.0, "y": 2.0 },
                    "score": 100,
                    "attributes": { "PlaceName": "Blue Bottle", "DisplayX": 3.0, "DisplayY": 4.0 }
                },
                {
                    "address": "No Display",
                    "location": { "x": 5.0, "y": 6.0 },
                    "score": 80.5,
                    "attributes": {}
                }
            ]
        }))
        .unwrap();

        let results = ArcGisLocator::parse_candidates(response).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].display_location,
            Some(GeoPoint::new(3.0, 4.0, SpatialReference::WebMercator))
        );
        assert_eq!(
            results[1].display_location,
            Some(GeoPoint::new(5.0, 6.0, SpatialReference::WebMercator))
        );
        assert_eq!(results[1].score, 80.5);
    }

    #[test]
    fn test_parse_candidates_unsupported_reference() {
        let response: CandidatesResponse = serde_json::from_value(json!({
            "spatialReference": { "wkid": 2193 },
            "candidates": [{ "address": "Cuba St", "location": { "x": 1757000.0, "y": 5920000.0 }, "score": 100 }]
        }))
        .unwrap();

        let err = ArcGisLocator::parse_candidates(response).unwrap_err();
        assert!(matches!(err, Error::Geocoding(_)));
        assert!(err.to_string().contains("2193"));
    }

    #[test]
    fn test_parse_candidates_without_reference_is_wgs84() {
        let response: CandidatesResponse = serde_json::from_value(json!({
            "candidates": [{ "address": "Cuba St", "location": { "x": 174.77, "y": -41.29 }, "score": 100 }]
        }))
        .unwrap();

        let results = ArcGisLocator::parse_candidates(response).unwrap();
        assert_eq!(results[0].display_location, Some(GeoPoint::wgs84(174.77, -41.29)));
    }

    #[test]
    fn test_parse_candidates_error() {
        let response: CandidatesResponse = serde_json::from_value(json!({
            "error": { "code": 400, "message": "Unable to complete operation.", "details": [] }
        }))
        .unwrap();

        assert!(ArcGisLocator::parse_candidates(response).is_err());
    }
}
