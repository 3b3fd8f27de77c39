//! ArcGIS routing backend
//!
//! Talks to an NAServer route layer (by default the World Route service).
//! Loading reads the layer description, which carries the travel modes and
//! default units the default parameters are built from.

use crate::constants::api::ARCGIS_ROUTE_URL;
use crate::error::{Error, Result};
use crate::geo::arcgis::{ServiceError, WireSpatialReference};
use crate::geometry::{GeoPoint, SpatialReference};
use crate::route::{
    DirectionManeuver, Route, RouteParameters, RouteResult, RouteTask, TravelMode, UnitSystem,
};
use serde::Deserialize;
use std::sync::OnceLock;

const USER_AGENT: &str = concat!("nearby/", env!("CARGO_PKG_VERSION"));

/// ArcGIS route task
#[derive(Debug)]
pub struct ArcGisRouteTask {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    service: OnceLock<RouteServiceInfo>,
}

/// Route layer description (`GET {url}?f=json`)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteServiceInfo {
    #[serde(default)]
    supported_travel_modes: Vec<TravelMode>,
    #[serde(default)]
    default_travel_mode: Option<String>,
    #[serde(default)]
    directions_length_units: Option<String>,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct Paths {
    #[serde(default)]
    paths: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Deserialize)]
struct RouteFeature {
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
    geometry: Option<Paths>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteFeatures {
    spatial_reference: Option<WireSpatialReference>,
    #[serde(default)]
    features: Vec<RouteFeature>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectionsSummary {
    #[serde(default)]
    total_length: f64,
    #[serde(default)]
    total_time: f64,
}

#[derive(Debug, Deserialize)]
struct ManeuverAttributes {
    #[serde(default)]
    text: String,
    #[serde(default)]
    length: f64,
    #[serde(default)]
    time: f64,
}

#[derive(Debug, Deserialize)]
struct ManeuverFeature {
    attributes: ManeuverAttributes,
}

#[derive(Debug, Deserialize)]
struct Directions {
    summary: Option<DirectionsSummary>,
    #[serde(default)]
    features: Vec<ManeuverFeature>,
}

/// `solve` response
#[derive(Debug, Deserialize)]
struct SolveResponse {
    routes: Option<RouteFeatures>,
    #[serde(default)]
    directions: Vec<Directions>,
    error: Option<ServiceError>,
}

/// NAServer name for a unit system
fn length_units(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Imperial => "esriNAUMiles",
        UnitSystem::Metric => "esriNAUKilometers",
    }
}

fn unit_system(esri_units: &str) -> UnitSystem {
    match esri_units {
        "esriNAUMiles" | "esriNAUFeet" | "esriNAUYards" | "esriNAUNauticalMiles" => {
            UnitSystem::Imperial
        }
        _ => UnitSystem::Metric,
    }
}

impl ArcGisRouteTask {
    /// Create a route task for the NAServer layer at `url`
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            token: None,
            service: OnceLock::new(),
        }
    }

    /// Attach an API key; an empty key is ignored
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
        self
    }

    fn default_parameters(info: &RouteServiceInfo) -> RouteParameters {
        let travel_mode = info
            .default_travel_mode
            .as_ref()
            .and_then(|id| {
                info.supported_travel_modes
                    .iter()
                    .find(|m| m.id.as_deref() == Some(id.as_str()))
            })
            .or_else(|| info.supported_travel_modes.first())
            .cloned()
            .unwrap_or_default();

        RouteParameters {
            travel_mode,
            directions_distance_units: info
                .directions_length_units
                .as_deref()
                .map(unit_system)
                .unwrap_or(UnitSystem::Metric),
            ..RouteParameters::default()
        }
    }

    fn solve_form(&self, parameters: &RouteParameters) -> Result<Vec<(&'static str, String)>> {
        let stops = parameters
            .stops
            .iter()
            .map(|s| {
                let p = s.location.project(SpatialReference::Wgs84);
                format!("{},{}", p.x, p.y)
            })
            .collect::<Vec<_>>()
            .join(";");

        let mut form = vec![
            ("f", "json".to_string()),
            ("stops", stops),
            ("travelMode", serde_json::to_string(&parameters.travel_mode)?),
            ("returnDirections", parameters.return_directions.to_string()),
            ("returnRoutes", "true".to_string()),
            (
                "directionsLengthUnits",
                length_units(parameters.directions_distance_units).to_string(),
            ),
            ("outSR", parameters.output_spatial_reference.wkid().to_string()),
        ];
        if let Some(token) = &self.token {
            form.push(("token", token.clone()));
        }
        Ok(form)
    }

    fn parse_solve(response: SolveResponse, units: UnitSystem) -> Result<Option<RouteResult>> {
        if let Some(err) = response.error {
            return Err(Error::Geo(match err.cause() {
                Some(cause) => format!("{}: {}", err.describe(), cause),
                None => err.describe(),
            }));
        }

        let Some(routes) = response.routes else {
            return Ok(None);
        };
        if routes.features.is_empty() {
            return Ok(None);
        }

        let spatial_reference =
            WireSpatialReference::for_geometry(routes.spatial_reference.as_ref())
                .map_err(Error::Geo)?;
        let mut directions = response.directions.into_iter();

        let routes = routes
            .features
            .into_iter()
            .map(|feature| {
                let attr = |key: &str| feature.attributes.get(key).and_then(|v| v.as_f64());
                let name = feature
                    .attributes
                    .get("Name")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();

                let path = feature
                    .geometry
                    .map(|g| {
                        g.paths
                            .into_iter()
                            .flatten()
                            .map(|[x, y]| GeoPoint::new(x, y, spatial_reference))
                            .collect()
                    })
                    .unwrap_or_default();

                // Directions come back in route order
                let route_directions = directions.next();
                let summary = route_directions.as_ref().and_then(|d| d.summary.as_ref());
                let fallback_length = match units {
                    UnitSystem::Imperial => attr("Total_Miles"),
                    UnitSystem::Metric => attr("Total_Kilometers"),
                };

                Route {
                    name,
                    total_length: summary
                        .map(|s| s.total_length)
                        .or(fallback_length)
                        .unwrap_or_default(),
                    total_time_minutes: summary
                        .map(|s| s.total_time)
                        .or_else(|| attr("Total_TravelTime"))
                        .unwrap_or_default(),
                    path,
                    directions: route_directions
                        .map(|d| {
                            d.features
                                .into_iter()
                                .map(|f| DirectionManeuver {
                                    text: f.attributes.text,
                                    length: f.attributes.length,
                                    time_minutes: f.attributes.time,
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                }
            })
            .collect();

        Ok(Some(RouteResult { routes, units }))
    }
}

impl Default for ArcGisRouteTask {
    fn default() -> Self {
        Self::new(ARCGIS_ROUTE_URL)
    }
}

impl RouteTask for ArcGisRouteTask {
    async fn load(&self) -> Result<()> {
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
            .map_err(|e| Error::RouteLoad {
                message: format!("Request to {} failed", self.url),
                cause: Some(e.to_string()),
            })?;

        if !response.status().is_success() {
            return Err(Error::RouteLoad {
                message: format!("Route service returned status: {}", response.status()),
                cause: None,
            });
        }

        let info: RouteServiceInfo = response.json().await.map_err(|e| Error::RouteLoad {
            message: "Failed to parse route service description".to_string(),
            cause: Some(e.to_string()),
        })?;

        if let Some(err) = &info.error {
            return Err(Error::RouteLoad {
                message: err.describe(),
                cause: err.cause(),
            });
        }

        // A task is loaded once; a second load keeps the first description
        let _ = self.service.set(info);
        Ok(())
    }

    async fn create_default_parameters(&self) -> Result<RouteParameters> {
        let info = self
            .service
            .get()
            .ok_or_else(|| Error::Geo("Route task is not loaded".to_string()))?;
        Ok(Self::default_parameters(info))
    }

    async fn solve_route(&self, parameters: &RouteParameters) -> Result<Option<RouteResult>> {
        let url = format!("{}/solve", self.url);
        let form = self.solve_form(parameters)?;

        let response = self.client.post(&url).form(&form).send().await?;

        if !response.status().is_success() {
            return Err(Error::Geo(format!(
                "Route service returned status: {}",
                response.status()
            )));
        }

        let body: SolveResponse = response.json().await?;
        Self::parse_solve(body, parameters.directions_distance_units)
    }
}
