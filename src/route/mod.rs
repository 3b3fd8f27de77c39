//! Walking routes
//!
//! A route request goes through a fresh `RouteTask`: load it, fetch its
//! default parameters, force walking with imperial directions, then solve.
//! Each request is tracked through a `RouteStage` so failures say where they
//! happened.

pub mod arcgis;
pub mod memory;

use crate::constants::routing::WALK_MODE_NAME;
use crate::error::{Error, Result};
use crate::geometry::{GeoPoint, SpatialReference};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Where a route request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStage {
    Created,
    ParametersLoading,
    ParametersReady,
    Solving,
    Solved,
    Failed,
}

impl std::fmt::Display for RouteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::ParametersLoading => write!(f, "parameters_loading"),
            Self::ParametersReady => write!(f, "parameters_ready"),
            Self::Solving => write!(f, "solving"),
            Self::Solved => write!(f, "solved"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Kind of travel a mode describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelModeType {
    Walk,
    Automobile,
    Truck,
    #[serde(other)]
    Other,
}

/// A travel mode as published by the routing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelMode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub mode_type: TravelModeType,
    /// Remaining service attributes, sent back untouched when solving
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Default for TravelMode {
    fn default() -> Self {
        Self {
            id: None,
            name: "Driving Time".to_string(),
            mode_type: TravelModeType::Automobile,
            attributes: serde_json::Map::new(),
        }
    }
}

/// Distance units for turn-by-turn directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

/// A location the route must visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Stop {
    pub fn new(location: GeoPoint) -> Self {
        Self {
            location,
            name: None,
        }
    }
}

/// Parameters for a solve request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteParameters {
    pub travel_mode: TravelMode,
    pub stops: Vec<Stop>,
    pub return_directions: bool,
    pub directions_distance_units: UnitSystem,
    pub output_spatial_reference: SpatialReference,
}

impl Default for RouteParameters {
    fn default() -> Self {
        Self {
            travel_mode: TravelMode::default(),
            stops: Vec::new(),
            return_directions: false,
            directions_distance_units: UnitSystem::Metric,
            output_spatial_reference: SpatialReference::Wgs84,
        }
    }
}

impl RouteParameters {
    /// Configure a walking route from `start` to `end`
    ///
    /// Keeps the service's travel mode attributes but forces the walking type
    /// and name. Stops are appended in order.
    pub fn for_walking(mut self, start: GeoPoint, end: GeoPoint) -> Self {
        self.travel_mode.mode_type = TravelModeType::Walk;
        self.travel_mode.name = WALK_MODE_NAME.to_string();
        self.stops.push(Stop::new(start));
        self.stops.push(Stop::new(end));
        self.return_directions = true;
        self.directions_distance_units = UnitSystem::Imperial;
        self.output_spatial_reference = SpatialReference::WebMercator;
        self
    }
}

/// One turn-by-turn instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionManeuver {
    pub text: String,
    /// Length in the requested directions units
    pub length: f64,
    pub time_minutes: f64,
}

/// A solved route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    /// Length in the requested directions units
    pub total_length: f64,
    pub total_time_minutes: f64,
    #[serde(default)]
    pub path: Vec<GeoPoint>,
    #[serde(default)]
    pub directions: Vec<DirectionManeuver>,
}

/// Result of a solve request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub routes: Vec<Route>,
    pub units: UnitSystem,
}

/// Trait for routing backends
///
/// A task is created per route request and used once.
pub trait RouteTask: Send + Sync {
    /// Connect to the routing service
    fn load(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Default parameters published by the service
    fn create_default_parameters(
        &self,
    ) -> impl std::future::Future<Output = Result<RouteParameters>> + Send;

    /// Solve; `None` when the service found no route
    fn solve_route(
        &self,
        parameters: &RouteParameters,
    ) -> impl std::future::Future<Output = Result<Option<RouteResult>>> + Send;
}

/// Tag an error with the stage it happened in
fn at_stage(stage: RouteStage, err: Error) -> Error {
    match err {
        Error::Route { .. } => err,
        other => Error::Route {
            stage,
            message: other.to_string(),
        },
    }
}

/// Run a walking route request through `task`
///
/// Returns `Ok(None)` when the service solved without producing a route.
pub async fn solve_walking_route<R: RouteTask>(
    task: &R,
    start: GeoPoint,
    end: GeoPoint,
) -> Result<Option<RouteResult>> {
    let mut stage = RouteStage::Created;
    debug!(%stage, "Route task created");

    if let Err(e) = task.load().await {
        let e = match e {
            Error::RouteLoad { .. } => e,
            other => Error::RouteLoad {
                message: other.to_string(),
                cause: None,
            },
        };
        error!(cause = ?e.cause(), "{}", e);
        return Err(e);
    }

    stage = RouteStage::ParametersLoading;
    debug!(%stage, "Fetching default route parameters");
    let defaults = match task.create_default_parameters().await {
        Ok(params) => params,
        Err(e) => {
            let e = at_stage(stage, e);
            error!(stage = %RouteStage::Failed, "{}", e);
            return Err(e);
        }
    };

    stage = RouteStage::ParametersReady;
    let parameters = defaults.for_walking(start, end);
    debug!(%stage, mode = %parameters.travel_mode.name, "Route parameters ready");

    stage = RouteStage::Solving;
    debug!(%stage, "Solving route");
    match task.solve_route(&parameters).await {
        Ok(Some(result)) => {
            debug!(stage = %RouteStage::Solved, routes = result.routes.len(), "Route solved");
            Ok(Some(result))
        }
        Ok(None) => {
            info!("No result from routing");
            Ok(None)
        }
        Err(e) => {
            let e = at_stage(stage, e);
            error!(stage = %RouteStage::Failed, "{}", e);
            Err(e)
        }
    }
}
