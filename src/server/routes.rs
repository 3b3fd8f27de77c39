//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::error::Error;
use crate::format::{available_formats, get_formatter, FormatInfo};
use crate::geo::{GeocodeParameters, LoadStatus, Locator, LocatorInfo};
use crate::geometry::{Envelope, GeoPoint, SpatialReference};
use crate::place::{CategoryFilter, Place};
use crate::route::{RouteResult, RouteTask};
use crate::server::state::AppState;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Create the API router
pub fn create_router<L, R>(state: Arc<AppState<L, R>>) -> Router
where
    L: Locator + 'static,
    R: RouteTask + 'static,
{
    Router::new()
        .route("/api/status", get(status_handler::<L, R>))
        .route("/api/formats", get(formats_handler))
        .route("/api/search", post(search_handler::<L, R>))
        .route("/api/places", get(places_handler::<L, R>))
        .route("/api/places/:name", get(place_detail_handler::<L, R>))
        .route("/api/export", get(export_handler::<L, R>))
        .route("/api/filter", get(filter_handler::<L, R>).put(set_filter_handler::<L, R>))
        .route("/api/location", put(location_handler::<L, R>))
        .route(
            "/api/envelope",
            get(envelope_handler::<L, R>)
                .put(set_envelope_handler::<L, R>)
                .delete(clear_envelope_handler::<L, R>),
        )
        .route("/api/route", post(route_handler::<L, R>))
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn not_found(what: &str) -> Self {
        ApiError {
            error: format!("Not found: {}", what),
            code: "NOT_FOUND".to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "NOT_CONFIGURED" | "LOCATOR_NOT_LOADED" => StatusCode::SERVICE_UNAVAILABLE,
            "LOCATOR_LOAD_ERROR" | "ROUTE_LOAD_ERROR" | "ROUTE_ERROR" | "GEOCODING_ERROR" => {
                StatusCode::BAD_GATEWAY
            }
            "INTERNAL_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::NotConfigured => "NOT_CONFIGURED",
            Error::LocatorNotLoaded => "LOCATOR_NOT_LOADED",
            Error::LocatorLoad { .. } => "LOCATOR_LOAD_ERROR",
            Error::RouteLoad { .. } => "ROUTE_LOAD_ERROR",
            Error::Route { .. } => "ROUTE_ERROR",
            Error::Geocoding(_) | Error::Http(_) => "GEOCODING_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        let error = match err.cause() {
            Some(cause) => format!("{} ({})", err, cause),
            None => err.to_string(),
        };
        ApiError {
            error,
            code: code.to_string(),
        }
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Locator load state, absent before configuration
    pub locator_status: Option<LoadStatus>,
    pub locator_url: Option<String>,
    pub locator: Option<LocatorInfo>,
    /// Places in the result cache
    pub cached_places: usize,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
) -> Json<StatusResponse> {
    let service = &state.service;

    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        locator_status: service.locator_status().await,
        locator_url: service.locator_url().await,
        locator: service.locator_info().await,
        cached_places: service.places_from_repo().await.len(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Formats list response
#[derive(Debug, Serialize, Deserialize)]
pub struct FormatsResponse {
    pub formats: Vec<FormatInfo>,
}

/// List available output formats
///
/// GET /api/formats
async fn formats_handler() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        formats: available_formats(),
    })
}

/// Search request body
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    /// Categories to search in addition to the configured ones
    #[serde(default)]
    pub categories: Vec<String>,
    pub max_results: Option<u32>,
}

/// Search response
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub places: Vec<Place>,
    pub count: usize,
}

/// Search around the current location
///
/// POST /api/search
async fn search_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let service = &state.service;
    let parameters = GeocodeParameters {
        categories: req.categories,
        max_results: req.max_results,
        preferred_search_location: service.current_location().await,
        search_area: service.current_envelope().await,
        ..Default::default()
    };

    let places = service.search(parameters).await?;
    Ok(Json(SearchResponse {
        count: places.len(),
        places,
    }))
}

/// Cached places of the latest search
///
/// GET /api/places
async fn places_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
) -> Json<Vec<Place>> {
    Json(state.service.places_from_repo().await)
}

/// A single cached place
///
/// GET /api/places/:name
async fn place_detail_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
    Path(name): Path<String>,
) -> Result<Json<Place>, ApiError> {
    state
        .service
        .place_detail(&name)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(&name))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// Cached places in an output format
///
/// GET /api/export?format=gpx
async fn export_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let config = &state.config;
    let name = query.format.unwrap_or_else(|| config.output.format.clone());
    let formatter = get_formatter(&name).ok_or_else(|| ApiError {
        error: format!("Unknown format: {}", name),
        code: "INVALID_FORMAT".to_string(),
    })?;

    let places = state.service.places_from_repo().await;
    let body = formatter.format(&places, config)?;

    let content_type = match formatter.name() {
        "json" => "application/json",
        "gpx" => "application/gpx+xml",
        _ => "text/plain; charset=utf-8",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

/// Category filter selection
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterBody {
    pub excluded_types: Vec<String>,
}

/// Current category filter
///
/// GET /api/filter
async fn filter_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
) -> Json<FilterBody> {
    let filter = state.service.filter().await;
    Json(FilterBody {
        excluded_types: filter.selected_types().to_vec(),
    })
}

/// Replace the category filter
///
/// PUT /api/filter
async fn set_filter_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
    Json(req): Json<FilterBody>,
) -> Json<FilterBody> {
    let filter = CategoryFilter::with_types(req.excluded_types);
    let excluded_types = filter.selected_types().to_vec();
    state.service.set_filter(filter).await;
    Json(FilterBody { excluded_types })
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for GeoPoint {
    fn from(p: LatLng) -> Self {
        GeoPoint::wgs84(p.lng, p.lat)
    }
}

/// Set or clear (with `null`) the current location
///
/// PUT /api/location
async fn location_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
    Json(req): Json<Option<LatLng>>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .set_current_location(req.map(GeoPoint::from))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Envelope request body
#[derive(Debug, Deserialize)]
pub struct EnvelopeRequest {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    #[serde(default)]
    pub spatial_reference: SpatialReference,
}

/// Result envelope response
#[derive(Debug, Serialize, Deserialize)]
pub struct EnvelopeResponse {
    pub envelope: Option<Envelope>,
    /// True when derived from cached places rather than set explicitly
    pub derived: bool,
}

/// Area to show results in
///
/// GET /api/envelope
async fn envelope_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
) -> Json<EnvelopeResponse> {
    let service = &state.service;
    let derived = service.current_envelope().await.is_none();
    Json(EnvelopeResponse {
        envelope: service.current_result_envelope().await,
        derived,
    })
}

/// Restrict searches to an envelope
///
/// PUT /api/envelope
async fn set_envelope_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
    Json(req): Json<EnvelopeRequest>,
) -> StatusCode {
    let envelope = Envelope::new(req.xmin, req.ymin, req.xmax, req.ymax, req.spatial_reference);
    state.service.set_current_envelope(envelope).await;
    StatusCode::NO_CONTENT
}

/// Stop restricting searches
///
/// DELETE /api/envelope
async fn clear_envelope_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
) -> StatusCode {
    state.service.clear_current_envelope().await;
    StatusCode::NO_CONTENT
}

/// Route request body; a missing `start` routes from the current location
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub start: Option<LatLng>,
    pub end: LatLng,
}

/// Walking route between two points
///
/// POST /api/route
async fn route_handler<L: Locator, R: RouteTask>(
    State(state): State<Arc<AppState<L, R>>>,
    Json(req): Json<RouteRequest>,
) -> Result<Response, ApiError> {
    let route: Option<RouteResult> = state
        .service
        .route(req.start.map(GeoPoint::from), req.end.into())
        .await?;

    Ok(match route {
        Some(route) => Json(route).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
