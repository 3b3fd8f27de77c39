//! Location service
//!
//! Owns the locator handle, the user's location and envelope, the category
//! filter and the cache of the latest search. Searches and routes run against
//! backends built by the factories the service was created with, so the same
//! flow drives the ArcGIS services and the in-memory ones used in tests.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::arcgis::ArcGisLocator;
use crate::geo::{GeocodeParameters, GeocodeResult, LoadStatus, Locator, LocatorInfo};
use crate::geometry::{buffered_extent, Envelope, GeoPoint, SpatialReference};
use crate::place::{CategoryFilter, Place, PlaceCache};
use crate::route::arcgis::ArcGisRouteTask;
use crate::route::{solve_walking_route, RouteResult, RouteTask};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Builds a backend for a service URL
pub type Factory<T> = Box<dyn Fn(&str) -> T + Send + Sync>;

/// Tunables the service reads on every request
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    /// Categories appended to every search
    pub categories: Vec<String>,
    /// Used when a search does not set its own limit
    pub max_results: Option<u32>,
    /// Buffer around cached places for the result envelope, in degrees
    pub envelope_buffer: f64,
    pub route_url: String,
    /// Place types filtered out from the start
    pub excluded_types: Vec<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            categories: config.search.categories.clone(),
            max_results: Some(config.search.max_results),
            envelope_buffer: config.search.envelope_buffer,
            route_url: config.route.url.clone(),
            excluded_types: config.filter.excluded_types.clone(),
        }
    }
}

/// Outcome of `configure`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureOutcome {
    /// The locator was created and loaded
    Ready,
    /// A locator already existed; nothing was done
    AlreadyConfigured,
}

/// Receives the places of a successful search
pub trait PlacesCallback: Send {
    fn on_loaded(self, places: Vec<Place>);
}

impl<F: FnOnce(Vec<Place>) + Send> PlacesCallback for F {
    fn on_loaded(self, places: Vec<Place>) {
        self(places)
    }
}

/// Receives a solved route
pub trait RouteCallback: Send {
    fn on_route_returned(self, route: RouteResult);
}

impl<F: FnOnce(RouteResult) + Send> RouteCallback for F {
    fn on_route_returned(self, route: RouteResult) {
        self(route)
    }
}

struct LocatorHandle<L> {
    locator: Arc<L>,
    url: String,
    status: LoadStatus,
    info: Option<LocatorInfo>,
}

#[derive(Debug, Default)]
struct State {
    location: Option<GeoPoint>,
    envelope: Option<Envelope>,
    cache: PlaceCache,
}

/// Search and routing service
pub struct LocationService<L, R> {
    settings: ServiceSettings,
    locator_factory: Factory<L>,
    route_factory: Factory<R>,
    locator: RwLock<Option<LocatorHandle<L>>>,
    state: RwLock<State>,
    filter: RwLock<CategoryFilter>,
    search_seq: AtomicU64,
}

impl LocationService<ArcGisLocator, ArcGisRouteTask> {
    /// Service backed by the ArcGIS services named in `config`
    pub fn arcgis(config: &Config) -> Self {
        let token = config.api_keys.arcgis.clone();
        let route_token = token.clone();
        Self::new(
            ServiceSettings::from(config),
            move |url| ArcGisLocator::new(url).with_token(token.clone()),
            move |url| ArcGisRouteTask::new(url).with_token(route_token.clone()),
        )
    }
}

impl<L: Locator, R: RouteTask> LocationService<L, R> {
    /// Create a service
    ///
    /// `locator_factory` is called once, by the first `configure`.
    /// `route_factory` is called for every route request.
    pub fn new(
        settings: ServiceSettings,
        locator_factory: impl Fn(&str) -> L + Send + Sync + 'static,
        route_factory: impl Fn(&str) -> R + Send + Sync + 'static,
    ) -> Self {
        let filter = CategoryFilter::with_types(settings.excluded_types.iter().cloned());
        Self {
            settings,
            locator_factory: Box::new(locator_factory),
            route_factory: Box::new(route_factory),
            locator: RwLock::new(None),
            state: RwLock::new(State::default()),
            filter: RwLock::new(filter),
            search_seq: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Create and load the locator for `url`
    ///
    /// Only the first call does anything; later calls return
    /// `AlreadyConfigured` whatever the state of the existing locator.
    pub async fn configure(&self, url: &str) -> Result<ConfigureOutcome> {
        let locator = {
            let mut handle = self.locator.write().await;
            if handle.is_some() {
                debug!(url, "Locator already configured");
                return Ok(ConfigureOutcome::AlreadyConfigured);
            }
            let locator = Arc::new((self.locator_factory)(url));
            *handle = Some(LocatorHandle {
                locator: Arc::clone(&locator),
                url: url.to_string(),
                status: LoadStatus::Loading,
                info: None,
            });
            locator
        };

        info!(url, "Loading locator");
        let loaded = locator.load().await;

        let mut guard = self.locator.write().await;
        let handle = guard.as_mut().ok_or(Error::NotConfigured)?;
        match loaded {
            Ok(info) => {
                handle.status = LoadStatus::Loaded;
                handle.info = Some(info);
                info!(url, "Locator loaded");
                Ok(ConfigureOutcome::Ready)
            }
            Err(e) => {
                handle.status = LoadStatus::FailedToLoad;
                let e = match e {
                    Error::LocatorLoad { .. } => e,
                    other => Error::LocatorLoad {
                        message: other.to_string(),
                        cause: None,
                    },
                };
                error!(url, cause = ?e.cause(), "{}", e);
                Err(e)
            }
        }
    }

    /// Callback form of `configure`
    ///
    /// Neither callback runs when the locator was already configured.
    pub async fn configure_with(
        &self,
        url: &str,
        on_ready: impl FnOnce() + Send,
        on_failed: impl FnOnce(Error) + Send,
    ) {
        match self.configure(url).await {
            Ok(ConfigureOutcome::Ready) => on_ready(),
            Ok(ConfigureOutcome::AlreadyConfigured) => {}
            Err(e) => on_failed(e),
        }
    }

    /// Load status of the locator, `None` before `configure`
    pub async fn locator_status(&self) -> Option<LoadStatus> {
        self.locator.read().await.as_ref().map(|h| h.status)
    }

    /// URL the locator was configured with
    pub async fn locator_url(&self) -> Option<String> {
        self.locator.read().await.as_ref().map(|h| h.url.clone())
    }

    /// Description of the loaded locator
    pub async fn locator_info(&self) -> Option<LocatorInfo> {
        self.locator
            .read()
            .await
            .as_ref()
            .and_then(|h| h.info.clone())
    }

    async fn loaded_locator(&self) -> Result<Arc<L>> {
        let guard = self.locator.read().await;
        let handle = guard.as_ref().ok_or(Error::NotConfigured)?;
        if handle.status != LoadStatus::Loaded {
            return Err(Error::LocatorNotLoaded);
        }
        Ok(Arc::clone(&handle.locator))
    }

    /// Search for places around the current location
    ///
    /// Results outside the current envelope (when one is set) are dropped.
    /// The kept places replace the cache unless a newer search was issued in
    /// the meantime. The returned list has the category filter applied.
    pub async fn search(&self, mut parameters: GeocodeParameters) -> Result<Vec<Place>> {
        let locator = self.loaded_locator().await?;

        parameters
            .provision_output_attributes()
            .provision_categories(&self.settings.categories);
        if parameters.max_results.is_none() {
            parameters.max_results = self.settings.max_results;
        }
        parameters
            .output_spatial_reference
            .get_or_insert(SpatialReference::Wgs84);

        let seq = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let (location, envelope) = {
            let state = self.state.read().await;
            (state.location, state.envelope)
        };

        info!(seq, categories = ?parameters.categories, "Searching for places");
        let results = locator.geocode("", &parameters).await.map_err(|e| {
            error!(seq, "Search failed: {}", e);
            e
        })?;

        let places = collect_places(&results, location.as_ref(), envelope.as_ref())
            .map_err(|e| {
                error!(seq, "Failed to process search results: {}", e);
                e
            })?;

        {
            let mut state = self.state.write().await;
            if self.search_seq.load(Ordering::SeqCst) == seq {
                state.cache.replace(&places);
            } else {
                debug!(seq, "Newer search issued, not caching results");
            }
        }

        let places = self.filter.read().await.apply(places);
        info!(seq, count = places.len(), "Search complete");
        Ok(places)
    }

    /// Callback form of `search`
    ///
    /// The callback runs once on success and not at all on failure.
    pub async fn search_with(&self, parameters: GeocodeParameters, callback: impl PlacesCallback) {
        if let Ok(places) = self.search(parameters).await {
            callback.on_loaded(places);
        }
    }

    /// Walking route from `start` to `end`
    ///
    /// `start` defaults to the current location. Every request uses a fresh
    /// route task. `Ok(None)` when the service found no route.
    pub async fn route(
        &self,
        start: Option<GeoPoint>,
        end: GeoPoint,
    ) -> Result<Option<RouteResult>> {
        let start = match start {
            Some(start) => start,
            None => self.state.read().await.location.ok_or_else(|| {
                Error::InvalidCoordinates("No start point and no current location".to_string())
            })?,
        };
        start.validate()?;
        end.validate()?;

        let task = (self.route_factory)(&self.settings.route_url);
        solve_walking_route(&task, start, end).await
    }

    /// Callback form of `route`
    ///
    /// The callback runs only when a route was solved.
    pub async fn route_with(
        &self,
        start: Option<GeoPoint>,
        end: GeoPoint,
        callback: impl RouteCallback,
    ) {
        match self.route(start, end).await {
            Ok(Some(result)) => callback.on_route_returned(result),
            Ok(None) => {}
            Err(e) => debug!("Route request failed: {}", e),
        }
    }

    /// Cached place by name
    pub async fn place_detail(&self, name: &str) -> Option<Place> {
        self.state.read().await.cache.get(name).cloned()
    }

    /// Cached places with the category filter applied
    pub async fn places_from_repo(&self) -> Vec<Place> {
        let places = self.state.read().await.cache.places();
        self.filter.read().await.apply(places)
    }

    /// Area to show results in
    ///
    /// The current envelope when set, otherwise the extent of the filtered
    /// cached places grown by the configured buffer. `None` when neither
    /// exists.
    pub async fn current_result_envelope(&self) -> Option<Envelope> {
        let places = {
            let state = self.state.read().await;
            if let Some(envelope) = state.envelope {
                return Some(envelope);
            }
            state.cache.places()
        };

        let points: Vec<GeoPoint> = self
            .filter
            .read()
            .await
            .apply(places)
            .iter()
            .filter_map(|p| p.location)
            .collect();
        buffered_extent(&points, self.settings.envelope_buffer)
    }

    pub async fn set_current_location(&self, location: Option<GeoPoint>) -> Result<()> {
        if let Some(location) = &location {
            location.validate()?;
        }
        self.state.write().await.location = location;
        Ok(())
    }

    pub async fn current_location(&self) -> Option<GeoPoint> {
        self.state.read().await.location
    }

    pub async fn set_current_envelope(&self, envelope: Envelope) {
        self.state.write().await.envelope = Some(envelope);
    }

    pub async fn clear_current_envelope(&self) {
        self.state.write().await.envelope = None;
    }

    pub async fn current_envelope(&self) -> Option<Envelope> {
        self.state.read().await.envelope
    }

    /// Replace the selected types of the category filter
    pub async fn set_filter(&self, filter: CategoryFilter) {
        *self.filter.write().await = filter;
    }

    pub async fn filter(&self) -> CategoryFilter {
        self.filter.read().await.clone()
    }

    /// Flip one type in the category filter, returning whether it is now selected
    pub async fn toggle_filter_type(&self, place_type: &str) -> bool {
        self.filter.write().await.toggle(place_type)
    }
}

/// Build places from raw results, keeping those inside `envelope`
fn collect_places(
    results: &[GeocodeResult],
    location: Option<&GeoPoint>,
    envelope: Option<&Envelope>,
) -> Result<Vec<Place>> {
    let mut places = Vec::with_capacity(results.len());

    for result in results {
        let mut place = Place::from_geocode_result(result)?;
        place.annotate(location);

        if let Some(envelope) = envelope {
            let inside = place
                .location
                .as_ref()
                .is_some_and(|point| envelope.contains(point));
            if !inside {
                info!("Excluding {}, outside the current envelope", place.name);
                continue;
            }
        }
        places.push(place);
    }

    Ok(places)
}
