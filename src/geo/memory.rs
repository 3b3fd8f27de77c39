//! In-memory locator
//!
//! Serves canned geocode results. Clones share state, so a test can keep a
//! handle while the service owns another one and inspect the requests it saw.

use crate::constants::attributes;
use crate::error::{Error, Result};
use crate::geo::{GeocodeParameters, GeocodeResult, Locator, LocatorInfo};
use crate::geometry::GeoPoint;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A geocode request as received by the locator
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRequest {
    pub query: String,
    pub parameters: GeocodeParameters,
}

#[derive(Debug)]
struct Response {
    results: Result<Vec<GeocodeResult>>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct State {
    url: String,
    results: Vec<GeocodeResult>,
    queued: VecDeque<Response>,
    load_error: Option<(String, Option<String>)>,
    load_count: usize,
    requests: Vec<GeocodeRequest>,
}

/// Locator backed by a fixed result list
#[derive(Debug, Clone, Default)]
pub struct MemoryLocator {
    state: Arc<Mutex<State>>,
}

impl MemoryLocator {
    /// Create a locator that answers every search with `results`
    pub fn new(results: Vec<GeocodeResult>) -> Self {
        let locator = Self::default();
        locator.lock().results = results;
        locator
    }

    /// Create a locator whose load fails
    pub fn failing(message: impl Into<String>, cause: Option<&str>) -> Self {
        let locator = Self::default();
        locator.lock().load_error = Some((message.into(), cause.map(String::from)));
        locator
    }

    /// Handle for `url` sharing this locator's state
    ///
    /// Records the URL so callers can see which one a factory was given.
    pub fn for_url(&self, url: &str) -> Self {
        self.lock().url = url.to_string();
        self.clone()
    }

    /// URL of the most recent `for_url` call
    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    /// Replace the default answer
    pub fn set_results(&self, results: Vec<GeocodeResult>) {
        self.lock().results = results;
    }

    /// Answer the next search with `results` after `delay`
    ///
    /// Queued answers are used in order before falling back to the default.
    pub fn queue_results(&self, results: Vec<GeocodeResult>, delay: Option<Duration>) {
        self.lock().queued.push_back(Response {
            results: Ok(results),
            delay,
        });
    }

    /// Fail the next search
    pub fn queue_error(&self, message: impl Into<String>) {
        self.lock().queued.push_back(Response {
            results: Err(Error::Geocoding(message.into())),
            delay: None,
        });
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<GeocodeRequest> {
        self.lock().requests.clone()
    }

    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked mid-update
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Locator for MemoryLocator {
    async fn load(&self) -> Result<LocatorInfo> {
        let mut state = self.lock();
        state.load_count += 1;

        if let Some((message, cause)) = &state.load_error {
            return Err(Error::LocatorLoad {
                message: message.clone(),
                cause: cause.clone(),
            });
        }

        Ok(LocatorInfo {
            description: "In-memory locator".to_string(),
            capabilities: vec!["Geocode".to_string()],
            categories: vec!["POI".to_string()],
            spatial_reference: None,
        })
    }

    async fn geocode(&self, query: &str, parameters: &GeocodeParameters) -> Result<Vec<GeocodeResult>> {
        let response = {
            let mut state = self.lock();
            state.requests.push(GeocodeRequest {
                query: query.to_string(),
                parameters: parameters.clone(),
            });
            match state.queued.pop_front() {
                Some(response) => response,
                None => Response {
                    results: Ok(state.results.clone()),
                    delay: None,
                },
            }
        };

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }
        response.results
    }
}

/// Build a geocode result shaped like a POI candidate
pub fn place_result(name: &str, place_type: &str, location: GeoPoint) -> GeocodeResult {
    let mut attrs = serde_json::Map::new();
    attrs.insert(attributes::NAME.to_string(), name.into());
    attrs.insert(attributes::TYPE.to_string(), place_type.into());

    GeocodeResult {
        label: name.to_string(),
        score: 100.0,
        attributes: attrs,
        display_location: Some(location),
    }
}
