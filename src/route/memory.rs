//! In-memory route task
//!
//! Returns a canned result for every solve and records the parameters it was
//! asked to solve. Clones share state.

use crate::error::{Error, Result};
use crate::geometry::{GeoPoint, SpatialReference};
use crate::route::{DirectionManeuver, Route, RouteParameters, RouteResult, RouteTask, UnitSystem};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    url: String,
    result: Option<RouteResult>,
    defaults: RouteParameters,
    load_error: Option<(String, Option<String>)>,
    parameters_error: Option<String>,
    solve_error: Option<String>,
    load_count: usize,
    solved: Vec<RouteParameters>,
}

/// Route task backed by a fixed result
#[derive(Debug, Clone, Default)]
pub struct MemoryRouteTask {
    state: Arc<Mutex<State>>,
}

impl MemoryRouteTask {
    /// Create a task that solves every request with `result`
    pub fn solving(result: RouteResult) -> Self {
        let task = Self::default();
        task.lock().result = Some(result);
        task
    }

    /// Create a task whose load fails
    pub fn failing_load(message: impl Into<String>, cause: Option<&str>) -> Self {
        let task = Self::default();
        task.lock().load_error = Some((message.into(), cause.map(String::from)));
        task
    }

    /// Handle for `url` sharing this task's state
    pub fn for_url(&self, url: &str) -> Self {
        self.lock().url = url.to_string();
        self.clone()
    }

    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    pub fn fail_parameters(&self, message: impl Into<String>) {
        self.lock().parameters_error = Some(message.into());
    }

    pub fn fail_solve(&self, message: impl Into<String>) {
        self.lock().solve_error = Some(message.into());
    }

    /// Parameters of every solve so far
    pub fn solved_parameters(&self) -> Vec<RouteParameters> {
        self.lock().solved.clone()
    }

    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RouteTask for MemoryRouteTask {
    async fn load(&self) -> Result<()> {
        let mut state = self.lock();
        state.load_count += 1;
        match &state.load_error {
            Some((message, cause)) => Err(Error::RouteLoad {
                message: message.clone(),
                cause: cause.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn create_default_parameters(&self) -> Result<RouteParameters> {
        let state = self.lock();
        match &state.parameters_error {
            Some(message) => Err(Error::Geo(message.clone())),
            None => Ok(state.defaults.clone()),
        }
    }

    async fn solve_route(&self, parameters: &RouteParameters) -> Result<Option<RouteResult>> {
        let mut state = self.lock();
        if let Some(message) = &state.solve_error {
            return Err(Error::Geo(message.clone()));
        }
        state.solved.push(parameters.clone());
        Ok(state.result.clone())
    }
}

/// A short two-maneuver walking route
pub fn sample_result() -> RouteResult {
    RouteResult {
        units: UnitSystem::Imperial,
        routes: vec![Route {
            name: "Location 1 - Location 2".to_string(),
            total_length: 0.6,
            total_time_minutes: 12.5,
            path: vec![
                GeoPoint::new(-13_046_000.0, 4_036_000.0, SpatialReference::WebMercator),
                GeoPoint::new(-13_045_000.0, 4_036_400.0, SpatialReference::WebMercator),
            ],
            directions: vec![
                DirectionManeuver {
                    text: "Start at Location 1".to_string(),
                    length: 0.0,
                    time_minutes: 0.0,
                },
                DirectionManeuver {
                    text: "Go east on Redlands Blvd".to_string(),
                    length: 0.6,
                    time_minutes: 12.5,
                },
            ],
        }],
    }
}
