//! Server shared state
//!
//! Holds configuration and the location service for the HTTP server.

use crate::config::Config;
use crate::geo::Locator;
use crate::route::RouteTask;
use crate::service::LocationService;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState<L, R> {
    /// Configuration the server started with
    pub config: Config,

    /// Search and routing service
    pub service: LocationService<L, R>,

    started: Instant,
}

impl<L: Locator, R: RouteTask> AppState<L, R> {
    /// Create new application state
    pub fn new(config: Config, service: LocationService<L, R>) -> Self {
        Self {
            config,
            service,
            started: Instant::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
