//! Status command handler
//!
//! Loads the configured locator and shows what it offers.

use crate::config::Config;
use crate::error::Result;
use crate::service::LocationService;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Check if server is running (tries to connect)
    #[arg(long)]
    pub server: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load()?;

    if args.server {
        check_server_status(&config).await;
    }

    println!("nearby v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Locator: {}", config.locator.url);
    let service = LocationService::arcgis(&config);
    match service.configure(&config.locator.url).await {
        Ok(_) => {
            if let Some(info) = service.locator_info().await {
                println!("  Status: LOADED");
                if !info.description.is_empty() {
                    println!("  Description: {}", info.description);
                }
                if let Some(sr) = info.spatial_reference {
                    println!("  Spatial reference: {} ({})", sr, sr.wkid());
                }
                if !info.capabilities.is_empty() {
                    println!("  Capabilities: {}", info.capabilities.join(", "));
                }
                if !info.categories.is_empty() {
                    println!("  Categories: {}", info.categories.join(", "));
                }
            }
        }
        Err(e) => {
            println!("  Status: FAILED ({})", e);
            if let Some(cause) = e.cause() {
                println!("  Cause: {}", cause);
            }
        }
    }
    println!();

    println!("Route service: {}", config.route.url);
    println!("Search categories: {}", config.search.categories.join(", "));
    if !config.filter.excluded_types.is_empty() {
        println!("Excluded types: {}", config.filter.excluded_types.join(", "));
    }

    Ok(())
}

/// Check if the server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/api/status", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) => {
            if response.status().is_success() {
                println!("Server: RUNNING on {}", config.server_addr());
                if let Ok(status) = response.json::<serde_json::Value>().await {
                    if let Some(version) = status.get("version").and_then(|v| v.as_str()) {
                        println!("  Version: {}", version);
                    }
                    if let Some(locator) = status.get("locator_status").and_then(|v| v.as_str()) {
                        println!("  Locator: {}", locator);
                    }
                    if let Some(count) = status.get("cached_places").and_then(|v| v.as_u64()) {
                        println!("  Cached places: {}", count);
                    }
                }
            } else {
                println!("Server: ERROR (status {})", response.status());
            }
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
    println!();
}
