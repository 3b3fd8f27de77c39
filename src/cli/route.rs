//! Route command handler
//!
//! Solves a walking route between two points.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::get_formatter;
use crate::geometry::GeoPoint;
use crate::service::LocationService;
use clap::Args;

/// Route command arguments
#[derive(Args)]
pub struct RouteArgs {
    /// Start as "lat,lng"; defaults to the configured location
    #[arg(long, allow_hyphen_values = true)]
    pub from: Option<GeoPoint>,

    /// Destination as "lat,lng"
    #[arg(long, allow_hyphen_values = true)]
    pub to: GeoPoint,

    /// Output format (text, json or gpx)
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

/// Run the route command
pub async fn run(args: RouteArgs) -> Result<()> {
    let config = Config::load()?;

    if args.from.is_none() && config.location.point().is_none() {
        return Err(Error::Config(
            "No start given; use --from or set location.lat/location.lng".to_string(),
        ));
    }

    let format = args.format.unwrap_or(config.output.format.clone());
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let service = LocationService::arcgis(&config);
    service.set_current_location(config.location.point()).await?;
    let Some(route) = service.route(args.from, args.to).await? else {
        eprintln!("No route found");
        return Ok(());
    };

    let output = formatter.format_route(&route, &config)?;
    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        print!("{}", output);
    }

    Ok(())
}
