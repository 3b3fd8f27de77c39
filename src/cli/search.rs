//! Search command handler
//!
//! Searches for places around a location and prints them.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::url::UrlFormatter;
use crate::format::{available_formats, get_formatter};
use crate::geo::GeocodeParameters;
use crate::geometry::{Envelope, GeoPoint};
use crate::service::LocationService;
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Latitude
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Only keep places inside "xmin,ymin,xmax,ymax" (degrees)
    #[arg(long, short = 'e', allow_hyphen_values = true)]
    pub envelope: Option<Envelope>,

    /// Hide places of this type (repeatable)
    #[arg(long, short = 'x')]
    pub exclude: Vec<String>,

    /// Search this category too (repeatable)
    #[arg(long, short = 'c')]
    pub category: Vec<String>,

    /// Maximum number of results
    #[arg(long, short = 'n')]
    pub max_results: Option<u32>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Map provider for the url format
    #[arg(long)]
    pub provider: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let config = Config::load()?;

    let location = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint::wgs84(lng, lat)),
        _ => config.location.point(),
    };
    if location.is_none() {
        eprintln!("No location given; distances and bearings will be missing");
    }

    let format = args.format.unwrap_or(config.output.format.clone());
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let service = LocationService::arcgis(&config);
    service.set_current_location(location).await?;
    if let Some(envelope) = args.envelope {
        service.set_current_envelope(envelope).await;
    }

    let mut filter = service.filter().await;
    for place_type in args.exclude {
        filter.select(place_type);
    }
    service.set_filter(filter).await;

    service.configure(&config.locator.url).await?;

    let parameters = GeocodeParameters {
        categories: args.category,
        max_results: args.max_results,
        preferred_search_location: location,
        search_area: args.envelope,
        ..Default::default()
    };
    let places = service.search(parameters).await?;

    let output = match (formatter.name(), args.provider.as_deref()) {
        ("url", Some(provider)) => {
            UrlFormatter.format_with_provider(&places, &config, Some(provider))?
        }
        _ => formatter.format(&places, &config)?,
    };

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        print!("{}", output);
    }

    Ok(())
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
