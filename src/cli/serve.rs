//! Serve command handler
//!
//! Runs the place search API in the foreground. Flags override the saved
//! config for this run only.

use crate::config::Config;
use crate::error::Result;
use crate::geometry::GeoPoint;
use crate::server;
use clap::Args;
use tracing::info;

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Locator service URL
    #[arg(long)]
    pub locator: Option<String>,

    /// Starting location as "lat,lng"
    #[arg(long, allow_hyphen_values = true)]
    pub at: Option<GeoPoint>,
}

impl ServeArgs {
    /// Layer the flags over a loaded config
    fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.locator {
            config.locator.url = url;
        }
        if let Some(at) = self.at {
            at.validate()?;
            config.location.lat = Some(at.y);
            config.location.lng = Some(at.x);
        }
        Ok(())
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = Config::load()?;
    args.apply(&mut config)?;

    info!(
        addr = %config.server_addr(),
        locator = %config.locator.url,
        location = ?config.location.point(),
        "nearby v{} serving",
        env!("CARGO_PKG_VERSION"),
    );

    server::run(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn args() -> ServeArgs {
        ServeArgs {
            host: None,
            port: None,
            locator: None,
            at: None,
        }
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let mut config = Config::default();
        args().apply(&mut config).unwrap();

        assert_eq!(config.server_addr(), Config::default().server_addr());
        assert_eq!(config.locator.url, Config::default().locator.url);
        assert_eq!(config.location.point(), None);
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        ServeArgs {
            host: Some("0.0.0.0".to_string()),
            port: Some(9000),
            locator: Some("http://localhost/GeocodeServer".to_string()),
            at: Some("34.057,-117.195".parse().unwrap()),
        }
        .apply(&mut config)
        .unwrap();

        assert_eq!(config.server_addr(), "0.0.0.0:9000");
        assert_eq!(config.locator.url, "http://localhost/GeocodeServer");
        assert_eq!(config.location.point(), Some(GeoPoint::wgs84(-117.195, 34.057)));
    }

    #[test]
    fn test_invalid_location_rejected() {
        let mut config = Config::default();
        let err = ServeArgs {
            at: Some("95,0".parse().unwrap()),
            ..args()
        }
        .apply(&mut config)
        .unwrap_err();

        assert!(matches!(err, Error::InvalidCoordinates(_)));
        assert_eq!(config.location.point(), None);
    }
}
