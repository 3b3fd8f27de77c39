//! GPX output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::geometry::SpatialReference;
use crate::place::Place;
use crate::route::RouteResult;

/// GPX formatter - places as waypoints, routes as tracks
pub struct GpxFormatter;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn header(name: &str) -> String {
    let mut gpx = String::new();
    gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    gpx.push('\n');
    gpx.push_str(r#"<gpx version="1.1" creator="nearby">"#);
    gpx.push('\n');
    gpx.push_str("  <metadata>\n");
    gpx.push_str(&format!("    <name>{}</name>\n", escape(name)));
    gpx.push_str(&format!("    <time>{}</time>\n", chrono::Utc::now().to_rfc3339()));
    gpx.push_str("  </metadata>\n");
    gpx
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoints and route track"
    }

    fn format(&self, places: &[Place], _config: &Config) -> Result<String> {
        let mut gpx = header("nearby places");

        // Places without a location can't be waypoints
        for place in places {
            let Some(location) = place.location else {
                continue;
            };
            let point = location.project(SpatialReference::Wgs84);
            gpx.push_str(&format!(r#"  <wpt lat="{}" lon="{}">"#, point.y, point.x));
            gpx.push('\n');
            gpx.push_str(&format!("    <name>{}</name>\n", escape(&place.name)));
            if let Some(address) = &place.address {
                gpx.push_str(&format!("    <desc>{}</desc>\n", escape(address)));
            }
            if let Some(url) = &place.url {
                gpx.push_str(&format!("    <link href=\"{}\"/>\n", escape(url)));
            }
            gpx.push_str(&format!("    <type>{}</type>\n", escape(&place.place_type)));
            gpx.push_str("  </wpt>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }

    fn format_route(&self, route: &RouteResult, _config: &Config) -> Result<String> {
        let mut gpx = header("nearby walking route");

        for r in &route.routes {
            gpx.push_str("  <trk>\n");
            gpx.push_str(&format!("    <name>{}</name>\n", escape(&r.name)));
            gpx.push_str("    <trkseg>\n");
            for p in &r.path {
                let p = p.project(SpatialReference::Wgs84);
                gpx.push_str(&format!("      <trkpt lat=\"{:.7}\" lon=\"{:.7}\"/>\n", p.y, p.x));
            }
            gpx.push_str("    </trkseg>\n");
            gpx.push_str("  </trk>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}
