//! Geocoding module
//!
//! Defines the `Locator` trait the search flow runs against, the request and
//! result types it exchanges, and two locators: the ArcGIS World Geocoding
//! Service and an in-memory locator for tests.

pub mod arcgis;
pub mod memory;

use crate::constants::attributes::ALL_FIELDS;
use crate::error::{Error, Result};
use crate::geometry::{Envelope, GeoPoint, SpatialReference};
use crate::place::filter::same_type;
use serde::{Deserialize, Serialize};

/// Load state of a locator handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    NotLoaded,
    Loading,
    Loaded,
    FailedToLoad,
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "not_loaded"),
            Self::Loading => write!(f, "loading"),
            Self::Loaded => write!(f, "loaded"),
            Self::FailedToLoad => write!(f, "failed_to_load"),
        }
    }
}

/// Description of a loaded locator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocatorInfo {
    pub description: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Top-level place categories the locator can search
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial_reference: Option<SpatialReference>,
}

/// Parameters for a geocode request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeParameters {
    /// Place categories to search
    #[serde(default)]
    pub categories: Vec<String>,

    /// Attributes to return with each result ("*" for all)
    #[serde(default)]
    pub result_attribute_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,

    /// Results near this point rank higher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_search_location: Option<GeoPoint>,

    /// Only search inside this area
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_area: Option<Envelope>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_spatial_reference: Option<SpatialReference>,
}

impl GeocodeParameters {
    /// Request every result attribute, discarding any caller selection
    pub fn provision_output_attributes(&mut self) -> &mut Self {
        self.result_attribute_names.clear();
        self.result_attribute_names.push(ALL_FIELDS.to_string());
        self
    }

    /// Append categories to the caller's list
    ///
    /// Categories the caller already asked for (ignoring case) are not added twice.
    pub fn provision_categories(&mut self, categories: &[String]) -> &mut Self {
        for category in categories {
            let present = self
                .categories
                .iter()
                .any(|c| same_type(c, category));
            if !present {
                self.categories.push(category.clone());
            }
        }
        self
    }
}

/// A single raw result from a locator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    /// Candidate label (usually the matched address or place name)
    pub label: String,

    /// Match score, 0-100
    pub score: f64,

    /// Attribute bag as returned by the locator
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,

    /// Point to show the result at
    pub display_location: Option<GeoPoint>,
}

impl GeocodeResult {
    /// Read a string attribute
    ///
    /// Missing and null attributes are `None`; any other JSON type is an error.
    pub fn string_attribute(&self, name: &str) -> Result<Option<String>> {
        match self.attributes.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(Error::Geocoding(format!(
                "Attribute {} is not a string: {}",
                name, other
            ))),
        }
    }
}

/// Trait for geocoding backends
pub trait Locator: Send + Sync {
    /// Load the locator, returning its description
    ///
    /// Failures are reported as `Error::LocatorLoad` with the underlying cause
    /// when there is one.
    fn load(&self) -> impl std::future::Future<Output = Result<LocatorInfo>> + Send;

    /// Find candidates for `query` using `parameters`
    fn geocode(
        &self,
        query: &str,
        parameters: &GeocodeParameters,
    ) -> impl std::future::Future<Output = Result<Vec<GeocodeResult>>> + Send;
}
