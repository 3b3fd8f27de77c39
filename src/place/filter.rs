//! Category filter
//!
//! Holds the place types the user chose to hide. Matching is
//! case-insensitive on the place's type string.

use crate::place::Place;
use serde::{Deserialize, Serialize};

/// Place types excluded from results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    selected_types: Vec<String>,
}

impl CategoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter excluding the given types
    pub fn with_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::new();
        for t in types {
            filter.select(t);
        }
        filter
    }

    /// Types currently excluded, in selection order
    pub fn selected_types(&self) -> &[String] {
        &self.selected_types
    }

    pub fn is_selected(&self, place_type: &str) -> bool {
        self.selected_types
            .iter()
            .any(|t| same_type(t, place_type))
    }

    /// Exclude a type; selecting it twice is a no-op
    pub fn select(&mut self, place_type: impl Into<String>) {
        let place_type = place_type.into();
        if !self.is_selected(&place_type) {
            self.selected_types.push(place_type);
        }
    }

    /// Stop excluding a type
    pub fn deselect(&mut self, place_type: &str) {
        self.selected_types
            .retain(|t| !same_type(t, place_type));
    }

    /// Flip a type's selection; returns whether it is now selected
    pub fn toggle(&mut self, place_type: &str) -> bool {
        if self.is_selected(place_type) {
            self.deselect(place_type);
            false
        } else {
            self.select(place_type);
            true
        }
    }

    pub fn clear(&mut self) {
        self.selected_types.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected_types.is_empty()
    }

    /// Drop places whose type is selected
    ///
    /// An empty selection returns the input untouched.
    pub fn apply(&self, places: Vec<Place>) -> Vec<Place> {
        if self.selected_types.is_empty() {
            return places;
        }
        places
            .into_iter()
            .filter(|p| !self.is_selected(&p.place_type))
            .collect()
    }
}

/// Unicode case-insensitive comparison
pub(crate) fn same_type(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
