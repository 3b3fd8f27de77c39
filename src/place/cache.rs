//! Per-search place cache
//!
//! Maps place name to place. Each search replaces the whole cache; results
//! are never merged across searches.

use crate::place::Place;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct PlaceCache {
    places: HashMap<String, Place>,
}

impl PlaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache contents with `places`
    ///
    /// Later places win when two share a name.
    pub fn replace(&mut self, places: &[Place]) {
        self.places.clear();
        for place in places {
            self.places.insert(place.name.clone(), place.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Place> {
        self.places.get(name)
    }

    /// All cached places, sorted by distance then name
    pub fn places(&self) -> Vec<Place> {
        let mut places: Vec<Place> = self.places.values().cloned().collect();
        places.sort_by(|a, b| {
            a.distance
                .unwrap_or(u64::MAX)
                .cmp(&b.distance.unwrap_or(u64::MAX))
                .then_with(|| a.name.cmp(&b.name))
        });
        places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn clear(&mut self) {
        self.places.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_drops_previous_contents() {
        let mut cache = PlaceCache::new();
        cache.replace(&[Place::new("A", "Food", None), Place::new("B", "Food", None)]);
        assert_eq!(cache.len(), 2);

        cache.replace(&[Place::new("C", "Hotel", None)]);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("A").is_none());
        assert!(cache.get("C").is_some());
    }

    #[test]
    fn test_last_write_wins() {
        let mut cache = PlaceCache::new();
        cache.replace(&[Place::new("Dup", "Food", None), Place::new("Dup", "Hotel", None)]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("Dup").unwrap().place_type, "Hotel");
    }

    #[test]
    fn test_places_sorted_by_distance() {
        let mut near = Place::new("Near", "Food", None);
        near.distance = Some(10);
        let mut far = Place::new("Far", "Food", None);
        far.distance = Some(500);
        let unknown = Place::new("Unknown", "Food", None);

        let mut cache = PlaceCache::new();
        cache.replace(&[unknown, far, near]);

        let names: Vec<String> = cache.places().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Near", "Far", "Unknown"]);
    }

    #[test]
    fn test_clear() {
        let mut cache = PlaceCache::new();
        cache.replace(&[Place::new("A", "Food", None)]);
        cache.clear();
        assert!(cache.is_empty());
    }
}
