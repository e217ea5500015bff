//! Categories and storage locations owned by the session user.

use serde::{Deserialize, Serialize};

use pantry_core::{CategoryId, Entity, LocationId, find_by_id};

use crate::product::Product;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    /// Display glyph (usually a single emoji).
    pub icon: String,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Locations seeded for a user who has none yet, as `(name, icon)`.
pub fn default_locations() -> [(&'static str, &'static str); 5] {
    [
        ("Fridge", "🧊"),
        ("Pantry", "🥫"),
        ("Freezer", "❄️"),
        ("Cellar", "🍷"),
        ("Storeroom", "🏺"),
    ]
}

/// Number of lots stored at one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationStat<'a> {
    pub location: &'a Location,
    pub lots: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
    locations: Vec<Location>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>, locations: Vec<Location>) -> Self {
        Self {
            categories,
            locations,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        find_by_id(&self.categories, &id)
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        find_by_id(&self.locations, &id)
    }

    /// Lots per location, in catalog order. Locations without lots report 0.
    pub fn location_stats<'a>(&'a self, products: &[Product]) -> Vec<LocationStat<'a>> {
        self.locations
            .iter()
            .map(|location| LocationStat {
                location,
                lots: products
                    .iter()
                    .flat_map(|p| p.lots())
                    .filter(|l| l.location_id == Some(location.id))
                    .count(),
            })
            .collect()
    }

    pub(crate) fn push_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    pub(crate) fn remove_category(&mut self, id: CategoryId) {
        self.categories.retain(|c| c.id != id);
    }

    pub(crate) fn push_location(&mut self, location: Location) {
        self.locations.push(location);
    }

    pub(crate) fn remove_location(&mut self, id: LocationId) {
        self.locations.retain(|l| l.id != id);
    }
}
