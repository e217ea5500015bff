use pantry_core::{CategoryId, LocationId};

use crate::product::Product;

/// Product list filter: free-text search plus optional category and location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Matches a case-insensitive substring of the name, or a substring of the barcode.
    pub search: String,
    pub category_id: Option<CategoryId>,
    /// Keeps products holding at least one lot at this location.
    pub location_id: Option<LocationId>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let term = self.search.trim().to_lowercase();
        let matches_search = term.is_empty()
            || product.name().to_lowercase().contains(&term)
            || product.ean().is_some_and(|ean| ean.contains(&term));

        let matches_category = self
            .category_id
            .is_none_or(|id| product.category_id() == Some(id));

        let matches_location = self
            .location_id
            .is_none_or(|id| product.lots().iter().any(|l| l.location_id == Some(id)));

        matches_search && matches_category && matches_location
    }
}
