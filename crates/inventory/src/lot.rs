use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pantry_core::{Entity, LocationId, LotId, ProductId, Quantity};

/// An inventory lot: a quantity of one product at one location with one
/// (optional) expiry date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub product_id: ProductId,
    /// `None` when the location was removed from under the lot.
    pub location_id: Option<LocationId>,
    pub quantity: Quantity,
    pub expiry: Option<NaiveDate>,
}

/// The consolidation key: two lots of the same product with equal keys must be
/// a single lot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LotKey {
    pub location_id: Option<LocationId>,
    pub expiry: Option<NaiveDate>,
}

impl Lot {
    pub fn key(&self) -> LotKey {
        LotKey {
            location_id: self.location_id,
            expiry: self.expiry,
        }
    }

    pub fn matches(&self, location_id: LocationId, expiry: Option<NaiveDate>) -> bool {
        self.location_id == Some(location_id) && self.expiry == expiry
    }
}

impl Entity for Lot {
    type Id = LotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
