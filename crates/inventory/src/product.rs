use serde::{Deserialize, Serialize};

use pantry_core::{CategoryId, Entity, LotId, ProductId, find_by_id};

use crate::lot::Lot;

/// A product and the lots currently stocked for it.
///
/// Lots are only mutated through `InventoryLedger`, which keeps the
/// consolidation rules in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    ean: Option<String>,
    category_id: Option<CategoryId>,
    lots: Vec<Lot>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        ean: Option<String>,
        category_id: Option<CategoryId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            ean,
            category_id,
            lots: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ean(&self) -> Option<&str> {
        self.ean.as_deref()
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn lot(&self, lot_id: LotId) -> Option<&Lot> {
        find_by_id(&self.lots, &lot_id)
    }

    /// Sum of all lot quantities.
    pub fn total_quantity(&self) -> u64 {
        self.lots.iter().map(|l| u64::from(l.quantity.get())).sum()
    }

    /// A copy of this product without its lots (what the `products` table holds).
    pub fn header(&self) -> Product {
        Product::new(self.id, self.name.clone(), self.ean.clone(), self.category_id)
    }

    pub(crate) fn set_details(
        &mut self,
        name: String,
        ean: Option<String>,
        category_id: Option<CategoryId>,
    ) {
        self.name = name;
        self.ean = ean;
        self.category_id = category_id;
    }

    pub(crate) fn lots_mut(&mut self) -> &mut Vec<Lot> {
        &mut self.lots
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
