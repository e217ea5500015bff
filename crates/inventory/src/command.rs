//! Ledger commands (intent) and changes (what the ledger decided).
//!
//! Commands carry pre-allocated identifiers for anything they may create so
//! that `handle` stays deterministic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pantry_core::{CategoryId, LocationId, LotId, ProductId, Quantity};

use crate::catalog::{Category, Location};
use crate::lot::Lot;
use crate::product::Product;

/// A product that may not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub ean: Option<String>,
    pub category_id: Option<CategoryId>,
}

impl ProductDraft {
    pub fn new(
        name: impl Into<String>,
        ean: Option<String>,
        category_id: Option<CategoryId>,
    ) -> Self {
        Self {
            name: name.into(),
            ean,
            category_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductRef {
    Existing(ProductId),
    /// Resolved by barcode, then by (name, category), else created.
    Draft(ProductDraft),
}

/// Command: add stock, merging into a matching lot when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddStock {
    pub product: ProductRef,
    pub location_id: LocationId,
    pub quantity: u32,
    pub expiry: Option<NaiveDate>,
    pub new_product_id: ProductId,
    pub new_lot_id: LotId,
}

impl AddStock {
    pub fn new(
        product: ProductRef,
        location_id: LocationId,
        quantity: u32,
        expiry: Option<NaiveDate>,
    ) -> Self {
        Self {
            product,
            location_id,
            quantity,
            expiry,
            new_product_id: ProductId::new(),
            new_lot_id: LotId::new(),
        }
    }
}

/// Command: overwrite a lot's fields in place (no merge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLot {
    pub lot_id: LotId,
    pub quantity: u32,
    pub expiry: Option<NaiveDate>,
    pub location_id: LocationId,
}

/// Command: move part or all of a lot to another location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub lot_id: LotId,
    pub quantity: u32,
    pub destination: LocationId,
    pub new_lot_id: LotId,
}

impl Transfer {
    pub fn new(lot_id: LotId, quantity: u32, destination: LocationId) -> Self {
        Self {
            lot_id,
            quantity,
            destination,
            new_lot_id: LotId::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub name: String,
    pub ean: Option<String>,
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCategory {
    pub category_id: CategoryId,
    pub name: String,
}

impl AddCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            category_id: CategoryId::new(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLocation {
    pub location_id: LocationId,
    pub name: String,
    pub icon: String,
}

impl AddLocation {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            location_id: LocationId::new(),
            name: name.into(),
            icon: icon.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    AddStock(AddStock),
    RemoveLot { lot_id: LotId },
    EditLot(EditLot),
    Transfer(Transfer),
    Consolidate { product_id: ProductId },
    UpdateProduct(UpdateProduct),
    DeleteProduct { product_id: ProductId },
    AddCategory(AddCategory),
    DeleteCategory { category_id: CategoryId },
    AddLocation(AddLocation),
    DeleteLocation { location_id: LocationId },
}

/// A single state change decided by the ledger.
///
/// Each change maps onto the remote writes for a single record (a deleted
/// product also drops its lots), which lets the session persist a command
/// before applying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerChange {
    /// Carries the product header (no lots).
    ProductRegistered(Product),
    ProductUpdated {
        product_id: ProductId,
        name: String,
        ean: Option<String>,
        category_id: Option<CategoryId>,
    },
    /// Removes the product and all of its lots.
    ProductDeleted { product_id: ProductId },
    LotOpened(Lot),
    LotQuantitySet {
        product_id: ProductId,
        lot_id: LotId,
        quantity: Quantity,
    },
    LotRemoved { product_id: ProductId, lot_id: LotId },
    LotEdited {
        product_id: ProductId,
        lot_id: LotId,
        location_id: LocationId,
        quantity: Quantity,
        expiry: Option<NaiveDate>,
    },
    CategoryAdded(Category),
    CategoryDeleted { category_id: CategoryId },
    LocationAdded(Location),
    LocationDeleted { location_id: LocationId },
}

impl LedgerChange {
    /// Stable change name, used in logs.
    pub fn change_type(&self) -> &'static str {
        match self {
            LedgerChange::ProductRegistered(_) => "product.registered",
            LedgerChange::ProductUpdated { .. } => "product.updated",
            LedgerChange::ProductDeleted { .. } => "product.deleted",
            LedgerChange::LotOpened(_) => "lot.opened",
            LedgerChange::LotQuantitySet { .. } => "lot.quantity_set",
            LedgerChange::LotRemoved { .. } => "lot.removed",
            LedgerChange::LotEdited { .. } => "lot.edited",
            LedgerChange::CategoryAdded(_) => "category.added",
            LedgerChange::CategoryDeleted { .. } => "category.deleted",
            LedgerChange::LocationAdded(_) => "location.added",
            LedgerChange::LocationDeleted { .. } => "location.deleted",
        }
    }
}
