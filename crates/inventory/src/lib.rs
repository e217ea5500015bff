//! Inventory domain module.
//!
//! Holds the session's products, their lots, and the catalog of categories and
//! storage locations, and implements the consolidation-aware mutation rules
//! (lot merging, partial transfers between locations). Pure domain logic: no
//! IO, no remote store.

pub mod catalog;
pub mod command;
pub mod filter;
pub mod ledger;
pub mod lot;
pub mod product;
pub mod transfer;

pub use catalog::{Catalog, Category, Location, LocationStat, default_locations};
pub use command::{
    AddCategory, AddLocation, AddStock, EditLot, LedgerChange, LedgerCommand, ProductDraft,
    ProductRef, Transfer, UpdateProduct,
};
pub use filter::ProductFilter;
pub use ledger::{AddStockOutcome, InventoryLedger};
pub use lot::{Lot, LotKey};
pub use product::Product;
pub use transfer::{DestinationStep, SourceStep, TransferPlan};
