//! Typed codec between remote rows and domain records.
//!
//! Column names follow the hosted schema: `categories`, `locations`,
//! `products` and `inventory` (one row per lot, expiry in `expiry_date`).

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use pantry_core::{CategoryId, LocationId, LotId, ProductId, Quantity, UserId};
use pantry_inventory::{Category, Location, Lot, Product};

use crate::error::DecodeError;
use crate::remote::{Row, Table};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocationRow {
    pub id: LocationId,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub ean: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LotRow {
    pub id: LotId,
    pub product_id: ProductId,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    pub quantity: i64,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

fn decode_row<T: DeserializeOwned>(table: Table, row: Row) -> Result<T, DecodeError> {
    serde_json::from_value(JsonValue::Object(row)).map_err(|e| DecodeError::new(table, e.to_string()))
}

pub fn decode_categories(rows: Vec<Row>) -> Result<Vec<Category>, DecodeError> {
    rows.into_iter()
        .map(|row| {
            let r: CategoryRow = decode_row(Table::Categories, row)?;
            Ok(Category {
                id: r.id,
                name: r.name,
            })
        })
        .collect()
}

pub fn decode_locations(rows: Vec<Row>) -> Result<Vec<Location>, DecodeError> {
    rows.into_iter()
        .map(|row| {
            let r: LocationRow = decode_row(Table::Locations, row)?;
            Ok(Location {
                id: r.id,
                name: r.name,
                icon: r.icon,
            })
        })
        .collect()
}

pub fn decode_products(rows: Vec<Row>) -> Result<Vec<Product>, DecodeError> {
    rows.into_iter()
        .map(|row| {
            let r: ProductRow = decode_row(Table::Products, row)?;
            let ean = r.ean.filter(|e| !e.trim().is_empty());
            Ok(Product::new(r.id, r.name, ean, r.category_id))
        })
        .collect()
}

/// A stored lot with a non-positive quantity is malformed, not empty.
pub fn decode_lots(rows: Vec<Row>) -> Result<Vec<Lot>, DecodeError> {
    rows.into_iter()
        .map(|row| {
            let r: LotRow = decode_row(Table::Inventory, row)?;
            let quantity = Quantity::from_i64(r.quantity)
                .map_err(|e| DecodeError::new(Table::Inventory, format!("lot {}: {e}", r.id)))?;
            Ok(Lot {
                id: r.id,
                product_id: r.product_id,
                location_id: r.location_id,
                quantity,
                expiry: r.expiry_date,
            })
        })
        .collect()
}

fn text(value: impl ToString) -> JsonValue {
    JsonValue::String(value.to_string())
}

fn optional(value: Option<impl ToString>) -> JsonValue {
    value.map_or(JsonValue::Null, text)
}

pub fn encode_category(user_id: UserId, category: &Category) -> Row {
    let mut row = Row::new();
    row.insert("id".into(), text(category.id));
    row.insert("user_id".into(), text(user_id));
    row.insert("name".into(), text(&category.name));
    row
}

pub fn encode_location(user_id: UserId, location: &Location) -> Row {
    let mut row = Row::new();
    row.insert("id".into(), text(location.id));
    row.insert("user_id".into(), text(user_id));
    row.insert("name".into(), text(&location.name));
    row.insert("icon".into(), text(&location.icon));
    row
}

pub fn encode_product(user_id: UserId, product: &Product) -> Row {
    let mut row = product_patch(product.name(), product.ean(), product.category_id());
    row.insert("id".into(), text(product.id_typed()));
    row.insert("user_id".into(), text(user_id));
    row
}

pub fn encode_lot(user_id: UserId, lot: &Lot) -> Row {
    let mut row = Row::new();
    row.insert("id".into(), text(lot.id));
    row.insert("user_id".into(), text(user_id));
    row.insert("product_id".into(), text(lot.product_id));
    row.insert("location_id".into(), optional(lot.location_id));
    row.insert("quantity".into(), JsonValue::from(lot.quantity.get()));
    row.insert("expiry_date".into(), optional(lot.expiry));
    row
}

pub fn product_patch(name: &str, ean: Option<&str>, category_id: Option<CategoryId>) -> Row {
    let mut row = Row::new();
    row.insert("name".into(), text(name));
    row.insert("ean".into(), optional(ean));
    row.insert("category_id".into(), optional(category_id));
    row
}

pub fn quantity_patch(quantity: Quantity) -> Row {
    let mut row = Row::new();
    row.insert("quantity".into(), JsonValue::from(quantity.get()));
    row
}

pub fn lot_patch(location_id: LocationId, quantity: Quantity, expiry: Option<NaiveDate>) -> Row {
    let mut row = quantity_patch(quantity);
    row.insert("location_id".into(), text(location_id));
    row.insert("expiry_date".into(), optional(expiry));
    row
}
