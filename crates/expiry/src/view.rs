//! One row per lot, annotated with its urgency, plus column sorting.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, LotId, ProductId};
use pantry_inventory::{Catalog, Product};

use crate::bucket::{UrgencyBucket, classify, days_until};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryRow {
    pub product_id: ProductId,
    pub lot_id: LotId,
    pub product_name: String,
    pub ean: Option<String>,
    /// `None` when the product has no category or it was deleted.
    pub category: Option<String>,
    pub location: Option<String>,
    pub location_icon: Option<String>,
    pub quantity: u32,
    pub expiry: Option<NaiveDate>,
    pub days_until_expiry: Option<i64>,
    pub bucket: UrgencyBucket,
}

/// Expand products into one row per lot, in product then lot order.
pub fn flatten(products: &[Product], catalog: &Catalog, as_of: NaiveDate) -> Vec<ExpiryRow> {
    products
        .iter()
        .flat_map(|product| {
            let category = product
                .category_id()
                .and_then(|id| catalog.category(id))
                .map(|c| c.name.clone());
            product.lots().iter().map(move |lot| {
                let location = lot.location_id.and_then(|id| catalog.location(id));
                ExpiryRow {
                    product_id: product.id_typed(),
                    lot_id: lot.id,
                    product_name: product.name().to_string(),
                    ean: product.ean().map(str::to_string),
                    category: category.clone(),
                    location: location.map(|l| l.name.clone()),
                    location_icon: location.map(|l| l.icon.clone()),
                    quantity: lot.quantity.get(),
                    expiry: lot.expiry,
                    days_until_expiry: lot.expiry.map(|d| days_until(d, as_of)),
                    bucket: classify(lot.expiry, as_of),
                }
            })
        })
        .collect()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    Product,
    Category,
    Location,
    Quantity,
    Expiry,
}

impl FromStr for SortColumn {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "product" => Ok(SortColumn::Product),
            "category" => Ok(SortColumn::Category),
            "location" => Ok(SortColumn::Location),
            "quantity" => Ok(SortColumn::Quantity),
            "expiry" => Ok(SortColumn::Expiry),
            other => Err(DomainError::validation(format!(
                "unknown sort column '{other}' (expected product, category, location, quantity or expiry)"
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Stable sort. Text columns compare case-insensitively with missing values as
/// the empty string; lots without expiry sort after every dated lot.
pub fn sort_by(rows: &mut [ExpiryRow], column: SortColumn, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = compare(a, b, column);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare(a: &ExpiryRow, b: &ExpiryRow, column: SortColumn) -> Ordering {
    fn text(value: Option<&str>) -> String {
        value.unwrap_or_default().to_lowercase()
    }

    match column {
        SortColumn::Product => {
            text(Some(a.product_name.as_str())).cmp(&text(Some(b.product_name.as_str())))
        }
        SortColumn::Category => text(a.category.as_deref()).cmp(&text(b.category.as_deref())),
        SortColumn::Location => text(a.location.as_deref()).cmp(&text(b.location.as_deref())),
        SortColumn::Quantity => a.quantity.cmp(&b.quantity),
        SortColumn::Expiry => (a.expiry.is_none(), a.expiry).cmp(&(b.expiry.is_none(), b.expiry)),
    }
}

/// Current dashboard sort, toggled by selecting a column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::Expiry,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    /// Same column flips the direction; another column starts ascending.
    pub fn select(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn sort(&self, rows: &mut [ExpiryRow]) {
        sort_by(rows, self.column, self.direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{CategoryId, LocationId, Quantity, UserId};
    use pantry_inventory::{
        AddStock, Category, InventoryLedger, Location, ProductDraft, ProductRef,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(name: &str, location: Option<&str>, quantity: u32, expiry: Option<NaiveDate>) -> ExpiryRow {
        ExpiryRow {
            product_id: ProductId::new(),
            lot_id: LotId::new(),
            product_name: name.to_string(),
            ean: None,
            category: None,
            location: location.map(str::to_string),
            location_icon: None,
            quantity,
            expiry,
            days_until_expiry: None,
            bucket: UrgencyBucket::None,
        }
    }

    fn names(rows: &[ExpiryRow]) -> Vec<&str> {
        rows.iter().map(|r| r.product_name.as_str()).collect()
    }

    #[test]
    fn flatten_emits_one_row_per_lot_with_resolved_names() {
        let fridge = LocationId::new();
        let dairy = CategoryId::new();
        let mut ledger = InventoryLedger::new(UserId::new());
        ledger.replace_all(
            vec![Category { id: dairy, name: "Dairy".to_string() }],
            vec![Location {
                id: fridge,
                name: "Fridge".to_string(),
                icon: "🧊".to_string(),
            }],
            vec![],
            vec![],
        );
        let draft = ProductRef::Draft(ProductDraft::new("Yogurt", Some("123".to_string()), Some(dairy)));
        ledger
            .add_or_merge_lot(AddStock::new(draft.clone(), fridge, 2, Some(date(2025, 1, 12))))
            .unwrap();
        ledger
            .add_or_merge_lot(AddStock::new(draft, fridge, 1, None))
            .unwrap();

        let rows = flatten(ledger.products(), ledger.catalog(), date(2025, 1, 10));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category.as_deref(), Some("Dairy"));
        assert_eq!(rows[0].location.as_deref(), Some("Fridge"));
        assert_eq!(rows[0].location_icon.as_deref(), Some("🧊"));
        assert_eq!(rows[0].ean.as_deref(), Some("123"));
        assert_eq!(rows[0].days_until_expiry, Some(2));
        assert_eq!(rows[0].bucket, UrgencyBucket::Urgent);
        assert_eq!(rows[1].days_until_expiry, None);
        assert_eq!(rows[1].bucket, UrgencyBucket::None);
        assert_eq!(rows[1].quantity, Quantity::new(1).unwrap().get());
    }

    #[test]
    fn expiry_ascending_puts_undated_lots_last() {
        let mut rows = vec![
            row("none", None, 1, None),
            row("late", None, 1, Some(date(2025, 6, 1))),
            row("early", None, 1, Some(date(2025, 1, 1))),
        ];
        sort_by(&mut rows, SortColumn::Expiry, SortDirection::Ascending);
        assert_eq!(names(&rows), ["early", "late", "none"]);

        sort_by(&mut rows, SortColumn::Expiry, SortDirection::Descending);
        assert_eq!(names(&rows), ["none", "late", "early"]);
    }

    #[test]
    fn text_columns_ignore_case_and_missing_sorts_first() {
        let mut rows = vec![
            row("b", Some("pantry"), 1, None),
            row("a", Some("Fridge"), 1, None),
            row("c", None, 1, None),
        ];
        sort_by(&mut rows, SortColumn::Location, SortDirection::Ascending);
        assert_eq!(names(&rows), ["c", "a", "b"]);

        let mut rows = vec![row("banana", None, 1, None), row("Apple", None, 1, None)];
        sort_by(&mut rows, SortColumn::Product, SortDirection::Ascending);
        assert_eq!(names(&rows), ["Apple", "banana"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut rows = vec![
            row("first", None, 5, None),
            row("second", None, 5, None),
            row("small", None, 1, None),
        ];
        sort_by(&mut rows, SortColumn::Quantity, SortDirection::Ascending);
        assert_eq!(names(&rows), ["small", "first", "second"]);

        sort_by(&mut rows, SortColumn::Quantity, SortDirection::Descending);
        assert_eq!(names(&rows), ["first", "second", "small"]);
    }

    #[test]
    fn selecting_columns_toggles_direction() {
        let mut state = SortState::default();
        assert_eq!(state.column, SortColumn::Expiry);

        state.select(SortColumn::Expiry);
        assert_eq!(state.direction, SortDirection::Descending);

        state.select(SortColumn::Quantity);
        assert_eq!(state.column, SortColumn::Quantity);
        assert_eq!(state.direction, SortDirection::Ascending);
    }

    #[test]
    fn sort_column_parses_names() {
        assert_eq!("Category".parse::<SortColumn>().unwrap(), SortColumn::Category);
        assert!("price".parse::<SortColumn>().is_err());
    }
}
