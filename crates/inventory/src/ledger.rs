//! The session's lot store.

use std::collections::HashMap;

use pantry_core::{
    Aggregate, AggregateRoot, CategoryId, DomainError, DomainResult, LocationId, LotId, ProductId,
    Quantity, UserId, find_by_id,
};

use crate::catalog::{Catalog, Category, Location, LocationStat};
use crate::command::{
    AddCategory, AddLocation, AddStock, EditLot, LedgerChange, LedgerCommand, ProductRef,
    UpdateProduct,
};
use crate::filter::ProductFilter;
use crate::lot::{Lot, LotKey};
use crate::product::Product;

/// Result of planning an `AddStock` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddStockOutcome {
    pub product_id: ProductId,
    pub lot_id: LotId,
    /// The product did not exist and will be registered.
    pub product_created: bool,
    /// The quantity was added to an existing lot.
    pub merged: bool,
    pub changes: Vec<LedgerChange>,
}

/// In-memory products, lots and catalog for one user session.
///
/// All mutations go through `handle` (validate + decide) and `apply` (mutate).
/// The convenience methods (`add_or_merge_lot`, `remove_lot`, ...) do both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryLedger {
    user_id: UserId,
    catalog: Catalog,
    products: Vec<Product>,
    version: u64,
}

impl InventoryLedger {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            catalog: Catalog::default(),
            products: Vec::new(),
            version: 0,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, product_id: ProductId) -> Option<&Product> {
        find_by_id(&self.products, &product_id)
    }

    /// Finds a lot and the product owning it.
    pub fn find_lot(&self, lot_id: LotId) -> Option<(&Product, &Lot)> {
        self.products
            .iter()
            .find_map(|p| p.lot(lot_id).map(|lot| (p, lot)))
    }

    /// Replace the whole state with freshly loaded records.
    ///
    /// Lots are joined onto their products in memory. Returns the number of
    /// lots dropped because their product is unknown.
    pub fn replace_all(
        &mut self,
        categories: Vec<Category>,
        locations: Vec<Location>,
        products: Vec<Product>,
        lots: Vec<Lot>,
    ) -> usize {
        let mut products = products;
        let index: HashMap<ProductId, usize> = products
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id_typed(), idx))
            .collect();

        let mut orphaned = 0;
        for lot in lots {
            match index.get(&lot.product_id).and_then(|idx| products.get_mut(*idx)) {
                Some(product) => product.lots_mut().push(lot),
                None => orphaned += 1,
            }
        }

        self.catalog = Catalog::new(categories, locations);
        self.products = products;
        self.version = 0;
        orphaned
    }

    pub fn location_stats(&self) -> Vec<LocationStat<'_>> {
        self.catalog.location_stats(&self.products)
    }

    pub fn filter_products(&self, filter: &ProductFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p)).collect()
    }

    /// Validate and decide, then apply every change. Returns the applied changes.
    pub fn execute(&mut self, command: &LedgerCommand) -> DomainResult<Vec<LedgerChange>> {
        let changes = self.handle(command)?;
        for change in &changes {
            self.apply(change);
        }
        Ok(changes)
    }

    /// Add `quantity` of a product at a location, merging into the lot with the
    /// same (location, expiry) when one exists.
    pub fn add_or_merge_lot(&mut self, command: AddStock) -> DomainResult<(ProductId, LotId)> {
        let outcome = self.plan_add_stock(&command)?;
        for change in &outcome.changes {
            self.apply(change);
        }
        Ok((outcome.product_id, outcome.lot_id))
    }

    pub fn remove_lot(&mut self, lot_id: LotId) -> DomainResult<()> {
        self.execute(&LedgerCommand::RemoveLot { lot_id }).map(|_| ())
    }

    /// Overwrite a lot in place. Does not merge, so it can leave two lots with
    /// the same (location, expiry); see `consolidate`.
    pub fn edit_lot(&mut self, command: EditLot) -> DomainResult<()> {
        self.execute(&LedgerCommand::EditLot(command)).map(|_| ())
    }

    /// Merge lots of a product sharing (location, expiry). Returns how many
    /// lots were folded into another.
    pub fn consolidate(&mut self, product_id: ProductId) -> DomainResult<usize> {
        let changes = self.execute(&LedgerCommand::Consolidate { product_id })?;
        Ok(changes
            .iter()
            .filter(|c| matches!(c, LedgerChange::LotRemoved { .. }))
            .count())
    }

    pub fn plan_add_stock(&self, cmd: &AddStock) -> DomainResult<AddStockOutcome> {
        let quantity = Quantity::new(cmd.quantity)?;
        self.require_location(cmd.location_id)?;

        let mut changes = Vec::new();
        let (product, product_created) = match &cmd.product {
            ProductRef::Existing(product_id) => (Some(self.require_product(*product_id)?), false),
            ProductRef::Draft(draft) => {
                let (name, ean) = normalize_details(&draft.name, draft.ean.as_deref())?;
                self.require_category(draft.category_id)?;
                match self.resolve_draft(&name, ean.as_deref(), draft.category_id) {
                    Some(existing) => (Some(existing), false),
                    None => {
                        changes.push(LedgerChange::ProductRegistered(Product::new(
                            cmd.new_product_id,
                            name,
                            ean,
                            draft.category_id,
                        )));
                        (None, true)
                    }
                }
            }
        };

        let product_id = product.map_or(cmd.new_product_id, Product::id_typed);
        let existing_lot =
            product.and_then(|p| p.lots().iter().find(|l| l.matches(cmd.location_id, cmd.expiry)));

        let (lot_id, merged) = match existing_lot {
            Some(lot) => {
                changes.push(LedgerChange::LotQuantitySet {
                    product_id,
                    lot_id: lot.id,
                    quantity: lot.quantity.checked_add(quantity)?,
                });
                (lot.id, true)
            }
            None => {
                changes.push(LedgerChange::LotOpened(Lot {
                    id: cmd.new_lot_id,
                    product_id,
                    location_id: Some(cmd.location_id),
                    quantity,
                    expiry: cmd.expiry,
                }));
                (cmd.new_lot_id, false)
            }
        };

        Ok(AddStockOutcome {
            product_id,
            lot_id,
            product_created,
            merged,
            changes,
        })
    }

    /// Barcode match first, then exact (name, category).
    fn resolve_draft(
        &self,
        name: &str,
        ean: Option<&str>,
        category_id: Option<CategoryId>,
    ) -> Option<&Product> {
        ean.and_then(|ean| self.products.iter().find(|p| p.ean() == Some(ean)))
            .or_else(|| {
                self.products
                    .iter()
                    .find(|p| p.name() == name && p.category_id() == category_id)
            })
    }

    pub(crate) fn require_product(&self, product_id: ProductId) -> DomainResult<&Product> {
        self.product(product_id)
            .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))
    }

    pub(crate) fn require_lot(&self, lot_id: LotId) -> DomainResult<(&Product, &Lot)> {
        self.find_lot(lot_id)
            .ok_or_else(|| DomainError::not_found(format!("lot {lot_id}")))
    }

    pub(crate) fn require_location(&self, location_id: LocationId) -> DomainResult<&Location> {
        self.catalog
            .location(location_id)
            .ok_or_else(|| DomainError::not_found(format!("location {location_id}")))
    }

    fn require_category(&self, category_id: Option<CategoryId>) -> DomainResult<()> {
        match category_id {
            Some(id) if self.catalog.category(id).is_none() => {
                Err(DomainError::not_found(format!("category {id}")))
            }
            _ => Ok(()),
        }
    }

    fn handle_remove_lot(&self, lot_id: LotId) -> DomainResult<Vec<LedgerChange>> {
        let (product, lot) = self.require_lot(lot_id)?;
        Ok(vec![LedgerChange::LotRemoved {
            product_id: product.id_typed(),
            lot_id: lot.id,
        }])
    }

    fn handle_edit_lot(&self, cmd: &EditLot) -> DomainResult<Vec<LedgerChange>> {
        let quantity = Quantity::new(cmd.quantity)?;
        let (product, lot) = self.require_lot(cmd.lot_id)?;
        self.require_location(cmd.location_id)?;
        Ok(vec![LedgerChange::LotEdited {
            product_id: product.id_typed(),
            lot_id: lot.id,
            location_id: cmd.location_id,
            quantity,
            expiry: cmd.expiry,
        }])
    }

    fn handle_consolidate(&self, product_id: ProductId) -> DomainResult<Vec<LedgerChange>> {
        let product = self.require_product(product_id)?;

        // First lot of each key survives and absorbs the rest.
        let mut groups: Vec<(LotKey, &Lot, Vec<&Lot>)> = Vec::new();
        for lot in product.lots() {
            match groups.iter_mut().find(|(key, _, _)| *key == lot.key()) {
                Some((_, _, absorbed)) => absorbed.push(lot),
                None => groups.push((lot.key(), lot, Vec::new())),
            }
        }

        let mut changes = Vec::new();
        for (_, survivor, absorbed) in groups.into_iter().filter(|(_, _, a)| !a.is_empty()) {
            let mut total = survivor.quantity;
            for lot in &absorbed {
                total = total.checked_add(lot.quantity)?;
            }
            changes.push(LedgerChange::LotQuantitySet {
                product_id,
                lot_id: survivor.id,
                quantity: total,
            });
            changes.extend(absorbed.into_iter().map(|lot| LedgerChange::LotRemoved {
                product_id,
                lot_id: lot.id,
            }));
        }
        Ok(changes)
    }

    fn handle_update_product(&self, cmd: &UpdateProduct) -> DomainResult<Vec<LedgerChange>> {
        self.require_product(cmd.product_id)?;
        let (name, ean) = normalize_details(&cmd.name, cmd.ean.as_deref())?;
        self.require_category(cmd.category_id)?;

        if let Some(ean) = ean.as_deref() {
            let taken = self
                .products
                .iter()
                .any(|p| p.id_typed() != cmd.product_id && p.ean() == Some(ean));
            if taken {
                return Err(DomainError::invariant(format!(
                    "barcode {ean} already belongs to another product"
                )));
            }
        }

        Ok(vec![LedgerChange::ProductUpdated {
            product_id: cmd.product_id,
            name,
            ean,
            category_id: cmd.category_id,
        }])
    }

    fn handle_add_category(&self, cmd: &AddCategory) -> DomainResult<Vec<LedgerChange>> {
        let name = required(&cmd.name, "category name")?;
        Ok(vec![LedgerChange::CategoryAdded(Category {
            id: cmd.category_id,
            name,
        })])
    }

    fn handle_add_location(&self, cmd: &AddLocation) -> DomainResult<Vec<LedgerChange>> {
        let name = required(&cmd.name, "location name")?;
        let icon = required(&cmd.icon, "location icon")?;
        Ok(vec![LedgerChange::LocationAdded(Location {
            id: cmd.location_id,
            name,
            icon,
        })])
    }

    fn lot_mut(&mut self, product_id: ProductId, lot_id: LotId) -> Option<&mut Lot> {
        self.products
            .iter_mut()
            .find(|p| p.id_typed() == product_id)
            .and_then(|p| p.lots_mut().iter_mut().find(|l| l.id == lot_id))
    }
}

impl AggregateRoot for InventoryLedger {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.user_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for InventoryLedger {
    type Command = LedgerCommand;
    type Change = LedgerChange;
    type Error = DomainError;

    fn apply(&mut self, change: &Self::Change) {
        match change {
            LedgerChange::ProductRegistered(product) => {
                if self.product(product.id_typed()).is_none() {
                    self.products.push(product.header());
                }
            }
            LedgerChange::ProductUpdated {
                product_id,
                name,
                ean,
                category_id,
            } => {
                if let Some(product) = self.products.iter_mut().find(|p| p.id_typed() == *product_id) {
                    product.set_details(name.clone(), ean.clone(), *category_id);
                }
            }
            LedgerChange::ProductDeleted { product_id } => {
                self.products.retain(|p| p.id_typed() != *product_id);
            }
            LedgerChange::LotOpened(lot) => {
                if let Some(product) = self.products.iter_mut().find(|p| p.id_typed() == lot.product_id) {
                    product.lots_mut().push(lot.clone());
                }
            }
            LedgerChange::LotQuantitySet {
                product_id,
                lot_id,
                quantity,
            } => {
                if let Some(lot) = self.lot_mut(*product_id, *lot_id) {
                    lot.quantity = *quantity;
                }
            }
            LedgerChange::LotRemoved { product_id, lot_id } => {
                if let Some(product) = self.products.iter_mut().find(|p| p.id_typed() == *product_id) {
                    product.lots_mut().retain(|l| l.id != *lot_id);
                }
            }
            LedgerChange::LotEdited {
                product_id,
                lot_id,
                location_id,
                quantity,
                expiry,
            } => {
                if let Some(lot) = self.lot_mut(*product_id, *lot_id) {
                    lot.location_id = Some(*location_id);
                    lot.quantity = *quantity;
                    lot.expiry = *expiry;
                }
            }
            LedgerChange::CategoryAdded(category) => self.catalog.push_category(category.clone()),
            LedgerChange::CategoryDeleted { category_id } => {
                self.catalog.remove_category(*category_id);
            }
            LedgerChange::LocationAdded(location) => self.catalog.push_location(location.clone()),
            LedgerChange::LocationDeleted { location_id } => {
                self.catalog.remove_location(*location_id);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Change>, Self::Error> {
        match command {
            LedgerCommand::AddStock(cmd) => self.plan_add_stock(cmd).map(|o| o.changes),
            LedgerCommand::RemoveLot { lot_id } => self.handle_remove_lot(*lot_id),
            LedgerCommand::EditLot(cmd) => self.handle_edit_lot(cmd),
            LedgerCommand::Transfer(cmd) => self.plan_transfer(cmd).map(|plan| plan.changes()),
            LedgerCommand::Consolidate { product_id } => self.handle_consolidate(*product_id),
            LedgerCommand::UpdateProduct(cmd) => self.handle_update_product(cmd),
            LedgerCommand::DeleteProduct { product_id } => {
                self.require_product(*product_id)?;
                Ok(vec![LedgerChange::ProductDeleted {
                    product_id: *product_id,
                }])
            }
            LedgerCommand::AddCategory(cmd) => self.handle_add_category(cmd),
            LedgerCommand::DeleteCategory { category_id } => {
                self.require_category(Some(*category_id))?;
                Ok(vec![LedgerChange::CategoryDeleted {
                    category_id: *category_id,
                }])
            }
            LedgerCommand::AddLocation(cmd) => self.handle_add_location(cmd),
            LedgerCommand::DeleteLocation { location_id } => {
                self.require_location(*location_id)?;
                Ok(vec![LedgerChange::LocationDeleted {
                    location_id: *location_id,
                }])
            }
        }
    }
}

fn required(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trimmed name (required) and barcode (blank means none).
fn normalize_details(name: &str, ean: Option<&str>) -> DomainResult<(String, Option<String>)> {
    let name = required(name, "product name")?;
    let ean = ean
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);
    Ok((name, ean))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::command::ProductDraft;
    use chrono::NaiveDate;

    pub(crate) struct Fixture {
        pub ledger: InventoryLedger,
        pub fridge: LocationId,
        pub pantry: LocationId,
        pub dairy: CategoryId,
    }

    pub(crate) fn fixture() -> Fixture {
        let fridge = LocationId::new();
        let pantry = LocationId::new();
        let dairy = CategoryId::new();
        let mut ledger = InventoryLedger::new(UserId::new());
        ledger.replace_all(
            vec![Category {
                id: dairy,
                name: "Dairy".to_string(),
            }],
            vec![
                Location {
                    id: fridge,
                    name: "Fridge".to_string(),
                    icon: "🧊".to_string(),
                },
                Location {
                    id: pantry,
                    name: "Pantry".to_string(),
                    icon: "🥫".to_string(),
                },
            ],
            vec![],
            vec![],
        );
        Fixture {
            ledger,
            fridge,
            pantry,
            dairy,
        }
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn milk(category: CategoryId) -> ProductRef {
        ProductRef::Draft(ProductDraft::new(
            "Milk",
            Some("8001234567890".to_string()),
            Some(category),
        ))
    }

    #[test]
    fn add_creates_product_and_lot() {
        let mut f = fixture();
        let cmd = AddStock::new(milk(f.dairy), f.fridge, 6, Some(date(2025, 1, 10)));
        let expected_product = cmd.new_product_id;
        let expected_lot = cmd.new_lot_id;

        let (product_id, lot_id) = f.ledger.add_or_merge_lot(cmd).unwrap();

        assert_eq!(product_id, expected_product);
        assert_eq!(lot_id, expected_lot);
        let product = f.ledger.product(product_id).unwrap();
        assert_eq!(product.name(), "Milk");
        assert_eq!(product.lots().len(), 1);
        assert_eq!(product.total_quantity(), 6);
    }

    #[test]
    fn adding_to_matching_lot_merges_quantities() {
        let mut f = fixture();
        let expiry = Some(date(2025, 1, 10));
        let (product_id, first_lot) = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 6, expiry))
            .unwrap();

        let (same_product, merged_lot) = f
            .ledger
            .add_or_merge_lot(AddStock::new(ProductRef::Existing(product_id), f.fridge, 5, expiry))
            .unwrap();

        assert_eq!(same_product, product_id);
        assert_eq!(merged_lot, first_lot);
        let product = f.ledger.product(product_id).unwrap();
        assert_eq!(product.lots().len(), 1);
        assert_eq!(product.lots()[0].quantity.get(), 11);
    }

    #[test]
    fn different_expiry_opens_a_new_lot() {
        let mut f = fixture();
        let (product_id, _) = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 6, Some(date(2025, 1, 10))))
            .unwrap();
        f.ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 2, None))
            .unwrap();

        let product = f.ledger.product(product_id).unwrap();
        assert_eq!(product.lots().len(), 2);
        assert_eq!(product.total_quantity(), 8);
    }

    #[test]
    fn missing_expiry_matches_missing_expiry() {
        let mut f = fixture();
        let (product_id, first) = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.pantry, 1, None))
            .unwrap();
        let (_, second) = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.pantry, 1, None))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(f.ledger.product(product_id).unwrap().total_quantity(), 2);
    }

    #[test]
    fn draft_resolves_by_barcode_before_name() {
        let mut f = fixture();
        let (product_id, _) = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 1, None))
            .unwrap();

        // Different name, same barcode: still the same product.
        let renamed = ProductRef::Draft(ProductDraft::new(
            "Whole milk",
            Some(" 8001234567890 ".to_string()),
            None,
        ));
        let (resolved, _) = f
            .ledger
            .add_or_merge_lot(AddStock::new(renamed, f.pantry, 1, None))
            .unwrap();

        assert_eq!(resolved, product_id);
        assert_eq!(f.ledger.products().len(), 1);
    }

    #[test]
    fn draft_resolves_by_name_and_category_without_barcode() {
        let mut f = fixture();
        let draft = || ProductRef::Draft(ProductDraft::new("Butter", None, Some(f.dairy)));
        let (first, _) = f
            .ledger
            .add_or_merge_lot(AddStock::new(draft(), f.fridge, 1, None))
            .unwrap();
        let (second, _) = f
            .ledger
            .add_or_merge_lot(AddStock::new(draft(), f.fridge, 1, None))
            .unwrap();
        assert_eq!(first, second);

        // Same name, no category: a different product.
        let uncategorised = ProductRef::Draft(ProductDraft::new("Butter", None, None));
        let (third, _) = f
            .ledger
            .add_or_merge_lot(AddStock::new(uncategorised, f.fridge, 1, None))
            .unwrap();
        assert_ne!(first, third);
    }

    #[test]
    fn add_rejects_zero_quantity_and_unknown_location() {
        let mut f = fixture();
        let err = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 0, None))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), LocationId::new(), 1, None))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(f.ledger.products().is_empty());
    }

    #[test]
    fn add_rejects_blank_name() {
        let f = fixture();
        let draft = ProductRef::Draft(ProductDraft::new("  ", None, None));
        let err = f
            .ledger
            .plan_add_stock(&AddStock::new(draft, f.fridge, 1, None))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn remove_lot_deletes_it_and_unknown_ids_fail() {
        let mut f = fixture();
        let (product_id, lot_id) = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 3, None))
            .unwrap();

        f.ledger.remove_lot(lot_id).unwrap();
        assert!(f.ledger.product(product_id).unwrap().lots().is_empty());

        let err = f.ledger.remove_lot(lot_id).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn edit_overwrites_without_merging_and_consolidate_repairs() {
        let mut f = fixture();
        let (product_id, fridge_lot) = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 3, None))
            .unwrap();
        let (_, pantry_lot) = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.pantry, 2, None))
            .unwrap();

        f.ledger
            .edit_lot(EditLot {
                lot_id: pantry_lot,
                quantity: 4,
                expiry: None,
                location_id: f.fridge,
            })
            .unwrap();

        let product = f.ledger.product(product_id).unwrap();
        assert_eq!(product.lots().len(), 2, "edit must not merge");
        assert_eq!(product.total_quantity(), 7);

        let folded = f.ledger.consolidate(product_id).unwrap();
        assert_eq!(folded, 1);
        let product = f.ledger.product(product_id).unwrap();
        assert_eq!(product.lots().len(), 1);
        assert_eq!(product.lots()[0].id, fridge_lot);
        assert_eq!(product.lots()[0].quantity.get(), 7);
    }

    #[test]
    fn update_product_rejects_barcode_of_another_product() {
        let mut f = fixture();
        f.ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 1, None))
            .unwrap();
        let (bread, _) = f
            .ledger
            .add_or_merge_lot(AddStock::new(
                ProductRef::Draft(ProductDraft::new("Bread", None, None)),
                f.pantry,
                1,
                None,
            ))
            .unwrap();

        let err = f
            .ledger
            .execute(&LedgerCommand::UpdateProduct(UpdateProduct {
                product_id: bread,
                name: "Bread".to_string(),
                ean: Some("8001234567890".to_string()),
                category_id: None,
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn delete_product_cascades_its_lots() {
        let mut f = fixture();
        let (product_id, lot_id) = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 1, None))
            .unwrap();

        f.ledger
            .execute(&LedgerCommand::DeleteProduct { product_id })
            .unwrap();

        assert!(f.ledger.product(product_id).is_none());
        assert!(f.ledger.find_lot(lot_id).is_none());
    }

    #[test]
    fn deleting_a_category_keeps_products_referencing_it() {
        let mut f = fixture();
        let (product_id, _) = f
            .ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 1, None))
            .unwrap();

        f.ledger
            .execute(&LedgerCommand::DeleteCategory {
                category_id: f.dairy,
            })
            .unwrap();

        let product = f.ledger.product(product_id).unwrap();
        assert_eq!(product.category_id(), Some(f.dairy));
        assert!(f.ledger.catalog().category(f.dairy).is_none());
    }

    #[test]
    fn catalog_commands_validate_names() {
        let mut f = fixture();
        let err = f
            .ledger
            .execute(&LedgerCommand::AddLocation(AddLocation::new("Garage", " ")))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        f.ledger
            .execute(&LedgerCommand::AddCategory(AddCategory::new(" Snacks ")))
            .unwrap();
        assert!(f.ledger.catalog().categories().iter().any(|c| c.name == "Snacks"));
    }

    #[test]
    fn location_stats_count_lots_per_location() {
        let mut f = fixture();
        f.ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 1, None))
            .unwrap();
        f.ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 1, Some(date(2030, 1, 1))))
            .unwrap();

        let stats = f.ledger.location_stats();
        let count = |id| stats.iter().find(|s| s.location.id == id).unwrap().lots;
        assert_eq!(count(f.fridge), 2);
        assert_eq!(count(f.pantry), 0);
    }

    #[test]
    fn filter_matches_name_barcode_category_and_location() {
        let mut f = fixture();
        f.ledger
            .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, 1, None))
            .unwrap();
        f.ledger
            .add_or_merge_lot(AddStock::new(
                ProductRef::Draft(ProductDraft::new("Rice", None, None)),
                f.pantry,
                1,
                None,
            ))
            .unwrap();

        let by_name = ProductFilter {
            search: "MIL".to_string(),
            ..ProductFilter::default()
        };
        assert_eq!(f.ledger.filter_products(&by_name).len(), 1);

        let by_barcode = ProductFilter {
            search: "80012".to_string(),
            ..ProductFilter::default()
        };
        assert_eq!(f.ledger.filter_products(&by_barcode)[0].name(), "Milk");

        let by_location = ProductFilter {
            location_id: Some(f.pantry),
            ..ProductFilter::default()
        };
        assert_eq!(f.ledger.filter_products(&by_location)[0].name(), "Rice");

        let by_category = ProductFilter {
            category_id: Some(f.dairy),
            ..ProductFilter::default()
        };
        assert_eq!(f.ledger.filter_products(&by_category).len(), 1);
    }

    #[test]
    fn replace_all_joins_lots_and_counts_orphans() {
        let product = Product::new(ProductId::new(), "Tea", None, None);
        let location = LocationId::new();
        let lot = |product_id| Lot {
            id: LotId::new(),
            product_id,
            location_id: Some(location),
            quantity: Quantity::new(2).unwrap(),
            expiry: None,
        };
        let mut ledger = InventoryLedger::new(UserId::new());

        let orphaned = ledger.replace_all(
            vec![],
            vec![],
            vec![product.clone()],
            vec![lot(product.id_typed()), lot(ProductId::new())],
        );

        assert_eq!(orphaned, 1);
        assert_eq!(ledger.products()[0].lots().len(), 1);
        assert_eq!(ledger.version(), 0);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let f = fixture();
        let before = f.ledger.clone();
        let _ = f
            .ledger
            .handle(&LedgerCommand::AddStock(AddStock::new(milk(f.dairy), f.fridge, 1, None)))
            .unwrap();
        assert_eq!(before, f.ledger);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: no two lots of a product share (location, expiry) after any
            /// sequence of additions, and the total equals the sum added.
            #[test]
            fn additions_never_duplicate_lot_keys(
                adds in prop::collection::vec((any::<bool>(), 0u32..3, 1u32..50), 1..40)
            ) {
                let mut f = fixture();
                let mut added: u64 = 0;
                for (in_fridge, expiry_choice, qty) in adds {
                    let location = if in_fridge { f.fridge } else { f.pantry };
                    let expiry = match expiry_choice {
                        0 => None,
                        1 => Some(date(2025, 1, 10)),
                        _ => Some(date(2025, 2, 1)),
                    };
                    f.ledger.add_or_merge_lot(AddStock::new(milk(f.dairy), location, qty, expiry)).unwrap();
                    added += u64::from(qty);
                }

                prop_assert_eq!(f.ledger.products().len(), 1);
                let product = &f.ledger.products()[0];
                prop_assert_eq!(product.total_quantity(), added);
                let mut keys: Vec<LotKey> = product.lots().iter().map(Lot::key).collect();
                let before = keys.len();
                keys.sort_by_key(|k| (k.location_id.map(|l| *l.as_uuid()), k.expiry));
                keys.dedup();
                prop_assert_eq!(keys.len(), before);
            }

            /// Property: consolidate preserves total quantity and leaves unique keys.
            #[test]
            fn consolidate_preserves_total(
                edits in prop::collection::vec((any::<bool>(), 1u32..20), 1..10)
            ) {
                let mut f = fixture();
                let mut lot_ids = Vec::new();
                for (idx, (_, qty)) in edits.iter().enumerate() {
                    let expiry = Some(date(2026, 1, 1) + chrono::Days::new(idx as u64));
                    let (_, lot) = f.ledger
                        .add_or_merge_lot(AddStock::new(milk(f.dairy), f.fridge, *qty, expiry))
                        .unwrap();
                    lot_ids.push(lot);
                }
                // Collapse some lots onto the same key via in-place edits.
                for ((collapse, qty), lot_id) in edits.iter().zip(&lot_ids) {
                    if *collapse {
                        f.ledger.edit_lot(EditLot {
                            lot_id: *lot_id,
                            quantity: *qty,
                            expiry: None,
                            location_id: f.pantry,
                        }).unwrap();
                    }
                }
                let product_id = f.ledger.products()[0].id_typed();
                let total_before = f.ledger.products()[0].total_quantity();

                f.ledger.consolidate(product_id).unwrap();

                let product = f.ledger.product(product_id).unwrap();
                prop_assert_eq!(product.total_quantity(), total_before);
                let keys: Vec<LotKey> = product.lots().iter().map(Lot::key).collect();
                for (i, a) in keys.iter().enumerate() {
                    for b in keys.iter().skip(i + 1) {
                        prop_assert_ne!(a, b);
                    }
                }
            }
        }
    }
}
