//! Session orchestration: the signed-in user's ledger bound to the remote store.
//!
//! ## Mutation flow
//!
//! ```text
//! Command
//!   ↓
//! 1. Plan against the in-memory ledger (pure; rejects bad input before IO)
//!   ↓
//! 2. Write each planned change to the remote store, in order
//!   ↓
//! 3. Reload everything from the store and replace the ledger
//! ```
//!
//! The ledger is never mutated locally ahead of the store. If the first write
//! fails the ledger is left exactly as it was and the error is returned.
//! Writes that already went through stay in the store and are not rolled back:
//! the session reloads before returning the error, so a transfer whose
//! destination write fails shows its source lot shrunk and a new product whose
//! lot insert fails shows up with no lots.

use tracing::{error, info, warn};

use pantry_core::{
    Aggregate, CategoryId, DomainError, DomainResult, LocationId, LotId, ProductId, UserId,
};
use pantry_inventory::{
    AddCategory, AddLocation, AddStock, AddStockOutcome, EditLot, InventoryLedger, LedgerChange,
    LedgerCommand, Location, LocationStat, Product, ProductFilter, Transfer, TransferPlan,
    UpdateProduct, default_locations,
};

use crate::error::PantryResult;
use crate::remote::{Filter, Order, RemoteError, RemoteStore, Row, Table};
use crate::rows;

/// Session-scoped context, built at sign-in and dropped at sign-out.
#[derive(Debug)]
pub struct PantrySession<S> {
    store: S,
    ledger: InventoryLedger,
}

impl<S> PantrySession<S>
where
    S: RemoteStore,
{
    /// Sign-in: bind the store to `user_id` and load their inventory.
    pub async fn open(store: S, user_id: UserId) -> PantryResult<Self> {
        let mut session = Self {
            store,
            ledger: InventoryLedger::new(user_id),
        };
        session.load().await?;
        info!(user_id = %user_id, "session opened");
        Ok(session)
    }

    /// Sign-out. All cached state goes with the session.
    pub fn close(self) -> S {
        info!(user_id = %self.user_id(), "session closed");
        self.store
    }

    pub fn user_id(&self) -> UserId {
        self.ledger.user_id()
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read every table and replace the ledger wholesale.
    ///
    /// Seeds the default locations for a user who has none. A failed seed does
    /// not fail the load: the error is logged and the user continues with no
    /// locations. Lots come from a single read filtered by owner and are joined
    /// onto products in memory.
    pub async fn load(&mut self) -> PantryResult<()> {
        let user_id = self.user_id();
        let owned = self.owned();
        let by_name = Order::asc("name");

        let mut location_rows = self
            .store
            .select(Table::Locations, &owned, Some(&by_name))
            .await?;
        let mut seed_error = None;
        if location_rows.is_empty() {
            match self.seed_default_locations().await {
                Ok(()) => {
                    location_rows = self
                        .store
                        .select(Table::Locations, &owned, Some(&by_name))
                        .await?;
                }
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "failed to seed default locations");
                    seed_error = Some(e.to_string());
                }
            }
        }
        let locations = rows::decode_locations(location_rows)?;

        let categories = rows::decode_categories(
            self.store
                .select(Table::Categories, &owned, Some(&by_name))
                .await?,
        )?;
        let products = rows::decode_products(
            self.store
                .select(Table::Products, &owned, Some(&Order::desc("created_at")))
                .await?,
        )?;
        let lots = rows::decode_lots(self.store.select(Table::Inventory, &owned, None).await?)?;

        let counts = (categories.len(), locations.len(), products.len(), lots.len());
        let mut ledger = InventoryLedger::new(user_id);
        let orphaned = ledger.replace_all(categories, locations, products, lots);
        if orphaned > 0 {
            warn!(user_id = %user_id, orphaned, "dropped lots of unknown products");
        }
        self.ledger = ledger;

        info!(
            user_id = %user_id,
            categories = counts.0,
            locations = counts.1,
            products = counts.2,
            lots = counts.3 - orphaned,
            seed_error = ?seed_error,
            "inventory loaded"
        );
        Ok(())
    }

    async fn seed_default_locations(&self) -> Result<(), RemoteError> {
        let user_id = self.user_id();
        let seed: Vec<Row> = default_locations()
            .into_iter()
            .map(|(name, icon)| {
                let location = Location {
                    id: LocationId::new(),
                    name: name.to_string(),
                    icon: icon.to_string(),
                };
                rows::encode_location(user_id, &location)
            })
            .collect();

        self.store.insert(Table::Locations, seed).await?;
        info!(user_id = %user_id, "seeded default locations");
        Ok(())
    }

    /// Add stock, merging into a matching lot and registering the product when
    /// it is new.
    pub async fn add_stock(&mut self, cmd: AddStock) -> PantryResult<AddStockOutcome> {
        let outcome = self.decide("add_stock", self.ledger.plan_add_stock(&cmd))?;
        self.persist("add_stock", &outcome.changes).await?;
        info!(
            user_id = %self.user_id(),
            product_id = %outcome.product_id,
            lot_id = %outcome.lot_id,
            merged = outcome.merged,
            product_created = outcome.product_created,
            "stock added"
        );
        Ok(outcome)
    }

    pub async fn remove_lot(&mut self, lot_id: LotId) -> PantryResult<()> {
        self.execute("remove_lot", LedgerCommand::RemoveLot { lot_id })
            .await
            .map(|_| ())
    }

    /// Overwrite a lot in place; see `consolidate` for folding duplicates.
    pub async fn edit_lot(&mut self, cmd: EditLot) -> PantryResult<()> {
        self.execute("edit_lot", LedgerCommand::EditLot(cmd))
            .await
            .map(|_| ())
    }

    pub async fn transfer(&mut self, cmd: Transfer) -> PantryResult<TransferPlan> {
        let plan = self.decide("transfer", self.ledger.plan_transfer(&cmd))?;
        self.persist("transfer", &plan.changes()).await?;
        info!(
            user_id = %self.user_id(),
            lot_id = %cmd.lot_id,
            destination_lot = %plan.destination_lot(),
            moved = plan.moved.get(),
            "stock transferred"
        );
        Ok(plan)
    }

    /// Returns how many lots were folded into another.
    pub async fn consolidate(&mut self, product_id: ProductId) -> PantryResult<usize> {
        let changes = self
            .execute("consolidate", LedgerCommand::Consolidate { product_id })
            .await?;
        Ok(changes
            .iter()
            .filter(|c| matches!(c, LedgerChange::LotRemoved { .. }))
            .count())
    }

    pub async fn update_product(&mut self, cmd: UpdateProduct) -> PantryResult<()> {
        self.execute("update_product", LedgerCommand::UpdateProduct(cmd))
            .await
            .map(|_| ())
    }

    /// Deletes the product together with its lots.
    pub async fn delete_product(&mut self, product_id: ProductId) -> PantryResult<()> {
        self.execute("delete_product", LedgerCommand::DeleteProduct { product_id })
            .await
            .map(|_| ())
    }

    pub async fn add_category(&mut self, name: &str) -> PantryResult<CategoryId> {
        let cmd = AddCategory::new(name);
        let category_id = cmd.category_id;
        self.execute("add_category", LedgerCommand::AddCategory(cmd))
            .await?;
        Ok(category_id)
    }

    /// Products keep pointing at the deleted category and show as uncategorised.
    pub async fn delete_category(&mut self, category_id: CategoryId) -> PantryResult<()> {
        self.execute("delete_category", LedgerCommand::DeleteCategory { category_id })
            .await
            .map(|_| ())
    }

    pub async fn add_location(&mut self, name: &str, icon: &str) -> PantryResult<LocationId> {
        let cmd = AddLocation::new(name, icon);
        let location_id = cmd.location_id;
        self.execute("add_location", LedgerCommand::AddLocation(cmd))
            .await?;
        Ok(location_id)
    }

    pub async fn delete_location(&mut self, location_id: LocationId) -> PantryResult<()> {
        self.execute("delete_location", LedgerCommand::DeleteLocation { location_id })
            .await
            .map(|_| ())
    }

    pub fn product_details(&self, product_id: ProductId) -> PantryResult<&Product> {
        self.ledger
            .product(product_id)
            .ok_or_else(|| DomainError::not_found(format!("product {product_id}")).into())
    }

    pub fn location_stats(&self) -> Vec<LocationStat<'_>> {
        self.ledger.location_stats()
    }

    pub fn filter_products(&self, filter: &ProductFilter) -> Vec<&Product> {
        self.ledger.filter_products(filter)
    }

    async fn execute(
        &mut self,
        operation: &'static str,
        command: LedgerCommand,
    ) -> PantryResult<Vec<LedgerChange>> {
        let changes = self.decide(operation, self.ledger.handle(&command))?;
        self.persist(operation, &changes).await?;
        Ok(changes)
    }

    fn decide<T>(&self, operation: &'static str, result: DomainResult<T>) -> PantryResult<T> {
        result.map_err(|e| {
            warn!(user_id = %self.user_id(), operation, error = %e, "command rejected");
            e.into()
        })
    }

    /// Write `changes` in order, then reload. Stops at the first failed write.
    ///
    /// Once the store has accepted part of the command the ledger is resynced
    /// before the error is returned, so a retry plans against what the store
    /// really holds.
    async fn persist(&mut self, operation: &'static str, changes: &[LedgerChange]) -> PantryResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        for (written, change) in changes.iter().enumerate() {
            if let Err(e) = self.write(change).await {
                error!(
                    user_id = %self.user_id(),
                    operation,
                    change = change.change_type(),
                    written,
                    error = %e,
                    "remote write failed"
                );
                // A product delete is two requests; the first may have landed.
                let store_touched =
                    written > 0 || matches!(change, LedgerChange::ProductDeleted { .. });
                if store_touched {
                    self.resync(operation).await;
                }
                return Err(e.into());
            }
        }

        if let Err(e) = self.load().await {
            error!(
                user_id = %self.user_id(),
                operation,
                error = %e,
                "reload after write failed"
            );
            self.resync(operation).await;
            return Err(e);
        }
        Ok(())
    }

    /// Best-effort reload after a partly applied command. A second failure
    /// leaves the ledger stale until the next successful `load`.
    async fn resync(&mut self, operation: &'static str) {
        if let Err(e) = self.load().await {
            warn!(
                user_id = %self.user_id(),
                operation,
                error = %e,
                "resync after failed command did not complete"
            );
        }
    }

    async fn write(&self, change: &LedgerChange) -> Result<(), RemoteError> {
        let user_id = self.user_id();
        match change {
            LedgerChange::ProductRegistered(product) => {
                let row = rows::encode_product(user_id, product);
                self.store.insert(Table::Products, vec![row]).await?;
            }
            LedgerChange::ProductUpdated {
                product_id,
                name,
                ean,
                category_id,
            } => {
                let patch = rows::product_patch(name, ean.as_deref(), *category_id);
                self.store
                    .update(Table::Products, patch, &self.by_id(product_id))
                    .await?;
            }
            LedgerChange::ProductDeleted { product_id } => {
                let lots = self.owned().eq("product_id", product_id.to_string());
                self.store.delete(Table::Inventory, &lots).await?;
                self.store
                    .delete(Table::Products, &self.by_id(product_id))
                    .await?;
            }
            LedgerChange::LotOpened(lot) => {
                let row = rows::encode_lot(user_id, lot);
                self.store.insert(Table::Inventory, vec![row]).await?;
            }
            LedgerChange::LotQuantitySet {
                lot_id, quantity, ..
            } => {
                let patch = rows::quantity_patch(*quantity);
                self.store
                    .update(Table::Inventory, patch, &self.by_id(lot_id))
                    .await?;
            }
            LedgerChange::LotRemoved { lot_id, .. } => {
                self.store
                    .delete(Table::Inventory, &self.by_id(lot_id))
                    .await?;
            }
            LedgerChange::LotEdited {
                lot_id,
                location_id,
                quantity,
                expiry,
                ..
            } => {
                let patch = rows::lot_patch(*location_id, *quantity, *expiry);
                self.store
                    .update(Table::Inventory, patch, &self.by_id(lot_id))
                    .await?;
            }
            LedgerChange::CategoryAdded(category) => {
                let row = rows::encode_category(user_id, category);
                self.store.insert(Table::Categories, vec![row]).await?;
            }
            LedgerChange::CategoryDeleted { category_id } => {
                self.store
                    .delete(Table::Categories, &self.by_id(category_id))
                    .await?;
            }
            LedgerChange::LocationAdded(location) => {
                let row = rows::encode_location(user_id, location);
                self.store.insert(Table::Locations, vec![row]).await?;
            }
            LedgerChange::LocationDeleted { location_id } => {
                self.store
                    .delete(Table::Locations, &self.by_id(location_id))
                    .await?;
            }
        }
        Ok(())
    }

    fn owned(&self) -> Filter {
        Filter::new().eq("user_id", self.user_id().to_string())
    }

    fn by_id(&self, id: &impl ToString) -> Filter {
        self.owned().eq("id", id.to_string())
    }
}
