//! Moving stock between locations.
//!
//! A transfer is two steps: shrink (or remove) the source lot, then grow (or
//! open) the destination lot. The steps are planned together but persisted one
//! after the other, so nothing makes them atomic.

use pantry_core::{Aggregate, DomainError, DomainResult, LotId, ProductId, Quantity};

use crate::command::{LedgerChange, Transfer};
use crate::ledger::InventoryLedger;
use crate::lot::Lot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStep {
    /// The whole lot moves.
    Remove { lot_id: LotId },
    Decrement { lot_id: LotId, remaining: Quantity },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationStep {
    /// A lot with the destination location and the source expiry exists.
    Merge { lot_id: LotId, quantity: Quantity },
    Open(Lot),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub product_id: ProductId,
    pub moved: Quantity,
    pub source: SourceStep,
    pub destination: DestinationStep,
}

impl TransferPlan {
    /// The id of the lot that receives the moved quantity.
    pub fn destination_lot(&self) -> LotId {
        match &self.destination {
            DestinationStep::Merge { lot_id, .. } => *lot_id,
            DestinationStep::Open(lot) => lot.id,
        }
    }

    /// Source change first, destination change second.
    pub fn changes(&self) -> Vec<LedgerChange> {
        let product_id = self.product_id;
        let source = match &self.source {
            SourceStep::Remove { lot_id } => LedgerChange::LotRemoved {
                product_id,
                lot_id: *lot_id,
            },
            SourceStep::Decrement { lot_id, remaining } => LedgerChange::LotQuantitySet {
                product_id,
                lot_id: *lot_id,
                quantity: *remaining,
            },
        };
        let destination = match &self.destination {
            DestinationStep::Merge { lot_id, quantity } => LedgerChange::LotQuantitySet {
                product_id,
                lot_id: *lot_id,
                quantity: *quantity,
            },
            DestinationStep::Open(lot) => LedgerChange::LotOpened(lot.clone()),
        };
        vec![source, destination]
    }
}

impl InventoryLedger {
    /// Validate a transfer and decide both steps without touching state.
    pub fn plan_transfer(&self, cmd: &Transfer) -> DomainResult<TransferPlan> {
        let (product, source) = self.require_lot(cmd.lot_id)?;

        let moved = match Quantity::new(cmd.quantity) {
            Ok(q) if q <= source.quantity => q,
            _ => {
                return Err(DomainError::InsufficientQuantity {
                    requested: cmd.quantity,
                    available: source.quantity.get(),
                });
            }
        };
        if source.location_id == Some(cmd.destination) {
            return Err(DomainError::SameLocation);
        }
        self.require_location(cmd.destination)?;

        let source_step = match source.quantity.checked_sub(moved) {
            Some(remaining) => SourceStep::Decrement {
                lot_id: source.id,
                remaining,
            },
            None => SourceStep::Remove { lot_id: source.id },
        };

        let existing = product
            .lots()
            .iter()
            .find(|l| l.matches(cmd.destination, source.expiry));
        let destination = match existing {
            Some(lot) => DestinationStep::Merge {
                lot_id: lot.id,
                quantity: lot.quantity.checked_add(moved)?,
            },
            None => DestinationStep::Open(Lot {
                id: cmd.new_lot_id,
                product_id: product.id_typed(),
                location_id: Some(cmd.destination),
                quantity: moved,
                expiry: source.expiry,
            }),
        };

        Ok(TransferPlan {
            product_id: product.id_typed(),
            moved,
            source: source_step,
            destination,
        })
    }

    /// Move `cmd.quantity` of a lot to `cmd.destination`. Product totals are preserved.
    pub fn transfer(&mut self, cmd: &Transfer) -> DomainResult<TransferPlan> {
        let plan = self.plan_transfer(cmd)?;
        for change in plan.changes() {
            self.apply(&change);
        }
        Ok(plan)
    }
}
