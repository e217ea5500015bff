use anyhow::{Context, anyhow, bail};
use chrono::NaiveDate;
use clap::Args;

use pantry_core::{LotId, ProductId};
use pantry_infra::{PantrySession, RemoteStore};
use pantry_inventory::{AddStock, EditLot, ProductDraft, ProductRef, Transfer};

use super::session::{resolve_category, resolve_location};

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Existing product id; otherwise the product is matched by barcode, then
    /// by name and category, and created when nothing matches
    #[arg(long, conflicts_with_all = ["name", "ean", "category"])]
    product: Option<ProductId>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    ean: Option<String>,

    /// Category name or id
    #[arg(long)]
    category: Option<String>,

    /// Location name or id
    #[arg(long)]
    location: String,

    #[arg(long)]
    quantity: u32,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    expiry: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub(crate) struct MoveArgs {
    /// Source lot id
    lot: LotId,

    /// Pieces to move
    quantity: u32,

    /// Destination location name or id
    #[arg(long)]
    to: String,
}

#[derive(Debug, Args)]
pub(crate) struct EditArgs {
    /// Lot id
    lot: LotId,

    #[arg(long)]
    quantity: Option<u32>,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "no_expiry")]
    expiry: Option<NaiveDate>,

    /// Clear the expiry date
    #[arg(long)]
    no_expiry: bool,

    /// Location name or id
    #[arg(long)]
    location: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct RemoveArgs {
    /// Lot id
    lot: LotId,
}

pub(crate) async fn add<S: RemoteStore>(
    session: &mut PantrySession<S>,
    args: AddArgs,
) -> anyhow::Result<()> {
    let ledger = session.ledger();
    let location_id = resolve_location(ledger, &args.location)?;

    let product = match (args.product, args.name) {
        (Some(product_id), _) => ProductRef::Existing(product_id),
        (None, Some(name)) => {
            let category_id = args
                .category
                .map(|c| resolve_category(ledger, &c))
                .transpose()?;
            ProductRef::Draft(ProductDraft::new(name, args.ean, category_id))
        }
        (None, None) => bail!("either --product or --name is required"),
    };

    let outcome = session
        .add_stock(AddStock::new(product, location_id, args.quantity, args.expiry))
        .await
        .context("failed to add stock")?;

    let verb = if outcome.merged { "merged into" } else { "opened" };
    println!("{verb} lot {} of product {}", outcome.lot_id, outcome.product_id);
    Ok(())
}

pub(crate) async fn transfer<S: RemoteStore>(
    session: &mut PantrySession<S>,
    args: MoveArgs,
) -> anyhow::Result<()> {
    let destination = resolve_location(session.ledger(), &args.to)?;
    let plan = session
        .transfer(Transfer::new(args.lot, args.quantity, destination))
        .await
        .context("failed to move stock")?;

    println!(
        "moved {} to lot {}",
        plan.moved,
        plan.destination_lot()
    );
    Ok(())
}

pub(crate) async fn edit<S: RemoteStore>(
    session: &mut PantrySession<S>,
    args: EditArgs,
) -> anyhow::Result<()> {
    let ledger = session.ledger();
    let (_, lot) = ledger
        .find_lot(args.lot)
        .ok_or_else(|| anyhow!("unknown lot {}", args.lot))?;

    let location_id = match args.location {
        Some(location) => resolve_location(ledger, &location)?,
        None => lot
            .location_id
            .filter(|id| ledger.catalog().location(*id).is_some())
            .ok_or_else(|| anyhow!("lot {} has no location; pass --location", args.lot))?,
    };
    let expiry = match (args.expiry, args.no_expiry) {
        (_, true) => None,
        (Some(expiry), false) => Some(expiry),
        (None, false) => lot.expiry,
    };
    let cmd = EditLot {
        lot_id: args.lot,
        quantity: args.quantity.unwrap_or_else(|| lot.quantity.get()),
        expiry,
        location_id,
    };

    session.edit_lot(cmd).await.context("failed to edit lot")?;
    println!("updated lot {}", args.lot);
    Ok(())
}

pub(crate) async fn remove<S: RemoteStore>(
    session: &mut PantrySession<S>,
    args: RemoveArgs,
) -> anyhow::Result<()> {
    session
        .remove_lot(args.lot)
        .await
        .context("failed to remove lot")?;
    println!("removed lot {}", args.lot);
    Ok(())
}
