use clap::{Parser, Subcommand};

use pantry_infra::{ClientConfig, PantryConfig, PantrySession, RemoteStore};

mod catalog;
mod dashboard;
mod lookup;
mod products;
mod session;
mod stock;

#[derive(Debug, Parser)]
#[command(name = "pantry", about = "Pantry inventory CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    identity: session::IdentityArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look a barcode up in Open Food Facts
    Lookup(lookup::LookupArgs),
    #[command(flatten)]
    Inventory(InventoryCommand),
}

/// Commands that run against the signed-in user's inventory.
#[derive(Debug, Subcommand)]
enum InventoryCommand {
    /// Every lot with its expiry urgency, plus the alert banner
    Dashboard(dashboard::DashboardArgs),
    /// List products, optionally filtered
    Products(products::ListProductsArgs),
    /// Show one product and its lots
    Product(products::ProductArg),
    /// Add stock, merging into a matching lot
    Add(stock::AddArgs),
    /// Move part or all of a lot to another location
    Move(stock::MoveArgs),
    /// Overwrite a lot's quantity, expiry or location
    Edit(stock::EditArgs),
    /// Remove a lot
    Remove(stock::RemoveArgs),
    /// Merge a product's lots that share location and expiry
    Consolidate(products::ProductArg),
    /// Change a product's name, barcode or category
    UpdateProduct(products::UpdateProductArgs),
    /// Delete a product and all of its lots
    DeleteProduct(products::ProductArg),
    Location(catalog::LocationCommand),
    Category(catalog::CategoryCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Lookup(args) => lookup::run(&ClientConfig::from_env()?, args).await,
            Commands::Inventory(command) => {
                let config = PantryConfig::from_env()?;
                let mut session = session::open(&config, &self.identity).await?;
                let result = dispatch(&mut session, command).await;
                session.close();
                result
            }
        }
    }
}

async fn dispatch<S: RemoteStore>(
    session: &mut PantrySession<S>,
    command: InventoryCommand,
) -> anyhow::Result<()> {
    match command {
        InventoryCommand::Dashboard(args) => dashboard::run(session, args),
        InventoryCommand::Products(args) => products::list(session, args),
        InventoryCommand::Product(args) => products::show(session, args),
        InventoryCommand::Add(args) => stock::add(session, args).await,
        InventoryCommand::Move(args) => stock::transfer(session, args).await,
        InventoryCommand::Edit(args) => stock::edit(session, args).await,
        InventoryCommand::Remove(args) => stock::remove(session, args).await,
        InventoryCommand::Consolidate(args) => products::consolidate(session, args).await,
        InventoryCommand::UpdateProduct(args) => products::update(session, args).await,
        InventoryCommand::DeleteProduct(args) => products::delete(session, args).await,
        InventoryCommand::Location(command) => catalog::run_location(session, command).await,
        InventoryCommand::Category(command) => catalog::run_category(session, command).await,
    }
}
