use anyhow::Context;
use clap::{Args, Subcommand};

use pantry_infra::{PantrySession, RemoteStore};

use super::session::{resolve_category, resolve_location};

#[derive(Debug, Args)]
pub(crate) struct LocationCommand {
    #[command(subcommand)]
    command: LocationSubcommand,
}

#[derive(Debug, Subcommand)]
enum LocationSubcommand {
    /// Locations with the number of lots stored at each
    List,
    Add {
        name: String,
        icon: String,
    },
    /// Lots stored there keep pointing at the deleted location
    Delete {
        /// Location name or id
        location: String,
    },
}

#[derive(Debug, Args)]
pub(crate) struct CategoryCommand {
    #[command(subcommand)]
    command: CategorySubcommand,
}

#[derive(Debug, Subcommand)]
enum CategorySubcommand {
    List,
    Add {
        name: String,
    },
    /// Products in the category become uncategorised
    Delete {
        /// Category name or id
        category: String,
    },
}

pub(crate) async fn run_location<S: RemoteStore>(
    session: &mut PantrySession<S>,
    command: LocationCommand,
) -> anyhow::Result<()> {
    match command.command {
        LocationSubcommand::List => {
            for stat in session.location_stats() {
                println!(
                    "{}  {} {}  {} lot(s)",
                    stat.location.id, stat.location.icon, stat.location.name, stat.lots
                );
            }
        }
        LocationSubcommand::Add { name, icon } => {
            let id = session
                .add_location(&name, &icon)
                .await
                .context("failed to add location")?;
            println!("added location {id}");
        }
        LocationSubcommand::Delete { location } => {
            let id = resolve_location(session.ledger(), &location)?;
            session
                .delete_location(id)
                .await
                .context("failed to delete location")?;
            println!("deleted location {id}");
        }
    }
    Ok(())
}

pub(crate) async fn run_category<S: RemoteStore>(
    session: &mut PantrySession<S>,
    command: CategoryCommand,
) -> anyhow::Result<()> {
    match command.command {
        CategorySubcommand::List => {
            for category in session.ledger().catalog().categories() {
                println!("{}  {}", category.id, category.name);
            }
        }
        CategorySubcommand::Add { name } => {
            let id = session
                .add_category(&name)
                .await
                .context("failed to add category")?;
            println!("added category {id}");
        }
        CategorySubcommand::Delete { category } => {
            let id = resolve_category(session.ledger(), &category)?;
            session
                .delete_category(id)
                .await
                .context("failed to delete category")?;
            println!("deleted category {id}");
        }
    }
    Ok(())
}
