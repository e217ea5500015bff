use anyhow::{Context, anyhow, bail};
use clap::Args;
use uuid::Uuid;

use pantry_core::{CategoryId, LocationId, UserId};
use pantry_infra::{PantryConfig, PantrySession, RestRemoteStore};
use pantry_inventory::InventoryLedger;

#[derive(Debug, Args)]
pub(crate) struct IdentityArgs {
    /// Signed-in user id issued by the identity provider
    #[arg(long, env = "PANTRY_USER_ID", global = true)]
    user_id: Option<Uuid>,

    /// Access token of the signed-in user
    #[arg(long, env = "PANTRY_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,
}

pub(crate) async fn open(
    config: &PantryConfig,
    identity: &IdentityArgs,
) -> anyhow::Result<PantrySession<RestRemoteStore>> {
    let user_id = identity
        .user_id
        .ok_or_else(|| anyhow!("--user-id (or PANTRY_USER_ID) is required"))?;
    let access_token = identity
        .access_token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| anyhow!("--access-token (or PANTRY_ACCESS_TOKEN) is required"))?;

    let store = config.rest_store(access_token)?;
    PantrySession::open(store, UserId::from_uuid(user_id))
        .await
        .context("failed to load inventory")
}

/// Accepts a location id or its name (case-insensitive).
pub(crate) fn resolve_location(ledger: &InventoryLedger, input: &str) -> anyhow::Result<LocationId> {
    let locations = ledger.catalog().locations();
    if let Ok(id) = input.parse::<LocationId>() {
        if locations.iter().any(|l| l.id == id) {
            return Ok(id);
        }
    }
    match locations
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(input.trim()))
    {
        Some(location) => Ok(location.id),
        None => bail!("unknown location '{input}'"),
    }
}

/// Accepts a category id or its name (case-insensitive).
pub(crate) fn resolve_category(ledger: &InventoryLedger, input: &str) -> anyhow::Result<CategoryId> {
    let categories = ledger.catalog().categories();
    if let Ok(id) = input.parse::<CategoryId>() {
        if categories.iter().any(|c| c.id == id) {
            return Ok(id);
        }
    }
    match categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(input.trim()))
    {
        Some(category) => Ok(category.id),
        None => bail!("unknown category '{input}'"),
    }
}
