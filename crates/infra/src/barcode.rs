//! Product name lookup by barcode against the Open Food Facts API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use pantry_core::DomainError;

use crate::error::PantryResult;
use crate::remote::RemoteError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(String),
    /// The product exists but carries no usable name.
    FoundWithoutName,
    NotFound,
}

#[async_trait]
pub trait BarcodeLookup: Send + Sync {
    async fn lookup(&self, ean: &str) -> PantryResult<LookupOutcome>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    product: Option<ProductNames>,
}

#[derive(Debug, Deserialize)]
struct ProductNames {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    product_name_it: Option<String>,
}

/// Interpret a lookup response body. `status` 1 with a product means found.
pub fn parse_lookup(body: &JsonValue) -> Result<LookupOutcome, RemoteError> {
    let response = LookupResponse::deserialize(body)
        .map_err(|e| RemoteError::Protocol(format!("barcode lookup: {e}")))?;

    let product = match response.product {
        Some(product) if response.status == 1 => product,
        _ => return Ok(LookupOutcome::NotFound),
    };

    let name = [product.product_name, product.product_name_it]
        .into_iter()
        .flatten()
        .map(|n| n.trim().to_string())
        .find(|n| !n.is_empty());

    Ok(name.map_or(LookupOutcome::FoundWithoutName, LookupOutcome::Found))
}

#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn product_url(&self, ean: &str) -> String {
        format!("{}/product/{ean}.json", self.base_url)
    }
}

#[async_trait]
impl BarcodeLookup for OpenFoodFactsClient {
    async fn lookup(&self, ean: &str) -> PantryResult<LookupOutcome> {
        let ean = ean.trim();
        if ean.is_empty() {
            return Err(DomainError::validation("barcode is required").into());
        }

        let resp = self
            .client
            .get(self.product_url(ean))
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            info!(ean, "barcode not found");
            return Ok(LookupOutcome::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(ean, status = status.as_u16(), "barcode lookup failed");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body: JsonValue = resp
            .json()
            .await
            .map_err(|e| RemoteError::Protocol(e.to_string()))?;
        let outcome = parse_lookup(&body)?;
        info!(ean, ?outcome, "barcode lookup completed");
        Ok(outcome)
    }
}
