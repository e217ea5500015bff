use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::{Condition, Filter, Order, RemoteError, RemoteStore, Row, Table};

/// Remote store speaking the PostgREST dialect over HTTP.
///
/// Every request carries the project API key and the signed-in user's access
/// token; row-level security on the backend scopes rows to that user.
#[derive(Debug, Clone)]
pub struct RestRemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: String,
}

impl RestRemoteStore {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: access_token.into(),
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn request(&self, method: reqwest::Method, table: Table) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.access_token)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let resp = req
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn rows(resp: reqwest::Response) -> Result<Vec<Row>, RemoteError> {
        resp.json::<Vec<Row>>()
            .await
            .map_err(|e| RemoteError::Protocol(e.to_string()))
    }
}

/// `col=eq.v` / `col=is.null` pairs, plus `order=col.asc|desc`.
pub fn query_pairs(filter: &Filter, order: Option<&Order>) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = filter
        .conditions()
        .iter()
        .map(|(column, condition)| {
            let value = match condition {
                Condition::Eq(JsonValue::String(s)) => format!("eq.{s}"),
                Condition::Eq(other) => format!("eq.{other}"),
                Condition::IsNull => "is.null".to_string(),
            };
            (column.clone(), value)
        })
        .collect();

    if let Some(order) = order {
        let direction = if order.ascending { "asc" } else { "desc" };
        pairs.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    pairs
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn select(
        &self,
        table: Table,
        filter: &Filter,
        order: Option<&Order>,
    ) -> Result<Vec<Row>, RemoteError> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        pairs.extend(query_pairs(filter, order));

        let req = self.request(reqwest::Method::GET, table).query(&pairs);
        Self::rows(self.send(req).await?).await
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, RemoteError> {
        let req = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&rows);
        Self::rows(self.send(req).await?).await
    }

    async fn update(
        &self,
        table: Table,
        patch: Row,
        filter: &Filter,
    ) -> Result<Vec<Row>, RemoteError> {
        let req = self
            .request(reqwest::Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(&query_pairs(filter, None))
            .json(&patch);
        Self::rows(self.send(req).await?).await
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<(), RemoteError> {
        let req = self
            .request(reqwest::Method::DELETE, table)
            .query(&query_pairs(filter, None));
        self.send(req).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_follow_postgrest_operators() {
        let filter = Filter::new()
            .eq("user_id", "u1")
            .eq("quantity", 3)
            .is_null("expiry_date");
        let pairs = query_pairs(&filter, Some(&Order::desc("created_at")));

        assert_eq!(
            pairs,
            vec![
                ("user_id".to_string(), "eq.u1".to_string()),
                ("quantity".to_string(), "eq.3".to_string()),
                ("expiry_date".to_string(), "is.null".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn table_url_strips_trailing_slash() {
        let store = RestRemoteStore::new(
            reqwest::Client::new(),
            "https://example.supabase.co/",
            "key",
            "token",
        );
        assert_eq!(
            store.table_url(Table::Inventory),
            "https://example.supabase.co/rest/v1/inventory"
        );
    }
}
