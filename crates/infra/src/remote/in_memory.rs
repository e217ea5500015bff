use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::{Filter, Order, RemoteError, RemoteStore, Row, Table, Verb};

/// In-memory table store.
///
/// Intended for tests/dev. Assigns `id` and `created_at` on insert like the
/// hosted backend does, and can be told to reject upcoming calls.
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    failures: Mutex<VecDeque<(Table, Verb)>>,
    clock: Mutex<Option<DateTime<Utc>>>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `verb` on `table` fails with `RemoteError::Rejected`.
    ///
    /// Queued failures are consumed in order of matching calls; calls on other
    /// (table, verb) pairs go through untouched.
    pub fn fail_next(&self, table: Table, verb: Verb) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push_back((table, verb));
        }
    }

    /// Snapshot of a table in insertion order.
    pub fn rows(&self, table: Table) -> Vec<Row> {
        self.tables
            .read()
            .map(|tables| tables.get(&table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn check_failure(&self, table: Table, verb: Verb) -> Result<(), RemoteError> {
        let mut failures = self
            .failures
            .lock()
            .map_err(|_| RemoteError::Unavailable("lock poisoned".to_string()))?;
        match failures.iter().position(|f| *f == (table, verb)) {
            Some(idx) => {
                failures.remove(idx);
                Err(RemoteError::Rejected { table, verb })
            }
            None => Ok(()),
        }
    }

    /// Strictly increasing so `created_at` ordering follows insertion order.
    fn next_timestamp(&self) -> Result<String, RemoteError> {
        let mut last = self
            .clock
            .lock()
            .map_err(|_| RemoteError::Unavailable("lock poisoned".to_string()))?;
        let now = Utc::now();
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        Ok(next.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn select(
        &self,
        table: Table,
        filter: &Filter,
        order: Option<&Order>,
    ) -> Result<Vec<Row>, RemoteError> {
        self.check_failure(table, Verb::Select)?;

        let tables = self
            .tables
            .read()
            .map_err(|_| RemoteError::Unavailable("lock poisoned".to_string()))?;
        let mut rows: Vec<Row> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let ordering = compare_json(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, RemoteError> {
        self.check_failure(table, Verb::Insert)?;

        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            if !row.get("id").is_some_and(|id| !id.is_null()) {
                row.insert("id".to_string(), JsonValue::String(Uuid::now_v7().to_string()));
            }
            if !row.contains_key("created_at") {
                row.insert("created_at".to_string(), JsonValue::String(self.next_timestamp()?));
            }
            inserted.push(row);
        }

        let mut tables = self
            .tables
            .write()
            .map_err(|_| RemoteError::Unavailable("lock poisoned".to_string()))?;
        tables.entry(table).or_default().extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn update(
        &self,
        table: Table,
        patch: Row,
        filter: &Filter,
    ) -> Result<Vec<Row>, RemoteError> {
        self.check_failure(table, Verb::Update)?;

        let mut tables = self
            .tables
            .write()
            .map_err(|_| RemoteError::Unavailable("lock poisoned".to_string()))?;
        let mut updated = Vec::new();
        for row in tables.entry(table).or_default().iter_mut() {
            if filter.matches(row) {
                for (column, value) in &patch {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<(), RemoteError> {
        self.check_failure(table, Verb::Delete)?;

        let mut tables = self
            .tables
            .write()
            .map_err(|_| RemoteError::Unavailable("lock poisoned".to_string()))?;
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|r| !filter.matches(r));
        }
        Ok(())
    }
}

/// Nulls sort last, like the hosted backend's ascending default.
fn compare_json(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: JsonValue) -> Row {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_created_at() {
        let store = InMemoryRemoteStore::new();
        let inserted = store
            .insert(Table::Categories, vec![row(json!({ "name": "Dairy" }))])
            .await
            .unwrap();

        assert_eq!(inserted.len(), 1);
        let id = inserted[0]["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert!(inserted[0]["created_at"].is_string());
        assert_eq!(store.rows(Table::Categories), inserted);
    }

    #[tokio::test]
    async fn insert_keeps_client_supplied_id() {
        let store = InMemoryRemoteStore::new();
        let inserted = store
            .insert(Table::Products, vec![row(json!({ "id": "p-1", "name": "Milk" }))])
            .await
            .unwrap();
        assert_eq!(inserted[0]["id"], json!("p-1"));
    }

    #[tokio::test]
    async fn select_filters_and_orders() {
        let store = InMemoryRemoteStore::new();
        store
            .insert(
                Table::Locations,
                vec![
                    row(json!({ "user_id": "u1", "name": "Pantry" })),
                    row(json!({ "user_id": "u2", "name": "Attic" })),
                    row(json!({ "user_id": "u1", "name": "Fridge" })),
                ],
            )
            .await
            .unwrap();

        let rows = store
            .select(
                Table::Locations,
                &Filter::new().eq("user_id", "u1"),
                Some(&Order::asc("name")),
            )
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["Fridge", "Pantry"]);

        let rows = store
            .select(Table::Locations, &Filter::new(), Some(&Order::desc("created_at")))
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["Fridge", "Attic", "Pantry"]);
    }

    #[tokio::test]
    async fn update_and_delete_touch_matching_rows_only() {
        let store = InMemoryRemoteStore::new();
        store
            .insert(
                Table::Inventory,
                vec![
                    row(json!({ "id": "a", "product_id": "p", "quantity": 1 })),
                    row(json!({ "id": "b", "product_id": "p", "quantity": 2 })),
                    row(json!({ "id": "c", "product_id": "q", "quantity": 3 })),
                ],
            )
            .await
            .unwrap();

        let updated = store
            .update(
                Table::Inventory,
                row(json!({ "quantity": 9 })),
                &Filter::new().eq("id", "b"),
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["quantity"], json!(9));

        store
            .delete(Table::Inventory, &Filter::new().eq("product_id", "p"))
            .await
            .unwrap();
        let remaining = store.rows(Table::Inventory);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["id"], json!("c"));
    }

    #[tokio::test]
    async fn fail_next_rejects_one_matching_call() {
        let store = InMemoryRemoteStore::new();
        store.fail_next(Table::Inventory, Verb::Insert);

        // Other verbs and tables are unaffected.
        store.select(Table::Inventory, &Filter::new(), None).await.unwrap();
        store.insert(Table::Products, vec![Row::new()]).await.unwrap();

        let err = store
            .insert(Table::Inventory, vec![Row::new()])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RemoteError::Rejected {
                table: Table::Inventory,
                verb: Verb::Insert
            }
        );
        assert!(store.rows(Table::Inventory).is_empty());

        store.insert(Table::Inventory, vec![Row::new()]).await.unwrap();
        assert_eq!(store.rows(Table::Inventory).len(), 1);
    }
}
