//! The remote relational store, reduced to four verbs over four tables.

pub mod in_memory;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

pub use in_memory::InMemoryRemoteStore;
pub use rest::RestRemoteStore;

/// An untyped row as the store returns it. Decoded by `crate::rows` right away.
pub type Row = serde_json::Map<String, JsonValue>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Table {
    Categories,
    Locations,
    Products,
    Inventory,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Categories => "categories",
            Table::Locations => "locations",
            Table::Products => "products",
            Table::Inventory => "inventory",
        }
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    Select,
    Insert,
    Update,
    Delete,
}

impl core::fmt::Display for Verb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Verb::Select => "select",
            Verb::Insert => "insert",
            Verb::Update => "update",
            Verb::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(JsonValue),
    IsNull,
}

/// Conjunction of per-column conditions. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality; a JSON `null` value means "is null".
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        let condition = match value.into() {
            JsonValue::Null => Condition::IsNull,
            value => Condition::Eq(value),
        };
        self.conditions.push((column.into(), condition));
        self
    }

    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.conditions.push((column.into(), Condition::IsNull));
        self
    }

    pub fn conditions(&self) -> &[(String, Condition)] {
        &self.conditions
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|(column, condition)| {
            let value = row.get(column).unwrap_or(&JsonValue::Null);
            match condition {
                Condition::Eq(expected) => value == expected,
                Condition::IsNull => value.is_null(),
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("store responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("{verb} on {table} failed")]
    Rejected { table: Table, verb: Verb },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Remote table store boundary.
///
/// Implementations own transport and authentication; callers only see rows.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(
        &self,
        table: Table,
        filter: &Filter,
        order: Option<&Order>,
    ) -> Result<Vec<Row>, RemoteError>;

    /// Returns the inserted rows including store-assigned columns.
    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, RemoteError>;

    async fn update(
        &self,
        table: Table,
        patch: Row,
        filter: &Filter,
    ) -> Result<Vec<Row>, RemoteError>;

    async fn delete(&self, table: Table, filter: &Filter) -> Result<(), RemoteError>;
}

#[async_trait]
impl<S> RemoteStore for Arc<S>
where
    S: RemoteStore + ?Sized,
{
    async fn select(
        &self,
        table: Table,
        filter: &Filter,
        order: Option<&Order>,
    ) -> Result<Vec<Row>, RemoteError> {
        (**self).select(table, filter, order).await
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, RemoteError> {
        (**self).insert(table, rows).await
    }

    async fn update(
        &self,
        table: Table,
        patch: Row,
        filter: &Filter,
    ) -> Result<Vec<Row>, RemoteError> {
        (**self).update(table, patch, filter).await
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<(), RemoteError> {
        (**self).delete(table, filter).await
    }
}
