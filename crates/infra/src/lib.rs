//! Infrastructure layer: remote store, barcode lookup, configuration, and the
//! session that ties them to the inventory ledger.

pub mod barcode;
pub mod config;
pub mod error;
pub mod remote;
pub mod rows;
pub mod session;

pub use barcode::{BarcodeLookup, LookupOutcome, OpenFoodFactsClient};
pub use config::{ClientConfig, ConfigError, PantryConfig};
pub use error::{DecodeError, PantryError, PantryResult};
pub use remote::{
    Filter, InMemoryRemoteStore, Order, RemoteError, RemoteStore, RestRemoteStore, Row, Table, Verb,
};
pub use session::PantrySession;
