//! Expiry dashboard: urgency classification and a flat, sortable view over
//! every lot of every product.

pub mod bucket;
pub mod summary;
pub mod view;

pub use bucket::{UrgencyBucket, classify, days_until};
pub use summary::{ExpirySummary, summarize};
pub use view::{ExpiryRow, SortColumn, SortDirection, SortState, flatten, sort_by};
