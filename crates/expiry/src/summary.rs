use serde::{Deserialize, Serialize};

use crate::bucket::UrgencyBucket;
use crate::view::ExpiryRow;

/// Counts behind the dashboard alert banner.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirySummary {
    pub expired: usize,
    pub today: usize,
    /// Lots expiring in 1 to 3 days.
    pub urgent: usize,
}

impl ExpirySummary {
    /// Nothing expired and nothing expiring within 3 days.
    pub fn is_all_clear(&self) -> bool {
        self.expired == 0 && self.today == 0 && self.urgent == 0
    }

    /// Non-zero counts, most severe first.
    pub fn alerts(&self) -> Vec<(UrgencyBucket, usize)> {
        [
            (UrgencyBucket::Expired, self.expired),
            (UrgencyBucket::Today, self.today),
            (UrgencyBucket::Urgent, self.urgent),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }
}

pub fn summarize(rows: &[ExpiryRow]) -> ExpirySummary {
    rows.iter()
        .fold(ExpirySummary::default(), |mut summary, row| {
            match row.bucket {
                UrgencyBucket::Expired => summary.expired += 1,
                UrgencyBucket::Today => summary.today += 1,
                UrgencyBucket::Urgent => summary.urgent += 1,
                UrgencyBucket::Warning | UrgencyBucket::Ok | UrgencyBucket::None => {}
            }
            summary
        })
}
