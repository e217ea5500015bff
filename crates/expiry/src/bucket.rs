use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How close a lot is to its expiry date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyBucket {
    Expired,
    Today,
    /// 1 to 3 days left.
    Urgent,
    /// 4 to 7 days left.
    Warning,
    Ok,
    /// No expiry date.
    None,
}

impl UrgencyBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyBucket::Expired => "expired",
            UrgencyBucket::Today => "today",
            UrgencyBucket::Urgent => "urgent",
            UrgencyBucket::Warning => "warning",
            UrgencyBucket::Ok => "ok",
            UrgencyBucket::None => "none",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UrgencyBucket::Expired => "Expired",
            UrgencyBucket::Today => "Expires today",
            UrgencyBucket::Urgent => "Urgent",
            UrgencyBucket::Warning => "Soon",
            UrgencyBucket::Ok => "OK",
            UrgencyBucket::None => "No expiry",
        }
    }

    fn from_days(days: i64) -> Self {
        match days {
            d if d < 0 => UrgencyBucket::Expired,
            0 => UrgencyBucket::Today,
            1..=3 => UrgencyBucket::Urgent,
            4..=7 => UrgencyBucket::Warning,
            _ => UrgencyBucket::Ok,
        }
    }
}

impl core::fmt::Display for UrgencyBucket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whole days from `as_of` to `expiry`. Both are calendar dates, so this is
/// the midnight-to-midnight difference.
pub fn days_until(expiry: NaiveDate, as_of: NaiveDate) -> i64 {
    expiry.signed_duration_since(as_of).num_days()
}

pub fn classify(expiry: Option<NaiveDate>, as_of: NaiveDate) -> UrgencyBucket {
    match expiry {
        Some(date) => UrgencyBucket::from_days(days_until(date, as_of)),
        None => UrgencyBucket::None,
    }
}
