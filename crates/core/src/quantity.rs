//! Positive item counts.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A strictly positive number of pieces.
///
/// A lot can never hold zero items: reducing a lot to zero removes it, which is
/// why `checked_sub` returns `None` instead of a zero quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> DomainResult<Self> {
        if value == 0 {
            return Err(DomainError::validation("quantity must be a positive integer"));
        }
        Ok(Self(value))
    }

    /// Parse a signed value read from a form or a remote row.
    pub fn from_i64(value: i64) -> DomainResult<Self> {
        let value = u32::try_from(value)
            .map_err(|_| DomainError::validation(format!("quantity out of range: {value}")))?;
        Self::new(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn checked_add(self, other: Quantity) -> DomainResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| DomainError::invariant("quantity overflow"))
    }

    /// `None` when nothing would be left.
    pub fn checked_sub(self, other: Quantity) -> Option<Self> {
        self.0.checked_sub(other.0).filter(|v| *v > 0).map(Self)
    }
}

impl ValueObject for Quantity {}

impl TryFrom<u32> for Quantity {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
