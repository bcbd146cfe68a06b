/// Type-safe wrappers for domain primitives
///
/// These types prevent common errors by enforcing validation at construction time
/// and providing checked arithmetic operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::constants::*;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Amount is not a finite number: {0}")]
    NonFiniteAmount(f64),

    #[error("Amount overflow in operation")]
    AmountOverflow,

    #[error("Invalid player ID format: {0}")]
    InvalidPlayerIdFormat(String),
}

/// Opaque, unique player identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Create a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PlayerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl TryFrom<&str> for PlayerId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let raw = value.strip_prefix("player_").unwrap_or(value);
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| ValidationError::InvalidPlayerIdFormat(value.to_string()))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player_{}", self.0.simple())
    }
}

/// Monetary amount in whole cents
///
/// Signed so that net payouts (losses) share the type with balances.
/// Every balance, wager, payout and bonus in the game is a `Cents`;
/// conversion to decimal happens only at the display boundary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Convert a decimal amount to cents, rounding to the nearest cent
    /// with halves away from zero.
    pub fn from_dollars(amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::NonFiniteAmount(amount));
        }
        let scaled = (amount * CENTS_PER_UNIT as f64).round();
        if scaled > i64::MAX as f64 || scaled < i64::MIN as f64 {
            return Err(ValidationError::AmountOverflow);
        }
        Ok(Self(scaled as i64))
    }

    /// Get the raw cent value
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Decimal value for display only
    pub fn to_dollars(&self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(&self, other: Cents) -> Result<Self, ValidationError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(ValidationError::AmountOverflow)
    }

    pub fn checked_sub(&self, other: Cents) -> Result<Self, ValidationError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(ValidationError::AmountOverflow)
    }

    pub fn checked_neg(&self) -> Result<Self, ValidationError> {
        self.0
            .checked_neg()
            .map(Self)
            .ok_or(ValidationError::AmountOverflow)
    }

    /// Restrict to `[min, max]`
    pub fn clamp(self, min: Cents, max: Cents) -> Self {
        Self(self.0.clamp(min.0, max.0))
    }
}

impl From<i64> for Cents {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl From<Cents> for i64 {
    fn from(amount: Cents) -> Self {
        amount.0
    }
}

impl std::fmt::Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let unit = CENTS_PER_UNIT as u64;
        write!(f, "{}${}.{:02}", sign, abs / unit, abs % unit)
    }
}
