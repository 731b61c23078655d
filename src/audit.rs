//! Audit trail - immutable record of every attempted transfer.
//!
//! Exactly one record is created per attempt, committed or rejected, and
//! never mutated afterwards. Appending is best-effort from the
//! coordinator's perspective: an audit failure is logged, never rolled back
//! into the transaction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core_types::Identity;

/// Audit record ID.
///
/// ULID gives monotonic, sortable IDs with no coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(ulid::Ulid);

impl RecordId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

impl Serialize for RecordId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Final disposition of an attempted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransactionOutcome {
    Committed,
    /// Rejected with the stable error code of the rejection reason.
    Rejected { reason: String },
}

impl TransactionOutcome {
    pub fn rejected(reason: &str) -> Self {
        Self::Rejected {
            reason: reason.to_string(),
        }
    }

    #[inline]
    pub fn is_committed(&self) -> bool {
        matches!(self, TransactionOutcome::Committed)
    }
}

/// Immutable audit entry for one attempted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftTransactionRecord {
    pub record_id: RecordId,
    pub sender: Identity,
    pub receiver: Identity,
    /// Diamonds moved (or requested, for rejected attempts).
    pub amount: u64,
    /// Millis since epoch.
    pub timestamp_ms: i64,
    #[serde(flatten)]
    pub outcome: TransactionOutcome,
}

impl GiftTransactionRecord {
    pub fn new(
        sender: Identity,
        receiver: Identity,
        amount: u64,
        outcome: TransactionOutcome,
    ) -> Self {
        Self {
            record_id: RecordId::new(),
            sender,
            receiver,
            amount,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            outcome,
        }
    }
}

impl fmt::Display for GiftTransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gift[{}] {} -> {} amount={} outcome={:?}",
            self.record_id, self.sender, self.receiver, self.amount, self.outcome
        )
    }
}
