//! Bet Record and Status Lifecycle
//!
//! A bet's identity is immutable after purchase; only `status` and `payout`
//! change, and only through guarded one-way transitions:
//!
//! ```text
//! Open --close--> Closed --settle--> Won | Lost
//! Open | Closed --void--> Void
//! ```
//!
//! Won, Lost, and Void are terminal. Re-entering a prior state is a
//! programming error and fails loudly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Amount;
use crate::wager::{NumberTuple, PurchaseMethod, WagerCategory};

/// Unique bet identifier.
pub type BetId = Uuid;

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetStatus {
    /// Purchased; the event has not closed for wagering.
    Open,
    /// Event closed; awaiting official results.
    Closed,
    /// Settled with at least one winning combination.
    Won,
    /// Settled with no winning combination.
    Lost,
    /// Event cancelled; stake refunded.
    Void,
}

impl BetStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BetStatus::Won | BetStatus::Lost | BetStatus::Void)
    }

    /// Whether the one-way lifecycle permits `self -> next`.
    pub fn can_transition_to(&self, next: BetStatus) -> bool {
        match (self, next) {
            (BetStatus::Open, BetStatus::Closed) => true,
            (BetStatus::Closed, BetStatus::Won | BetStatus::Lost) => true,
            (BetStatus::Open | BetStatus::Closed, BetStatus::Void) => true,
            _ => false,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            BetStatus::Open => "OPEN",
            BetStatus::Closed => "CLOSED",
            BetStatus::Won => "WON",
            BetStatus::Lost => "LOST",
            BetStatus::Void => "VOID",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "OPEN" => Some(BetStatus::Open),
            "CLOSED" => Some(BetStatus::Closed),
            "WON" => Some(BetStatus::Won),
            "LOST" => Some(BetStatus::Lost),
            "VOID" => Some(BetStatus::Void),
            _ => None,
        }
    }
}

// =============================================================================
// BET
// =============================================================================

/// A purchased wager, expanded into concrete combinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub id: BetId,
    pub account_id: String,
    pub event_id: String,
    pub category: WagerCategory,
    pub method: PurchaseMethod,
    /// Expanded combinations in deterministic expansion order. Never empty.
    pub combinations: Vec<NumberTuple>,
    /// Stake carried by each combination (floor of total over count).
    pub unit_stake: Amount,
    /// Amount actually debited at purchase. May exceed
    /// `unit_stake * combinations.len()` by the undivided remainder.
    pub total_stake: Amount,
    pub status: BetStatus,
    /// Credited payout; zero until settled, zero forever for a lost bet.
    pub payout: Amount,
    pub created_at: DateTime<Utc>,
}

impl Bet {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_id: impl Into<String>,
        event_id: impl Into<String>,
        category: WagerCategory,
        method: PurchaseMethod,
        combinations: Vec<NumberTuple>,
        unit_stake: Amount,
        total_stake: Amount,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id: account_id.into(),
            event_id: event_id.into(),
            category,
            method,
            combinations,
            unit_stake,
            total_stake,
            status: BetStatus::Open,
            payout: 0,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_forward_edges() {
        assert!(BetStatus::Open.can_transition_to(BetStatus::Closed));
        assert!(BetStatus::Closed.can_transition_to(BetStatus::Won));
        assert!(BetStatus::Closed.can_transition_to(BetStatus::Lost));
        assert!(BetStatus::Open.can_transition_to(BetStatus::Void));
        assert!(BetStatus::Closed.can_transition_to(BetStatus::Void));
    }

    #[test]
    fn test_lifecycle_backward_edges_forbidden() {
        assert!(!BetStatus::Closed.can_transition_to(BetStatus::Open));
        assert!(!BetStatus::Won.can_transition_to(BetStatus::Closed));
        assert!(!BetStatus::Won.can_transition_to(BetStatus::Lost));
        assert!(!BetStatus::Lost.can_transition_to(BetStatus::Won));
        assert!(!BetStatus::Void.can_transition_to(BetStatus::Closed));
        assert!(!BetStatus::Open.can_transition_to(BetStatus::Won));
    }

    #[test]
    fn test_terminal_states() {
        assert!(BetStatus::Won.is_terminal());
        assert!(BetStatus::Lost.is_terminal());
        assert!(BetStatus::Void.is_terminal());
        assert!(!BetStatus::Open.is_terminal());
        assert!(!BetStatus::Closed.is_terminal());
    }

    #[test]
    fn test_status_code_round_trip() {
        for status in [
            BetStatus::Open,
            BetStatus::Closed,
            BetStatus::Won,
            BetStatus::Lost,
            BetStatus::Void,
        ] {
            assert_eq!(BetStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(BetStatus::from_code("PENDING"), None);
    }
}
