//! Engine Error Taxonomy
//!
//! Three families, kept apart on purpose:
//!
//! - [`RejectReason`]: the caller asked for something the rules forbid.
//!   Surfaced synchronously, no retry implied, nothing was mutated.
//! - Deferred settlement is *not* an error; it is a variant of the
//!   settlement outcome (see `ledger::SettlementOutcome::Deferred`).
//! - [`EngineError`]: storage failures and ledger-integrity violations.
//!   Transition violations indicate a programming error and fail loudly.

use thiserror::Error;

use crate::ledger::bet::{BetId, BetStatus};
use crate::wager::{PurchaseMethod, WagerCategory};

/// Monetary amount in the minimum currency unit. Signed so that ledger
/// history deltas can carry debits as negatives.
pub type Amount = i64;

// =============================================================================
// REJECTION (CALLER ERROR)
// =============================================================================

/// Why a proposed wager was rejected before anything was persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("{0:?} bets support SINGLE purchases only")]
    MethodNotSupported(WagerCategory),

    #[error("selections do not match the {0:?} purchase shape")]
    WrongShape(PurchaseMethod),

    #[error("expected {expected} numbers, got {got}")]
    WrongArity { expected: usize, got: usize },

    #[error("expected {expected} selection groups, got {got}")]
    WrongGroupCount { expected: usize, got: usize },

    #[error("selection groups must not be empty")]
    EmptyGroup,

    #[error("selected numbers must be distinct")]
    DuplicateNumber,

    #[error("entrant numbers must be positive")]
    InvalidNumber,

    #[error("BOX needs between {min} and {max} numbers, got {got}")]
    BoxSize { min: usize, max: usize, got: usize },

    #[error("stake must be positive")]
    StakeNotPositive,

    #[error("stake must be a multiple of {unit}")]
    StakeNotUnitMultiple { unit: Amount },

    #[error("stake of {total} cannot cover {combinations} combinations")]
    StakeTooSmall { total: Amount, combinations: usize },

    #[error("selection expands to zero combinations")]
    NoCombinations,

    #[error("insufficient balance: have {balance}, need {required}")]
    InsufficientBalance { balance: Amount, required: Amount },
}

// =============================================================================
// ENGINE ERROR
// =============================================================================

/// Failures surfaced by ledger operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller error; no state was mutated.
    #[error("wager rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("unknown account {0}")]
    UnknownAccount(String),

    #[error("unknown bet {0}")]
    UnknownBet(BetId),

    /// A backward or skipped status transition was attempted. This is a
    /// ledger-integrity bug in the caller, not a recoverable condition.
    #[error("illegal transition {from:?} -> {to:?} for bet {bet_id}")]
    InvalidTransition {
        bet_id: BetId,
        from: BetStatus,
        to: BetStatus,
    },

    /// Settlement was invoked with a result for a different event.
    #[error("result is for event {result_event}, bet {bet_id} belongs to event {bet_event}")]
    EventMismatch {
        bet_id: BetId,
        bet_event: String,
        result_event: String,
    },

    /// Stored state contradicts a ledger invariant (negative delta where a
    /// credit was expected, balance drift, unparseable stored codes, ...).
    #[error("ledger integrity violated: {0}")]
    CorruptLedger(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Codec(#[from] serde_json::Error),
}
