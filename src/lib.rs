//! Pari-Mutuel Wagering Settlement Engine
//!
//! Library core for accepting a wager against a future event, expanding it
//! into concrete combinations, and later resolving each combination against
//! official results:
//!
//! - [`wager`] — categories, purchase methods, selection validation, and
//!   combination expansion.
//! - [`payout`] — dividend tables and pure payout resolution.
//! - [`ledger`] — balances, bet lifecycle, atomic purchase and
//!   exactly-once settlement over a SQLite store.
//!
//! The chat surface, result scraping, and job scheduling live outside this
//! crate; they call in through [`ledger::SettlementLedger`] and hand it
//! [`payout::EventResult`] values once results are official.

pub mod config;
pub mod error;
pub mod ledger;
pub mod payout;
pub mod wager;

pub use config::EngineConfig;
pub use error::{Amount, EngineError, RejectReason};
pub use ledger::bet::{Bet, BetId, BetStatus};
pub use ledger::store::{Account, HistoryEntry, HistoryReason, LedgerStore};
pub use ledger::{EventSettlementSummary, SettlementLedger, SettlementOutcome};
pub use payout::{DividendEntry, EventResult, PayoutOutcome};
pub use wager::{HorseNumber, NumberTuple, PurchaseMethod, Selections, WagerCategory};

/// Install a `tracing` subscriber honoring `RUST_LOG`. For binaries and
/// integration harnesses embedding the engine; calling it twice is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
