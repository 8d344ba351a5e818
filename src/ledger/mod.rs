//! Settlement Ledger
//!
//! Owns account balances and bet records, and composes the validator,
//! expander, and payout resolver into the two money-moving operations:
//!
//! - **purchase**: validate, expand, split the stake, then atomically debit
//!   the account and persist the bet (all or nothing).
//! - **settle**: resolve a closed bet against an official result, then
//!   atomically credit the payout and flip the status, exactly once.
//!
//! Settlement runs as batch sweeps over an event's closed bets. A sweep
//! tolerates per-bet failures and deferred bets; re-running it is always
//! safe because a terminal bet settles as a no-op that just reports the
//! recorded outcome.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{Amount, EngineError};
use crate::payout::{self, EventResult, PayoutOutcome};
use crate::wager::{expansion, validation, PurchaseMethod, Selections, WagerCategory};

pub mod bet;
pub mod store;


use bet::{Bet, BetId, BetStatus};
use store::{Account, HistoryEntry, LedgerStore};

// =============================================================================
// OUTCOMES
// =============================================================================

/// Result of settling one bet. Re-settling a terminal bet returns the
/// recorded outcome again without touching the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementOutcome {
    Won { payout: Amount },
    Lost,
    /// Dividends not yet official for the bet's category; nothing was
    /// mutated, retry on a later sweep.
    Deferred,
    /// The bet was voided before settlement; its stake was refunded.
    Voided,
}

/// What one `settle_event` sweep achieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSettlementSummary {
    /// Bets settled to a terminal outcome this sweep (wins and losses).
    pub processed: usize,
    pub won: usize,
    pub total_payout: Amount,
    /// Bets left CLOSED because their dividends are not official yet.
    pub deferred: usize,
    /// Bets whose settlement failed; logged and left CLOSED for retry.
    pub failed: usize,
}

// =============================================================================
// LEDGER
// =============================================================================

/// The settlement ledger facade over the store.
#[derive(Clone)]
pub struct SettlementLedger {
    store: LedgerStore,
    config: EngineConfig,
}

impl SettlementLedger {
    pub fn new(store: LedgerStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    /// First-contact account creation; idempotent. Applies the configured
    /// registration grant on creation only.
    pub async fn open_account(&self, account_id: &str) -> Result<Account, EngineError> {
        self.store
            .get_or_create_account(account_id, self.config.starting_balance)
            .await
    }

    /// External top-up credited to the account.
    pub async fn deposit(&self, account_id: &str, amount: Amount) -> Result<Amount, EngineError> {
        self.store.deposit(account_id, amount).await
    }

    pub async fn balance(&self, account_id: &str) -> Result<Amount, EngineError> {
        let account = self
            .store
            .account(account_id)
            .await?
            .ok_or_else(|| EngineError::UnknownAccount(account_id.to_string()))?;
        Ok(account.balance)
    }

    pub async fn history(&self, account_id: &str) -> Result<Vec<HistoryEntry>, EngineError> {
        self.store.history(account_id).await
    }

    pub async fn bets_for_account(&self, account_id: &str) -> Result<Vec<Bet>, EngineError> {
        self.store.bets_for_account(account_id).await
    }

    /// Balance must equal the sum of signed history deltas at all times.
    pub async fn audit_account(&self, account_id: &str) -> Result<bool, EngineError> {
        self.store.audit_account(account_id).await
    }

    // =========================================================================
    // PURCHASE
    // =========================================================================

    /// Purchase a wager. Runs the validator and expander, then debits the
    /// full requested stake and persists the bet under one transaction.
    ///
    /// The stake divides evenly across combinations by floor division; the
    /// remainder is debited but not carried by any combination (rounding
    /// loss, never gain).
    pub async fn purchase(
        &self,
        account_id: &str,
        event_id: &str,
        category: WagerCategory,
        method: PurchaseMethod,
        selections: &Selections,
        stake: Amount,
    ) -> Result<BetId, EngineError> {
        validation::validate(category, method, selections, stake, &self.config)?;
        let combinations = expansion::expand(category, method, selections)?;
        let split = expansion::split_stake(stake, combinations.len())?;

        let bet = Bet::new(
            account_id,
            event_id,
            category,
            method,
            combinations,
            split.unit_stake,
            stake,
        );
        self.store.insert_purchase(&bet).await?;

        debug!(
            bet_id = %bet.id,
            account_id,
            event_id,
            category = category.code(),
            method = method.code(),
            combinations = bet.combinations.len(),
            unit_stake = split.unit_stake,
            total_stake = stake,
            remainder = split.remainder,
            "wager purchased"
        );
        Ok(bet.id)
    }

    // =========================================================================
    // CLOSE / SETTLE
    // =========================================================================

    /// Transition every OPEN bet of the event to CLOSED. Idempotent.
    pub async fn close_bets_for_event(&self, event_id: &str) -> Result<usize, EngineError> {
        let closed = self.store.close_open_bets(event_id).await?;
        if closed > 0 {
            debug!(event_id, closed, "bets closed for event");
        }
        Ok(closed)
    }

    /// Settle one bet against an official result.
    ///
    /// - CLOSED + official dividends: credit and flip to WON/LOST.
    /// - CLOSED + dividends missing: `Deferred`, nothing mutated.
    /// - Already terminal: no-op, reports the recorded outcome.
    /// - OPEN: loud invariant violation; close the event first.
    pub async fn settle(
        &self,
        bet_id: BetId,
        result: &EventResult,
    ) -> Result<SettlementOutcome, EngineError> {
        let bet = self
            .store
            .bet(bet_id)
            .await?
            .ok_or(EngineError::UnknownBet(bet_id))?;
        if bet.event_id != result.event_id {
            return Err(EngineError::EventMismatch {
                bet_id,
                bet_event: bet.event_id,
                result_event: result.event_id.clone(),
            });
        }

        match bet.status {
            BetStatus::Won => return Ok(SettlementOutcome::Won { payout: bet.payout }),
            BetStatus::Lost => return Ok(SettlementOutcome::Lost),
            BetStatus::Void => return Ok(SettlementOutcome::Voided),
            BetStatus::Open => {
                return Err(EngineError::InvalidTransition {
                    bet_id,
                    from: BetStatus::Open,
                    to: BetStatus::Won,
                })
            }
            BetStatus::Closed => {}
        }

        let (winning_combinations, payout) = match payout::resolve(&bet, result) {
            PayoutOutcome::Deferred => return Ok(SettlementOutcome::Deferred),
            PayoutOutcome::Settled {
                winning_combinations,
                payout,
            } => (winning_combinations, payout),
        };
        let to = if winning_combinations > 0 {
            BetStatus::Won
        } else {
            BetStatus::Lost
        };

        if self.store.settle_bet(&bet, to, payout).await? {
            debug!(
                bet_id = %bet.id,
                account_id = %bet.account_id,
                event_id = %bet.event_id,
                status = to.code(),
                payout,
                "bet settled"
            );
            return Ok(match to {
                BetStatus::Won => SettlementOutcome::Won { payout },
                _ => SettlementOutcome::Lost,
            });
        }

        // The guarded update matched nothing: a concurrent sweep settled
        // (or voided) the bet between our read and write. Report whatever
        // it recorded.
        let bet = self
            .store
            .bet(bet_id)
            .await?
            .ok_or(EngineError::UnknownBet(bet_id))?;
        match bet.status {
            BetStatus::Won => Ok(SettlementOutcome::Won { payout: bet.payout }),
            BetStatus::Lost => Ok(SettlementOutcome::Lost),
            BetStatus::Void => Ok(SettlementOutcome::Voided),
            other => Err(EngineError::CorruptLedger(format!(
                "settlement of bet {bet_id} raced into non-terminal state {other:?}"
            ))),
        }
    }

    /// Settle every CLOSED bet of the event. One bet's failure never aborts
    /// the sweep; failed and deferred bets stay CLOSED for the next sweep.
    pub async fn settle_event(
        &self,
        event_id: &str,
        result: &EventResult,
    ) -> Result<EventSettlementSummary, EngineError> {
        let bets = self.store.bets_for_event(event_id, BetStatus::Closed).await?;
        let mut summary = EventSettlementSummary::default();

        for bet in bets {
            match self.settle(bet.id, result).await {
                Ok(SettlementOutcome::Won { payout }) => {
                    summary.processed += 1;
                    summary.won += 1;
                    summary.total_payout += payout;
                }
                Ok(SettlementOutcome::Lost) | Ok(SettlementOutcome::Voided) => {
                    summary.processed += 1;
                }
                Ok(SettlementOutcome::Deferred) => {
                    summary.deferred += 1;
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(bet_id = %bet.id, event_id, error = %e, "bet settlement failed; left for next sweep");
                }
            }
        }

        info!(
            event_id,
            processed = summary.processed,
            won = summary.won,
            total_payout = summary.total_payout,
            deferred = summary.deferred,
            failed = summary.failed,
            "settlement sweep finished"
        );
        Ok(summary)
    }

    /// Void every OPEN or CLOSED bet of a cancelled event, refunding each
    /// bet's debited stake. Terminal bets are untouched. Returns the number
    /// of bets voided.
    pub async fn void_event(&self, event_id: &str) -> Result<usize, EngineError> {
        let mut voided = 0;
        for status in [BetStatus::Open, BetStatus::Closed] {
            for bet in self.store.bets_for_event(event_id, status).await? {
                if self.store.void_bet(&bet).await? {
                    voided += 1;
                }
            }
        }
        if voided > 0 {
            info!(event_id, voided, "event voided; stakes refunded");
        }
        Ok(voided)
    }
}
