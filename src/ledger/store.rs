//! Ledger Store
//!
//! SQLite persistence for accounts, their append-only history, and bets.
//! Every mutating operation runs inside one transaction scoped to the
//! records it touches, so a purchase (debit + history + bet row) and a
//! settlement (credit + history + status flip) each land atomically or not
//! at all. The connection lives behind a `tokio::sync::Mutex`, which also
//! serializes concurrent balance read-modify-writes in process.
//!
//! Status transitions are guarded in SQL (`... WHERE status = ?`): an
//! update that matches zero rows means another sweep got there first, and
//! the caller re-reads instead of re-crediting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{Amount, EngineError, RejectReason};
use crate::ledger::bet::{Bet, BetId, BetStatus};
use crate::wager::{PurchaseMethod, WagerCategory};

// =============================================================================
// ACCOUNT & HISTORY
// =============================================================================

/// An account aggregate: balance plus append-only signed history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
}

/// Why a history delta was applied. Every delta is attributed to exactly
/// one bet or one external account event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryReason {
    /// Grant applied when the account was first opened.
    Registration,
    /// External top-up.
    Deposit,
    /// Stake debit at purchase.
    Purchase,
    /// Settlement credit; zero-delta entries are written for lost bets so
    /// the audit trail shows the settlement happened.
    Settlement,
    /// Stake returned for a voided bet.
    Refund,
}

impl HistoryReason {
    pub fn code(&self) -> &'static str {
        match self {
            HistoryReason::Registration => "REGISTRATION",
            HistoryReason::Deposit => "DEPOSIT",
            HistoryReason::Purchase => "PURCHASE",
            HistoryReason::Settlement => "SETTLEMENT",
            HistoryReason::Refund => "REFUND",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "REGISTRATION" => Some(HistoryReason::Registration),
            "DEPOSIT" => Some(HistoryReason::Deposit),
            "PURCHASE" => Some(HistoryReason::Purchase),
            "SETTLEMENT" => Some(HistoryReason::Settlement),
            "REFUND" => Some(HistoryReason::Refund),
            _ => None,
        }
    }
}

/// One signed balance delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub account_id: String,
    pub delta: Amount,
    pub reason: HistoryReason,
    pub bet_id: Option<BetId>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// STORE
// =============================================================================

/// SQLite-backed account/bet store.
#[derive(Clone)]
pub struct LedgerStore {
    conn: Arc<Mutex<Connection>>,
}

impl LedgerStore {
    /// Open (or create) the store at the given path.
    pub fn open(db_path: &str) -> Result<Self, EngineError> {
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory store, used by tests and ephemeral deployments.
    pub fn open_in_memory() -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), EngineError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                balance INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0),
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS account_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id TEXT NOT NULL,
                delta INTEGER NOT NULL,
                reason TEXT NOT NULL,
                bet_id TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (account_id) REFERENCES accounts(id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS bets (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                event_id TEXT NOT NULL,
                category TEXT NOT NULL,
                method TEXT NOT NULL,
                combinations TEXT NOT NULL,
                unit_stake INTEGER NOT NULL,
                total_stake INTEGER NOT NULL,
                status TEXT NOT NULL,
                payout INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (account_id) REFERENCES accounts(id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_bets_event_status ON bets(event_id, status)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_bets_account ON bets(account_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_history_account ON account_history(account_id)",
            [],
        )?;

        Ok(())
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    /// Fetch an account, or create it with the given starting balance on
    /// first contact. The grant, when non-zero, is written as a
    /// registration history entry so the balance stays the sum of deltas.
    pub async fn get_or_create_account(
        &self,
        account_id: &str,
        starting_balance: Amount,
    ) -> Result<Account, EngineError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let existing = tx
            .query_row(
                "SELECT id, balance, created_at FROM accounts WHERE id = ?1",
                [account_id],
                account_from_row,
            )
            .optional()?;
        if let Some(account) = existing {
            tx.commit()?;
            return Ok(account);
        }

        if starting_balance < 0 {
            return Err(EngineError::CorruptLedger(format!(
                "negative starting balance {starting_balance} for account {account_id}"
            )));
        }

        let now = Utc::now();
        tx.execute(
            "INSERT INTO accounts (id, balance, created_at) VALUES (?1, ?2, ?3)",
            params![account_id, starting_balance, now.to_rfc3339()],
        )?;
        if starting_balance > 0 {
            append_history(
                &tx,
                account_id,
                starting_balance,
                HistoryReason::Registration,
                None,
            )?;
        }
        tx.commit()?;

        Ok(Account {
            id: account_id.to_string(),
            balance: starting_balance,
            created_at: now,
        })
    }

    pub async fn account(&self, account_id: &str) -> Result<Option<Account>, EngineError> {
        let conn = self.conn.lock().await;
        let account = conn
            .query_row(
                "SELECT id, balance, created_at FROM accounts WHERE id = ?1",
                [account_id],
                account_from_row,
            )
            .optional()?;
        Ok(account)
    }

    /// Credit an external top-up. Rejects non-positive amounts loudly: a
    /// negative deposit would be a disguised debit outside the bet flow.
    pub async fn deposit(&self, account_id: &str, amount: Amount) -> Result<Amount, EngineError> {
        if amount <= 0 {
            return Err(EngineError::CorruptLedger(format!(
                "deposit of {amount} for account {account_id} is not positive"
            )));
        }
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
            params![amount, account_id],
        )?;
        if changed == 0 {
            return Err(EngineError::UnknownAccount(account_id.to_string()));
        }
        append_history(&tx, account_id, amount, HistoryReason::Deposit, None)?;
        let balance =
            tx.query_row("SELECT balance FROM accounts WHERE id = ?1", [account_id], |r| {
                r.get(0)
            })?;
        tx.commit()?;
        Ok(balance)
    }

    pub async fn history(&self, account_id: &str) -> Result<Vec<HistoryEntry>, EngineError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, account_id, delta, reason, bet_id, created_at
             FROM account_history WHERE account_id = ?1 ORDER BY id",
        )?;
        let entries = stmt
            .query_map([account_id], history_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Verify that the cached balance equals the sum of history deltas.
    pub async fn audit_account(&self, account_id: &str) -> Result<bool, EngineError> {
        let conn = self.conn.lock().await;
        let balance: Amount = conn
            .query_row(
                "SELECT balance FROM accounts WHERE id = ?1",
                [account_id],
                |r| r.get(0),
            )
            .optional()?
            .ok_or_else(|| EngineError::UnknownAccount(account_id.to_string()))?;
        let delta_sum: Amount = conn.query_row(
            "SELECT COALESCE(SUM(delta), 0) FROM account_history WHERE account_id = ?1",
            [account_id],
            |r| r.get(0),
        )?;
        Ok(balance == delta_sum)
    }

    // =========================================================================
    // BETS
    // =========================================================================

    /// Atomic purchase: debit the bet's total stake, append the history
    /// entry, and persist the bet as OPEN. Insufficient balance rejects and
    /// leaves everything untouched.
    pub async fn insert_purchase(&self, bet: &Bet) -> Result<(), EngineError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let balance: Amount = tx
            .query_row(
                "SELECT balance FROM accounts WHERE id = ?1",
                [bet.account_id.as_str()],
                |r| r.get(0),
            )
            .optional()?
            .ok_or_else(|| EngineError::UnknownAccount(bet.account_id.clone()))?;
        if balance < bet.total_stake {
            return Err(RejectReason::InsufficientBalance {
                balance,
                required: bet.total_stake,
            }
            .into());
        }

        tx.execute(
            "UPDATE accounts SET balance = balance - ?1 WHERE id = ?2",
            params![bet.total_stake, bet.account_id],
        )?;
        append_history(
            &tx,
            &bet.account_id,
            -bet.total_stake,
            HistoryReason::Purchase,
            Some(bet.id),
        )?;

        let combinations = serde_json::to_string(&bet.combinations)?;
        tx.execute(
            "INSERT INTO bets (id, account_id, event_id, category, method, combinations,
                               unit_stake, total_stake, status, payout, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                bet.id.to_string(),
                bet.account_id,
                bet.event_id,
                bet.category.code(),
                bet.method.code(),
                combinations,
                bet.unit_stake,
                bet.total_stake,
                bet.status.code(),
                bet.payout,
                bet.created_at.to_rfc3339(),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    pub async fn bet(&self, bet_id: BetId) -> Result<Option<Bet>, EngineError> {
        let conn = self.conn.lock().await;
        let bet = conn
            .query_row(
                "SELECT id, account_id, event_id, category, method, combinations,
                        unit_stake, total_stake, status, payout, created_at
                 FROM bets WHERE id = ?1",
                [bet_id.to_string()],
                bet_from_row,
            )
            .optional()?;
        Ok(bet)
    }

    pub async fn bets_for_event(
        &self,
        event_id: &str,
        status: BetStatus,
    ) -> Result<Vec<Bet>, EngineError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, account_id, event_id, category, method, combinations,
                    unit_stake, total_stake, status, payout, created_at
             FROM bets WHERE event_id = ?1 AND status = ?2 ORDER BY created_at, id",
        )?;
        let bets = stmt
            .query_map(params![event_id, status.code()], bet_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bets)
    }

    pub async fn bets_for_account(&self, account_id: &str) -> Result<Vec<Bet>, EngineError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, account_id, event_id, category, method, combinations,
                    unit_stake, total_stake, status, payout, created_at
             FROM bets WHERE account_id = ?1 ORDER BY created_at, id",
        )?;
        let bets = stmt
            .query_map([account_id], bet_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bets)
    }

    /// Flip every OPEN bet of the event to CLOSED. Idempotent: anything
    /// already past OPEN is untouched and not counted.
    pub async fn close_open_bets(&self, event_id: &str) -> Result<usize, EngineError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE bets SET status = ?1 WHERE event_id = ?2 AND status = ?3",
            params![BetStatus::Closed.code(), event_id, BetStatus::Open.code()],
        )?;
        Ok(changed)
    }

    /// Atomic settlement: flip CLOSED -> WON/LOST, credit the payout, and
    /// append the history entry (delta 0 for a loss, kept for audit).
    ///
    /// Returns `false` without mutating anything when the bet was not in
    /// CLOSED state anymore; the caller re-reads and reports the recorded
    /// outcome. That guarded update is the idempotency boundary for
    /// overlapping retry sweeps.
    pub async fn settle_bet(
        &self,
        bet: &Bet,
        to: BetStatus,
        payout: Amount,
    ) -> Result<bool, EngineError> {
        if !matches!(to, BetStatus::Won | BetStatus::Lost) {
            return Err(EngineError::InvalidTransition {
                bet_id: bet.id,
                from: bet.status,
                to,
            });
        }
        if payout < 0 {
            return Err(EngineError::CorruptLedger(format!(
                "negative payout {payout} for bet {}",
                bet.id
            )));
        }

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE bets SET status = ?1, payout = ?2 WHERE id = ?3 AND status = ?4",
            params![
                to.code(),
                payout,
                bet.id.to_string(),
                BetStatus::Closed.code()
            ],
        )?;
        if changed == 0 {
            // Another sweep settled it first.
            return Ok(false);
        }

        if payout > 0 {
            tx.execute(
                "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
                params![payout, bet.account_id],
            )?;
        }
        append_history(
            &tx,
            &bet.account_id,
            payout,
            HistoryReason::Settlement,
            Some(bet.id),
        )?;

        tx.commit()?;
        Ok(true)
    }

    /// Atomic void: flip OPEN/CLOSED -> VOID and refund the debited stake.
    /// Returns `false` when the bet was already terminal.
    pub async fn void_bet(&self, bet: &Bet) -> Result<bool, EngineError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE bets SET status = ?1 WHERE id = ?2 AND status IN (?3, ?4)",
            params![
                BetStatus::Void.code(),
                bet.id.to_string(),
                BetStatus::Open.code(),
                BetStatus::Closed.code()
            ],
        )?;
        if changed == 0 {
            return Ok(false);
        }

        tx.execute(
            "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
            params![bet.total_stake, bet.account_id],
        )?;
        append_history(
            &tx,
            &bet.account_id,
            bet.total_stake,
            HistoryReason::Refund,
            Some(bet.id),
        )?;

        tx.commit()?;
        Ok(true)
    }
}

// =============================================================================
// ROW MAPPING
// =============================================================================

fn append_history(
    tx: &rusqlite::Transaction<'_>,
    account_id: &str,
    delta: Amount,
    reason: HistoryReason,
    bet_id: Option<BetId>,
) -> Result<(), rusqlite::Error> {
    tx.execute(
        "INSERT INTO account_history (account_id, delta, reason, bet_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            account_id,
            delta,
            reason.code(),
            bet_id.map(|id| id.to_string()),
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

fn column_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn parse_timestamp(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| column_error(idx, format!("bad timestamp {raw:?}: {e}")))
}

fn account_from_row(row: &Row<'_>) -> Result<Account, rusqlite::Error> {
    let created_raw: String = row.get(2)?;
    Ok(Account {
        id: row.get(0)?,
        balance: row.get(1)?,
        created_at: parse_timestamp(2, &created_raw)?,
    })
}

fn history_from_row(row: &Row<'_>) -> Result<HistoryEntry, rusqlite::Error> {
    let reason_raw: String = row.get(3)?;
    let reason = HistoryReason::from_code(&reason_raw)
        .ok_or_else(|| column_error(3, format!("unknown history reason {reason_raw:?}")))?;
    let bet_id_raw: Option<String> = row.get(4)?;
    let bet_id = match bet_id_raw {
        Some(raw) => Some(
            raw.parse::<BetId>()
                .map_err(|e| column_error(4, format!("bad bet id {raw:?}: {e}")))?,
        ),
        None => None,
    };
    let created_raw: String = row.get(5)?;
    Ok(HistoryEntry {
        id: row.get(0)?,
        account_id: row.get(1)?,
        delta: row.get(2)?,
        reason,
        bet_id,
        created_at: parse_timestamp(5, &created_raw)?,
    })
}

fn bet_from_row(row: &Row<'_>) -> Result<Bet, rusqlite::Error> {
    let id_raw: String = row.get(0)?;
    let id = id_raw
        .parse::<BetId>()
        .map_err(|e| column_error(0, format!("bad bet id {id_raw:?}: {e}")))?;
    let category_raw: String = row.get(3)?;
    let category = WagerCategory::from_code(&category_raw)
        .ok_or_else(|| column_error(3, format!("unknown category {category_raw:?}")))?;
    let method_raw: String = row.get(4)?;
    let method = PurchaseMethod::from_code(&method_raw)
        .ok_or_else(|| column_error(4, format!("unknown method {method_raw:?}")))?;
    let combinations_raw: String = row.get(5)?;
    let combinations = serde_json::from_str(&combinations_raw)
        .map_err(|e| column_error(5, format!("bad combinations json: {e}")))?;
    let status_raw: String = row.get(8)?;
    let status = BetStatus::from_code(&status_raw)
        .ok_or_else(|| column_error(8, format!("unknown status {status_raw:?}")))?;
    let created_raw: String = row.get(10)?;

    Ok(Bet {
        id,
        account_id: row.get(1)?,
        event_id: row.get(2)?,
        category,
        method,
        combinations,
        unit_stake: row.get(6)?,
        total_stake: row.get(7)?,
        status,
        payout: row.get(9)?,
        created_at: parse_timestamp(10, &created_raw)?,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wager::{PurchaseMethod, WagerCategory};

    fn sample_bet(account_id: &str) -> Bet {
        Bet::new(
            account_id,
            "ev-1",
            WagerCategory::Quinella,
            PurchaseMethod::Single,
            vec![vec![3, 7]],
            300,
            300,
        )
    }

    #[tokio::test]
    async fn test_open_on_disk_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let store = LedgerStore::open(path.to_str().unwrap()).unwrap();

        store.get_or_create_account("acct-1", 1000).await.unwrap();
        let bet = sample_bet("acct-1");
        store.insert_purchase(&bet).await.unwrap();

        let loaded = store.bet(bet.id).await.unwrap().unwrap();
        assert_eq!(loaded.combinations, bet.combinations);
        assert_eq!(loaded.category, WagerCategory::Quinella);
        assert_eq!(loaded.status, BetStatus::Open);
        assert_eq!(loaded.total_stake, 300);
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = LedgerStore::open_in_memory().unwrap();
        let first = store.get_or_create_account("acct-1", 500).await.unwrap();
        assert_eq!(first.balance, 500);
        // Second contact must not re-grant.
        let second = store.get_or_create_account("acct-1", 500).await.unwrap();
        assert_eq!(second.balance, 500);
        let history = store.history("acct-1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason, HistoryReason::Registration);
    }

    #[tokio::test]
    async fn test_deposit_requires_account() {
        let store = LedgerStore::open_in_memory().unwrap();
        let err = store.deposit("ghost", 100).await.unwrap_err();
        assert!(matches!(err, EngineError::UnknownAccount(_)));
    }

    #[tokio::test]
    async fn test_deposit_rejects_non_positive() {
        let store = LedgerStore::open_in_memory().unwrap();
        store.get_or_create_account("acct-1", 0).await.unwrap();
        let err = store.deposit("acct-1", 0).await.unwrap_err();
        assert!(matches!(err, EngineError::CorruptLedger(_)));
        let err = store.deposit("acct-1", -50).await.unwrap_err();
        assert!(matches!(err, EngineError::CorruptLedger(_)));
    }

    #[tokio::test]
    async fn test_insufficient_balance_leaves_no_trace() {
        let store = LedgerStore::open_in_memory().unwrap();
        store.get_or_create_account("acct-1", 100).await.unwrap();

        let bet = sample_bet("acct-1");
        let err = store.insert_purchase(&bet).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Rejected(RejectReason::InsufficientBalance {
                balance: 100,
                required: 300
            })
        ));

        assert_eq!(store.account("acct-1").await.unwrap().unwrap().balance, 100);
        assert!(store.bet(bet.id).await.unwrap().is_none());
        assert_eq!(store.history("acct-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_settle_guard_blocks_second_sweep() {
        let store = LedgerStore::open_in_memory().unwrap();
        store.get_or_create_account("acct-1", 1000).await.unwrap();
        let bet = sample_bet("acct-1");
        store.insert_purchase(&bet).await.unwrap();
        store.close_open_bets("ev-1").await.unwrap();

        assert!(store.settle_bet(&bet, BetStatus::Won, 900).await.unwrap());
        // Second application hits the status guard and mutates nothing.
        assert!(!store.settle_bet(&bet, BetStatus::Won, 900).await.unwrap());

        let balance = store.account("acct-1").await.unwrap().unwrap().balance;
        assert_eq!(balance, 1000 - 300 + 900);
        assert!(store.audit_account("acct-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_settle_rejects_non_settlement_target() {
        let store = LedgerStore::open_in_memory().unwrap();
        store.get_or_create_account("acct-1", 1000).await.unwrap();
        let bet = sample_bet("acct-1");
        store.insert_purchase(&bet).await.unwrap();

        let err = store
            .settle_bet(&bet, BetStatus::Closed, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_lost_settlement_writes_zero_delta_entry() {
        let store = LedgerStore::open_in_memory().unwrap();
        store.get_or_create_account("acct-1", 1000).await.unwrap();
        let bet = sample_bet("acct-1");
        store.insert_purchase(&bet).await.unwrap();
        store.close_open_bets("ev-1").await.unwrap();

        assert!(store.settle_bet(&bet, BetStatus::Lost, 0).await.unwrap());
        let history = store.history("acct-1").await.unwrap();
        let settlement = history
            .iter()
            .find(|e| e.reason == HistoryReason::Settlement)
            .unwrap();
        assert_eq!(settlement.delta, 0);
        assert_eq!(settlement.bet_id, Some(bet.id));
    }

    #[tokio::test]
    async fn test_void_refunds_total_stake() {
        let store = LedgerStore::open_in_memory().unwrap();
        store.get_or_create_account("acct-1", 1000).await.unwrap();
        let bet = sample_bet("acct-1");
        store.insert_purchase(&bet).await.unwrap();

        assert!(store.void_bet(&bet).await.unwrap());
        assert!(!store.void_bet(&bet).await.unwrap());

        let balance = store.account("acct-1").await.unwrap().unwrap().balance;
        assert_eq!(balance, 1000);
        assert!(store.audit_account("acct-1").await.unwrap());
        let stored = store.bet(bet.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BetStatus::Void);
    }

    #[tokio::test]
    async fn test_close_open_bets_counts_once() {
        let store = LedgerStore::open_in_memory().unwrap();
        store.get_or_create_account("acct-1", 1000).await.unwrap();
        let a = sample_bet("acct-1");
        let b = sample_bet("acct-1");
        store.insert_purchase(&a).await.unwrap();
        store.insert_purchase(&b).await.unwrap();

        assert_eq!(store.close_open_bets("ev-1").await.unwrap(), 2);
        assert_eq!(store.close_open_bets("ev-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bets_for_event_filters_status() {
        let store = LedgerStore::open_in_memory().unwrap();
        store.get_or_create_account("acct-1", 1000).await.unwrap();
        let a = sample_bet("acct-1");
        store.insert_purchase(&a).await.unwrap();

        let open = store.bets_for_event("ev-1", BetStatus::Open).await.unwrap();
        assert_eq!(open.len(), 1);
        let closed = store
            .bets_for_event("ev-1", BetStatus::Closed)
            .await
            .unwrap();
        assert!(closed.is_empty());
    }
}
