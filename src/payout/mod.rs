//! Payout Resolver
//!
//! Resolves a bet's combinations against the official dividend table of a
//! finalized event. Pure and total over the table: a category whose
//! dividends are not yet published resolves to [`PayoutOutcome::Deferred`],
//! never to a loss. The finish order is consulted only as a WIN/PLACE
//! sanity cross-check; the dividend table is authoritative.
//!
//! Dividends are expressed per 100 units of stake, so a winning combination
//! pays `unit_stake * payout_per_unit / 100`, floored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Amount;
use crate::ledger::bet::Bet;
use crate::wager::{canonicalize, HorseNumber, NumberTuple, WagerCategory};

/// Dividend figures are per this many units of stake.
pub const DIVIDEND_BASE: Amount = 100;

// =============================================================================
// EVENT RESULT
// =============================================================================

/// One published dividend line for a winning combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendEntry {
    /// Winning combination; single number for WIN/PLACE, pair or triple
    /// otherwise. Ordered categories list it in finish order.
    pub numbers: NumberTuple,
    /// Payout per [`DIVIDEND_BASE`] units of stake.
    pub payout_per_unit: Amount,
    /// Pre-race favorite rank of the combination, as published.
    pub favorite_rank: u32,
}

/// Official result of an event, supplied by the results feed.
///
/// The engine only reads this. A category absent from `dividends` (or
/// present but empty) means its figures are not official yet; such a
/// partially populated result must never be treated as final for that
/// category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventResult {
    pub event_id: String,
    pub finish_order: Vec<HorseNumber>,
    pub dividends: HashMap<WagerCategory, Vec<DividendEntry>>,
}

impl EventResult {
    pub fn new(event_id: impl Into<String>, finish_order: Vec<HorseNumber>) -> Self {
        Self {
            event_id: event_id.into(),
            finish_order,
            dividends: HashMap::new(),
        }
    }

    pub fn with_dividends(
        mut self,
        category: WagerCategory,
        entries: Vec<DividendEntry>,
    ) -> Self {
        self.dividends.insert(category, entries);
        self
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Outcome of resolving one bet against a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutOutcome {
    /// Dividends were official; the bet is decidable.
    Settled {
        /// How many of the bet's combinations matched a dividend line.
        winning_combinations: usize,
        /// Total credit across all winning combinations.
        payout: Amount,
    },
    /// Dividends for the bet's category are not yet published. Retry later;
    /// never conflate with a loss.
    Deferred,
}

/// Resolve a bet against an event result.
pub fn resolve(bet: &Bet, result: &EventResult) -> PayoutOutcome {
    let entries = match result.dividends.get(&bet.category) {
        Some(entries) if !entries.is_empty() => entries,
        _ => return PayoutOutcome::Deferred,
    };

    let mut winning_combinations = 0;
    let mut payout: Amount = 0;
    for combination in &bet.combinations {
        let mut combination_won = false;
        for entry in entries {
            if tuple_matches(bet.category, combination, &entry.numbers) {
                combination_won = true;
                payout += bet.unit_stake * entry.payout_per_unit / DIVIDEND_BASE;
                cross_check_finish_order(bet.category, combination, result);
            }
        }
        if combination_won {
            winning_combinations += 1;
        }
    }

    PayoutOutcome::Settled {
        winning_combinations,
        payout,
    }
}

/// Category-specific match between a bet combination and a dividend line.
fn tuple_matches(
    category: WagerCategory,
    combination: &NumberTuple,
    entry_numbers: &[HorseNumber],
) -> bool {
    match category {
        // Single-number categories match by membership; PLACE publishes one
        // line per paying position and each is checked independently.
        WagerCategory::Win | WagerCategory::Place => {
            combination.len() == 1 && entry_numbers.contains(&combination[0])
        }
        // Ordered categories match element for element.
        WagerCategory::Exacta | WagerCategory::Trifecta => combination == entry_numbers,
        // Unordered categories match by set equality; bet tuples are stored
        // canonical, the table line is canonicalized here.
        WagerCategory::BracketQuinella
        | WagerCategory::Quinella
        | WagerCategory::Wide
        | WagerCategory::Trio => *combination == canonicalize(entry_numbers.to_vec()),
    }
}

/// WIN/PLACE sanity check: a number the dividend table pays should appear in
/// the published finish order. A mismatch means the feed is internally
/// inconsistent; the dividend table still wins, but it is worth a warning.
fn cross_check_finish_order(
    category: WagerCategory,
    combination: &NumberTuple,
    result: &EventResult,
) {
    if !matches!(category, WagerCategory::Win | WagerCategory::Place) {
        return;
    }
    if result.finish_order.is_empty() {
        return;
    }
    let number = combination[0];
    let consistent = match category {
        WagerCategory::Win => result.finish_order.first() == Some(&number),
        _ => result.finish_order.contains(&number),
    };
    if !consistent {
        warn!(
            event_id = %result.event_id,
            category = category.code(),
            number,
            "dividend table pays a number the finish order does not support"
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================
