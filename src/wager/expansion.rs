//! Combination Expander
//!
//! Turns a validated selection into the concrete list of combinations that
//! are each purchased as an individual unit stake, plus the floor-division
//! split of the total stake across them.
//!
//! # Determinism
//!
//! Output order is the natural nested iteration order of the caller's
//! input. This is load-bearing: the unit-stake allocation divides the total
//! evenly and drops the remainder, so a stable order keeps the allocation
//! reproducible across replays.
//!
//! # Rounding loss
//!
//! `total / combinations` is floored and the remainder is **not refunded**.
//! That is the inherited business rule, made explicit and tested in
//! [`split_stake`]: the sum of allocated unit stakes never exceeds the
//! amount debited, and never gains.

use crate::error::{Amount, RejectReason};
use crate::wager::{
    all_distinct, canonicalize, HorseNumber, NumberTuple, PurchaseMethod, Selections,
    WagerCategory,
};

/// Expand a validated selection into purchasable combinations.
///
/// Never returns an empty list: a selection whose expansion eliminates
/// every combination (total group overlap) is a rejection, not a
/// zero-length bet.
pub fn expand(
    category: WagerCategory,
    method: PurchaseMethod,
    selections: &Selections,
) -> Result<Vec<NumberTuple>, RejectReason> {
    let arity = category.arity();
    let ordered = category.is_ordered();

    let combinations = match (method, selections) {
        (PurchaseMethod::Single, Selections::Flat(numbers)) => {
            let tuple = if ordered {
                numbers.clone()
            } else {
                canonicalize(numbers.clone())
            };
            vec![tuple]
        }
        (PurchaseMethod::Single, Selections::Grouped(groups)) => {
            // Ordered position-by-position selection; validator guarantees
            // one number per group.
            vec![groups.iter().map(|g| g[0]).collect()]
        }
        (PurchaseMethod::Box, Selections::Flat(numbers)) => {
            if ordered {
                k_permutations(numbers, arity)
            } else {
                k_subsets(numbers, arity)
            }
        }
        (PurchaseMethod::Formation, Selections::Grouped(groups)) => {
            formation_product(groups, ordered)
        }
        // Shape mismatches are caught by validation; reaching here with a
        // mismatched shape is still a rejection, not a panic.
        (PurchaseMethod::Box, Selections::Grouped(_)) => {
            return Err(RejectReason::WrongShape(PurchaseMethod::Box))
        }
        (PurchaseMethod::Formation, Selections::Flat(_)) => {
            return Err(RejectReason::WrongShape(PurchaseMethod::Formation))
        }
    };

    if combinations.is_empty() {
        return Err(RejectReason::NoCombinations);
    }
    Ok(combinations)
}

/// All k-subsets of `numbers`, canonicalized ascending, in nested iteration
/// order of the input.
fn k_subsets(numbers: &[HorseNumber], k: usize) -> Vec<NumberTuple> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(k);
    subsets_from(numbers, k, 0, &mut current, &mut out);
    out
}

fn subsets_from(
    numbers: &[HorseNumber],
    k: usize,
    start: usize,
    current: &mut NumberTuple,
    out: &mut Vec<NumberTuple>,
) {
    if current.len() == k {
        out.push(canonicalize(current.clone()));
        return;
    }
    for i in start..numbers.len() {
        current.push(numbers[i]);
        subsets_from(numbers, k, i + 1, current, out);
        current.pop();
    }
}

/// All k-permutations of `numbers`, order meaningful, in nested iteration
/// order of the input.
fn k_permutations(numbers: &[HorseNumber], k: usize) -> Vec<NumberTuple> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(k);
    permutations_from(numbers, k, &mut current, &mut out);
    out
}

fn permutations_from(
    numbers: &[HorseNumber],
    k: usize,
    current: &mut NumberTuple,
    out: &mut Vec<NumberTuple>,
) {
    if current.len() == k {
        out.push(current.clone());
        return;
    }
    for &n in numbers {
        if current.contains(&n) {
            continue;
        }
        current.push(n);
        permutations_from(numbers, k, current, out);
        current.pop();
    }
}

/// Cross-product of the formation groups. Tuples with repeated numbers are
/// discarded; overlap between groups can also produce duplicate tuples,
/// which collapse to their first occurrence.
fn formation_product(groups: &[Vec<HorseNumber>], ordered: bool) -> Vec<NumberTuple> {
    let mut out: Vec<NumberTuple> = Vec::new();
    let mut current = Vec::with_capacity(groups.len());
    product_from(groups, ordered, &mut current, &mut out);
    out
}

fn product_from(
    groups: &[Vec<HorseNumber>],
    ordered: bool,
    current: &mut NumberTuple,
    out: &mut Vec<NumberTuple>,
) {
    let depth = current.len();
    if depth == groups.len() {
        if !all_distinct(current) {
            return;
        }
        let tuple = if ordered {
            current.clone()
        } else {
            canonicalize(current.clone())
        };
        if !out.contains(&tuple) {
            out.push(tuple);
        }
        return;
    }
    for &n in &groups[depth] {
        current.push(n);
        product_from(groups, ordered, current, out);
        current.pop();
    }
}

// =============================================================================
// STAKE SPLIT
// =============================================================================

/// Result of dividing a total stake across combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeSplit {
    /// Stake carried by each individual combination.
    pub unit_stake: Amount,
    /// `unit_stake * combinations`; what is actually at risk.
    pub allocated: Amount,
    /// `total - allocated`; kept by the house, never refunded.
    pub remainder: Amount,
}

/// Divide `total` evenly across `combinations`, dropping the remainder.
pub fn split_stake(total: Amount, combinations: usize) -> Result<StakeSplit, RejectReason> {
    let n = combinations as Amount;
    let unit_stake = total / n;
    if unit_stake <= 0 {
        return Err(RejectReason::StakeTooSmall {
            total,
            combinations,
        });
    }
    let allocated = unit_stake * n;
    Ok(StakeSplit {
        unit_stake,
        allocated,
        remainder: total - allocated,
    })
}

// =============================================================================
// TESTS
// =============================================================================
