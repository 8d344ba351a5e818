//! Wager Validator
//!
//! Shape checks for a proposed wager, applied in rule order with
//! short-circuiting, before anything is persisted. Pure: no side effects,
//! structured rejections only.
//!
//! Entrant-number confirmation against the event's actual field is the
//! caller's responsibility; this module checks selection shape only.

use crate::config::EngineConfig;
use crate::error::{Amount, RejectReason};
use crate::wager::{all_distinct, HorseNumber, PurchaseMethod, Selections, WagerCategory};

/// Validate a proposed wager.
///
/// `stake` is the total amount the caller intends to pay for the whole
/// ticket; it is divided across combinations at expansion time.
pub fn validate(
    category: WagerCategory,
    method: PurchaseMethod,
    selections: &Selections,
    stake: Amount,
    config: &EngineConfig,
) -> Result<(), RejectReason> {
    // Rule 1: WIN/PLACE tickets exist in SINGLE form only.
    if matches!(category, WagerCategory::Win | WagerCategory::Place)
        && method != PurchaseMethod::Single
    {
        return Err(RejectReason::MethodNotSupported(category));
    }

    // Rule 2: selection shape must match the purchase method.
    match method {
        PurchaseMethod::Single => validate_single(category, selections)?,
        PurchaseMethod::Box => validate_box(category, selections, config)?,
        PurchaseMethod::Formation => validate_formation(category, selections)?,
    }

    // Rule 3: stake is a positive multiple of the ticket unit.
    if stake <= 0 {
        return Err(RejectReason::StakeNotPositive);
    }
    if stake % config.stake_unit != 0 {
        return Err(RejectReason::StakeNotUnitMultiple {
            unit: config.stake_unit,
        });
    }

    Ok(())
}

fn validate_numbers(numbers: &[HorseNumber]) -> Result<(), RejectReason> {
    if numbers.iter().any(|&n| n == 0) {
        return Err(RejectReason::InvalidNumber);
    }
    if !all_distinct(numbers) {
        return Err(RejectReason::DuplicateNumber);
    }
    Ok(())
}

fn validate_single(category: WagerCategory, selections: &Selections) -> Result<(), RejectReason> {
    let arity = category.arity();
    match selections {
        Selections::Flat(numbers) => {
            if numbers.len() != arity {
                return Err(RejectReason::WrongArity {
                    expected: arity,
                    got: numbers.len(),
                });
            }
            validate_numbers(numbers)
        }
        // Position-by-position selection; one number per finish position.
        // Only meaningful when finish order matters.
        Selections::Grouped(groups) => {
            if !category.is_ordered() {
                return Err(RejectReason::WrongShape(PurchaseMethod::Single));
            }
            if groups.len() != arity {
                return Err(RejectReason::WrongGroupCount {
                    expected: arity,
                    got: groups.len(),
                });
            }
            if groups.iter().any(|g| g.len() != 1) {
                return Err(RejectReason::WrongShape(PurchaseMethod::Single));
            }
            let flattened: Vec<HorseNumber> = groups.iter().map(|g| g[0]).collect();
            validate_numbers(&flattened)
        }
    }
}

fn validate_box(
    category: WagerCategory,
    selections: &Selections,
    config: &EngineConfig,
) -> Result<(), RejectReason> {
    let numbers = match selections {
        Selections::Flat(numbers) => numbers,
        Selections::Grouped(_) => return Err(RejectReason::WrongShape(PurchaseMethod::Box)),
    };
    let arity = category.arity();
    let cap = config.box_cap(arity);
    if numbers.len() < arity || numbers.len() > cap {
        return Err(RejectReason::BoxSize {
            min: arity,
            max: cap,
            got: numbers.len(),
        });
    }
    validate_numbers(numbers)
}

fn validate_formation(
    category: WagerCategory,
    selections: &Selections,
) -> Result<(), RejectReason> {
    let groups = match selections {
        Selections::Grouped(groups) => groups,
        Selections::Flat(_) => return Err(RejectReason::WrongShape(PurchaseMethod::Formation)),
    };
    let arity = category.arity();
    if groups.len() != arity {
        return Err(RejectReason::WrongGroupCount {
            expected: arity,
            got: groups.len(),
        });
    }
    for group in groups {
        if group.is_empty() {
            return Err(RejectReason::EmptyGroup);
        }
        validate_numbers(group)?;
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
