//! Wager Domain Types
//!
//! Bet categories, purchase methods, and the selection shapes a wager is
//! placed with. A wager is a `(category, method, selections)` triple plus a
//! stake; expansion turns it into concrete purchasable combinations.
//!
//! # Canonical tuples
//!
//! For unordered categories (quinella, wide, trio, ...) a combination is
//! stored sorted ascending so that equality against a dividend table entry
//! is order-independent. Ordered categories (exacta, trifecta) keep the
//! finish order the caller gave.

use serde::{Deserialize, Serialize};

pub mod expansion;
pub mod validation;

/// Entrant (horse) number. Positive; zero is never a valid entrant.
pub type HorseNumber = u8;

/// One concrete purchasable combination of entrant numbers.
pub type NumberTuple = Vec<HorseNumber>;

// =============================================================================
// WAGER CATEGORY
// =============================================================================

/// Bet category. Each category fixes how many numbers a combination holds
/// (its arity) and whether finish order matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WagerCategory {
    /// First place, single number.
    Win,
    /// In the money, single number.
    Place,
    /// First two brackets in either order.
    BracketQuinella,
    /// First two in either order.
    Quinella,
    /// Any two of the first three, either order.
    Wide,
    /// First two in exact order.
    Exacta,
    /// First three in exact order.
    Trifecta,
    /// First three in either order.
    Trio,
}

impl WagerCategory {
    /// Number of entrant numbers in one combination.
    pub fn arity(&self) -> usize {
        match self {
            WagerCategory::Win | WagerCategory::Place => 1,
            WagerCategory::BracketQuinella
            | WagerCategory::Quinella
            | WagerCategory::Wide
            | WagerCategory::Exacta => 2,
            WagerCategory::Trifecta | WagerCategory::Trio => 3,
        }
    }

    /// Whether finish order within a combination is significant.
    pub fn is_ordered(&self) -> bool {
        matches!(self, WagerCategory::Exacta | WagerCategory::Trifecta)
    }

    /// Stable code used for storage and logs.
    pub fn code(&self) -> &'static str {
        match self {
            WagerCategory::Win => "WIN",
            WagerCategory::Place => "PLACE",
            WagerCategory::BracketQuinella => "BRACKET_QUINELLA",
            WagerCategory::Quinella => "QUINELLA",
            WagerCategory::Wide => "WIDE",
            WagerCategory::Exacta => "EXACTA",
            WagerCategory::Trifecta => "TRIFECTA",
            WagerCategory::Trio => "TRIO",
        }
    }

    /// Parse a stored code back into a category.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "WIN" => Some(WagerCategory::Win),
            "PLACE" => Some(WagerCategory::Place),
            "BRACKET_QUINELLA" => Some(WagerCategory::BracketQuinella),
            "QUINELLA" => Some(WagerCategory::Quinella),
            "WIDE" => Some(WagerCategory::Wide),
            "EXACTA" => Some(WagerCategory::Exacta),
            "TRIFECTA" => Some(WagerCategory::Trifecta),
            "TRIO" => Some(WagerCategory::Trio),
            _ => None,
        }
    }
}

// =============================================================================
// PURCHASE METHOD
// =============================================================================

/// How the raw selection is turned into combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseMethod {
    /// Exactly one combination, as selected.
    Single,
    /// Every valid combination drawn from one flat set of numbers.
    Box,
    /// One candidate group per finish position; cross-product expansion.
    Formation,
}

impl PurchaseMethod {
    pub fn code(&self) -> &'static str {
        match self {
            PurchaseMethod::Single => "SINGLE",
            PurchaseMethod::Box => "BOX",
            PurchaseMethod::Formation => "FORMATION",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SINGLE" => Some(PurchaseMethod::Single),
            "BOX" => Some(PurchaseMethod::Box),
            "FORMATION" => Some(PurchaseMethod::Formation),
            _ => None,
        }
    }
}

// =============================================================================
// SELECTIONS
// =============================================================================

/// Raw numbers a wager was placed with, shaped by purchase method.
///
/// `Flat` carries one set of numbers (SINGLE, BOX). `Grouped` carries one
/// group of candidates per finish position (FORMATION, or SINGLE on an
/// ordered category selected position-by-position). The tagged shape
/// replaces runtime inspection of a dynamically-typed selection payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selections {
    Flat(Vec<HorseNumber>),
    Grouped(Vec<Vec<HorseNumber>>),
}

impl Selections {
    pub fn flat(numbers: impl Into<Vec<HorseNumber>>) -> Self {
        Selections::Flat(numbers.into())
    }

    pub fn grouped(groups: impl Into<Vec<Vec<HorseNumber>>>) -> Self {
        Selections::Grouped(groups.into())
    }
}

/// Sort a tuple ascending so unordered combinations compare by set equality.
pub fn canonicalize(mut tuple: NumberTuple) -> NumberTuple {
    tuple.sort_unstable();
    tuple
}

/// True if every number in the tuple is distinct.
pub fn all_distinct(numbers: &[HorseNumber]) -> bool {
    for (i, n) in numbers.iter().enumerate() {
        if numbers[i + 1..].contains(n) {
            return false;
        }
    }
    true
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_per_category() {
        assert_eq!(WagerCategory::Win.arity(), 1);
        assert_eq!(WagerCategory::Place.arity(), 1);
        assert_eq!(WagerCategory::Quinella.arity(), 2);
        assert_eq!(WagerCategory::BracketQuinella.arity(), 2);
        assert_eq!(WagerCategory::Wide.arity(), 2);
        assert_eq!(WagerCategory::Exacta.arity(), 2);
        assert_eq!(WagerCategory::Trifecta.arity(), 3);
        assert_eq!(WagerCategory::Trio.arity(), 3);
    }

    #[test]
    fn test_ordered_flags() {
        assert!(WagerCategory::Exacta.is_ordered());
        assert!(WagerCategory::Trifecta.is_ordered());
        assert!(!WagerCategory::Quinella.is_ordered());
        assert!(!WagerCategory::Trio.is_ordered());
        assert!(!WagerCategory::Win.is_ordered());
    }

    #[test]
    fn test_code_round_trip() {
        for cat in [
            WagerCategory::Win,
            WagerCategory::Place,
            WagerCategory::BracketQuinella,
            WagerCategory::Quinella,
            WagerCategory::Wide,
            WagerCategory::Exacta,
            WagerCategory::Trifecta,
            WagerCategory::Trio,
        ] {
            assert_eq!(WagerCategory::from_code(cat.code()), Some(cat));
        }
        assert_eq!(WagerCategory::from_code("SUPERFECTA"), None);
    }

    #[test]
    fn test_canonicalize_sorts_ascending() {
        assert_eq!(canonicalize(vec![9, 3, 7]), vec![3, 7, 9]);
        assert_eq!(canonicalize(vec![1]), vec![1]);
    }

    #[test]
    fn test_all_distinct() {
        assert!(all_distinct(&[1, 2, 3]));
        assert!(!all_distinct(&[1, 2, 1]));
        assert!(all_distinct(&[]));
    }
}
