//! Engine Configuration

use serde::{Deserialize, Serialize};

use crate::error::Amount;

/// Tunable rules of the wagering engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Stakes must be positive multiples of this unit.
    pub stake_unit: Amount,

    /// Balance granted when an account is first opened (registration grant).
    /// Zero disables the grant.
    pub starting_balance: Amount,

    /// Maximum BOX selection size for two-number categories.
    pub box_cap_pairs: usize,

    /// Maximum BOX selection size for three-number categories.
    pub box_cap_triples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        // Caps mirror realistic field sizes; the stake unit is the standard
        // 100-unit ticket denomination.
        Self {
            stake_unit: 100,
            starting_balance: 0,
            box_cap_pairs: 10,
            box_cap_triples: 7,
        }
    }
}

impl EngineConfig {
    /// BOX selection cap for a category of the given arity.
    pub fn box_cap(&self, arity: usize) -> usize {
        if arity >= 3 {
            self.box_cap_triples
        } else {
            self.box_cap_pairs
        }
    }
}
