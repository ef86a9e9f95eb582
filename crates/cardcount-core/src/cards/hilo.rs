//! Hi-Lo card counting weights

use super::card::Rank;
use serde::{Deserialize, Serialize};

/// Hi-Lo tag of a rank: low cards raise the count, high cards lower it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HiLo {
    Low,
    Neutral,
    High,
}

impl HiLo {
    /// 2-6 are low, 7-9 neutral, 10/J/Q/K/A high.
    pub fn of(rank: Rank) -> HiLo {
        use Rank::*;
        match rank {
            Two | Three | Four | Five | Six => HiLo::Low,
            Seven | Eight | Nine => HiLo::Neutral,
            Ten | Jack | Queen | King | Ace => HiLo::High,
        }
    }

    /// Lenient lookup by rank symbol. Unrecognised symbols count as neutral.
    pub fn of_symbol(symbol: &str) -> HiLo {
        Rank::from_symbol(symbol.trim()).map_or(HiLo::Neutral, HiLo::of)
    }

    /// Contribution to the running count.
    pub fn weight(self) -> i64 {
        match self {
            HiLo::Low => 1,
            HiLo::Neutral => 0,
            HiLo::High => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_cover_every_rank() {
        let weights: Vec<i64> = Rank::ALL.iter().map(|&r| HiLo::of(r).weight()).collect();
        assert_eq!(weights, vec![1, 1, 1, 1, 1, 0, 0, 0, -1, -1, -1, -1, -1]);
        // a full deck is balanced
        assert_eq!(weights.iter().sum::<i64>(), 0);
    }

    #[test]
    fn test_unknown_symbol_is_neutral() {
        assert_eq!(HiLo::of_symbol("Z"), HiLo::Neutral);
        assert_eq!(HiLo::of_symbol("1"), HiLo::Neutral);
        assert_eq!(HiLo::of_symbol("K"), HiLo::High);
        assert_eq!(HiLo::of_symbol(" 5 "), HiLo::Low);
    }
}
