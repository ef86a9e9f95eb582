//! Card identities and Hi-Lo counting values.

pub mod cards;

pub use cards::{Card, ClassNames, HiLo, ParseCardError, Rank, Suit};
