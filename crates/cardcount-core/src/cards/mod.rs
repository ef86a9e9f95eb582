pub mod card;
pub mod classes;
pub mod hilo;

pub use card::{Card, DECK_SIZE, ParseCardError, Rank, Suit};
pub use classes::ClassNames;
pub use hilo::HiLo;
