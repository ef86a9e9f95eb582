use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::hilo::HiLo;

/// Number of distinct cards in one standard deck.
pub const DECK_SIZE: usize = 52;

const NUM_SUITS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// All ranks in class-index order.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    /// Parse a rank symbol (`"2"`..`"10"`, `"J"`, `"Q"`, `"K"`, `"A"`).
    pub fn from_symbol(symbol: &str) -> Option<Rank> {
        Rank::ALL.into_iter().find(|r| r.symbol() == symbol)
    }

    fn ordinal(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn letter(self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }

    pub fn from_letter(letter: char) -> Option<Suit> {
        Suit::ALL.into_iter().find(|s| s.letter() == letter)
    }
}

/// Errors produced when turning detector text into a [`Card`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCardError {
    #[error("card label '{0}' is too short")]
    TooShort(String),
    #[error("unknown rank '{rank}' in card label '{label}'")]
    UnknownRank { label: String, rank: String },
    #[error("unknown suit '{suit}' in card label '{label}'")]
    UnknownSuit { label: String, suit: char },
}

/// A playing card identity: rank plus suit.
///
/// Two detections carrying equal cards are treated as the same tracked
/// object regardless of where their bounding boxes are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    /// Stable string key, e.g. `"10H"` or `"AS"`.
    pub fn key(&self) -> String {
        format!("{}{}", self.rank.symbol(), self.suit.letter())
    }

    pub fn hilo(&self) -> HiLo {
        HiLo::of(self.rank)
    }

    /// Detector class index: `rank * 4 + suit`.
    pub fn class_index(&self) -> usize {
        self.rank.ordinal() * NUM_SUITS + self.suit as usize
    }

    /// Inverse of [`Card::class_index`]. Indices outside the deck map to `None`.
    pub fn from_class_index(index: usize) -> Option<Card> {
        if index >= DECK_SIZE {
            return None;
        }
        Some(Card::new(
            Rank::ALL[index / NUM_SUITS],
            Suit::ALL[index % NUM_SUITS],
        ))
    }

    /// Every card of one deck in class-index order.
    pub fn deck() -> impl Iterator<Item = Card> {
        (0..DECK_SIZE).filter_map(Card::from_class_index)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.letter())
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let normalized = label
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        if normalized.chars().count() < 2 {
            return Err(ParseCardError::TooShort(label.to_string()));
        }

        // suit = last char, rank = what remains
        let mut chars = normalized.chars();
        let suit_ch = chars.next_back().ok_or_else(|| ParseCardError::TooShort(label.to_string()))?;
        let rank_str = chars.as_str();

        let rank = Rank::from_symbol(rank_str).ok_or_else(|| ParseCardError::UnknownRank {
            label: label.to_string(),
            rank: rank_str.to_string(),
        })?;
        let suit = Suit::from_letter(suit_ch).ok_or(ParseCardError::UnknownSuit {
            label: label.to_string(),
            suit: suit_ch,
        })?;

        Ok(Card::new(rank, suit))
    }
}

impl TryFrom<String> for Card {
    type Error = ParseCardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.key()
    }
}
