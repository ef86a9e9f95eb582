use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::card::Card;

/// Detector class vocabulary: maps a class index to the card it names.
///
/// Entries that do not name a card (e.g. a "joker" or "back" class) are kept
/// as `None` so that indices stay aligned with the detector's output.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNames {
    pub classes: Vec<Option<Card>>,
}

impl ClassNames {
    /// Built-in 52-card vocabulary in `rank * 4 + suit` order.
    pub fn standard() -> Self {
        Self {
            classes: Card::deck().map(Some).collect(),
        }
    }

    /// Load a class list, one name per line.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open class list: {:?}", path))?;
        let reader = BufReader::new(file);

        let mut classes = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line
                .with_context(|| format!("Failed to read line {} from {:?}", line_num + 1, path))?;

            let name = line.trim();
            if name.is_empty() {
                continue;
            }

            match name.parse::<Card>() {
                Ok(card) => classes.push(Some(card)),
                Err(e) => {
                    warn!(
                        "Class at line {} is not a card ({}), detections of it will be ignored",
                        line_num + 1,
                        e
                    );
                    classes.push(None);
                }
            }
        }

        info!("Loaded {} classes from {:?}", classes.len(), path);
        Ok(Self { classes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Card for a detector class index, if the index is known and names a card.
    pub fn card(&self, index: usize) -> Option<Card> {
        self.classes.get(index).copied().flatten()
    }
}

impl Default for ClassNames {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};
    use std::io::Write;

    #[test]
    fn test_standard_matches_codec() {
        let classes = ClassNames::standard();
        assert_eq!(classes.len(), 52);
        assert_eq!(classes.card(0), Card::from_class_index(0));
        assert_eq!(classes.card(99), None);
    }

    #[test]
    fn test_load_keeps_indices_aligned() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "AS")?;
        writeln!(file)?;
        writeln!(file, "joker")?;
        writeln!(file, "7h")?;
        file.flush()?;

        let classes = ClassNames::load(file.path())?;
        assert_eq!(classes.len(), 3);
        assert_eq!(classes.card(0), Some(Card::new(Rank::Ace, Suit::Spades)));
        assert_eq!(classes.card(1), None);
        assert_eq!(classes.card(2), Some(Card::new(Rank::Seven, Suit::Hearts)));
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ClassNames::load("/nonexistent/classes.txt").is_err());
    }
}
