//! Per-card tracking record and its state transitions

use super::config::Thresholds;
use cardcount_core::Card;
use serde::Serialize;

/// Lifecycle of a tracked card.
///
/// ```text
/// Candidate --(seen long enough)--> Confirmed <--(seen again)-- Occluded
///     |                                 |                          ^  |
///     | missed too long: dropped        +------(missed)------------+  | missed too long: counted
///
/// any state --(seen for longer than the background time)--> Background
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CardState {
    /// Recently appeared, not yet trusted
    Candidate,
    /// Stable on the table
    Confirmed,
    /// Confirmed but not detected in recent frames
    Occluded,
    /// Seen for so long it is part of the scene; only exists on the way to the blacklist
    Background,
}

/// What the tracker must do with an entity after it has been advanced one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Stays in the live table
    Kept,
    /// Blacklist the card and evict it, without counting
    Background,
    /// The card left the table: count it and evict it
    Departed,
    /// An unconfirmed candidate vanished: evict it silently
    Dropped,
}

/// Physical cards implied by the number of corners detected for one identity.
///
/// Each card shows up to two labelled corners, so 1-2 detections are one
/// card, 3-4 are two cards of the same identity (multi-deck shoes).
pub fn cards_from_detections(detection_count: u32) -> u32 {
    detection_count.div_ceil(2)
}

/// Tracking record for one card identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedCard {
    pub card: Card,
    /// Detections of this identity in the frame it was last seen
    pub detection_count: u32,
    pub confirmed_card_count: u32,
    /// Frames in which the card has been seen since creation; misses do not reset it
    pub frames_detected: u32,
    pub frames_since_last_seen: u32,
    pub state: CardState,
}

impl TrackedCard {
    pub fn new(card: Card, detection_count: u32) -> Self {
        Self {
            card,
            detection_count,
            confirmed_card_count: cards_from_detections(detection_count),
            frames_detected: 1,
            frames_since_last_seen: 0,
            state: CardState::Candidate,
        }
    }

    /// Advance one frame in which the card was detected `detection_count` times
    pub fn observe(&mut self, detection_count: u32, thresholds: &Thresholds) -> Outcome {
        self.detection_count = detection_count;
        self.confirmed_card_count = cards_from_detections(detection_count);
        self.frames_detected = self.frames_detected.saturating_add(1);
        self.frames_since_last_seen = 0;

        if self.frames_detected > thresholds.frames_background {
            self.state = CardState::Background;
            return Outcome::Background;
        }

        self.state = match self.state {
            CardState::Candidate if self.frames_detected >= thresholds.frames_to_confirm => {
                CardState::Confirmed
            }
            CardState::Occluded => CardState::Confirmed,
            state @ (CardState::Candidate | CardState::Confirmed | CardState::Background) => state,
        };
        Outcome::Kept
    }

    /// Advance one frame in which the card was not detected
    pub fn miss(&mut self, thresholds: &Thresholds) -> Outcome {
        self.frames_since_last_seen = self.frames_since_last_seen.saturating_add(1);
        let timed_out = self.frames_since_last_seen > thresholds.frames_occlusion;

        match self.state {
            CardState::Confirmed => {
                self.state = CardState::Occluded;
                Outcome::Kept
            }
            CardState::Occluded if timed_out => Outcome::Departed,
            CardState::Candidate if timed_out => Outcome::Dropped,
            CardState::Occluded | CardState::Candidate | CardState::Background => Outcome::Kept,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardcount_core::{Rank, Suit};

    const THRESHOLDS: Thresholds = Thresholds {
        frames_to_confirm: 3,
        frames_occlusion: 3,
        frames_background: 30,
    };

    fn seven_hearts() -> Card {
        Card::new(Rank::Seven, Suit::Hearts)
    }

    #[test]
    fn test_cards_from_detections() {
        let counts: Vec<u32> = (0..=5).map(cards_from_detections).collect();
        assert_eq!(counts, vec![0, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_new_is_candidate() {
        let tracked = TrackedCard::new(seven_hearts(), 3);
        assert_eq!(tracked.state, CardState::Candidate);
        assert_eq!(tracked.confirmed_card_count, 2);
        assert_eq!(tracked.frames_detected, 1);
        assert_eq!(tracked.frames_since_last_seen, 0);
    }

    #[test]
    fn test_confirms_on_third_frame() {
        let mut tracked = TrackedCard::new(seven_hearts(), 2);
        assert_eq!(tracked.observe(2, &THRESHOLDS), Outcome::Kept);
        assert_eq!(tracked.state, CardState::Candidate);
        assert_eq!(tracked.observe(2, &THRESHOLDS), Outcome::Kept);
        assert_eq!(tracked.state, CardState::Confirmed);
        assert_eq!(tracked.frames_detected, 3);
    }

    #[test]
    fn test_occluded_card_recovers() {
        let mut tracked = TrackedCard::new(seven_hearts(), 1);
        tracked.state = CardState::Confirmed;

        for _ in 0..3 {
            assert_eq!(tracked.miss(&THRESHOLDS), Outcome::Kept);
            assert_eq!(tracked.state, CardState::Occluded);
        }
        assert_eq!(tracked.observe(1, &THRESHOLDS), Outcome::Kept);
        assert_eq!(tracked.state, CardState::Confirmed);
        assert_eq!(tracked.frames_since_last_seen, 0);
    }

    #[test]
    fn test_occluded_card_departs_after_grace_period() {
        let mut tracked = TrackedCard::new(seven_hearts(), 1);
        tracked.state = CardState::Confirmed;

        let outcomes: Vec<Outcome> = (0..4).map(|_| tracked.miss(&THRESHOLDS)).collect();
        assert_eq!(outcomes, vec![Outcome::Kept, Outcome::Kept, Outcome::Kept, Outcome::Departed]);
    }

    #[test]
    fn test_candidate_dropped_after_grace_period() {
        let mut tracked = TrackedCard::new(seven_hearts(), 1);
        let outcomes: Vec<Outcome> = (0..4).map(|_| tracked.miss(&THRESHOLDS)).collect();
        assert_eq!(outcomes, vec![Outcome::Kept, Outcome::Kept, Outcome::Kept, Outcome::Dropped]);
        assert_eq!(tracked.state, CardState::Candidate);
    }

    #[test]
    fn test_misses_do_not_reset_frames_detected() {
        let mut tracked = TrackedCard::new(seven_hearts(), 1);
        tracked.observe(1, &THRESHOLDS);
        tracked.miss(&THRESHOLDS);
        tracked.observe(1, &THRESHOLDS);
        assert_eq!(tracked.frames_detected, 3);
        assert_eq!(tracked.state, CardState::Confirmed);
    }

    #[test]
    fn test_background_after_long_presence() {
        let mut tracked = TrackedCard::new(seven_hearts(), 2);
        for _ in 1..30 {
            assert_eq!(tracked.observe(2, &THRESHOLDS), Outcome::Kept);
        }
        assert_eq!(tracked.frames_detected, 30);
        assert_eq!(tracked.observe(2, &THRESHOLDS), Outcome::Background);
        assert_eq!(tracked.state, CardState::Background);
    }
}
