//! Card tracker: turns per-frame detections into card departures and a Hi-Lo count

use super::config::{Thresholds, TrackerConfig, validate_frame_rate};
use super::entity::{Outcome, TrackedCard};
use crate::detection::Detection;
use crate::error::TrackerError;
use cardcount_core::Card;
use log::{debug, trace};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Tracks cards on the table across frames and keeps the running Hi-Lo count.
///
/// A card is counted once, when it leaves the table: it must first be
/// confirmed (seen for the confirm time), then go undetected for longer
/// than the occlusion grace period. Cards that never leave are eventually
/// blacklisted as part of the scene.
///
/// `update` must be called once per frame, in order. The tracker is not
/// meant to be shared; wrap it in a `Mutex` if several threads feed it.
#[derive(Debug, Clone)]
pub struct CardTracker {
    config: TrackerConfig,
    thresholds: Thresholds,

    tracked: BTreeMap<String, TrackedCard>,
    background: BTreeSet<String>,
    running_count: i64,
    frames_processed: u64,

    removed_this_frame: Vec<Card>,
    removed_count_this_frame: usize,
}

/// Snapshot of the tracker after one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub running_count: i64,
    pub removed: Vec<Card>,
    pub removed_count: usize,
    pub tracked: Vec<TrackedCard>,
    pub background: Vec<String>,
}

impl CardTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        let tracker = Self::from_valid_config(config);
        debug!(
            "Tracker at {} fps: confirm {} frames, occlusion {} frames, background {} frames",
            tracker.config.frame_rate,
            tracker.thresholds.frames_to_confirm,
            tracker.thresholds.frames_occlusion,
            tracker.thresholds.frames_background
        );
        Ok(tracker)
    }

    fn from_valid_config(config: TrackerConfig) -> Self {
        let thresholds = Thresholds::from_config(&config);
        Self {
            config,
            thresholds,
            tracked: BTreeMap::new(),
            background: BTreeSet::new(),
            running_count: 0,
            frames_processed: 0,
            removed_this_frame: Vec::new(),
            removed_count_this_frame: 0,
        }
    }

    /// Tracker with default timing at the given frame rate
    pub fn with_frame_rate(frame_rate: f64) -> Result<Self, TrackerError> {
        Self::new(TrackerConfig::at_fps(frame_rate))
    }

    /// Change the frame rate. Only the thresholds change; tracked cards keep their counters.
    pub fn set_frame_rate(&mut self, frame_rate: f64) -> Result<(), TrackerError> {
        validate_frame_rate(frame_rate)?;
        self.config.frame_rate = frame_rate;
        self.thresholds = Thresholds::from_config(&self.config);
        debug!("Frame rate set to {}: {:?}", frame_rate, self.thresholds);
        Ok(())
    }

    /// Process the complete set of detections of one frame.
    pub fn update(&mut self, detections: &[Detection]) {
        self.removed_this_frame.clear();
        self.removed_count_this_frame = 0;
        self.frames_processed += 1;

        // Corners seen per identity, ignoring blacklisted cards
        let mut counts: BTreeMap<String, (Card, u32)> = BTreeMap::new();
        for detection in detections {
            let key = detection.card.key();
            if self.background.contains(&key) {
                continue;
            }
            counts.entry(key).or_insert((detection.card, 0)).1 += 1;
        }
        trace!("Frame {}: {} identities detected", self.frames_processed, counts.len());

        let thresholds = self.thresholds;
        let Self {
            tracked,
            background,
            running_count,
            removed_this_frame,
            removed_count_this_frame,
            ..
        } = self;

        tracked.retain(|key, card| {
            let previous = card.state;
            let outcome = match counts.remove(key) {
                Some((_, count)) => card.observe(count, &thresholds),
                None => card.miss(&thresholds),
            };
            if card.state != previous {
                debug!("{} {:?} -> {:?}", key, previous, card.state);
            }

            match outcome {
                Outcome::Kept => true,
                Outcome::Background => {
                    debug!(
                        "{} seen for {} frames, ignoring it from now on",
                        key, card.frames_detected
                    );
                    background.insert(key.clone());
                    false
                }
                Outcome::Departed => {
                    let cards = card.confirmed_card_count as usize;
                    let delta = card.card.hilo().weight() * cards as i64;
                    removed_this_frame.extend(std::iter::repeat_n(card.card, cards));
                    *removed_count_this_frame += cards;
                    *running_count += delta;
                    debug!(
                        "{} x{} left the table, count {:+} -> {}",
                        key, cards, delta, running_count
                    );
                    false
                }
                Outcome::Dropped => {
                    debug!("{} dropped before confirmation", key);
                    false
                }
            }
        });

        for (key, (card, count)) in counts {
            debug!("{} new candidate ({} detections)", key, count);
            tracked.insert(key, TrackedCard::new(card, count));
        }
    }

    /// Forget every card, the blacklist and the count. Configuration is kept.
    pub fn reset(&mut self) {
        self.tracked.clear();
        self.background.clear();
        self.removed_this_frame.clear();
        self.removed_count_this_frame = 0;
        self.running_count = 0;
        self.frames_processed = 0;
    }

    pub fn running_count(&self) -> i64 {
        self.running_count
    }

    /// Cards that left the table in the last processed frame, one entry per physical card
    pub fn removed_this_frame(&self) -> &[Card] {
        &self.removed_this_frame
    }

    pub fn removed_count_this_frame(&self) -> usize {
        self.removed_count_this_frame
    }

    pub fn tracked_cards(&self) -> &BTreeMap<String, TrackedCard> {
        &self.tracked
    }

    pub fn tracked_card(&self, key: &str) -> Option<&TrackedCard> {
        self.tracked.get(key)
    }

    pub fn background_keys(&self) -> &BTreeSet<String> {
        &self.background
    }

    pub fn frame_rate(&self) -> f64 {
        self.config.frame_rate
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn report(&self, frame: u64) -> FrameReport {
        FrameReport {
            frame,
            running_count: self.running_count,
            removed: self.removed_this_frame.clone(),
            removed_count: self.removed_count_this_frame,
            tracked: self.tracked.values().cloned().collect(),
            background: self.background.iter().cloned().collect(),
        }
    }
}

impl Default for CardTracker {
    fn default() -> Self {
        Self::from_valid_config(TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::CardState;
    use cardcount_core::{Rank, Suit};

    fn card(label: &str) -> Card {
        label.parse().unwrap()
    }

    fn corners(label: &str, n: usize) -> Vec<Detection> {
        vec![Detection::of(card(label)); n]
    }

    #[test]
    fn test_tracker_new() {
        let tracker = CardTracker::default();
        assert_eq!(tracker.frame_rate(), 1.0);
        assert_eq!(tracker.running_count(), 0);
        assert!(tracker.tracked_cards().is_empty());
        assert!(tracker.background_keys().is_empty());
        assert_eq!(tracker.thresholds().frames_to_confirm, 3);
    }

    #[test]
    fn test_rejects_invalid_frame_rate() {
        assert_eq!(
            CardTracker::with_frame_rate(0.0).unwrap_err(),
            TrackerError::InvalidFrameRate(0.0)
        );
        assert!(CardTracker::with_frame_rate(-1.0).is_err());

        let mut tracker = CardTracker::default();
        assert!(tracker.set_frame_rate(f64::INFINITY).is_err());
        assert_eq!(tracker.frame_rate(), 1.0);
    }

    #[test]
    fn test_empty_frames() {
        let mut tracker = CardTracker::default();
        tracker.update(&[]);
        assert!(tracker.tracked_cards().is_empty());
        assert!(tracker.removed_this_frame().is_empty());
        assert_eq!(tracker.frames_processed(), 1);
    }

    #[test]
    fn test_detections_tallied_per_identity() {
        let mut tracker = CardTracker::default();
        let mut frame = corners("5C", 3);
        frame.extend(corners("KD", 4));
        frame.push(Detection::of(card("2S")));
        tracker.update(&frame);

        let tracked = tracker.tracked_cards();
        assert_eq!(tracked.len(), 3);
        assert_eq!(tracked["5C"].detection_count, 3);
        assert_eq!(tracked["5C"].confirmed_card_count, 2);
        assert_eq!(tracked["KD"].confirmed_card_count, 2);
        assert_eq!(tracked["2S"].confirmed_card_count, 1);
        assert!(tracked.values().all(|t| t.state == CardState::Candidate));
    }

    #[test]
    fn test_set_frame_rate_keeps_counters() {
        let mut tracker = CardTracker::default();
        tracker.update(&corners("9H", 1));
        tracker.update(&corners("9H", 1));
        tracker.set_frame_rate(2.0).unwrap();

        assert_eq!(tracker.thresholds().frames_to_confirm, 6);
        assert_eq!(tracker.tracked_card("9H").map(|t| t.frames_detected), Some(2));
    }

    #[test]
    fn test_departure_counts_each_physical_card() {
        let mut tracker = CardTracker::default();
        for _ in 0..3 {
            tracker.update(&corners("4D", 4));
        }
        assert_eq!(tracker.tracked_card("4D").map(|t| t.state), Some(CardState::Confirmed));

        for _ in 0..3 {
            tracker.update(&[]);
            assert!(tracker.removed_this_frame().is_empty());
        }
        tracker.update(&[]);

        let four_diamonds = Card::new(Rank::Four, Suit::Diamonds);
        assert_eq!(tracker.removed_this_frame(), &[four_diamonds, four_diamonds]);
        assert_eq!(tracker.removed_count_this_frame(), 2);
        assert_eq!(tracker.running_count(), 2);
        assert!(tracker.tracked_cards().is_empty());

        // transient outputs only describe the latest frame
        tracker.update(&[]);
        assert!(tracker.removed_this_frame().is_empty());
        assert_eq!(tracker.removed_count_this_frame(), 0);
        assert_eq!(tracker.running_count(), 2);
    }

    #[test]
    fn test_report_snapshot() {
        let mut tracker = CardTracker::default();
        tracker.update(&corners("JC", 2));
        let report = tracker.report(7);

        assert_eq!(report.frame, 7);
        assert_eq!(report.tracked.len(), 1);
        assert_eq!(report.tracked[0].card.key(), "JC");
        assert!(report.removed.is_empty());
        assert!(report.background.is_empty());
    }
}
