//! Synthetic blackjack table: deals cards, shows their corners for a while, then clears them

use cardcount_core::Card;
use cardcount_cv::detection::{FrameRecord, RawDetection};
use cardcount_cv::traits::DetectionSource;
use cardcount_cv::{BBox, Detection};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Knobs of the synthetic table, in seconds where timing is involved
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub frame_rate: f64,
    pub frames: u64,
    /// Chance per frame that a new card is dealt
    pub deal_probability: f64,
    /// Shortest and longest time a dealt card stays on the table
    pub stay_seconds: (f64, f64),
    /// Chance that a card on the table is missed entirely in a frame
    pub dropout: f64,
    pub max_on_table: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            frame_rate: 1.0,
            frames: 120,
            deal_probability: 0.3,
            stay_seconds: (5.0, 20.0),
            dropout: 0.1,
            max_on_table: 8,
        }
    }
}

#[derive(Debug, Clone)]
struct Dealt {
    card: Card,
    remaining: u64,
    origin: (i32, i32),
}

/// Seeded stream of detections from a single shuffled deck
pub struct TableSimulator {
    params: SimulationParams,
    rng: StdRng,
    shoe: Vec<Card>,
    table: Vec<Dealt>,
    frame: u64,
    expected_count: i64,
}

impl TableSimulator {
    pub fn new(params: SimulationParams, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut shoe: Vec<Card> = Card::deck().collect();
        shoe.shuffle(&mut rng);

        Self {
            params,
            rng,
            shoe,
            table: Vec::new(),
            frame: 0,
            expected_count: 0,
        }
    }

    /// Hi-Lo count of every card that has actually been cleared so far
    pub fn expected_count(&self) -> i64 {
        self.expected_count
    }

    pub fn cards_on_table(&self) -> usize {
        self.table.len()
    }

    fn seconds_to_frames(&self, seconds: f64) -> u64 {
        (seconds * self.params.frame_rate).ceil().max(1.0) as u64
    }

    /// Advance one frame and record it the way a detector log would
    pub fn next_record(&mut self) -> Option<FrameRecord> {
        let (frame, detections) = self.step()?;
        Some(FrameRecord {
            frame: Some(frame),
            detections: detections
                .iter()
                .map(|d| RawDetection::named(&d.card.key(), d.bbox))
                .collect(),
        })
    }

    /// Advance one frame; `None` once the configured number of frames is reached
    fn step(&mut self) -> Option<(u64, Vec<Detection>)> {
        if self.frame >= self.params.frames {
            return None;
        }
        self.frame += 1;

        // clear cards whose time is up
        let mut cleared = 0;
        self.table.retain(|dealt| {
            if dealt.remaining == 0 {
                cleared += dealt.card.hilo().weight();
                false
            } else {
                true
            }
        });
        self.expected_count += cleared;

        if self.table.len() < self.params.max_on_table
            && self.rng.gen_bool(self.params.deal_probability)
        {
            if let Some(card) = self.shoe.pop() {
                let (min, max) = self.params.stay_seconds;
                let stay = self.rng.gen_range(min..=max);
                let remaining = self.seconds_to_frames(stay);
                let origin = (self.rng.gen_range(0..1800), self.rng.gen_range(0..1000));
                self.table.push(Dealt { card, remaining, origin });
            }
        }

        let mut detections = Vec::new();
        for dealt in &mut self.table {
            dealt.remaining -= 1;
            if self.rng.gen_bool(self.params.dropout) {
                continue;
            }

            let corners = self.rng.gen_range(1..=2);
            for corner in 0..corners {
                let (x, y) = dealt.origin;
                let confidence = self.rng.gen_range(0.5..1.0);
                let bbox = BBox::new(x + corner * 90, y + corner * 140, 30, 50, confidence);
                detections.push(Detection::new(dealt.card, bbox));
            }
        }

        Some((self.frame, detections))
    }
}

impl DetectionSource for TableSimulator {
    fn next_frame(&mut self) -> Option<(u64, Vec<Detection>)> {
        self.step()
    }
}
