//! Bounding boxes reported by the card detector
//!
//! The tracker never looks at geometry; boxes travel with detections so that
//! consumers (overlays, logs) can still locate each corner.

use crate::detection::Detection;
use cardcount_core::Card;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Represents a bounding box detection with its confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

fn full_confidence() -> f64 {
    1.0
}

impl BBox {
    /// Create a new bounding box
    pub fn new(x: i32, y: i32, width: i32, height: i32, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// A box with no extent cannot come from a real card corner
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::new(0, 0, 0, 0, full_confidence())
    }
}

/// The boxes of one frame, each tagged with the card it shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BBoxCollection {
    boxes: Vec<Detection>,
}

impl BBoxCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(boxes: Vec<Detection>) -> Self {
        Self { boxes }
    }

    pub fn push(&mut self, detection: Detection) {
        self.boxes.push(detection);
    }

    pub fn as_slice(&self) -> &[Detection] {
        &self.boxes
    }

    pub fn into_vec(self) -> Vec<Detection> {
        self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.boxes.iter()
    }

    /// Sort by confidence (descending)
    pub fn sort_by_confidence(&mut self) {
        self.boxes.sort_by(|a, b| b.bbox.confidence.total_cmp(&a.bbox.confidence));
    }

    /// Keep boxes at or above the confidence threshold
    pub fn filter_by_confidence(mut self, threshold: f64) -> Self {
        self.boxes.retain(|d| d.bbox.confidence >= threshold);
        self
    }

    pub fn filter_by_card(mut self, card: Card) -> Self {
        self.boxes.retain(|d| d.card == card);
        self
    }

    /// Boxes grouped by the card they show
    pub fn group_by_card(&self) -> BTreeMap<Card, Vec<&BBox>> {
        let mut groups: BTreeMap<Card, Vec<&BBox>> = BTreeMap::new();
        for detection in &self.boxes {
            groups.entry(detection.card).or_default().push(&detection.bbox);
        }
        groups
    }

    /// Number of boxes per card
    pub fn card_counts(&self) -> BTreeMap<Card, usize> {
        let mut counts = BTreeMap::new();
        for detection in &self.boxes {
            *counts.entry(detection.card).or_insert(0) += 1;
        }
        counts
    }

    pub fn stats(&self) -> BBoxStats {
        let mut total_confidence = 0.0;
        let mut max_confidence: f64 = 0.0;
        let mut min_confidence = f64::INFINITY;

        for detection in &self.boxes {
            let confidence = detection.bbox.confidence;
            total_confidence += confidence;
            max_confidence = max_confidence.max(confidence);
            min_confidence = min_confidence.min(confidence);
        }

        let avg_confidence = if self.boxes.is_empty() {
            0.0
        } else {
            total_confidence / self.boxes.len() as f64
        };

        BBoxStats {
            total_boxes: self.boxes.len(),
            card_counts: self
                .card_counts()
                .into_iter()
                .map(|(card, count)| (card.key(), count))
                .collect(),
            avg_confidence,
            max_confidence,
            min_confidence: if self.boxes.is_empty() { 0.0 } else { min_confidence },
        }
    }
}

impl IntoIterator for BBoxCollection {
    type Item = Detection;
    type IntoIter = std::vec::IntoIter<Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.into_iter()
    }
}

impl FromIterator<Detection> for BBoxCollection {
    fn from_iter<T: IntoIterator<Item = Detection>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

/// Statistics about a collection of boxes, keyed by card key
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BBoxStats {
    pub total_boxes: usize,
    pub card_counts: BTreeMap<String, usize>,
    pub avg_confidence: f64,
    pub max_confidence: f64,
    pub min_confidence: f64,
}
