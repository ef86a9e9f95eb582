//! Conversion from raw detector records to typed card detections

use super::config::AdapterConfig;
use crate::bbox::{BBox, BBoxCollection};
use cardcount_core::{Card, ClassNames};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// How a raw record names its class: by label text or by detector index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassRef {
    Index(usize),
    Name(String),
}

/// One box as emitted by the detector, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub class: ClassRef,
    #[serde(flatten)]
    pub bbox: BBox,
}

impl RawDetection {
    pub fn named(label: &str, bbox: BBox) -> Self {
        Self {
            class: ClassRef::Name(label.to_string()),
            bbox,
        }
    }

    /// Resolve the class to a card. Unknown names and indices resolve to `None`.
    pub fn card(&self, classes: &ClassNames) -> Option<Card> {
        match &self.class {
            ClassRef::Index(index) => classes.card(*index),
            ClassRef::Name(name) => name.parse().ok(),
        }
    }
}

/// A validated detection: one visible card corner in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub card: Card,
    pub bbox: BBox,
}

impl Detection {
    pub fn new(card: Card, bbox: BBox) -> Self {
        Self { card, bbox }
    }

    /// Detection without geometry, for callers that only know the card
    pub fn of(card: Card) -> Self {
        Self::new(card, BBox::default())
    }

    pub fn from_raw(raw: &RawDetection, classes: &ClassNames) -> Option<Self> {
        raw.card(classes).map(|card| Self::new(card, raw.bbox))
    }
}

/// Boundary between the detector and the tracker.
///
/// Everything that is not a confident, recognisable card is dropped here so
/// the tracker only ever sees valid identities.
#[derive(Debug, Clone, Default)]
pub struct DetectionAdapter {
    classes: ClassNames,
    config: AdapterConfig,
}

impl DetectionAdapter {
    pub fn new(classes: ClassNames, config: AdapterConfig) -> Self {
        Self { classes, config }
    }

    pub fn classes(&self) -> &ClassNames {
        &self.classes
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Convert one frame of raw records into detections
    pub fn adapt(&self, raw: &[RawDetection]) -> Vec<Detection> {
        let detections: BBoxCollection = raw
            .iter()
            .filter(|r| !(self.config.reject_empty_boxes && r.bbox.is_empty()))
            .filter_map(|r| {
                let detection = Detection::from_raw(r, &self.classes);
                if detection.is_none() {
                    debug!("Ignoring unrecognised class {:?}", r.class);
                }
                detection
            })
            .collect();
        let detections = detections.filter_by_confidence(self.config.min_confidence);

        trace!(
            "Adapted {} of {} raw detections: {:?}",
            detections.len(),
            raw.len(),
            detections.stats().card_counts
        );
        detections.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardcount_core::{Rank, Suit};

    fn corner(confidence: f64) -> BBox {
        BBox::new(0, 0, 10, 10, confidence)
    }

    #[test]
    fn test_resolve_by_name_and_index() {
        let classes = ClassNames::standard();
        let by_name = RawDetection::named("kd", corner(0.9));
        let by_index = RawDetection {
            class: ClassRef::Index(Card::new(Rank::King, Suit::Diamonds).class_index()),
            bbox: corner(0.9),
        };
        assert_eq!(by_name.card(&classes), by_index.card(&classes));
        assert_eq!(by_name.card(&classes), Some(Card::new(Rank::King, Suit::Diamonds)));
    }

    #[test]
    fn test_adapter_filters_invalid_and_weak() {
        let config = AdapterConfig::with_min_confidence(0.5);
        let adapter = DetectionAdapter::new(ClassNames::standard(), config);
        let raw = vec![
            RawDetection::named("7H", corner(0.9)),
            RawDetection::named("7H", corner(0.2)),
            RawDetection::named("joker", corner(0.9)),
            RawDetection {
                class: ClassRef::Index(400),
                bbox: corner(0.9),
            },
            RawDetection::named("AS", BBox::new(0, 0, 0, 0, 0.9)),
        ];

        let detections = adapter.adapt(&raw);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].card.key(), "7H");
    }

    #[test]
    fn test_raw_detection_json_shapes() {
        let named: RawDetection = serde_json::from_str(
            r#"{"class":"10S","x":1,"y":2,"width":3,"height":4,"confidence":0.8}"#,
        )
        .unwrap();
        assert_eq!(named.class, ClassRef::Name("10S".to_string()));
        assert_eq!(named.bbox.confidence, 0.8);

        let indexed: RawDetection =
            serde_json::from_str(r#"{"class":51,"x":1,"y":2,"width":3,"height":4}"#).unwrap();
        assert_eq!(indexed.class, ClassRef::Index(51));
        assert_eq!(indexed.card(&ClassNames::standard()).map(|c| c.key()), Some("AS".to_string()));
    }
}
