// tests/replay_log_tests.rs
use cardcount_core::ClassNames;
use cardcount_cv::detection::{read_frames, write_frames, ReplaySource};
use cardcount_cv::traits::run_source;
use cardcount_cv::{AdapterConfig, BBox, CardTracker, DetectionAdapter, FrameRecord, RawDetection};

fn frame(labels: &[&str], confidence: f64) -> FrameRecord {
    FrameRecord {
        frame: None,
        detections: labels
            .iter()
            .map(|l| RawDetection::named(l, BBox::new(10, 10, 30, 50, confidence)))
            .collect(),
    }
}

#[test]
fn test_logged_frames_replay_to_the_same_count() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("table.jsonl");

    // a pair of fours and a ten, then a weak ghost queen that must be ignored
    let mut frames = vec![frame(&["4D", "4D", "4D", "10C"], 0.9); 3];
    frames.extend(vec![frame(&["QH"], 0.2); 4]);
    write_frames(&path, &frames)?;

    let recorded = read_frames(&path)?;
    assert_eq!(recorded.len(), 7);
    assert_eq!(recorded[6].frame, Some(7));

    let config = AdapterConfig::with_min_confidence(0.5);
    let adapter = DetectionAdapter::new(ClassNames::standard(), config);
    let mut source = ReplaySource::new(recorded, &adapter);
    let mut tracker = CardTracker::default();

    let mut departures = Vec::new();
    let processed = run_source(&mut source, &mut tracker, |frame, tracker| {
        if tracker.removed_count_this_frame() > 0 {
            departures.push((frame, tracker.removed_count_this_frame()));
        }
        Ok(())
    })?;

    assert_eq!(processed, 7);
    // two fours (+2) and the ten (-1) leave together on the fourth miss
    assert_eq!(departures, vec![(7, 3)]);
    assert_eq!(tracker.running_count(), 1);
    assert!(tracker.tracked_card("QH").is_none());
    Ok(())
}
