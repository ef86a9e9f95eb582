//! Drives the tracker over a stream of frames and reports what left the table

use cardcount_cv::traits::{run_source, DetectionSource};
use cardcount_cv::CardTracker;
use log::info;
use serde::Serialize;
use std::io::Write;

/// Totals over a whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub frames: u64,
    pub cards_removed: usize,
    pub running_count: i64,
    pub background: Vec<String>,
}

/// Run every frame of `source` through `tracker`.
///
/// With `json`, one report per frame is written to `out` as soon as the
/// frame is processed; nothing is kept per frame.
pub fn run<S, W>(
    source: &mut S,
    tracker: &mut CardTracker,
    out: &mut W,
    json: bool,
) -> anyhow::Result<Summary>
where
    S: DetectionSource,
    W: Write,
{
    let mut cards_removed = 0;

    let frames = run_source(source, tracker, |frame, tracker| {
        let removed = tracker.removed_count_this_frame();
        if removed > 0 {
            cards_removed += removed;
            let keys: Vec<String> = tracker.removed_this_frame().iter().map(|c| c.key()).collect();
            info!(
                "Frame {}: removed [{}], running count {}",
                frame,
                keys.join(", "),
                tracker.running_count()
            );
        }

        if json {
            serde_json::to_writer(&mut *out, &tracker.report(frame))?;
            writeln!(out)?;
        }
        Ok(())
    })?;

    Ok(Summary {
        frames,
        cards_removed,
        running_count: tracker.running_count(),
        background: tracker.background_keys().iter().cloned().collect(),
    })
}

/// Print the totals of a run, as a final JSON line or as text
pub fn print_summary<W: Write>(out: &mut W, summary: &Summary, json: bool) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, summary)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Tracking completed:")?;
    writeln!(out, "  - Frames: {}", summary.frames)?;
    writeln!(out, "  - Cards removed: {}", summary.cards_removed)?;
    writeln!(out, "  - Running count: {:+}", summary.running_count)?;
    if !summary.background.is_empty() {
        writeln!(out, "  - Ignored as background: {}", summary.background.join(", "))?;
    }
    Ok(())
}
