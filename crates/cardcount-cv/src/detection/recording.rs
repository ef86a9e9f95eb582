//! Recorded detector output, one JSON object per frame

use super::adapter::{Detection, DetectionAdapter, RawDetection};
use crate::Result;
use crate::traits::DetectionSource;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Everything the detector reported for one video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default)]
    pub frame: Option<u64>,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

/// Read a JSON-lines detection log. Blank lines are skipped.
///
/// Frames without an explicit `frame` number are numbered by position.
pub fn read_frames<P: AsRef<Path>>(path: P) -> Result<Vec<FrameRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open detection log: {:?}", path))?;
    parse_frames(BufReader::new(file))
        .with_context(|| format!("Failed to parse detection log: {:?}", path))
}

pub fn parse_frames<R: BufRead>(reader: R) -> Result<Vec<FrameRecord>> {
    let mut frames = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let mut record: FrameRecord = serde_json::from_str(&line)
            .with_context(|| format!("Invalid frame record at line {}", line_num + 1))?;
        if record.frame.is_none() {
            record.frame = Some(frames.len() as u64 + 1);
        }
        frames.push(record);
    }

    Ok(frames)
}

/// Write frames as JSON lines
pub fn write_frames<P: AsRef<Path>>(path: P, frames: &[FrameRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create detection log: {:?}", path))?;
    let mut writer = BufWriter::new(file);

    for record in frames {
        serde_json::to_writer(&mut writer, record).context("Failed to serialize frame record")?;
        writer.write_all(b"\n")?;
    }

    writer.flush().with_context(|| format!("Failed to write detection log: {:?}", path))?;
    Ok(())
}

/// Replays recorded frames through a [`DetectionAdapter`]
pub struct ReplaySource<'a> {
    frames: std::vec::IntoIter<FrameRecord>,
    adapter: &'a DetectionAdapter,
    position: u64,
}

impl<'a> ReplaySource<'a> {
    pub fn new(frames: Vec<FrameRecord>, adapter: &'a DetectionAdapter) -> Self {
        Self {
            frames: frames.into_iter(),
            adapter,
            position: 0,
        }
    }
}

impl DetectionSource for ReplaySource<'_> {
    fn next_frame(&mut self) -> Option<(u64, Vec<Detection>)> {
        let record = self.frames.next()?;
        self.position += 1;
        let frame = record.frame.unwrap_or(self.position);
        Some((frame, self.adapter.adapt(&record.detections)))
    }
}
