use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use anyhow::{bail, Result, Context as AnyhowContext};
use serde::Deserialize;
use log::warn;

use crate::detection::Detection;

/// One frame worth of detector output
#[derive(Clone, Debug, PartialEq)]
pub struct InputFrame {
    pub time: f64,
    pub detections: Vec<Detection>,
}

#[derive(Deserialize)]
struct Record {
    time: f64,
    detections: Option<Vec<Detection>>,
}

/// Anything that hands out frames of detections, one per call
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<InputFrame>>;

    /// Number of frames if known up front, used for progress reporting
    fn length(&self) -> Option<u64> {
        None
    }
}

/// Detections recorded as JSON lines, one frame per line
pub struct DetectionLog<R> {
    reader: R,
    line: String,
    line_number: usize,
}

impl DetectionLog<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open detection log {}", path.display()))?;
        Ok(DetectionLog::new(BufReader::new(file)))
    }
}

impl<R: BufRead> DetectionLog<R> {
    pub fn new(reader: R) -> Self {
        DetectionLog {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> FrameSource for DetectionLog<R> {
    fn next_frame(&mut self) -> Result<Option<InputFrame>> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return Ok(None),
                Err(err) => bail!("Failed to read line {}: {}", self.line_number + 1, err),
                _ => {},
            }
            self.line_number += 1;

            if self.line.trim().is_empty() {
                continue;
            }

            let record: Record = serde_json::from_str(&self.line)
                .with_context(|| format!("JSON deserialization failed for line {}: {}", self.line_number, self.line.trim()))?;

            match record.detections {
                Some(detections) => return Ok(Some(InputFrame {
                    time: record.time,
                    detections,
                })),
                None => {
                    warn!("Line {} has no detections, skipping", self.line_number);
                    continue;
                }
            }
        }
    }
}
