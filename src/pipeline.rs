use anyhow::Result;
use tracing::{debug, info, warn};
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::config::Config;
use crate::dataset::InputFrame;
use crate::detection::{filter_by_confidence, BoundingBox, Detection};
use crate::my_types::*;
use crate::tracker::CentroidTracker;
use crate::visualization::Renderer;

/// A detection together with the identity the tracker gave it
#[derive(Clone, Debug)]
pub struct TrackedDetection {
    pub id: Option<ObjectId>,
    pub detection: Detection,
}

#[derive(Clone, Debug)]
pub struct TrackedFrame {
    pub frame_number: usize,
    pub time: f64,
    pub detections: Vec<TrackedDetection>,
    /// Every tracked object after the update, matched or not
    pub objects: Vec<(ObjectId, Vector2d)>,
}

impl TrackedFrame {
    /// Tracked objects with no detection in this frame
    pub fn coasting(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects
            .iter()
            .map(|(id, _)| *id)
            .filter(move |id| !self.detections.iter().any(|d| d.id == Some(*id)))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineStats {
    pub frames: usize,
    pub discarded_frames: usize,
    pub detections: usize,
    pub identities: usize,
    pub peak_objects: usize,
}

/// Per-frame loop: filter detections, track them, render
pub struct Pipeline {
    tracker: CentroidTracker,
    confidence_threshold: f64,
    renderer: Option<Renderer>,
    last_time: Option<f64>,
    // Incremented just after processing a frame. 0 before the first frame.
    frame_number: usize,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new(config: &Config, renderer: Option<Renderer>) -> Self {
        Pipeline {
            tracker: CentroidTracker::new(config.max_disappeared),
            confidence_threshold: config.confidence_threshold,
            renderer,
            last_time: None,
            frame_number: 0,
            stats: PipelineStats::default(),
        }
    }

    pub fn tracker(&self) -> &CentroidTracker {
        &self.tracker
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Returns `None` when the frame was discarded
    pub fn process_frame(&mut self, frame: &InputFrame) -> Result<Option<TrackedFrame>> {
        if let Some(last_time) = self.last_time {
            if frame.time < last_time {
                warn!("discard unordered frame at time {}", frame.time);
                self.stats.discarded_frames += 1;
                return Ok(None);
            }
        }
        self.last_time = Some(frame.time);

        let detections = filter_by_confidence(&frame.detections, self.confidence_threshold);
        info!("Detected {} objects in frame {}", detections.len(), self.frame_number);
        for detection in &detections {
            debug!(
                "Object: {} - Confidence: {:.2}",
                detection.class_name(),
                detection.confidence
            );
        }

        let boxes: Vec<BoundingBox> = detections.iter().map(|d| d.bbox).collect();
        let objects: Vec<(ObjectId, Vector2d)> = self
            .tracker
            .update_boxes(&boxes)
            .iter()
            .map(|(id, c)| (*id, *c))
            .collect();

        let tracked = TrackedFrame {
            frame_number: self.frame_number,
            time: frame.time,
            detections: detections
                .into_iter()
                .zip(self.tracker.assignments())
                .map(|(detection, id)| TrackedDetection { id: *id, detection })
                .collect(),
            objects,
        };

        if let Some(renderer) = &self.renderer {
            renderer.render(&tracked)?;
        }

        self.stats.frames += 1;
        self.stats.detections += tracked.detections.len();
        self.stats.identities = self.tracker.next_id();
        self.stats.peak_objects = self.stats.peak_objects.max(tracked.objects.len());
        self.frame_number += 1;
        Span::current().pb_inc(1);

        Ok(Some(tracked))
    }
}
