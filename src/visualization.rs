use std::path::Path;

use anyhow::Result;
use rerun::{RecordingStream, RecordingStreamBuilder};

use crate::pipeline::TrackedFrame;

/// Draws tracked boxes and their identities into a rerun recording
pub struct Renderer {
    recorder: RecordingStream,
}

impl Renderer {
    pub fn new(path: &Path) -> Result<Self> {
        let recorder = RecordingStreamBuilder::new("centroid-tracker").save(path)?;
        Ok(Renderer { recorder })
    }

    pub fn render(&self, frame: &TrackedFrame) -> Result<()> {
        self.recorder
            .set_time_sequence("frame", frame.frame_number as i64);
        self.recorder.set_time_seconds("time", frame.time);

        let (mins, sizes): (Vec<[f32; 2]>, Vec<[f32; 2]>) = frame
            .detections
            .iter()
            .map(|t| {
                let b = &t.detection.bbox;
                (
                    [b.left as f32, b.top as f32],
                    [b.width() as f32, b.height() as f32],
                )
            })
            .unzip();
        let labels: Vec<String> = frame
            .detections
            .iter()
            .map(|t| match t.id {
                Some(id) => format!("ID {} {}", id, t.detection.class_name()),
                None => t.detection.class_name(),
            })
            .collect();
        self.recorder.log(
            "camera/detections",
            &rerun::Boxes2D::from_mins_and_sizes(mins, sizes).with_labels(labels),
        )?;

        // every tracked object, including the ones coasting through a miss
        let positions: Vec<[f32; 2]> = frame
            .objects
            .iter()
            .map(|(_, c)| [c.x as f32, c.y as f32])
            .collect();
        let labels: Vec<String> = frame
            .objects
            .iter()
            .map(|(id, _)| format!("ID {}", id))
            .collect();
        self.recorder.log(
            "camera/centroids",
            &rerun::Points2D::new(positions).with_labels(labels),
        )?;

        Ok(())
    }
}
