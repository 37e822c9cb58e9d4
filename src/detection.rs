use serde::Deserialize;

use crate::my_types::*;

/// Axis aligned box in pixel coordinates
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        BoundingBox {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Midpoint of the box, the only thing the tracker looks at
    pub fn centroid(&self) -> Vector2d {
        Vector2d::new(
            (self.left + self.right) / 2.,
            (self.top + self.bottom) / 2.,
        )
    }

    /// Coordinates and the midpoint are all finite. Huge coordinates can
    /// still overflow when summed for the midpoint.
    pub fn is_finite(&self) -> bool {
        let centroid = self.centroid();
        self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
            && centroid.x.is_finite()
            && centroid.y.is_finite()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Detection {
    #[serde(flatten)]
    pub bbox: BoundingBox,
    pub confidence: f64,
    #[serde(default)]
    pub class_id: u32,
    #[serde(default)]
    pub label: Option<String>,
}

impl Detection {
    pub fn new(bbox: BoundingBox, confidence: f64, class_id: u32) -> Self {
        Detection {
            bbox,
            confidence,
            class_id,
            label: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_owned());
        self
    }

    /// Human readable class, falls back to the numeric class id
    pub fn class_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("class {}", self.class_id),
        }
    }
}

/// Keep detections that pass the confidence threshold and carry finite
/// coordinates. The tracker assumes its input went through here.
pub fn filter_by_confidence(detections: &[Detection], threshold: f64) -> Vec<Detection> {
    detections
        .iter()
        .filter(|d| d.confidence >= threshold && d.bbox.is_finite())
        .cloned()
        .collect()
}
