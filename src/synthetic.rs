use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::config::SyntheticConfig;
use crate::dataset::{FrameSource, InputFrame};
use crate::detection::{BoundingBox, Detection};
use crate::my_types::*;

const FRAME_RATE: f64 = 30.;
const MAX_SPEED: f64 = 8.;
const BOX_SIZE: (f64, f64) = (40., 120.);
const CLASS_NAMES: [&str; 3] = ["person", "car", "bicycle"];

#[derive(Debug)]
struct Mover {
    position: Vector2d,
    velocity: Vector2d,
    size: Vector2d,
    class_id: u32,
}

/// Objects moving at constant speed inside the frame, bouncing off the
/// borders. Every frame each object is missed with some probability, like a
/// flaky detector.
pub struct SyntheticScene {
    rng: Xoshiro256PlusPlus,
    movers: Vec<Mover>,
    width: f64,
    height: f64,
    drop_probability: f64,
    frame_count: usize,
    frame_number: usize,
}

impl SyntheticScene {
    pub fn new(config: &SyntheticConfig, seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let width = config.frame_width;
        let height = config.frame_height;
        let movers = (0..config.synthetic_objects)
            .map(|i| {
                let size = Vector2d::new(
                    rng.gen_range(BOX_SIZE.0..BOX_SIZE.1),
                    rng.gen_range(BOX_SIZE.0..BOX_SIZE.1),
                );
                Mover {
                    position: Vector2d::new(
                        rng.gen_range(0. ..(width - size.x).max(1.)),
                        rng.gen_range(0. ..(height - size.y).max(1.)),
                    ),
                    velocity: Vector2d::new(
                        rng.gen_range(-MAX_SPEED..MAX_SPEED),
                        rng.gen_range(-MAX_SPEED..MAX_SPEED),
                    ),
                    size,
                    class_id: (i % CLASS_NAMES.len()) as u32,
                }
            })
            .collect();

        SyntheticScene {
            rng,
            movers,
            width,
            height,
            drop_probability: config.drop_probability.clamp(0., 1.),
            frame_count: config.synthetic_frames,
            frame_number: 0,
        }
    }

    fn step(&mut self) {
        for mover in self.movers.iter_mut() {
            mover.position += mover.velocity;
            let limits = [self.width - mover.size.x, self.height - mover.size.y];
            for axis in 0..2 {
                if mover.position[axis] < 0. || mover.position[axis] > limits[axis] {
                    mover.velocity[axis] = -mover.velocity[axis];
                    mover.position[axis] = mover.position[axis].clamp(0., limits[axis].max(0.));
                }
            }
        }
    }
}

impl FrameSource for SyntheticScene {
    fn next_frame(&mut self) -> Result<Option<InputFrame>> {
        if self.frame_number >= self.frame_count {
            return Ok(None);
        }
        if self.frame_number > 0 {
            self.step();
        }

        let mut detections = vec![];
        for mover in &self.movers {
            if self.rng.gen_bool(self.drop_probability) {
                continue;
            }
            let bbox = BoundingBox::new(
                mover.position.x,
                mover.position.y,
                mover.position.x + mover.size.x,
                mover.position.y + mover.size.y,
            );
            let confidence = self.rng.gen_range(0.5..1.);
            detections.push(
                Detection::new(bbox, confidence, mover.class_id)
                    .with_label(CLASS_NAMES[mover.class_id as usize]),
            );
        }

        let time = self.frame_number as f64 / FRAME_RATE;
        self.frame_number += 1;
        Ok(Some(InputFrame { time, detections }))
    }

    fn length(&self) -> Option<u64> {
        Some(self.frame_count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(scene: &mut SyntheticScene) -> Vec<InputFrame> {
        let mut frames = vec![];
        while let Some(frame) = scene.next_frame().unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_same_seed_same_frames() {
        let config = SyntheticConfig {
            synthetic_frames: 20,
            ..Default::default()
        };
        let a = collect(&mut SyntheticScene::new(&config, 7));
        let b = collect(&mut SyntheticScene::new(&config, 7));
        assert_eq!(a.len(), 20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_boxes_stay_inside_frame() {
        let config = SyntheticConfig {
            synthetic_frames: 500,
            synthetic_objects: 6,
            drop_probability: 0.,
            ..Default::default()
        };
        let frames = collect(&mut SyntheticScene::new(&config, 1));
        for frame in frames {
            assert_eq!(frame.detections.len(), 6);
            for d in frame.detections {
                assert!(d.bbox.left >= 0. && d.bbox.right <= config.frame_width + 1e-9);
                assert!(d.bbox.top >= 0. && d.bbox.bottom <= config.frame_height + 1e-9);
                assert!(d.confidence >= 0.5);
            }
        }
    }

    #[test]
    fn test_detections_carry_class_names() {
        let config = SyntheticConfig {
            synthetic_frames: 1,
            synthetic_objects: 4,
            drop_probability: 0.,
            ..Default::default()
        };
        let frames = collect(&mut SyntheticScene::new(&config, 5));
        let names: Vec<String> = frames[0].detections.iter().map(|d| d.class_name()).collect();
        assert_eq!(names, vec!["person", "car", "bicycle", "person"]);
        assert_eq!(frames[0].detections[1].class_id, 1);
    }

    #[test]
    fn test_everything_dropped() {
        let config = SyntheticConfig {
            synthetic_frames: 5,
            drop_probability: 1.,
            ..Default::default()
        };
        let frames = collect(&mut SyntheticScene::new(&config, 3));
        assert!(frames.iter().all(|f| f.detections.is_empty()));
    }
}
