//! Randomized demonstration detector.

use crate::catalog::SPECIES;
use crate::constants::simulated::{EDGE_MARGIN, EDGE_OFFSET, MAX_CONFIDENCE, MAX_DETECTIONS};
use crate::constants::DEFAULT_MIN_CONFIDENCE;
use crate::error::{Error, Result};
use crate::inference::{BoundingBox, Detection, SpeciesDetector};
use image::RgbImage;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Detector that draws random catalogue species and boxes.
///
/// Useful for exercising the whole pipeline without a model. With a fixed
/// seed the sequence of detections is reproducible.
pub struct SimulatedDetector {
    rng: Mutex<StdRng>,
}

impl SimulatedDetector {
    /// Create a detector, seeded for reproducibility when `seed` is set.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            rng: Mutex::new(rng),
        }
    }
}

/// Inclusive random pick that collapses to `hi` when the range is empty.
fn pick(rng: &mut StdRng, lo: u32, hi: u32) -> u32 {
    if hi <= lo {
        hi
    } else {
        rng.random_range(lo..=hi)
    }
}

/// Random box inside a `width` x `height` image.
fn random_box(rng: &mut StdRng, width: u32, height: u32) -> BoundingBox {
    let x = pick(rng, EDGE_OFFSET, width / 2);
    let y = pick(rng, EDGE_OFFSET, height / 2);
    let box_width = pick(rng, width / 8, width / 3).max(1);
    let box_height = pick(rng, height / 8, height / 3).max(1);

    BoundingBox {
        x: x.min(width.saturating_sub(box_width + EDGE_MARGIN)),
        y: y.min(height.saturating_sub(box_height + EDGE_MARGIN)),
        width: box_width,
        height: box_height,
    }
}

impl SpeciesDetector for SimulatedDetector {
    fn name(&self) -> &str {
        "simulated"
    }

    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>> {
        let mut rng = self.rng.lock().map_err(|_| Error::Inference {
            reason: "simulated detector state poisoned".to_string(),
        })?;

        let count = rng.random_range(1..=MAX_DETECTIONS);
        let chosen: Vec<_> = SPECIES.choose_multiple(&mut *rng, count).collect();

        let detections = chosen
            .into_iter()
            .map(|species| {
                let confidence = rng.random_range(DEFAULT_MIN_CONFIDENCE..MAX_CONFIDENCE);
                let bbox = random_box(&mut rng, image.width(), image.height());
                Detection::from_label(species.common_name, confidence, Some(bbox))
            })
            .collect();

        Ok(detections)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_detections_within_bounds() {
        let detector = SimulatedDetector::new(Some(7));
        let image = RgbImage::new(640, 480);

        for _ in 0..50 {
            let detections = detector.detect(&image).unwrap();
            assert!((1..=3).contains(&detections.len()));

            let names: HashSet<_> = detections.iter().map(|d| d.species.clone()).collect();
            assert_eq!(names.len(), detections.len(), "species must be distinct");

            for d in &detections {
                assert!((0.5..0.95).contains(&d.confidence));
                assert!(d.info.is_some());
                let b = d.bounding_box.unwrap();
                assert!(b.x + b.width + 5 <= 640);
                assert!(b.y + b.height + 5 <= 480);
                assert!(b.width >= 640 / 8 && b.width <= 640 / 3);
            }
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let image = RgbImage::new(300, 200);
        let a = SimulatedDetector::new(Some(42)).detect(&image).unwrap();
        let b = SimulatedDetector::new(Some(42)).detect(&image).unwrap();

        let key = |ds: &[Detection]| {
            ds.iter()
                .map(|d| (d.species.clone(), d.confidence.to_bits(), d.bounding_box))
                .collect::<Vec<_>>()
        };
        assert_eq!(key(&a), key(&b));
    }

    #[test]
    fn test_tiny_image_does_not_panic() {
        let detector = SimulatedDetector::new(Some(1));
        for (w, h) in [(1, 1), (5, 30), (12, 12)] {
            let detections = detector.detect(&RgbImage::new(w, h)).unwrap();
            assert!(!detections.is_empty());
        }
    }
}
