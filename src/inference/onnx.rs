//! ONNX Runtime image classifier.

use crate::config::{DetectorConfig, Normalization};
use crate::constants::imagenet;
use crate::error::{Error, Result};
use crate::inference::{Detection, SpeciesDetector};
use image::RgbImage;
use image::imageops::{self, FilterType};
use ort::session::Session;
use ort::value::Tensor;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Whole-image species classifier backed by an ONNX model.
pub struct OnnxDetector {
    session: Mutex<Session>,
    labels: Vec<String>,
    input_size: u32,
    top_k: usize,
    normalization: Normalization,
    softmax: bool,
}

impl OnnxDetector {
    /// Load the model and labels named in the detector configuration.
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let model = config.model.as_deref().ok_or_else(|| Error::DetectorBuild {
            reason: "no model path configured".to_string(),
        })?;
        let labels_path = config.labels.as_deref().ok_or_else(|| Error::DetectorBuild {
            reason: "no labels path configured".to_string(),
        })?;

        let labels = read_labels(labels_path)?;
        if labels.is_empty() {
            return Err(Error::DetectorBuild {
                reason: format!("labels file '{}' is empty", labels_path.display()),
            });
        }

        let session = Session::builder()
            .map_err(|e| Error::DetectorBuild {
                reason: e.to_string(),
            })?
            .commit_from_file(model)
            .map_err(|e| Error::DetectorBuild {
                reason: format!("{}: {e}", model.display()),
            })?;

        info!(
            "Loaded model: {}, {} labels, input {}x{}",
            model.display(),
            labels.len(),
            config.input_size,
            config.input_size
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
            input_size: config.input_size,
            top_k: config.top_k,
            normalization: config.normalization,
            softmax: config.softmax,
        })
    }

    /// Number of labels the model predicts.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

/// Read a labels file: one label per line, blank lines ignored.
pub fn read_labels(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| Error::LabelsRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut labels = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Error::LabelsRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            labels.push(trimmed.to_string());
        }
    }
    Ok(labels)
}

/// Resize to a square and lay pixels out as normalized NCHW f32.
pub fn to_nchw(image: &RgbImage, size: u32, normalization: Normalization) -> Vec<f32> {
    let resized = imageops::resize(image, size, size, FilterType::Triangle);
    let plane = (size as usize) * (size as usize);
    let mut data = vec![0.0f32; plane * 3];

    for (i, pixel) in resized.pixels().enumerate() {
        for c in 0..3 {
            let mut v = f32::from(pixel[c]) / 255.0;
            if normalization == Normalization::Imagenet {
                v = (v - imagenet::MEAN[c]) / imagenet::STD[c];
            }
            data[c * plane + i] = v;
        }
    }
    data
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 {
        exps.into_iter().map(|e| e / sum).collect()
    } else {
        exps
    }
}

/// Indices and scores of the `k` highest scores, best first.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed.truncate(k);
    indexed
}

impl SpeciesDetector for OnnxDetector {
    fn name(&self) -> &str {
        "onnx"
    }

    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>> {
        let size = i64::from(self.input_size);
        let data = to_nchw(image, self.input_size, self.normalization);
        let input = Tensor::from_array((vec![1i64, 3, size, size], data)).map_err(|e| {
            Error::Inference {
                reason: e.to_string(),
            }
        })?;

        let mut session = self.session.lock().map_err(|_| Error::Inference {
            reason: "failed to acquire session lock".to_string(),
        })?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;
        let (_, raw) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        if raw.len() != self.labels.len() {
            return Err(Error::Inference {
                reason: format!(
                    "model produced {} scores for {} labels",
                    raw.len(),
                    self.labels.len()
                ),
            });
        }

        let scores = if self.softmax {
            softmax(raw)
        } else {
            raw.to_vec()
        };
        debug!("Model produced {} scores", scores.len());

        Ok(top_k(&scores, self.top_k)
            .into_iter()
            .map(|(idx, score)| Detection::from_label(&self.labels[idx], score, None))
            .collect())
    }
}
