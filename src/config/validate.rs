//! Configuration validation.

use crate::catalog::{find_location, validate_coordinates};
use crate::config::{Config, DetectorBackend, DetectorConfig};
use crate::constants::confidence;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_defaults(config)?;
    validate_locations(config)?;
    validate_detector(&config.detector)?;
    Ok(())
}

/// Validate default settings.
fn validate_defaults(config: &Config) -> Result<()> {
    let defaults = &config.defaults;

    if !(confidence::MIN..=confidence::MAX).contains(&defaults.min_confidence) {
        return Err(Error::ConfigValidation {
            message: format!(
                "min_confidence must be between {} and {}, got {}",
                confidence::MIN,
                confidence::MAX,
                defaults.min_confidence
            ),
        });
    }

    if defaults.max_dimension == 0 {
        return Err(Error::ConfigValidation {
            message: "max_dimension must be at least 1".to_string(),
        });
    }

    if let Some(ref name) = defaults.location {
        find_location(name, &config.locations)?;
    }

    Ok(())
}

/// Validate user-defined location coordinates.
fn validate_locations(config: &Config) -> Result<()> {
    for coords in config.locations.values() {
        validate_coordinates(coords.latitude, coords.longitude)?;
    }
    Ok(())
}

/// Validate detector settings (does not touch the filesystem).
fn validate_detector(detector: &DetectorConfig) -> Result<()> {
    if detector.top_k == 0 {
        return Err(Error::ConfigValidation {
            message: "detector.top_k must be at least 1".to_string(),
        });
    }

    if detector.input_size == 0 {
        return Err(Error::ConfigValidation {
            message: "detector.input_size must be at least 1".to_string(),
        });
    }

    if detector.backend == DetectorBackend::Onnx
        && (detector.model.is_none() || detector.labels.is_none())
    {
        return Err(Error::ConfigValidation {
            message: "onnx backend requires detector.model and detector.labels".to_string(),
        });
    }

    Ok(())
}

/// Check that the ONNX model and labels files exist.
pub fn validate_detector_files(detector: &DetectorConfig) -> Result<()> {
    if let Some(ref model) = detector.model
        && !model.exists()
    {
        return Err(Error::ModelFileNotFound {
            path: model.clone(),
        });
    }

    if let Some(ref labels) = detector.labels
        && !labels.exists()
    {
        return Err(Error::LabelsFileNotFound {
            path: labels.clone(),
        });
    }

    Ok(())
}
