//! Display formatting helpers.

/// Format a confidence score as a percentage with one decimal (`0.853` -> `85.3%`).
pub fn format_confidence(confidence: impl Into<f64>) -> String {
    format!("{:.1}%", confidence.into() * 100.0)
}

/// Round a value to a fixed number of decimal places.
pub fn round_to(value: f64, places: usize) -> f64 {
    let factor = 10f64.powi(i32::try_from(places).unwrap_or(i32::MAX));
    (value * factor).round() / factor
}
