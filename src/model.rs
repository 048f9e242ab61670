// GDP prediction from hand-typed indicator values.
//
// The regression itself is trained elsewhere; this module only loads the
// exported coefficients and evaluates them.
use crate::error::{DashboardError, Result};
use log::info;
use serde::Deserialize;
use std::path::Path;

pub trait Predictor {
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// Linear regression exported as JSON:
/// `{"intercept": 120.0, "coefficients": [0.5, -1.2, ...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let model: LinearModel = serde_json::from_str(&text)?;
        info!(
            "Loaded model with {} coefficients from {:?}",
            model.coefficients.len(),
            path.as_ref()
        );
        Ok(model)
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(DashboardError::FeatureCount {
                expected: self.coefficients.len(),
                got: features.len(),
            });
        }
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();
        Ok(self.intercept + dot)
    }
}

/// Parse `"0.7, 0.85, 0.65, 1.2"` into a feature vector.
pub fn parse_features(input: &str) -> Result<Vec<f64>> {
    input
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|_| DashboardError::InvalidFeature(part.to_string()))
        })
        .collect()
}
