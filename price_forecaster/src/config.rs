use std::path::PathBuf;

use serde::Deserialize;

use crate::{features::FeatureSet, model::ModelSpec};

/// `[forecast]` section of the service configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Rows per model input window.
    pub lookback: usize,
    pub feature_set: FeatureSet,
    /// Where the fitted model is persisted. `None` keeps it in memory only.
    pub model_path: Option<PathBuf>,
    /// Reuse a compatible fitted model across requests instead of refitting.
    pub reuse_model: bool,
    pub seed: u64,
    pub hidden_size: usize,
    pub layers: usize,
    /// L2 penalty of the readout.
    pub ridge: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback: 60,
            feature_set: FeatureSet::Full,
            model_path: None,
            reuse_model: true,
            seed: 42,
            hidden_size: 32,
            layers: 2,
            ridge: 1e-4,
        }
    }
}

impl ForecastConfig {
    pub fn model_spec(&self) -> ModelSpec {
        ModelSpec {
            hidden_size: self.hidden_size,
            layers: self.layers,
            seed: self.seed,
            ridge: self.ridge,
        }
    }
}
