//! Sequence models mapping a `lookback × columns` window to the next scaled close.

pub mod handle;
pub mod lstm;
pub mod ridge;
pub mod store;

use std::path::PathBuf;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::windows::TrainingSet;

pub use handle::ModelHandle;
pub use lstm::LstmRegressor;
pub use store::ModelArtifact;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected input of shape {expected:?}, got {found:?}")]
    Shape {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("no training windows")]
    NoTrainingData,
    #[error("normal equations are singular or nearly singular")]
    Singular,
    #[error("failed to access model file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode model: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode model: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("model fitting task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hyper-parameters shared by every fit; part of a persisted model's identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub hidden_size: usize,
    pub layers: usize,
    pub seed: u64,
    pub ridge: f64,
}

pub trait SequenceModel: Sized {
    fn fit(spec: &ModelSpec, data: &TrainingSet) -> Result<Self, ModelError>;

    /// Scaled next-step target for one window.
    fn predict(&self, window: ArrayView2<f64>) -> Result<f64, ModelError>;
}
