//! Process-wide fitted model.

use std::{path::PathBuf, sync::Arc};

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{LstmRegressor, ModelArtifact, ModelError, ModelSpec, SequenceModel};
use crate::{config::ForecastConfig, features::Column, windows::TrainingSet};

/// Holds the current [`ModelArtifact`] and builds a new one when needed.
///
/// Readers never block: the artifact is published through an `ArcSwapOption`.
/// Builds are single flight. Concurrent cold starts queue on the build lock
/// and re-check after acquiring it, so only the first one fits.
pub struct ModelHandle {
    current: ArcSwapOption<ModelArtifact>,
    build_lock: Mutex<()>,
    spec: ModelSpec,
    path: Option<PathBuf>,
    reuse: bool,
}

impl ModelHandle {
    pub fn new(spec: ModelSpec, path: Option<PathBuf>, reuse: bool) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            build_lock: Mutex::new(()),
            spec,
            path,
            reuse,
        }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new(config.model_spec(), config.model_path.clone(), config.reuse_model)
    }

    /// The artifact currently published, if any.
    pub fn current(&self) -> Option<Arc<ModelArtifact>> {
        self.current.load_full()
    }

    fn compatible(&self, columns: &[Column], lookback: usize) -> Option<Arc<ModelArtifact>> {
        self.current()
            .filter(|a| a.is_compatible(columns, lookback, &self.spec))
    }

    /// Reads the persisted artifact when it matches the requested layout.
    async fn load_persisted(&self, columns: &[Column], lookback: usize) -> Option<Arc<ModelArtifact>> {
        let path = self.path.clone()?;
        if !path.exists() {
            return None;
        }
        let loaded = tokio::task::spawn_blocking(move || ModelArtifact::load(&path)).await;
        match loaded {
            Ok(Ok(artifact)) if artifact.is_compatible(columns, lookback, &self.spec) => {
                info!("loaded persisted model");
                Some(Arc::new(artifact))
            }
            Ok(Ok(_)) => {
                info!("persisted model does not match the requested layout; refitting");
                None
            }
            Ok(Err(e)) => {
                warn!(error = %e, "ignoring unreadable persisted model");
                None
            }
            Err(e) => {
                warn!(error = %e, "model load task failed");
                None
            }
        }
    }

    /// A model fitted for `columns` and `lookback`.
    ///
    /// With reuse enabled a compatible artifact (in memory, then on disk) is
    /// returned without looking at `data`; otherwise a new model is fitted on
    /// the blocking pool, published, and persisted when a path is configured.
    pub async fn fitted(
        &self,
        columns: &[Column],
        lookback: usize,
        data: TrainingSet,
    ) -> Result<Arc<ModelArtifact>, ModelError> {
        if self.reuse {
            if let Some(artifact) = self.compatible(columns, lookback) {
                return Ok(artifact);
            }
        }

        let _guard = self.build_lock.lock().await;
        if self.reuse {
            if let Some(artifact) = self.compatible(columns, lookback) {
                return Ok(artifact);
            }
            if let Some(artifact) = self.load_persisted(columns, lookback).await {
                self.current.store(Some(artifact.clone()));
                return Ok(artifact);
            }
        }

        let spec = self.spec.clone();
        let samples = data.len();
        let model = tokio::task::spawn_blocking(move || LstmRegressor::fit(&spec, &data)).await??;
        let artifact = Arc::new(ModelArtifact {
            columns: columns.to_vec(),
            lookback,
            spec: self.spec.clone(),
            model,
        });
        info!(samples, columns = columns.len(), lookback, "fitted new model");

        if self.reuse {
            if let Some(path) = self.path.clone() {
                let to_save = artifact.clone();
                match tokio::task::spawn_blocking(move || to_save.save(&path)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "failed to persist model"),
                    Err(e) => warn!(error = %e, "model save task failed"),
                }
            }
        }
        self.current.store(Some(artifact.clone()));
        Ok(artifact)
    }
}
