//! On-disk model artifacts (bincode).

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{LstmRegressor, ModelError, ModelSpec};
use crate::features::Column;

/// A fitted model together with the input layout it was fitted for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub columns: Vec<Column>,
    pub lookback: usize,
    pub spec: ModelSpec,
    pub model: LstmRegressor,
}

impl ModelArtifact {
    /// Whether this artifact can serve requests with the given layout.
    pub fn is_compatible(&self, columns: &[Column], lookback: usize, spec: &ModelSpec) -> bool {
        self.columns == columns && self.lookback == lookback && &self.spec == spec
    }

    /// Writes to a sibling temp file first so readers never see a partial file.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let io_err = |source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        info!(path = %path.display(), columns = self.columns.len(), "saved model");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (artifact, _) = bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
        Ok(artifact)
    }
}
