//! Headline sentiment scoring.
//!
//! Two backends implement [`SentimentAnalyzer`]: the FinBERT-tone classifier
//! served by the Hugging Face inference API, and an offline financial lexicon.
//! [`build_analyzer`] picks one from configuration.

pub mod config;
pub mod error;
pub mod finbert;
pub mod lexicon;
pub mod score;

use std::sync::Arc;

use async_trait::async_trait;
use shared_utils::env::optional_env_var;
use tracing::{info, warn};

pub use config::{SentimentBackend, SentimentConfig};
pub use error::SentimentError;
pub use score::SentimentScore;

use crate::{finbert::FinbertClient, lexicon::LexiconAnalyzer};

/// Only the first headlines of a batch are scored.
pub const MAX_HEADLINES: usize = 10;

#[async_trait]
pub trait SentimentAnalyzer {
    /// Mean class probabilities over at most [`MAX_HEADLINES`] headlines.
    ///
    /// An empty slice yields [`SentimentScore::zero`] without doing any work.
    async fn analyze(&self, headlines: &[String]) -> Result<SentimentScore, SentimentError>;
}

pub type SharedAnalyzer = Arc<dyn SentimentAnalyzer + Send + Sync>;

/// Builds the configured backend.
///
/// FinBERT without `HF_API_TOKEN` falls back to the lexicon.
pub fn build_analyzer(config: &SentimentConfig) -> Result<SharedAnalyzer, SentimentError> {
    match config.backend {
        SentimentBackend::Lexicon => Ok(Arc::new(LexiconAnalyzer::default())),
        SentimentBackend::Finbert => match optional_env_var(finbert::TOKEN_VAR) {
            Some(token) => {
                info!(model = %config.model, "using hosted FinBERT sentiment");
                Ok(Arc::new(FinbertClient::new(config, token.into())?))
            }
            None => {
                warn!("{} is not set; falling back to lexicon sentiment", finbert::TOKEN_VAR);
                Ok(Arc::new(LexiconAnalyzer::default()))
            }
        },
    }
}
