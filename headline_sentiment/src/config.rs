use std::time::Duration;

use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentBackend {
    #[default]
    Finbert,
    Lexicon,
}

/// `[sentiment]` section of the service configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub backend: SentimentBackend,
    /// Hugging Face model id.
    pub model: String,
    /// Inference endpoint root; the model path is appended as `/models/{model}`.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            backend: SentimentBackend::Finbert,
            model: "yiyanghkust/finbert-tone".to_string(),
            base_url: "https://router.huggingface.co/hf-inference".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SentimentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn model_url(&self) -> String {
        format!("{}/models/{}", self.base_url.trim_end_matches('/'), self.model)
    }
}
