//! FinBERT-tone over the Hugging Face inference API.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    MAX_HEADLINES, SentimentAnalyzer,
    config::SentimentConfig,
    error::{ApiSnafu, ClientBuildSnafu, MalformedResponseSnafu, RequestSnafu, SentimentError},
    score::SentimentScore,
};

pub const TOKEN_VAR: &str = "HF_API_TOKEN";

#[derive(Deserialize, Debug)]
struct LabelScore {
    label: String,
    score: f64,
}

/// The endpoint nests per-input results, except for some single-input
/// deployments that return a flat list.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum InferenceResponse {
    Batch(Vec<Vec<LabelScore>>),
    Single(Vec<LabelScore>),
    Error { error: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Class {
    Positive,
    Negative,
    Neutral,
}

/// Accepts the model's named labels and the raw `LABEL_n` ids
/// (0 positive, 1 negative, 2 neutral).
fn class_of(label: &str) -> Option<Class> {
    match label.to_ascii_lowercase().as_str() {
        "positive" | "label_0" => Some(Class::Positive),
        "negative" | "label_1" => Some(Class::Negative),
        "neutral" | "label_2" => Some(Class::Neutral),
        _ => None,
    }
}

fn headline_score(labels: &[LabelScore]) -> Result<SentimentScore, SentimentError> {
    let mut score = SentimentScore::zero();
    for ls in labels {
        match class_of(&ls.label) {
            Some(Class::Positive) => score.positive = ls.score,
            Some(Class::Negative) => score.negative = ls.score,
            Some(Class::Neutral) => score.neutral = ls.score,
            None => {
                return MalformedResponseSnafu {
                    message: format!("unknown label {:?}", ls.label),
                }
                .fail();
            }
        }
    }
    Ok(score)
}

fn aggregate(response: InferenceResponse, expected: usize) -> Result<SentimentScore, SentimentError> {
    let per_headline = match response {
        InferenceResponse::Batch(rows) => rows,
        InferenceResponse::Single(row) => vec![row],
        InferenceResponse::Error { error } => return ApiSnafu { message: error }.fail(),
    };
    if per_headline.len() != expected {
        return MalformedResponseSnafu {
            message: format!("expected {expected} results, got {}", per_headline.len()),
        }
        .fail();
    }
    let scores = per_headline
        .iter()
        .map(Vec::as_slice)
        .map(headline_score)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SentimentScore::mean(scores))
}

pub struct FinbertClient {
    client: Client,
    url: String,
    token: SecretString,
}

impl FinbertClient {
    pub fn new(config: &SentimentConfig, token: SecretString) -> Result<Self, SentimentError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context(ClientBuildSnafu)?;
        Ok(Self {
            client,
            url: config.model_url(),
            token,
        })
    }
}

#[async_trait]
impl SentimentAnalyzer for FinbertClient {
    async fn analyze(&self, headlines: &[String]) -> Result<SentimentScore, SentimentError> {
        let batch = &headlines[..headlines.len().min(MAX_HEADLINES)];
        if batch.is_empty() {
            return Ok(SentimentScore::zero());
        }

        let body = json!({
            "inputs": batch,
            "options": {"wait_for_model": true},
        });
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .context(RequestSnafu)?;

        let status = response.status();
        let text = response.text().await.context(RequestSnafu)?;
        if !status.is_success() {
            return ApiSnafu {
                message: format!("{status}: {text}"),
            }
            .fail();
        }

        let parsed: InferenceResponse = serde_json::from_str(&text).map_err(|e| {
            MalformedResponseSnafu {
                message: e.to_string(),
            }
            .build()
        })?;
        let score = aggregate(parsed, batch.len())?;
        debug!(headlines = batch.len(), ?score, "finbert sentiment");
        Ok(score)
    }
}
