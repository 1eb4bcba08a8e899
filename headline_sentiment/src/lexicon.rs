//! Offline financial lexicon.
//!
//! Scores a headline in `[-1, 1]` from a small word list with negation and
//! intensifier handling, then maps that polarity onto the three classes the
//! hosted classifier reports.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::{MAX_HEADLINES, SentimentAnalyzer, error::SentimentError, score::SentimentScore};

const POSITIVE: &[(&str, f64)] = &[
    ("bullish", 0.8),
    ("surge", 0.7),
    ("rally", 0.7),
    ("soar", 0.8),
    ("jump", 0.6),
    ("climb", 0.5),
    ("gain", 0.5),
    ("profit", 0.6),
    ("growth", 0.6),
    ("rise", 0.5),
    ("increase", 0.5),
    ("improve", 0.5),
    ("outperform", 0.7),
    ("beat", 0.6),
    ("exceed", 0.6),
    ("strong", 0.5),
    ("positive", 0.5),
    ("optimistic", 0.6),
    ("confident", 0.5),
    ("record", 0.6),
    ("high", 0.4),
    ("upgrade", 0.6),
    ("buy", 0.5),
    ("breakout", 0.6),
    ("recovery", 0.5),
    ("rebound", 0.5),
    ("dividend", 0.3),
];

const NEGATIVE: &[(&str, f64)] = &[
    ("bearish", -0.8),
    ("crash", -0.9),
    ("plunge", -0.8),
    ("slump", -0.7),
    ("tumble", -0.7),
    ("drop", -0.6),
    ("fall", -0.5),
    ("decline", -0.6),
    ("loss", -0.6),
    ("down", -0.4),
    ("decrease", -0.5),
    ("weak", -0.5),
    ("negative", -0.5),
    ("pessimistic", -0.6),
    ("concern", -0.5),
    ("worry", -0.5),
    ("fear", -0.6),
    ("risk", -0.4),
    ("volatile", -0.3),
    ("uncertainty", -0.5),
    ("miss", -0.6),
    ("disappoint", -0.7),
    ("underperform", -0.6),
    ("downgrade", -0.6),
    ("sell", -0.5),
    ("lawsuit", -0.6),
    ("layoff", -0.6),
    ("recall", -0.5),
    ("crisis", -0.8),
    ("warning", -0.5),
    ("warn", -0.5),
    ("probe", -0.5),
    ("fail", -0.7),
    ("fraud", -0.9),
    ("bankruptcy", -0.9),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "none", "cannot", "cant", "dont", "doesnt", "didnt", "wont",
    "wouldnt", "isnt", "arent", "wasnt", "werent", "hardly", "barely", "without",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("extremely", 2.0),
    ("highly", 1.5),
    ("significantly", 1.5),
    ("sharply", 1.5),
    ("dramatically", 1.8),
    ("massively", 1.8),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("marginally", 0.5),
];

/// Inflections tried, in order, when a token is not in the word list.
const SUFFIXES: &[&str] = &["ing", "ed", "es", "s", "d"];

/// Logit sharpness of the polarity → class mapping.
const TEMPERATURE: f64 = 3.0;

pub struct LexiconAnalyzer {
    words: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self {
            words: POSITIVE.iter().chain(NEGATIVE).copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase().replace('\'', ""))
}

impl LexiconAnalyzer {
    fn lookup(&self, word: &str) -> Option<f64> {
        if let Some(&s) = self.words.get(word) {
            return Some(s);
        }
        SUFFIXES.iter().find_map(|suffix| {
            let stem = word.strip_suffix(suffix)?;
            // "surged" -> "surg" misses, "surge" via "d" hits.
            self.words.get(stem).copied()
        })
    }

    /// Headline polarity in `[-1, 1]`; 0 when no sentiment word matched.
    pub fn polarity(&self, text: &str) -> f64 {
        let mut scores = Vec::new();
        let mut negate = false;
        let mut intensity = 1.0;

        for token in tokens(text) {
            if self.negations.contains(token.as_str()) {
                negate = true;
                continue;
            }
            if let Some(&mult) = self.intensifiers.get(token.as_str()) {
                intensity = mult;
                continue;
            }
            match self.lookup(&token) {
                Some(mut s) => {
                    if negate {
                        s = -s;
                    }
                    scores.push(s * intensity);
                    negate = false;
                    intensity = 1.0;
                }
                // Modifiers only reach the next word.
                None => {
                    negate = false;
                    intensity = 1.0;
                }
            }
        }

        if scores.is_empty() {
            return 0.0;
        }
        (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
    }

    /// Softmax over `[3s, 1 - 3|s|, -3s]`.
    pub fn classify(&self, text: &str) -> SentimentScore {
        let s = self.polarity(text);
        let logits = [TEMPERATURE * s, 1.0 - TEMPERATURE * s.abs(), -TEMPERATURE * s];
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp = logits.map(|l| (l - max).exp());
        let total: f64 = exp.iter().sum();
        SentimentScore {
            positive: exp[0] / total,
            neutral: exp[1] / total,
            negative: exp[2] / total,
        }
    }
}

#[async_trait]
impl SentimentAnalyzer for LexiconAnalyzer {
    async fn analyze(&self, headlines: &[String]) -> Result<SentimentScore, SentimentError> {
        Ok(SentimentScore::mean(
            headlines.iter().take(MAX_HEADLINES).map(|h| self.classify(h)),
        ))
    }
}
