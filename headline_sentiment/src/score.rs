use serde::{Deserialize, Serialize};

/// Mean class probabilities over a batch of headlines.
///
/// Components sum to roughly 1.0, except for the all-zero score reported
/// when there was nothing to score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentScore {
    pub const fn zero() -> Self {
        Self {
            positive: 0.0,
            neutral: 0.0,
            negative: 0.0,
        }
    }

    /// Per-class mean; zero for an empty iterator.
    pub fn mean<I: IntoIterator<Item = SentimentScore>>(scores: I) -> Self {
        let mut n = 0usize;
        let mut sum = Self::zero();
        for s in scores {
            sum.positive += s.positive;
            sum.neutral += s.neutral;
            sum.negative += s.negative;
            n += 1;
        }
        if n == 0 {
            return sum;
        }
        let n = n as f64;
        Self {
            positive: sum.positive / n,
            neutral: sum.neutral / n,
            negative: sum.negative / n,
        }
    }
}
