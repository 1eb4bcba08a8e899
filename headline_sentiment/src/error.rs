use snafu::{Backtrace, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SentimentError {
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Sentiment request failed: {source}"))]
    Request {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The inference endpoint answered with an error (bad token, model loading, ...).
    #[snafu(display("Sentiment API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    #[snafu(display("Unexpected sentiment response: {message}"))]
    MalformedResponse {
        message: String,
        backtrace: Backtrace,
    },
}
