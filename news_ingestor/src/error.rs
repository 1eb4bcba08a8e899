use snafu::{Backtrace, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NewsError {
    /// `NEWS_API_KEY` is not set.
    #[snafu(display("NEWS_API_KEY is not configured"))]
    MissingApiKey { backtrace: Backtrace },

    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("News request failed: {source}"))]
    Request {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// Non-2xx status or an `"status": "error"` payload.
    #[snafu(display("News API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },
}
