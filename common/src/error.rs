use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Rate provider error: HTTP {status} - {body}")]
    ProviderError { status: u16, body: String },

    #[error("Parsing error: {0}")]
    ParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The only failure surfaced by a series fetch. The message is meant for
    /// end users; the underlying cause is only ever logged.
    #[error("no rate data available")]
    DataUnavailable,
}

impl Error {
    /// Whether this error is the terminal "nothing to show" failure.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Error::DataUnavailable)
    }
}
