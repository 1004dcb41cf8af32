use reqwest::StatusCode;
use thiserror::Error;

/// Ways a single oracle fetch can fail. None of them are fatal to the poller;
/// each one is rendered as a short sentinel on the label.
#[derive(Debug, Error)]
pub enum GasError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response lacks a successful gas oracle result")]
    Api,
}

impl GasError {
    pub fn sentinel(&self) -> &'static str {
        match self {
            GasError::Transport(_) | GasError::Status(_) => "HTTP Error",
            GasError::Parse(_) => "Parse Error",
            GasError::Api => "API Error",
        }
    }
}
