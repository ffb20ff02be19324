use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unauthorized: {body}")]
    Unauthorized { body: String },

    #[error("API error {status} {status_text}: {body}")]
    Api {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The 401 raised after the single refresh-and-retry has been spent.
    pub fn session_expired() -> Self {
        Error::Unauthorized {
            body: "session expired. Run `freshlog setup` to re-authenticate".to_string(),
        }
    }
}
