//! Error type shared by the transport, the services and the view helpers.

use std::path::PathBuf;

use shared::error::{ApiException, ErrorCode};
use thiserror::Error;

use crate::forms::FormErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request: {0}")]
    Api(#[from] ApiException),
    #[error("unauthorized: session token missing, expired or invalid")]
    Unauthorized,
    #[error("not logged in")]
    NotAuthenticated,
    #[error("invalid input: {0}")]
    Validation(#[from] FormErrors),
    #[error("invalid attachment: {0}")]
    Attachment(String),
    #[error("this listing has no search endpoint")]
    SearchUnsupported,
    #[error("invalid server response: {0}")]
    InvalidResponse(String),
    #[error("invalid url '{url}': {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },
    #[error("session storage error at '{path}': {source}")]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("io error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

impl ClientError {
    pub fn requires_reauth(&self) -> bool {
        match self {
            Self::Unauthorized | Self::NotAuthenticated => true,
            Self::Api(exception) => exception.code == ErrorCode::Unauthorized,
            _ => false,
        }
    }

    /// Short text suitable for a notification or the error panel of a list.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(err) if err.is_connect() || err.is_timeout() => {
                "Server unreachable; check the API URL and network, then retry.".to_string()
            }
            Self::Transport(_) => "Request failed; please try again.".to_string(),
            Self::Api(exception) if exception.message.is_empty() => {
                format!("Server error ({}).", exception.status)
            }
            Self::Api(exception) => exception.message.clone(),
            Self::Unauthorized => "Session expired; please sign in again.".to_string(),
            Self::NotAuthenticated => "Please sign in first.".to_string(),
            other => other.to_string(),
        }
    }
}
