use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 409 | 422 => Self::Validation,
            429 => Self::RateLimited,
            _ => Self::Internal,
        }
    }
}

/// Error body returned by the backend. Validation failures carry per-field
/// messages under `errors`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    /// Server message followed by the first message of each invalid field.
    pub fn summary(&self) -> String {
        let field_messages: Vec<&str> = self
            .errors
            .values()
            .filter_map(|messages| messages.first().map(String::as_str))
            .collect();
        match (self.message.is_empty(), field_messages.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.message.clone(),
            (true, false) => field_messages.join("; "),
            (false, false) => format!("{} ({})", self.message, field_messages.join("; ")),
        }
    }
}

#[derive(Debug, Error)]
#[error("{code:?} ({status}): {message}")]
pub struct ApiException {
    pub code: ErrorCode,
    pub status: u16,
    pub message: String,
}

impl ApiException {
    pub fn new(status: u16, body: &ApiError) -> Self {
        Self {
            code: ErrorCode::from_status(status),
            status,
            message: body.summary(),
        }
    }
}
