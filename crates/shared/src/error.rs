use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Transport,
    HttpStatus,
    RateLimited,
    Decode,
}

/// Failure reason as handed to whoever renders results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl FetchFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("image service unreachable: {0}")]
    Transport(String),
    #[error("image service returned HTTP {status}")]
    Status { status: u16 },
    #[error("malformed image service response: {0}")]
    Decode(String),
}

impl SearchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SearchError::Transport(_) => ErrorCode::Transport,
            SearchError::Status { status: 429 } => ErrorCode::RateLimited,
            SearchError::Status { .. } => ErrorCode::HttpStatus,
            SearchError::Decode(_) => ErrorCode::Decode,
        }
    }
}

impl From<SearchError> for FetchFailure {
    fn from(value: SearchError) -> Self {
        let status = match &value {
            SearchError::Status { status } => Some(*status),
            _ => None,
        };
        Self {
            code: value.code(),
            status,
            message: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported page size {0}; expected one of 12, 20, 40")]
pub struct InvalidPageSize(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_status_maps_to_dedicated_code() {
        let failure = FetchFailure::from(SearchError::Status { status: 429 });
        assert_eq!(failure.code, ErrorCode::RateLimited);
        assert_eq!(failure.status, Some(429));
        assert!(failure.message.contains("429"));
    }

    #[test]
    fn decode_failure_carries_reason() {
        let failure = FetchFailure::from(SearchError::Decode("expected value".into()));
        assert_eq!(failure.code, ErrorCode::Decode);
        assert_eq!(failure.status, None);
        assert!(failure.message.contains("expected value"));
    }
}
