//! Error types for the search backends.

use hoover_core::HooverError;

/// Errors from a search backend.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("search service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode search response: {0}")]
    Decode(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("search timed out after {0}s")]
    Timeout(u64),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Decode(err.to_string())
        } else {
            SearchError::Http(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(err: rusqlite::Error) -> Self {
        SearchError::Storage(err.to_string())
    }
}

impl From<SearchError> for HooverError {
    fn from(err: SearchError) -> Self {
        HooverError::Search(err.to_string())
    }
}
