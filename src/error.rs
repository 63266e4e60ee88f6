// src/error.rs

use std::fmt;

use crate::backend::BackendError;
use crate::cache::store::StoreError;

/// Global error enum for the quiz core.
/// Centralizes failures from the backend collaborator, the cache store,
/// and invalid state-machine transitions.
#[derive(Debug)]
pub enum QuizError {
    /// A backend call (generate/submit/fetch) failed.
    Backend(String),

    /// The key-value store rejected an operation or returned a record
    /// that could not be decoded.
    Storage(String),

    /// The caller passed a value outside the accepted range.
    BadRequest(String),

    /// An operation was invoked in a state that does not accept it.
    InvalidTransition(&'static str),
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for QuizError {}

/// Converts `BackendError` into `QuizError::Backend`.
/// Allows using `?` operator on backend calls.
impl From<BackendError> for QuizError {
    fn from(err: BackendError) -> Self {
        QuizError::Backend(err.to_string())
    }
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        QuizError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for QuizError {
    fn from(err: serde_json::Error) -> Self {
        QuizError::Storage(err.to_string())
    }
}
