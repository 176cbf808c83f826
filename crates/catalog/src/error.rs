#![forbid(unsafe_code)]

use sq_core::ValidationError;
use sq_storage::StoreError;

/// Caller-distinguishable failure kinds: field-level feedback for
/// validation, a rename prompt for conflicts, a generic message for the
/// rest. Storage failures pass through unwrapped.
#[derive(Debug)]
pub enum CatalogError {
    Validation(ValidationError),
    NotFound(String),
    Conflict(String),
    Store(StoreError),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid input: {err}"),
            Self::NotFound(id) => write!(f, "quest not found: {id}"),
            Self::Conflict(id) => write!(f, "quest id already exists: {id}"),
            Self::Store(err) => write!(f, "store: {err}"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<ValidationError> for CatalogError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for CatalogError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Store(StoreError::Json(value))
    }
}

pub(crate) fn map_store(id: &str, err: StoreError) -> CatalogError {
    match err {
        StoreError::UnknownId => CatalogError::NotFound(id.to_string()),
        StoreError::IdConflict => CatalogError::Conflict(id.to_string()),
        other => CatalogError::Store(other),
    }
}
