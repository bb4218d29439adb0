use serde_json::Value;
use thiserror::Error;

use crate::repository::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{resource} '{identifier}' not found")]
    NotFound {
        resource: &'static str,
        identifier: String,
        details: Option<Value>,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(resource: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            identifier: identifier.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

/// Reject `value` unless it lies in `min..=max`.
pub(crate) fn check_range(name: &str, value: i64, min: i64, max: i64) -> Result<(), ServiceError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ServiceError::bad_request(format!(
            "{name} must be between {min} and {max}, got {value}"
        )))
    }
}
