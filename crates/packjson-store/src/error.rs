//! Store-level error type.

use std::error::Error;
use std::fmt;

use packjson_core::JsonError;

use crate::config::ConfigError;

/// Errors returned by [`JsonStore`](crate::JsonStore) operations.
#[derive(Debug, PartialEq)]
pub enum StoreError {
    /// The store configuration failed validation.
    Config(ConfigError),
    /// The arena or codec rejected the operation.
    Json(JsonError),
    /// Growing the buffer would exceed the configured cap.
    CapacityExceeded {
        /// Buffer size the store needed.
        requested: usize,
        /// The configured cap.
        cap: usize,
    },
}

impl StoreError {
    /// The wrapped engine error, if any.
    pub fn as_json(&self) -> Option<&JsonError> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid store config: {e}"),
            Self::Json(e) => write!(f, "{e}"),
            Self::CapacityExceeded { requested, cap } => write!(
                f,
                "buffer of {requested} bytes would exceed the {cap} byte cap"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::CapacityExceeded { .. } => None,
        }
    }
}

impl From<ConfigError> for StoreError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<JsonError> for StoreError {
    fn from(e: JsonError) -> Self {
        Self::Json(e)
    }
}
