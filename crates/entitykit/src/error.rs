//! Error types for entity compilation

use thiserror::Error;

/// Errors raised while compiling declared entities into payloads
#[derive(Error, Debug)]
pub enum Error {
    /// Schema name was never registered
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// Declared field does not exist in the entity's schema
    #[error("unexpected field '{field}' for schema '{schema}'")]
    UnexpectedField {
        schema: String,
        field: String,
    },

    /// Required field has neither a declared value nor a default
    #[error("missing required field '{field}' for schema '{schema}'")]
    MissingField {
        schema: String,
        field: String,
    },

    /// Field value failed validation against its descriptor
    #[error("invalid value for field '{field}': {reason}")]
    Validation {
        field: String,
        reason: String,
    },

    /// Substrate provider type and spec type disagree
    #[error(
        "provider type mismatch in substrate ({substrate_type}) and spec type ({spec_type}) at {context}"
    )]
    ProviderTypeMismatch {
        substrate_type: String,
        spec_type: String,
        context: String,
    },
}

impl Error {
    /// Build a validation error for a named field.
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for compilation operations
pub type Result<T> = std::result::Result<T, Error>;
