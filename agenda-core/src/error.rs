//! Error types for the agenda ecosystem.

use thiserror::Error;

/// A single field-level problem found while validating a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

/// Errors that can occur in agenda operations.
#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("Invalid view window: {0}")]
    InvalidWindow(String),

    #[error("Invalid layout parameter: {0}")]
    InvalidParameter(String),

    #[error("{}", format_validation(.0))]
    Validation(Vec<FieldError>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not reach the appointment API: {0}")]
    Network(String),

    #[error("Not authenticated. Log in again to refresh your token")]
    Unauthorized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AgendaError {
    /// Field errors carried by a validation failure, empty for other kinds.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AgendaError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn format_validation(errors: &[FieldError]) -> String {
    match errors.first() {
        Some(first) if errors.len() == 1 => first.message.clone(),
        Some(first) => format!("{} (and {} more)", first.message, errors.len() - 1),
        None => "Validation failed".to_string(),
    }
}

/// Result type alias for agenda operations.
pub type AgendaResult<T> = Result<T, AgendaError>;
