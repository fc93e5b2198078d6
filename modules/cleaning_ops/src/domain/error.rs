use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    /// Bad input. `missing` names the absent request fields, if any.
    #[error("{message}")]
    Validation {
        message: String,
        missing: Vec<String>,
    },

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            missing: Vec::new(),
        }
    }

    pub fn missing_fields(message: impl Into<String>, missing: Vec<String>) -> Self {
        Self::Validation {
            message: message.into(),
            missing,
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
