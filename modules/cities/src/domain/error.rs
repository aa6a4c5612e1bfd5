use thiserror::Error;

/// Domain error taxonomy.
///
/// Storage failures are wrapped into `Internal` where they are detected and
/// travel up unchanged from there.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid: {message}")]
    Invalid { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Reserved for authentication; no city operation produces it.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
}

impl DomainError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn city_not_found() -> Self {
        Self::not_found("city not found")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Wrap a storage failure, naming the step that failed.
    pub fn storage(step: &str, err: impl std::fmt::Display) -> Self {
        Self::internal(format!("{step}: {err}"))
    }
}

impl From<db::DbError> for DomainError {
    fn from(e: db::DbError) -> Self {
        Self::storage("database", e)
    }
}
