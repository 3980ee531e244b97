use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Token parse error: {message}")]
    Parse { message: String },

    #[error("Key not found: {message}")]
    KeyNotFound { message: String },

    #[error("Scope not found: {message}")]
    ScopeNotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Signing error: {message}")]
    Signing { message: String },

    #[error("Token expired: {message}")]
    Expired { message: String },

    #[error("Token not yet valid: {message}")]
    NotYetValid { message: String },

    #[error("Verification failed: {message}")]
    Verification { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Source error: {source_name} - {message}")]
    Source {
        source_name: String,
        message: String,
    },
}

impl DomainError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn key_not_found(message: impl Into<String>) -> Self {
        Self::KeyNotFound {
            message: message.into(),
        }
    }

    pub fn scope_not_found(message: impl Into<String>) -> Self {
        Self::ScopeNotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    pub fn expired(message: impl Into<String>) -> Self {
        Self::Expired {
            message: message.into(),
        }
    }

    pub fn not_yet_valid(message: impl Into<String>) -> Self {
        Self::NotYetValid {
            message: message.into(),
        }
    }

    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn source_failure(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// HTTP-style status code for callers that surface these errors over HTTP
    pub fn status(&self) -> u16 {
        match self {
            Self::Parse { .. }
            | Self::KeyNotFound { .. }
            | Self::Expired { .. }
            | Self::NotYetValid { .. }
            | Self::Verification { .. } => 401,
            Self::ScopeNotFound { .. } => 403,
            Self::Validation { .. } => 400,
            Self::Signing { .. } | Self::Configuration { .. } | Self::Source { .. } => 500,
        }
    }

    /// True for the verification failure kinds reported by the verifier
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::Expired { .. } | Self::NotYetValid { .. } | Self::Verification { .. }
        )
    }
}
