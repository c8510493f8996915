pub mod client;
pub mod config;
pub mod controller;
pub mod languages;
pub mod llm;
pub mod utils;

pub use crate::client::TranslationClient;
pub use crate::config::{ApiKey, AppConfig, ConfigError, Provider};
pub use crate::controller::{PendingTranslation, SessionState, TranslationForm};
pub use crate::languages::Language;

use std::fmt::Display;

/// Failure talking to a remote text-generation backend.
///
/// This is the low-level taxonomy; it never leaves [`TranslationClient`],
/// which collapses it into a [`TranslationError`].
#[derive(Debug)]
pub enum LLMError {
    /// The backend rejected the credential.
    Unauthorized(anyhow::Error),
    ConnectionError(anyhow::Error),
    ApiError(anyhow::Error),
    MalformedResponse(anyhow::Error),
    OtherError(anyhow::Error),
}

impl Display for LLMError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMError::Unauthorized(e) => {
                write!(f, "Unauthorized: {}", e)
            }
            LLMError::ConnectionError(e) => {
                write!(f, "Connection error: {}", e)
            }
            LLMError::ApiError(e) => {
                write!(f, "API error: {}", e)
            }
            LLMError::MalformedResponse(e) => {
                write!(f, "Malformed response: {}", e)
            }
            LLMError::OtherError(e) => {
                write!(f, "Error: {}", e)
            }
        }
    }
}

impl std::error::Error for LLMError {}

/// User-facing translation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    InvalidCredentials,
    ServiceError,
}

impl Display for TranslationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationError::InvalidCredentials => write!(
                f,
                "The provided API Key is not valid. Please check your configuration."
            ),
            TranslationError::ServiceError => write!(
                f,
                "Failed to get translation from AI. Please try again later."
            ),
        }
    }
}

impl std::error::Error for TranslationError {}

impl From<&LLMError> for TranslationError {
    fn from(err: &LLMError) -> Self {
        match err {
            LLMError::Unauthorized(_) => TranslationError::InvalidCredentials,
            _ => TranslationError::ServiceError,
        }
    }
}

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyWord,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyWord => write!(f, "Please enter a word to translate."),
        }
    }
}

impl std::error::Error for ValidationError {}
