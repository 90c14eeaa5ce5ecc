//! Error taxonomy for the crawler core.
//!
//! Mirrors the layered `AppError` / per-concern-enum style of the original
//! application: one outer enum aggregating the failure domains, with
//! `#[from]` conversions so `?` composes across module boundaries.

use thiserror::Error;

/// Top-level error returned by the crawler core.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// Failure surfaced by the API client.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Programmer error: the registry has no entry for a type tag.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Programmer error: an operation was invoked before its precondition.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Configuration failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors surfaced by the (out-of-scope) cloud API client.
///
/// `ApiExecutionError` carries the message text matched against the
/// benign-phrase allowlist (see [`crate::iterator::is_benign`]).
/// `ResourceNotSupported` is a distinct variant so it is never accidentally
/// caught by string matching.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("{message}")]
    ApiExecutionError { message: String },

    #[error("operation not supported by this API client configuration")]
    ResourceNotSupported,
}

impl ApiError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::ApiExecutionError {
            message: message.into(),
        }
    }

    /// The message text used for benign-phrase matching. `ResourceNotSupported`
    /// has no message and is handled separately by callers.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::ApiExecutionError { message } => Some(message.as_str()),
            ApiError::ResourceNotSupported => None,
        }
    }
}

/// Registry lookup failures. A missing type tag is a programmer error —
/// it means the registry was built without an entry the caller expects.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no registry entry for type tag '{type_tag}'")]
    UnknownType { type_tag: &'static str },

    #[error("unsupported root identifier prefix: '{prefix}'")]
    UnsupportedRootPrefix { prefix: String },
}

/// Preconditions on `Resource` state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("stack() called before accept() initialized the parent chain")]
    NotInitialized,
}

/// Crawl configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

pub type CrawlResult<T> = Result<T, CrawlError>;
pub type ApiResult<T> = Result<T, ApiError>;
