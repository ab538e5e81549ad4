//! Error types for the sample application.

use component_graph::{RegistrationError, ResolveError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`TokenStore`](crate::store::TokenStore) backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("token store unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while issuing or checking a session token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request carried no token cookie.
    #[error("no token presented")]
    MissingToken,

    /// The token was signed by us but has been logged out.
    #[error("token has been revoked")]
    Revoked,

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors a request handler can return. The error-handling middleware turns
/// these into a 500 response.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("token store failure: {0}")]
    Store(#[from] StoreError),

    #[error("request has no authenticated session")]
    MissingSession,

    #[error("response encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors surfaced by the application bootstrap.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("dependencies have not been injected yet")]
    NotInjected,

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
