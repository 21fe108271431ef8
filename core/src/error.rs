//! Error types for the reqres API client.
//!
//! # Design
//! HTTP error statuses are not errors here: a 404 or a 500 is a completed
//! call and comes back as an `HttpResponse`. `ApiError` only covers calls
//! that could not complete, bodies that could not be read, JSON that could
//! not be (de)serialized, and misuse of the factory or configuration.

use thiserror::Error;

/// Errors surfaced by the context, the verb wrapper and the factory.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport could not complete the call (connection refused, DNS,
    /// timeout). Propagated unchanged from the underlying client.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The transport handle was released by `RequestContext::dispose`.
    #[error("transport handle has been disposed")]
    Disposed,

    /// The response body could not be read. The message is kept because the
    /// failure is memoised on the response and reported to every reader.
    #[error("response body unavailable: {0}")]
    Body(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The dynamic factory lookup received a name with no registered client.
    #[error("API \"{0}\" not found in ApiClientFactory")]
    UnknownKind(String),

    /// A configuration value could not be turned into a usable transport.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
