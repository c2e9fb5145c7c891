//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers treat "the todo does
//! not exist" as ordinary flow. A 400 carries the server's validation
//! message in `Rejected`; every other non-success status lands in
//! `HttpError` with the raw status code and body for debugging.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by `TodoClient` parse methods and the client store.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("Todo not found")]
    NotFound,

    /// The server rejected the payload with 400 and this message.
    #[error("{0}")]
    Rejected(String),

    /// The server returned a non-success status other than 400 or 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The payload failed validation before any request was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The host transport could not complete the round trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
