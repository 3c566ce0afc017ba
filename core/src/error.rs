//! Error types for the todo API client.
//!
//! # Design
//! A declared error response (one listed in the route's error table) becomes
//! `Api` with its parsed `TodoError` body. Anything the route does not
//! declare lands in `UnexpectedStatus` with the raw status and body; no
//! schema is applied to it. Request validation failures are raised before
//! any I/O happens.

use std::fmt;

use thiserror::Error;

use crate::contract::ContractError;
use crate::schema::ValidationError;
use crate::transport::TransportError;
use crate::types::TodoError;

/// Errors returned by `TodoClient`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Outgoing parameters failed their schema; nothing was sent.
    #[error("invalid request: {0}")]
    Validation(ValidationError),

    /// The server answered with a status the route declares as an error.
    #[error("HTTP {status}: {error}")]
    Api { status: u16, error: TodoError },

    /// The server answered with a status the route does not declare.
    #[error("unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// A success or declared-error body did not match its schema.
    #[error("invalid response body (HTTP {status}): {issues}")]
    InvalidResponse { status: u16, issues: ValidationError },

    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Coarse classification of a `ClientError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Api,
    UnexpectedStatus,
    Transport,
    InvalidResponse,
    Contract,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Api => "ApiError",
            Self::UnexpectedStatus => "UnexpectedStatusError",
            Self::Transport => "TransportError",
            Self::InvalidResponse => "InvalidResponseError",
            Self::Contract => "ContractError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Api { .. } => ErrorKind::Api,
            Self::UnexpectedStatus { .. } => ErrorKind::UnexpectedStatus,
            Self::Transport(_) => ErrorKind::Transport,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::Contract(_) => ErrorKind::Contract,
        }
    }

    /// HTTP status of the response that caused this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. }
            | Self::UnexpectedStatus { status, .. }
            | Self::InvalidResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn api_error(&self) -> Option<&TodoError> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}
