use shared::error::ValidationError;
use thiserror::Error;

/// Coarse classification used by the controller to label slot errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before dispatch. Never shown as an error.
    ValidationRejected,
    /// The exchange with the server could not be completed or understood.
    TransportFailure,
    /// The server answered with a non-success status.
    ServerRejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request rejected before dispatch: {0}")]
    ValidationRejected(#[from] ValidationError),
    #[error("network failure: {message}")]
    NetworkFailure { message: String },
    #[error("{message}")]
    ServerRejected { status: u16, message: String },
    #[error("unexpected response payload: {message}")]
    Decode { message: String },
    #[error("invalid API base url '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },
}

impl TransportError {
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::NetworkFailure {
            message: err.to_string(),
        }
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationRejected(_) => ErrorKind::ValidationRejected,
            Self::ServerRejected { .. } => ErrorKind::ServerRejected,
            Self::NetworkFailure { .. } | Self::Decode { .. } | Self::InvalidBaseUrl { .. } => {
                ErrorKind::TransportFailure
            }
        }
    }
}
