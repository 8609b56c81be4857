use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid encryption key: {0}")]
    KeyFormat(String),

    #[error("Malformed callback: {0}")]
    MalformedCallback(String),

    #[error("Callback hash verification failed")]
    HashMismatch,

    #[error("Decryption failed: {0}")]
    Decryption(String),
}

/// How a caller should react to a failed encode/decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied bad order data and can fix it.
    Caller,
    /// The adapter is misconfigured.
    Configuration,
    /// The gateway sent something incomplete or unreadable.
    External,
    /// The callback failed its integrity check.
    Integrity,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(_) => ErrorKind::Caller,
            GatewayError::KeyFormat(_) => ErrorKind::Configuration,
            GatewayError::MalformedCallback(_) | GatewayError::Decryption(_) => {
                ErrorKind::External
            }
            GatewayError::HashMismatch => ErrorKind::Integrity,
        }
    }

    /// A tampered or forged callback. Must never be decrypted or trusted.
    pub fn is_security_relevant(&self) -> bool {
        self.kind() == ErrorKind::Integrity
    }

    /// Nothing in the core is retried; retry policy belongs to the network layer.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
