//! Client error types.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] mdc_protocol::ProtocolError),

    #[error("not connected")]
    NotConnected,

    #[error("connection failed: {0}")]
    ConnectionFailed(std::io::Error),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("operation timeout")]
    Timeout,

    #[error("display rejected command {command:#04x}")]
    Nack { command: u8 },

    #[error("unexpected reply to command {command:#04x}")]
    UnexpectedReply { command: u8 },
}

impl ClientError {
    /// Returns whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Io(_)
                | ClientError::Timeout
                | ClientError::ConnectionFailed(_)
                | ClientError::ConnectionClosed
        )
    }
}
