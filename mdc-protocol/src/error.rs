//! Protocol error types.

use thiserror::Error;

/// Errors raised while building frames, resolving symbols, or parsing
/// replies. All of them are raised before any bytes reach the wire.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown command id: {0:#04x}")]
    InvalidCommand(u8),

    #[error("{field} must be a byte value or a registered name")]
    InvalidType { field: &'static str },

    #[error("unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },

    #[error("{field} {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("payload too large: {0} bytes (max 255)")]
    PayloadTooLarge(usize),

    #[error("invalid header byte: {0:#04x} (expected 0xaa)")]
    InvalidHeader(u8),

    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("not an acknowledgement frame: command {0:#04x}")]
    NotAReply(u8),

    #[error("invalid acknowledgement byte: {0:#04x}")]
    InvalidAck(u8),

    #[error("reply payload too short: {0} bytes")]
    TruncatedReply(usize),
}
