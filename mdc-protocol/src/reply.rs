//! Reply-frame parsing.
//!
//! Replies share the request framing but carry command byte `0xFF` and
//! a payload of `[ack, echoed command, values..]`. The parser is
//! incremental: it consumes complete frames from the front of a read
//! buffer and returns `Ok(None)` while bytes are still missing, so a
//! frame split across TCP segments reassembles across reads.

use crate::error::ProtocolError;
use crate::frame::{checksum, HEADER, MIN_FRAME_SIZE};
use bytes::{Buf, Bytes, BytesMut};

/// Command byte carried by every acknowledgement frame.
pub const REPLY_COMMAND: u8 = 0xFF;

/// First payload byte of an acknowledged command.
const ACK: u8 = b'A';

/// First payload byte of a rejected command.
const NACK: u8 = b'N';

/// A parsed acknowledgement frame.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Display the reply came from.
    pub display_id: u8,
    /// Whether the display acknowledged the command.
    pub ack: bool,
    /// The command id the display is answering.
    pub command: u8,
    /// Control-specific value bytes.
    pub values: Bytes,
}

impl Reply {
    /// Decodes one reply frame from the front of `buf`.
    ///
    /// Returns `Ok(Some(reply))` if a complete frame was consumed,
    /// `Ok(None)` if more data is needed, or `Err` on malformed input.
    /// Bytes past the decoded frame are left in the buffer.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Self>, ProtocolError> {
        if buf.len() < MIN_FRAME_SIZE {
            return Ok(None);
        }
        if buf[0] != HEADER {
            return Err(ProtocolError::InvalidHeader(buf[0]));
        }

        let length = buf[3] as usize;
        let total = MIN_FRAME_SIZE + length;
        if buf.len() < total {
            return Ok(None);
        }

        let expected = buf[total - 1];
        let actual = checksum(&buf[1..total - 1]);
        if expected != actual {
            return Err(ProtocolError::ChecksumMismatch { expected, actual });
        }
        if buf[1] != REPLY_COMMAND {
            return Err(ProtocolError::NotAReply(buf[1]));
        }
        if length < 2 {
            return Err(ProtocolError::TruncatedReply(length));
        }

        let display_id = buf[2];
        buf.advance(4);
        let payload = buf.split_to(length).freeze();
        buf.advance(1); // checksum byte

        let ack = match payload[0] {
            ACK => true,
            NACK => false,
            other => return Err(ProtocolError::InvalidAck(other)),
        };

        Ok(Some(Self {
            display_id,
            ack,
            command: payload[1],
            values: payload.slice(2..),
        }))
    }

    /// First value byte; most controls answer with exactly one.
    pub fn value(&self) -> Result<u8, ProtocolError> {
        self.values
            .first()
            .copied()
            .ok_or(ProtocolError::TruncatedReply(self.values.len()))
    }
}
