//! Request-frame building.
//!
//! Frame layout (5 bytes + payload):
//!
//! ```text
//! +--------+---------+------------+--------+---------+----------+
//! | header | command | display id | length | payload | checksum |
//! | 0xAA   | 1 byte  |  1 byte    | 1 byte | N bytes |  1 byte  |
//! +--------+---------+------------+--------+---------+----------+
//! ```
//!
//! The checksum is the modulo-256 sum of every byte after the header.
//! All multi-value fields are single bytes; the protocol has no
//! multi-byte integers.

use crate::command::Command;
use crate::error::ProtocolError;
use bytes::{BufMut, BytesMut};

/// Fixed first byte of every MDC frame.
pub const HEADER: u8 = 0xAA;

/// Size of a frame with an empty payload.
pub const MIN_FRAME_SIZE: usize = 5;

/// Modulo-256 sum of the given bytes.
///
/// Callers pass the frame bytes after the header; the result is always
/// recomputed, never trusted from input.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

/// Folds an argument to an unsigned byte as `abs(arg) % 256`.
///
/// Negative and out-of-range integers wrap silently; this is the
/// documented sign-folding policy, not an error.
pub fn fold_arg(arg: i64) -> u8 {
    (arg.unsigned_abs() % 256) as u8
}

/// Builds a 5-byte get request with an empty payload.
pub fn build_get(command_id: u8, display_id: u8) -> Result<BytesMut, ProtocolError> {
    build_set(command_id, display_id, &[])
}

/// Builds a set request carrying one payload byte per argument.
pub fn build_set(command_id: u8, display_id: u8, args: &[i64]) -> Result<BytesMut, ProtocolError> {
    Command::from_id(command_id)?;
    if args.len() > u8::MAX as usize {
        return Err(ProtocolError::PayloadTooLarge(args.len()));
    }

    let mut frame = BytesMut::with_capacity(MIN_FRAME_SIZE + args.len());
    frame.put_u8(HEADER);
    frame.put_u8(command_id);
    frame.put_u8(display_id);
    frame.put_u8(args.len() as u8);
    for arg in args {
        frame.put_u8(fold_arg(*arg));
    }
    let sum = checksum(&frame[1..]);
    frame.put_u8(sum);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_get_layout() {
        let frame = build_get(0x11, 0xFE).unwrap();
        assert_eq!(&frame[..], &[0xAA, 0x11, 0xFE, 0x00, 0x0F]);
    }

    #[test]
    fn test_build_set_layout() {
        let frame = build_set(0x12, 0x00, &[50]).unwrap();
        assert_eq!(&frame[..], &[0xAA, 0x12, 0x00, 0x01, 0x32, 0x45]);
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(matches!(
            build_get(0x42, 0x00),
            Err(ProtocolError::InvalidCommand(0x42))
        ));
        assert!(matches!(
            build_set(0x42, 0x00, &[1]),
            Err(ProtocolError::InvalidCommand(0x42))
        ));
    }

    #[test]
    fn test_argument_folding() {
        assert_eq!(fold_arg(-1), 1);
        assert_eq!(fold_arg(-300), 44);
        assert_eq!(fold_arg(256), 0);
        assert_eq!(fold_arg(i64::MIN), 0);

        let frame = build_set(0x12, 0x00, &[-1]).unwrap();
        assert_eq!(frame[4], 0x01);
    }

    #[test]
    fn test_payload_too_large() {
        let args = vec![0i64; 256];
        assert!(matches!(
            build_set(0x12, 0x00, &args),
            Err(ProtocolError::PayloadTooLarge(256))
        ));
    }

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[0xFF, 0xFF]), 0xFE);
        assert_eq!(checksum(&[]), 0x00);
    }

    proptest! {
        #[test]
        fn get_frames_are_five_bytes_with_valid_checksum(
            command in prop::sample::select(Command::ALL.to_vec()),
            display_id: u8,
        ) {
            let frame = build_get(command.id(), display_id).unwrap();
            prop_assert_eq!(frame.len(), MIN_FRAME_SIZE);
            prop_assert_eq!(frame[3], 0);
            prop_assert_eq!(frame[4], checksum(&frame[1..4]));
        }

        #[test]
        fn set_frames_carry_length_and_checksum(
            command in prop::sample::select(Command::ALL.to_vec()),
            display_id: u8,
            args in prop::collection::vec(any::<i64>(), 0..=255),
        ) {
            let frame = build_set(command.id(), display_id, &args).unwrap();
            prop_assert_eq!(frame.len(), MIN_FRAME_SIZE + args.len());
            prop_assert_eq!(frame[3] as usize, args.len());
            let last = frame.len() - 1;
            prop_assert_eq!(frame[last], checksum(&frame[1..last]));
        }
    }
}
