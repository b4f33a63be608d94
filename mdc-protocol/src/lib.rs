//! # mdc-protocol
//!
//! Wire codec for the Multiple Display Control (MDC) protocol.
//!
//! This crate provides:
//! - Binary framing with a fixed 0xAA header and modulo-256 checksum
//! - Request builders and incremental reply parsing
//! - The closed command registry
//! - Bidirectional symbol/value tables with case-insensitive lookup

pub mod command;
pub mod error;
pub mod frame;
pub mod registry;
pub mod reply;
pub mod wall;

pub use command::Command;
pub use error::ProtocolError;
pub use frame::{build_get, build_set, checksum, HEADER, MIN_FRAME_SIZE};
pub use registry::{Registry, Symbol, INPUT_SOURCES_GET, INPUT_SOURCES_SET, VIDEO_WALL_MODES};
pub use reply::{Reply, REPLY_COMMAND};
pub use wall::WallPosition;

/// Default TCP port MDC-capable displays listen on.
pub const DEFAULT_PORT: u16 = 1515;

/// Display id addressing every display behind the endpoint.
pub const DISPLAY_BROADCAST: u8 = 0xFE;

/// Upper bound on one socket read while collecting a reply. Replies are
/// short (2-16 payload bytes in practice), so one read usually holds a
/// complete frame.
pub const MAX_REPLY_SIZE: usize = 64;
