//! The closed set of control commands.

use crate::error::ProtocolError;
use std::fmt;

/// One-byte command ids in the supported protocol subset.
///
/// The set is immutable for the lifetime of the process; frames built
/// for any other id are rejected with [`ProtocolError::InvalidCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Power = 0x11,
    Volume = 0x12,
    Mute = 0x13,
    InputSource = 0x14,
    ScreenSize = 0x19,
    VideoWallMode = 0x5C,
    SafetyLock = 0x5D,
    VideoWallOn = 0x84,
    VideoWallUser = 0x89,
}

impl Command {
    /// Every registered command.
    pub const ALL: [Command; 9] = [
        Command::Power,
        Command::Volume,
        Command::Mute,
        Command::InputSource,
        Command::ScreenSize,
        Command::VideoWallMode,
        Command::SafetyLock,
        Command::VideoWallOn,
        Command::VideoWallUser,
    ];

    /// The command's wire id.
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Human-readable control name.
    pub const fn name(self) -> &'static str {
        match self {
            Command::Power => "power",
            Command::Volume => "volume",
            Command::Mute => "mute",
            Command::InputSource => "input_source",
            Command::ScreenSize => "screen_size",
            Command::VideoWallMode => "video_wall_mode",
            Command::SafetyLock => "safety_lock",
            Command::VideoWallOn => "video_wall_on",
            Command::VideoWallUser => "video_wall_user",
        }
    }

    /// Looks up a command by wire id.
    pub fn from_id(id: u8) -> Result<Self, ProtocolError> {
        Self::ALL
            .iter()
            .copied()
            .find(|command| command.id() == id)
            .ok_or(ProtocolError::InvalidCommand(id))
    }

    /// Looks up a command by control name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, ProtocolError> {
        Self::ALL
            .iter()
            .copied()
            .find(|command| command.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ProtocolError::UnknownValue {
                field: "command",
                value: name.to_string(),
            })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
