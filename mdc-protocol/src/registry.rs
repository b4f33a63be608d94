//! Bidirectional symbol/value tables.
//!
//! Registries map one-byte protocol values to display names and back.
//! They are static tables built at compile time and queried either by
//! byte key or by case-insensitive name, replacing the duck-typed
//! dictionaries consulted bidirectionally in older MDC clients.

use crate::error::ProtocolError;
use std::fmt;

/// A symbolic argument: either a raw protocol byte or a registered name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Id(u8),
    Name(String),
}

impl Symbol {
    /// Parses a user-supplied token for the named field: numeric tokens
    /// become byte ids, identifier-shaped tokens are treated as names.
    /// Anything else (empty, punctuation, embedded whitespace) is the
    /// wrong value shape and fails with [`ProtocolError::InvalidType`].
    pub fn parse(field: &'static str, token: &str) -> Result<Self, ProtocolError> {
        if let Ok(id) = token.parse::<u8>() {
            return Ok(Symbol::Id(id));
        }
        if !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Ok(Symbol::Name(token.to_string()));
        }
        Err(ProtocolError::InvalidType { field })
    }
}

impl From<u8> for Symbol {
    fn from(id: u8) -> Self {
        Symbol::Id(id)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::Name(name.to_string())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Id(id) => write!(f, "{id:#04x}"),
            Symbol::Name(name) => f.write_str(name),
        }
    }
}

/// An immutable mapping between protocol bytes and display names.
pub struct Registry {
    field: &'static str,
    entries: &'static [(u8, &'static str)],
}

impl Registry {
    pub const fn new(field: &'static str, entries: &'static [(u8, &'static str)]) -> Self {
        Self { field, entries }
    }

    /// The field name used in error messages.
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn entries(&self) -> &'static [(u8, &'static str)] {
        self.entries
    }

    /// Display name registered for a byte key.
    pub fn name_of(&self, key: u8) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == key)
            .map(|(_, name)| *name)
    }

    /// Byte key registered for a name, compared case-insensitively.
    pub fn key_of(&self, name: &str) -> Option<u8> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.eq_ignore_ascii_case(name))
            .map(|(key, _)| *key)
    }

    pub fn contains(&self, key: u8) -> bool {
        self.name_of(key).is_some()
    }

    /// Resolves a symbolic value to its byte key.
    pub fn resolve(&self, value: &Symbol) -> Result<u8, ProtocolError> {
        match value {
            Symbol::Id(id) if self.contains(*id) => Ok(*id),
            Symbol::Name(name) => self.key_of(name).ok_or_else(|| ProtocolError::UnknownValue {
                field: self.field,
                value: name.clone(),
            }),
            Symbol::Id(id) => Err(ProtocolError::UnknownValue {
                field: self.field,
                value: format!("{id:#04x}"),
            }),
        }
    }

    /// Renders a byte key as its registered name.
    pub fn describe(&self, key: u8) -> Result<&'static str, ProtocolError> {
        self.name_of(key).ok_or_else(|| ProtocolError::UnknownValue {
            field: self.field,
            value: format!("{key:#04x}"),
        })
    }
}

/// Input sources accepted by set commands.
pub static INPUT_SOURCES_SET: Registry = Registry::new(
    "source",
    &[
        (0x0C, "InputSource"),
        (0x18, "DVI"),
        (0x20, "MagicInfo"),
        (0x21, "HDMI1"),
        (0x23, "HDMI2"),
        (0x25, "DisplayPort"),
    ],
);

/// Input sources a display may report, a superset of the settable ones.
pub static INPUT_SOURCES_GET: Registry = Registry::new(
    "source",
    &[
        (0x0C, "InputSource"),
        (0x18, "DVI"),
        (0x1F, "DVI_video"),
        (0x20, "MagicInfo"),
        (0x21, "HDMI1"),
        (0x22, "HDMI1_PC"),
        (0x23, "HDMI2"),
        (0x24, "HDMI2_PC"),
        (0x25, "DisplayPort"),
    ],
);

/// Video wall stretch modes.
pub static VIDEO_WALL_MODES: Registry =
    Registry::new("video_wall_mode", &[(0x00, "Natural"), (0x01, "Full")]);
