//! Command execution.
//!
//! The control set is a closed subcommand enum mapped onto the client's
//! get/set pairs; with no value a command views the control state, with
//! a value it sets it.

use clap::Subcommand;
use colored::Colorize;
use mdc_client::Client;
use mdc_protocol::{Command, Symbol};

#[derive(Subcommand)]
pub enum Commands {
    /// View or control the power state
    Power {
        /// 1/0, on/off or true/false; omit to view
        value: Option<String>,
    },

    /// View or control the volume [0, 100]
    Volume {
        /// Volume level; omit to view
        value: Option<u8>,
    },

    /// View or control the mute state
    Mute {
        /// 1/0, on/off or true/false; omit to view
        value: Option<String>,
    },

    /// View or switch the input source
    Source {
        /// Source name (e.g. HDMI2) or byte id; omit to view
        value: Option<String>,
    },

    /// View or control the screen size
    ScreenSize {
        /// Screen size [0, 255]; omit to view
        value: Option<u8>,
    },

    /// View or control the video wall stretch mode
    VideoWallMode {
        /// natural or full; omit to view
        value: Option<String>,
    },

    /// View or control the safety lock
    SafetyLock {
        /// 1/0, on/off or true/false; omit to view
        value: Option<String>,
    },

    /// View or control whether the video wall is on
    VideoWallOn {
        /// 1/0, on/off or true/false; omit to view
        value: Option<String>,
    },

    /// View or place this display in a video wall grid
    VideoWallUser {
        /// Wall columns [0, 15]; 0 disables the wall; omit to view
        col: Option<u8>,

        /// Wall rows [0, 15]; defaults to the column count
        row: Option<u8>,

        /// Position in the grid [1, col*row]
        pos: Option<u8>,
    },

    /// Send a registered command with raw payload bytes
    Raw {
        /// Command name or byte id
        command: String,

        /// Payload byte values
        values: Vec<i64>,
    },
}

/// Executes a command and returns the formatted output.
pub async fn execute(
    client: &mut Client,
    cmd: Commands,
) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Power { value: None } => {
            let on = client.get_power().await?;
            Ok(format!("power is {}", on_off(on)))
        }
        Commands::Power { value: Some(value) } => {
            let on = parse_bool("power", &value)?;
            client.set_power(on).await?;
            Ok(format!("power {} {}", "set to".green(), on_off(on)))
        }

        Commands::Volume { value: None } => {
            let volume = client.get_volume().await?;
            Ok(format!("volume is {}", volume.to_string().cyan()))
        }
        Commands::Volume { value: Some(value) } => {
            client.set_volume(value).await?;
            Ok(format!("volume {} {}", "set to".green(), value))
        }

        Commands::Mute { value: None } => {
            let mute = client.get_mute().await?;
            Ok(format!("mute is {}", on_off(mute)))
        }
        Commands::Mute { value: Some(value) } => {
            let mute = parse_bool("mute", &value)?;
            client.set_mute(mute).await?;
            Ok(format!("mute {} {}", "set to".green(), on_off(mute)))
        }

        Commands::Source { value: None } => {
            let source = client.get_source().await?;
            Ok(format!("source is {}", source.cyan()))
        }
        Commands::Source { value: Some(value) } => {
            client.set_source(Symbol::parse("source", &value)?).await?;
            Ok(format!("source {} {}", "set to".green(), value))
        }

        Commands::ScreenSize { value: None } => {
            let size = client.get_screen_size().await?;
            Ok(format!("screen size is {}", size.to_string().cyan()))
        }
        Commands::ScreenSize { value: Some(value) } => {
            client.set_screen_size(value).await?;
            Ok(format!("screen size {} {}", "set to".green(), value))
        }

        Commands::VideoWallMode { value: None } => {
            let mode = client.get_video_wall_mode().await?;
            Ok(format!("video wall mode is {}", mode.cyan()))
        }
        Commands::VideoWallMode { value: Some(value) } => {
            client
                .set_video_wall_mode(Symbol::parse("video_wall_mode", &value)?)
                .await?;
            Ok(format!("video wall mode {} {}", "set to".green(), value))
        }

        Commands::SafetyLock { value: None } => {
            let locked = client.get_safety_lock().await?;
            Ok(format!("safety lock is {}", on_off(locked)))
        }
        Commands::SafetyLock { value: Some(value) } => {
            let locked = parse_bool("safety lock", &value)?;
            client.set_safety_lock(locked).await?;
            Ok(format!("safety lock {} {}", "set to".green(), on_off(locked)))
        }

        Commands::VideoWallOn { value: None } => {
            let on = client.get_video_wall_on().await?;
            Ok(format!("video wall is {}", on_off(on)))
        }
        Commands::VideoWallOn { value: Some(value) } => {
            let on = parse_bool("video wall on", &value)?;
            client.set_video_wall_on(on).await?;
            Ok(format!("video wall {} {}", "set to".green(), on_off(on)))
        }

        Commands::VideoWallUser { col: None, .. } => {
            let wall = client.get_video_wall_user().await?;
            Ok(format!("video wall position is {}", wall.to_string().cyan()))
        }
        Commands::VideoWallUser {
            col: Some(col),
            row,
            pos,
        } => {
            let row = row.unwrap_or(col);
            let pos = pos.unwrap_or(0);
            client.set_video_wall_user(col, row, pos).await?;
            if col == 0 || row == 0 {
                Ok(format!("video wall {}", "disabled".green()))
            } else {
                Ok(format!(
                    "video wall position {} {}x{} #{}",
                    "set to".green(),
                    col,
                    row,
                    pos
                ))
            }
        }

        Commands::Raw { command, values } => {
            let command = match Symbol::parse("command", &command)? {
                Symbol::Id(id) => Command::from_id(id)?,
                Symbol::Name(name) => Command::from_name(&name)?,
            };
            let reply = client.raw(command, &values).await?;
            let bytes = reply
                .values
                .iter()
                .map(|byte| format!("{byte:#04x}"))
                .collect::<Vec<_>>()
                .join(" ");
            if bytes.is_empty() {
                Ok(format!("{} {}", command, "acknowledged".green()))
            } else {
                Ok(format!("{} {} [{}]", command, "acknowledged".green(), bytes))
            }
        }
    }
}

fn on_off(value: bool) -> colored::ColoredString {
    if value {
        "on".cyan()
    } else {
        "off".cyan()
    }
}

/// Parses a caller-facing boolean token: 1/0, on/off, true/false.
fn parse_bool(field: &str, token: &str) -> Result<bool, String> {
    match token.to_ascii_lowercase().as_str() {
        "1" | "on" | "true" => Ok(true),
        "0" | "off" | "false" => Ok(false),
        _ => Err(format!(
            "{field} expects 1/0, on/off or true/false, got \"{token}\""
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("power", "1").unwrap());
        assert!(parse_bool("power", "ON").unwrap());
        assert!(parse_bool("power", "true").unwrap());
        assert!(!parse_bool("power", "0").unwrap());
        assert!(!parse_bool("power", "off").unwrap());
        assert!(parse_bool("power", "maybe").is_err());
    }
}
