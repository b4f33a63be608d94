//! High-level client API.
//!
//! One get/set operation pair per control, each a thin composition of
//! the codec builders and one [`Connection::transact`] round trip.
//! Validation happens before any bytes reach the wire.

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::error::ClientError;
use mdc_protocol::registry::{INPUT_SOURCES_GET, INPUT_SOURCES_SET, VIDEO_WALL_MODES};
use mdc_protocol::wall::{self, WallPosition};
use mdc_protocol::{frame, Command, ProtocolError, Reply, Symbol};
use std::fmt;

/// High-level client for one MDC display.
///
/// Dropping the client drops the socket, so a client held in a scope
/// releases the connection on every exit path, early returns and
/// propagated errors included.
pub struct Client {
    conn: Connection,
}

impl Client {
    /// Creates a new client, not yet connected.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            conn: Connection::new(config),
        }
    }

    /// Creates a client and connects it in one step.
    pub async fn open(config: ConnectionConfig) -> Result<Self, ClientError> {
        let mut client = Self::new(config);
        client.connect().await?;
        Ok(client)
    }

    pub async fn connect(&mut self) -> Result<(), ClientError> {
        self.conn.connect().await
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    pub async fn close(&mut self) {
        self.conn.close().await
    }

    pub fn config(&self) -> &ConnectionConfig {
        self.conn.config()
    }

    /// The underlying connection, for raw send/receive access.
    pub fn connection(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Sends any registered command with a raw payload and returns the
    /// acknowledged reply.
    pub async fn raw(&mut self, command: Command, args: &[i64]) -> Result<Reply, ClientError> {
        self.set(command, args).await
    }

    async fn get(&mut self, command: Command) -> Result<Reply, ClientError> {
        let display_id = self.conn.config().display_id;
        let frame = frame::build_get(command.id(), display_id)?;
        self.transact(command, &frame).await
    }

    async fn set(&mut self, command: Command, args: &[i64]) -> Result<Reply, ClientError> {
        let display_id = self.conn.config().display_id;
        let frame = frame::build_set(command.id(), display_id, args)?;
        self.transact(command, &frame).await
    }

    async fn transact(&mut self, command: Command, frame: &[u8]) -> Result<Reply, ClientError> {
        let reply = self.conn.transact(frame).await?;
        if reply.command != command.id() {
            return Err(ClientError::UnexpectedReply {
                command: reply.command,
            });
        }
        Ok(reply)
    }

    /// Reads the power state (0x11).
    pub async fn get_power(&mut self) -> Result<bool, ClientError> {
        Ok(self.get(Command::Power).await?.value()? != 0)
    }

    /// Turns the display on or off (0x11).
    pub async fn set_power(&mut self, on: bool) -> Result<(), ClientError> {
        self.set(Command::Power, &[on as i64]).await?;
        Ok(())
    }

    /// Reads the volume (0x12), `[0, 100]`.
    pub async fn get_volume(&mut self) -> Result<u8, ClientError> {
        Ok(self.get(Command::Volume).await?.value()?)
    }

    /// Sets the volume (0x12). Values above 100 are rejected before
    /// any bytes are sent.
    pub async fn set_volume(&mut self, volume: u8) -> Result<(), ClientError> {
        if volume > 100 {
            return Err(ProtocolError::OutOfRange {
                field: "volume",
                value: volume as i64,
                min: 0,
                max: 100,
            }
            .into());
        }
        self.set(Command::Volume, &[volume as i64]).await?;
        Ok(())
    }

    /// Reads the mute state (0x13).
    pub async fn get_mute(&mut self) -> Result<bool, ClientError> {
        Ok(self.get(Command::Mute).await?.value()? != 0)
    }

    /// Mutes or unmutes the display (0x13).
    pub async fn set_mute(&mut self, mute: bool) -> Result<(), ClientError> {
        self.set(Command::Mute, &[mute as i64]).await?;
        Ok(())
    }

    /// Reads the active input source (0x14) as its registered name.
    pub async fn get_source(&mut self) -> Result<&'static str, ClientError> {
        let value = self.get(Command::InputSource).await?.value()?;
        Ok(INPUT_SOURCES_GET.describe(value)?)
    }

    /// Switches the input source (0x14); accepts a registered name
    /// (case-insensitive) or byte id from the settable table.
    pub async fn set_source(&mut self, source: impl Into<Symbol>) -> Result<(), ClientError> {
        let value = INPUT_SOURCES_SET.resolve(&source.into())?;
        self.set(Command::InputSource, &[value as i64]).await?;
        Ok(())
    }

    /// Reads the screen size (0x19).
    pub async fn get_screen_size(&mut self) -> Result<u8, ClientError> {
        Ok(self.get(Command::ScreenSize).await?.value()?)
    }

    /// Sets the screen size (0x19).
    pub async fn set_screen_size(&mut self, size: u8) -> Result<(), ClientError> {
        self.set(Command::ScreenSize, &[size as i64]).await?;
        Ok(())
    }

    /// Reads the video wall stretch mode (0x5C) as its registered name.
    pub async fn get_video_wall_mode(&mut self) -> Result<&'static str, ClientError> {
        let value = self.get(Command::VideoWallMode).await?.value()?;
        Ok(VIDEO_WALL_MODES.describe(value)?)
    }

    /// Sets the video wall stretch mode (0x5C): `Natural` or `Full`.
    pub async fn set_video_wall_mode(&mut self, mode: impl Into<Symbol>) -> Result<(), ClientError> {
        let value = VIDEO_WALL_MODES.resolve(&mode.into())?;
        self.set(Command::VideoWallMode, &[value as i64]).await?;
        Ok(())
    }

    /// Reads the safety lock state (0x5D).
    pub async fn get_safety_lock(&mut self) -> Result<bool, ClientError> {
        Ok(self.get(Command::SafetyLock).await?.value()? != 0)
    }

    /// Engages or releases the safety lock (0x5D).
    pub async fn set_safety_lock(&mut self, locked: bool) -> Result<(), ClientError> {
        self.set(Command::SafetyLock, &[locked as i64]).await?;
        Ok(())
    }

    /// Reads whether the video wall is on (0x84).
    pub async fn get_video_wall_on(&mut self) -> Result<bool, ClientError> {
        Ok(self.get(Command::VideoWallOn).await?.value()? != 0)
    }

    /// Turns the video wall on or off (0x84).
    pub async fn set_video_wall_on(&mut self, on: bool) -> Result<(), ClientError> {
        self.set(Command::VideoWallOn, &[on as i64]).await?;
        Ok(())
    }

    /// Reads the wall layout this display is part of (0x89).
    pub async fn get_video_wall_user(&mut self) -> Result<WallPosition, ClientError> {
        let reply = self.get(Command::VideoWallUser).await?;
        if reply.values.len() < 2 {
            return Err(ProtocolError::TruncatedReply(reply.values.len()).into());
        }
        Ok(wall::unpack(reply.values[0], reply.values[1]))
    }

    /// Places this display at `pos` in a `col x row` wall (0x89).
    /// A `col * row` of zero disables the wall.
    pub async fn set_video_wall_user(
        &mut self,
        col: u8,
        row: u8,
        pos: u8,
    ) -> Result<(), ClientError> {
        let [div, serial] = wall::pack(col, row, pos)?;
        self.set(Command::VideoWallUser, &[div as i64, serial as i64])
            .await?;
        Ok(())
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.conn.config().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timeout;
    use mdc_protocol::{checksum, REPLY_COMMAND};
    use std::net::Ipv4Addr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_config(port: u16) -> ConnectionConfig {
        ConnectionConfig::new(Ipv4Addr::LOCALHOST)
            .with_port(port)
            .with_display_id(0)
            .with_timeout(Timeout::After(Duration::from_secs(1)))
    }

    fn ack_frame(command: u8, values: &[u8]) -> Vec<u8> {
        let mut frame = vec![0xAA, REPLY_COMMAND, 0x00, (values.len() + 2) as u8, b'A', command];
        frame.extend_from_slice(values);
        let sum = checksum(&frame[1..]);
        frame.push(sum);
        frame
    }

    async fn local_listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    /// Accepts one connection, answers each request with the scripted
    /// reply, and returns everything the client wrote.
    async fn scripted_display(listener: TcpListener, replies: Vec<Vec<u8>>) -> Vec<u8> {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut written = Vec::new();
        let mut chunk = [0u8; 64];
        for reply in replies {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            written.extend_from_slice(&chunk[..n]);
            socket.write_all(&reply).await.unwrap();
        }
        // drain until the client hangs up
        loop {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => written.extend_from_slice(&chunk[..n]),
            }
        }
        written
    }

    #[tokio::test]
    async fn test_get_power() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(listener, vec![ack_frame(0x11, &[0x01])]));

        let mut client = Client::open(test_config(port)).await.unwrap();
        assert!(client.get_power().await.unwrap());
        client.close().await;

        // a get request is a bare 5-byte frame with empty payload
        assert_eq!(display.await.unwrap(), vec![0xAA, 0x11, 0x00, 0x00, 0x11]);
    }

    #[tokio::test]
    async fn test_set_source_by_name() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(listener, vec![ack_frame(0x14, &[0x23])]));

        let mut client = Client::open(test_config(port)).await.unwrap();
        client.set_source("hdmi2").await.unwrap();
        client.close().await;

        let written = display.await.unwrap();
        assert_eq!(written, vec![0xAA, 0x14, 0x00, 0x01, 0x23, 0x38]);
    }

    #[tokio::test]
    async fn test_get_source_decodes_gettable_superset() {
        let (listener, port) = local_listener().await;
        // 0x22 (HDMI1_PC) is gettable but not settable
        let display = tokio::spawn(scripted_display(listener, vec![ack_frame(0x14, &[0x22])]));

        let mut client = Client::open(test_config(port)).await.unwrap();
        assert_eq!(client.get_source().await.unwrap(), "HDMI1_PC");
        client.close().await;
        display.await.unwrap();
    }

    #[tokio::test]
    async fn test_get_source_unknown_byte() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(listener, vec![ack_frame(0x14, &[0x99])]));

        let mut client = Client::open(test_config(port)).await.unwrap();
        let err = client.get_source().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::UnknownValue { field: "source", .. })
        ));
        client.close().await;
        display.await.unwrap();
    }

    #[tokio::test]
    async fn test_set_volume_range_checked_before_any_write() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(listener, vec![]));

        let mut client = Client::open(test_config(port)).await.unwrap();
        let err = client.set_volume(150).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::OutOfRange { field: "volume", value: 150, .. })
        ));
        client.close().await;

        // the display saw zero bytes
        assert!(display.await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_source_unknown_name_writes_nothing() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(listener, vec![]));

        let mut client = Client::open(test_config(port)).await.unwrap();
        let err = client.set_source("composite").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::UnknownValue { .. })
        ));
        client.close().await;
        assert!(display.await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disconnected_operation_fails_without_io() {
        let mut client = Client::new(test_config(1515));
        assert!(matches!(
            client.get_power().await,
            Err(ClientError::NotConnected)
        ));
        assert!(matches!(
            client.set_power(true).await,
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_video_wall_round_trip() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(
            listener,
            vec![ack_frame(0x89, &[]), ack_frame(0x89, &[0x23, 0x04])],
        ));

        let mut client = Client::open(test_config(port)).await.unwrap();
        client.set_video_wall_user(2, 3, 4).await.unwrap();
        let wall = client.get_video_wall_user().await.unwrap();
        assert_eq!(wall, WallPosition::new(2, 3, 4));
        client.close().await;

        let written = display.await.unwrap();
        // set frame carries the packed [div, serial] pair
        assert_eq!(&written[..7], &[0xAA, 0x89, 0x00, 0x02, 0x23, 0x04, 0xB2]);
    }

    #[tokio::test]
    async fn test_mute_round_trip() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(
            listener,
            vec![ack_frame(0x13, &[]), ack_frame(0x13, &[0x01])],
        ));

        let mut client = Client::open(test_config(port)).await.unwrap();
        client.set_mute(true).await.unwrap();
        assert!(client.get_mute().await.unwrap());
        client.close().await;

        let written = display.await.unwrap();
        assert_eq!(&written[..6], &[0xAA, 0x13, 0x00, 0x01, 0x01, 0x15]);
    }

    #[tokio::test]
    async fn test_screen_size_round_trip() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(
            listener,
            vec![ack_frame(0x19, &[]), ack_frame(0x19, &[0x20])],
        ));

        let mut client = Client::open(test_config(port)).await.unwrap();
        client.set_screen_size(85).await.unwrap();
        assert_eq!(client.get_screen_size().await.unwrap(), 0x20);
        client.close().await;

        let written = display.await.unwrap();
        assert_eq!(&written[..6], &[0xAA, 0x19, 0x00, 0x01, 0x55, 0x6F]);
    }

    #[tokio::test]
    async fn test_video_wall_mode_round_trip() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(
            listener,
            vec![ack_frame(0x5C, &[]), ack_frame(0x5C, &[0x00])],
        ));

        let mut client = Client::open(test_config(port)).await.unwrap();
        // names resolve case-insensitively through the mode registry
        client.set_video_wall_mode("full").await.unwrap();
        assert_eq!(client.get_video_wall_mode().await.unwrap(), "Natural");
        client.close().await;

        let written = display.await.unwrap();
        assert_eq!(&written[..6], &[0xAA, 0x5C, 0x00, 0x01, 0x01, 0x5E]);
    }

    #[tokio::test]
    async fn test_safety_lock_round_trip() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(
            listener,
            vec![ack_frame(0x5D, &[]), ack_frame(0x5D, &[0x00])],
        ));

        let mut client = Client::open(test_config(port)).await.unwrap();
        client.set_safety_lock(true).await.unwrap();
        assert!(!client.get_safety_lock().await.unwrap());
        client.close().await;

        let written = display.await.unwrap();
        assert_eq!(&written[..6], &[0xAA, 0x5D, 0x00, 0x01, 0x01, 0x5F]);
    }

    #[tokio::test]
    async fn test_video_wall_on_round_trip() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(
            listener,
            vec![ack_frame(0x84, &[]), ack_frame(0x84, &[0x01])],
        ));

        let mut client = Client::open(test_config(port)).await.unwrap();
        client.set_video_wall_on(false).await.unwrap();
        assert!(client.get_video_wall_on().await.unwrap());
        client.close().await;

        let written = display.await.unwrap();
        assert_eq!(&written[..6], &[0xAA, 0x84, 0x00, 0x01, 0x00, 0x85]);
    }

    #[tokio::test]
    async fn test_unexpected_reply_command() {
        let (listener, port) = local_listener().await;
        // display answers for volume while power was asked
        let display = tokio::spawn(scripted_display(listener, vec![ack_frame(0x12, &[0x32])]));

        let mut client = Client::open(test_config(port)).await.unwrap();
        let err = client.get_power().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::UnexpectedReply { command: 0x12 }
        ));
        client.close().await;
        display.await.unwrap();
    }

    #[tokio::test]
    async fn test_drop_closes_socket_when_scope_errors() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut bytes = Vec::new();
            // completes only once the client end is gone
            socket.read_to_end(&mut bytes).await.unwrap();
            bytes
        });

        async fn session(config: ConnectionConfig) -> Result<(), ClientError> {
            let mut client = Client::open(config).await?;
            client.get_power().await?; // times out, propagates
            Ok(())
        }

        let config = test_config(port).with_timeout(Timeout::After(Duration::from_millis(50)));
        let err = session(config).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout));

        // the peer observed EOF, so the socket was released on the
        // error path
        let written = display.await.unwrap();
        assert_eq!(written, vec![0xAA, 0x11, 0x00, 0x00, 0x11]);
    }

    #[tokio::test]
    async fn test_raw_command() {
        let (listener, port) = local_listener().await;
        let display = tokio::spawn(scripted_display(listener, vec![ack_frame(0x19, &[0x20])]));

        let mut client = Client::open(test_config(port)).await.unwrap();
        let reply = client.raw(Command::ScreenSize, &[]).await.unwrap();
        assert_eq!(&reply.values[..], &[0x20]);
        client.close().await;
        display.await.unwrap();
    }

    #[tokio::test]
    async fn test_descriptor() {
        let client = Client::new(
            ConnectionConfig::new(Ipv4Addr::new(192, 168, 1, 100)).with_display_id(0xFE),
        );
        assert_eq!(client.to_string(), "MDC #0xfe @192.168.1.100:1515");
    }
}
