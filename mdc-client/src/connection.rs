//! Connection management.
//!
//! One TCP connection to one display, strictly synchronous
//! request/reply: no pipelining and no multiplexed transaction ids.
//! The two-state lifecycle (disconnected/connected) is realized as an
//! `Option<TcpStream>`, and exclusive `&mut` access enforces the
//! single-outstanding-request rule without internal locking. Callers
//! needing concurrent access to the same display must serialize it
//! themselves, one connection per task.

use crate::config::{ConnectionConfig, Timeout};
use crate::error::ClientError;
use bytes::{Bytes, BytesMut};
use mdc_protocol::{Reply, MAX_REPLY_SIZE};
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Applies a deadline policy to one socket operation.
async fn bounded<F, T>(timeout: Timeout, op: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match timeout {
        Timeout::Blocking => op.await,
        Timeout::NonBlocking => tokio::time::timeout(Duration::ZERO, op)
            .await
            .map_err(|_| ClientError::Timeout)?,
        Timeout::After(deadline) => tokio::time::timeout(deadline, op)
            .await
            .map_err(|_| ClientError::Timeout)?,
    }
}

/// A connection to one MDC display.
pub struct Connection {
    config: ConnectionConfig,
    stream: Option<TcpStream>,
    /// Reply bytes read but not yet consumed by a decoded frame.
    buffer: BytesMut,
}

impl Connection {
    /// Creates a new connection (not yet connected).
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            stream: None,
            buffer: BytesMut::with_capacity(MAX_REPLY_SIZE),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Returns whether the connection is established.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Connects to the display. A no-op when already connected.
    ///
    /// On timeout or refusal the state stays disconnected and the
    /// failure surfaces as [`ClientError::ConnectionFailed`], which is
    /// retryable.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        if self.is_connected() {
            return Ok(());
        }

        let addr = self.config.addr();
        tracing::debug!("connecting to {addr}...");

        let connect = async { Ok(TcpStream::connect(addr).await?) };
        let stream = match bounded(self.config.timeout, connect).await {
            Ok(stream) => stream,
            Err(ClientError::Timeout) => {
                tracing::debug!("connect deadline elapsed");
                return Err(ClientError::ConnectionFailed(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "connect deadline elapsed",
                )));
            }
            Err(ClientError::Io(e)) => {
                tracing::debug!("connect failed: {e}");
                return Err(ClientError::ConnectionFailed(e));
            }
            Err(e) => return Err(e),
        };

        stream.set_nodelay(true).ok();
        self.buffer.clear();
        self.stream = Some(stream);
        tracing::debug!("connected to {addr}");
        Ok(())
    }

    /// Closes the connection. Idempotent; always leaves the state
    /// disconnected.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            tracing::debug!("closing connection");
            let _ = stream.shutdown().await;
        }
        self.buffer.clear();
    }

    /// Hands the raw stream back to the caller, leaving the state
    /// disconnected. The stream is not shut down.
    pub fn detach(&mut self) -> Option<TcpStream> {
        self.buffer.clear();
        self.stream.take()
    }

    /// Writes a complete frame to the socket, looping until every byte
    /// is flushed. Returns the byte count written.
    pub async fn send(&mut self, frame: &[u8]) -> Result<usize, ClientError> {
        let timeout = self.config.timeout;
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;

        tracing::debug!("sending {} bytes", frame.len());
        bounded(timeout, async {
            stream.write_all(frame).await?;
            Ok(frame.len())
        })
        .await
    }

    /// Reads one chunk of raw reply bytes, at most [`MAX_REPLY_SIZE`].
    ///
    /// The bytes are returned uninterpreted; callers wanting a parsed
    /// acknowledgement frame should use [`Connection::transact`].
    pub async fn receive(&mut self) -> Result<Bytes, ClientError> {
        let timeout = self.config.timeout;
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;

        let mut chunk = [0u8; MAX_REPLY_SIZE];
        let n = bounded(timeout, async { Ok(stream.read(&mut chunk).await?) }).await?;
        if n == 0 {
            return Err(ClientError::ConnectionClosed);
        }

        tracing::debug!("received {n} bytes");
        Ok(Bytes::copy_from_slice(&chunk[..n]))
    }

    /// Sends a request frame and reads until a complete reply frame
    /// reassembles, however the device splits it across segments.
    ///
    /// Rejected commands fail with [`ClientError::Nack`].
    pub async fn transact(&mut self, frame: &[u8]) -> Result<Reply, ClientError> {
        self.send(frame).await?;

        let timeout = self.config.timeout;
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;
        let buffer = &mut self.buffer;

        let reply = bounded(timeout, async {
            let mut chunk = [0u8; MAX_REPLY_SIZE];
            loop {
                if let Some(reply) = Reply::decode(buffer)? {
                    return Ok(reply);
                }
                let n = stream.read(&mut chunk).await?;
                if n == 0 {
                    return Err(ClientError::ConnectionClosed);
                }
                buffer.extend_from_slice(&chunk[..n]);
            }
        })
        .await?;

        if !reply.ack {
            tracing::warn!("display rejected command {:#04x}", reply.command);
            return Err(ClientError::Nack {
                command: reply.command,
            });
        }
        Ok(reply)
    }
}
