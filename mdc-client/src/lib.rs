//! # mdc-client
//!
//! Transaction client for MDC displays.
//!
//! This crate provides:
//! - Async TCP connection with a two-state lifecycle and deadline policy
//! - Strictly synchronous request/reply transactions
//! - Per-control get/set operations over the protocol codec

pub mod client;
pub mod config;
pub mod connection;
pub mod error;

pub use client::Client;
pub use config::{ConnectionConfig, Timeout, DEFAULT_TIMEOUT};
pub use connection::Connection;
pub use error::ClientError;
