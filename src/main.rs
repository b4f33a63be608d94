//! mdc - Multiple Display Control command-line tool
//!
//! One-shot viewing and control of MDC-capable displays over TCP/IP.

mod commands;

use clap::Parser;
use colored::Colorize;
use commands::Commands;
use mdc_client::{Client, ConnectionConfig, Timeout};
use std::net::Ipv4Addr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mdc")]
#[command(about = "Multiple Display Control protocol client over TCP/IP")]
#[command(version)]
struct Cli {
    /// Display IPv4 address
    host: Ipv4Addr,

    /// Display port
    #[arg(short, long, default_value_t = 1515)]
    port: u16,

    /// Display id (default 0xfe addresses all displays)
    #[arg(short, long, default_value_t = 254)]
    id: u8,

    /// Timeout on socket operations, in seconds. Positive sets a
    /// deadline, zero means non-blocking, negative blocks forever.
    #[arg(short, long, default_value_t = 5.0)]
    timeout: f64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = ConnectionConfig::new(cli.host)
        .with_port(cli.port)
        .with_display_id(cli.id)
        .with_timeout(Timeout::from_secs(cli.timeout));

    let mut client = Client::open(config).await.map_err(|e| {
        eprintln!("{}: {}", "Connection failed".red(), e);
        e
    })?;

    let result = commands::execute(&mut client, cli.command).await;
    let endpoint = client.to_string();
    client.close().await;

    match result {
        Ok(output) => {
            println!("{} .. {}", endpoint.dimmed(), output);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} .. {}: {}", endpoint.dimmed(), "Error".red(), e);
            std::process::exit(1);
        }
    }
}
