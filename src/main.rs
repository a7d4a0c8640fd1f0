//! daytime: an RFC 867 Daytime Protocol server and client
//!
//! Two modes share one binary:
//! - `daytime server` binds the well-known port and writes a 24-character
//!   timestamp line to every accepted connection, one at a time.
//! - `daytime client <host>` fetches one message, detects whether it is a
//!   generic RFC or NIST layout, and prints the parsed fields.
//!
//! Configuration via CLI arguments or TOML file.

use daytime::client::{DaytimeClient, GetOutcome};
use daytime::config::{ClientConfig, Config, FormatMode, Mode, ServerConfig};
use daytime::message::{DaytimeFormat, DaytimeMessage};
use daytime::server::DaytimeServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match config.mode {
        Mode::Server(server_config) => run_server(server_config),
        Mode::Client(client_config) => run_client(client_config),
    }
}

/// Run the daytime server until it aborts.
fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(port = config.port, "Starting daytime server");

    let server = DaytimeServer::new(config.port);
    server.run()?;
    Ok(())
}

/// Fetch one daytime message and print the parsed fields.
fn run_client(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let format = match config.format {
        FormatMode::Auto => DaytimeFormat::Unknown,
        FormatMode::Rfc => DaytimeFormat::Rfc,
        FormatMode::Nist => DaytimeFormat::Nist,
    };

    info!(host = %config.host, port = config.port, "Fetching daytime message");

    let mut client = DaytimeClient::new(config.host)
        .port(config.port)
        .format(format);

    match client.get() {
        GetOutcome::Ok => {
            println!("Raw message: {}", client.message().trim_end());
            if let Some(parsed) = client.fields() {
                print_fields(parsed);
            }
            Ok(())
        }
        GetOutcome::FetchError => Err("failed to fetch daytime message".into()),
        GetOutcome::ParseError => {
            println!("Raw message: {}", client.message().trim_end());
            Err("daytime message did not match a known layout".into())
        }
    }
}

fn print_fields(parsed: &DaytimeMessage) {
    match parsed {
        DaytimeMessage::Nist(fields) => {
            println!("Format: NIST");
            println!("Modified Julian Date: {}", opt(fields.modified_julian_date));
            println!("Date: {}", fields.date);
            println!("Time: {}", fields.time);
            println!("Daylight Saving: {}", opt(fields.daylight_saving));
            println!("Leap Second Indicator: {}", opt(fields.leap_second));
            println!("UTC Offset: {}", fields.utc_offset);
            println!("Fractional Seconds: {}", opt(fields.fractional_seconds));
            println!("Reference ID: {}", fields.ref_id);
        }
        DaytimeMessage::Rfc(fields) => {
            println!("Format: RFC");
            println!("Date: {}", fields.date);
            println!("Time: {}", fields.time);
        }
    }
}

/// Render an optional numeric field, `-` when the token did not convert.
fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}
