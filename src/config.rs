//! Configuration module for the daytime binary.
//!
//! Supports both command-line arguments and a TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Well-known Daytime Protocol port (RFC 867). Shared by the server and
/// client defaults so the two cannot drift apart.
pub const DAYTIME_SERVICE_PORT: u16 = 13;

/// Command-line arguments for the daytime binary.
#[derive(Parser, Debug)]
#[command(name = "daytime")]
#[command(version = "0.1.0")]
#[command(about = "An RFC 867 Daytime Protocol server and client", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Operating mode selected on the command line.
#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the daytime server
    Server {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch and parse one daytime message
    Client {
        /// Hostname or address of the daytime service
        host: Option<String>,

        /// Port to connect to
        #[arg(short, long)]
        port: Option<u16>,

        /// Message layout to expect
        #[arg(short, long, value_enum)]
        format: Option<FormatMode>,
    },
}

/// Message layout selection as it appears on the CLI and in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    /// Detect the layout from the message text.
    #[default]
    Auto,
    /// Generic weekday/month/day/time/year layout.
    Rfc,
    /// Eight-field NIST layout.
    Nist,
}

/// TOML configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerTable,
    #[serde(default)]
    pub client: ClientTable,
    #[serde(default)]
    pub logging: LoggingTable,
}

/// Server-related configuration.
#[derive(Debug, Deserialize)]
pub struct ServerTable {
    /// Port the server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerTable {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Client-related configuration.
#[derive(Debug, Deserialize)]
pub struct ClientTable {
    /// Target host for fetches.
    #[serde(default = "default_host")]
    pub host: String,
    /// Target port for fetches.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Message layout to expect.
    #[serde(default)]
    pub format: FormatMode,
}

impl Default for ClientTable {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            format: FormatMode::Auto,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
pub struct LoggingTable {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingTable {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    DAYTIME_SERVICE_PORT
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Final resolved client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub format: FormatMode,
}

/// Resolved operating mode.
#[derive(Debug, Clone)]
pub enum Mode {
    Server(ServerConfig),
    Client(ClientConfig),
}

/// Final resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        let cli = CliArgs::parse();

        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Ok(resolve(cli, toml_config))
    }
}

/// Merge CLI args with TOML config (CLI takes precedence).
fn resolve(cli: CliArgs, toml_config: TomlConfig) -> Config {
    let mode = match cli.command {
        CliCommand::Server { port } => Mode::Server(ServerConfig {
            port: port.unwrap_or(toml_config.server.port),
        }),
        CliCommand::Client { host, port, format } => Mode::Client(ClientConfig {
            host: host.unwrap_or(toml_config.client.host),
            port: port.unwrap_or(toml_config.client.port),
            format: format.unwrap_or(toml_config.client.format),
        }),
    };

    Config {
        mode,
        log_level: cli.log_level.unwrap_or(toml_config.logging.level),
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.server.port, DAYTIME_SERVICE_PORT);
        assert_eq!(config.client.host, "localhost");
        assert_eq!(config.client.port, DAYTIME_SERVICE_PORT);
        assert_eq!(config.client.format, FormatMode::Auto);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            port = 10013

            [client]
            host = "time.nist.gov"
            format = "nist"

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 10013);
        assert_eq!(config.client.host, "time.nist.gov");
        assert_eq!(config.client.port, DAYTIME_SERVICE_PORT);
        assert_eq!(config.client.format, FormatMode::Nist);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_takes_precedence_over_toml() {
        let toml_str = r#"
            [client]
            host = "time.nist.gov"
            port = 10013

            [logging]
            level = "warn"
        "#;
        let toml_config: TomlConfig = toml::from_str(toml_str).unwrap();

        let cli = CliArgs {
            config: None,
            log_level: Some("trace".to_string()),
            command: CliCommand::Client {
                host: Some("localhost".to_string()),
                port: None,
                format: Some(FormatMode::Rfc),
            },
        };

        let config = resolve(cli, toml_config);
        assert_eq!(config.log_level, "trace");
        match config.mode {
            Mode::Client(client) => {
                assert_eq!(client.host, "localhost");
                // Not set on the CLI, so the file value applies.
                assert_eq!(client.port, 10013);
                assert_eq!(client.format, FormatMode::Rfc);
            }
            other => panic!("unexpected mode: {:?}", other),
        }
    }

    #[test]
    fn test_server_mode_resolution() {
        let cli = CliArgs {
            config: None,
            log_level: None,
            command: CliCommand::Server { port: None },
        };

        let config = resolve(cli, TomlConfig::default());
        assert_eq!(config.log_level, "info");
        match config.mode {
            Mode::Server(server) => assert_eq!(server.port, DAYTIME_SERVICE_PORT),
            other => panic!("unexpected mode: {:?}", other),
        }
    }
}
