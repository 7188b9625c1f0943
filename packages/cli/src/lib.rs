//! # confentry-cli
//!
//! Command-line client for the config-entry gateway.
//!
//! ```bash
//! confentry write service-defaults.json
//! confentry read service-defaults web
//! confentry list service-resolver --datacenter east
//! confentry delete service-defaults web
//! ```
//!
//! Settings come from `~/.config/confentry/config.json`, then
//! `CONFENTRY_*` environment variables, then flags.

pub mod commands;
pub mod config;
pub mod error;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

use confentry_http::{ConfigEndpoint, EndpointConfig, HttpRpcBackend};

pub use commands::{execute, format_result, Command, CommandResult};
pub use config::{ClientConfig, Overrides};
pub use error::CliError;

/// confentry - read and write config entries
#[derive(Parser, Debug)]
#[command(name = "confentry")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file (default: <config dir>/confentry/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the RPC server
    #[arg(long, global = true)]
    pub http_addr: Option<String>,

    /// Datacenter to query
    #[arg(long, global = true)]
    pub datacenter: Option<String>,

    /// ACL token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Request timeout, e.g. 10s
    #[arg(long, global = true)]
    pub timeout: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config_file: self.config.clone(),
            http_addr: self.http_addr.clone(),
            datacenter: self.datacenter.clone(),
            token: self.token.clone(),
            timeout: self.timeout.clone(),
        }
    }
}

/// Run one command against the configured server.
pub fn run(config: &ClientConfig, command: &Command, stdin: impl Read) -> Result<CommandResult, CliError> {
    tracing::debug!(addr = %config.http_addr, datacenter = %config.datacenter, "connecting");
    let backend = HttpRpcBackend::with_timeout(&config.http_addr, config.timeout)?;

    let mut endpoint_config = EndpointConfig::default().with_token(config.token.clone());
    endpoint_config.datacenter = config.datacenter.clone();
    let endpoint = ConfigEndpoint::with_config(backend, endpoint_config);

    execute(&endpoint, command, stdin)
}
