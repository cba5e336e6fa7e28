use crate::model::{Config, OutputConfig, OutputFormat, HTTPS_PORT, MIN_RESPONSE_BYTES};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "hsts-check",
    author,
    version,
    about = "Check a list of hosts for the Strict-Transport-Security header",
    long_about = None
)]
pub struct Cli {
    /// File containing hostnames (one per line)
    #[arg(value_name = "HOSTLIST_FILE")]
    pub hostlist: PathBuf,

    /// Output format
    #[arg(long = "output", default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Connect timeout in milliseconds
    #[arg(long = "connect-timeout", default_value_t = 10_000)]
    pub connect_timeout_ms: u64,

    /// TLS handshake timeout in milliseconds
    #[arg(long = "handshake-timeout", default_value_t = 10_000)]
    pub handshake_timeout_ms: u64,

    /// Read timeout in milliseconds
    #[arg(long = "read-timeout", default_value_t = 10_000)]
    pub read_timeout_ms: u64,

    /// Max bytes of the HTTP response to capture
    #[arg(long = "max-bytes", default_value_t = MIN_RESPONSE_BYTES)]
    pub max_bytes: usize,

    #[arg(long = "port", default_value_t = HTTPS_PORT, hide = true)]
    pub port: u16,
}

impl Cli {
    pub fn into_config(self) -> anyhow::Result<Config> {
        if self.connect_timeout_ms == 0 {
            anyhow::bail!("connect timeout must be greater than zero");
        }

        if self.handshake_timeout_ms == 0 {
            anyhow::bail!("handshake timeout must be greater than zero");
        }

        if self.read_timeout_ms == 0 {
            anyhow::bail!("read timeout must be greater than zero");
        }

        Ok(Config {
            input: self.hostlist,
            port: self.port,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            handshake_timeout: Duration::from_millis(self.handshake_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            max_bytes: self.max_bytes.max(MIN_RESPONSE_BYTES),
            output: OutputConfig {
                format: self.output,
            },
        })
    }
}
