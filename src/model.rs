use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const HTTPS_PORT: u16 = 443;
pub const MIN_RESPONSE_BYTES: usize = 10 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub port: u16,
    pub connect_timeout: Duration,
    pub handshake_timeout: Duration,
    pub read_timeout: Duration,
    pub max_bytes: usize,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            port: HTTPS_PORT,
            connect_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            max_bytes: MIN_RESPONSE_BYTES,
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Jsonl,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("hostname must not be empty")]
    EmptyHostname,
    #[error("host {0} already has a result")]
    AlreadySettled(String),
}

/// Result state of a single host check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Pending,
    Found {
        proof: String,
    },
    NotFound,
    Errored {
        detail: String,
    },
}

impl Outcome {
    pub fn status_word(&self) -> &'static str {
        match self {
            Outcome::Found { .. } => "hsts",
            Outcome::Errored { .. } => "error",
            Outcome::NotFound | Outcome::Pending => "none",
        }
    }
}

/// One hostname from the input list and the result of checking it.
///
/// The hostname is fixed at construction. The outcome moves out of
/// `Pending` exactly once, through [`HostRecord::settle`].
#[derive(Debug, Clone)]
pub struct HostRecord {
    hostname: String,
    outcome: Outcome,
    truncated: bool,
}

impl HostRecord {
    pub fn new(hostname: impl Into<String>) -> Result<Self, RecordError> {
        let hostname = hostname.into();
        if hostname.is_empty() {
            return Err(RecordError::EmptyHostname);
        }
        Ok(Self {
            hostname,
            outcome: Outcome::Pending,
            truncated: false,
        })
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.outcome, Outcome::Pending)
    }

    pub fn found(&self) -> bool {
        matches!(self.outcome, Outcome::Found { .. })
    }

    pub fn proof(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Found { proof } => Some(proof),
            _ => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Errored { detail } => Some(detail),
            _ => None,
        }
    }

    /// Response filled the read buffer before headers or stream ended.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn settle(&mut self, outcome: Outcome, truncated: bool) -> Result<(), RecordError> {
        if !self.is_pending() {
            return Err(RecordError::AlreadySettled(self.hostname.clone()));
        }
        self.outcome = outcome;
        self.truncated = truncated;
        Ok(())
    }
}
