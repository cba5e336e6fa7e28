mod reader;
mod tls;

pub use reader::{ReadStopReason, ResponseReader};
pub use tls::{TlsProbe, CIPHER_LIST};

use async_trait::async_trait;
use thiserror::Error;

/// Raw bytes captured from one host, plus why reading stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResponse {
    pub bytes: Vec<u8>,
    pub reason: ReadStopReason,
    pub truncated: bool,
}

/// Host-scoped probe failure. The display text is the message reported
/// for the host; `reason` keeps the underlying cause for logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("unknown error")]
    ContextSetupFailed { host: String, reason: String },
    #[error("connection could not be established")]
    ConnectFailed { host: String, reason: String },
    #[error("ssl/tls handshake failed")]
    HandshakeFailed { host: String, reason: String },
    #[error("no data returned from server")]
    NoData { host: String, reason: String },
}

impl ProbeError {
    pub fn host(&self) -> &str {
        match self {
            ProbeError::ContextSetupFailed { host, .. }
            | ProbeError::ConnectFailed { host, .. }
            | ProbeError::HandshakeFailed { host, .. }
            | ProbeError::NoData { host, .. } => host,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            ProbeError::ContextSetupFailed { reason, .. }
            | ProbeError::ConnectFailed { reason, .. }
            | ProbeError::HandshakeFailed { reason, .. }
            | ProbeError::NoData { reason, .. } => reason,
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            ProbeError::ContextSetupFailed { .. } => "context",
            ProbeError::ConnectFailed { .. } => "connect",
            ProbeError::HandshakeFailed { .. } => "handshake",
            ProbeError::NoData { .. } => "read",
        }
    }
}

#[async_trait]
pub trait Prober: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch the start of the HTTPS response for `/` on `hostname`.
    async fn probe(&self, hostname: &str) -> Result<ProbeResponse, ProbeError>;
}
