use super::{ProbeError, ProbeResponse, Prober, ResponseReader};
use crate::model::Config;
use async_trait::async_trait;
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode, SslVersion};
use std::pin::Pin;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::error::Elapsed;
use tokio::time::timeout;
use tokio_openssl::SslStream;
use tracing::debug;

/// OpenSSL defaults minus every known-weak cipher family.
pub const CIPHER_LIST: &str = "DEFAULT:!aNULL:!eNULL:!EXPORT:!DES:!3DES:!RC4:!MD5:!SRP:!PSK";

/// Fetches `/` over HTTPS with a one-shot HTTP/1.0 request.
///
/// Every call builds its own TLS context and connection; all of it is
/// dropped before `probe` returns, on success and on every error path.
#[derive(Debug, Clone)]
pub struct TlsProbe {
    port: u16,
    connect_timeout: Duration,
    handshake_timeout: Duration,
    read_timeout: Duration,
    max_bytes: usize,
}

impl TlsProbe {
    pub fn new(cfg: &Config) -> Self {
        Self {
            port: cfg.port,
            connect_timeout: cfg.connect_timeout,
            handshake_timeout: cfg.handshake_timeout,
            read_timeout: cfg.read_timeout,
            max_bytes: cfg.max_bytes,
        }
    }
}

#[async_trait]
impl Prober for TlsProbe {
    fn name(&self) -> &'static str {
        "tls"
    }

    async fn probe(&self, hostname: &str) -> Result<ProbeResponse, ProbeError> {
        let context_failed = |err: openssl::error::ErrorStack| ProbeError::ContextSetupFailed {
            host: hostname.to_string(),
            reason: err.to_string(),
        };

        let connector = tls_connector().map_err(context_failed)?;

        debug!(host = %hostname, port = self.port, "connecting");
        let tcp = stage_result(
            timeout(self.connect_timeout, TcpStream::connect((hostname, self.port))).await,
            "connect timeout",
            |reason| ProbeError::ConnectFailed {
                host: hostname.to_string(),
                reason,
            },
        )?;

        let mut config = connector.configure().map_err(context_failed)?;
        config.set_verify_hostname(false);
        let ssl = config.into_ssl(hostname).map_err(context_failed)?;
        let mut tls = SslStream::new(ssl, tcp).map_err(context_failed)?;

        stage_result(
            timeout(self.handshake_timeout, Pin::new(&mut tls).connect()).await,
            "handshake timeout",
            |reason| ProbeError::HandshakeFailed {
                host: hostname.to_string(),
                reason,
            },
        )?;
        debug!(
            host = %hostname,
            version = tls.ssl().version_str(),
            cipher = tls.ssl().current_cipher().map(|c| c.name()).unwrap_or("unknown"),
            "handshake complete"
        );

        let request = format!("GET / HTTP/1.0\r\nHost: {hostname}\r\n\r\n");
        tls.write_all(request.as_bytes())
            .await
            .map_err(|err| ProbeError::NoData {
                host: hostname.to_string(),
                reason: format!("failed to write request: {err}"),
            })?;

        let mut reader = ResponseReader::new(self.max_bytes, self.read_timeout);
        let response = reader
            .read(&mut tls)
            .await
            .map_err(|err| ProbeError::NoData {
                host: hostname.to_string(),
                reason: err.to_string(),
            })?;
        if response.bytes.is_empty() {
            return Err(ProbeError::NoData {
                host: hostname.to_string(),
                reason: format!("read stopped ({:?}) before any data", response.reason),
            });
        }
        debug!(
            host = %hostname,
            bytes = response.bytes.len(),
            reason = ?response.reason,
            "response read"
        );

        // Best effort close_notify; the socket is closed on drop regardless.
        let _ = timeout(self.read_timeout, tls.shutdown()).await;

        Ok(response)
    }
}

/// Map a timed stage to its error kind; expiry uses `on_timeout` as the reason.
fn stage_result<T, E: std::fmt::Display>(
    result: Result<Result<T, E>, Elapsed>,
    on_timeout: &str,
    fail: impl FnOnce(String) -> ProbeError,
) -> Result<T, ProbeError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(fail(err.to_string())),
        Err(_) => Err(fail(on_timeout.to_string())),
    }
}

fn tls_connector() -> Result<SslConnector, openssl::error::ErrorStack> {
    let mut builder = SslConnector::builder(SslMethod::tls_client())?;
    builder.set_cipher_list(CIPHER_LIST)?;
    builder.set_min_proto_version(Some(SslVersion::TLS1_2))?;
    // Only the response headers matter, so any certificate is accepted.
    builder.set_verify(SslVerifyMode::NONE);
    Ok(builder.build())
}
