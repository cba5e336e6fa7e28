use super::ProbeResponse;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadStopReason {
    #[default]
    NotStarted,
    ConnectionClosed,
    HeaderEnd,
    SizeLimit,
    Timeout,
}

/// Reads a response into a buffer of at most `max_bytes`.
pub struct ResponseReader {
    max_bytes: usize,
    read_timeout: Duration,
}

impl ResponseReader {
    pub fn new(max_bytes: usize, read_timeout: Duration) -> Self {
        Self {
            max_bytes: max_bytes.max(1),
            read_timeout,
        }
    }

    /// Read until the headers end, the peer closes, the buffer fills or a
    /// read stalls past the timeout. An I/O error is only returned when
    /// nothing has been read yet.
    pub async fn read<T: AsyncRead + Unpin>(
        &mut self,
        stream: &mut T,
    ) -> std::io::Result<ProbeResponse> {
        let mut buf = vec![0u8; self.max_bytes];
        let mut total = 0usize;
        let reason = loop {
            if total >= self.max_bytes {
                break ReadStopReason::SizeLimit;
            }
            match timeout(self.read_timeout, stream.read(&mut buf[total..])).await {
                Ok(Ok(0)) => break ReadStopReason::ConnectionClosed,
                Ok(Ok(n)) => {
                    total += n;
                    if find_header_end(&buf[..total]).is_some() {
                        break ReadStopReason::HeaderEnd;
                    }
                }
                Ok(Err(err)) if total == 0 => return Err(err),
                Ok(Err(err)) => {
                    // peers commonly drop the socket without close_notify
                    tracing::debug!(error = %err, bytes = total, "read ended with error");
                    break ReadStopReason::ConnectionClosed;
                }
                Err(_) => break ReadStopReason::Timeout,
            }
        };
        buf.truncate(total);
        Ok(ProbeResponse {
            bytes: buf,
            reason,
            truncated: reason == ReadStopReason::SizeLimit,
        })
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    if let Some(pos) = buf.windows(3).position(|w| w == b"\n\r\n") {
        return Some(pos + 3);
    }
    buf.windows(2).position(|w| w == b"\n\n").map(|pos| pos + 2)
}
