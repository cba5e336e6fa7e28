use crate::model::{HostRecord, Outcome};
use crate::probe::Prober;
use crate::scan::scan;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub not_found: usize,
    pub errored: usize,
}

/// Checks hosts one after another with a single prober.
pub struct Runner<P> {
    prober: P,
}

impl<P: Prober> Runner<P> {
    pub fn new(prober: P) -> Self {
        Self { prober }
    }

    /// Check every pending record in order. A host that fails is recorded
    /// as errored and the batch moves on.
    #[instrument(skip_all, fields(prober = self.prober.name(), hosts = hosts.len()))]
    pub async fn run_all(&self, hosts: &mut [HostRecord]) -> anyhow::Result<RunSummary> {
        let mut summary = RunSummary::default();

        for host in hosts.iter_mut() {
            if !host.is_pending() {
                debug!(host = %host.hostname(), "already checked, skipping");
                continue;
            }

            let started = Instant::now();
            let (outcome, truncated) = self.check(host.hostname()).await;
            match &outcome {
                Outcome::Found { .. } => summary.found += 1,
                Outcome::NotFound => summary.not_found += 1,
                Outcome::Errored { .. } => summary.errored += 1,
                Outcome::Pending => {}
            }
            info!(
                host = %host.hostname(),
                status = outcome.status_word(),
                elapsed = ?started.elapsed(),
                "checked host"
            );
            host.settle(outcome, truncated)?;
        }

        info!(
            found = summary.found,
            not_found = summary.not_found,
            errored = summary.errored,
            "run complete"
        );
        Ok(summary)
    }

    async fn check(&self, hostname: &str) -> (Outcome, bool) {
        let response = match self.prober.probe(hostname).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    host = %err.host(),
                    stage = err.stage(),
                    reason = %err.reason(),
                    "{err}"
                );
                return (
                    Outcome::Errored {
                        detail: err.to_string(),
                    },
                    false,
                );
            }
        };

        if response.truncated {
            warn!(
                host = %hostname,
                bytes = response.bytes.len(),
                "response filled the read buffer, headers may be incomplete"
            );
        }

        let outcome = match scan(&response.bytes) {
            Some(header) => Outcome::Found { proof: header.line },
            None => Outcome::NotFound,
        };
        (outcome, response.truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeError, ProbeResponse, ReadStopReason};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned responses by hostname and records call order.
    struct ScriptedProber {
        responses: HashMap<&'static str, Result<&'static [u8], ProbeError>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProber {
        fn new(responses: Vec<(&'static str, Result<&'static [u8], ProbeError>)>) -> Self {
            Self {
                responses: responses.into_iter().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn probe(&self, hostname: &str) -> Result<ProbeResponse, ProbeError> {
            self.calls.lock().unwrap().push(hostname.to_string());
            match self.responses.get(hostname) {
                Some(Ok(bytes)) => Ok(ProbeResponse {
                    bytes: bytes.to_vec(),
                    reason: ReadStopReason::HeaderEnd,
                    truncated: false,
                }),
                Some(Err(err)) => Err(err.clone()),
                None => Err(ProbeError::ConnectFailed {
                    host: hostname.to_string(),
                    reason: "unknown host".into(),
                }),
            }
        }
    }

    fn records(names: &[&str]) -> Vec<HostRecord> {
        names.iter().map(|n| HostRecord::new(*n).unwrap()).collect()
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_batch() {
        let prober = ScriptedProber::new(vec![
            (
                "hsts.example",
                Ok(&b"HTTP/1.0 200 OK\r\nStrict-Transport-Security: max-age=31536000\r\n\r\n<html></html>"[..]),
            ),
            (
                "broken.example",
                Err(ProbeError::HandshakeFailed {
                    host: "broken.example".into(),
                    reason: "alert".into(),
                }),
            ),
            (
                "plain.example",
                Ok(&b"HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n\r\n..."[..]),
            ),
        ]);
        let runner = Runner::new(prober);
        let mut hosts = records(&["hsts.example", "broken.example", "missing.example", "plain.example"]);

        let summary = runner.run_all(&mut hosts).await.unwrap();

        assert_eq!(
            summary,
            RunSummary {
                found: 1,
                not_found: 1,
                errored: 2,
            }
        );
        assert_eq!(
            hosts[0].proof(),
            Some("Strict-Transport-Security: max-age=31536000")
        );
        assert_eq!(hosts[1].error_detail(), Some("ssl/tls handshake failed"));
        assert_eq!(
            hosts[2].error_detail(),
            Some("connection could not be established")
        );
        assert_eq!(hosts[2].proof(), None);
        assert_eq!(hosts[3].outcome(), &Outcome::NotFound);
        assert_eq!(hosts[3].proof(), None);
        assert_eq!(
            *runner.prober.calls.lock().unwrap(),
            ["hsts.example", "broken.example", "missing.example", "plain.example"]
        );
    }

    #[tokio::test]
    async fn settled_records_are_not_probed_again() {
        let runner = Runner::new(ScriptedProber::new(vec![(
            "a.example",
            Ok(&b"HTTP/1.0 200 OK\r\n\r\n"[..]),
        )]));
        let mut hosts = records(&["a.example"]);
        runner.run_all(&mut hosts).await.unwrap();
        let summary = runner.run_all(&mut hosts).await.unwrap();

        assert_eq!(summary, RunSummary::default());
        assert_eq!(runner.prober.calls.lock().unwrap().len(), 1);
        assert_eq!(hosts[0].outcome(), &Outcome::NotFound);
    }

    #[tokio::test]
    async fn empty_list_is_a_no_op() {
        let runner = Runner::new(ScriptedProber::new(Vec::new()));
        let summary = runner.run_all(&mut []).await.unwrap();
        assert_eq!(summary, RunSummary::default());
    }
}
