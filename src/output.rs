use crate::model::{HostRecord, OutputConfig, OutputFormat};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonRecord<'a> {
    hostname: &'a str,
    found: bool,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    proof: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    truncated: bool,
}

/// Write one line per host, in the order given.
pub fn write_results<W: Write>(
    writer: &mut W,
    cfg: &OutputConfig,
    hosts: &[HostRecord],
) -> anyhow::Result<()> {
    for host in hosts {
        match cfg.format {
            OutputFormat::Plain => writeln!(writer, "{}", plain_line(host))?,
            OutputFormat::Jsonl => {
                let line = serde_json::to_string(&json_record(host))?;
                writeln!(writer, "{line}")?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// `<hostname> <0|1> <hsts|error|none> [<detail>]`
pub fn plain_line(host: &HostRecord) -> String {
    let detail = host.proof().or(host.error_detail()).unwrap_or_default();
    format!(
        "{} {} {} [{}]",
        host.hostname(),
        u8::from(host.found()),
        host.outcome().status_word(),
        detail
    )
}

fn json_record(host: &HostRecord) -> JsonRecord<'_> {
    JsonRecord {
        hostname: host.hostname(),
        found: host.found(),
        status: host.outcome().status_word(),
        proof: host.proof(),
        error: host.error_detail(),
        truncated: host.truncated(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Outcome;

    fn settled(name: &str, outcome: Outcome) -> HostRecord {
        let mut record = HostRecord::new(name).unwrap();
        record.settle(outcome, false).unwrap();
        record
    }

    fn render(format: OutputFormat, hosts: &[HostRecord]) -> String {
        let mut out = Vec::new();
        write_results(&mut out, &OutputConfig { format }, hosts).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn plain_lines_cover_each_status() {
        let hosts = vec![
            settled(
                "example.com",
                Outcome::Found {
                    proof: "Strict-Transport-Security: max-age=31536000".into(),
                },
            ),
            settled("example.org", Outcome::NotFound),
            settled(
                "example.net",
                Outcome::Errored {
                    detail: "connection could not be established".into(),
                },
            ),
        ];
        assert_eq!(
            render(OutputFormat::Plain, &hosts),
            "example.com 1 hsts [Strict-Transport-Security: max-age=31536000]\n\
             example.org 0 none []\n\
             example.net 0 error [connection could not be established]\n"
        );
    }

    #[test]
    fn jsonl_has_one_object_per_host() {
        let hosts = vec![
            settled(
                "example.com",
                Outcome::Found {
                    proof: "strict-transport-security: max-age=1".into(),
                },
            ),
            settled("example.org", Outcome::NotFound),
        ];
        let text = render(OutputFormat::Jsonl, &hosts);
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["status"], "hsts");
        assert_eq!(lines[0]["proof"], "strict-transport-security: max-age=1");
        assert_eq!(lines[0]["found"], true);
        assert!(lines[1].get("proof").is_none());
        assert_eq!(lines[1]["status"], "none");
        assert_eq!(lines[1]["truncated"], false);
    }

    #[test]
    fn empty_list_writes_nothing() {
        assert_eq!(render(OutputFormat::Plain, &[]), "");
    }
}
