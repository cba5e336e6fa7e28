use crate::model::HostRecord;
use anyhow::Context;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Read the host list at `path`, one hostname per line.
///
/// Lines are raw bytes; anything that is not UTF-8 is decoded lossily and
/// left to fail at connect time like any other bad name.
pub async fn load_hostlist(path: &Path) -> anyhow::Result<Vec<HostRecord>> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("cannot open host list {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hosts = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .await
            .with_context(|| format!("cannot read host list {}", path.display()))?;
        if n == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if let Some(record) = parse_line(&line) {
            hosts.push(record);
        }
    }
    tracing::debug!(path = %path.display(), hosts = hosts.len(), "loaded host list");
    Ok(hosts)
}

pub fn parse_hostlist(text: &str) -> Vec<HostRecord> {
    text.lines().filter_map(parse_line).collect()
}

// Only line endings are stripped; names are not validated, a bad one just
// fails to connect. Whitespace-only lines count as blank.
fn parse_line(line: &str) -> Option<HostRecord> {
    let name = line.trim_end_matches(['\r', '\n']);
    if name.trim().is_empty() {
        return None;
    }
    HostRecord::new(name).ok()
}
