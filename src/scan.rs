//! Header scanning over a raw HTTP response.
//!
//! Lines end at `\n` and every `\r` is dropped, so CRLF and bare LF
//! responses scan the same way. The first empty line ends the headers;
//! nothing after it is looked at.

pub const HSTS_PREFIX: &[u8] = b"Strict-Transport-Security:";
pub const MAX_LINE_LEN: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    /// The matched header line, verbatim.
    pub line: String,
}

/// Return the first `Strict-Transport-Security` header line, if any.
pub fn scan(response: &[u8]) -> Option<HeaderMatch> {
    let mut line = LineBuffer::new(MAX_LINE_LEN);
    let mut at_line_start = false;

    for &byte in response {
        match byte {
            0 => break,
            b'\r' => continue,
            b'\n' => {
                if at_line_start {
                    return None;
                }
                at_line_start = true;
                if is_hsts_header(line.as_bytes()) {
                    return Some(HeaderMatch {
                        line: String::from_utf8_lossy(line.as_bytes()).into_owned(),
                    });
                }
                line.clear();
            }
            _ => {
                at_line_start = false;
                line.push(byte);
            }
        }
    }

    None
}

fn is_hsts_header(line: &[u8]) -> bool {
    line.get(..HSTS_PREFIX.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(HSTS_PREFIX))
        .unwrap_or(false)
}

/// Fixed-capacity line accumulator; bytes past capacity are dropped.
struct LineBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl LineBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, byte: u8) {
        if self.bytes.len() < self.capacity {
            self.bytes.push(byte);
        }
    }

    fn clear(&mut self) {
        self.bytes.clear();
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
