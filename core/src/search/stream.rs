//! Incremental parsing of the search tool's JSON-lines output
//!
//! Output arrives in chunks that have nothing to do with record boundaries.
//! [`MatchLineBuffer`] keeps the unterminated tail of each chunk and only
//! parses lines once their newline has arrived.

use super::types::{MatchRecord, Submatch};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;

/// Carry-over buffer turning raw stdout chunks into match records
#[derive(Debug, Default)]
pub struct MatchLineBuffer {
    carry: Vec<u8>,
    dropped_lines: usize,
}

impl MatchLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the match records it completed
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<MatchRecord> {
        self.carry.extend_from_slice(chunk);

        let Some(last_newline) = self.carry.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };

        let rest = self.carry.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.carry, rest);

        complete
            .split(|b| *b == b'\n')
            .filter_map(|line| self.parse_line(line))
            .collect()
    }

    /// Parse whatever is still buffered once the stream has ended
    ///
    /// A final record without a trailing newline still counts; an unfinished
    /// fragment is dropped silently.
    pub fn finish(mut self) -> Option<MatchRecord> {
        let tail = std::mem::take(&mut self.carry);
        self.parse_line(&tail)
    }

    /// Bytes waiting for the rest of their line
    pub fn pending_len(&self) -> usize {
        self.carry.len()
    }

    /// Complete lines that could not be parsed so far
    pub fn dropped_lines(&self) -> usize {
        self.dropped_lines
    }

    fn parse_line(&mut self, line: &[u8]) -> Option<MatchRecord> {
        let line = line.trim_ascii();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_slice::<Value>(line) {
            Ok(payload) => match_record_from_payload(payload),
            Err(e) => {
                self.dropped_lines += 1;
                tracing::debug!("Dropping malformed search output line: {}", e);
                None
            }
        }
    }
}

/// Build a [`MatchRecord`] if `payload` is a `"match"` message
pub fn match_record_from_payload(payload: Value) -> Option<MatchRecord> {
    if payload.get("type").and_then(Value::as_str) != Some("match") {
        return None;
    }

    let data = payload.get("data")?;
    let data: MatchData = match serde_json::from_value(data.clone()) {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!("Match message with unexpected shape: {}", e);
            return None;
        }
    };

    let matched_text = data
        .lines
        .into_text()
        .trim_end_matches(['\n', '\r'])
        .to_string();

    Some(MatchRecord {
        file_path: data.path.into_text(),
        line_number: data.line_number,
        matched_text,
        submatches: data
            .submatches
            .into_iter()
            .map(|s| Submatch {
                text: s.matched.into_text(),
                start: s.start,
                end: s.end,
            })
            .collect(),
        raw_payload: payload,
    })
}

#[derive(Debug, Deserialize)]
struct MatchData {
    path: ArbitraryData,
    lines: ArbitraryData,
    line_number: Option<u64>,
    #[serde(default)]
    submatches: Vec<RawSubmatch>,
}

#[derive(Debug, Deserialize)]
struct RawSubmatch {
    #[serde(rename = "match")]
    matched: ArbitraryData,
    start: usize,
    end: usize,
}

/// Text is sent verbatim when it is valid UTF-8 and base64-encoded otherwise
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArbitraryData {
    Text { text: String },
    Bytes { bytes: String },
}

impl ArbitraryData {
    fn into_text(self) -> String {
        match self {
            ArbitraryData::Text { text } => text,
            ArbitraryData::Bytes { bytes } => match STANDARD.decode(bytes.as_bytes()) {
                Ok(raw) => String::from_utf8_lossy(&raw).into_owned(),
                Err(_) => bytes,
            },
        }
    }
}
