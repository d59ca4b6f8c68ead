//! Loads an NDJSON log into an indexed, rewindable line buffer. The parser's
//! whole rewind trick depends on random access by index rather than a
//! one-shot iterator, so unlike a typical line-at-a-time reader this one
//! materializes the full file up front.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ParseError;

#[derive(Debug, Clone, Deserialize)]
struct RawLine {
    time: DateTime<Utc>,
    log: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub time: DateTime<Utc>,
    pub log: String,
}

#[derive(Debug, Default)]
pub struct LineReader {
    lines: Vec<LogLine>,
}

impl LineReader {
    pub fn from_ndjson(source: &str) -> Result<Self, ParseError> {
        let mut lines = Vec::new();

        for (idx, raw) in source.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            let parsed: RawLine =
                serde_json::from_str(trimmed).map_err(|_| ParseError::MalformedLine(idx))?;

            lines.push(LogLine {
                time: parsed.time,
                log: parsed.log,
            });
        }

        Ok(LineReader { lines })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LogLine> {
        self.lines.get(index)
    }

    pub fn as_slice(&self) -> &[LogLine] {
        &self.lines
    }
}
