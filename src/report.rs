use crate::{charset::Charset, convert::TranscodeStats, error::Error, util::now_rfc3339};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub path: String,
    pub source: Charset,
    pub target: Charset,
    pub lines: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub dropped_chars: u64,
    pub finished: String,
}

impl ConversionOutcome {
    pub fn new(path: &Path, source: Charset, target: Charset, stats: &TranscodeStats) -> Self {
        Self {
            path: path.display().to_string(),
            source,
            target,
            lines: stats.lines,
            bytes_read: stats.bytes_read,
            bytes_written: stats.bytes_written,
            dropped_chars: stats.dropped,
            finished: now_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub status: String,
    pub kind: String,
    pub message: String,
    pub fatal: bool,
}

impl From<&Error> for FailureReport {
    fn from(err: &Error) -> Self {
        Self {
            status: "failed".into(),
            kind: err.kind().into(),
            message: err.to_string(),
            fatal: err.is_fatal(),
        }
    }
}
