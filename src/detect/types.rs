use crate::{charset::Charset, sample::SampleStats};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodingLabel {
    pub charset: Charset,
    pub confidence: f32,
}

/// Outcome of detection. `Undetectable` is an answer, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Detection {
    Detected(EncodingLabel),
    Undetectable,
}

impl Detection {
    pub fn label(&self) -> Option<EncodingLabel> {
        match self {
            Detection::Detected(label) => Some(*label),
            Detection::Undetectable => None,
        }
    }

    pub fn charset(&self) -> Option<Charset> {
        self.label().map(|l| l.charset)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub input: SampleStats,
    pub detection: Detection,
}
