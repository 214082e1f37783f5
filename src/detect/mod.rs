pub mod chardet;
pub mod types;

use crate::{
    config::Config,
    error::Result,
    sample::{self, SamplePayload, SampleStats},
};
use std::path::Path;
use tracing::{debug, info};

pub use chardet::ChardetClassifier;
pub use types::{Detection, DetectionReport, EncodingLabel};

/// Opaque heuristic that names the encoding of a byte sample.
pub trait Classifier {
    fn classify(&self, sample: &SamplePayload) -> Option<EncodingLabel>;
}

pub struct EncodingDetector<C: Classifier = ChardetClassifier> {
    classifier: C,
    max_input_file_bytes: u64,
    max_sample_bytes: u64,
}

impl EncodingDetector<ChardetClassifier> {
    pub fn new(cfg: &Config) -> Self {
        Self::with_classifier(cfg, ChardetClassifier::new(cfg))
    }
}

impl<C: Classifier> EncodingDetector<C> {
    pub fn with_classifier(cfg: &Config, classifier: C) -> Self {
        Self {
            classifier,
            max_input_file_bytes: cfg.limits.max_input_file_bytes,
            max_sample_bytes: cfg.detection.max_sample_bytes,
        }
    }

    pub fn detect(&self, path: &Path, sample_lines: usize) -> Result<Detection> {
        Ok(self.probe(path, sample_lines)?.detection)
    }

    pub fn probe(&self, path: &Path, sample_lines: usize) -> Result<DetectionReport> {
        let file_bytes = sample::check_input(path, self.max_input_file_bytes)?;
        let sample = sample::read_sample(path, file_bytes, sample_lines, self.max_sample_bytes)?;
        debug!(
            "sampled {} lines / {} bytes of {} (eof={})",
            sample.lines,
            sample.bytes.len(),
            path.display(),
            sample.reached_eof
        );

        let detection = match self.classifier.classify(&sample) {
            Some(label) => Detection::Detected(label),
            None => Detection::Undetectable,
        };
        match &detection {
            Detection::Detected(label) => info!(
                "detected {} confidence={:.2} path={}",
                label.charset,
                label.confidence,
                path.display()
            ),
            Detection::Undetectable => info!("undetectable path={}", path.display()),
        }

        Ok(DetectionReport {
            input: SampleStats {
                path: path.display().to_string(),
                file_bytes,
                sampled_lines: sample.lines,
                sampled_bytes: sample.bytes.len(),
                reached_eof: sample.reached_eof,
            },
            detection,
        })
    }
}
