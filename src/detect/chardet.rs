use super::{Classifier, EncodingLabel};
use crate::{charset::Charset, config::Config, sample::SamplePayload};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::debug;

const LEGACY_GUESS_CEILING: f32 = 0.9;

#[derive(Debug, Clone)]
pub struct ChardetClassifier {
    min_confidence: f32,
    max_control_ratio: f32,
}

impl ChardetClassifier {
    pub fn new(cfg: &Config) -> Self {
        Self {
            min_confidence: cfg.detection.min_confidence,
            max_control_ratio: cfg.detection.max_control_ratio,
        }
    }
}

impl Classifier for ChardetClassifier {
    fn classify(&self, sample: &SamplePayload) -> Option<EncodingLabel> {
        let bytes = sample.bytes.as_slice();
        if bytes.is_empty() {
            return None;
        }

        // chardetng does not look at byte order marks.
        if let Some(charset) = Charset::sniff_bom(bytes) {
            return Some(EncodingLabel {
                charset,
                confidence: 1.0,
            });
        }

        if looks_binary(bytes, self.max_control_ratio) {
            debug!("sample rejected as binary");
            return None;
        }

        if bytes.is_ascii() {
            return Some(EncodingLabel {
                charset: Charset::Ascii,
                confidence: 1.0,
            });
        }

        if is_utf8(bytes, sample.reached_eof) {
            return Some(EncodingLabel {
                charset: Charset::Utf8,
                confidence: 0.99,
            });
        }

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, sample.reached_eof);
        let encoding = detector.guess(None, false);
        let Some(charset) = Charset::from_encoding(encoding) else {
            debug!("chardetng guessed {} which is not supported", encoding.name());
            return None;
        };

        let confidence = plausibility(encoding, bytes) * LEGACY_GUESS_CEILING;
        debug!("chardetng guessed {charset} plausibility={confidence:.3}");
        if confidence < self.min_confidence {
            return None;
        }
        Some(EncodingLabel {
            charset,
            confidence,
        })
    }
}

fn looks_binary(bytes: &[u8], max_control_ratio: f32) -> bool {
    if bytes.contains(&0) {
        return true;
    }
    let controls = bytes
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0C | 0x1B))
        .count();
    controls as f32 / bytes.len() as f32 > max_control_ratio
}

// Tolerates a sequence cut off by the sample boundary.
fn is_utf8(bytes: &[u8], reached_eof: bool) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(_) => true,
        Err(e) => !reached_eof && e.error_len().is_none(),
    }
}

fn plausibility(encoding: &'static Encoding, bytes: &[u8]) -> f32 {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    let mut total = 0usize;
    let mut suspicious = 0usize;
    for ch in text.chars() {
        total += 1;
        if ch == char::REPLACEMENT_CHARACTER
            || (ch.is_control() && !matches!(ch, '\t' | '\n' | '\r' | '\u{c}' | '\u{1b}'))
        {
            suspicious += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    1.0 - suspicious as f32 / total as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(bytes: &[u8]) -> Option<EncodingLabel> {
        let classifier = ChardetClassifier::new(&Config::default());
        classifier.classify(&SamplePayload {
            bytes: bytes.to_vec(),
            lines: 1,
            reached_eof: true,
        })
    }

    #[test]
    fn empty_sample_is_undetectable() {
        assert!(classify(b"").is_none());
    }

    #[test]
    fn nul_bytes_mean_binary() {
        assert!(classify(b"\x7fELF\x02\x01\x01\x00\x00\x00").is_none());
    }

    #[test]
    fn truncated_utf8_tail_is_tolerated_before_eof() {
        // "é" is C3 A9; the sample stops after C3.
        assert!(is_utf8(b"caf\xC3", false));
        assert!(!is_utf8(b"caf\xC3", true));
        assert!(!is_utf8(b"caf\xE9 au lait", false));
    }

    #[test]
    fn shift_jis_sample() {
        let text = "こんにちは、元気ですか？今日はいい天気ですね。\n".repeat(8);
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode(&text);
        let label = classify(&bytes).expect("detected");
        assert_eq!(label.charset, Charset::ShiftJis);
        assert!(label.confidence <= LEGACY_GUESS_CEILING);
    }

    #[test]
    fn plausibility_penalizes_controls() {
        assert_eq!(plausibility(encoding_rs::WINDOWS_1252, b"plain"), 1.0);
        assert!(plausibility(encoding_rs::WINDOWS_1252, b"a\x01\x02\x03") < 0.5);
    }
}
