use std::path::{Path, PathBuf};
use subrecode::{Charset, Detection, EncodingDetector, config::Config};

/// A few SRT cues with Windows-1252 curly quotes, an apostrophe and "é".
fn cp1252_subtitle() -> Vec<u8> {
    let mut out = Vec::new();
    for i in 1..=6 {
        out.extend_from_slice(format!("{i}\r\n00:00:0{i},000 --> 00:00:0{i},900\r\n").as_bytes());
        out.extend_from_slice(
            b"\x93Hello there,\x94 she said. \x93It\x92s a fine caf\xe9 today.\x94\r\n\r\n",
        );
    }
    out
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn ascii_file_is_ascii_or_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let text: String = (1..=10).map(|i| format!("line {i} of plain text\n")).collect();
    let path = write(dir.path(), "plain.srt", text.as_bytes());

    let detector = EncodingDetector::new(&Config::default());
    let charset = detector.detect(&path, 100).unwrap().charset();
    assert!(matches!(charset, Some(Charset::Ascii | Charset::Utf8)));
}

#[test]
fn smart_quotes_are_windows_1252() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "quotes.srt", &cp1252_subtitle());

    let detector = EncodingDetector::new(&Config::default());
    let label = detector.detect(&path, 100).unwrap().label().expect("detected");
    assert_eq!(label.charset, Charset::Windows1252);
    assert!(label.confidence > 0.0 && label.confidence <= 1.0);
}

#[test]
fn utf8_and_bom_files() {
    let dir = tempfile::tempdir().unwrap();
    let utf8 = write(dir.path(), "u.srt", "Grüße aus Köln\n„Zitat“\n".as_bytes());
    let sig = write(dir.path(), "s.srt", b"\xEF\xBB\xBFplain after bom\n");
    let le = write(dir.path(), "le.srt", b"\xFF\xFEh\x00i\x00\n\x00");

    let detector = EncodingDetector::new(&Config::default());
    assert_eq!(detector.detect(&utf8, 100).unwrap().charset(), Some(Charset::Utf8));
    assert_eq!(detector.detect(&sig, 100).unwrap().charset(), Some(Charset::Utf8Sig));
    assert_eq!(detector.detect(&le, 100).unwrap().charset(), Some(Charset::Utf16Le));
}

#[test]
fn binary_and_empty_files_are_undetectable() {
    let dir = tempfile::tempdir().unwrap();
    let bin = write(
        dir.path(),
        "a.bin",
        &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D],
    );
    let empty = write(dir.path(), "empty.srt", b"");

    let detector = EncodingDetector::new(&Config::default());
    assert_eq!(detector.detect(&bin, 100).unwrap(), Detection::Undetectable);
    assert_eq!(detector.detect(&empty, 100).unwrap(), Detection::Undetectable);
}

#[test]
fn sample_size_bounds_what_is_seen() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes: Vec<u8> = (1..=30)
        .flat_map(|i| format!("plain line {i}\n").into_bytes())
        .collect();
    bytes.extend_from_slice(&cp1252_subtitle());
    let path = write(dir.path(), "late.srt", &bytes);

    let detector = EncodingDetector::new(&Config::default());
    assert_eq!(detector.detect(&path, 20).unwrap().charset(), Some(Charset::Ascii));
    assert_eq!(
        detector.detect(&path, 100).unwrap().charset(),
        Some(Charset::Windows1252)
    );

    let report = detector.probe(&path, 20).unwrap();
    assert_eq!(report.input.sampled_lines, 20);
    assert!(!report.input.reached_eof);
}

#[test]
fn missing_file_and_size_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = Config::default();
    cfg.limits.max_input_file_bytes = 16;
    let detector = EncodingDetector::new(&cfg);

    let err = detector.detect(&dir.path().join("nope.srt"), 20).unwrap_err();
    assert_eq!(err.kind(), "FileNotFound");

    let big = write(dir.path(), "big.srt", &[b'a'; 17]);
    let err = detector.detect(&big, 20).unwrap_err();
    assert_eq!(err.kind(), "FileTooLarge");

    let ok = write(dir.path(), "ok.srt", &[b'a'; 16]);
    assert!(detector.detect(&ok, 20).is_ok());
}

#[test]
fn concurrent_detection_on_different_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.srt", b"just ascii\n");
    let b = write(dir.path(), "b.srt", &cp1252_subtitle());
    let detector = EncodingDetector::new(&Config::default());

    std::thread::scope(|s| {
        let ha = s.spawn(|| detector.detect(&a, 100).unwrap().charset());
        let hb = s.spawn(|| detector.detect(&b, 100).unwrap().charset());
        assert_eq!(ha.join().unwrap(), Some(Charset::Ascii));
        assert_eq!(hb.join().unwrap(), Some(Charset::Windows1252));
    });
}
