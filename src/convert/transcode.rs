use crate::{charset::Charset, config::UnmappablePolicy, error::ConversionCause};
use encoding_rs::{CoderResult, Decoder, DecoderResult, Encoder, EncoderResult};
use std::io::{self, BufRead, Read, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscodeStats {
    pub lines: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub dropped: u64,
}

/// Streams `reader` into `writer`, one line (at most `max_chunk` bytes) at a
/// time. A source BOM is stripped; the target's BOM is written first.
pub fn transcode<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    source: Charset,
    target: Charset,
    policy: UnmappablePolicy,
    max_chunk: usize,
) -> Result<TranscodeStats, ConversionCause> {
    let mut stats = TranscodeStats::default();
    let mut decode = SourceDecoder::new(source, policy);
    let mut encode = TargetEncoder::new(target, policy);

    let bom = target.bom();
    writer.write_all(bom)?;
    stats.bytes_written += bom.len() as u64;

    let mut chunk = Vec::new();
    let mut text = String::new();
    let mut out = Vec::new();
    let mut ends_with_newline = true;
    loop {
        chunk.clear();
        let n = (&mut reader)
            .take(max_chunk.max(1) as u64)
            .read_until(b'\n', &mut chunk)?;
        let last = n == 0;
        stats.bytes_read += n as u64;
        // A chunk may start with the tail of the previous line's newline
        // (UTF-16), so this is only the line of the chunk's first char.
        let line = stats.lines + 1;

        text.clear();
        decode.decode(&chunk, &mut text, last, line)?;

        out.clear();
        stats.dropped += encode.encode(&text, &mut out, last, line)?;
        writer.write_all(&out)?;
        stats.bytes_written += out.len() as u64;

        if !text.is_empty() {
            stats.lines += text.matches('\n').count() as u64;
            ends_with_newline = text.ends_with('\n');
        }
        if last {
            break;
        }
    }
    if !ends_with_newline {
        stats.lines += 1;
    }

    writer.flush()?;
    Ok(stats)
}

enum SourceDecoder {
    Ascii { policy: UnmappablePolicy },
    Codec {
        decoder: Decoder,
        charset: Charset,
        policy: UnmappablePolicy,
    },
}

impl SourceDecoder {
    fn new(charset: Charset, policy: UnmappablePolicy) -> Self {
        match charset {
            Charset::Ascii => SourceDecoder::Ascii { policy },
            _ => SourceDecoder::Codec {
                decoder: charset.encoding().new_decoder_with_bom_removal(),
                charset,
                policy,
            },
        }
    }

    fn decode(
        &mut self,
        mut src: &[u8],
        dst: &mut String,
        last: bool,
        line: u64,
    ) -> Result<(), ConversionCause> {
        match self {
            SourceDecoder::Ascii { policy } => {
                for &b in src {
                    if b.is_ascii() {
                        dst.push(b as char);
                    } else if *policy == UnmappablePolicy::Drop {
                        dst.push(char::REPLACEMENT_CHARACTER);
                    } else {
                        return Err(ConversionCause::Malformed {
                            encoding: Charset::Ascii,
                            line: line_at(line, dst),
                        });
                    }
                }
                Ok(())
            }
            SourceDecoder::Codec {
                decoder,
                charset,
                policy: UnmappablePolicy::Fail,
            } => loop {
                let needed = decoder
                    .max_utf8_buffer_length_without_replacement(src.len())
                    .ok_or_else(overflow)?;
                dst.reserve(needed);
                let (result, read) = decoder.decode_to_string_without_replacement(src, dst, last);
                src = &src[read..];
                match result {
                    DecoderResult::InputEmpty => return Ok(()),
                    DecoderResult::OutputFull => continue,
                    DecoderResult::Malformed(_, _) => {
                        return Err(ConversionCause::Malformed {
                            encoding: *charset,
                            line: line_at(line, dst),
                        });
                    }
                }
            },
            SourceDecoder::Codec {
                decoder,
                policy: UnmappablePolicy::Drop,
                ..
            } => loop {
                let needed = decoder
                    .max_utf8_buffer_length(src.len())
                    .ok_or_else(overflow)?;
                dst.reserve(needed);
                let (result, read, _) = decoder.decode_to_string(src, dst, last);
                src = &src[read..];
                match result {
                    CoderResult::InputEmpty => return Ok(()),
                    CoderResult::OutputFull => continue,
                }
            },
        }
    }
}

enum EncoderKind {
    Ascii,
    Utf8,
    Utf16 { big_endian: bool },
    Codec(Encoder),
}

struct TargetEncoder {
    kind: EncoderKind,
    charset: Charset,
    policy: UnmappablePolicy,
}

impl TargetEncoder {
    fn new(charset: Charset, policy: UnmappablePolicy) -> Self {
        let kind = match charset {
            Charset::Ascii => EncoderKind::Ascii,
            Charset::Utf8 | Charset::Utf8Sig => EncoderKind::Utf8,
            Charset::Utf16Le => EncoderKind::Utf16 { big_endian: false },
            Charset::Utf16Be => EncoderKind::Utf16 { big_endian: true },
            _ => EncoderKind::Codec(charset.encoding().new_encoder()),
        };
        Self {
            kind,
            charset,
            policy,
        }
    }

    fn encode(
        &mut self,
        text: &str,
        dst: &mut Vec<u8>,
        last: bool,
        line: u64,
    ) -> Result<u64, ConversionCause> {
        let (charset, policy) = (self.charset, self.policy);
        let unmappable = |ch: char, before: &str| ConversionCause::Unmappable {
            ch,
            encoding: charset,
            line: line_at(line, before),
        };
        let mut src = text;
        let mut dropped = 0;

        match &mut self.kind {
            EncoderKind::Utf8 => dst.extend_from_slice(text.as_bytes()),
            EncoderKind::Utf16 { big_endian } => {
                for unit in text.encode_utf16() {
                    let bytes = if *big_endian {
                        unit.to_be_bytes()
                    } else {
                        unit.to_le_bytes()
                    };
                    dst.extend_from_slice(&bytes);
                }
            }
            EncoderKind::Ascii => {
                for (at, ch) in text.char_indices() {
                    if ch.is_ascii() {
                        dst.push(ch as u8);
                    } else if policy == UnmappablePolicy::Drop {
                        dropped += 1;
                    } else {
                        return Err(unmappable(ch, &text[..at]));
                    }
                }
            }
            EncoderKind::Codec(encoder) => loop {
                let needed = encoder
                    .max_buffer_length_from_utf8_without_replacement(src.len())
                    .ok_or_else(overflow)?;
                dst.reserve(needed);
                let (result, read) =
                    encoder.encode_from_utf8_to_vec_without_replacement(src, dst, last);
                src = &src[read..];
                match result {
                    EncoderResult::InputEmpty => break,
                    EncoderResult::OutputFull => continue,
                    EncoderResult::Unmappable(ch) => {
                        if policy == UnmappablePolicy::Fail {
                            let before = &text[..text.len() - src.len()];
                            return Err(unmappable(ch, before));
                        }
                        dropped += 1;
                    }
                }
            },
        }
        Ok(dropped)
    }
}

fn line_at(start: u64, before: &str) -> u64 {
    start + before.matches('\n').count() as u64
}

fn overflow() -> io::Error {
    io::Error::other("buffer length overflow")
}
