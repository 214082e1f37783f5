use crate::error::Error;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Charset {
    Ascii,
    Utf8,
    Utf8Sig,
    Utf16Le,
    Utf16Be,
    Windows874,
    Windows1250,
    Windows1251,
    Windows1252,
    Windows1253,
    Windows1254,
    Windows1255,
    Windows1256,
    Windows1257,
    Windows1258,
    Iso8859_2,
    Iso8859_4,
    Iso8859_5,
    Iso8859_6,
    Iso8859_7,
    Iso8859_8,
    Iso8859_13,
    Iso8859_15,
    Koi8R,
    Koi8U,
    Ibm866,
    ShiftJis,
    EucJp,
    Iso2022Jp,
    EucKr,
    Gbk,
    Gb18030,
    Big5,
}

impl Charset {
    pub const ALL: [Charset; 33] = [
        Charset::Ascii,
        Charset::Utf8,
        Charset::Utf8Sig,
        Charset::Utf16Le,
        Charset::Utf16Be,
        Charset::Windows874,
        Charset::Windows1250,
        Charset::Windows1251,
        Charset::Windows1252,
        Charset::Windows1253,
        Charset::Windows1254,
        Charset::Windows1255,
        Charset::Windows1256,
        Charset::Windows1257,
        Charset::Windows1258,
        Charset::Iso8859_2,
        Charset::Iso8859_4,
        Charset::Iso8859_5,
        Charset::Iso8859_6,
        Charset::Iso8859_7,
        Charset::Iso8859_8,
        Charset::Iso8859_13,
        Charset::Iso8859_15,
        Charset::Koi8R,
        Charset::Koi8U,
        Charset::Ibm866,
        Charset::ShiftJis,
        Charset::EucJp,
        Charset::Iso2022Jp,
        Charset::EucKr,
        Charset::Gbk,
        Charset::Gb18030,
        Charset::Big5,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Charset::Ascii => "ASCII",
            Charset::Utf8 => "UTF-8",
            Charset::Utf8Sig => "UTF-8-SIG",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Windows874 => "Windows-874",
            Charset::Windows1250 => "Windows-1250",
            Charset::Windows1251 => "Windows-1251",
            Charset::Windows1252 => "Windows-1252",
            Charset::Windows1253 => "Windows-1253",
            Charset::Windows1254 => "Windows-1254",
            Charset::Windows1255 => "Windows-1255",
            Charset::Windows1256 => "Windows-1256",
            Charset::Windows1257 => "Windows-1257",
            Charset::Windows1258 => "Windows-1258",
            Charset::Iso8859_2 => "ISO-8859-2",
            Charset::Iso8859_4 => "ISO-8859-4",
            Charset::Iso8859_5 => "ISO-8859-5",
            Charset::Iso8859_6 => "ISO-8859-6",
            Charset::Iso8859_7 => "ISO-8859-7",
            Charset::Iso8859_8 => "ISO-8859-8",
            Charset::Iso8859_13 => "ISO-8859-13",
            Charset::Iso8859_15 => "ISO-8859-15",
            Charset::Koi8R => "KOI8-R",
            Charset::Koi8U => "KOI8-U",
            Charset::Ibm866 => "IBM866",
            Charset::ShiftJis => "Shift_JIS",
            Charset::EucJp => "EUC-JP",
            Charset::Iso2022Jp => "ISO-2022-JP",
            Charset::EucKr => "EUC-KR",
            Charset::Gbk => "GBK",
            Charset::Gb18030 => "GB18030",
            Charset::Big5 => "Big5",
        }
    }

    // Lower-cased.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Charset::Ascii => &["us-ascii", "ansi-x3.4-1968", "646"],
            Charset::Utf8 => &["utf8"],
            Charset::Utf8Sig => &["utf8-sig", "utf-8-bom", "utf8-bom"],
            Charset::Utf16Le => &["utf16le", "utf-16"],
            Charset::Utf16Be => &["utf16be"],
            Charset::Windows874 => &["cp874", "tis-620"],
            Charset::Windows1250 => &["cp1250"],
            Charset::Windows1251 => &["cp1251"],
            Charset::Windows1252 => &["cp1252"],
            Charset::Windows1253 => &["cp1253"],
            Charset::Windows1254 => &["cp1254"],
            Charset::Windows1255 => &["cp1255"],
            Charset::Windows1256 => &["cp1256"],
            Charset::Windows1257 => &["cp1257"],
            Charset::Windows1258 => &["cp1258"],
            Charset::Iso8859_2 => &["latin2", "iso8859-2"],
            Charset::Iso8859_4 => &["latin4", "iso8859-4"],
            Charset::Iso8859_5 => &["iso8859-5", "cyrillic"],
            Charset::Iso8859_6 => &["iso8859-6", "arabic"],
            Charset::Iso8859_7 => &["iso8859-7", "greek"],
            Charset::Iso8859_8 => &["iso8859-8", "hebrew"],
            Charset::Iso8859_13 => &["iso8859-13", "latin7"],
            Charset::Iso8859_15 => &["iso8859-15", "latin9"],
            Charset::Koi8R => &["koi8r", "koi8"],
            Charset::Koi8U => &["koi8u"],
            Charset::Ibm866 => &["cp866"],
            Charset::ShiftJis => &["shift-jis", "sjis", "cp932", "windows-31j"],
            Charset::EucJp => &["eucjp"],
            Charset::Iso2022Jp => &["iso2022jp", "csiso2022jp"],
            Charset::EucKr => &["euckr", "cp949", "windows-949"],
            Charset::Gbk => &["cp936", "gb2312"],
            Charset::Gb18030 => &[],
            Charset::Big5 => &["big5-hkscs", "cp950"],
        }
    }

    pub fn encoding(self) -> &'static Encoding {
        match self {
            Charset::Ascii | Charset::Windows1252 => encoding_rs::WINDOWS_1252,
            Charset::Utf8 | Charset::Utf8Sig => encoding_rs::UTF_8,
            Charset::Utf16Le => encoding_rs::UTF_16LE,
            Charset::Utf16Be => encoding_rs::UTF_16BE,
            Charset::Windows874 => encoding_rs::WINDOWS_874,
            Charset::Windows1250 => encoding_rs::WINDOWS_1250,
            Charset::Windows1251 => encoding_rs::WINDOWS_1251,
            Charset::Windows1253 => encoding_rs::WINDOWS_1253,
            Charset::Windows1254 => encoding_rs::WINDOWS_1254,
            Charset::Windows1255 => encoding_rs::WINDOWS_1255,
            Charset::Windows1256 => encoding_rs::WINDOWS_1256,
            Charset::Windows1257 => encoding_rs::WINDOWS_1257,
            Charset::Windows1258 => encoding_rs::WINDOWS_1258,
            Charset::Iso8859_2 => encoding_rs::ISO_8859_2,
            Charset::Iso8859_4 => encoding_rs::ISO_8859_4,
            Charset::Iso8859_5 => encoding_rs::ISO_8859_5,
            Charset::Iso8859_6 => encoding_rs::ISO_8859_6,
            Charset::Iso8859_7 => encoding_rs::ISO_8859_7,
            Charset::Iso8859_8 => encoding_rs::ISO_8859_8,
            Charset::Iso8859_13 => encoding_rs::ISO_8859_13,
            Charset::Iso8859_15 => encoding_rs::ISO_8859_15,
            Charset::Koi8R => encoding_rs::KOI8_R,
            Charset::Koi8U => encoding_rs::KOI8_U,
            Charset::Ibm866 => encoding_rs::IBM866,
            Charset::ShiftJis => encoding_rs::SHIFT_JIS,
            Charset::EucJp => encoding_rs::EUC_JP,
            Charset::Iso2022Jp => encoding_rs::ISO_2022_JP,
            Charset::EucKr => encoding_rs::EUC_KR,
            Charset::Gbk => encoding_rs::GBK,
            Charset::Gb18030 => encoding_rs::GB18030,
            Charset::Big5 => encoding_rs::BIG5,
        }
    }

    pub fn bom(self) -> &'static [u8] {
        match self {
            Charset::Utf8Sig => b"\xEF\xBB\xBF",
            Charset::Utf16Le => b"\xFF\xFE",
            Charset::Utf16Be => b"\xFE\xFF",
            _ => b"",
        }
    }

    pub fn from_encoding(encoding: &'static Encoding) -> Option<Charset> {
        Charset::ALL
            .iter()
            .copied()
            .filter(|c| !matches!(c, Charset::Ascii | Charset::Utf8Sig))
            .find(|c| c.encoding() == encoding)
    }

    pub fn sniff_bom(bytes: &[u8]) -> Option<Charset> {
        let (encoding, _) = Encoding::for_bom(bytes)?;
        if encoding == encoding_rs::UTF_8 {
            Some(Charset::Utf8Sig)
        } else if encoding == encoding_rs::UTF_16LE {
            Some(Charset::Utf16Le)
        } else if encoding == encoding_rs::UTF_16BE {
            Some(Charset::Utf16Be)
        } else {
            None
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Charset {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase().replace('_', "-");
        Charset::ALL
            .iter()
            .copied()
            .find(|c| {
                c.label().to_ascii_lowercase().replace('_', "-") == wanted
                    || c.aliases().iter().any(|a| *a == wanted)
            })
            .ok_or_else(|| Error::UnknownEncoding {
                label: raw.to_string(),
            })
    }
}

impl TryFrom<String> for Charset {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Charset> for String {
    fn from(c: Charset) -> Self {
        c.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_back() {
        for c in Charset::ALL {
            assert_eq!(c.label().parse::<Charset>().unwrap(), c);
        }
    }

    #[test]
    fn aliases_are_case_insensitive() {
        assert_eq!("cp1252".parse::<Charset>().unwrap(), Charset::Windows1252);
        assert_eq!("UTF8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("utf_8_sig".parse::<Charset>().unwrap(), Charset::Utf8Sig);
        assert_eq!("shift_jis".parse::<Charset>().unwrap(), Charset::ShiftJis);
        assert_eq!(" us-ascii ".parse::<Charset>().unwrap(), Charset::Ascii);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "klingon".parse::<Charset>().unwrap_err();
        assert_eq!(err.kind(), "UnknownEncoding");
        assert!("iso-8859-1".parse::<Charset>().is_err());
    }

    #[test]
    fn bom_sniffing() {
        assert_eq!(Charset::sniff_bom(b"\xEF\xBB\xBFabc"), Some(Charset::Utf8Sig));
        assert_eq!(Charset::sniff_bom(b"\xFF\xFEa\x00"), Some(Charset::Utf16Le));
        assert_eq!(Charset::sniff_bom(b"\xFE\xFF\x00a"), Some(Charset::Utf16Be));
        assert_eq!(Charset::sniff_bom(b"abc"), None);
    }

    #[test]
    fn codec_round_trip_prefers_plain_labels() {
        assert_eq!(
            Charset::from_encoding(encoding_rs::UTF_8),
            Some(Charset::Utf8)
        );
        assert_eq!(
            Charset::from_encoding(encoding_rs::WINDOWS_1252),
            Some(Charset::Windows1252)
        );
        assert_eq!(Charset::from_encoding(encoding_rs::REPLACEMENT), None);
    }
}
