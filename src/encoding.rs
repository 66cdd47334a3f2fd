//! Character set detection for CSV sources.
//!
//! Replayable spreadsheets exported as CSV must be UTF-8 (or plain ASCII).
//! Spreadsheet tools frequently save CSV as Latin-1, Windows-1252 or UTF-16
//! instead, which silently corrupts diacritics downstream. This module sniffs
//! the raw bytes and labels the charset the way `file -i` does.
//!
//! Content that looks binary (contains NUL bytes without a UTF-16 byte order
//! mark) is labelled [`Charset::Binary`] and not judged: some tools mark
//! perfectly good CSV that way, so the parse step decides.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{Result, RpsError};

/// Detected character set of a CSV source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// Only 7-bit bytes
    Ascii,
    /// Valid UTF-8 (optionally with a byte order mark)
    Utf8,
    /// UTF-16 identified by its byte order mark
    Utf16 {
        /// Whether the byte order mark is little-endian
        little_endian: bool,
    },
    /// 8-bit text using only ISO-8859-1 printable high bytes
    Latin1,
    /// 8-bit text with bytes in the C1 range (Windows code pages, Mac Roman, ...)
    Unknown8Bit,
    /// Binary-looking content; not judged
    Binary,
}

impl Charset {
    /// Sniff the charset of a byte buffer.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            if encoding == UTF_8 {
                return Charset::Utf8;
            }
            if encoding == UTF_16LE || encoding == UTF_16BE {
                return Charset::Utf16 {
                    little_endian: encoding == UTF_16LE,
                };
            }
        }

        if memchr::memchr(0, bytes).is_some() {
            return Charset::Binary;
        }

        if bytes.is_ascii() {
            return Charset::Ascii;
        }

        if std::str::from_utf8(bytes).is_ok() {
            return Charset::Utf8;
        }

        if bytes.iter().any(|&b| (0x80..=0x9F).contains(&b)) {
            Charset::Unknown8Bit
        } else {
            Charset::Latin1
        }
    }

    /// The `charset=` label reported for this charset.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Charset::Ascii => "us-ascii",
            Charset::Utf8 => "utf-8",
            Charset::Utf16 {
                little_endian: true,
            } => "utf-16le",
            Charset::Utf16 {
                little_endian: false,
            } => "utf-16be",
            Charset::Latin1 => "iso-8859-1",
            Charset::Unknown8Bit => "unknown-8bit",
            Charset::Binary => "binary",
        }
    }

    /// Whether a CSV in this charset may be validated.
    ///
    /// Binary content passes here; it is left to the parser to reject.
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        matches!(self, Charset::Ascii | Charset::Utf8 | Charset::Binary)
    }
}

/// Check that CSV bytes are in an accepted charset.
///
/// # Errors
///
/// Returns `RpsError::EncodingError` naming the detected charset label when it
/// is neither UTF-8 nor ASCII.
pub fn ensure_utf8_or_ascii(bytes: &[u8]) -> Result<Charset> {
    let charset = Charset::detect(bytes);
    if charset.is_acceptable() {
        Ok(charset)
    } else {
        Err(RpsError::EncodingError(charset.label().to_string()))
    }
}

/// Strip a leading UTF-8 byte order mark, if any.
#[must_use]
pub fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}
