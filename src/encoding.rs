// encoding.rs - Encoding descriptors and byte/character bookkeeping.
//
// The canonical descriptor is a single enum tag; the name, the engine
// behaviour and the host-string behaviour are all derived from it, so a
// descriptor cannot be internally inconsistent. ASCII doubles as the
// "unknown or native" encoding and is treated as consistent with
// everything when encodings are cross-checked.

use crate::error::{Error, Result};

/// A text encoding understood by the toolkit.
///
/// `Ascii` is the default and acts as a wildcard in consistency checks.
/// `Utf8` is the host's own string encoding. `Latin1` (ISO-8859-1) is the
/// supported single-byte extended encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Ascii,
    Utf8,
    Latin1,
}

impl Encoding {
    /// Resolve an encoding name, case-insensitively, accepting the usual
    /// aliases. `auto`, `native` and the empty string resolve to ASCII.
    ///
    /// Unknown names are recoverable: a warning is logged and ASCII is
    /// used as the fallback.
    pub fn from_name(name: &str) -> Encoding {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | '.'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "" | "auto" | "native" | "nativeenc" => Encoding::Ascii,
            "ascii" | "usascii" => Encoding::Ascii,
            "utf8" => Encoding::Utf8,
            "latin1" | "iso88591" => Encoding::Latin1,
            _ => {
                log::warn!("encoding \"{}\" is not supported - using ASCII", name);
                Encoding::Ascii
            }
        }
    }

    /// The encoding a host string already carries: pure-ASCII text is
    /// left unmarked, anything else is UTF-8.
    pub fn for_str(text: &str) -> Encoding {
        if text.is_ascii() {
            Encoding::Ascii
        } else {
            Encoding::Utf8
        }
    }

    /// Produce a complete descriptor from whatever hints are available.
    /// An explicit name wins; otherwise the host tag is used; the default
    /// is ASCII.
    pub fn resolve(name: Option<&str>, host: Option<Encoding>) -> Encoding {
        match (name, host) {
            (Some(n), _) if !n.is_empty() => Encoding::from_name(n),
            (_, Some(enc)) => enc,
            _ => Encoding::Ascii,
        }
    }

    /// Canonical name of the encoding.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Ascii => "US-ASCII",
            Encoding::Utf8 => "UTF-8",
            Encoding::Latin1 => "ISO-8859-1",
        }
    }

    /// Whether two encodings may be safely combined. Equal encodings are
    /// always consistent; ASCII is consistent with everything.
    pub fn is_consistent(self, other: Encoding) -> bool {
        self == other || self == Encoding::Ascii || other == Encoding::Ascii
    }

    /// Maximum number of bytes per character.
    pub fn max_char_len(self) -> usize {
        match self {
            Encoding::Utf8 => 4,
            _ => 1,
        }
    }

    /// Whether every character occupies exactly one byte.
    pub fn is_single_byte(self) -> bool {
        self.max_char_len() == 1
    }

    /// Length in bytes of the character starting with `lead`. Invalid
    /// lead bytes count as one, matching the engine's error recovery.
    pub fn char_len(self, lead: u8) -> usize {
        match self {
            Encoding::Utf8 => match lead {
                0xc2..=0xdf => 2,
                0xe0..=0xef => 3,
                0xf0..=0xf4 => 4,
                _ => 1,
            },
            _ => 1,
        }
    }

    /// Step forward `n` characters from byte position `from`, clamping to
    /// the end of the text. Single-byte encodings step by direct byte
    /// addition.
    pub fn step(self, bytes: &[u8], from: usize, n: usize) -> usize {
        if self.is_single_byte() {
            return (from + n).min(bytes.len());
        }
        let mut pos = from;
        for _ in 0..n {
            if pos >= bytes.len() {
                break;
            }
            pos += self.char_len(bytes[pos]);
        }
        pos.min(bytes.len())
    }

    /// Step backward `n` characters from byte position `from`, clamping
    /// to the start of the text.
    pub fn step_back(self, bytes: &[u8], from: usize, n: usize) -> usize {
        if self.is_single_byte() {
            return from.saturating_sub(n);
        }
        let mut pos = from;
        for _ in 0..n {
            if pos == 0 {
                break;
            }
            pos -= 1;
            while pos > 0 && (bytes[pos] & 0xc0) == 0x80 {
                pos -= 1;
            }
        }
        pos
    }

    /// Number of characters in `bytes`.
    pub fn char_count(self, bytes: &[u8]) -> usize {
        if self.is_single_byte() {
            return bytes.len();
        }
        let mut pos = 0;
        let mut count = 0;
        while pos < bytes.len() {
            pos += self.char_len(bytes[pos]);
            count += 1;
        }
        count
    }

    /// Convert raw bytes in this encoding to a host (UTF-8) string.
    /// Invalid sequences are replaced rather than failing: extraction is
    /// best-effort on malformed input.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            _ => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Convert a host string to raw bytes in this encoding. Characters a
    /// single-byte encoding cannot represent become `?`.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Latin1 => text
                .chars()
                .map(|c| if (c as u32) <= 0xff { c as u32 as u8 } else { b'?' })
                .collect(),
            _ => text.as_bytes().to_vec(),
        }
    }

    /// Marshal a host pattern string for compilation against text in this
    /// encoding. For Latin-1 the pattern's non-ASCII characters are
    /// rewritten as `\xHH` byte literals so they match single bytes, not
    /// their UTF-8 spellings; characters above U+00FF cannot occur in
    /// Latin-1 text and are a compile error.
    pub fn encode_pattern(self, pattern: &str) -> Result<String> {
        if self != Encoding::Latin1 || pattern.is_ascii() {
            return Ok(pattern.to_string());
        }
        let mut out = String::with_capacity(pattern.len() + 8);
        for c in pattern.chars() {
            let code = c as u32;
            if code < 0x80 {
                out.push(c);
            } else if code <= 0xff {
                out.push_str(&format!("\\x{:02X}", code));
            } else {
                return Err(Error::Compile {
                    message: format!(
                        "character U+{:04X} cannot be expressed in {}",
                        code,
                        self.name()
                    ),
                });
            }
        }
        Ok(out)
    }
}
