// source.rs - Text sources: string vectors, files and byte streams.
//
// All three source kinds present the same interface: an indexable
// sequence of text elements. String sources have N elements, each with
// its own encoding; file and stream sources have exactly one, read
// through a geometrically growing buffer. File handles are closed when
// the source is dropped; a stream's underlying handle belongs to the
// caller.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::encoding::Encoding;
use crate::error::{Error, Result};

// Initial buffer size when reading from a file or stream; scales
// exponentially.
const READ_BUFFER_SIZE: usize = 1024;

/// A contiguous run of text in a known encoding.
///
/// `incomplete` is true when more bytes may follow, which only happens
/// during incremental file reads.
#[derive(Debug, Clone, Copy)]
pub struct TextElement<'a> {
    bytes: &'a [u8],
    encoding: Encoding,
    incomplete: bool,
}

impl<'a> TextElement<'a> {
    /// View a host string as a text element.
    pub fn from_str(text: &'a str) -> TextElement<'a> {
        TextElement {
            bytes: text.as_bytes(),
            encoding: Encoding::for_str(text),
            incomplete: false,
        }
    }

    /// View raw bytes in an explicit encoding as a text element.
    pub fn from_bytes(bytes: &'a [u8], encoding: Encoding) -> TextElement<'a> {
        TextElement { bytes, encoding, incomplete: false }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the element into a host string.
    pub fn to_text(&self) -> String {
        self.encoding.decode(self.bytes)
    }
}

struct OwnedText {
    bytes: Vec<u8>,
    encoding: Encoding,
}

enum Source {
    Strings(Vec<OwnedText>),
    File { path: PathBuf, file: File },
    Stream(Box<dyn Read>),
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Strings(v) => f.debug_tuple("Strings").field(&v.len()).finish(),
            Source::File { path, .. } => f.debug_tuple("File").field(path).finish(),
            Source::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

/// A text source: an in-memory string vector, an open file, or a byte
/// stream, behind one indexable interface.
#[derive(Debug)]
pub struct TextSource {
    source: Source,
    encoding: Encoding,
    // Read state for file and stream sources.
    buffer: Vec<u8>,
    exhausted: bool,
    started: bool,
}

impl TextSource {
    /// Build a source from host strings. Each element keeps its own
    /// encoding (ASCII when pure ASCII, UTF-8 otherwise); the source's
    /// overall encoding is the first non-ASCII element's, else ASCII.
    pub fn from_strings<I, S>(strings: I) -> TextSource
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let elements: Vec<OwnedText> = strings
            .into_iter()
            .map(|s| {
                let s = s.as_ref();
                OwnedText {
                    bytes: s.as_bytes().to_vec(),
                    encoding: Encoding::for_str(s),
                }
            })
            .collect();
        let encoding = elements
            .iter()
            .map(|e| e.encoding)
            .find(|&e| e != Encoding::Ascii)
            .unwrap_or(Encoding::Ascii);
        TextSource {
            source: Source::Strings(elements),
            encoding,
            buffer: Vec::new(),
            exhausted: false,
            started: false,
        }
    }

    /// Build a source from raw byte strings carrying one declared
    /// encoding.
    pub fn from_encoded<I>(strings: I, encoding: Encoding) -> TextSource
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let elements = strings
            .into_iter()
            .map(|bytes| OwnedText { bytes, encoding })
            .collect();
        TextSource {
            source: Source::Strings(elements),
            encoding,
            buffer: Vec::new(),
            exhausted: false,
            started: false,
        }
    }

    /// Open a file source. The file is opened here and closed when the
    /// source is dropped. `encoding_name` follows the resolver rules;
    /// `None` means ASCII.
    pub fn open_file<P: AsRef<Path>>(path: P, encoding_name: Option<&str>) -> Result<TextSource> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::Open { path: path.clone(), source })?;
        Ok(TextSource {
            source: Source::File { path, file },
            encoding: Encoding::resolve(encoding_name, None),
            buffer: Vec::new(),
            exhausted: false,
            started: false,
        })
    }

    /// Wrap a byte stream. The stream's own handle is the caller's to
    /// close; dropping the source only drops the reader box.
    pub fn from_reader<R: Read + 'static>(reader: R, encoding_name: Option<&str>) -> TextSource {
        TextSource {
            source: Source::Stream(Box::new(reader)),
            encoding: Encoding::resolve(encoding_name, None),
            buffer: Vec::new(),
            exhausted: false,
            started: false,
        }
    }

    /// Number of elements: N for string sources, 1 for files and streams.
    pub fn len(&self) -> usize {
        match &self.source {
            Source::Strings(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The source's declared encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub(crate) fn is_file(&self) -> bool {
        matches!(self.source, Source::File { .. })
    }

    /// Fetch element `index`. For file and stream sources the index must
    /// be 0 and the whole remaining content is read: the buffer starts at
    /// 1 KiB and doubles every time a read fills it completely.
    pub fn element(&mut self, index: usize) -> Result<Option<TextElement<'_>>> {
        if !matches!(self.source, Source::Strings(_)) {
            if index > 0 {
                return Ok(None);
            }
            while !self.exhausted {
                self.grow_and_fill()?;
            }
            return Ok(Some(TextElement {
                bytes: &self.buffer,
                encoding: self.encoding,
                incomplete: false,
            }));
        }
        match &self.source {
            Source::Strings(elements) => Ok(elements.get(index).map(|e| TextElement {
                bytes: &e.bytes,
                encoding: e.encoding,
                incomplete: false,
            })),
            _ => unreachable!(),
        }
    }

    /// Fetch the next incremental prefix of a file source: the first call
    /// reads 1 KiB, each later call doubles the buffer and fills the new
    /// half. The element is incomplete while the file may hold more.
    /// Stream and string sources fall back to a full element read.
    pub(crate) fn element_incremental(&mut self) -> Result<TextElement<'_>> {
        if !self.is_file() {
            let encoding = self.encoding;
            return match self.element(0)? {
                Some(element) => Ok(element),
                None => Ok(TextElement::from_bytes(&[], encoding)),
            };
        }
        if !self.exhausted {
            self.grow_and_fill()?;
        }
        Ok(TextElement {
            bytes: &self.buffer,
            encoding: self.encoding,
            incomplete: !self.exhausted,
        })
    }

    // One growth step: double the buffer (or create it at the initial
    // size) and fill the new space, retrying short reads until the target
    // is reached or the reader reports end of input.
    fn grow_and_fill(&mut self) -> Result<()> {
        let target = if self.started { self.buffer.len() * 2 } else { READ_BUFFER_SIZE };
        self.started = true;
        log::debug!("growing read buffer to {} bytes", target);

        let mut filled = self.buffer.len();
        self.buffer.resize(target.max(READ_BUFFER_SIZE), 0);
        while filled < self.buffer.len() {
            let reader: &mut dyn Read = match &mut self.source {
                Source::File { file, .. } => file,
                Source::Stream(reader) => reader.as_mut(),
                Source::Strings(_) => {
                    return Err(Error::engine("string sources have no read buffer"))
                }
            };
            let n = reader
                .read(&mut self.buffer[filled..])
                .map_err(|source| Error::Read { source })?;
            if n == 0 {
                self.exhausted = true;
                break;
            }
            filled += n;
        }
        self.buffer.truncate(filled);
        Ok(())
    }
}
