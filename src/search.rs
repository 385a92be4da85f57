// search.rs - The match engine driver.
//
// Repeatedly runs the engine's leftmost search over a text element and
// records every region (region 0 = whole match, 1..=N = capture groups)
// into a RawMatchSet: byte offset/length always, char offset/length
// computed by decoding between known boundaries only when the encoding
// is variable-width. Non-participating optional groups are recorded as
// absent cells, distinct from zero-length matches.

use crate::error::{Error, Result};
use crate::pattern::Regex;
use crate::source::TextElement;

/// One region of one match: offsets and lengths in both bytes and
/// characters, plus a copy of the matched bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRegion {
    pub byte_offset: usize,
    pub byte_len: usize,
    pub char_offset: usize,
    pub char_len: usize,
    pub bytes: Vec<u8>,
}

/// Raw match data: a 2-D table of match-index by region-index. Cells for
/// optional groups that did not participate are `None`. Rows are
/// appended with amortized-doubling growth.
#[derive(Debug, Default)]
pub struct RawMatchSet {
    n_regions: usize,
    cells: Vec<Option<RawRegion>>,
}

impl RawMatchSet {
    fn new(n_regions: usize) -> RawMatchSet {
        RawMatchSet { n_regions, cells: Vec::new() }
    }

    /// Regions per match, including region 0.
    pub fn region_count(&self) -> usize {
        self.n_regions
    }

    /// Number of matches recorded.
    pub fn match_count(&self) -> usize {
        if self.n_regions == 0 {
            0
        } else {
            self.cells.len() / self.n_regions
        }
    }

    /// The cell for match `m`, region `r`; `None` when the group did not
    /// participate in that match.
    pub fn region(&self, m: usize, r: usize) -> Option<&RawRegion> {
        self.cells.get(m * self.n_regions + r).and_then(|c| c.as_ref())
    }

    /// Region 0 of match `m`. Every recorded match has one.
    pub(crate) fn whole(&self, m: usize) -> &RawRegion {
        self.cells[m * self.n_regions]
            .as_ref()
            .expect("region 0 always participates")
    }

    fn push_row(&mut self, row: Vec<Option<RawRegion>>) {
        debug_assert_eq!(row.len(), self.n_regions);
        self.cells.extend(row);
    }
}

impl Regex {
    /// Search one text element, returning the raw match table, or `None`
    /// when nothing matches. `start` is a character offset; when `all` is
    /// false at most one match is collected.
    pub fn raw_search(
        &self,
        element: &TextElement<'_>,
        all: bool,
        start: usize,
    ) -> Result<Option<RawMatchSet>> {
        let text = element.bytes();
        let encoding = element.encoding();
        let single_byte = encoding.is_single_byte();

        // Step the cursor to the requested character offset.
        let mut cursor = encoding.step(text, 0, start);
        let mut cursor_chars = start;
        if cursor > text.len() {
            return Ok(None);
        }

        let mut locations = self.engine.capture_locations();
        let mut result: Option<RawMatchSet> = None;

        while cursor <= text.len() {
            if self.engine.captures_read_at(&mut locations, text, cursor).is_none() {
                break;
            }
            let (whole_start, whole_end) = locations
                .get(0)
                .ok_or_else(|| Error::engine("match reported without a region 0"))?;

            let set = result.get_or_insert_with(|| RawMatchSet::new(locations.len()));
            let mut row = Vec::with_capacity(locations.len());

            // Char offset of the whole match, carried forward so later
            // regions and matches never re-count from the text start.
            let whole_char_offset = if single_byte {
                whole_start
            } else {
                cursor_chars + encoding.char_count(&text[cursor..whole_start])
            };

            for i in 0..locations.len() {
                let span = match locations.get(i) {
                    Some(span) => span,
                    None => {
                        row.push(None);
                        continue;
                    }
                };
                let (begin, end) = span;
                let (char_offset, char_len) = if single_byte {
                    (begin, end - begin)
                } else if i == 0 {
                    (whole_char_offset, encoding.char_count(&text[begin..end]))
                } else {
                    (
                        whole_char_offset + encoding.char_count(&text[whole_start..begin]),
                        encoding.char_count(&text[begin..end]),
                    )
                };
                row.push(Some(RawRegion {
                    byte_offset: begin,
                    byte_len: end - begin,
                    char_offset,
                    char_len,
                    bytes: text[begin..end].to_vec(),
                }));
            }
            set.push_row(row);

            // Advance past region 0; a zero-length match steps one extra
            // character so the scan terminates.
            let whole_chars = set.whole(set.match_count() - 1).char_len;
            cursor_chars = whole_char_offset + whole_chars;
            cursor = whole_end;
            if whole_end == whole_start {
                let bumped = encoding.step(text, cursor, 1);
                if bumped == cursor {
                    break;
                }
                cursor = bumped;
                cursor_chars += 1;
            }

            if !all {
                break;
            }
        }

        Ok(result)
    }
}
