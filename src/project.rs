// project.rs - Projection of raw match tables into user-facing results.
//
// A MatchSet holds one element's matches as parallel vectors (offsets,
// byte offsets, lengths, byte lengths, substrings) plus, when the
// pattern has capture groups, a GroupTable with one row per match and
// one column per group. Missing-group cells are None, distinct from
// empty strings. Substrings are converted to the host's encoding on the
// way out.

use crate::error::Result;
use crate::pattern::Regex;
use crate::search::RawMatchSet;
use crate::source::{TextElement, TextSource};

/// Capture-group projection: one row per match, one column per group.
#[derive(Debug, Clone, Default)]
pub struct GroupTable {
    n_matches: usize,
    n_groups: usize,
    names: Option<Vec<Option<String>>>,
    offsets: Vec<Option<usize>>,
    byte_offsets: Vec<Option<usize>>,
    lengths: Vec<Option<usize>>,
    byte_lengths: Vec<Option<usize>>,
    matches: Vec<Option<String>>,
}

impl GroupTable {
    pub fn match_count(&self) -> usize {
        self.n_matches
    }

    pub fn group_count(&self) -> usize {
        self.n_groups
    }

    /// Column labels, when the pattern declared group names.
    pub fn names(&self) -> Option<&[Option<String>]> {
        self.names.as_deref()
    }

    fn cell(&self, m: usize, g: usize) -> usize {
        m * self.n_groups + g
    }

    /// Char offset of group `g` in match `m` (0-based group index).
    pub fn offset(&self, m: usize, g: usize) -> Option<usize> {
        self.offsets[self.cell(m, g)]
    }

    pub fn byte_offset(&self, m: usize, g: usize) -> Option<usize> {
        self.byte_offsets[self.cell(m, g)]
    }

    pub fn length(&self, m: usize, g: usize) -> Option<usize> {
        self.lengths[self.cell(m, g)]
    }

    pub fn byte_length(&self, m: usize, g: usize) -> Option<usize> {
        self.byte_lengths[self.cell(m, g)]
    }

    /// The captured text, `None` when the group did not participate.
    pub fn matched(&self, m: usize, g: usize) -> Option<&str> {
        self.matches[self.cell(m, g)].as_deref()
    }
}

/// The projected matches for one text element.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    text: Option<String>,
    n_matches: usize,
    offsets: Vec<usize>,
    byte_offsets: Vec<usize>,
    lengths: Vec<usize>,
    byte_lengths: Vec<usize>,
    matches: Vec<String>,
    groups: Option<GroupTable>,
}

impl MatchSet {
    pub(crate) fn from_raw(
        raw: &RawMatchSet,
        element: &TextElement<'_>,
        regex: &Regex,
        keep_text: bool,
    ) -> MatchSet {
        let encoding = element.encoding();
        let n_matches = raw.match_count();
        let n_regions = raw.region_count();

        let mut set = MatchSet {
            text: keep_text.then(|| element.to_text()),
            n_matches,
            offsets: Vec::with_capacity(n_matches),
            byte_offsets: Vec::with_capacity(n_matches),
            lengths: Vec::with_capacity(n_matches),
            byte_lengths: Vec::with_capacity(n_matches),
            matches: Vec::with_capacity(n_matches),
            groups: None,
        };
        for m in 0..n_matches {
            let whole = raw.whole(m);
            set.offsets.push(whole.char_offset);
            set.byte_offsets.push(whole.byte_offset);
            set.lengths.push(whole.char_len);
            set.byte_lengths.push(whole.byte_len);
            set.matches.push(encoding.decode(&whole.bytes));
        }

        if n_regions > 1 {
            let n_groups = n_regions - 1;
            let mut table = GroupTable {
                n_matches,
                n_groups,
                names: regex.has_named_groups().then(|| regex.group_names().to_vec()),
                offsets: Vec::with_capacity(n_matches * n_groups),
                byte_offsets: Vec::with_capacity(n_matches * n_groups),
                lengths: Vec::with_capacity(n_matches * n_groups),
                byte_lengths: Vec::with_capacity(n_matches * n_groups),
                matches: Vec::with_capacity(n_matches * n_groups),
            };
            for m in 0..n_matches {
                for g in 1..n_regions {
                    match raw.region(m, g) {
                        Some(region) => {
                            table.offsets.push(Some(region.char_offset));
                            table.byte_offsets.push(Some(region.byte_offset));
                            table.lengths.push(Some(region.char_len));
                            table.byte_lengths.push(Some(region.byte_len));
                            table.matches.push(Some(encoding.decode(&region.bytes)));
                        }
                        None => {
                            table.offsets.push(None);
                            table.byte_offsets.push(None);
                            table.lengths.push(None);
                            table.byte_lengths.push(None);
                            table.matches.push(None);
                        }
                    }
                }
            }
            set.groups = Some(table);
        }
        set
    }

    /// The element's text, when the source could supply it.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn match_count(&self) -> usize {
        self.n_matches
    }

    /// Char offsets of the whole matches (0-based).
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn byte_offsets(&self) -> &[usize] {
        &self.byte_offsets
    }

    /// Char lengths of the whole matches.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn byte_lengths(&self) -> &[usize] {
        &self.byte_lengths
    }

    /// Matched substrings, converted to the host encoding.
    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    /// Matched substring `m`, or `None` past the end.
    pub fn matched(&self, m: usize) -> Option<&str> {
        self.matches.get(m).map(|s| s.as_str())
    }

    /// The capture-group table, when the pattern has groups.
    pub fn groups(&self) -> Option<&GroupTable> {
        self.groups.as_ref()
    }
}

impl Regex {
    /// Search a single host string. Returns `None` when nothing matches.
    pub fn search(&self, text: &str, all: bool, start: usize) -> Result<Option<MatchSet>> {
        let element = TextElement::from_str(text);
        if !element.encoding().is_consistent(self.encoding()) {
            log::warn!("encoding of the text does not match the regex");
            return Ok(None);
        }
        Ok(self
            .raw_search(&element, all, start)?
            .map(|raw| MatchSet::from_raw(&raw, &element, self, true)))
    }

    /// Search every element of a text source. Per element the result is
    /// `None` when nothing matched or the element's encoding is
    /// inconsistent with the pattern's (logged, batch continues).
    ///
    /// `starts` supplies per-element character offsets, recycled when
    /// shorter than the source; empty means start at 0.
    ///
    /// With `all` false on a file source, reading is incremental: the
    /// search is re-run on successive buffer doublings until a match
    /// completes strictly before the prefix end or the file is
    /// exhausted, so one early match never forces a whole-file read.
    pub fn search_source(
        &self,
        source: &mut TextSource,
        all: bool,
        starts: &[usize],
    ) -> Result<Vec<Option<MatchSet>>> {
        let n = source.len();
        let start_at = |i: usize| if starts.is_empty() { 0 } else { starts[i % starts.len()] };
        let mut results = Vec::with_capacity(n);

        if !all && source.is_file() {
            if !source.encoding().is_consistent(self.encoding()) {
                log::warn!("encoding of the source does not match the regex");
                return Ok(vec![None]);
            }
            results.push(self.search_file_incremental(source, start_at(0))?);
            return Ok(results);
        }

        for i in 0..n {
            let element = match source.element(i)? {
                Some(element) => element,
                None => {
                    results.push(None);
                    continue;
                }
            };
            if !element.encoding().is_consistent(self.encoding()) {
                log::warn!("encoding of text element {} does not match the regex", i);
                results.push(None);
                continue;
            }
            let keep_text = !element.is_incomplete();
            let projected = self
                .raw_search(&element, all, start_at(i))?
                .map(|raw| MatchSet::from_raw(&raw, &element, self, keep_text));
            results.push(projected);
        }
        Ok(results)
    }

    // Incremental single-match protocol for file sources: accept a match
    // only when it cannot extend past the data read so far.
    fn search_file_incremental(
        &self,
        source: &mut TextSource,
        start: usize,
    ) -> Result<Option<MatchSet>> {
        loop {
            let element = source.element_incremental()?;
            let complete = !element.is_incomplete();
            match self.raw_search(&element, false, start)? {
                Some(raw) => {
                    let end = {
                        let whole = raw.whole(0);
                        whole.byte_offset + whole.byte_len
                    };
                    if complete || end < element.len() {
                        return Ok(Some(MatchSet::from_raw(&raw, &element, self, complete)));
                    }
                }
                None => {
                    if complete {
                        return Ok(None);
                    }
                }
            }
        }
    }
}
