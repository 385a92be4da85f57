// print.rs - Match rendering with context, colour and line wrapping.
//
// Output is a sequence of line groups: a "context:" line and a "match:"
// line (colour mode folds both into one coloured match line), plus an
// optional "number:" line aligning match ordinals under their matches.
// Long gaps are truncated with "...". Presentation only.

use std::fmt;

use crate::project::MatchSet;

const COLOUR_ON: &str = "\x1b[36m";
const COLOUR_OFF: &str = "\x1b[0m";

// Character columns occupied by the prefixes "context: " / "  match: ".
const PREFIX_WIDTH: usize = 9;

// Blocks that render two columns wide in a terminal.
static WIDE_RANGES: &[(u32, u32)] = &[
    (0x1100, 0x115f),
    (0x2e80, 0x303e),
    (0x3041, 0x33ff),
    (0x3400, 0x4dbf),
    (0x4e00, 0x9fff),
    (0xa000, 0xa4cf),
    (0xac00, 0xd7a3),
    (0xf900, 0xfaff),
    (0xfe30, 0xfe4f),
    (0xff00, 0xff60),
    (0xffe0, 0xffe6),
    (0x20000, 0x2fffd),
    (0x30000, 0x3fffd),
];

fn display_width(c: char) -> usize {
    let code = c as u32;
    if WIDE_RANGES.iter().any(|&(lo, hi)| code >= lo && code <= hi) {
        2
    } else {
        1
    }
}

/// Configurable renderer for a [`MatchSet`].
///
/// # Examples
///
/// ```
/// use rescan::{MatchPrinter, Regex};
///
/// let re = Regex::new("a+").unwrap();
/// let matches = re.search("xaaay", true, 0).unwrap().unwrap();
/// let rendered = MatchPrinter::new().render_to_string(&matches);
/// assert!(rendered.contains("match: "));
/// assert!(rendered.contains("aaa"));
/// ```
#[derive(Debug, Clone)]
pub struct MatchPrinter {
    context: usize,
    width: usize,
    max_lines: usize,
    colour: bool,
    number: bool,
}

impl Default for MatchPrinter {
    fn default() -> MatchPrinter {
        MatchPrinter {
            context: 10,
            width: 80,
            max_lines: usize::MAX,
            colour: false,
            number: false,
        }
    }
}

impl MatchPrinter {
    pub fn new() -> MatchPrinter {
        MatchPrinter::default()
    }

    /// Characters of context kept around each match.
    pub fn context(mut self, chars: usize) -> MatchPrinter {
        self.context = chars;
        self
    }

    /// Target terminal width, including the line prefixes.
    pub fn width(mut self, columns: usize) -> MatchPrinter {
        self.width = columns;
        self
    }

    /// Stop after this many rendered line groups.
    pub fn max_lines(mut self, lines: usize) -> MatchPrinter {
        self.max_lines = lines;
        self
    }

    /// Highlight matches with terminal colour escapes instead of a
    /// separate context line.
    pub fn colour(mut self, yes: bool) -> MatchPrinter {
        self.colour = yes;
        self
    }

    /// Add a third line aligning each match's ordinal under it.
    pub fn number(mut self, yes: bool) -> MatchPrinter {
        self.number = yes;
        self
    }

    /// Render into any formatter.
    pub fn render(&self, matches: &MatchSet, out: &mut dyn fmt::Write) -> fmt::Result {
        let text = match matches.text() {
            Some(text) => text,
            None => {
                return writeln!(out, "{} match(es); text not available", matches.match_count())
            }
        };
        let chars: Vec<char> = text.chars().collect();
        let offsets = matches.offsets();
        let lengths = matches.lengths();

        let mut state = PrintState::new(self, out);
        let mut start = 0;
        let mut reached_end = false;

        for i in 0..matches.match_count() {
            let offset = offsets[i];
            let length = lengths[i];

            // Leading context, truncated with an ellipsis when the gap
            // from the previous match exceeds the context budget.
            let pre = (offset - start).min(self.context);
            if offset - start > self.context {
                state.push_ellipsis()?;
            }
            for &c in &chars[offset - pre..offset] {
                state.push(c, false, None)?;
            }

            for (k, &c) in chars[offset..offset + length].iter().enumerate() {
                state.push(c, true, (k == 0).then_some(i))?;
            }
            start = offset + length;

            // Trailing context: up to the text end after the last match,
            // otherwise only what the next match's leading context will
            // not already cover.
            let post = if i == matches.match_count() - 1 {
                if chars.len() - start <= self.context {
                    reached_end = true;
                    chars.len() - start
                } else {
                    self.context
                }
            } else {
                let gap = offsets[i + 1] - start;
                if gap > self.context {
                    (gap - self.context).min(self.context)
                } else {
                    0
                }
            };
            for &c in &chars[start..start + post] {
                state.push(c, false, None)?;
            }
            start += post;

            if state.done() {
                break;
            }
        }

        if !reached_end && !state.done() {
            state.push_ellipsis()?;
        }
        state.flush()
    }

    /// Render to a fresh string.
    pub fn render_to_string(&self, matches: &MatchSet) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.render(matches, &mut out);
        out
    }
}

// Per-render line-building state: {outside-match, inside-match} plus the
// current fill of each parallel line.
struct PrintState<'a> {
    budget: usize,
    colour: bool,
    number: bool,
    max_lines: usize,
    out: &'a mut dyn fmt::Write,
    match_line: String,
    context_line: String,
    number_line: String,
    loc: usize,
    in_match: bool,
    lines: usize,
}

impl<'a> PrintState<'a> {
    fn new(printer: &MatchPrinter, out: &'a mut dyn fmt::Write) -> PrintState<'a> {
        PrintState {
            budget: printer.width.saturating_sub(PREFIX_WIDTH).max(1),
            colour: printer.colour,
            number: printer.number,
            max_lines: printer.max_lines,
            out,
            match_line: String::new(),
            context_line: String::new(),
            number_line: String::new(),
            loc: 0,
            in_match: false,
            lines: 0,
        }
    }

    fn done(&self) -> bool {
        self.lines >= self.max_lines
    }

    fn push_ellipsis(&mut self) -> fmt::Result {
        for _ in 0..3 {
            self.push_cell(".", 1, false, None)?;
        }
        Ok(())
    }

    fn push(&mut self, c: char, in_match: bool, ordinal: Option<usize>) -> fmt::Result {
        match c {
            '\t' => self.push_cell("\\t", 2, in_match, ordinal),
            '\n' => self.push_cell("\\n", 2, in_match, ordinal),
            c => {
                let mut buf = [0u8; 4];
                let width = display_width(c);
                self.push_cell(c.encode_utf8(&mut buf), width, in_match, ordinal)
            }
        }
    }

    fn push_cell(
        &mut self,
        rendered: &str,
        width: usize,
        in_match: bool,
        ordinal: Option<usize>,
    ) -> fmt::Result {
        if self.loc + width >= self.budget {
            self.flush()?;
        }
        if self.done() {
            return Ok(());
        }

        if self.colour && in_match != self.in_match {
            self.match_line.push_str(if in_match { COLOUR_ON } else { COLOUR_OFF });
            self.in_match = in_match;
        }

        if in_match || self.colour {
            self.match_line.push_str(rendered);
            if !self.colour {
                for _ in 0..width {
                    self.context_line.push(' ');
                }
            }
        } else {
            self.context_line.push_str(rendered);
            for _ in 0..width {
                self.match_line.push(' ');
            }
        }

        if self.number {
            if let Some(m) = ordinal {
                // Align the ordinal under the start of its match.
                while self.number_line.chars().count() < self.loc {
                    self.number_line.push(' ');
                }
                self.number_line.push_str(&(m + 1).to_string());
            }
        }

        self.loc += width;
        Ok(())
    }

    fn flush(&mut self) -> fmt::Result {
        if self.loc == 0 || self.done() {
            return Ok(());
        }
        if self.colour && self.in_match {
            self.match_line.push_str(COLOUR_OFF);
            self.in_match = false;
        }
        if !self.colour {
            writeln!(self.out, "context: {}", self.context_line.trim_end())?;
        }
        writeln!(self.out, "  match: {}", self.match_line.trim_end())?;
        if self.number && !self.number_line.is_empty() {
            writeln!(self.out, " number: {}", self.number_line)?;
        }
        writeln!(self.out)?;

        self.match_line.clear();
        self.context_line.clear();
        self.number_line.clear();
        self.loc = 0;
        self.lines += 1;
        Ok(())
    }
}
