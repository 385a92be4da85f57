// pattern.rs - Pattern compilation: Regex, RegexBuilder, Options, Syntax.
//
// The matching engine is regex::bytes; everything here is marshalling
// around it. A compiled Regex owns the engine handle exclusively and is
// immutable after construction.

use bitflags::bitflags;

use crate::encoding::Encoding;
use crate::error::{Error, Result};

bitflags! {
    /// Option flags recognised at compile time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Options: u32 {
        /// Case-insensitive matching (`i`).
        const CASELESS = 1;
        /// Ruby-style multiline: `.` also matches newline (`m`).
        const MULTILINE = 1 << 1;
    }
}

impl Options {
    /// Parse an option string. `i` and `m` are recognised; any other
    /// character is ignored.
    pub fn from_option_string(options: &str) -> Options {
        let mut flags = Options::empty();
        for c in options.chars() {
            match c {
                'i' => flags |= Options::CASELESS,
                'm' => flags |= Options::MULTILINE,
                _ => {}
            }
        }
        flags
    }

    /// Render back to the option-string form.
    pub fn as_option_string(self) -> String {
        let mut s = String::new();
        if self.contains(Options::CASELESS) {
            s.push('i');
        }
        if self.contains(Options::MULTILINE) {
            s.push('m');
        }
        s
    }
}

/// Syntax dialect for the pattern text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// The engine's full regex dialect.
    #[default]
    Default,
    /// The pattern is a literal string; metacharacters are escaped
    /// before compilation.
    Fixed,
}

impl Syntax {
    /// Parse a syntax dialect name. Unknown names are fatal.
    pub fn from_name(name: &str) -> Result<Syntax> {
        match name.to_ascii_lowercase().as_str() {
            "default" | "ruby" | "extended" => Ok(Syntax::Default),
            "fixed" | "literal" => Ok(Syntax::Fixed),
            _ => Err(Error::Config {
                message: format!("unknown syntax dialect \"{}\"", name),
            }),
        }
    }
}

/// One piece of a composed pattern. Named fragments become named capture
/// groups; unnamed fragments become plain groups.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    pub name: Option<&'a str>,
    pub text: &'a str,
}

impl<'a> Fragment<'a> {
    pub fn new(text: &'a str) -> Fragment<'a> {
        Fragment { name: None, text }
    }

    pub fn named(name: &'a str, text: &'a str) -> Fragment<'a> {
        Fragment { name: Some(name), text }
    }
}

/// A compiled pattern.
///
/// Owns the engine handle; dropping the `Regex` releases it exactly once.
/// The handle is never exposed.
///
/// # Examples
///
/// ```
/// use rescan::Regex;
///
/// let re = Regex::new(r"\d+").unwrap();
/// assert_eq!(re.group_count(), 0);
///
/// let re = Regex::new(r"(?<year>\d{4})-(\d{2})").unwrap();
/// assert_eq!(re.group_count(), 2);
/// assert_eq!(re.group_names()[0].as_deref(), Some("year"));
/// assert_eq!(re.group_names()[1], None);
/// ```
#[derive(Debug)]
pub struct Regex {
    pub(crate) engine: regex::bytes::Regex,
    pattern: String,
    options: Options,
    syntax: Syntax,
    encoding: Encoding,
    n_groups: usize,
    names: Vec<Option<String>>,
}

impl Regex {
    /// Compile a pattern with default options, the default syntax and an
    /// encoding resolved from the pattern text itself.
    pub fn new(pattern: &str) -> Result<Regex> {
        RegexBuilder::new(pattern).build()
    }

    /// Create a [`RegexBuilder`] for fine-grained control.
    pub fn builder(pattern: &str) -> RegexBuilder {
        RegexBuilder::new(pattern)
    }

    /// Compose a pattern from ordered fragments, each parenthesised into
    /// a capture group, and compile it. Group naming by composition:
    ///
    /// ```
    /// use rescan::{Fragment, Regex};
    ///
    /// let re = Regex::from_fragments(&[
    ///     Fragment::named("word", r"\w+"),
    ///     Fragment::new(r"\s+"),
    /// ]).unwrap();
    /// assert_eq!(re.group_count(), 2);
    /// assert_eq!(re.group_names()[0].as_deref(), Some("word"));
    /// ```
    pub fn from_fragments(fragments: &[Fragment<'_>]) -> Result<Regex> {
        RegexBuilder::from_fragments(fragments).build()
    }

    /// The source pattern text.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of capture groups, excluding the whole match.
    pub fn group_count(&self) -> usize {
        self.n_groups
    }

    /// Ordered group names by index; unnamed groups are `None`.
    pub fn group_names(&self) -> &[Option<String>] {
        &self.names
    }

    /// Whether any group carries a name.
    pub fn has_named_groups(&self) -> bool {
        self.names.iter().any(|n| n.is_some())
    }

    /// Resolve a group name to its 1-based group number.
    pub(crate) fn group_number(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .map(|i| i + 1)
    }
}

/// Builder for compiling a [`Regex`] with custom options.
///
/// # Examples
///
/// ```
/// use rescan::Regex;
///
/// let re = Regex::builder("hello")
///     .case_insensitive(true)
///     .build()
///     .unwrap();
/// assert!(re.search("Hello World", false, 0).unwrap().is_some());
/// ```
#[derive(Debug)]
pub struct RegexBuilder {
    pattern: String,
    options: Options,
    syntax_name: Option<String>,
    syntax: Syntax,
    encoding_name: Option<String>,
}

impl RegexBuilder {
    /// Create a new builder for the given pattern.
    pub fn new(pattern: &str) -> RegexBuilder {
        RegexBuilder {
            pattern: pattern.to_string(),
            options: Options::empty(),
            syntax_name: None,
            syntax: Syntax::Default,
            encoding_name: None,
        }
    }

    /// Create a builder for a pattern composed from fragments.
    pub fn from_fragments(fragments: &[Fragment<'_>]) -> RegexBuilder {
        let mut pattern = String::new();
        for fragment in fragments {
            match fragment.name {
                Some(name) => {
                    pattern.push_str("(?<");
                    pattern.push_str(name);
                    pattern.push('>');
                    pattern.push_str(fragment.text);
                    pattern.push(')');
                }
                None => {
                    pattern.push('(');
                    pattern.push_str(fragment.text);
                    pattern.push(')');
                }
            }
        }
        RegexBuilder::new(&pattern)
    }

    /// Enable or disable case-insensitive matching.
    pub fn case_insensitive(mut self, yes: bool) -> RegexBuilder {
        self.options.set(Options::CASELESS, yes);
        self
    }

    /// Enable or disable Ruby-style multiline mode (`.` matches newline).
    pub fn multiline(mut self, yes: bool) -> RegexBuilder {
        self.options.set(Options::MULTILINE, yes);
        self
    }

    /// Merge flags from an option string (`"im"` etc.; unrecognised
    /// characters are ignored).
    pub fn option_string(mut self, options: &str) -> RegexBuilder {
        self.options |= Options::from_option_string(options);
        self
    }

    /// Select the syntax dialect.
    pub fn syntax(mut self, syntax: Syntax) -> RegexBuilder {
        self.syntax = syntax;
        self.syntax_name = None;
        self
    }

    /// Select the syntax dialect by name; validated at [`build`] time.
    ///
    /// [`build`]: RegexBuilder::build
    pub fn syntax_name(mut self, name: &str) -> RegexBuilder {
        self.syntax_name = Some(name.to_string());
        self
    }

    /// Give the pattern an explicit encoding by name. Without this, the
    /// encoding is resolved from the pattern text.
    pub fn encoding_name(mut self, name: &str) -> RegexBuilder {
        self.encoding_name = Some(name.to_string());
        self
    }

    /// Compile the pattern into a [`Regex`].
    pub fn build(self) -> Result<Regex> {
        let syntax = match &self.syntax_name {
            Some(name) => Syntax::from_name(name)?,
            None => self.syntax,
        };
        let encoding = Encoding::resolve(
            self.encoding_name.as_deref(),
            Some(Encoding::for_str(&self.pattern)),
        );

        let source = match syntax {
            Syntax::Default => self.pattern.clone(),
            Syntax::Fixed => regex_syntax::escape(&self.pattern),
        };
        let marshalled = encoding.encode_pattern(&source)?;

        // ASCII acts as the unknown/native encoding and its text may well
        // be UTF-8, so character classes stay Unicode-aware; only a true
        // single-byte encoding compiles byte-oriented.
        let engine = regex::bytes::RegexBuilder::new(&marshalled)
            .case_insensitive(self.options.contains(Options::CASELESS))
            .dot_matches_new_line(self.options.contains(Options::MULTILINE))
            .unicode(encoding != Encoding::Latin1)
            .build()
            .map_err(|e| Error::Compile { message: e.to_string() })?;

        // The engine's group-name enumeration covers group 0 as well;
        // skip it so names index user groups from zero.
        let names: Vec<Option<String>> = engine
            .capture_names()
            .skip(1)
            .map(|n| n.map(str::to_string))
            .collect();
        let n_groups = engine.captures_len() - 1;

        Ok(Regex {
            engine,
            pattern: self.pattern,
            options: self.options,
            syntax,
            encoding,
            n_groups,
            names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_string_parsing() {
        let flags = Options::from_option_string("imx");
        assert!(flags.contains(Options::CASELESS));
        assert!(flags.contains(Options::MULTILINE));
        assert_eq!(flags.as_option_string(), "im");
        assert_eq!(Options::from_option_string(""), Options::empty());
    }

    #[test]
    fn syntax_names() {
        assert_eq!(Syntax::from_name("default").unwrap(), Syntax::Default);
        assert_eq!(Syntax::from_name("Fixed").unwrap(), Syntax::Fixed);
        assert!(matches!(
            Syntax::from_name("posix"),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn bad_pattern_is_a_compile_error() {
        let err = Regex::new("(unclosed").unwrap_err();
        assert!(matches!(err, Error::Compile { .. }));
    }

    #[test]
    fn fixed_syntax_escapes_metacharacters() {
        let re = Regex::builder("a.b*").syntax(Syntax::Fixed).build().unwrap();
        let found = re.search("xa.b*y", false, 0).unwrap().unwrap();
        assert_eq!(found.matched(0), Some("a.b*"));
        assert!(re.search("axbb", false, 0).unwrap().is_none());
    }

    #[test]
    fn encoding_resolved_from_pattern_text() {
        assert_eq!(Regex::new("abc").unwrap().encoding(), Encoding::Ascii);
        assert_eq!(Regex::new("é").unwrap().encoding(), Encoding::Utf8);
    }

    #[test]
    fn group_names_align_with_indices() {
        let re = Regex::new(r"(a)(?<mid>b)(c)").unwrap();
        assert_eq!(re.group_count(), 3);
        assert_eq!(re.group_names(), &[None, Some("mid".to_string()), None]);
        assert_eq!(re.group_number("mid"), Some(2));
        assert_eq!(re.group_number("end"), None);
        assert!(re.has_named_groups());
    }

    #[test]
    fn fragment_composition() {
        let re = Regex::from_fragments(&[
            Fragment::named("key", r"\w+"),
            Fragment::new("="),
            Fragment::named("value", r"\w+"),
        ])
        .unwrap();
        assert_eq!(re.as_str(), r"(?<key>\w+)(=)(?<value>\w+)");
        assert_eq!(re.group_count(), 3);
    }
}
