// subst.rs - Split, substitute and switch: everything that rebuilds text
// around raw match offsets.
//
// Substitution is two-layered when a template carries back-references:
// the references are spliced per match first, then the per-match results
// are spliced into the subject text.

use memchr::memchr;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::pattern::Regex;
use crate::project::MatchSet;
use crate::search::RawMatchSet;
use crate::source::{TextElement, TextSource};

// Replace the byte ranges of `text` with the parallel `replacements`,
// alternating original spans and replacements. Ranges are non-overlapping
// and in ascending order; replacements may differ in length from what
// they replace.
fn splice(text: &[u8], ranges: &[(usize, usize)], replacements: &[&[u8]]) -> Vec<u8> {
    debug_assert_eq!(ranges.len(), replacements.len());
    let added: usize = replacements.iter().map(|r| r.len()).sum();
    let removed: usize = ranges.iter().map(|&(_, len)| len).sum();
    let mut out = Vec::with_capacity(text.len() + added - removed);

    let mut cursor = 0;
    for (&(offset, len), replacement) in ranges.iter().zip(replacements) {
        out.extend_from_slice(&text[cursor..offset]);
        out.extend_from_slice(replacement);
        cursor = offset + len;
    }
    out.extend_from_slice(&text[cursor..]);
    out
}

// A single back-reference inside a template: where it sits and which
// group it resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BackRef {
    offset: usize,
    len: usize,
    group: usize,
}

// Locate `\N` and `\k<name>` references in a template and validate them
// against the pattern. The two reference kinds are found by two
// auxiliary patterns whose match streams are merged into template order.
fn find_backrefs(template: &[u8], regex: &Regex) -> Result<Vec<BackRef>> {
    // No backslash, no references; skip compiling the auxiliary patterns.
    if memchr(b'\\', template).is_none() {
        return Ok(Vec::new());
    }

    let number_ref = regex::bytes::Regex::new(r"\\([1-9])")
        .map_err(|e| Error::engine(e.to_string()))?;
    let name_ref = regex::bytes::Regex::new(r"\\k<(\w+)>")
        .map_err(|e| Error::engine(e.to_string()))?;

    let mut refs = Vec::new();
    for caps in number_ref.captures_iter(template) {
        let whole = caps.get(0).ok_or_else(|| Error::engine("reference match without region 0"))?;
        let digit = caps.get(1).ok_or_else(|| Error::engine("reference match without its group"))?;
        let number = (digit.as_bytes()[0] - b'0') as usize;
        if number > regex.group_count() {
            return Err(Error::Range { number, count: regex.group_count() });
        }
        refs.push(BackRef { offset: whole.start(), len: whole.end() - whole.start(), group: number });
    }
    for caps in name_ref.captures_iter(template) {
        let whole = caps.get(0).ok_or_else(|| Error::engine("reference match without region 0"))?;
        let name_bytes = caps.get(1).ok_or_else(|| Error::engine("reference match without its group"))?;
        let name = String::from_utf8_lossy(name_bytes.as_bytes()).into_owned();
        let group = regex
            .group_number(&name)
            .ok_or(Error::Reference { name })?;
        refs.push(BackRef { offset: whole.start(), len: whole.end() - whole.start(), group });
    }
    // References apply in template order, whichever kind they are.
    refs.sort_by_key(|r| r.offset);
    Ok(refs)
}

/// A replacement template, optionally carrying `\N` and `\k<name>`
/// back-references.
///
/// References are located and validated when the template is first
/// prepared against a pattern, before any substitution runs: a name that
/// resolves to no declared group is [`Error::Reference`], a number above
/// the group count is [`Error::Range`].
#[derive(Debug)]
pub struct Template {
    text: String,
    bytes: Vec<u8>,
    refs: Vec<BackRef>,
    scan: bool,
    resolved: bool,
}

impl Template {
    /// A template whose back-references will be resolved per match.
    pub fn new(text: &str) -> Template {
        Template {
            text: text.to_string(),
            bytes: Vec::new(),
            refs: Vec::new(),
            scan: true,
            resolved: false,
        }
    }

    /// A literal replacement; the text is never scanned for references.
    pub fn literal(text: &str) -> Template {
        Template {
            text: text.to_string(),
            bytes: Vec::new(),
            refs: Vec::new(),
            scan: false,
            resolved: false,
        }
    }

    fn resolve(&mut self, regex: &Regex) -> Result<()> {
        if self.resolved {
            return Ok(());
        }
        self.bytes = regex.encoding().encode(&self.text);
        if self.scan {
            self.refs = find_backrefs(&self.bytes, regex)?;
        }
        self.resolved = true;
        Ok(())
    }

    // Expand the template for match `m`: each reference becomes the
    // captured text of its group (empty when the group did not
    // participate in this match).
    fn expand(&self, raw: &RawMatchSet, m: usize) -> Vec<u8> {
        if self.refs.is_empty() {
            return self.bytes.clone();
        }
        let ranges: SmallVec<[(usize, usize); 8]> =
            self.refs.iter().map(|r| (r.offset, r.len)).collect();
        let replacements: SmallVec<[&[u8]; 8]> = self
            .refs
            .iter()
            .map(|r| raw.region(m, r.group).map(|cell| cell.bytes.as_slice()).unwrap_or(b""))
            .collect();
        splice(&self.bytes, &ranges, &replacements)
    }
}

/// Replacement strategy for substitution: a prepared [`Template`], or a
/// callback receiving the projected matches.
pub trait Replacer {
    /// Validate against the pattern before any substitution work runs.
    fn prepare(&mut self, regex: &Regex) -> Result<()> {
        let _ = regex;
        Ok(())
    }

    /// Produce one replacement per match of `raw`.
    fn replacements(
        &mut self,
        regex: &Regex,
        raw: &RawMatchSet,
        element: &TextElement<'_>,
    ) -> Result<Vec<Vec<u8>>>;
}

impl Replacer for Template {
    fn prepare(&mut self, regex: &Regex) -> Result<()> {
        self.resolve(regex)
    }

    fn replacements(
        &mut self,
        regex: &Regex,
        raw: &RawMatchSet,
        _element: &TextElement<'_>,
    ) -> Result<Vec<Vec<u8>>> {
        self.resolve(regex)?;
        Ok((0..raw.match_count()).map(|m| self.expand(raw, m)).collect())
    }
}

/// Callback replacement: the function is invoked once per element,
/// batched, with all projected matches (capture groups included as the
/// side-channel). Returned values are recycled across matches when there
/// are fewer values than matches.
impl<F> Replacer for F
where
    F: FnMut(&MatchSet) -> Vec<String>,
{
    fn replacements(
        &mut self,
        regex: &Regex,
        raw: &RawMatchSet,
        element: &TextElement<'_>,
    ) -> Result<Vec<Vec<u8>>> {
        let matches = MatchSet::from_raw(raw, element, regex, true);
        let values = (*self)(&matches);
        let n = raw.match_count();

        if values.is_empty() {
            log::warn!("replacement function returned no values - using empty strings");
            return Ok(vec![Vec::new(); n]);
        }
        if n % values.len() != 0 {
            log::warn!(
                "number of matches ({}) is not a multiple of the replacements ({})",
                n,
                values.len()
            );
        }
        let encoding = element.encoding();
        Ok((0..n).map(|m| encoding.encode(&values[m % values.len()])).collect())
    }
}

impl Regex {
    /// Split a host string at every match. Zero matches produce a single
    /// fragment holding the whole text.
    pub fn split(&self, text: &str, start: usize) -> Result<Vec<String>> {
        let element = TextElement::from_str(text);
        if !element.encoding().is_consistent(self.encoding()) {
            log::warn!("encoding of the text does not match the regex");
            return Ok(vec![text.to_string()]);
        }
        Ok(self.split_element(&element, start)?)
    }

    /// Split every element of a text source.
    pub fn split_source(
        &self,
        source: &mut TextSource,
        starts: &[usize],
    ) -> Result<Vec<Vec<String>>> {
        let n = source.len();
        let start_at = |i: usize| if starts.is_empty() { 0 } else { starts[i % starts.len()] };
        let mut results = Vec::with_capacity(n);
        for i in 0..n {
            let element = match source.element(i)? {
                Some(element) => element,
                None => {
                    results.push(Vec::new());
                    continue;
                }
            };
            if !element.encoding().is_consistent(self.encoding()) {
                log::warn!("encoding of text element {} does not match the regex", i);
                results.push(vec![element.to_text()]);
                continue;
            }
            results.push(self.split_element(&element, start_at(i))?);
        }
        Ok(results)
    }

    fn split_element(&self, element: &TextElement<'_>, start: usize) -> Result<Vec<String>> {
        let encoding = element.encoding();
        let text = element.bytes();
        let raw = match self.raw_search(element, true, start)? {
            Some(raw) => raw,
            None => return Ok(vec![element.to_text()]),
        };

        // N matches make N+1 fragments: before, between, after.
        let mut fragments = Vec::with_capacity(raw.match_count() + 1);
        let mut cursor = 0;
        for m in 0..raw.match_count() {
            let whole = raw.whole(m);
            fragments.push(encoding.decode(&text[cursor..whole.byte_offset]));
            cursor = whole.byte_offset + whole.byte_len;
        }
        fragments.push(encoding.decode(&text[cursor..]));
        Ok(fragments)
    }

    /// Substitute matches in a host string with a template (which may
    /// carry `\N` / `\k<name>` back-references). With `all` false only
    /// the first match is replaced. Zero matches return the text
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use rescan::Regex;
    ///
    /// let re = Regex::new(r"(\w+) (\w+)").unwrap();
    /// let swapped = re.substitute("hello world", r"\2-\1", true).unwrap();
    /// assert_eq!(swapped, "world-hello");
    /// ```
    pub fn substitute(&self, text: &str, template: &str, all: bool) -> Result<String> {
        self.substitute_with(text, &mut Template::new(template), all)
    }

    /// Substitute with an explicit [`Replacer`] strategy.
    pub fn substitute_with<R: Replacer + ?Sized>(
        &self,
        text: &str,
        rep: &mut R,
        all: bool,
    ) -> Result<String> {
        rep.prepare(self)?;
        let element = TextElement::from_str(text);
        if !element.encoding().is_consistent(self.encoding()) {
            log::warn!("encoding of the text does not match the regex");
            return Ok(text.to_string());
        }
        self.substitute_element(&element, rep, all)
    }

    /// Substitute across every element of a text source with a template.
    pub fn substitute_source(
        &self,
        source: &mut TextSource,
        template: &str,
        all: bool,
    ) -> Result<Vec<String>> {
        self.substitute_source_with(source, &mut Template::new(template), all)
    }

    /// Substitute across every element of a text source with an explicit
    /// [`Replacer`] strategy. Encoding-inconsistent elements are returned
    /// verbatim (with a warning); the batch continues.
    pub fn substitute_source_with<R: Replacer + ?Sized>(
        &self,
        source: &mut TextSource,
        rep: &mut R,
        all: bool,
    ) -> Result<Vec<String>> {
        rep.prepare(self)?;
        let n = source.len();
        let mut results = Vec::with_capacity(n);
        for i in 0..n {
            let element = match source.element(i)? {
                Some(element) => element,
                None => {
                    results.push(String::new());
                    continue;
                }
            };
            if !element.encoding().is_consistent(self.encoding()) {
                log::warn!("encoding of text element {} does not match the regex", i);
                results.push(element.to_text());
                continue;
            }
            results.push(self.substitute_element(&element, rep, all)?);
        }
        Ok(results)
    }

    fn substitute_element<R: Replacer + ?Sized>(
        &self,
        element: &TextElement<'_>,
        rep: &mut R,
        all: bool,
    ) -> Result<String> {
        let encoding = element.encoding();
        let raw = match self.raw_search(element, all, 0)? {
            Some(raw) => raw,
            None => return Ok(element.to_text()),
        };
        let replacements = rep.replacements(self, &raw, element)?;
        let ranges: Vec<(usize, usize)> = (0..raw.match_count())
            .map(|m| {
                let whole = raw.whole(m);
                (whole.byte_offset, whole.byte_len)
            })
            .collect();
        let slices: Vec<&[u8]> = replacements.iter().map(|r| r.as_slice()).collect();
        Ok(encoding.decode(&splice(element.bytes(), &ranges, &slices)))
    }
}

/// Priority-ordered dispatch over `(pattern, template)` rules.
///
/// Each element is tried against the rules in order; the first matching
/// rule's template (expanded against that rule's own match) becomes the
/// element's result and later rules are ignored. An empty pattern is a
/// catch-all whose template is taken literally. Elements no rule covers
/// yield `None`.
///
/// Rule templates are validated against their own patterns before any
/// element is processed.
pub fn switch(
    source: &mut TextSource,
    rules: &[(&str, &str)],
    options: &str,
    encoding_name: Option<&str>,
) -> Result<Vec<Option<String>>> {
    struct Rule {
        regex: Option<Regex>,
        template: Template,
    }

    let mut compiled = Vec::with_capacity(rules.len());
    for (pattern, template) in rules {
        if pattern.is_empty() {
            compiled.push(Rule { regex: None, template: Template::literal(template) });
        } else {
            let mut builder = Regex::builder(pattern).option_string(options);
            if let Some(name) = encoding_name {
                builder = builder.encoding_name(name);
            }
            let regex = builder.build()?;
            let mut template = Template::new(template);
            template.resolve(&regex)?;
            compiled.push(Rule { regex: Some(regex), template });
        }
    }

    let n = source.len();
    let mut results = Vec::with_capacity(n);
    for i in 0..n {
        let element = match source.element(i)? {
            Some(element) => element,
            None => {
                results.push(None);
                continue;
            }
        };
        let encoding = element.encoding();
        let mut value = None;
        for rule in &compiled {
            match &rule.regex {
                None => {
                    value = Some(rule.template.text.clone());
                    break;
                }
                Some(regex) => {
                    if !encoding.is_consistent(regex.encoding()) {
                        log::warn!(
                            "encoding of text element {} does not match rule pattern",
                            i
                        );
                        continue;
                    }
                    if let Some(raw) = regex.raw_search(&element, false, 0)? {
                        value = Some(encoding.decode(&rule.template.expand(&raw, 0)));
                        break;
                    }
                }
            }
        }
        results.push(value);
    }
    Ok(results)
}
