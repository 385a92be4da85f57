// api_test.rs - Integration tests for compilation and search.

use rescan::prelude::*;

// === Compilation ===

#[test]
fn simple_pattern() {
    let re = Regex::new(r"\d+").unwrap();
    let matches = re.search("abc 123 def", true, 0).unwrap().unwrap();
    assert_eq!(matches.matched(0), Some("123"));
}

#[test]
fn invalid_pattern_is_fatal() {
    let err = Regex::new("(unclosed").unwrap_err();
    assert!(matches!(err, Error::Compile { .. }));
    assert!(err.to_string().starts_with("compile error:"));
}

#[test]
fn unknown_syntax_name_is_fatal() {
    let err = Regex::builder("a").syntax_name("posix").build().unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn option_string_flags() {
    let re = Regex::builder("a.c").option_string("im").build().unwrap();
    assert!(re.options().contains(Options::CASELESS));
    assert!(re.options().contains(Options::MULTILINE));

    // Ruby-style multiline: `.` matches newline.
    let matches = re.search("A\nC", true, 0).unwrap().unwrap();
    assert_eq!(matches.matched(0), Some("A\nC"));
}

#[test]
fn unrecognised_option_characters_are_ignored() {
    let re = Regex::builder("a").option_string("zq!").build().unwrap();
    assert_eq!(re.options(), Options::empty());
}

#[test]
fn literal_syntax_matches_metacharacters_verbatim() {
    let re = Regex::builder("1+1=2").syntax(Syntax::Fixed).build().unwrap();
    let matches = re.search("fact: 1+1=2", true, 0).unwrap().unwrap();
    assert_eq!(matches.matched(0), Some("1+1=2"));
    assert!(re.search("111=2", true, 0).unwrap().is_none());
}

#[test]
fn fragment_composition_names_groups() {
    let re = Regex::from_fragments(&[
        Fragment::named("key", r"\w+"),
        Fragment::new(":"),
        Fragment::named("value", r"\w+"),
    ])
    .unwrap();
    assert_eq!(re.group_count(), 3);

    let matches = re.search("port:8080", true, 0).unwrap().unwrap();
    let groups = matches.groups().unwrap();
    assert_eq!(groups.matched(0, 0), Some("port"));
    assert_eq!(groups.matched(0, 2), Some("8080"));
    let names = groups.names().unwrap();
    assert_eq!(names[0].as_deref(), Some("key"));
    assert_eq!(names[1], None);
    assert_eq!(names[2].as_deref(), Some("value"));
}

#[test]
fn unknown_encoding_name_degrades_to_ascii() {
    let re = Regex::builder("a").encoding_name("EBCDIC").build().unwrap();
    assert_eq!(re.encoding(), Encoding::Ascii);
}

// === Search scenarios ===

#[test]
fn scenario_a_whole_match() {
    let re = Regex::new("a+").unwrap();
    let matches = re.search("baaab", true, 0).unwrap().unwrap();
    assert_eq!(matches.match_count(), 1);
    assert_eq!(matches.offsets(), &[1]);
    assert_eq!(matches.byte_lengths(), &[3]);
    assert_eq!(matches.matched(0), Some("aaa"));
}

#[test]
fn scenario_b_capture_groups() {
    let re = Regex::new("(a)(b)").unwrap();
    let matches = re.search("xaby", true, 0).unwrap().unwrap();
    assert_eq!(matches.offsets(), &[1]);
    assert_eq!(matches.lengths(), &[2]);
    assert_eq!(matches.matched(0), Some("ab"));
    let groups = matches.groups().unwrap();
    assert_eq!(groups.matched(0, 0), Some("a"));
    assert_eq!(groups.matched(0, 1), Some("b"));
}

#[test]
fn scenario_c_optional_group_no_participation() {
    let re = Regex::new("(a)?b").unwrap();
    let matches = re.search("b", true, 0).unwrap().unwrap();
    assert_eq!(matches.matched(0), Some("b"));
    // No participation is distinct from an empty capture.
    assert_eq!(matches.groups().unwrap().matched(0, 0), None);
}

#[test]
fn first_match_only() {
    let re = Regex::new(r"\w+").unwrap();
    let matches = re.search("one two three", false, 0).unwrap().unwrap();
    assert_eq!(matches.match_count(), 1);
    assert_eq!(matches.matched(0), Some("one"));
}

#[test]
fn start_offset_in_characters() {
    let re = Regex::new(r"\w+").unwrap();
    let matches = re.search("one two", true, 3).unwrap().unwrap();
    assert_eq!(matches.matched(0), Some("two"));

    // Multi-byte text: starting after the first two-byte char.
    let re = Regex::new("é").unwrap();
    let matches = re.search("éxé", true, 1).unwrap().unwrap();
    assert_eq!(matches.match_count(), 1);
    assert_eq!(matches.offsets(), &[2]);
    assert_eq!(matches.byte_offsets(), &[3]);
}

#[test]
fn char_and_byte_offsets_diverge_for_utf8() {
    let re = Regex::new(r"w\w+").unwrap();
    let matches = re.search("héllo wörld", true, 0).unwrap().unwrap();
    assert_eq!(matches.byte_offsets(), &[7]);
    assert_eq!(matches.offsets(), &[6]);
    assert_eq!(matches.lengths(), &[5]);
    assert_eq!(matches.byte_lengths(), &[6]);
    assert!(matches.lengths()[0] <= matches.byte_lengths()[0]);
}

#[test]
fn no_match_is_none() {
    let re = Regex::new("zz").unwrap();
    assert!(re.search("abc", true, 0).unwrap().is_none());
}

// === Batch search over sources ===

#[test]
fn search_source_per_element_results() {
    let re = Regex::new("a+").unwrap();
    let mut source = TextSource::from_strings(["aaa", "bbb", "ba"]);
    let results = re.search_source(&mut source, true, &[]).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().match_count(), 1);
    assert!(results[1].is_none());
    assert_eq!(results[2].as_ref().unwrap().offsets(), &[1]);
}

#[test]
fn encoding_mismatch_skips_only_that_element() {
    let re = Regex::builder("x").encoding_name("latin1").build().unwrap();
    let mut source = TextSource::from_strings(["héllo x", "plain x"]);
    let results = re.search_source(&mut source, true, &[]).unwrap();
    assert!(results[0].is_none());
    assert!(results[1].is_some());
}

// === Rendering ===

#[test]
fn printer_renders_context_and_match() {
    let re = Regex::new("aaa").unwrap();
    let matches = re.search("xxaaayy", true, 0).unwrap().unwrap();
    let out = MatchPrinter::new().render_to_string(&matches);
    assert_eq!(out, "context: xx   yy\n  match:   aaa\n\n");
}

#[test]
fn printer_colour_spans_are_balanced() {
    let re = Regex::new("a+").unwrap();
    let matches = re.search("xxaaayy", true, 0).unwrap().unwrap();
    let out = MatchPrinter::new().colour(true).render_to_string(&matches);
    assert_eq!(out.matches("\x1b[36m").count(), out.matches("\x1b[0m").count());
}
