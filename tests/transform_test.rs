// transform_test.rs - Integration tests for split, substitute and switch.

use rescan::prelude::*;

// === Split ===

#[test]
fn scenario_e_adjacent_separators() {
    let re = Regex::new(",").unwrap();
    assert_eq!(re.split("a,,b", 0).unwrap(), vec!["a", "", "b"]);
}

#[test]
fn split_without_matches_returns_the_input() {
    let re = Regex::new(";").unwrap();
    assert_eq!(re.split("a,b", 0).unwrap(), vec!["a,b"]);
}

#[test]
fn split_at_the_edges_yields_empty_fragments() {
    let re = Regex::new("-").unwrap();
    assert_eq!(re.split("-mid-", 0).unwrap(), vec!["", "mid", ""]);
}

#[test]
fn split_rejoin_reproduces_the_input() {
    let texts = ["a,b,,c", "no separators", ",", "x,y,z,"];
    let re = Regex::new(",").unwrap();
    for text in texts {
        let fragments = re.split(text, 0).unwrap();
        let matched: Vec<&str> = re
            .search(text, true, 0)
            .unwrap()
            .map(|m| vec![","; m.match_count()])
            .unwrap_or_default();
        assert_eq!(fragments.len(), matched.len() + 1);

        let mut rebuilt = String::new();
        for (i, fragment) in fragments.iter().enumerate() {
            rebuilt.push_str(fragment);
            if i < matched.len() {
                rebuilt.push_str(matched[i]);
            }
        }
        assert_eq!(rebuilt, text);
    }
}

#[test]
fn split_source_over_multiple_elements() {
    let re = Regex::new(" ").unwrap();
    let mut source = TextSource::from_strings(["a b", "cd"]);
    let results = re.split_source(&mut source, &[]).unwrap();
    assert_eq!(results[0], vec!["a", "b"]);
    assert_eq!(results[1], vec!["cd"]);
}

// === Substitute ===

#[test]
fn scenario_d_numbered_backreferences() {
    let re = Regex::new(r"(\w+) (\w+)").unwrap();
    assert_eq!(re.substitute("hello world", r"\2-\1", true).unwrap(), "world-hello");
}

#[test]
fn named_backreferences() {
    let re = Regex::new(r"(?<first>\w+) (?<second>\w+)").unwrap();
    let out = re.substitute("hello world", r"\k<second> \k<first>", true).unwrap();
    assert_eq!(out, "world hello");
}

#[test]
fn mixed_references_apply_in_template_order() {
    let re = Regex::new(r"(?<a>x)(y)").unwrap();
    let out = re.substitute("xy", r"[\2|\k<a>|\1]", true).unwrap();
    assert_eq!(out, "[y|x|x]");
}

#[test]
fn substitute_without_matches_is_identity() {
    let re = Regex::new("z").unwrap();
    assert_eq!(re.substitute("abc", "!", true).unwrap(), "abc");
}

#[test]
fn replacements_may_change_length() {
    let re = Regex::new("o").unwrap();
    assert_eq!(re.substitute("foo", "[0]", true).unwrap(), "f[0][0]");
    assert_eq!(re.substitute("foo", "", true).unwrap(), "f");
}

#[test]
fn unresolvable_name_is_fatal_before_any_substitution() {
    let re = Regex::new(r"(?<x>a)").unwrap();
    let err = re.substitute("aaa", r"\k<nope>", true).unwrap_err();
    assert!(matches!(err, Error::Reference { .. }));
}

#[test]
fn out_of_range_number_is_fatal() {
    let re = Regex::new("(a)(b)").unwrap();
    let err = re.substitute("ab", r"\3", true).unwrap_err();
    assert!(matches!(err, Error::Range { number: 3, count: 2 }));
}

#[test]
fn nonparticipating_group_expands_to_nothing() {
    let re = Regex::new("(a)?(b)").unwrap();
    assert_eq!(re.substitute("b", r"<\1\2>", true).unwrap(), "<b>");
}

#[test]
fn substitute_source_degrades_mismatched_elements() {
    let re = Regex::builder("x").encoding_name("latin1").build().unwrap();
    let mut source = TextSource::from_strings(["héllo x", "x marks"]);
    let results = re.substitute_source(&mut source, "_", true).unwrap();
    // The UTF-8 element comes back verbatim, the ASCII one substituted.
    assert_eq!(results[0], "héllo x");
    assert_eq!(results[1], "_ marks");
}

#[test]
fn callback_replacer_sees_matches_and_groups() {
    let re = Regex::new(r"(\d+)").unwrap();
    let mut doubler = |matches: &MatchSet| {
        (0..matches.match_count())
            .map(|m| {
                let n: u32 = matches.matched(m).unwrap().parse().unwrap();
                (n * 2).to_string()
            })
            .collect()
    };
    let out = re.substitute_with("3 and 7", &mut doubler, true).unwrap();
    assert_eq!(out, "6 and 14");
}

#[test]
fn callback_single_value_is_recycled() {
    let re = Regex::new("a").unwrap();
    let mut single = |_: &MatchSet| vec!["_".to_string()];
    let out = re.substitute_with("banana", &mut single, true).unwrap();
    assert_eq!(out, "b_n_n_");
}

// === Switch ===

#[test]
fn scenario_f_priority_dispatch_with_catch_all() {
    let mut source = TextSource::from_strings(["a", "b", "c"]);
    let results = switch(&mut source, &[("a", "A"), ("b", "B"), ("", "?")], "", None).unwrap();
    assert_eq!(
        results,
        vec![Some("A".to_string()), Some("B".to_string()), Some("?".to_string())]
    );
}

#[test]
fn switch_without_catch_all_leaves_none() {
    let mut source = TextSource::from_strings(["a", "z"]);
    let results = switch(&mut source, &[("a", "A")], "", None).unwrap();
    assert_eq!(results, vec![Some("A".to_string()), None]);
}

#[test]
fn switch_templates_expand_against_their_own_match() {
    let mut source = TextSource::from_strings(["width=80", "name"]);
    let rules = [(r"(\w+)=(\w+)", r"\1 is \2"), ("", "bare")];
    let results = switch(&mut source, &rules, "", None).unwrap();
    assert_eq!(results[0].as_deref(), Some("width is 80"));
    assert_eq!(results[1].as_deref(), Some("bare"));
}

#[test]
fn switch_earlier_rules_take_precedence() {
    let mut source = TextSource::from_strings(["ab"]);
    let results = switch(&mut source, &[("a", "first"), ("b", "second")], "", None).unwrap();
    assert_eq!(results[0].as_deref(), Some("first"));
}

#[test]
fn switch_honours_the_shared_option_string() {
    let mut source = TextSource::from_strings(["ABC"]);
    let results = switch(&mut source, &[("abc", "hit")], "i", None).unwrap();
    assert_eq!(results[0].as_deref(), Some("hit"));
}

#[test]
fn switch_rejects_bad_rule_templates_upfront() {
    let mut source = TextSource::from_strings(["a"]);
    let err = switch(&mut source, &[("(a)", r"\2")], "", None).unwrap_err();
    assert!(matches!(err, Error::Range { .. }));
}
