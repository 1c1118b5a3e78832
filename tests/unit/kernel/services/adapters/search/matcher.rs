use super::*;

fn spans(matcher: &LineMatcher, line: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    matcher.find_in_line(line, &mut out);
    out.into_iter().map(|s| (s.start, s.end)).collect()
}

#[test]
fn test_literal_case_insensitive() {
    let matcher = LineMatcher::new("foo", false, false).unwrap();
    assert_eq!(spans(&matcher, "Foo bar"), vec![(0, 3)]);
    assert_eq!(spans(&matcher, "foobar foo"), vec![(0, 3), (7, 10)]);
    assert!(spans(&matcher, "fo o").is_empty());
}

#[test]
fn test_literal_case_sensitive() {
    let matcher = LineMatcher::new("Foo", true, false).unwrap();
    assert_eq!(spans(&matcher, "Foo foo FOO"), vec![(0, 3)]);
}

#[test]
fn test_literal_matches_do_not_overlap() {
    let matcher = LineMatcher::new("aa", true, false).unwrap();
    assert_eq!(spans(&matcher, "aaaaa"), vec![(0, 2), (2, 4)]);
}

#[test]
fn test_columns_count_chars_not_bytes() {
    let matcher = LineMatcher::new("x", true, false).unwrap();
    assert_eq!(spans(&matcher, "héllo x wörld x"), vec![(6, 7), (14, 15)]);
}

#[test]
fn test_non_ascii_case_insensitive_literal() {
    let matcher = LineMatcher::new("Straße", false, false).unwrap();
    assert!(matcher.is_regex());
    assert_eq!(spans(&matcher, "die STRASSE, die straße"), vec![(17, 23)]);
}

#[test]
fn test_ascii_literal_folds_like_regex_on_non_ascii_lines() {
    let literal = LineMatcher::new("k", false, false).unwrap();
    let regex = LineMatcher::new("k", false, true).unwrap();
    let line = "\u{212A} é K";

    assert!(!literal.is_regex());
    assert_eq!(spans(&literal, line), vec![(0, 1), (4, 5)]);
    assert_eq!(spans(&literal, line), spans(&regex, line));
    assert_eq!(spans(&literal, "kK"), vec![(0, 1), (1, 2)]);
}

#[test]
fn test_literal_metacharacters_are_not_regex() {
    let matcher = LineMatcher::new("a.b", false, false).unwrap();
    assert!(!matcher.is_regex());
    assert_eq!(spans(&matcher, "axb a.b"), vec![(4, 7)]);
}

#[test]
fn test_regex_successive_matches() {
    let matcher = LineMatcher::new(r"\d+", true, true).unwrap();
    assert_eq!(spans(&matcher, "a1 b22 c333"), vec![(1, 2), (4, 6), (8, 11)]);
}

#[test]
fn test_regex_zero_width_terminates() {
    let matcher = LineMatcher::new("a*", true, true).unwrap();
    assert_eq!(spans(&matcher, "baab a"), vec![(1, 3), (5, 6)]);
    assert!(spans(&matcher, "bbb").is_empty());

    let anchors = LineMatcher::new(r"^|$|\b", true, true).unwrap();
    assert!(spans(&anchors, "word word").is_empty());
}

#[test]
fn test_regex_case_insensitive() {
    let matcher = LineMatcher::new("hel+o", false, true).unwrap();
    assert_eq!(spans(&matcher, "HELLO helo"), vec![(0, 5), (6, 10)]);
}

#[test]
fn test_input_errors() {
    assert!(matches!(
        LineMatcher::new("", false, false),
        Err(SearchError::EmptyQuery)
    ));
    assert!(matches!(
        LineMatcher::new("(unclosed", false, true),
        Err(SearchError::InvalidRegex(_))
    ));
    let request = SearchRequest::new("/tmp", "x").max_results(0);
    assert!(matches!(
        LineMatcher::for_request(&request),
        Err(SearchError::InvalidCap)
    ));
}
