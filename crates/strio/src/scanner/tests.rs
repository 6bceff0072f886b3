use quickcheck::QuickCheck;
use rstest::rstest;

use super::*;
use crate::encoding::{BINARY, UTF_8};

fn records(input: &[u8], sep: &Separator, limit: Option<usize>, chomp: bool) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(r) = getline(input, pos, sep, limit, chomp, UTF_8) {
        out.push(input[r.start..r.end].to_vec());
        assert!(r.next > pos, "scanner must make progress");
        pos = r.next;
    }
    out
}

fn strs(v: &[&str]) -> Vec<Vec<u8>> {
    v.iter().map(|s| s.as_bytes().to_vec()).collect()
}

#[rstest]
#[case::keep(false, &["a\n", "b\r\n", "c"])]
#[case::chomp(true, &["a", "b", "c"])]
fn newline_records(#[case] chomp: bool, #[case] expected: &[&str]) {
    let sep = Separator::default();
    assert_eq!(records(b"a\nb\r\nc", &sep, None, chomp), strs(expected));
}

#[test]
fn chomp_strips_carriage_return_only_for_newline_separator() {
    let sep = Separator::from("|");
    assert_eq!(records(b"a\r|b", &sep, None, true), strs(&["a\r", "b"]));
}

#[rstest]
#[case::keep(false, &["a\n\n", "b\n\n", "c"])]
#[case::chomp(true, &["a", "b", "c"])]
fn paragraph_records(#[case] chomp: bool, #[case] expected: &[&str]) {
    assert_eq!(
        records(b"a\n\nb\n\nc", &Separator::Paragraph, None, chomp),
        strs(expected)
    );
}

#[test]
fn paragraph_skips_leading_newlines_and_absorbs_trailing_ones() {
    let input = b"\n\nfirst\nline\n\n\n\nsecond\r\n\r\nthird\n";
    assert_eq!(
        records(input, &Separator::Paragraph, None, false),
        strs(&["first\nline\n\n\n\n", "second\r\n\r\n", "third\n"])
    );
    assert_eq!(
        records(input, &Separator::Paragraph, None, true),
        strs(&["first\nline", "second", "third\n"])
    );
}

#[test]
fn paragraph_of_only_newlines_is_end_of_stream() {
    assert_eq!(
        getline(b"ab\n\n\n", 2, &Separator::Paragraph, None, false, UTF_8),
        None
    );
}

#[rstest]
#[case::keep(false, &["xx##", "yy##", "zz"])]
#[case::chomp(true, &["xx", "yy", "zz"])]
fn multibyte_separator(#[case] chomp: bool, #[case] expected: &[&str]) {
    let sep = Separator::from("##");
    assert_eq!(records(b"xx##yy##zz", &sep, None, chomp), strs(expected));
}

#[test]
fn multibyte_separator_long_window_takes_horspool_path() {
    let mut input = vec![b'x'; HORSPOOL_THRESHOLD + 10];
    input.extend_from_slice(b"##tail##");
    let sep = Separator::from("##");
    let got = records(&input, &sep, None, true);
    assert_eq!(got.len(), 2);
    assert_eq!(got[0], vec![b'x'; HORSPOOL_THRESHOLD + 10]);
    assert_eq!(got[1], b"tail");
}

#[rstest]
#[case::longer_than_window(b"ab", "abc", &["ab"])]
#[case::equal_to_window(b"abc", "abc", &["abc"])]
#[case::no_match(b"abcd", "xy", &["abcd"])]
fn multibyte_separator_edges(#[case] input: &[u8], #[case] sep: &str, #[case] expected: &[&str]) {
    assert_eq!(
        records(input, &Separator::from(sep), None, false),
        strs(expected)
    );
}

#[test]
fn separator_equal_to_window_is_chomped() {
    let r = getline(b"abc", 0, &Separator::from("abc"), None, true, UTF_8).unwrap();
    assert_eq!((r.start, r.end, r.next), (0, 0, 3));
}

#[rstest]
#[case::keep(false, "a\r\n")]
#[case::chomp(true, "a")]
fn no_separator_reads_whole_window(#[case] chomp: bool, #[case] expected: &str) {
    let r = getline(b"a\r\n", 0, &Separator::None, None, chomp, UTF_8).unwrap();
    assert_eq!(&b"a\r\n"[r.start..r.end], expected.as_bytes());
    assert_eq!(r.next, 3);
}

#[test]
fn limit_never_splits_a_character() {
    let input = "aé€b\n".as_bytes();
    // "a" + first byte of "é" would split it; the clamp moves right.
    let r = getline(input, 0, &Separator::default(), Some(2), false, UTF_8).unwrap();
    assert_eq!(&input[r.start..r.end], "aé".as_bytes());

    let r = getline(input, 0, &Separator::default(), Some(2), false, BINARY).unwrap();
    assert_eq!(&input[r.start..r.end], b"a\xC3");
}

#[test]
fn limit_larger_than_window_is_ignored() {
    let r = getline(b"abc", 1, &Separator::None, Some(10), false, UTF_8).unwrap();
    assert_eq!((r.start, r.end, r.next), (1, 3, 3));
}

#[test]
fn exhausted_window_is_end_of_stream() {
    assert_eq!(getline(b"abc", 3, &Separator::default(), None, false, UTF_8), None);
    assert_eq!(getline(b"abc", 7, &Separator::None, None, false, UTF_8), None);
}

#[test]
fn skip_table_matches_horspool_definition() {
    let table = SkipTable::new(b"abcab");
    assert_eq!(table.get(b'a'), 1);
    assert_eq!(table.get(b'b'), 3);
    assert_eq!(table.get(b'c'), 2);
    assert_eq!(table.get(b'z'), 5);
}

#[test]
fn separator_conversions() {
    assert_eq!(Separator::from(""), Separator::Paragraph);
    assert_eq!(Separator::from(None::<&str>), Separator::None);
    assert_eq!(Separator::from(Some("\n")), Separator::default());
}

#[test]
fn naive_and_horspool_agree() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(haystack: Vec<u8>, needle: Vec<u8>) -> bool {
        // A small alphabet makes matches likely.
        let haystack: Vec<u8> = haystack.iter().map(|b| b % 3).collect();
        let needle: Vec<u8> = needle.iter().take(4).map(|b| b % 3).collect();
        find_naive(&haystack, &needle) == find_horspool(&haystack, &needle)
    }

    QuickCheck::new()
        .tests(if is_ci::cached() { 10_000 } else { 1_000 })
        .quickcheck(prop as fn(Vec<u8>, Vec<u8>) -> bool);
}
