//! End-to-end build -> serialize -> reload -> query round trips, covering
//! the library's documented scenarios: exact match on present and absent
//! keys, UTF-8 byte strings treated as opaque byte sequences, common-prefix
//! enumeration, out-of-order insertion rejection, and deterministic
//! serialization.

use std::io::Write;

use dartrie::{build, open, open_mmapped, Error};

fn keys(strs: &[&str]) -> Vec<Vec<u8>> {
    strs.iter().map(|s| s.as_bytes().to_vec()).collect()
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn exact_match_on_present_key() {
    init_logging();
    let trie = build(keys(&["aaa", "bbb"]), Some(vec![7, 5]), None).unwrap();
    assert_eq!(trie.exact_match_search(b"aaa").unwrap(), Some((7, 3)));
}

#[test]
fn exact_match_on_absent_prefix() {
    let trie = build(keys(&["aaa", "bbb"]), Some(vec![7, 5]), None).unwrap();
    assert_eq!(trie.exact_match_search(b"a").unwrap(), None);
}

#[test]
fn exact_match_on_multibyte_keys_with_implicit_values() {
    let trie = build(
        keys(&["a", "aa", "b", "cc", "hello", "world", "こんにちは"]),
        None,
        None,
    )
    .unwrap();
    let needle = "こんにちは".as_bytes();
    assert_eq!(
        trie.exact_match_search(needle).unwrap(),
        Some((6, needle.len()))
    );
    assert_eq!(needle.len(), 15);
}

#[test]
fn common_prefix_search_over_nested_multibyte_keys() {
    let strs = [
        "電気",
        "電気通信",
        "電気通信大学",
        "電気通信大学大学院",
        "電気通信大学大学院大学",
    ];
    let trie = build(keys(&strs), None, None).unwrap();
    let needle = strs[4].as_bytes();
    let hits = trie.common_prefix_search(needle, 0).unwrap();
    let expected: Vec<(u32, usize)> = vec![(0, 6), (1, 12), (2, 18), (3, 27), (4, 33)];
    assert_eq!(hits, expected);
}

#[test]
fn rejects_duplicate_keys() {
    let err = build(keys(&["hello", "world", "hello"]), Some(vec![0, 1, 2]), None).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn serialized_length_is_deterministic() {
    let mut b1 = dartrie::DoubleArrayBuilder::new(None);
    b1.build(keys(&["a"]), Some(vec![0])).unwrap();
    let mut bytes1 = Vec::new();
    let written1 = b1.write(&mut bytes1).unwrap();

    let mut b2 = dartrie::DoubleArrayBuilder::new(None);
    b2.build(keys(&["a"]), Some(vec![0])).unwrap();
    let mut bytes2 = Vec::new();
    let written2 = b2.write(&mut bytes2).unwrap();

    assert_eq!(written1, written2);
    assert_eq!(bytes1, bytes2);
    assert_eq!(bytes1.len() as u64, written1);
    assert_eq!(written1 % 4, 0);
}

#[test]
fn round_trips_through_file_heap_and_mmap() {
    let mut builder = dartrie::DoubleArrayBuilder::new(None);
    let data = keys(&["alpha", "alphabet", "beta", "gamma"]);
    builder.build(data, Some(vec![1, 2, 3, 4])).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut bytes = Vec::new();
    builder.write(&mut bytes).unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let heap_trie = open(file.path()).unwrap();
    assert_eq!(heap_trie.exact_match_search(b"alpha").unwrap(), Some((1, 5)));
    assert_eq!(
        heap_trie.exact_match_search(b"alphabet").unwrap(),
        Some((2, 8))
    );

    let mmapped = open_mmapped(file.path()).unwrap();
    assert_eq!(mmapped.exact_match_search(b"beta").unwrap(), Some((3, 4)));
    assert_eq!(mmapped.exact_match_search(b"gamma").unwrap(), Some((4, 5)));
    assert_eq!(mmapped.exact_match_search(b"delta").unwrap(), None);
}

#[test]
fn rejects_empty_and_null_containing_keys() {
    let err = build(vec![Vec::new()], None, None).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = build(vec![b"a\0b".to_vec()], None, None).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
