//! Query algorithms shared by the heap-backed and memory-mapped arrays.
//! Both implementors only need to provide random-access reads of
//! a unit by id; the traversal itself is written once here.

use super::unit::Unit;
use crate::error::Result;

/// Random access into a double array, implemented once for a heap-backed
/// `Vec<Unit>` and once for a memory-mapped byte slice.
pub trait UnitArray {
    fn at(&self, id: u32) -> Result<Unit>;
}

/// Walks `key` from the root; returns `(value, key.len())` on an exact
/// match, `None` if `key` is not a complete key in the trie.
pub fn exact_match_search<A: UnitArray>(arr: &A, key: &[u8]) -> Result<Option<(u32, usize)>> {
    let mut node_pos: u32 = 0;
    let mut unit = arr.at(node_pos)?;
    for &byte in key {
        node_pos ^= unit.offset() ^ byte as u32;
        unit = arr.at(node_pos)?;
        if unit.label() != byte {
            return Ok(None);
        }
    }
    if !unit.has_leaf() {
        return Ok(None);
    }
    let value_unit = arr.at(node_pos ^ unit.offset())?;
    Ok(Some((value_unit.value(), key.len())))
}

/// Collects every prefix of `key[start_offset..]` that is itself a
/// complete key, as `(value, matched_length)` pairs in ascending length
/// order. `matched_length` is measured from the start of `key`, not from
/// `start_offset`.
pub fn common_prefix_search<A: UnitArray>(
    arr: &A,
    key: &[u8],
    start_offset: usize,
) -> Result<Vec<(u32, usize)>> {
    let mut results = Vec::new();
    common_prefix_search_callback(arr, key, start_offset, |value, size| {
        results.push((value, size));
    })?;
    Ok(results)
}

/// Same traversal as [`common_prefix_search`], invoking `callback` for
/// each match instead of collecting a `Vec`.
pub fn common_prefix_search_callback<A: UnitArray>(
    arr: &A,
    key: &[u8],
    start_offset: usize,
    mut callback: impl FnMut(u32, usize),
) -> Result<()> {
    let mut node_pos: u32 = 0;
    let mut unit = arr.at(node_pos)?;
    node_pos ^= unit.offset();
    for i in start_offset..key.len() {
        let k = key[i];
        node_pos ^= k as u32;
        unit = arr.at(node_pos)?;
        if unit.label() != k {
            break;
        }
        node_pos ^= unit.offset();
        if unit.has_leaf() {
            let value_unit = arr.at(node_pos)?;
            callback(value_unit.value(), i + 1);
        }
    }
    Ok(())
}
