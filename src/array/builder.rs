//! Double-array layout: free-slot ring, block fixing, offset search, and
//! placement of either a DAWG or a raw sorted key set into one 32-bit-unit
//! array.

use std::io::Write;

use super::unit::Unit;
use crate::dawg::{DawgBuilder, Graph};
use crate::error::{Error, Result};
use crate::keyset::KeySet;
use crate::progress::Progress;

const BLOCK_SIZE: usize = 256;
const NUM_EXTRA_BLOCKS: usize = 16;
const NUM_EXTRAS: usize = BLOCK_SIZE * NUM_EXTRA_BLOCKS;

const UPPER_MASK: usize = 0xFF << 21;
const LOWER_MASK: usize = 0xFF;

#[derive(Clone, Copy, Default)]
struct ExtraUnit {
    prev: usize,
    next: usize,
    is_fixed: bool,
    is_used: bool,
}

/// Builds a double array from sorted keys, either via an intermediate
/// DAWG (when values are supplied) or directly from the sorted key range
/// (when every key's value is its post-sort index).
pub struct DoubleArrayBuilder<'p> {
    units: Vec<Unit>,
    extras: Vec<ExtraUnit>,
    labels: Vec<u8>,
    table: Vec<usize>,
    extras_head: usize,
    progress: Option<&'p dyn Progress>,
}

impl<'p> DoubleArrayBuilder<'p> {
    pub fn new(progress: Option<&'p dyn Progress>) -> Self {
        DoubleArrayBuilder {
            units: Vec::new(),
            extras: Vec::new(),
            labels: Vec::new(),
            table: Vec::new(),
            extras_head: 0,
            progress,
        }
    }

    pub fn build(&mut self, keys: Vec<Vec<u8>>, values: Option<Vec<u32>>) -> Result<()> {
        log::trace!("double-array build: {} keys", keys.len());
        let key_set = KeySet::new(keys, values)?;
        let result = if !key_set.has_values() {
            self.build_from_key_set_header(&key_set)
        } else {
            let graph = self.build_dawg(&key_set)?;
            self.build_from_dawg_header(&graph)
        };
        log::debug!("double-array build finished: {} units", self.units.len());
        result
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Writes the length-prefixed little-endian serialized form:
    /// an 8-byte `i64` payload length followed by the units themselves.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<u64> {
        let payload = (self.units.len() * 4) as i64;
        w.write_all(&payload.to_le_bytes())?;
        let mut written = 8u64;
        for u in &self.units {
            w.write_all(&u.0.to_le_bytes())?;
            written += 4;
        }
        Ok(written)
    }

    fn build_dawg(&self, key_set: &KeySet) -> Result<Graph> {
        let mut builder = DawgBuilder::new();
        for i in 0..key_set.len() {
            builder.insert(key_set.key(i), key_set.value(i))?;
            if let Some(p) = self.progress {
                p.increment(1);
            }
        }
        builder.finish()
    }

    fn build_from_dawg_header(&mut self, g: &Graph) -> Result<()> {
        let mut num_units = 1;
        while num_units < g.size() {
            num_units <<= 1;
        }
        self.table = vec![0; g.num_intersections()];
        self.extras = vec![ExtraUnit::default(); NUM_EXTRAS];
        self.extras_head = 0;
        self.units.reserve(num_units);

        self.reserve_id(0);
        self.extras[Self::idx(0)].is_used = true;
        self.units[0].set_offset(1)?;
        self.units[0].set_label(0);

        if g.child(Graph::root())? != 0 {
            self.build_from_dawg_insert(g, Graph::root(), 0)?;
        }
        self.fix_all_blocks();
        self.extras.clear();
        self.labels.clear();
        self.table.clear();
        Ok(())
    }

    fn build_from_dawg_insert(&mut self, g: &Graph, dawg_id: u32, dic_id: usize) -> Result<()> {
        let dawg_child_id = g.child(dawg_id)?;
        if g.is_intersection(dawg_child_id)? {
            let intersection_id = g.intersection_id(dawg_child_id)?;
            let memoized = self.table[intersection_id];
            if memoized != 0 {
                let rel = memoized ^ dic_id;
                if (rel & LOWER_MASK) == 0 || (rel & UPPER_MASK) == 0 {
                    if g.is_leaf(dawg_child_id)? {
                        self.units[dic_id].set_has_leaf(true);
                    }
                    self.units[dic_id].set_offset(rel as u32)?;
                    return Ok(());
                }
            }
        }

        let offset = self.arrange_from_dawg(g, dawg_id, dic_id)?;
        if g.is_intersection(dawg_child_id)? {
            let iid = g.intersection_id(dawg_child_id)?;
            self.table[iid] = offset;
        }

        let mut child = dawg_child_id;
        loop {
            let label = g.label(child)?;
            let dic_child_id = offset ^ label as usize;
            if label != 0 {
                self.build_from_dawg_insert(g, child, dic_child_id)?;
            }
            child = g.sibling(child)?;
            if child == 0 {
                break;
            }
        }
        Ok(())
    }

    fn arrange_from_dawg(&mut self, g: &Graph, dawg_id: u32, dic_id: usize) -> Result<usize> {
        if dic_id >= self.units.len() {
            return Err(Error::IndexOutOfBounds);
        }
        self.labels.clear();
        let mut child = g.child(dawg_id)?;
        while child != 0 {
            self.labels.push(g.label(child)?);
            child = g.sibling(child)?;
        }

        let offset = self.find_valid_offset(dic_id);
        self.units[dic_id].set_offset((dic_id ^ offset) as u32)?;

        let labels = self.labels.clone();
        let mut child = g.child(dawg_id)?;
        for label in labels {
            let dic_child_id = offset ^ label as usize;
            self.reserve_id(dic_child_id);
            if g.is_leaf(child)? {
                self.units[dic_id].set_has_leaf(true);
                let v = g.value(child)?;
                self.units[dic_child_id].set_value(v);
            } else {
                self.units[dic_child_id].set_label(label);
            }
            child = g.sibling(child)?;
        }
        self.extras[Self::idx(offset)].is_used = true;
        Ok(offset)
    }

    fn build_from_key_set_header(&mut self, key_set: &KeySet) -> Result<()> {
        let mut num_units = 1;
        while num_units < key_set.len() {
            num_units <<= 1;
        }
        self.extras = vec![ExtraUnit::default(); NUM_EXTRAS];
        self.extras_head = 0;
        self.units.reserve(num_units);

        self.reserve_id(0);
        self.extras[Self::idx(0)].is_used = true;
        self.units[0].set_offset(1)?;
        self.units[0].set_label(0);

        if !key_set.is_empty() {
            self.build_from_key_set_insert(key_set, 0, key_set.len(), 0, 0)?;
        }
        self.fix_all_blocks();
        self.extras.clear();
        self.labels.clear();
        Ok(())
    }

    fn build_from_key_set_insert(
        &mut self,
        key_set: &KeySet,
        begin: usize,
        end: usize,
        depth: usize,
        dic_id: usize,
    ) -> Result<()> {
        let offset = self.arrange_from_key_set(key_set, begin, end, depth, dic_id)?;
        let mut begin = begin;
        while begin < end && key_set.key_byte(begin, depth) == 0 {
            begin += 1;
        }
        if begin == end {
            return Ok(());
        }
        let mut last_begin = begin;
        let mut last_label = key_set.key_byte(begin, depth);
        loop {
            begin += 1;
            if begin >= end {
                break;
            }
            let label = key_set.key_byte(begin, depth);
            if label != last_label {
                self.build_from_key_set_insert(
                    key_set,
                    last_begin,
                    begin,
                    depth + 1,
                    offset ^ last_label as usize,
                )?;
                last_begin = begin;
                last_label = key_set.key_byte(begin, depth);
            }
        }
        self.build_from_key_set_insert(
            key_set,
            last_begin,
            end,
            depth + 1,
            offset ^ last_label as usize,
        )?;
        Ok(())
    }

    fn arrange_from_key_set(
        &mut self,
        key_set: &KeySet,
        begin: usize,
        end: usize,
        depth: usize,
        dic_id: usize,
    ) -> Result<usize> {
        self.labels.clear();
        let mut value: Option<u32> = None;
        for i in begin..end {
            let label = key_set.key_byte(i, depth);
            if label == 0 {
                if depth < key_set.key(i).len() {
                    return Err(Error::InvalidInput("embedded null byte in key".to_string()));
                }
                if value.is_none() {
                    value = Some(key_set.value(i));
                }
                if let Some(p) = self.progress {
                    p.increment(1);
                }
            }
            match self.labels.last() {
                None => self.labels.push(label),
                Some(&last) if label != last => {
                    if label < last {
                        return Err(Error::InvalidInput("wrong key order".to_string()));
                    }
                    self.labels.push(label);
                }
                _ => {}
            }
        }

        let offset = self.find_valid_offset(dic_id);
        if dic_id >= self.units.len() {
            return Err(Error::IndexOutOfBounds);
        }
        self.units[dic_id].set_offset((dic_id ^ offset) as u32)?;

        let labels = self.labels.clone();
        for label in labels {
            let dic_child_id = offset ^ label as usize;
            self.reserve_id(dic_child_id);
            if label != 0 {
                self.units[dic_child_id].set_label(label);
            } else {
                self.units[dic_id].set_has_leaf(true);
                self.units[dic_child_id].set_value(value.unwrap_or(0));
            }
        }
        self.extras[Self::idx(offset)].is_used = true;
        Ok(offset)
    }

    fn find_valid_offset(&self, id: usize) -> usize {
        if self.extras_head >= self.units.len() {
            return self.units.len() | (id & LOWER_MASK);
        }
        let mut unfixed_id = self.extras_head;
        loop {
            let offset = unfixed_id ^ (self.labels[0] as usize);
            if self.is_valid_offset(id, offset) {
                return offset;
            }
            unfixed_id = self.extras[Self::idx(unfixed_id)].next;
            if unfixed_id == self.extras_head {
                break;
            }
        }
        self.units.len() | (id & LOWER_MASK)
    }

    fn is_valid_offset(&self, id: usize, offset: usize) -> bool {
        if self.extras[Self::idx(offset)].is_used {
            return false;
        }
        let rel_offset = id ^ offset;
        if (rel_offset & LOWER_MASK) != 0 && (rel_offset & UPPER_MASK) != 0 {
            return false;
        }
        for &label in &self.labels[1..] {
            if self.extras[Self::idx(offset ^ label as usize)].is_fixed {
                return false;
            }
        }
        true
    }

    fn reserve_id(&mut self, id: usize) {
        if id >= self.units.len() {
            self.expand_units();
        }
        if id == self.extras_head {
            self.extras_head = self.extras[Self::idx(id)].next;
            if self.extras_head == id {
                self.extras_head = self.units.len();
            }
        }
        let prev = self.extras[Self::idx(id)].prev;
        let next = self.extras[Self::idx(id)].next;
        self.extras[Self::idx(prev)].next = next;
        self.extras[Self::idx(next)].prev = prev;
        self.extras[Self::idx(id)].is_fixed = true;
    }

    fn expand_units(&mut self) {
        let src = self.units.len();
        let src_blocks = self.num_blocks();
        let dest = src + BLOCK_SIZE;
        let dest_blocks = src_blocks + 1;

        if dest_blocks > NUM_EXTRA_BLOCKS {
            self.fix_block(src_blocks - NUM_EXTRA_BLOCKS);
        }
        self.units.resize(dest, Unit::default());
        if dest_blocks > NUM_EXTRA_BLOCKS {
            for id in src..dest {
                let idx = Self::idx(id);
                self.extras[idx].is_used = false;
                self.extras[idx].is_fixed = false;
            }
        }
        for i in (src + 1)..dest {
            self.extras[Self::idx(i - 1)].next = i;
            self.extras[Self::idx(i)].prev = i - 1;
        }
        // The remaining splice steps are written in the same order the
        // reference implementation performs them: several of these writes
        // are themselves overwritten before being read back, except in the
        // bootstrap case (extras_head falling inside [src, dest)), where
        // the overwritten value is exactly what the later self-referential
        // read needs. Reordering or dropping the "dead" writes changes
        // behavior on that path, so the sequence is kept literal.
        self.extras[Self::idx(src)].prev = dest - 1;
        self.extras[Self::idx(dest - 1)].next = src;

        self.extras[Self::idx(src)].prev = self.extras[Self::idx(self.extras_head)].prev;
        self.extras[Self::idx(dest - 1)].next = self.extras_head;

        let tail = self.extras[Self::idx(self.extras_head)].prev;
        self.extras[Self::idx(tail)].next = src;
        self.extras[Self::idx(self.extras_head)].prev = dest - 1;
    }

    fn fix_all_blocks(&mut self) {
        let mut begin = 0;
        if self.num_blocks() > NUM_EXTRA_BLOCKS {
            begin = self.num_blocks() - NUM_EXTRA_BLOCKS;
        }
        let end = self.num_blocks();
        for block_id in begin..end {
            self.fix_block(block_id);
        }
    }

    fn fix_block(&mut self, block_id: usize) {
        let begin = block_id * BLOCK_SIZE;
        let end = begin + BLOCK_SIZE;
        let mut unused_offset = begin;
        for offset in begin..end {
            if !self.extras[Self::idx(offset)].is_used {
                unused_offset = offset;
                break;
            }
        }
        for id in begin..end {
            if !self.extras[Self::idx(id)].is_fixed {
                self.reserve_id(id);
                self.units[id].set_label((id ^ unused_offset) as u8);
            }
        }
    }

    fn num_blocks(&self) -> usize {
        self.units.len() / BLOCK_SIZE
    }

    fn idx(id: usize) -> usize {
        id % NUM_EXTRAS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::query::{exact_match_search, UnitArray};

    struct Slice<'a>(&'a [Unit]);
    impl<'a> UnitArray for Slice<'a> {
        fn at(&self, i: u32) -> Result<Unit> {
            self.0.get(i as usize).copied().ok_or(Error::IndexOutOfBounds)
        }
    }

    #[test]
    fn builds_and_finds_simple_keys() {
        let mut b = DoubleArrayBuilder::new(None);
        b.build(
            vec![b"aaa".to_vec(), b"bbb".to_vec()],
            Some(vec![7, 5]),
        )
        .unwrap();
        let arr = Slice(b.units());
        assert_eq!(exact_match_search(&arr, b"aaa").unwrap(), Some((7, 3)));
        assert_eq!(exact_match_search(&arr, b"bbb").unwrap(), Some((5, 3)));
        assert_eq!(exact_match_search(&arr, b"a").unwrap(), None);
    }

    #[test]
    fn builds_without_values_using_implicit_index() {
        let mut b = DoubleArrayBuilder::new(None);
        b.build(vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()], None)
            .unwrap();
        let arr = Slice(b.units());
        assert_eq!(exact_match_search(&arr, b"a").unwrap(), Some((0, 1)));
        assert_eq!(exact_match_search(&arr, b"b").unwrap(), Some((1, 1)));
        assert_eq!(exact_match_search(&arr, b"c").unwrap(), Some((2, 1)));
    }

    #[test]
    fn handles_many_keys_spanning_multiple_blocks() {
        let mut keys: Vec<Vec<u8>> = (0..2000u32)
            .map(|i| format!("key-{i:06}").into_bytes())
            .collect();
        keys.sort();
        let mut b = DoubleArrayBuilder::new(None);
        b.build(keys.clone(), None).unwrap();
        let arr = Slice(b.units());
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(
                exact_match_search(&arr, k).unwrap(),
                Some((i as u32, k.len()))
            );
        }
    }
}
