//! Streaming DAWG construction via suffix minimization.
//!
//! Keys must be inserted in strictly ascending byte-lexicographic order.
//! Each insert walks the shared prefix of the in-progress tree, then
//! appends new nodes for the diverging suffix (plus one trailing
//! zero-label node marking the key's end). Subtrees that can no longer
//! gain siblings are `flush`ed: minimized against a hash table of
//! previously emitted equivalent subtrees and folded into the immutable
//! output arrays.

use std::cmp::Ordering;
use std::num::Wrapping;

use super::bit_vector::BitVector;
use super::graph::Graph;
use super::node::Node;
use super::unit::DawgUnit;
use crate::error::{Error, Result};

const INITIAL_TABLE_SIZE: usize = 1 << 10;

/// Mixer from <https://gist.github.com/badboy/6267743#32-bit-mix-functions>.
fn hash(key: u32) -> u32 {
    let mut k = Wrapping(key);
    k = !k + (k << 15);
    k ^= k >> 12;
    k += k << 2;
    k ^= k >> 4;
    k *= Wrapping(2057);
    k ^= k >> 16;
    k.0
}

pub struct DawgBuilder {
    nodes: Vec<Node>,
    units: Vec<DawgUnit>,
    labels: Vec<u8>,
    is_intersections: BitVector,
    table: Vec<usize>,
    node_stack: Vec<usize>,
    recycle_bin: Vec<usize>,
    num_states: usize,
}

impl Default for DawgBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DawgBuilder {
    pub fn new() -> Self {
        let mut b = DawgBuilder {
            nodes: Vec::new(),
            units: Vec::new(),
            labels: Vec::new(),
            is_intersections: BitVector::new(),
            table: vec![0; INITIAL_TABLE_SIZE],
            node_stack: Vec::new(),
            recycle_bin: Vec::new(),
            num_states: 0,
        };
        b.append_node();
        b.append_unit();
        b.num_states = 1;
        b.nodes[0].label = 0xFF;
        b.node_stack.push(0);
        b
    }

    /// Inserts `key` with `value`. Keys must arrive in strictly ascending
    /// order; a key out of order, empty, or containing a null byte fails.
    pub fn insert(&mut self, key: &[u8], value: u32) -> Result<()> {
        log::trace!("dawg insert: {} bytes, value {}", key.len(), value);
        if key.is_empty() {
            return Err(Error::InvalidInput("zero-length key".to_string()));
        }
        if key.contains(&0) {
            return Err(Error::InvalidInput("embedded null byte in key".to_string()));
        }
        let mut id = 0usize;
        let mut key_pos = 0usize;
        loop {
            if key_pos > key.len() {
                break;
            }
            let child_id = self.nodes[id].child as usize;
            if child_id == 0 {
                break;
            }
            let key_label = if key_pos < key.len() { key[key_pos] } else { 0 };
            let unit_label = self.nodes[child_id].label;
            match key_label.cmp(&unit_label) {
                Ordering::Less => {
                    return Err(Error::InvalidInput(format!(
                        "wrong key order at byte {key_pos}"
                    )));
                }
                Ordering::Greater => {
                    self.nodes[child_id].has_sibling = true;
                    self.flush(child_id)?;
                    break;
                }
                Ordering::Equal => {
                    id = child_id;
                    key_pos += 1;
                }
            }
        }
        if key_pos > key.len() {
            return Ok(());
        }
        while key_pos <= key.len() {
            let key_label = if key_pos < key.len() { key[key_pos] } else { 0 };
            let child_id = self.append_node();
            if self.nodes[id].child == 0 {
                self.nodes[child_id].is_state = true;
            }
            self.nodes[child_id].sibling = self.nodes[id].child as usize;
            self.nodes[child_id].label = key_label;
            self.nodes[id].child = child_id as u32;
            self.node_stack.push(child_id);
            id = child_id;
            key_pos += 1;
        }
        self.nodes[id].set_value(value);
        Ok(())
    }

    /// Flushes to the root and hands out the immutable, minimized graph.
    pub fn finish(mut self) -> Result<Graph> {
        self.flush(0)?;
        self.units[0] = self.nodes[0].unit();
        self.labels[0] = self.nodes[0].label;
        self.is_intersections.finish();
        log::debug!(
            "dawg finished: {} units, {} intersections",
            self.units.len(),
            self.is_intersections.num_ones()
        );
        Ok(Graph {
            units: self.units,
            labels: self.labels,
            is_intersections: self.is_intersections,
        })
    }

    fn flush(&mut self, boundary_id: usize) -> Result<()> {
        loop {
            let node_id = *self.node_stack.last().ok_or(Error::IndexOutOfBounds)?;
            if node_id == boundary_id {
                break;
            }
            self.node_stack.pop();
            if self.num_states >= self.table.len() - (self.table.len() >> 2) {
                self.expand_table();
            }
            let mut chain = Vec::new();
            let mut n = node_id;
            while n != 0 {
                chain.push(n);
                n = self.nodes[n].sibling;
            }
            let (found_id, hash_id) = self.find_node(node_id)?;
            let match_id = if found_id != 0 {
                self.is_intersections.set(found_id, true)?;
                found_id
            } else {
                let mut unit_id = 0;
                for _ in 0..chain.len() {
                    unit_id = self.append_unit();
                }
                for &n in &chain {
                    self.units[unit_id] = self.nodes[n].unit();
                    self.labels[unit_id] = self.nodes[n].label;
                    unit_id -= 1;
                }
                let new_match = unit_id + 1;
                self.table[hash_id] = new_match;
                self.num_states += 1;
                new_match
            };
            for &n in &chain {
                self.free_node(n);
            }
            let top = *self.node_stack.last().ok_or(Error::IndexOutOfBounds)?;
            self.nodes[top].child = match_id as u32;
        }
        self.node_stack.pop();
        Ok(())
    }

    fn expand_table(&mut self) {
        let table_size = self.table.len() << 1;
        self.table = vec![0; table_size];
        for id in 1..self.units.len() {
            if self.labels[id] == 0 || self.units[id].is_state() {
                let hash_id = self.find_unit(id);
                self.table[hash_id] = id;
            }
        }
    }

    fn find_unit(&self, id: usize) -> usize {
        let mut hash_id = (self.hash_unit(id) as usize) % self.table.len();
        loop {
            if self.table[hash_id] == 0 {
                return hash_id;
            }
            hash_id = (hash_id + 1) % self.table.len();
        }
    }

    fn find_node(&self, node_id: usize) -> Result<(usize, usize)> {
        let mut hash_id = (self.hash_node(node_id) as usize) % self.table.len();
        loop {
            let unit_id = self.table[hash_id];
            if unit_id == 0 {
                return Ok((0, hash_id));
            }
            if self.are_equal(node_id, unit_id) {
                return Ok((unit_id, hash_id));
            }
            hash_id = (hash_id + 1) % self.table.len();
        }
    }

    fn are_equal(&self, node_id: usize, unit_id: usize) -> bool {
        let mut unit_id = unit_id;
        let mut n = self.nodes[node_id].sibling;
        while n != 0 {
            if !self.units[unit_id].has_sibling() {
                return false;
            }
            unit_id += 1;
            n = self.nodes[n].sibling;
        }
        if self.units[unit_id].has_sibling() {
            return false;
        }
        let mut n = node_id;
        loop {
            if self.nodes[n].unit() != self.units[unit_id] || self.nodes[n].label != self.labels[unit_id] {
                return false;
            }
            n = self.nodes[n].sibling;
            if n == 0 {
                return true;
            }
            unit_id -= 1;
        }
    }

    fn hash_unit(&self, id: usize) -> u32 {
        let mut hash_value = 0u32;
        let mut id = id;
        loop {
            let u = self.units[id].0;
            let label = self.labels[id] as u32;
            hash_value ^= hash((label << 24) ^ u);
            if !self.units[id].has_sibling() {
                break;
            }
            id += 1;
        }
        hash_value
    }

    fn hash_node(&self, id: usize) -> u32 {
        let mut hash_value = 0u32;
        let mut n = id;
        while n != 0 {
            let u = self.nodes[n].unit().0;
            let label = self.nodes[n].label as u32;
            hash_value ^= hash((label << 24) ^ u);
            n = self.nodes[n].sibling;
        }
        hash_value
    }

    fn append_unit(&mut self) -> usize {
        self.is_intersections.append();
        self.units.push(DawgUnit::default());
        self.labels.push(0);
        self.is_intersections.len() - 1
    }

    fn append_node(&mut self) -> usize {
        if let Some(id) = self.recycle_bin.pop() {
            self.nodes[id].reset();
            id
        } else {
            let id = self.nodes.len();
            self.nodes.push(Node::default());
            id
        }
    }

    fn free_node(&mut self, id: usize) {
        self.recycle_bin.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixer_matches_known_values() {
        assert_eq!(hash(0), 3_399_731_875);
        assert_eq!(hash(1), 316_017_654);
    }

    #[test]
    fn rejects_zero_length_key() {
        let mut b = DawgBuilder::new();
        assert!(matches!(b.insert(b"", 0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn rejects_embedded_null() {
        let mut b = DawgBuilder::new();
        assert!(matches!(b.insert(b"a\0b", 0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn rejects_out_of_order_insert() {
        let mut b = DawgBuilder::new();
        b.insert(b"hello", 0).unwrap();
        b.insert(b"world", 1).unwrap();
        assert!(matches!(
            b.insert(b"hello", 2),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn builds_small_graph_and_shares_suffixes() {
        let mut b = DawgBuilder::new();
        for (i, k) in ["a", "aa", "b", "cc"].iter().enumerate() {
            b.insert(k.as_bytes(), i as u32).unwrap();
        }
        let g = b.finish().unwrap();
        assert!(g.size() > 0);
        assert!(g.num_intersections() <= g.size());
    }
}
