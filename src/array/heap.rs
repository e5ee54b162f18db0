//! Heap-backed double array, loaded fully into a `Vec<u32>`.

use std::io::Read;

use super::query::{common_prefix_search, common_prefix_search_callback, exact_match_search, UnitArray};
use super::unit::Unit;
use crate::error::{Error, Result};

/// A double array loaded entirely into process memory.
pub struct Trie {
    array: Vec<u32>,
}

impl UnitArray for Trie {
    fn at(&self, id: u32) -> Result<Unit> {
        self.array
            .get(id as usize)
            .map(|&u| Unit(u))
            .ok_or(Error::IndexOutOfBounds)
    }
}

impl Trie {
    /// Reads the length-prefixed serialized form written by
    /// [`super::DoubleArrayBuilder::write`].
    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let mut len_buf = [0u8; 8];
        r.read_exact(&mut len_buf).map_err(|_| Error::BrokenHeader)?;
        let length = i64::from_le_bytes(len_buf);
        if length < 0 || length % 4 != 0 {
            return Err(Error::BrokenHeader);
        }
        let num_units = (length / 4) as usize;
        let mut array = Vec::with_capacity(num_units);
        let mut word = [0u8; 4];
        for _ in 0..num_units {
            r.read_exact(&mut word)?;
            array.push(u32::from_le_bytes(word));
        }
        Ok(Trie { array })
    }

    pub fn exact_match_search(&self, key: &[u8]) -> Result<Option<(u32, usize)>> {
        exact_match_search(self, key)
    }

    pub fn common_prefix_search(&self, key: &[u8], start_offset: usize) -> Result<Vec<(u32, usize)>> {
        common_prefix_search(self, key, start_offset)
    }

    pub fn common_prefix_search_callback(
        &self,
        key: &[u8],
        start_offset: usize,
        callback: impl FnMut(u32, usize),
    ) -> Result<()> {
        common_prefix_search_callback(self, key, start_offset, callback)
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }
}
