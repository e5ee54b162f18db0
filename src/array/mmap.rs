//! Memory-mapped double array, read directly off the page cache.
//!
//! The on-disk format is the same 8-byte little-endian length header plus
//! little-endian `u32` words that [`super::Trie::read`] consumes; the
//! header is mapped along with the payload and skipped on every access,
//! so the mmap path and the heap path agree on byte layout.

use std::fs::File;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};

use super::query::{common_prefix_search, common_prefix_search_callback, exact_match_search, UnitArray};
use super::unit::Unit;
use crate::error::{Error, Result};

const HEADER_SIZE: usize = 8;

/// A double array mapped read-only from a file.
pub struct MmappedTrie {
    mmap: Mmap,
    num_units: usize,
}

impl MmappedTrie {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        if mmap.len() < HEADER_SIZE {
            return Err(Error::BrokenHeader);
        }
        let mut len_buf = [0u8; 8];
        len_buf.copy_from_slice(&mmap[..HEADER_SIZE]);
        let length = i64::from_le_bytes(len_buf);
        if length < 0 || length % 4 != 0 {
            return Err(Error::BrokenHeader);
        }
        let num_units = (length / 4) as usize;
        if mmap.len() < HEADER_SIZE + num_units * 4 {
            return Err(Error::BrokenHeader);
        }
        Ok(MmappedTrie { mmap, num_units })
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
        self.num_units
    }

    pub fn is_empty(&self) -> bool {
        self.num_units == 0
    }
}

impl UnitArray for MmappedTrie {
    fn at(&self, id: u32) -> Result<Unit> {
        let id = id as usize;
        if id >= self.num_units {
            return Err(Error::IndexOutOfBounds);
        }
        let begin = HEADER_SIZE + id * 4;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.mmap[begin..begin + 4]);
        Ok(Unit(u32::from_le_bytes(word)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::builder::DoubleArrayBuilder;
    use std::io::Write as _;

    #[test]
    fn reads_through_mmap() {
        let mut builder = DoubleArrayBuilder::new(None);
        let keys = vec![b"apple".to_vec(), b"app".to_vec(), b"banana".to_vec()];
        builder.build(keys, Some(vec![10, 20, 30])).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut bytes = Vec::new();
        builder.write(&mut bytes).unwrap();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();

        let trie = MmappedTrie::open(file.path()).unwrap();
        assert_eq!(trie.exact_match_search(b"apple").unwrap(), Some((10, 5)));
        assert_eq!(trie.exact_match_search(b"banana").unwrap(), Some((30, 6)));
        assert_eq!(trie.common_prefix_search(b"apple", 0).unwrap().len(), 1);
    }
}
