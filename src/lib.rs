//! # dartrie
//!
//! A compact double-array TRIE for byte-string keys mapped to 32-bit
//! values — a port of `darts-clone`.
//!
//! Construction goes through an intermediate DAWG (directed acyclic word
//! graph) when values are supplied, so that keys sharing a common suffix
//! share storage; when no values are given the implicit value of a key is
//! its position in sorted order, and the DAWG step is skipped.
//!
//! ```
//! use dartrie::build;
//!
//! let keys = vec![b"apple".to_vec(), b"app".to_vec(), b"banana".to_vec()];
//! let trie = build(keys, Some(vec![10, 20, 30]), None).expect("build failed");
//! assert_eq!(trie.exact_match_search(b"app").unwrap(), Some((20, 3)));
//! assert_eq!(trie.common_prefix_search(b"apple", 0).unwrap().len(), 2);
//! ```

mod array;
mod dawg;
mod error;
mod keyset;
mod progress;

use std::path::Path;

pub use array::{MmappedTrie, Trie};
pub use error::{Error, Result};
pub use progress::{NullProgress, Progress};

/// Builds a double-array TRIE from `keys`, with an optional parallel
/// array of `values`. When `values` is `None` each key's value is its
/// position in sorted order. `progress` is polled once per DAWG insert
/// (or once per exhausted key on the no-DAWG path).
pub fn build(
    keys: Vec<Vec<u8>>,
    values: Option<Vec<u32>>,
    progress: Option<&dyn Progress>,
) -> Result<Trie> {
    let mut builder = array::DoubleArrayBuilder::new(progress);
    builder.build(keys, values)?;
    let mut bytes = Vec::new();
    builder.write(&mut bytes)?;
    Trie::read(&mut bytes.as_slice())
}

/// Reads a serialized double array fully into process memory.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Trie> {
    log::trace!("opening trie at {:?}", path.as_ref());
    let mut file = std::fs::File::open(path)?;
    Trie::read(&mut file)
}

/// Memory-maps a serialized double array read-only.
pub fn open_mmapped<P: AsRef<Path>>(path: P) -> Result<MmappedTrie> {
    log::trace!("mmapping trie at {:?}", path.as_ref());
    MmappedTrie::open(path)
}

pub use array::DoubleArrayBuilder;
