//! Double-array layout: the compact structure actually queried at
//! runtime, built from a DAWG or directly from a sorted key set.

pub(crate) mod builder;
mod heap;
mod mmap;
pub(crate) mod query;
mod unit;

pub use builder::DoubleArrayBuilder;
pub use heap::Trie;
pub use mmap::MmappedTrie;
pub use query::{common_prefix_search, common_prefix_search_callback, exact_match_search, UnitArray};
pub use unit::Unit;
