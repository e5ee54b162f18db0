//! Sorted, deduplicated key/value pairs handed to both builder paths.

use crate::error::{Error, Result};

/// A byte-lexicographically sorted, duplicate-free set of keys, with an
/// optional parallel array of values. When no values are supplied the
/// implicit value of a key is its post-sort index.
pub struct KeySet {
    keys: Vec<Vec<u8>>,
    values: Option<Vec<u32>>,
}

impl KeySet {
    /// Sorts `keys` (permuting `values` in lockstep, stably) if not
    /// already sorted, then rejects duplicates. Fails if `values` is
    /// supplied with a length different from `keys`, or if any key is
    /// zero-length (checked here rather than left to the DAWG builder,
    /// since the no-DAWG build path never visits it otherwise).
    pub fn new(keys: Vec<Vec<u8>>, values: Option<Vec<u32>>) -> Result<Self> {
        if let Some(v) = &values {
            if v.len() != keys.len() {
                return Err(Error::InvalidInput(format!(
                    "key/value count mismatch: {} keys, {} values",
                    keys.len(),
                    v.len()
                )));
            }
        }
        if keys.iter().any(|k| k.is_empty()) {
            return Err(Error::InvalidInput("zero-length key".to_string()));
        }
        let mut set = KeySet { keys, values };
        if !set.keys.windows(2).all(|w| w[0] <= w[1]) {
            set.sort();
        }
        for w in set.keys.windows(2) {
            if w[0] == w[1] {
                return Err(Error::InvalidInput(format!(
                    "duplicate key: {:?}",
                    String::from_utf8_lossy(&w[0])
                )));
            }
        }
        Ok(set)
    }

    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.keys.len()).collect();
        order.sort_by(|&a, &b| self.keys[a].cmp(&self.keys[b]));
        let keys = std::mem::take(&mut self.keys);
        let mut keys: Vec<Option<Vec<u8>>> = keys.into_iter().map(Some).collect();
        self.keys = order.iter().map(|&i| keys[i].take().unwrap()).collect();
        if let Some(values) = &mut self.values {
            let old = std::mem::take(values);
            let mut old: Vec<Option<u32>> = old.into_iter().map(Some).collect();
            *values = order.iter().map(|&i| old[i].take().unwrap()).collect();
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key(&self, id: usize) -> &[u8] {
        &self.keys[id]
    }

    /// Byte at `byte_id` within key `key_id`, or `0` past the end of the
    /// key. The zero-extension is load-bearing: it is how the no-DAWG
    /// build path recognizes a key has terminated.
    pub fn key_byte(&self, key_id: usize, byte_id: usize) -> u8 {
        let key = &self.keys[key_id];
        if byte_id >= key.len() {
            0
        } else {
            key[byte_id]
        }
    }

    pub fn has_values(&self) -> bool {
        self.values.is_some()
    }

    pub fn value(&self, id: usize) -> u32 {
        match &self.values {
            Some(v) => v[id],
            None => id as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    #[test]
    fn sorts_keys_and_permutes_values() {
        let keys = vec![k("bbb"), k("aaa")];
        let set = KeySet::new(keys, Some(vec![5, 7])).unwrap();
        assert_eq!(set.key(0), k("aaa").as_slice());
        assert_eq!(set.key(1), k("bbb").as_slice());
        assert_eq!(set.value(0), 7);
        assert_eq!(set.value(1), 5);
    }

    #[test]
    fn implicit_value_is_sorted_index() {
        let keys = vec![k("bbb"), k("aaa")];
        let set = KeySet::new(keys, None).unwrap();
        assert_eq!(set.value(0), 0);
        assert_eq!(set.value(1), 1);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let keys = vec![k("aaa"), k("aaa")];
        assert!(matches!(
            KeySet::new(keys, None),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_zero_length_key() {
        let keys = vec![k("aaa"), Vec::new()];
        assert!(matches!(
            KeySet::new(keys, None),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_mismatched_value_count() {
        let keys = vec![k("aaa"), k("bbb")];
        assert!(matches!(
            KeySet::new(keys, Some(vec![1])),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn key_byte_zero_extends_past_end() {
        let set = KeySet::new(vec![k("ab")], None).unwrap();
        assert_eq!(set.key_byte(0, 0), b'a');
        assert_eq!(set.key_byte(0, 1), b'b');
        assert_eq!(set.key_byte(0, 2), 0);
    }
}
