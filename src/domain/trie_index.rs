//! # Trie Prefix Index
//!
//! Ordered map from nibble-path prefix to a trie-node descriptor, answering
//! "what is the most specific cached knowledge about the subtree containing
//! path P?". Populated exclusively by warming scans over the backing store's
//! trie-node bucket; never evicted within a view's lifetime, so its size is
//! bounded by the number of distinct trie nodes the view touches.

use std::collections::BTreeMap;

use super::errors::StateError;
use super::nibbles::Nibbles;

/// Summary of one trie node, keyed by its nibble-path prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrieNodeDescriptor {
    /// Subtree rooted here contains at least one live account.
    pub has_state: bool,
    /// Subtree has further internal branching below this node.
    pub has_tree: bool,
    /// A precomputed subtree hash is attached (informational here).
    pub has_hash: bool,
    /// The subtree's account entries have been fully materialized into the
    /// account cache. Only set after a complete, error-free subtree scan.
    pub loaded: bool,
}

impl TrieNodeDescriptor {
    const FLAG_HAS_STATE: u8 = 0b0000_0001;
    const FLAG_HAS_TREE: u8 = 0b0000_0010;
    const FLAG_HAS_HASH: u8 = 0b0000_0100;

    /// Decode the flags byte of a stored trie-node value.
    ///
    /// `loaded` is a cache-local notion and never comes from the store.
    pub fn decode(value: &[u8]) -> Result<Self, StateError> {
        let flags = *value
            .first()
            .ok_or_else(|| StateError::Decode("empty trie node value".into()))?;
        Ok(Self {
            has_state: flags & Self::FLAG_HAS_STATE != 0,
            has_tree: flags & Self::FLAG_HAS_TREE != 0,
            has_hash: flags & Self::FLAG_HAS_HASH != 0,
            loaded: false,
        })
    }

    /// Encode the flags byte for storing this descriptor.
    pub fn encode(&self) -> Vec<u8> {
        let mut flags = 0u8;
        if self.has_state {
            flags |= Self::FLAG_HAS_STATE;
        }
        if self.has_tree {
            flags |= Self::FLAG_HAS_TREE;
        }
        if self.has_hash {
            flags |= Self::FLAG_HAS_HASH;
        }
        vec![flags]
    }
}

/// Result of a deepest-prefix search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixMatch {
    pub prefix: Nibbles,
    pub has_state: bool,
    pub loaded: bool,
}

/// Ordered prefix-to-descriptor index over one view's trie knowledge.
#[derive(Debug, Default)]
pub struct TriePrefixIndex {
    nodes: BTreeMap<Vec<u8>, TrieNodeDescriptor>,
}

impl TriePrefixIndex {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Find the longest stored prefix of `path`.
    ///
    /// Returns `None` when the index holds no information at all about this
    /// region of the keyspace - not even a negative one. Among candidates
    /// the longest (most specific) prefix wins; equal-length prefixes of the
    /// same path are identical by construction, so ties cannot occur.
    pub fn find_deepest(&self, path: &Nibbles) -> Option<PrefixMatch> {
        for len in (1..=path.len()).rev() {
            if let Some(descriptor) = self.nodes.get(&path.as_slice()[..len]) {
                return Some(PrefixMatch {
                    prefix: Nibbles(path.as_slice()[..len].to_vec()),
                    has_state: descriptor.has_state,
                    loaded: descriptor.loaded,
                });
            }
        }
        None
    }

    /// Insert or overwrite a descriptor at `prefix`.
    pub fn insert(&mut self, prefix: Nibbles, has_state: bool, has_tree: bool, has_hash: bool) {
        self.nodes.insert(
            prefix.0,
            TrieNodeDescriptor {
                has_state,
                has_tree,
                has_hash,
                loaded: false,
            },
        );
    }

    /// Set `loaded = true` on the descriptor at `prefix`.
    ///
    /// The descriptor must exist: this is only called with a prefix returned
    /// by a preceding [`find_deepest`](Self::find_deepest).
    pub fn mark_loaded(&mut self, prefix: &Nibbles) {
        let descriptor = self.nodes.get_mut(prefix.as_slice());
        debug_assert!(descriptor.is_some(), "mark_loaded on unknown prefix");
        if let Some(descriptor) = descriptor {
            descriptor.loaded = true;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_deepest_prefers_longest() {
        let mut index = TriePrefixIndex::new();
        index.insert(Nibbles(vec![0x0A, 0x01]), true, false, false);
        index.insert(Nibbles(vec![0x0A, 0x01, 0x0B, 0x02]), true, true, false);

        let path = Nibbles(vec![0x0A, 0x01, 0x0B, 0x02, 0x0C, 0x03]);
        let found = index.find_deepest(&path).unwrap();
        assert_eq!(found.prefix, Nibbles(vec![0x0A, 0x01, 0x0B, 0x02]));
    }

    #[test]
    fn test_find_deepest_miss() {
        let mut index = TriePrefixIndex::new();
        index.insert(Nibbles(vec![0x0A]), true, false, false);

        assert!(index.find_deepest(&Nibbles(vec![0x0B, 0x01])).is_none());
    }

    #[test]
    fn test_mark_loaded() {
        let mut index = TriePrefixIndex::new();
        let prefix = Nibbles(vec![0x0F, 0x00]);
        index.insert(prefix.clone(), true, false, true);

        let found = index.find_deepest(&Nibbles(vec![0x0F, 0x00, 0x0A])).unwrap();
        assert!(!found.loaded);

        index.mark_loaded(&prefix);
        let found = index.find_deepest(&Nibbles(vec![0x0F, 0x00, 0x0A])).unwrap();
        assert!(found.loaded);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut index = TriePrefixIndex::new();
        let prefix = Nibbles(vec![0x01]);
        index.insert(prefix.clone(), false, false, false);
        index.insert(prefix.clone(), true, true, true);

        let found = index.find_deepest(&Nibbles(vec![0x01, 0x02])).unwrap();
        assert!(found.has_state);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_descriptor_flags_roundtrip() {
        let descriptor = TrieNodeDescriptor {
            has_state: true,
            has_tree: false,
            has_hash: true,
            loaded: false,
        };
        let decoded = TrieNodeDescriptor::decode(&descriptor.encode()).unwrap();
        assert_eq!(decoded, descriptor);
    }

    #[test]
    fn test_descriptor_decode_empty_value() {
        assert!(matches!(
            TrieNodeDescriptor::decode(&[]),
            Err(StateError::Decode(_))
        ));
    }
}
