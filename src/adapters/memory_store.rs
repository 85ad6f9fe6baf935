//! In-memory implementation of [`KeyValueStore`] for tests and tooling.
//! Ordered buckets so range scans visit keys in ascending order, exactly as
//! a production store's cursor would.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::RwLock;

use crate::domain::{bit_prefix_matches, StateError};
use crate::ports::{Bucket, KeyValueStore, WalkVisitor};

/// In-memory backing store: one ordered map per bucket.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    buckets: RwLock<HashMap<Bucket, BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry (test/tooling setup; the read path never writes).
    pub fn put(&self, bucket: Bucket, key: Vec<u8>, value: Vec<u8>) {
        let mut buckets = self.buckets.write().unwrap_or_else(|e| e.into_inner());
        buckets.entry(bucket).or_default().insert(key, value);
    }

    pub fn len(&self, bucket: Bucket) -> usize {
        let buckets = self.buckets.read().unwrap_or_else(|e| e.into_inner());
        buckets.get(&bucket).map_or(0, |b| b.len())
    }

    pub fn is_empty(&self, bucket: Bucket) -> bool {
        self.len(bucket) == 0
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, bucket: Bucket, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        let buckets = self
            .buckets
            .read()
            .map_err(|_| StateError::Store("store lock poisoned".into()))?;
        Ok(buckets.get(&bucket).and_then(|b| b.get(key).cloned()))
    }

    fn walk(
        &self,
        bucket: Bucket,
        start_key: &[u8],
        fixed_bits: usize,
        visit: &mut WalkVisitor<'_>,
    ) -> Result<(), StateError> {
        let buckets = self
            .buckets
            .read()
            .map_err(|_| StateError::Store("store lock poisoned".into()))?;
        let Some(entries) = buckets.get(&bucket) else {
            return Ok(());
        };
        let range = entries.range::<[u8], _>((Bound::Included(start_key), Bound::Unbounded));
        for (key, value) in range {
            if !bit_prefix_matches(key, start_key, fixed_bits) {
                break;
            }
            if !visit(key, value)? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_roundtrip() {
        let store = InMemoryStore::new();
        store.put(Bucket::PlainAccounts, vec![0x01], vec![0xAA]);

        assert_eq!(
            store.get(Bucket::PlainAccounts, &[0x01]).unwrap(),
            Some(vec![0xAA])
        );
        assert_eq!(store.get(Bucket::PlainAccounts, &[0x02]).unwrap(), None);
        assert_eq!(store.get(Bucket::Code, &[0x01]).unwrap(), None);
    }

    #[test]
    fn test_walk_visits_in_ascending_order() {
        let store = InMemoryStore::new();
        store.put(Bucket::HashedAccounts, vec![0x02], vec![2]);
        store.put(Bucket::HashedAccounts, vec![0x01], vec![1]);
        store.put(Bucket::HashedAccounts, vec![0x03], vec![3]);

        let mut seen = Vec::new();
        store
            .walk(Bucket::HashedAccounts, &[], 0, &mut |k, _| {
                seen.push(k.to_vec());
                Ok(true)
            })
            .unwrap();
        assert_eq!(seen, vec![vec![0x01], vec![0x02], vec![0x03]]);
    }

    #[test]
    fn test_walk_respects_bit_prefix() {
        let store = InMemoryStore::new();
        // Keys under nibble prefix 0xF and one sibling just past it.
        store.put(Bucket::HashedAccounts, vec![0xF0, 0x00], vec![1]);
        store.put(Bucket::HashedAccounts, vec![0xF7, 0xFF], vec![2]);
        store.put(Bucket::HashedAccounts, vec![0xFF, 0x01], vec![3]);

        let mut seen = Vec::new();
        store
            .walk(Bucket::HashedAccounts, &[0xF0], 4, &mut |k, _| {
                seen.push(k.to_vec());
                Ok(true)
            })
            .unwrap();
        // All three share the top nibble 0xF.
        assert_eq!(seen.len(), 3);

        let mut seen = Vec::new();
        store
            .walk(Bucket::HashedAccounts, &[0xF0], 8, &mut |k, _| {
                seen.push(k.to_vec());
                Ok(true)
            })
            .unwrap();
        // Only the 0xF0-prefixed key matches a full-byte prefix.
        assert_eq!(seen, vec![vec![0xF0, 0x00]]);
    }

    #[test]
    fn test_walk_starts_at_key() {
        let store = InMemoryStore::new();
        store.put(Bucket::TrieOfAccounts, vec![0x01], vec![1]);
        store.put(Bucket::TrieOfAccounts, vec![0x05], vec![2]);

        let mut seen = Vec::new();
        store
            .walk(Bucket::TrieOfAccounts, &[0x02], 0, &mut |k, _| {
                seen.push(k.to_vec());
                Ok(true)
            })
            .unwrap();
        assert_eq!(seen, vec![vec![0x05]]);
    }

    #[test]
    fn test_walk_early_stop_and_error() {
        let store = InMemoryStore::new();
        store.put(Bucket::Storage, vec![0x01], vec![1]);
        store.put(Bucket::Storage, vec![0x02], vec![2]);

        let mut count = 0;
        store
            .walk(Bucket::Storage, &[], 0, &mut |_, _| {
                count += 1;
                Ok(false)
            })
            .unwrap();
        assert_eq!(count, 1);

        let result = store.walk(Bucket::Storage, &[], 0, &mut |_, _| {
            Err(StateError::Store("boom".into()))
        });
        assert!(result.is_err());
    }
}
