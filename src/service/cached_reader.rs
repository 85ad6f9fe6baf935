//! # Cached Reader (Read-Through Facade)
//!
//! Wraps an underlying state reader and only reaches it when the answer is
//! not already cached. Account misses go through the trie-prefix index: a
//! single range scan over the backing store's hashed-account bucket warms
//! every account under the matched subtree at once, so later lookups in the
//! same region are in-memory hits.
//!
//! ## Warming discipline
//!
//! A subtree is marked loaded only after its range scan completed without
//! error. The scan is never cut short once the target is found: siblings
//! visited by the same scan are what make the loaded claim safe. A scan
//! that errors mid-way leaves already-decoded entries cached as Present but
//! the prefix unmarked, so a future lookup reattempts it.

use tracing::{debug, trace};

use crate::domain::{
    hash_address, Account, Address, CacheEntry, Hash, Nibbles, StateCache, StateError, StorageKey,
    TrieNodeDescriptor, EMPTY_CODE_HASH,
};
use crate::ports::{Bucket, KeyValueStore, StateReader};

/// Read-through facade over one state cache and one backing-store reader.
///
/// Borrows both and owns neither; one instance serves one view of state.
/// The `KeyValueStore` bound makes the store's scan capability an explicit
/// part of the dependency instead of something recovered via downcast.
pub struct CachedReader<'a, R> {
    reader: &'a mut R,
    cache: &'a mut StateCache,
}

impl<'a, R: StateReader + KeyValueStore> CachedReader<'a, R> {
    pub fn new(reader: &'a mut R, cache: &'a mut StateCache) -> Self {
        Self { reader, cache }
    }

    /// Populate the trie-prefix index from the store's trie-node bucket.
    ///
    /// Ancestor prefixes of any path sort before the path itself, so the
    /// scan has to start from the beginning of the bucket to see them; its
    /// size is bounded by the number of trie nodes, itself bounded by query
    /// locality.
    fn warm_trie_index(&mut self) -> Result<(), StateError> {
        let reader = &mut *self.reader;
        let cache = &mut *self.cache;
        let mut inserted = 0usize;
        reader.walk(Bucket::TrieOfAccounts, &[], 0, &mut |key, value| {
            let node = TrieNodeDescriptor::decode(value)?;
            cache.set_account_trie_read(
                Nibbles(key.to_vec()),
                node.has_state,
                node.has_tree,
                node.has_hash,
            );
            inserted += 1;
            Ok(true)
        })?;
        debug!(nodes = inserted, "warmed trie prefix index from store");
        Ok(())
    }

    /// Materialize every account under `prefix` into the hashed cache view
    /// with one range scan, returning the record for `hashed` if the scan
    /// produced it. Marks the prefix loaded only when the scan completed.
    fn warm_subtree(
        &mut self,
        prefix: &Nibbles,
        hashed: &Hash,
    ) -> Result<Option<Account>, StateError> {
        let (start_key, fixed_bits) = prefix.compress();
        let mut target: Option<Account> = None;
        let mut visited = 0usize;
        {
            let reader = &mut *self.reader;
            let cache = &mut *self.cache;
            reader.walk(
                Bucket::HashedAccounts,
                &start_key,
                fixed_bits,
                &mut |key, value| {
                    let key_hash: Hash = key.try_into().map_err(|_| {
                        StateError::Decode("hashed account key is not 32 bytes".into())
                    })?;
                    visited += 1;
                    // A previous partial warm may already hold this entry.
                    if let Some(account) = cache.get_account_by_hash(&key_hash) {
                        if key_hash == *hashed {
                            target = Some(account.clone());
                        }
                        return Ok(true);
                    }
                    let account = Account::decode_from_storage(value)?;
                    if key_hash == *hashed {
                        target = Some(account.clone());
                    }
                    cache.set_account_read_by_hash(key_hash, account);
                    // Keep scanning even after the target is found: loaded
                    // is only valid once the whole subtree was visited.
                    Ok(true)
                },
            )?;
        }
        self.cache.mark_account_trie_loaded(prefix);
        debug!(
            prefix = %hex::encode(&prefix.0),
            accounts = visited,
            found = target.is_some(),
            "warmed account subtree"
        );
        Ok(target)
    }

    /// Uncached point lookup through the underlying reader, recording the
    /// result so the next call is served from memory.
    fn read_account_fallback(
        &mut self,
        address: &Address,
    ) -> Result<Option<Account>, StateError> {
        let account = self.reader.read_account_data(address)?;
        match &account {
            Some(account) => self.cache.set_account_read(address, account.clone()),
            None => self.cache.set_account_absent(address),
        }
        Ok(account)
    }
}

impl<'a, R: StateReader + KeyValueStore> StateReader for CachedReader<'a, R> {
    fn read_account_data(&mut self, address: &Address) -> Result<Option<Account>, StateError> {
        if let Some(entry) = self.cache.get_account(address) {
            return Ok(match entry {
                CacheEntry::Present(account) => Some(account.clone()),
                CacheEntry::Absent => None,
            });
        }

        let hashed = hash_address(address);
        let path = Nibbles::from_bytes(&hashed);

        let mut matched = self.cache.find_deepest_account_trie(&path);
        if matched.is_none() {
            // One warming scan, one retry. If the index still has nothing,
            // the keyspace genuinely holds no summary for this region.
            self.warm_trie_index()?;
            matched = self.cache.find_deepest_account_trie(&path);
        }

        let Some(matched) = matched else {
            trace!(
                address = %hex::encode(address),
                "no trie summary, falling back to point lookup"
            );
            return self.read_account_fallback(address);
        };

        if !matched.has_state || matched.loaded {
            // The subtree holds no live account here, or it was already
            // fully materialized; either way the hashed view is
            // authoritative and no store access is needed.
            if let Some(account) = self.cache.get_account_by_hash(&hashed) {
                let account = account.clone();
                self.cache.set_account_read(address, account.clone());
                return Ok(Some(account));
            }
            self.cache.set_account_absent(address);
            return Ok(None);
        }

        let target = self.warm_subtree(&matched.prefix, &hashed)?;
        match &target {
            Some(account) => self.cache.set_account_read(address, account.clone()),
            None => self.cache.set_account_absent(address),
        }
        Ok(target)
    }

    fn read_account_storage(
        &mut self,
        address: &Address,
        incarnation: u64,
        key: &StorageKey,
    ) -> Result<Vec<u8>, StateError> {
        if let Some(entry) = self.cache.get_storage(address, incarnation, key) {
            return Ok(match entry {
                CacheEntry::Present(value) => value.clone(),
                CacheEntry::Absent => Vec::new(),
            });
        }
        let value = self.reader.read_account_storage(address, incarnation, key)?;
        if value.is_empty() {
            self.cache.set_storage_absent(address, incarnation, key);
        } else {
            self.cache
                .set_storage_read(address, incarnation, key, value.clone());
        }
        Ok(value)
    }

    fn read_account_code(
        &mut self,
        address: &Address,
        incarnation: u64,
        code_hash: &Hash,
    ) -> Result<Vec<u8>, StateError> {
        if *code_hash == EMPTY_CODE_HASH {
            return Ok(Vec::new());
        }
        if let Some(code) = self.cache.get_code(address, incarnation) {
            return Ok(code.to_vec());
        }
        let code = self.reader.read_account_code(address, incarnation, code_hash)?;
        // No-op above the size cutoff; oversized code stays store-backed.
        self.cache.set_code_read(address, incarnation, &code);
        Ok(code)
    }

    fn read_account_incarnation(&mut self, address: &Address) -> Result<u64, StateError> {
        if let Some(incarnation) = self.cache.get_deleted_account(address) {
            return Ok(incarnation);
        }
        self.reader.read_account_incarnation(address)
    }
}
