//! # State Cache (Per-View Tri-State Maps)
//!
//! Owns the trie-prefix index and the four entity maps: accounts, storage
//! slots, code blobs and deleted-account markers. Every map distinguishes
//! Present / Absent / Unknown so confirmed misses never re-trigger store
//! access.
//!
//! One instance covers one logical view of state (one block's execution)
//! and is discarded or cleared when the view ends. Single-writer; no
//! internal locking.

use std::collections::HashMap;

use super::entities::{Account, Address, Hash, StorageKey, CODE_CACHE_SIZE_LIMIT};
use super::nibbles::Nibbles;
use super::trie_index::{PrefixMatch, TriePrefixIndex};

/// A cached answer: confirmed value or confirmed absence.
/// "Unknown" is the key not being in the map at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheEntry<T> {
    Present(T),
    Absent,
}

/// Storage slots are scoped to an incarnation: an old incarnation's cached
/// value must never satisfy a newer incarnation's lookup and vice versa.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StorageCacheKey {
    address: Address,
    incarnation: u64,
    key: StorageKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CodeCacheKey {
    address: Address,
    incarnation: u64,
}

/// Per-view state cache: trie-prefix index plus tri-state entity maps.
#[derive(Debug, Default)]
pub struct StateCache {
    /// Flat view keyed by raw address; written by direct reads and by
    /// absence conclusions.
    accounts: HashMap<Address, CacheEntry<Account>>,
    /// Hashed view keyed by hashed address; written by warming scans, where
    /// only the hash is known until decoding.
    accounts_by_hash: HashMap<Hash, Account>,
    storage: HashMap<StorageCacheKey, CacheEntry<Vec<u8>>>,
    code: HashMap<CodeCacheKey, Vec<u8>>,
    /// Last known incarnation of accounts deleted during this view.
    deleted: HashMap<Address, u64>,
    trie: TriePrefixIndex,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    pub fn get_account(&self, address: &Address) -> Option<&CacheEntry<Account>> {
        self.accounts.get(address)
    }

    pub fn set_account_read(&mut self, address: &Address, account: Account) {
        self.accounts.insert(*address, CacheEntry::Present(account));
    }

    pub fn set_account_absent(&mut self, address: &Address) {
        self.accounts.insert(*address, CacheEntry::Absent);
    }

    pub fn get_account_by_hash(&self, hashed: &Hash) -> Option<&Account> {
        self.accounts_by_hash.get(hashed)
    }

    pub fn set_account_read_by_hash(&mut self, hashed: Hash, account: Account) {
        self.accounts_by_hash.insert(hashed, account);
    }

    // =========================================================================
    // STORAGE SLOTS
    // =========================================================================

    pub fn get_storage(
        &self,
        address: &Address,
        incarnation: u64,
        key: &StorageKey,
    ) -> Option<&CacheEntry<Vec<u8>>> {
        self.storage.get(&StorageCacheKey {
            address: *address,
            incarnation,
            key: *key,
        })
    }

    pub fn set_storage_read(
        &mut self,
        address: &Address,
        incarnation: u64,
        key: &StorageKey,
        value: Vec<u8>,
    ) {
        self.storage.insert(
            StorageCacheKey {
                address: *address,
                incarnation,
                key: *key,
            },
            CacheEntry::Present(value),
        );
    }

    pub fn set_storage_absent(&mut self, address: &Address, incarnation: u64, key: &StorageKey) {
        self.storage.insert(
            StorageCacheKey {
                address: *address,
                incarnation,
                key: *key,
            },
            CacheEntry::Absent,
        );
    }

    // =========================================================================
    // CODE
    // =========================================================================

    pub fn get_code(&self, address: &Address, incarnation: u64) -> Option<&[u8]> {
        self.code
            .get(&CodeCacheKey {
                address: *address,
                incarnation,
            })
            .map(|c| c.as_slice())
    }

    /// Retain a code blob. No-op above [`CODE_CACHE_SIZE_LIMIT`]: large
    /// contracts are re-fetched from the store instead of held in memory.
    pub fn set_code_read(&mut self, address: &Address, incarnation: u64, code: &[u8]) {
        if code.len() > CODE_CACHE_SIZE_LIMIT {
            return;
        }
        self.code.insert(
            CodeCacheKey {
                address: *address,
                incarnation,
            },
            code.to_vec(),
        );
    }

    // =========================================================================
    // DELETED-ACCOUNT MARKERS
    // =========================================================================

    pub fn get_deleted_account(&self, address: &Address) -> Option<u64> {
        self.deleted.get(address).copied()
    }

    /// Record that `address` was deleted in this view at `incarnation`, so a
    /// later contract recreation can derive the next incarnation without a
    /// store round trip.
    pub fn set_account_deleted(&mut self, address: &Address, incarnation: u64) {
        self.deleted.insert(*address, incarnation);
    }

    // =========================================================================
    // TRIE PREFIX INDEX
    // =========================================================================

    pub fn find_deepest_account_trie(&self, path: &Nibbles) -> Option<PrefixMatch> {
        self.trie.find_deepest(path)
    }

    pub fn set_account_trie_read(
        &mut self,
        prefix: Nibbles,
        has_state: bool,
        has_tree: bool,
        has_hash: bool,
    ) {
        self.trie.insert(prefix, has_state, has_tree, has_hash);
    }

    pub fn mark_account_trie_loaded(&mut self, prefix: &Nibbles) {
        self.trie.mark_loaded(prefix);
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Invalidate the whole view.
    pub fn clear(&mut self) {
        self.accounts.clear();
        self.accounts_by_hash.clear();
        self.storage.clear();
        self.code.clear();
        self.deleted.clear();
        self.trie.clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            accounts: self.accounts.len(),
            hashed_accounts: self.accounts_by_hash.len(),
            storage_slots: self.storage.len(),
            code_entries: self.code.len(),
            deleted_markers: self.deleted.len(),
            trie_nodes: self.trie.len(),
        }
    }
}

/// Cache statistics for monitoring.
#[derive(Clone, Debug)]
pub struct CacheStats {
    pub accounts: usize,
    pub hashed_accounts: usize,
    pub storage_slots: usize,
    pub code_entries: usize,
    pub deleted_markers: usize,
    pub trie_nodes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_tri_state() {
        let mut cache = StateCache::new();
        let addr = [0x01; 20];

        // Unknown until written
        assert!(cache.get_account(&addr).is_none());

        cache.set_account_absent(&addr);
        assert_eq!(cache.get_account(&addr), Some(&CacheEntry::Absent));

        cache.set_account_read(&addr, Account::new(500));
        match cache.get_account(&addr) {
            Some(CacheEntry::Present(a)) => assert_eq!(a.balance, 500),
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn test_storage_incarnation_isolation() {
        let mut cache = StateCache::new();
        let addr = [0x02; 20];
        let key = [0x03; 32];

        cache.set_storage_read(&addr, 1, &key, vec![0xAA]);

        // Same slot, newer incarnation: unknown, not v1
        assert!(cache.get_storage(&addr, 2, &key).is_none());
        assert_eq!(
            cache.get_storage(&addr, 1, &key),
            Some(&CacheEntry::Present(vec![0xAA]))
        );
    }

    #[test]
    fn test_storage_absent_marker() {
        let mut cache = StateCache::new();
        let addr = [0x02; 20];
        let key = [0x04; 32];

        cache.set_storage_absent(&addr, 1, &key);
        assert_eq!(cache.get_storage(&addr, 1, &key), Some(&CacheEntry::Absent));
    }

    #[test]
    fn test_code_size_cutoff() {
        let mut cache = StateCache::new();
        let addr = [0x05; 20];

        cache.set_code_read(&addr, 1, &vec![0x60; CODE_CACHE_SIZE_LIMIT]);
        assert!(cache.get_code(&addr, 1).is_some());

        cache.set_code_read(&addr, 2, &vec![0x60; CODE_CACHE_SIZE_LIMIT + 1]);
        assert!(cache.get_code(&addr, 2).is_none());
    }

    #[test]
    fn test_deleted_account_marker() {
        let mut cache = StateCache::new();
        let addr = [0x06; 20];

        assert!(cache.get_deleted_account(&addr).is_none());
        cache.set_account_deleted(&addr, 3);
        assert_eq!(cache.get_deleted_account(&addr), Some(3));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cache = StateCache::new();
        let addr = [0x07; 20];
        cache.set_account_read(&addr, Account::new(1));
        cache.set_code_read(&addr, 1, &[0x60]);
        cache.set_account_deleted(&addr, 1);
        cache.set_account_trie_read(Nibbles(vec![0x0F]), true, false, false);

        cache.clear();
        let stats = cache.stats();
        assert_eq!(stats.accounts, 0);
        assert_eq!(stats.code_entries, 0);
        assert_eq!(stats.deleted_markers, 0);
        assert_eq!(stats.trie_nodes, 0);
    }
}
