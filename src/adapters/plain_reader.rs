//! Plain (uncached) state reader over a [`KeyValueStore`].
//!
//! Serves the correctness fallback of the cached read path and every miss
//! that is not subject to trie warming. Also re-exposes the store's scan
//! capability so the cached facade can warm subtrees through the same
//! handle it reads through.

use crate::domain::{Account, Address, Hash, StateError, StorageKey};
use crate::ports::{plain_storage_key, Bucket, KeyValueStore, StateReader, WalkVisitor};

/// Point reads against the plain-state buckets.
#[derive(Debug)]
pub struct PlainStateReader<S> {
    store: S,
}

impl<S: KeyValueStore> PlainStateReader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: KeyValueStore> StateReader for PlainStateReader<S> {
    fn read_account_data(&mut self, address: &Address) -> Result<Option<Account>, StateError> {
        match self.store.get(Bucket::PlainAccounts, address)? {
            Some(bytes) => Ok(Some(Account::decode_from_storage(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_account_storage(
        &mut self,
        address: &Address,
        incarnation: u64,
        key: &StorageKey,
    ) -> Result<Vec<u8>, StateError> {
        let store_key = plain_storage_key(address, incarnation, key);
        Ok(self
            .store
            .get(Bucket::Storage, &store_key)?
            .unwrap_or_default())
    }

    fn read_account_code(
        &mut self,
        _address: &Address,
        _incarnation: u64,
        code_hash: &Hash,
    ) -> Result<Vec<u8>, StateError> {
        Ok(self.store.get(Bucket::Code, code_hash)?.unwrap_or_default())
    }

    fn read_account_incarnation(&mut self, address: &Address) -> Result<u64, StateError> {
        match self.store.get(Bucket::IncarnationMap, address)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StateError::Decode("incarnation value is not 8 bytes".into()))?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }
}

impl<S: KeyValueStore> KeyValueStore for PlainStateReader<S> {
    fn get(&self, bucket: Bucket, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        self.store.get(bucket, key)
    }

    fn walk(
        &self,
        bucket: Bucket,
        start_key: &[u8],
        fixed_bits: usize,
        visit: &mut WalkVisitor<'_>,
    ) -> Result<(), StateError> {
        self.store.walk(bucket, start_key, fixed_bits, visit)
    }
}
