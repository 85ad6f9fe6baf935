//! # Domain Entities for the State-Access Cache
//!
//! Core data structures shared by the cache maps, the trie-prefix index and
//! the read-through facade.
//!
//! ## Type Decisions
//!
//! - `balance: u128` - Sufficient for 340 undecillion base units while
//!   avoiding a big-integer dependency on the read path.
//! - `incarnation: u64` - Monotonic generation counter, bumped each time a
//!   contract's storage is reset on redeployment at the same address.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use super::errors::StateError;

pub type Hash = [u8; 32];
pub type Address = [u8; 20];
pub type StorageKey = [u8; 32];

/// Keccak256 hash of the empty byte string.
/// Every externally owned account carries this code hash; the code read
/// path short-circuits on it without touching cache or store.
pub const EMPTY_CODE_HASH: Hash = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
];

/// Keccak256 hash of an empty RLP-encoded trie.
/// Canonical storage root for accounts with no storage.
pub const EMPTY_TRIE_ROOT: Hash = [
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
];

/// Code blobs above this size are never retained by the cache.
/// Bounds memory taken by large contracts; bigger code is still served
/// correctly, just re-fetched from the backing store on every read.
pub const CODE_CACHE_SIZE_LIMIT: usize = 1024;

/// Account record as stored in the backing store and cached per view.
///
/// ## Fields
///
/// - `nonce`: Transaction count.
/// - `balance`: Token balance in base units.
/// - `incarnation`: Storage generation counter (see module docs).
/// - `code_hash`: Keccak256 of contract bytecode, [`EMPTY_CODE_HASH`] for
///   non-contract accounts.
/// - `storage_root`: Root hint of the account's storage trie.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub nonce: u64,
    pub balance: u128,
    pub incarnation: u64,
    pub code_hash: Hash,
    pub storage_root: Hash,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: 0,
            incarnation: 0,
            code_hash: EMPTY_CODE_HASH,
            storage_root: EMPTY_TRIE_ROOT,
        }
    }
}

impl Account {
    /// Create a new account with the specified balance.
    pub fn new(balance: u128) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Builder method to set nonce.
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Builder method to set incarnation.
    pub fn with_incarnation(mut self, incarnation: u64) -> Self {
        self.incarnation = incarnation;
        self
    }

    /// Builder method to set code hash.
    pub fn with_code_hash(mut self, code_hash: Hash) -> Self {
        self.code_hash = code_hash;
        self
    }

    /// Encode this account for the backing store.
    pub fn encode_for_storage(&self) -> Vec<u8> {
        bincode::serialize(self).expect("account encoding is infallible")
    }

    /// Decode an account from its stored byte form.
    pub fn decode_from_storage(bytes: &[u8]) -> Result<Self, StateError> {
        bincode::deserialize(bytes).map_err(|e| StateError::Decode(e.to_string()))
    }
}

/// Hash an address into its trie key.
pub fn hash_address(address: &Address) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(address);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
