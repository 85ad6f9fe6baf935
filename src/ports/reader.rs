//! # State Reader Port
//!
//! Point-read surface consumed by block-execution logic. Implemented by the
//! plain store-backed reader and by the cached facade wrapping it.

use crate::domain::{Account, Address, Hash, StateError, StorageKey};

/// Read access to account state.
///
/// Methods take `&mut self`: readers are free to record what they learn
/// (the cached facade does), and the component is single-writer per view.
pub trait StateReader {
    /// Fetch an account record; `None` means the account does not exist.
    fn read_account_data(&mut self, address: &Address) -> Result<Option<Account>, StateError>;

    /// Fetch one storage slot; an empty value means the slot is absent.
    fn read_account_storage(
        &mut self,
        address: &Address,
        incarnation: u64,
        key: &StorageKey,
    ) -> Result<Vec<u8>, StateError>;

    /// Fetch contract bytecode.
    fn read_account_code(
        &mut self,
        address: &Address,
        incarnation: u64,
        code_hash: &Hash,
    ) -> Result<Vec<u8>, StateError>;

    /// Fetch only the bytecode length. Delegates to
    /// [`read_account_code`](Self::read_account_code): code is rarely sized
    /// without its bytes also being needed downstream.
    fn read_account_code_size(
        &mut self,
        address: &Address,
        incarnation: u64,
        code_hash: &Hash,
    ) -> Result<usize, StateError> {
        Ok(self.read_account_code(address, incarnation, code_hash)?.len())
    }

    /// Fetch the last incarnation recorded for a deleted account, used to
    /// assign the next incarnation on contract recreation. 0 when unknown.
    fn read_account_incarnation(&mut self, address: &Address) -> Result<u64, StateError>;
}
