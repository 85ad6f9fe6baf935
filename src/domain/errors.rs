use thiserror::Error;

/// Failures surfaced by the state-access cache.
///
/// Both variants propagate immediately to the caller; the cache performs no
/// retry and no silent recovery. A warming scan that errors mid-way leaves
/// the affected prefix unmarked so a future lookup reattempts it.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Backing store error: {0}")]
    Store(String),

    #[error("Decode error: {0}")]
    Decode(String),
}
