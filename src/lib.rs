//! # state-cache
//!
//! Read-through state-access cache for block execution.
//!
//! ## Role in System
//!
//! - **Read Path Accelerator**: Sits between block-execution logic and the
//!   backing key-value store holding the hashed-account trie
//! - **Trie-Prefix Warming**: Converts repeated or spatially-clustered point
//!   lookups into O(1) in-memory hits by materializing whole trie subtrees
//!   from a single ordered range scan
//! - **Tri-State Caching**: Distinguishes Present / Absent / Unknown so that
//!   confirmed misses never re-trigger store access
//!
//! ## Read Flow
//!
//! ```text
//! [Execution] ──read──→ [CachedReader]
//!                            │ miss
//!                            ↓
//!                      [StateCache] ──prefix miss──→ scan trie-node bucket
//!                            │                             │
//!                            │ prefix hit, unloaded        ↓
//!                            ↓                      [TriePrefixIndex]
//!                  scan hashed-account bucket
//!                            │
//!                            ↓
//!                  subtree marked loaded; answer served from memory
//! ```
//!
//! ## Ownership
//!
//! A [`StateCache`] is created per logical view of state (one block's
//! execution) and discarded when the view ends. It is single-writer; sharing
//! one instance across threads requires external synchronization.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::*;
