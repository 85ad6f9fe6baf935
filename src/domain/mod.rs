pub mod cache;
pub mod entities;
pub mod errors;
pub mod nibbles;
pub mod trie_index;

pub use cache::*;
pub use entities::*;
pub use errors::*;
pub use nibbles::*;
pub use trie_index::*;
