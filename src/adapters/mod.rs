pub mod memory_store;
pub mod plain_reader;

pub use memory_store::*;
pub use plain_reader::*;
