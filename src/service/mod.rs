pub mod cached_reader;

pub use cached_reader::*;
