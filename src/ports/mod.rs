pub mod reader;
pub mod store;

pub use reader::*;
pub use store::*;
