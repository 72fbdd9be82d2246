pub mod memory;
pub mod model;

pub use memory::MemoryCache;
pub use model::*;
