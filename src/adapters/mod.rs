// Adapters layer: concrete implementations of the store port.

pub mod http;
pub mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;
