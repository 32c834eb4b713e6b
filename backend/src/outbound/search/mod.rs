//! Search index adapters.

mod memory;

pub use memory::InMemorySearchIndex;
