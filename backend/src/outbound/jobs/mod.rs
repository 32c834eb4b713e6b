//! Job runner adapters.

mod memory;

pub use memory::InMemoryJobRunner;
