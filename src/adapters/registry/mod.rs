//! Call registry adapters.

mod in_memory_call_registry;

pub use in_memory_call_registry::InMemoryCallRegistry;
