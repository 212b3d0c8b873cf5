//! Database-free repositories backing the service and router tests

mod memory;

pub use memory::InMemoryRepositoryProvider;
