//! Infrastructure layer: concrete implementations of the domain traits and
//! the wire DTOs.

pub mod dto;
pub mod registry;
pub mod store;

pub use registry::InMemoryConnectionRegistry;
pub use store::InMemoryDurableStore;
