// Adapters layer: concrete implementations of the store ports.

pub mod memory;

pub use memory::{Dataset, EnrollmentRow, InMemoryStore};
