//! Utility modules

pub mod amount_serde;
pub mod memory_store;
pub mod validation;

pub use memory_store::*;
pub use validation::*;
