//! Ledger module containing the vault, access control, events and call dispatch

pub mod access;
pub mod call;
pub mod events;
pub mod vault;

pub use access::*;
pub use call::*;
pub use events::*;
pub use vault::*;
