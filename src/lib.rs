//! # Custody Core
//!
//! A custodial balance ledger: principals deposit value, the vault records
//! their credit, and they later withdraw it through a fallible external
//! transfer. A single owner can hand administrative control to another
//! principal.
//!
//! ## Features
//!
//! - **Checks-effects-interactions withdrawals**: the debit is committed before
//!   the transfer runs, so reentrant recipients cannot double-spend
//! - **All-or-nothing failures**: a failed transfer rolls back the withdrawal
//!   and anything the recipient did during it
//! - **Fund safety**: recorded credit always equals the sum of balances and
//!   never exceeds held funds
//! - **Event log**: ordered `Deposit`, `Withdrawal` and `OwnershipTransferred` records
//! - **Storage abstraction**: any [`BalanceStore`] can back a vault
//!
//! ## Quick Start
//!
//! ```rust
//! use custody_core::{AcceptTransfers, Principal, Vault};
//!
//! let owner = Principal::new([1; 20]);
//! let alice = Principal::new([2; 20]);
//!
//! let mut vault = Vault::new(owner)?;
//! vault.deposit(alice, 10)?;
//! vault.withdraw(alice, 4, &mut AcceptTransfers)?;
//!
//! assert_eq!(vault.user_balance(&alice), 6);
//! assert_eq!(vault.total_deposits(), vault.contract_balance());
//! # Ok::<(), custody_core::VaultError>(())
//! ```

pub mod config;
pub mod ledger;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use traits::*;
pub use types::*;
pub use utils::MemoryStore;
