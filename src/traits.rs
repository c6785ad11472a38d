//! Traits for storage abstraction and the external transfer primitive

use crate::ledger::Vault;
use crate::types::*;

/// Storage abstraction for per-principal credit
///
/// The vault only reads and writes through this trait, so any keyed store
/// can back it. While a withdrawal is in flight the vault journals the prior
/// entry of every principal it writes, and undoes those writes through
/// `set_balance` and `remove` if the transfer fails.
pub trait BalanceStore {
    /// Entry for a principal, `None` when it has never been written
    fn get(&self, principal: &Principal) -> Option<Amount>;

    /// Credited balance of a principal, zero when it has no entry
    fn balance(&self, principal: &Principal) -> Amount {
        self.get(principal).unwrap_or(0)
    }

    /// Overwrite the credited balance of a principal, creating the entry if needed
    fn set_balance(&mut self, principal: Principal, amount: Amount);

    /// Drop the entry for a principal
    fn remove(&mut self, principal: &Principal);

    /// Running total of all credited balances
    fn total_deposits(&self) -> Amount;

    /// Overwrite the running total
    fn set_total_deposits(&mut self, amount: Amount);

    /// All entries, in the store's iteration order
    fn balances(&self) -> Vec<(Principal, Amount)>;

    /// Number of entries held, zero balances included
    fn entry_count(&self) -> usize;
}

/// The external transfer primitive invoked by a withdrawal
///
/// `on_transfer` runs after the withdrawal's bookkeeping is committed and
/// receives the vault itself, so the recipient may call back into any vault
/// operation before returning. Returning an error fails the withdrawal with
/// [`VaultError::TransferFailed`] and rolls back everything done since it
/// started, nested calls included.
pub trait TransferHook<S: BalanceStore> {
    fn on_transfer(
        &mut self,
        vault: &mut Vault<S>,
        recipient: Principal,
        amount: Amount,
    ) -> Result<(), TransferError>;
}

impl<S, F> TransferHook<S> for F
where
    S: BalanceStore,
    F: FnMut(&mut Vault<S>, Principal, Amount) -> Result<(), TransferError>,
{
    fn on_transfer(
        &mut self,
        vault: &mut Vault<S>,
        recipient: Principal,
        amount: Amount,
    ) -> Result<(), TransferError> {
        self(vault, recipient, amount)
    }
}

/// Recipient that accepts every transfer without calling back
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptTransfers;

impl<S: BalanceStore> TransferHook<S> for AcceptTransfers {
    fn on_transfer(
        &mut self,
        _vault: &mut Vault<S>,
        _recipient: Principal,
        _amount: Amount,
    ) -> Result<(), TransferError> {
        Ok(())
    }
}

/// Recipient that refuses every transfer
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectTransfers;

impl<S: BalanceStore> TransferHook<S> for RejectTransfers {
    fn on_transfer(
        &mut self,
        _vault: &mut Vault<S>,
        recipient: Principal,
        _amount: Amount,
    ) -> Result<(), TransferError> {
        Err(TransferError::Rejected(format!(
            "{} does not accept value",
            recipient
        )))
    }
}
