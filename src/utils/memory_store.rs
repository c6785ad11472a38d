//! In-memory storage implementation

use std::collections::BTreeMap;

use crate::traits::*;
use crate::types::*;

/// In-memory balance store
///
/// Backed by a `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    balances: BTreeMap<Principal, Amount>,
    total_deposits: Amount,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalanceStore for MemoryStore {
    fn get(&self, principal: &Principal) -> Option<Amount> {
        self.balances.get(principal).copied()
    }

    fn set_balance(&mut self, principal: Principal, amount: Amount) {
        self.balances.insert(principal, amount);
    }

    fn remove(&mut self, principal: &Principal) {
        self.balances.remove(principal);
    }

    fn total_deposits(&self) -> Amount {
        self.total_deposits
    }

    fn set_total_deposits(&mut self, amount: Amount) {
        self.total_deposits = amount;
    }

    fn balances(&self) -> Vec<(Principal, Amount)> {
        self.balances.iter().map(|(p, a)| (*p, *a)).collect()
    }

    fn entry_count(&self) -> usize {
        self.balances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_principal_reads_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.balance(&Principal::new([7; PRINCIPAL_LEN])), 0);
        assert_eq!(store.get(&Principal::new([7; PRINCIPAL_LEN])), None);
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn test_zero_entry_differs_from_missing() {
        let alice = Principal::new([1; PRINCIPAL_LEN]);
        let mut store = MemoryStore::new();
        store.set_balance(alice, 0);

        assert_eq!(store.get(&alice), Some(0));
        assert_eq!(store.balance(&alice), 0);
        assert_eq!(store.entry_count(), 1);

        store.remove(&alice);
        assert_eq!(store.get(&alice), None);
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn test_balances_are_ordered() {
        let mut store = MemoryStore::new();
        store.set_balance(Principal::new([3; PRINCIPAL_LEN]), 3);
        store.set_balance(Principal::new([1; PRINCIPAL_LEN]), 1);
        store.set_balance(Principal::new([2; PRINCIPAL_LEN]), 2);

        let amounts: Vec<Amount> = store.balances().into_iter().map(|(_, a)| a).collect();
        assert_eq!(amounts, vec![1, 2, 3]);

        store.remove(&Principal::new([2; PRINCIPAL_LEN]));
        assert_eq!(store.entry_count(), 2);
    }
}
