//! Main vault orchestrator that coordinates balances, custody and ownership

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::VaultConfig;
use crate::ledger::{AccessControl, EventLog, VaultEvent};
use crate::traits::*;
use crate::types::*;
use crate::utils::memory_store::MemoryStore;
use crate::utils::validation::*;

/// Custodial balance ledger
///
/// Tracks per-principal credit, the running total of that credit and the
/// value actually held in custody, plus the single administrator. Between
/// operations the vault guarantees:
///
/// - the recorded total equals the sum of all balances,
/// - the recorded total never exceeds held funds,
/// - the owner is never [`Principal::NULL`].
///
/// Withdrawals follow checks, effects, interactions: the debit is committed
/// before the [`TransferHook`] runs, so a recipient that calls back in sees
/// the already-reduced balance and cannot withdraw the same funds twice.
#[derive(Debug)]
pub struct Vault<S: BalanceStore = MemoryStore> {
    store: S,
    access: AccessControl,
    held: Amount,
    events: EventLog,
    config: VaultConfig,
    depth: u32,
    /// Prior entry of every balance written while a withdrawal is in flight
    journal: Vec<(Principal, Option<Amount>)>,
}

/// State captured before a withdrawal's effects so they can be undone.
/// Balances are restored from the journal; everything else is copied.
struct Checkpoint {
    journal: usize,
    total_deposits: Amount,
    access: AccessControl,
    held: Amount,
    events: usize,
}

impl Vault<MemoryStore> {
    /// Create an in-memory vault owned by `initializer`
    pub fn new(initializer: Principal) -> VaultResult<Self> {
        Self::with_config(initializer, VaultConfig::default())
    }

    /// Create an in-memory vault with custom configuration
    pub fn with_config(initializer: Principal, config: VaultConfig) -> VaultResult<Self> {
        Self::with_store(initializer, MemoryStore::new(), config)
    }
}

impl<S: BalanceStore> Vault<S> {
    /// Create a vault over an existing store.
    ///
    /// The store's recorded total is taken as already held in custody.
    /// Emits `OwnershipTransferred` from the null principal to `initializer`.
    pub fn with_store(initializer: Principal, store: S, config: VaultConfig) -> VaultResult<Self> {
        config.validate()?;
        let access = AccessControl::new(initializer)?;
        let held = store.total_deposits();

        let mut vault = Self {
            store,
            access,
            held,
            events: EventLog::new(),
            config,
            depth: 0,
            journal: Vec::new(),
        };
        vault.emit(VaultEvent::OwnershipTransferred {
            previous_owner: Principal::NULL,
            new_owner: initializer,
        });
        info!(owner = %initializer, "vault initialized");
        Ok(vault)
    }

    // Ledger operations

    /// Credit `amount` of attached value to `caller`
    pub fn deposit(&mut self, caller: Principal, amount: Amount) -> VaultResult<()> {
        self.guard_reentry()?;
        validate_positive_amount(amount)?;

        let balance = checked_credit(self.store.balance(&caller), amount)?;
        let total = checked_credit(self.store.total_deposits(), amount)?;
        let held = checked_credit(self.held, amount)?;

        self.write_balance(caller, Some(balance));
        self.store.set_total_deposits(total);
        self.held = held;

        self.emit(VaultEvent::Deposit {
            principal: caller,
            amount,
        });
        info!(caller = %caller, amount = %amount, balance = %balance, "deposit recorded");
        Ok(())
    }

    /// Debit `amount` from `caller` and transfer it out through `hook`.
    ///
    /// Checks run in order: positive amount, then sufficient balance. The
    /// debit and the outflow from held funds are committed before the hook
    /// is called. If the hook fails, every change made since the withdrawal
    /// began, including any made by nested calls, is rolled back and
    /// `TransferFailed` is returned. A panicking hook is rolled back the same
    /// way before the panic continues.
    pub fn withdraw(
        &mut self,
        caller: Principal,
        amount: Amount,
        hook: &mut dyn TransferHook<S>,
    ) -> VaultResult<()> {
        self.guard_reentry()?;
        validate_positive_amount(amount)?;
        let available = self.store.balance(&caller);
        validate_sufficient_balance(amount, available)?;
        if self.depth >= self.config.max_call_depth {
            return Err(VaultError::CallDepthExceeded {
                depth: self.depth + 1,
                max: self.config.max_call_depth,
            });
        }

        let remaining = checked_debit(available, amount)?;
        let total = checked_debit(self.store.total_deposits(), amount)?;
        let held = checked_debit(self.held, amount)?;

        let checkpoint = self.checkpoint();
        self.depth += 1;

        // Effects
        if remaining == 0 && self.config.prune_zero_balances {
            self.write_balance(caller, None);
        } else {
            self.write_balance(caller, Some(remaining));
        }
        self.store.set_total_deposits(total);
        self.held = held;
        debug!(
            caller = %caller,
            amount = %amount,
            depth = self.depth,
            "withdrawal debited, transferring"
        );

        // Interaction
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            hook.on_transfer(&mut *self, caller, amount)
        }));
        self.depth -= 1;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(payload) => {
                self.restore(checkpoint);
                warn!(caller = %caller, amount = %amount, "transfer panicked, withdrawal rolled back");
                panic::resume_unwind(payload);
            }
        };

        if let Err(err) = outcome {
            self.restore(checkpoint);
            warn!(
                caller = %caller,
                amount = %amount,
                error = %err,
                "transfer failed, withdrawal rolled back"
            );
            return Err(VaultError::TransferFailed(err));
        }

        if self.depth == 0 {
            self.journal.clear();
        }
        self.emit(VaultEvent::Withdrawal {
            principal: caller,
            amount,
        });
        info!(caller = %caller, amount = %amount, remaining = %remaining, "withdrawal completed");
        Ok(())
    }

    /// Value currently held in custody
    pub fn contract_balance(&self) -> Amount {
        self.held
    }

    /// Credited balance of `principal`, zero if it never deposited
    pub fn user_balance(&self, principal: &Principal) -> Amount {
        self.store.balance(principal)
    }

    /// Running total of all credited balances
    pub fn total_deposits(&self) -> Amount {
        self.store.total_deposits()
    }

    // Access control operations

    /// Hand administrative control to `new_owner`
    pub fn transfer_ownership(&mut self, caller: Principal, new_owner: Principal) -> VaultResult<()> {
        self.guard_reentry()?;
        let previous_owner = self.access.transfer_ownership(&caller, new_owner)?;

        self.emit(VaultEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        info!(previous = %previous_owner, new = %new_owner, "ownership transferred");
        Ok(())
    }

    pub fn owner(&self) -> Principal {
        self.access.owner()
    }

    // Custody

    /// Record value that reached custody without going through any
    /// operation, such as a platform-level forced credit. Balances are
    /// untouched, so afterwards held funds exceed the recorded total.
    pub fn absorb_forced_value(&mut self, amount: Amount) -> VaultResult<()> {
        self.held = checked_credit(self.held, amount)?;
        debug!(amount = %amount, held = %self.held, "forced value absorbed");
        Ok(())
    }

    /// Held funds not backed by any credited balance
    pub fn surplus(&self) -> Amount {
        self.held.saturating_sub(self.store.total_deposits())
    }

    // Introspection

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Number of withdrawal transfers currently in flight
    pub fn call_depth(&self) -> u32 {
        self.depth
    }

    /// Number of principals with a balance entry, zero entries included
    pub fn principal_count(&self) -> usize {
        self.store.entry_count()
    }

    /// Check conservation, solvency and ownership
    pub fn check_integrity(&self) -> IntegrityReport {
        let mut issues = Vec::new();
        let total_deposits = self.store.total_deposits();

        let sum_of_balances = match self
            .store
            .balances()
            .iter()
            .try_fold(0 as Amount, |acc, (_, amount)| acc.checked_add(*amount))
        {
            Some(sum) => sum,
            None => {
                issues.push("sum of balances overflows".to_string());
                Amount::MAX
            }
        };

        if sum_of_balances != total_deposits {
            issues.push(format!(
                "recorded total {} does not match sum of balances {}",
                total_deposits, sum_of_balances
            ));
        }

        if total_deposits > self.held {
            issues.push(format!(
                "recorded total {} exceeds held funds {}",
                total_deposits, self.held
            ));
        }

        if self.access.owner().is_null() {
            issues.push("owner is the null principal".to_string());
        }

        IntegrityReport {
            is_valid: issues.is_empty(),
            issues,
            total_deposits,
            sum_of_balances,
            held_funds: self.held,
            surplus: self.surplus(),
        }
    }

    /// Point-in-time copy of the vault's state
    pub fn snapshot(&self) -> VaultSnapshot {
        VaultSnapshot {
            owner: self.access.owner(),
            total_deposits: self.store.total_deposits(),
            held_funds: self.held,
            balances: self.store.balances(),
        }
    }

    fn guard_reentry(&self) -> VaultResult<()> {
        if self.config.reentrancy_guard && self.depth > 0 {
            warn!(depth = self.depth, "reentrant call rejected");
            return Err(VaultError::ReentrantCall);
        }
        Ok(())
    }

    fn emit(&mut self, event: VaultEvent) {
        if self.config.record_events {
            self.events.push(event);
        }
    }

    /// Write a balance entry (`None` drops it), journaling the prior entry
    /// while a withdrawal is in flight
    fn write_balance(&mut self, principal: Principal, amount: Option<Amount>) {
        if self.depth > 0 {
            self.journal.push((principal, self.store.get(&principal)));
        }
        match amount {
            Some(amount) => self.store.set_balance(principal, amount),
            None => self.store.remove(&principal),
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            journal: self.journal.len(),
            total_deposits: self.store.total_deposits(),
            access: self.access.clone(),
            held: self.held,
            events: self.events.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        let undone = self.journal.len() - checkpoint.journal;
        for (principal, previous) in self.journal.drain(checkpoint.journal..).rev() {
            match previous {
                Some(amount) => self.store.set_balance(principal, amount),
                None => self.store.remove(&principal),
            }
        }
        self.store.set_total_deposits(checkpoint.total_deposits);
        self.access = checkpoint.access;
        self.held = checkpoint.held;
        self.events.truncate(checkpoint.events);
        debug!(
            writes = undone,
            events = checkpoint.events,
            "vault state restored from checkpoint"
        );
    }
}

/// Report on vault integrity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub total_deposits: Amount,
    pub sum_of_balances: Amount,
    pub held_funds: Amount,
    pub surplus: Amount,
}

/// Serializable copy of a vault's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    pub owner: Principal,
    pub total_deposits: Amount,
    pub held_funds: Amount,
    pub balances: Vec<(Principal, Amount)>,
}
