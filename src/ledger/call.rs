//! Call dispatch and the unsolicited-value guard
//!
//! Callers that drive the vault from serialized requests go through
//! [`Vault::dispatch`]. Value can only enter custody through
//! [`Call::Deposit`]; value attached to any other call, bare transfers and
//! unrecognized operations are all refused with [`VaultError::UseDeposit`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ledger::Vault;
use crate::traits::*;
use crate::types::*;

/// An operation invoked on a vault, as carried by a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    /// Credit the attached value to the caller. The attached value is the
    /// amount; there is no separately declared figure to disagree with it.
    Deposit,
    Withdraw {
        #[serde(with = "crate::utils::amount_serde")]
        amount: Amount,
    },
    TransferOwnership {
        new_owner: Principal,
    },
    /// Value sent with no operation selected
    Bare,
    /// An operation the vault does not recognize
    Unknown {
        selector: String,
    },
}

impl Call {
    /// Operation name for logging
    pub fn name(&self) -> &str {
        match self {
            Call::Deposit => "deposit",
            Call::Withdraw { .. } => "withdraw",
            Call::TransferOwnership { .. } => "transfer_ownership",
            Call::Bare => "bare",
            Call::Unknown { selector } => selector.as_str(),
        }
    }

    /// Whether the call names an operation the vault implements
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Call::Bare | Call::Unknown { .. })
    }
}

impl<S: BalanceStore> Vault<S> {
    /// Route a call from `caller` carrying `value` to its operation
    pub fn dispatch(
        &mut self,
        caller: Principal,
        call: Call,
        value: Amount,
        hook: &mut dyn TransferHook<S>,
    ) -> VaultResult<()> {
        debug!(caller = %caller, op = call.name(), value = %value, "dispatching call");

        match call {
            Call::Deposit => self.deposit(caller, value),
            Call::Withdraw { amount } => {
                refuse_attached_value(&caller, "withdraw", value)?;
                self.withdraw(caller, amount, hook)
            }
            Call::TransferOwnership { new_owner } => {
                refuse_attached_value(&caller, "transfer_ownership", value)?;
                self.transfer_ownership(caller, new_owner)
            }
            Call::Bare => self.receive(caller, value),
            Call::Unknown { selector } => self.fallback(caller, &selector, value),
        }
    }

    /// Value handed to the vault with no operation selected. Always refused.
    pub fn receive(&self, caller: Principal, value: Amount) -> VaultResult<()> {
        warn!(caller = %caller, value = %value, "bare transfer refused");
        Err(VaultError::UseDeposit)
    }

    /// Invocation of an unrecognized operation. Always refused, with or
    /// without attached value.
    pub fn fallback(&self, caller: Principal, selector: &str, value: Amount) -> VaultResult<()> {
        warn!(caller = %caller, selector, value = %value, "unknown operation refused");
        Err(VaultError::UseDeposit)
    }
}

fn refuse_attached_value(caller: &Principal, op: &str, value: Amount) -> VaultResult<()> {
    if value != 0 {
        warn!(caller = %caller, op, value = %value, "value attached to non-deposit call");
        return Err(VaultError::UseDeposit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(byte: u8) -> Principal {
        Principal::new([byte; PRINCIPAL_LEN])
    }

    #[test]
    fn test_deposit_uses_attached_value() {
        let alice = principal(2);
        let mut vault = Vault::new(principal(1)).unwrap();
        vault
            .dispatch(alice, Call::Deposit, 25, &mut AcceptTransfers)
            .unwrap();
        assert_eq!(vault.user_balance(&alice), 25);
        assert_eq!(vault.contract_balance(), 25);
    }

    #[test]
    fn test_deposit_without_value_is_zero_amount() {
        let mut vault = Vault::new(principal(1)).unwrap();
        assert_eq!(
            vault.dispatch(principal(2), Call::Deposit, 0, &mut AcceptTransfers),
            Err(VaultError::ZeroAmount)
        );
    }

    #[test]
    fn test_unsolicited_value_refused_without_effects() {
        let alice = principal(2);
        let mut vault = Vault::new(principal(1)).unwrap();
        vault.deposit(alice, 10).unwrap();
        let before = vault.snapshot();
        let events = vault.events().len();

        let refused = [
            (Call::Bare, 5),
            (Call::Bare, 0),
            (
                Call::Unknown {
                    selector: "mint".to_string(),
                },
                5,
            ),
            (
                Call::Unknown {
                    selector: "mint".to_string(),
                },
                0,
            ),
            (Call::Withdraw { amount: 1 }, 5),
            (
                Call::TransferOwnership {
                    new_owner: principal(3),
                },
                5,
            ),
        ];

        for (call, value) in refused {
            assert_eq!(
                vault.dispatch(alice, call, value, &mut AcceptTransfers),
                Err(VaultError::UseDeposit)
            );
        }

        assert_eq!(vault.snapshot(), before);
        assert_eq!(vault.events().len(), events);
    }

    #[test]
    fn test_withdraw_and_transfer_ownership_route() {
        let owner = principal(1);
        let alice = principal(2);
        let mut vault = Vault::new(owner).unwrap();
        vault.deposit(alice, 10).unwrap();

        vault
            .dispatch(alice, Call::Withdraw { amount: 4 }, 0, &mut AcceptTransfers)
            .unwrap();
        assert_eq!(vault.user_balance(&alice), 6);

        vault
            .dispatch(
                owner,
                Call::TransferOwnership { new_owner: alice },
                0,
                &mut AcceptTransfers,
            )
            .unwrap();
        assert_eq!(vault.owner(), alice);
    }

    #[test]
    fn test_call_deserializes_from_json() {
        let call: Call = serde_json::from_str(r#"{"op":"withdraw","amount":7}"#).unwrap();
        assert_eq!(call, Call::Withdraw { amount: 7 });
        assert!(call.is_recognized());

        let call: Call = serde_json::from_str(r#"{"op":"withdraw","amount":"7"}"#).unwrap();
        assert_eq!(call, Call::Withdraw { amount: 7 });

        let call: Call = serde_json::from_str(r#"{"op":"unknown","selector":"mint"}"#).unwrap();
        assert_eq!(call.name(), "mint");
        assert!(!call.is_recognized());
    }

    #[test]
    fn test_serialized_requests_drive_dispatch() {
        let owner = principal(1);
        let alice = principal(2);
        let wide = u64::MAX as Amount + 1;
        let mut vault = Vault::new(owner).unwrap();

        let requests = [
            (alice, Call::Deposit, wide + 10),
            (alice, Call::Withdraw { amount: wide }, 0),
            (owner, Call::TransferOwnership { new_owner: alice }, 0),
        ];
        for (caller, call, value) in requests {
            let text = serde_json::to_string(&call).unwrap();
            let decoded: Call = serde_json::from_str(&text).unwrap();
            assert_eq!(decoded, call);
            vault
                .dispatch(caller, decoded, value, &mut AcceptTransfers)
                .unwrap();
        }

        assert_eq!(
            serde_json::to_string(&Call::Withdraw { amount: wide }).unwrap(),
            format!(r#"{{"op":"withdraw","amount":"{}"}}"#, wide)
        );
        assert_eq!(vault.user_balance(&alice), 10);
        assert_eq!(vault.total_deposits(), 10);
        assert_eq!(vault.contract_balance(), 10);
        assert_eq!(vault.owner(), alice);
    }
}
