//! Administrative access control

use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::validation::validate_principal;

/// Holds the single administrator of a vault
///
/// The owner is never the null sentinel. Access control knows nothing about
/// balances; the vault wraps it to emit events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Principal,
}

impl AccessControl {
    /// Create access control owned by `initial_owner`
    pub fn new(initial_owner: Principal) -> VaultResult<Self> {
        validate_principal(&initial_owner)?;
        Ok(Self {
            owner: initial_owner,
        })
    }

    pub fn owner(&self) -> Principal {
        self.owner
    }

    /// Fail with `NotOwner` unless `caller` is the owner
    pub fn ensure_owner(&self, caller: &Principal) -> VaultResult<()> {
        if *caller != self.owner {
            return Err(VaultError::NotOwner { caller: *caller });
        }
        Ok(())
    }

    /// Hand control to `new_owner`, returning the previous owner.
    ///
    /// Caller authorization is checked before the target.
    pub fn transfer_ownership(
        &mut self,
        caller: &Principal,
        new_owner: Principal,
    ) -> VaultResult<Principal> {
        self.ensure_owner(caller)?;
        validate_principal(&new_owner)?;

        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(byte: u8) -> Principal {
        Principal::new([byte; PRINCIPAL_LEN])
    }

    #[test]
    fn test_null_initial_owner_rejected() {
        assert_eq!(AccessControl::new(Principal::NULL), Err(VaultError::ZeroAddress));
    }

    #[test]
    fn test_transfer_and_lockout() {
        let mut access = AccessControl::new(principal(1)).unwrap();

        let previous = access.transfer_ownership(&principal(1), principal(2)).unwrap();
        assert_eq!(previous, principal(1));
        assert_eq!(access.owner(), principal(2));

        assert_eq!(
            access.transfer_ownership(&principal(1), principal(3)),
            Err(VaultError::NotOwner {
                caller: principal(1)
            })
        );
        assert_eq!(access.owner(), principal(2));
    }

    #[test]
    fn test_null_target_rejected_without_change() {
        let mut access = AccessControl::new(principal(1)).unwrap();
        assert_eq!(
            access.transfer_ownership(&principal(1), Principal::NULL),
            Err(VaultError::ZeroAddress)
        );
        assert_eq!(access.owner(), principal(1));
    }

    #[test]
    fn test_non_owner_checked_before_target() {
        let mut access = AccessControl::new(principal(1)).unwrap();
        assert_eq!(
            access.transfer_ownership(&principal(5), Principal::NULL),
            Err(VaultError::NotOwner {
                caller: principal(5)
            })
        );
    }

    #[test]
    fn test_transfer_to_self_is_allowed() {
        let mut access = AccessControl::new(principal(1)).unwrap();
        assert_eq!(
            access.transfer_ownership(&principal(1), principal(1)),
            Ok(principal(1))
        );
    }
}
