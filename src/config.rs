//! Vault configuration

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Tunables for a [`Vault`](crate::Vault) instance
///
/// All fields have defaults, so a partial TOML document is enough:
///
/// ```toml
/// prune_zero_balances = true
/// max_call_depth = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Drop a principal's entry once a withdrawal brings it to zero
    pub prune_zero_balances: bool,
    /// Reject mutating calls made while a withdrawal's transfer is in flight
    pub reentrancy_guard: bool,
    /// Maximum number of withdrawals that may be nested inside each other
    pub max_call_depth: u32,
    /// Append events to the vault's event log
    pub record_events: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            prune_zero_balances: false,
            reentrancy_guard: false,
            max_call_depth: 64,
            record_events: true,
        }
    }
}

impl VaultConfig {
    /// Parse and validate a configuration from TOML
    pub fn from_toml_str(input: &str) -> VaultResult<Self> {
        let config: VaultConfig =
            toml::from_str(input).map_err(|e| VaultError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> VaultResult<()> {
        if self.max_call_depth == 0 {
            return Err(VaultError::Config(
                "max_call_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
