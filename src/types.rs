//! Core types and data structures for the custody ledger

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unsigned quantity of custodied value.
///
/// 128 bits wide so realistic totals cannot overflow; arithmetic on it is
/// still checked and fails closed with [`VaultError::Overflow`].
pub type Amount = u128;

/// Width of a principal identifier in bytes
pub const PRINCIPAL_LEN: usize = 20;

/// Opaque, comparable identifier for an account able to call operations
/// and hold a balance.
///
/// Principals are only ever used as map keys. The all-zero identifier is the
/// null sentinel ([`Principal::NULL`]) and can never own the vault.
/// Displayed, debug-printed and serialized as its `0x`-prefixed hex form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Principal([u8; PRINCIPAL_LEN]);

impl Principal {
    /// The null sentinel
    pub const NULL: Principal = Principal([0u8; PRINCIPAL_LEN]);

    /// Create a principal from raw bytes
    pub const fn new(bytes: [u8; PRINCIPAL_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes
    pub fn as_bytes(&self) -> &[u8; PRINCIPAL_LEN] {
        &self.0
    }

    /// Whether this is the null sentinel
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Principal {
    type Err = VaultError;

    /// Parse a hex identifier, with or without a `0x` prefix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| VaultError::InvalidPrincipal(e.to_string()))?;
        let bytes: [u8; PRINCIPAL_LEN] = bytes.try_into().map_err(|raw: Vec<u8>| {
            VaultError::InvalidPrincipal(format!(
                "expected {} bytes, got {}",
                PRINCIPAL_LEN,
                raw.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Failure reported by the external transfer primitive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The recipient refused the value
    #[error("recipient rejected transfer: {0}")]
    Rejected(String),
    /// A call the recipient made back into the vault failed and was propagated
    #[error("nested call failed: {0}")]
    Nested(Box<VaultError>),
}

impl From<VaultError> for TransferError {
    fn from(err: VaultError) -> Self {
        TransferError::Nested(Box::new(err))
    }
}

/// Errors that can occur in the custody ledger
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    #[error("caller {caller} is not the owner")]
    NotOwner { caller: Principal },
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },
    #[error("new owner is the null principal")]
    ZeroAddress,
    #[error("transfer failed: {0}")]
    TransferFailed(TransferError),
    #[error("use the deposit operation")]
    UseDeposit,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("reentrant call rejected")]
    ReentrantCall,
    #[error("call depth exceeded: {depth} > {max}")]
    CallDepthExceeded { depth: u32, max: u32 },
    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl VaultError {
    /// Stable short name of the error kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            VaultError::NotOwner { .. } => "NotOwner",
            VaultError::ZeroAmount => "ZeroAmount",
            VaultError::InsufficientBalance { .. } => "InsufficientBalance",
            VaultError::ZeroAddress => "ZeroAddress",
            VaultError::TransferFailed(_) => "TransferFailed",
            VaultError::UseDeposit => "UseDeposit",
            VaultError::Overflow => "Overflow",
            VaultError::ReentrantCall => "ReentrantCall",
            VaultError::CallDepthExceeded { .. } => "CallDepthExceeded",
            VaultError::InvalidPrincipal(_) => "InvalidPrincipal",
            VaultError::Config(_) => "Config",
        }
    }
}

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_hex_roundtrip() {
        let principal = Principal::new([0xab; PRINCIPAL_LEN]);
        let text = principal.to_string();
        assert_eq!(text, format!("0x{}", "ab".repeat(PRINCIPAL_LEN)));
        assert_eq!(text.parse::<Principal>().unwrap(), principal);

        let bare = "ab".repeat(PRINCIPAL_LEN);
        assert_eq!(bare.parse::<Principal>().unwrap(), principal);
    }

    #[test]
    fn test_principal_debug_is_hex() {
        let principal = Principal::new([0x0f; PRINCIPAL_LEN]);
        assert_eq!(format!("{:?}", principal), principal.to_string());
        assert_eq!(
            format!("{:?}", Some(Principal::NULL)),
            format!("Some(0x{})", "00".repeat(PRINCIPAL_LEN))
        );
    }

    #[test]
    fn test_principal_parse_rejects_bad_input() {
        assert!(matches!(
            "0x1234".parse::<Principal>(),
            Err(VaultError::InvalidPrincipal(_))
        ));
        assert!(matches!(
            "not-hex".parse::<Principal>(),
            Err(VaultError::InvalidPrincipal(_))
        ));
    }

    #[test]
    fn test_null_sentinel() {
        assert!(Principal::NULL.is_null());
        assert!(!Principal::new([1; PRINCIPAL_LEN]).is_null());
    }

    #[test]
    fn test_nested_error_converts_into_transfer_error() {
        let err: TransferError = VaultError::ZeroAmount.into();
        assert_eq!(err, TransferError::Nested(Box::new(VaultError::ZeroAmount)));
        assert_eq!(
            VaultError::TransferFailed(err).to_string(),
            "transfer failed: nested call failed: amount must be greater than zero"
        );
    }

    #[test]
    fn test_use_deposit_message() {
        assert_eq!(VaultError::UseDeposit.to_string(), "use the deposit operation");
        assert_eq!(VaultError::UseDeposit.kind(), "UseDeposit");
    }
}
