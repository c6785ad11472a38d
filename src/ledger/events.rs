//! Append-only event log

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::*;

/// Observable state change emitted by a vault operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VaultEvent {
    /// Value credited to a principal
    Deposit {
        principal: Principal,
        #[serde(with = "crate::utils::amount_serde")]
        amount: Amount,
    },
    /// Value debited from a principal and transferred out
    Withdrawal {
        principal: Principal,
        #[serde(with = "crate::utils::amount_serde")]
        amount: Amount,
    },
    /// Administrative control reassigned. `previous_owner` is
    /// [`Principal::NULL`] for the event emitted at construction.
    OwnershipTransferred {
        previous_owner: Principal,
        new_owner: Principal,
    },
}

impl VaultEvent {
    /// Whether the event names the given principal in any field
    pub fn involves(&self, principal: &Principal) -> bool {
        match self {
            VaultEvent::Deposit { principal: p, .. } | VaultEvent::Withdrawal { principal: p, .. } => {
                p == principal
            }
            VaultEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => previous_owner == principal || new_owner == principal,
        }
    }
}

/// An event together with its position in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    /// Zero-based position in the log
    pub sequence: u64,
    pub recorded_at: NaiveDateTime,
    pub event: VaultEvent,
}

/// Ordered log of emitted events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, event: VaultEvent) -> &EventRecord {
        let record = EventRecord {
            id: Uuid::new_v4(),
            sequence: self.records.len() as u64,
            recorded_at: chrono::Utc::now().naive_utc(),
            event,
        };
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Records that involve a principal, in emission order
    pub fn for_principal(&self, principal: &Principal) -> Vec<&EventRecord> {
        self.records
            .iter()
            .filter(|r| r.event.involves(principal))
            .collect()
    }

    /// Discard everything recorded after the first `len` events.
    /// Only used to undo a failed withdrawal.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }
}
