//! Owner and capability-set access control.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use wage_core::Address;

/// Who may do what.
///
/// The owner gates configuration (rebase, schedule, syncer wiring); the
/// granted set is a capability list for lock/unlock. Membership is an
/// explicit set check, not a role hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessList {
    owner: Address,
    granted: BTreeSet<Address>,
}

impl AccessList {
    pub fn new(owner: Address) -> Self {
        AccessList {
            owner,
            granted: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }

    /// Add `addr` to the lock/unlock capability set. Idempotent.
    pub fn grant(&mut self, addr: Address) {
        self.granted.insert(addr);
    }

    pub fn is_granted(&self, caller: &Address) -> bool {
        self.granted.contains(caller)
    }
}
