//! Per-holder transfer locks.
//!
//! Locked amounts are denominated in gons, not fragments, so a lock scales
//! with every rebase and the *proportional* locked share of a balance is
//! preserved without any bookkeeping at rebase time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use wage_core::Address;

/// Gons reserved against transfer, per holder.
///
/// A lock may exceed the holder's live balance; the registry does not know
/// balances and the caller carries that responsibility. The transferable
/// view saturates at zero, so an over-lock simply freezes the whole
/// balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRegistry {
    locked: BTreeMap<Address, u128>,
}

impl LockRegistry {
    pub fn new() -> Self {
        LockRegistry {
            locked: BTreeMap::new(),
        }
    }

    /// Reserve `gons` of `holder`'s balance.
    pub fn lock(&mut self, holder: Address, gons: u128) -> Result<(), LockError> {
        let current = self.locked.get(&holder).copied().unwrap_or(0);
        let updated = current
            .checked_add(gons)
            .ok_or(LockError::AmountOverflow)?;
        self.locked.insert(holder, updated);
        Ok(())
    }

    /// Release `gons` of `holder`'s reservation.
    pub fn unlock(&mut self, holder: Address, gons: u128) -> Result<(), LockError> {
        let current = self.locked.get(&holder).copied().unwrap_or(0);
        if gons > current {
            return Err(LockError::Underflow);
        }

        let remaining = current - gons;
        if remaining == 0 {
            self.locked.remove(&holder);
        } else {
            self.locked.insert(holder, remaining);
        }
        Ok(())
    }

    /// Gons currently reserved for `holder`; zero for unknown holders.
    pub fn locked_gons(&self, holder: &Address) -> u128 {
        self.locked.get(holder).copied().unwrap_or(0)
    }

    /// Gons `holder` may move, given their full gon balance.
    pub fn transferable_gons(&self, holder: &Address, balance_gons: u128) -> u128 {
        balance_gons.saturating_sub(self.locked_gons(holder))
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    #[error("unlock amount exceeds the locked balance")]
    Underflow,
    #[error("lock amount overflows")]
    AmountOverflow,
}
