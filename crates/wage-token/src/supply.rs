//! Dual-unit supply ledger.
//!
//! Total supply is tracked in two units: fragments, the denomination
//! holders see, and gons, a fixed high-precision unit minted once at
//! genesis. `gons_per_fragment` is the only value a rebase recomputes;
//! individual gon balances are never touched, which is what makes a rebase
//! O(1) regardless of holder count.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Gons minted per fragment at genesis.
///
/// Chosen so the scale retains precision across many rebases: a supply can
/// grow by roughly this factor before the gons-per-fragment floor reaches
/// zero, and a 26 * 10^18 fragment genesis still leaves u128 headroom for
/// conversions. Ledgers needing a different precision choice use
/// [`SupplyLedger::with_scale`].
pub const DEFAULT_GON_SCALE: u128 = 10u128.pow(12);

/// Supply state shared by every holder of the token.
///
/// INVARIANT: `gons_per_fragment == total_gons / total_fragments` (floor)
/// after every mutation. `total_gons` is fixed at genesis; `total_fragments`
/// changes only through [`SupplyLedger::apply_delta`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyLedger {
    /// Gons minted at genesis. Never changes afterwards.
    pub total_gons: u128,
    /// Current fragment supply. Changes only via rebase.
    pub total_fragments: u128,
    /// Current scale between the two units.
    pub gons_per_fragment: u128,
    /// Hash commitment over the three fields above.
    pub state_hash: Vec<u8>,
}

impl SupplyLedger {
    /// Open a ledger with the default gon scale.
    pub fn new(initial_fragments: u128) -> Result<Self, LedgerError> {
        Self::with_scale(initial_fragments, DEFAULT_GON_SCALE)
    }

    /// Open a ledger minting `initial_fragments * gon_scale` gons.
    pub fn with_scale(initial_fragments: u128, gon_scale: u128) -> Result<Self, LedgerError> {
        if initial_fragments == 0 || gon_scale == 0 {
            return Err(LedgerError::ZeroSupply);
        }

        let total_gons = initial_fragments
            .checked_mul(gon_scale)
            .ok_or(LedgerError::AmountOverflow)?;

        let mut ledger = SupplyLedger {
            total_gons,
            total_fragments: initial_fragments,
            gons_per_fragment: total_gons / initial_fragments,
            state_hash: vec![],
        };
        ledger.state_hash = ledger.compute_hash();
        Ok(ledger)
    }

    /// Apply a rebase delta to the fragment supply and recompute the scale.
    ///
    /// The gon supply stays fixed; scaling the fragment denominator is what
    /// moves every holder's fragment balance proportionally. A delta that
    /// would leave the supply non-positive is refused, as is one that would
    /// exhaust the scale's precision.
    pub fn apply_delta(&mut self, delta_fragments: i128) -> Result<(), LedgerError> {
        let new_fragments = if delta_fragments >= 0 {
            self.total_fragments
                .checked_add(delta_fragments as u128)
                .ok_or(LedgerError::AmountOverflow)?
        } else {
            let decrease = delta_fragments.unsigned_abs();
            if decrease >= self.total_fragments {
                return Err(LedgerError::InvalidDelta);
            }
            self.total_fragments - decrease
        };

        let new_scale = self.total_gons / new_fragments;
        if new_scale == 0 {
            return Err(LedgerError::AmountOverflow);
        }

        self.total_fragments = new_fragments;
        self.gons_per_fragment = new_scale;
        self.state_hash = self.compute_hash();
        Ok(())
    }

    /// Convert a fragment amount to gons at the current scale.
    pub fn fragments_to_gons(&self, fragments: u128) -> Result<u128, LedgerError> {
        fragments
            .checked_mul(self.gons_per_fragment)
            .ok_or(LedgerError::AmountOverflow)
    }

    /// Convert a gon amount to fragments at the current scale, floored.
    pub fn gons_to_fragments(&self, gons: u128) -> u128 {
        gons / self.gons_per_fragment
    }

    /// User-visible total supply, in fragments.
    pub fn total_supply(&self) -> u128 {
        self.total_fragments
    }

    /// Verify the consistency of the dual-unit accounting.
    pub fn verify(&self) -> Result<(), LedgerError> {
        if self.total_fragments == 0 {
            return Err(LedgerError::InvalidSupplyState(
                "total_fragments is zero".to_string(),
            ));
        }

        if self.gons_per_fragment == 0 {
            return Err(LedgerError::InvalidSupplyState(
                "gons_per_fragment is zero".to_string(),
            ));
        }

        let expected_scale = self.total_gons / self.total_fragments;
        if self.gons_per_fragment != expected_scale {
            return Err(LedgerError::InvalidSupplyState(format!(
                "gons_per_fragment {} != total_gons / total_fragments {}",
                self.gons_per_fragment, expected_scale
            )));
        }

        Ok(())
    }

    /// Compute the hash commitment for the current supply state.
    pub fn compute_hash(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.total_gons.to_le_bytes());
        hasher.update(self.total_fragments.to_le_bytes());
        hasher.update(self.gons_per_fragment.to_le_bytes());
        hasher.finalize().to_vec()
    }

    /// Verify the stored state hash commitment.
    pub fn verify_hash(&self) -> Result<(), LedgerError> {
        if self.compute_hash() != self.state_hash {
            return Err(LedgerError::HashMismatch);
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("initial fragment supply must be positive")]
    ZeroSupply,
    #[error("supply delta would leave total supply non-positive")]
    InvalidDelta,
    #[error("amount overflows the fixed-point range")]
    AmountOverflow,
    #[error("invalid supply state: {0}")]
    InvalidSupplyState(String),
    #[error("supply state hash does not match commitment")]
    HashMismatch,
}
