//! The wage token: ledger, locks, schedule, and fan-out, composed.

use crate::access::AccessList;
use crate::locks::{LockError, LockRegistry};
use crate::policy::RebasePolicy;
use crate::supply::{LedgerError, SupplyLedger};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use wage_core::{Address, Clock, SyncOutcome, Syncer};

/// Elastic-supply token with gons-denominated transfer locks.
///
/// Balances are stored in gons; every fragment figure leaving this type is
/// a derived view at the current scale. All operations run to completion
/// atomically — the host's sequential execution model means a `&mut self`
/// receiver is the whole concurrency story.
pub struct WageToken {
    name: String,
    symbol: String,
    ledger: SupplyLedger,
    balances: BTreeMap<Address, u128>,
    locks: LockRegistry,
    access: AccessList,
    policy: RebasePolicy,
    transfers_enabled: bool,
    syncer: Option<Arc<dyn Syncer>>,
    clock: Arc<dyn Clock>,
}

impl WageToken {
    /// Mint `initial_fragments` to `owner` and start with transfers
    /// disabled.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        initial_fragments: u128,
        rebase_enabled: bool,
        owner: Address,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        let ledger = SupplyLedger::new(initial_fragments)?;
        let now = clock.now();

        let mut balances = BTreeMap::new();
        balances.insert(owner, ledger.total_gons);

        Ok(WageToken {
            name: name.into(),
            symbol: symbol.into(),
            ledger,
            balances,
            locks: LockRegistry::new(),
            access: AccessList::new(owner),
            policy: RebasePolicy::new(rebase_enabled, now),
            transfers_enabled: false,
            syncer: None,
            clock,
        })
    }

    /// Move `amount_fragments` from `from` to `to`.
    ///
    /// Until transfers are enabled only the owner may send (that is how the
    /// initial supply is distributed). A due automatic rebase is applied
    /// first, so the amounts are evaluated against post-rebase balances —
    /// and that rebase stays committed even when the transfer itself is
    /// then refused.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount_fragments: u128,
    ) -> Result<(), TokenError> {
        if !self.transfers_enabled && !self.access.is_owner(&from) {
            return Err(TokenError::TransfersDisabled);
        }

        self.run_due_rebase()?;

        let gons = self.ledger.fragments_to_gons(amount_fragments)?;
        let from_balance = self.balances.get(&from).copied().unwrap_or(0);
        if gons > self.locks.transferable_gons(&from, from_balance) {
            return Err(TokenError::InsufficientBalance);
        }

        let remaining = from_balance - gons;
        if remaining == 0 {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, remaining);
        }
        let to_balance = self.balances.get(&to).copied().unwrap_or(0);
        self.balances.insert(to, to_balance + gons);

        debug!(%from, %to, amount = %amount_fragments, "transfer");
        Ok(())
    }

    /// Unlock transfers for everyone. One-directional; a second call fails.
    pub fn enable_transfers(&mut self, caller: Address) -> Result<(), TokenError> {
        self.require_owner(&caller)?;
        if self.transfers_enabled {
            return Err(TokenError::TransfersAlreadyEnabled);
        }
        self.transfers_enabled = true;
        info!("transfers enabled");
        Ok(())
    }

    /// Add `addr` to the lock/unlock capability set.
    pub fn grant_access(&mut self, caller: Address, addr: Address) -> Result<(), TokenError> {
        self.require_owner(&caller)?;
        self.access.grant(addr);
        Ok(())
    }

    /// Reserve `gons` of `holder`'s balance against transfer.
    pub fn lock(
        &mut self,
        caller: Address,
        holder: Address,
        gons: u128,
    ) -> Result<(), TokenError> {
        if !self.access.is_granted(&caller) {
            return Err(TokenError::Unauthorized);
        }
        self.locks.lock(holder, gons)?;
        debug!(%holder, gons = %gons, "balance locked");
        Ok(())
    }

    /// Release `gons` of `holder`'s reservation.
    pub fn unlock(
        &mut self,
        caller: Address,
        holder: Address,
        gons: u128,
    ) -> Result<(), TokenError> {
        if !self.access.is_granted(&caller) {
            return Err(TokenError::Unauthorized);
        }
        self.locks.unlock(holder, gons)?;
        debug!(%holder, gons = %gons, "balance unlocked");
        Ok(())
    }

    /// Apply an explicit supply delta and fan the event out.
    ///
    /// A delta of zero is a valid no-op that still notifies downstream
    /// consumers. Returns the per-target outcomes of the fan-out.
    pub fn rebase(
        &mut self,
        caller: Address,
        delta_fragments: i128,
    ) -> Result<Vec<SyncOutcome>, TokenError> {
        self.require_owner(&caller)?;
        self.rebase_internal(delta_fragments)
    }

    /// Wire in the downstream syncer.
    pub fn set_syncer(
        &mut self,
        caller: Address,
        syncer: Arc<dyn Syncer>,
    ) -> Result<(), TokenError> {
        self.require_owner(&caller)?;
        self.syncer = Some(syncer);
        Ok(())
    }

    /// Change the automatic rebase period and re-arm the schedule from now.
    pub fn change_rebase_rate(&mut self, caller: Address, period_secs: u64) -> Result<(), TokenError> {
        self.require_owner(&caller)?;
        self.policy.change_rate(self.clock.now(), period_secs);
        Ok(())
    }

    /// Toggle automatic rebasing.
    pub fn toggle_rebase(&mut self, caller: Address, enabled: bool) -> Result<(), TokenError> {
        self.require_owner(&caller)?;
        self.policy.enabled = enabled;
        Ok(())
    }

    /// Set the fragment delta automatic rebases apply.
    pub fn set_rebase_amount(&mut self, caller: Address, delta_fragments: i128) -> Result<(), TokenError> {
        self.require_owner(&caller)?;
        self.policy.rebase_amount = delta_fragments;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    pub fn transfers_enabled(&self) -> bool {
        self.transfers_enabled
    }

    /// User-visible total supply, in fragments.
    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    /// Fragment balance of `addr` at the current scale.
    pub fn balance_of(&self, addr: &Address) -> u128 {
        self.ledger.gons_to_fragments(self.gon_balance_of(addr))
    }

    /// Raw gon balance of `addr`.
    pub fn gon_balance_of(&self, addr: &Address) -> u128 {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    pub fn gons_per_fragment(&self) -> u128 {
        self.ledger.gons_per_fragment
    }

    pub fn rebase_amount(&self) -> i128 {
        self.policy.rebase_amount
    }

    /// Fragment view of `holder`'s locked gons.
    pub fn locked_fragments(&self, holder: &Address) -> u128 {
        self.ledger.gons_to_fragments(self.locks.locked_gons(holder))
    }

    /// Fragment view of what `holder` may actually move.
    pub fn transferable_balance(&self, holder: &Address) -> u128 {
        let transferable = self
            .locks
            .transferable_gons(holder, self.gon_balance_of(holder));
        self.ledger.gons_to_fragments(transferable)
    }

    pub fn ledger(&self) -> &SupplyLedger {
        &self.ledger
    }

    fn require_owner(&self, caller: &Address) -> Result<(), TokenError> {
        if !self.access.is_owner(caller) {
            return Err(TokenError::Unauthorized);
        }
        Ok(())
    }

    fn run_due_rebase(&mut self) -> Result<(), TokenError> {
        let now = self.clock.now();
        if !self.policy.due(now) {
            return Ok(());
        }

        let delta = self.policy.rebase_amount;
        self.rebase_internal(delta)?;
        self.policy.advance(now);
        Ok(())
    }

    fn rebase_internal(&mut self, delta_fragments: i128) -> Result<Vec<SyncOutcome>, TokenError> {
        self.ledger.apply_delta(delta_fragments)?;
        info!(
            delta = %delta_fragments,
            total_supply = %self.ledger.total_supply(),
            state_hash = %hex::encode(&self.ledger.state_hash),
            "rebase committed"
        );

        // The fan-out happens after the commit, so downstream consumers
        // always observe the post-rebase supply.
        let outcomes = match &self.syncer {
            Some(syncer) => syncer.sync(),
            None => Vec::new(),
        };

        let failures = outcomes.iter().filter(|o| !o.success).count();
        if failures > 0 {
            warn!(failures, total = outcomes.len(), "sync fan-out had failing targets");
        }
        Ok(outcomes)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("caller is not authorized for this operation")]
    Unauthorized,
    #[error("transfers are disabled")]
    TransfersDisabled,
    #[error("transfers are already enabled")]
    TransfersAlreadyEnabled,
    #[error("transfer amount exceeds the transferable balance")]
    InsufficientBalance,
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("lock error: {0}")]
    Lock(#[from] LockError),
}
