//! Rebase fan-out dispatcher.
//!
//! A [`CallSyncer`] keeps an ordered, append-only registry of
//! `(target, payload)` pairs and, on every sync, issues each stored
//! payload as a raw call against its target through the injected
//! [`wage_core::CallHost`]. Delivery is best-effort: a failing target is
//! recorded and skipped over, never letting one bad pair abort the batch.

pub mod dispatch;

pub use dispatch::{CallSyncer, SyncPair};
