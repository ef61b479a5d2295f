//! Shared leaf types for the Wage protocol.
//!
//! This crate holds everything both the token and the syncer need to agree
//! on without depending on each other: account addresses, the clock the
//! rebase schedule reads, and the host-call seam the dispatcher drives.

pub mod address;
pub mod clock;
pub mod host;

pub use address::Address;
pub use clock::{Clock, ManualClock, SystemClock};
pub use host::{CallHost, CallResult, SyncOutcome, Syncer};
