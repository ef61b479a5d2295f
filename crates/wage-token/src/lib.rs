//! Elastic-supply wage token.
//!
//! The token keeps two units of account: fragments, the user-visible
//! denomination, and gons, a fixed high-precision internal unit. Holder
//! balances are stored in gons and never rewritten by a rebase; a rebase
//! changes only the fragment denominator, so every fragment balance scales
//! proportionally in O(1). A gons-denominated lock registry reserves part
//! of a holder's balance against transfer, scaling with the supply the same
//! way. After every committed rebase the token fans the event out through
//! an injected [`wage_core::Syncer`].

pub mod access;
pub mod locks;
pub mod policy;
pub mod supply;
pub mod token;


pub use access::AccessList;
pub use locks::{LockError, LockRegistry};
pub use policy::RebasePolicy;
pub use supply::{LedgerError, SupplyLedger, DEFAULT_GON_SCALE};
pub use token::{TokenError, WageToken};
