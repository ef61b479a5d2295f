use crate::address::Address;
use serde::{Deserialize, Serialize};

/// Outcome of a single raw call issued through the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResult {
    pub success: bool,
    pub return_data: Vec<u8>,
}

impl CallResult {
    pub fn ok(return_data: Vec<u8>) -> Self {
        CallResult {
            success: true,
            return_data,
        }
    }

    pub fn failed() -> Self {
        CallResult {
            success: false,
            return_data: Vec::new(),
        }
    }
}

/// The execution environment the dispatcher runs against.
///
/// The host owns the address space and the call mechanics (dispatch,
/// metering, revert semantics). The protocol only needs the ability to
/// issue a call with an arbitrary pre-encoded payload and observe
/// success plus returned bytes; a call to a nonexistent target is a
/// failed call, not a host error.
pub trait CallHost: Send + Sync {
    fn raw_call(&self, target: &Address, payload: &[u8]) -> CallResult;
}

/// Per-target record produced by one sync fan-out.
///
/// INVARIANT: one outcome per registered pair, in registration order,
/// whatever the individual call results were.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Position of the pair in the registry.
    pub index: usize,
    pub target: Address,
    pub success: bool,
    pub return_data: Vec<u8>,
}

/// Downstream propagation hook the token invokes after committing a rebase.
///
/// Implementations must be total: a sync never fails, it reports.
pub trait Syncer: Send + Sync {
    fn sync(&self) -> Vec<SyncOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_result_constructors() {
        let ok = CallResult::ok(vec![1, 2]);
        assert!(ok.success);
        assert_eq!(ok.return_data, vec![1, 2]);

        let failed = CallResult::failed();
        assert!(!failed.success);
        assert!(failed.return_data.is_empty());
    }
}
