//! Ordered call registry and the continue-on-failure sync loop.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use std::sync::Arc;
use wage_core::{Address, CallHost, SyncOutcome, Syncer};

/// One registered dispatch: a target and the pre-encoded payload to send it.
///
/// The payload is opaque bytes; nothing validates that the target exists or
/// that the payload decodes to anything — both are deferred to call time,
/// where a bad pair simply produces a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPair {
    pub target: Address,
    pub payload: Vec<u8>,
}

/// Append-only registry of sync pairs, dispatched in insertion order.
///
/// Held behind `Arc` by the token while callers keep registering pairs, so
/// the registry sits in a lock and `add_pair` takes `&self`. `sync()` is
/// total: per-target failures are recorded in the returned outcomes and
/// never propagate as an error of the batch.
pub struct CallSyncer {
    host: Arc<dyn CallHost>,
    pairs: RwLock<Vec<SyncPair>>,
}

impl CallSyncer {
    pub fn new(host: Arc<dyn CallHost>) -> Self {
        CallSyncer {
            host,
            pairs: RwLock::new(Vec::new()),
        }
    }

    /// Register a call to issue on every sync. Pairs are never reordered,
    /// updated, or removed.
    pub fn add_pair(&self, target: Address, payload: Vec<u8>) {
        debug!(%target, payload = %hex::encode(&payload), "sync pair registered");
        self.pairs.write().push(SyncPair { target, payload });
    }

    pub fn len(&self) -> usize {
        self.pairs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.read().is_empty()
    }

    /// Snapshot of the registry, in insertion order.
    pub fn pairs(&self) -> Vec<SyncPair> {
        self.pairs.read().clone()
    }
}

impl Syncer for CallSyncer {
    fn sync(&self) -> Vec<SyncOutcome> {
        let pairs = self.pairs.read();
        let mut outcomes = Vec::with_capacity(pairs.len());

        for (index, pair) in pairs.iter().enumerate() {
            let result = self.host.raw_call(&pair.target, &pair.payload);
            if !result.success {
                // Best-effort delivery: record and move on to the next pair.
                warn!(index, target = %pair.target, "sync call failed");
            }
            outcomes.push(SyncOutcome {
                index,
                target: pair.target,
                success: result.success,
                return_data: result.return_data,
            });
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::BTreeSet;
    use wage_core::CallResult;

    // Payload wire format understood by the mock target: a selector byte,
    // optionally followed by two u64 little-endian words.
    const SEL_NO_PARAM: u8 = 0x01;
    const SEL_WITH_PARAMS: u8 = 0x02;

    fn encode_no_param() -> Vec<u8> {
        vec![SEL_NO_PARAM]
    }

    fn encode_with_params(a: u64, b: u64) -> Vec<u8> {
        let mut payload = vec![SEL_WITH_PARAMS];
        payload.extend_from_slice(&a.to_le_bytes());
        payload.extend_from_slice(&b.to_le_bytes());
        payload
    }

    /// Plays the part of the contracts behind the host: records every call
    /// it sees and decodes the two known selectors.
    #[derive(Default)]
    struct MockHost {
        state: Mutex<MockState>,
        failing: BTreeSet<Address>,
    }

    #[derive(Default)]
    struct MockState {
        calls: Vec<(Address, Vec<u8>)>,
        no_param_called: bool,
        param_called: bool,
        param1: u64,
        param2: u64,
    }

    impl MockHost {
        fn failing_for(targets: &[Address]) -> Self {
            MockHost {
                state: Mutex::new(MockState::default()),
                failing: targets.iter().copied().collect(),
            }
        }
    }

    impl CallHost for MockHost {
        fn raw_call(&self, target: &Address, payload: &[u8]) -> CallResult {
            let mut state = self.state.lock();
            state.calls.push((*target, payload.to_vec()));

            if self.failing.contains(target) {
                return CallResult::failed();
            }

            match payload.first() {
                Some(&SEL_NO_PARAM) => {
                    state.no_param_called = true;
                    CallResult::ok(Vec::new())
                }
                Some(&SEL_WITH_PARAMS) if payload.len() == 17 => {
                    state.param_called = true;
                    state.param1 = u64::from_le_bytes(payload[1..9].try_into().unwrap());
                    state.param2 = u64::from_le_bytes(payload[9..17].try_into().unwrap());
                    CallResult::ok(Vec::new())
                }
                _ => CallResult::failed(),
            }
        }
    }

    fn target(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn test_calls_a_function_without_params() {
        let host = Arc::new(MockHost::default());
        let syncer = CallSyncer::new(host.clone());

        assert!(!host.state.lock().no_param_called);

        syncer.add_pair(target(1), encode_no_param());
        let outcomes = syncer.sync();

        assert!(host.state.lock().no_param_called);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);
        assert_eq!(outcomes[0].target, target(1));
    }

    #[test]
    fn test_calls_a_function_with_params() {
        let host = Arc::new(MockHost::default());
        let syncer = CallSyncer::new(host.clone());

        assert!(!host.state.lock().param_called);

        syncer.add_pair(target(1), encode_with_params(10, 20));
        syncer.sync();

        let state = host.state.lock();
        assert!(state.param_called);
        assert_eq!(state.param1, 10);
        assert_eq!(state.param2, 20);
    }

    #[test]
    fn test_sync_continues_past_failing_target() {
        let host = Arc::new(MockHost::failing_for(&[target(2)]));
        let syncer = CallSyncer::new(host.clone());

        syncer.add_pair(target(1), encode_no_param());
        syncer.add_pair(target(2), encode_no_param());
        syncer.add_pair(target(3), encode_with_params(10, 20));

        let outcomes = syncer.sync();

        // Every pair was invoked exactly once, in registration order.
        let state = host.state.lock();
        assert_eq!(state.calls.len(), 3);
        assert_eq!(state.calls[0].0, target(1));
        assert_eq!(state.calls[1].0, target(2));
        assert_eq!(state.calls[2].0, target(3));
        drop(state);

        assert_eq!(
            outcomes.iter().map(|o| o.success).collect::<Vec<_>>(),
            vec![true, false, true]
        );
        assert_eq!(
            outcomes.iter().map(|o| o.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_malformed_payload_is_a_failed_outcome() {
        let host = Arc::new(MockHost::default());
        let syncer = CallSyncer::new(host.clone());

        syncer.add_pair(target(1), vec![0xff, 0xee]);
        syncer.add_pair(target(2), encode_no_param());

        let outcomes = syncer.sync();
        assert!(!outcomes[0].success);
        assert!(outcomes[1].success);
    }

    #[test]
    fn test_empty_registry_syncs_to_nothing() {
        let syncer = CallSyncer::new(Arc::new(MockHost::default()));
        assert!(syncer.is_empty());
        assert!(syncer.sync().is_empty());
    }

    #[test]
    fn test_registry_is_append_only_and_ordered() {
        let syncer = CallSyncer::new(Arc::new(MockHost::default()));
        syncer.add_pair(target(5), encode_no_param());
        syncer.add_pair(target(4), encode_no_param());

        let pairs = syncer.pairs();
        assert_eq!(syncer.len(), 2);
        assert_eq!(pairs[0].target, target(5));
        assert_eq!(pairs[1].target, target(4));
    }

    #[test]
    fn test_shared_handle_registration() {
        let syncer: Arc<CallSyncer> = Arc::new(CallSyncer::new(Arc::new(MockHost::default())));
        let handle = syncer.clone();

        handle.add_pair(target(1), encode_no_param());
        let outcomes = syncer.sync();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);

        // Pairs registered after a sync are picked up by the next one.
        handle.add_pair(target(2), encode_no_param());
        assert_eq!(syncer.sync().len(), 2);
    }

    /// Repeated syncs re-dispatch every pair: the registry is consumed
    /// read-only, never drained.
    #[test]
    fn test_sync_is_repeatable() {
        let host = Arc::new(MockHost::default());
        let syncer = CallSyncer::new(host.clone());
        syncer.add_pair(target(1), encode_no_param());

        syncer.sync();
        syncer.sync();

        assert_eq!(host.state.lock().calls.len(), 2);
    }
}
