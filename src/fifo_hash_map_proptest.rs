#![cfg(test)]

// Property tests for FifoHashMap kept inside the crate so every step can
// sweep the structural invariants, not just the public surface.
//
// The model is a VecDeque of (key, value) pairs in FIFO order. Values are
// minted from a counter and never repeat, so a removal can be matched to the
// exact model entry even when duplicate keys are in play: the map picks the
// first probe-order duplicate, the model is corrected to whichever entry the
// map chose, and everything else must still line up.

use crate::fifo_hash_map::FifoHashMap;
use crate::hashers::IdentityState;
use core::hash::BuildHasher;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::VecDeque;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Push(usize),
    PopFront,
    Remove(usize),
    Get(usize),
    Contains(usize),
    Iterate,
}

fn arb_ops(pool: usize, max_len: usize) -> impl Strategy<Value = Vec<OpI>> {
    let op = prop_oneof![
        3 => (0..pool).prop_map(OpI::Push),
        2 => Just(OpI::PopFront),
        2 => (0..pool).prop_map(OpI::Remove),
        1 => (0..pool).prop_map(OpI::Get),
        1 => (0..pool).prop_map(OpI::Contains),
        1 => Just(OpI::Iterate),
    ];
    proptest::collection::vec(op, 1..max_len)
}

fn run_scenario<S: BuildHasher>(
    mut sut: FifoHashMap<u16, u64, S>,
    keys: &[u16],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: VecDeque<(u16, u64)> = VecDeque::new();
    let mut next_value: u64 = 0;

    for op in ops {
        match op {
            OpI::Push(i) => {
                let key = keys[i];
                let value = next_value;
                next_value += 1;
                prop_assert!(sut.push_back(key, value).is_ok());
                model.push_back((key, value));
            }
            OpI::PopFront => {
                prop_assert_eq!(sut.pop_front(), model.pop_front());
            }
            OpI::Remove(i) => {
                let key = keys[i];
                match sut.remove(&key) {
                    Some((k, v)) => {
                        prop_assert_eq!(k, key);
                        // The map removes the first probe-order duplicate;
                        // trust its pick and require the model to contain it.
                        let pos = model.iter().position(|&(_, mv)| mv == v);
                        let pos = match pos {
                            Some(p) => p,
                            None => return Err(TestCaseError::fail("removed value not in model")),
                        };
                        prop_assert_eq!(model[pos].0, key);
                        model.remove(pos);
                    }
                    None => {
                        prop_assert!(model.iter().all(|&(mk, _)| mk != key));
                    }
                }
            }
            OpI::Get(i) => {
                let key = keys[i];
                match sut.get(&key) {
                    Some(&v) => prop_assert!(model.contains(&(key, v))),
                    None => prop_assert!(model.iter().all(|&(mk, _)| mk != key)),
                }
            }
            OpI::Contains(i) => {
                let key = keys[i];
                let expected = model.iter().any(|&(mk, _)| mk == key);
                prop_assert_eq!(sut.contains_key(&key), expected);
            }
            OpI::Iterate => {
                let seen: Vec<(u16, u64)> = sut.iter().map(|(&k, &v)| (k, v)).collect();
                let expected: Vec<(u16, u64)> = model.iter().copied().collect();
                prop_assert_eq!(seen, expected);
            }
        }

        // Post-conditions after each op: size parity and the full
        // reachability/coherence/list/size/capacity sweep.
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        sut.check_invariants();
    }
    Ok(())
}

// Property: state-machine equivalence against a FIFO model under the default
// hasher, starting from a small table so rehashing triggers routinely.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_default_hasher(
        (keys, ops) in proptest::collection::vec(any::<u16>(), 1..=8)
            .prop_flat_map(|keys| {
                let len = keys.len();
                (Just(keys), arb_ops(len, 60))
            }),
    ) {
        let sut: FifoHashMap<u16, u64> = FifoHashMap::with_capacity(8);
        run_scenario(sut, &keys, ops)?;
    }
}

// Property: same equivalence under worst-case collisions: identity hashing
// with every key congruent mod the initial capacity, so all probe chains
// share one home slot and deletion repair plus wraparound run constantly.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_identity_collisions(
        (pool, ops) in (1usize..=6)
            .prop_flat_map(|pool| (Just(pool), arb_ops(pool, 80))),
    ) {
        let keys: Vec<u16> = (0..pool as u16).map(|i| i * 8).collect();
        let sut: FifoHashMap<u16, u64, IdentityState> =
            FifoHashMap::with_capacity_and_hasher(8, IdentityState);
        run_scenario(sut, &keys, ops)?;
    }
}
