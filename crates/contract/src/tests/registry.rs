//! Allotment and lifecycle tests.

use bubble_params::BubbleParams;
use bubble_primitives::bubble::BubbleState;
use bubble_test_utils::prelude::*;
use primitive_types::{H256, U256};

use super::common::{Harness, BLOCK_NUMBER};
use crate::{dispatch::BubbleCall, errors::FatalError, Selector};

#[test]
fn allot_creates_bubble_from_free_nodes() {
    let mut harness = Harness::new(1, 1);
    let creator = generate_address();

    let bubble_id = harness.allot(creator, 1);

    assert_eq!(bubble_id, U256::one());
    assert_eq!(
        harness.last_log_topic(),
        H256::from_low_u64_be(Selector::AllotBubble as u64)
    );

    let basics = harness.basics(bubble_id);
    let nodes = harness.pool.nodes().to_vec();
    assert_eq!(basics.creator, creator);
    assert_eq!(basics.size, 1);
    assert_eq!(basics.created_block_number, BLOCK_NUMBER);
    assert_eq!(basics.operators_l1[0].node_id, nodes[0].node_id);
    assert_eq!(basics.operators_l2[0].node_id, nodes[1].node_id);
    assert_eq!(basics.operators_l2[0].rpc, nodes[1].rpc);
    assert_eq!(harness.state(bubble_id), BubbleState::Created);

    assert_eq!(harness.store.bubbles_of_size(1).unwrap(), vec![bubble_id]);
    for node in &nodes {
        assert_eq!(
            harness.store.node_bubble(&node.node_id).unwrap(),
            Some(bubble_id)
        );
    }
}

#[test]
fn full_pool_elects_and_activates() {
    let mut harness = Harness::new(1, 1);
    let first = harness.allot(generate_address(), 1);

    let elected = harness.allot(generate_address(), 1);

    assert_eq!(elected, first);
    assert_eq!(harness.state(first), BubbleState::Active);
    assert_eq!(harness.store.bubbles_of_size(1).unwrap().len(), 1);

    // an active bubble stays active when elected again
    assert_eq!(harness.allot(generate_address(), 1), first);
    assert_eq!(harness.state(first), BubbleState::Active);
}

#[test]
fn empty_pool_counts_as_full() {
    let mut harness = Harness::new(0, 0);

    let code = harness.tx(generate_address(), BubbleCall::AllotBubble { size_code: 1 });

    assert_eq!(code, 310020);
    assert!(harness.store.kv().is_empty());
}

#[test]
fn failed_element_check_falls_through_to_election() {
    let mut harness = Harness::new(2, 2);

    // size 2 needs three operators of each role
    assert_eq!(
        harness.tx(generate_address(), BubbleCall::AllotBubble { size_code: 2 }),
        310020
    );
    // unknown size classes have nothing to elect either
    assert_eq!(
        harness.tx(generate_address(), BubbleCall::AllotBubble { size_code: 42 }),
        310020
    );

    let small = harness.allot(generate_address(), 1);
    assert_eq!(small, U256::one());

    // half of the pool is used: creation is still attempted, fails, and election finds nothing
    assert_eq!(
        harness.tx(generate_address(), BubbleCall::AllotBubble { size_code: 2 }),
        310020
    );
}

#[test]
fn ratio_ceiling_forces_election() {
    let params = BubbleParams {
        max_node_use_ratio_bps: 0,
        ..Default::default()
    };
    let mut harness = Harness::with_params(params, StaticNodePool::generate(4, 4));

    let code = harness.tx(generate_address(), BubbleCall::AllotBubble { size_code: 1 });

    assert_eq!(code, 310020);
}

#[test]
fn pre_released_bubbles_are_not_electable() {
    let mut harness = Harness::new(1, 1);
    let bubble_id = harness.allot(generate_address(), 1);
    harness.advance(bubble_id, BubbleState::PreRelease);

    let code = harness.tx(generate_address(), BubbleCall::AllotBubble { size_code: 1 });

    assert_eq!(code, 310020);
}

#[test]
fn operator_selection_is_reproducible() {
    let pool = StaticNodePool::generate(6, 6);
    let creator = generate_address();

    let mut first = Harness::with_params(BubbleParams::default(), pool.clone());
    let mut second = Harness::with_params(BubbleParams::default(), pool);
    first.ledger.set_nonce(creator, 3);
    second.ledger.set_nonce(creator, 3);

    let a = first.allot(creator, 2);
    let b = second.allot(creator, 2);

    let (a, b) = (first.basics(a), second.basics(b));
    assert_eq!(a.operators_l1, b.operators_l1);
    assert_eq!(a.operators_l2, b.operators_l2);
    assert_eq!(a.operators_l1.len(), 3);
    assert_eq!(a.operators_l2.len(), 3);
}

#[test]
fn allot_estimation_writes_nothing() {
    let mut harness = Harness::new(1, 1);
    let caller = generate_address();

    let before = harness.store.clone();
    let result = harness.estimate(caller, BubbleCall::AllotBubble { size_code: 1 });

    assert!(matches!(result, Ok(None)));
    assert_eq!(harness.store, before);
    assert!(harness.ledger.logs().is_empty());

    // once the pool is full, estimation still reports the elected bubble without activating it
    let bubble_id = harness.allot(caller, 1);
    let before = harness.store.clone();
    let result = harness.estimate(caller, BubbleCall::AllotBubble { size_code: 1 });

    assert_eq!(result.unwrap(), Some(b"0".to_vec()));
    assert_eq!(harness.store, before);
    assert_eq!(harness.state(bubble_id), BubbleState::Created);
    assert!(harness.sink.tasks().is_empty());
}

#[test]
fn unavailable_services_abort() {
    let mut harness = Harness::with_params(BubbleParams::default(), StaticNodePool::unavailable());
    let result = harness.execute(generate_address(), BubbleCall::AllotBubble { size_code: 1 });
    assert!(matches!(result, Err(FatalError::Service(_))));

    let mut harness = Harness::new(1, 1);
    harness.nonces = FixedNonceHistory::unavailable();
    let result = harness.execute(generate_address(), BubbleCall::AllotBubble { size_code: 1 });
    assert!(matches!(result, Err(FatalError::Service(_))));
    assert!(harness.store.kv().is_empty());
}

#[test]
fn out_of_gas_before_any_write() {
    let mut harness = Harness::new(1, 1);

    let result = harness.execute_with_gas(
        generate_address(),
        BubbleCall::AllotBubble { size_code: 1 },
        100,
    );

    assert!(matches!(result, Err(FatalError::OutOfGas)));
    assert!(harness.store.kv().is_empty());
    assert!(harness.ledger.logs().is_empty());
}

#[test]
fn only_the_operator_updates_state() {
    let mut harness = Harness::new(1, 1);
    let bubble_id = harness.allot(generate_address(), 1);

    let code = harness.tx(
        generate_address(),
        BubbleCall::UpdateBubbleState {
            bubble_id,
            state: BubbleState::PreRelease,
        },
    );

    assert_eq!(code, 310016);
    assert_eq!(harness.state(bubble_id), BubbleState::Created);
}

#[test]
fn state_only_moves_forward() {
    let mut harness = Harness::new(1, 1);
    let bubble_id = harness.allot(generate_address(), 1);
    let operator = harness.operator(bubble_id);

    let to_active = BubbleCall::UpdateBubbleState {
        bubble_id,
        state: BubbleState::Active,
    };
    assert_eq!(harness.tx(operator, to_active), 310022);

    harness.advance(bubble_id, BubbleState::PreRelease);
    let again = BubbleCall::UpdateBubbleState {
        bubble_id,
        state: BubbleState::PreRelease,
    };
    assert_eq!(harness.tx(operator, again), 310022);
    assert_eq!(harness.state(bubble_id), BubbleState::PreRelease);

    let missing = BubbleCall::UpdateBubbleState {
        bubble_id: U256::from(99u64),
        state: BubbleState::Released,
    };
    assert_eq!(harness.tx(operator, missing), 310001);
}

#[test]
fn release_frees_operator_nodes() {
    let mut harness = Harness::new(1, 1);
    let first = harness.allot(generate_address(), 1);

    harness.advance(first, BubbleState::Released);

    assert_eq!(harness.state(first), BubbleState::Released);
    for node in harness.pool.nodes() {
        assert_eq!(harness.store.node_bubble(&node.node_id).unwrap(), None);
    }

    // the freed nodes staff the next bubble
    let second = harness.allot(generate_address(), 1);
    assert_eq!(second, U256::from(2u64));
    assert_eq!(harness.state(second), BubbleState::Created);
}

#[test]
fn update_state_estimation_writes_nothing() {
    let mut harness = Harness::new(1, 1);
    let bubble_id = harness.allot(generate_address(), 1);
    let operator = harness.operator(bubble_id);

    let before = harness.store.clone();
    let result = harness.estimate(
        operator,
        BubbleCall::UpdateBubbleState {
            bubble_id,
            state: BubbleState::Released,
        },
    );

    assert!(matches!(result, Ok(None)));
    assert_eq!(harness.store, before);
    assert_eq!(harness.state(bubble_id), BubbleState::Created);
}
