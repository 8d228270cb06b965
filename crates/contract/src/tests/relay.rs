//! Remote deployment, call, relay and clear tests.

use bubble_primitives::{
    asset::ContractInfo, bubble::BubbleState, tasks::CrossChainTask, types::Address,
};
use bubble_test_utils::prelude::*;
use primitive_types::U256;

use super::common::{ether, native_asset, Harness};
use crate::{dispatch::BubbleCall, errors::FatalError};

const CONTRACT_CODE: &[u8] = &[0x60, 0x80, 0x60, 0x40, 0x52];

struct Deployed {
    harness: Harness,
    bubble_id: U256,
    creator: Address,
    contract: Address,
}

fn deploy(bubble_id: U256, address: Address, amount: U256) -> BubbleCall {
    BubbleCall::RemoteDeploy {
        bubble_id,
        address,
        amount,
        data: vec![0xde, 0xad],
    }
}

/// A bubble of size 1 with a registered contract, escrowing the size minimum.
fn deployed() -> Deployed {
    let mut harness = Harness::new(1, 1);
    let bubble_id = harness.allot(generate_address(), 1);
    let creator = harness.funded_account(ether(10));
    let contract = generate_address();
    harness.ledger.deploy_code(contract, CONTRACT_CODE.to_vec());

    let code = harness.tx(creator, deploy(bubble_id, contract, ether(1)));
    assert_eq!(code, 0);

    Deployed {
        harness,
        bubble_id,
        creator,
        contract,
    }
}

#[test]
fn deploy_escrows_and_posts_task() {
    let Deployed {
        harness,
        bubble_id,
        creator,
        contract,
    } = deployed();

    assert_eq!(harness.balance(&creator), ether(9));
    assert_eq!(harness.balance(&harness.custody()), ether(1));
    assert_eq!(
        harness.store.get_contract(&bubble_id, &contract).unwrap(),
        Some(ContractInfo {
            creator,
            address: contract,
            amount: ether(1),
        })
    );
    assert_eq!(
        harness.store.get_byte_code(&bubble_id, &contract).unwrap(),
        Some(CONTRACT_CODE.to_vec())
    );

    let basics = harness.basics(bubble_id);
    let tasks = harness.sink.tasks();
    let [CrossChainTask::RemoteDeploy(task)] = tasks.as_slice() else {
        panic!("expected one deploy task, got {tasks:?}");
    };
    assert_eq!(task.address, contract);
    assert_eq!(task.data, vec![0xde, 0xad]);
    assert_eq!(task.rpc, basics.operators_l2[0].rpc);
    assert_eq!(task.op_addr, basics.operators_l1[0].op_addr);
}

#[test]
fn deploy_rejections() {
    let mut harness = Harness::new(1, 1);
    let bubble_id = harness.allot(generate_address(), 1);
    let creator = harness.funded_account(ether(2));
    let contract = generate_address();

    assert_eq!(
        harness.tx(creator, deploy(U256::from(5u64), contract, ether(1))),
        310001
    );
    assert_eq!(
        harness.tx(creator, deploy(bubble_id, contract, ether(1) - U256::one())),
        310012
    );
    assert_eq!(
        harness.tx(creator, deploy(bubble_id, contract, ether(3))),
        310006
    );
    assert_eq!(
        harness.tx(creator, deploy(bubble_id, contract, ether(1))),
        310013
    );

    harness.ledger.deploy_code(contract, CONTRACT_CODE.to_vec());
    assert_eq!(harness.tx(creator, deploy(bubble_id, contract, ether(1))), 0);
    assert_eq!(
        harness.tx(creator, deploy(bubble_id, contract, ether(1))),
        310014
    );

    harness.advance(bubble_id, BubbleState::PreRelease);
    let other = generate_address();
    harness.ledger.deploy_code(other, CONTRACT_CODE.to_vec());
    assert_eq!(harness.tx(creator, deploy(bubble_id, other, ether(1))), 310004);
}

#[test]
fn released_bubble_rejects_deploy_but_allows_withdrawal() {
    let mut harness = Harness::new(1, 1);
    let bubble_id = harness.allot(generate_address(), 1);
    let creator = harness.funded_account(ether(5));
    let stake = BubbleCall::StakingToken {
        bubble_id,
        asset: native_asset(creator, ether(2)),
    };
    assert_eq!(harness.tx(creator, stake), 0);
    harness.advance(bubble_id, BubbleState::Released);

    let contract = generate_address();
    harness.ledger.deploy_code(contract, CONTRACT_CODE.to_vec());
    assert_eq!(harness.tx(creator, deploy(bubble_id, contract, ether(1))), 310004);
    assert_eq!(harness.store.get_contract(&bubble_id, &contract).unwrap(), None);

    assert_eq!(
        harness.tx(creator, BubbleCall::WithdrewToken { bubble_id }),
        0
    );
    assert_eq!(harness.balance(&creator), ether(5));
}

#[test]
fn deploy_without_size_class_is_fatal() {
    let mut harness = Harness::new(1, 1);
    let bubble_id = harness.allot(generate_address(), 1);
    let creator = harness.funded_account(ether(2));
    harness.cfg.params.size_classes.retain(|config| config.code != 1);

    let result = harness.execute(creator, deploy(bubble_id, generate_address(), ether(1)));

    assert!(matches!(result, Err(FatalError::Params(_))));
}

#[test]
fn redeploy_uses_cached_bytecode() {
    let Deployed {
        mut harness,
        bubble_id,
        creator,
        contract,
    } = deployed();

    assert_eq!(
        harness.tx(creator, BubbleCall::RemoteClear { bubble_id, address: contract }),
        0
    );
    harness.ledger.deploy_code(contract, Vec::new());

    assert_eq!(harness.tx(creator, deploy(bubble_id, contract, ether(1))), 0);
}

#[test]
fn deploy_estimation_writes_nothing() {
    let mut harness = Harness::new(1, 1);
    let bubble_id = harness.allot(generate_address(), 1);
    let creator = harness.funded_account(ether(2));
    let contract = generate_address();
    harness.ledger.deploy_code(contract, CONTRACT_CODE.to_vec());

    let before = harness.store.clone();
    let result = harness.estimate(creator, deploy(bubble_id, contract, ether(1)));

    assert!(matches!(result, Ok(None)));
    assert_eq!(harness.store, before);
    assert_eq!(harness.balance(&creator), ether(2));
    assert!(harness.sink.tasks().is_empty());
}

#[test]
fn remote_call_posts_task_with_origin() {
    let Deployed {
        mut harness,
        bubble_id,
        contract,
        ..
    } = deployed();
    let origin = generate_address();
    harness.ledger.set_origin(origin);

    let tx_hash = harness.next_tx();
    let output = harness
        .execute(
            generate_address(),
            BubbleCall::RemoteCall {
                bubble_id,
                contract,
                data: vec![1, 2, 3],
            },
        )
        .unwrap();

    assert_eq!(output, Some(b"0".to_vec()));
    let tasks = harness.sink.tasks();
    let Some(CrossChainTask::RemoteCall(task)) = tasks.last() else {
        panic!("expected a call task, got {tasks:?}");
    };
    assert_eq!(task.tx_hash, tx_hash);
    assert_eq!(task.caller, origin);
    assert_eq!(task.contract, contract);
    assert_eq!(task.data, vec![1, 2, 3]);
}

#[test]
fn remote_call_requires_registration() {
    let Deployed {
        mut harness,
        bubble_id,
        ..
    } = deployed();

    let code = harness.tx(
        generate_address(),
        BubbleCall::RemoteCall {
            bubble_id,
            contract: generate_address(),
            data: Vec::new(),
        },
    );

    assert_eq!(code, 310015);
}

#[test]
fn non_operator_nodes_post_no_relay_tasks() {
    let Deployed {
        mut harness,
        bubble_id,
        contract,
        ..
    } = deployed();
    let tasks_before = harness.sink.tasks().len();
    harness.cfg.local_node = generate_node_id();

    let code = harness.tx(
        generate_address(),
        BubbleCall::RemoteCall {
            bubble_id,
            contract,
            data: Vec::new(),
        },
    );

    assert_eq!(code, 0);
    assert_eq!(harness.sink.tasks().len(), tasks_before);
}

#[test]
fn executor_relays_as_the_original_caller() {
    let Deployed {
        mut harness,
        bubble_id,
        contract,
        ..
    } = deployed();
    let operator = harness.operator(bubble_id);
    let original = generate_address();
    let remote_tx_hash = generate_hash();

    let code = harness.tx(
        operator,
        BubbleCall::RemoteCallExecutor {
            caller: original,
            remote_tx_hash,
            bubble_id,
            contract,
            data: vec![9, 9],
        },
    );

    assert_eq!(code, 0);
    let call = harness.ledger.calls().last().unwrap();
    assert_eq!(call.caller, original);
    assert_eq!(call.address, contract);
    assert_eq!(call.code, CONTRACT_CODE.to_vec());
    assert_eq!(call.input, vec![9, 9]);
    assert_eq!(
        rlp::decode::<primitive_types::H256>(&harness.last_log_fields()[1]).unwrap(),
        remote_tx_hash
    );
}

#[test]
fn executor_rejections() {
    let Deployed {
        mut harness,
        bubble_id,
        contract,
        ..
    } = deployed();
    let operator = harness.operator(bubble_id);
    let relay = |contract| BubbleCall::RemoteCallExecutor {
        caller: Address::repeat_byte(1),
        remote_tx_hash: generate_hash(),
        bubble_id,
        contract,
        data: Vec::new(),
    };

    assert_eq!(harness.tx(generate_address(), relay(contract)), 310016);
    assert_eq!(harness.tx(operator, relay(generate_address())), 310013);

    harness.ledger.revert_calls_to(contract);
    assert_eq!(harness.tx(operator, relay(contract)), 310018);
}

#[test]
fn executor_in_estimation() {
    let Deployed {
        mut harness,
        bubble_id,
        contract,
        ..
    } = deployed();
    let operator = harness.operator(bubble_id);
    let relay = BubbleCall::RemoteCallExecutor {
        caller: generate_address(),
        remote_tx_hash: generate_hash(),
        bubble_id,
        contract,
        data: Vec::new(),
    };

    let result = harness.estimate(operator, relay.clone());
    assert_eq!(result.unwrap(), Some(b"0".to_vec()));

    harness.ledger.revert_calls_to(contract);
    let result = harness.estimate(operator, relay);
    assert!(matches!(result, Err(FatalError::Estimation(_))));
}

#[test]
fn clear_returns_escrow_to_creator() {
    let Deployed {
        mut harness,
        bubble_id,
        creator,
        contract,
    } = deployed();

    assert_eq!(
        harness.tx(
            generate_address(),
            BubbleCall::RemoteClear {
                bubble_id,
                address: contract
            }
        ),
        310017
    );
    assert_eq!(
        harness.tx(
            creator,
            BubbleCall::RemoteClear {
                bubble_id,
                address: generate_address()
            }
        ),
        310015
    );

    let clear = BubbleCall::RemoteClear {
        bubble_id,
        address: contract,
    };
    let before = harness.store.clone();
    assert!(matches!(harness.estimate(creator, clear.clone()), Ok(None)));
    assert_eq!(harness.store, before);

    assert_eq!(harness.tx(creator, clear), 0);
    assert_eq!(harness.balance(&creator), ether(10));
    assert_eq!(harness.balance(&harness.custody()), U256::zero());
    assert_eq!(harness.store.get_contract(&bubble_id, &contract).unwrap(), None);
}

#[test]
fn clear_needs_the_escrow_in_custody() {
    let Deployed {
        mut harness,
        bubble_id,
        creator,
        contract,
    } = deployed();
    let custody = harness.custody();
    harness.ledger.set_balance(custody, ether(1) - U256::one());

    let clear = BubbleCall::RemoteClear {
        bubble_id,
        address: contract,
    };
    assert_eq!(harness.tx(creator, clear), 310006);

    assert_eq!(harness.balance(&creator), ether(9));
    assert_eq!(harness.balance(&custody), ether(1) - U256::one());
    assert!(harness
        .store
        .get_contract(&bubble_id, &contract)
        .unwrap()
        .is_some());
}
