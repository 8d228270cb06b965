//! Fixtures shared by the contract tests.

use bubble_db::{BubbleStore, InMemoryKv};
use bubble_params::BubbleParams;
use bubble_primitives::{
    asset::{AccTokenAsset, AccountAsset},
    bubble::{BubbleBasics, BubbleState},
    host::{BlockContext, EvmHost},
    types::{Address, BubbleId, TxHash, ESTIMATION_TX_HASH},
};
use bubble_test_utils::prelude::*;
use primitive_types::{H256, U256};
use rlp::Rlp;
use serde_json::Value;

use crate::{
    config::{ContractCfg, Services},
    contract::BubbleContract,
    dispatch::BubbleCall,
    errors::FatalError,
};

pub(crate) const GAS_LIMIT: u64 = 1_000_000;
pub(crate) const BLOCK_NUMBER: u64 = 100;

/// 1 ether in wei.
pub(crate) fn ether(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

pub(crate) fn native_asset(account: Address, amount: U256) -> AccountAsset {
    AccountAsset {
        account,
        native_amount: amount,
        token_assets: Vec::new(),
    }
}

pub(crate) fn token_asset(account: Address, native: U256, tokens: &[(Address, U256)]) -> AccountAsset {
    AccountAsset {
        account,
        native_amount: native,
        token_assets: tokens
            .iter()
            .map(|(token_addr, balance)| AccTokenAsset {
                token_addr: *token_addr,
                balance: *balance,
            })
            .collect(),
    }
}

/// A node running the contract, with every collaborator in memory.
pub(crate) struct Harness {
    pub(crate) cfg: ContractCfg,
    pub(crate) ledger: InMemoryLedger,
    pub(crate) store: BubbleStore<InMemoryKv>,
    pub(crate) pool: StaticNodePool,
    pub(crate) nonces: FixedNonceHistory,
    pub(crate) sink: RecordingTaskSink,
}

impl Harness {
    /// A node with the default parameters and a pool of `l1` + `l2` candidates.
    ///
    /// The local node is the first parent-chain candidate.
    pub(crate) fn new(l1: usize, l2: usize) -> Self {
        Self::with_params(BubbleParams::default(), StaticNodePool::generate(l1, l2))
    }

    pub(crate) fn with_params(params: BubbleParams, pool: StaticNodePool) -> Self {
        let local_node = pool
            .nodes()
            .first()
            .map(|node| node.node_id)
            .unwrap_or_default();
        let block = BlockContext {
            number: BLOCK_NUMBER,
            hash: generate_hash(),
            parent_hash: generate_hash(),
        };

        Self {
            cfg: ContractCfg::new(params, local_node),
            ledger: InMemoryLedger::new(block, generate_hash()),
            store: BubbleStore::new(InMemoryKv::new()),
            pool,
            nonces: FixedNonceHistory::new(vec![vec![0x11; 32], vec![0x22; 32]]),
            sink: RecordingTaskSink::new(),
        }
    }

    /// Executes `call` from `caller` in the current transaction.
    pub(crate) fn execute(
        &mut self,
        caller: Address,
        call: BubbleCall,
    ) -> Result<Option<Vec<u8>>, FatalError> {
        self.execute_with_gas(caller, call, GAS_LIMIT)
    }

    pub(crate) fn execute_with_gas(
        &mut self,
        caller: Address,
        call: BubbleCall,
        gas_limit: u64,
    ) -> Result<Option<Vec<u8>>, FatalError> {
        let services = Services {
            node_pool: &self.pool,
            nonce_history: &self.nonces,
            tasks: &self.sink,
        };
        let mut contract = BubbleContract::new(
            &self.cfg,
            &mut self.ledger,
            &mut self.store,
            services,
            caller,
            gas_limit,
        );

        contract.execute(call)
    }

    /// Runs a raw input from `caller` in the current transaction.
    pub(crate) fn run(&mut self, caller: Address, input: &[u8]) -> Result<Option<Vec<u8>>, FatalError> {
        let services = Services {
            node_pool: &self.pool,
            nonce_history: &self.nonces,
            tasks: &self.sink,
        };
        let mut contract = BubbleContract::new(
            &self.cfg,
            &mut self.ledger,
            &mut self.store,
            services,
            caller,
            GAS_LIMIT,
        );

        contract.run(input)
    }

    /// Executes `call` in a fresh transaction and returns its business code.
    pub(crate) fn tx(&mut self, caller: Address, call: BubbleCall) -> u32 {
        self.next_tx();
        let output = self
            .execute(caller, call)
            .expect("no fatal error")
            .expect("transactions return a code");

        String::from_utf8(output)
            .expect("utf-8 code")
            .parse()
            .expect("decimal code")
    }

    /// Executes `call` in estimation mode.
    pub(crate) fn estimate(
        &mut self,
        caller: Address,
        call: BubbleCall,
    ) -> Result<Option<Vec<u8>>, FatalError> {
        self.ledger.set_tx_hash(ESTIMATION_TX_HASH);
        self.execute(caller, call)
    }

    /// Executes a query and returns its code and value.
    pub(crate) fn query(&mut self, call: BubbleCall) -> (u32, Value) {
        let output = self
            .execute(generate_address(), call)
            .expect("queries never abort")
            .expect("queries return a document");
        let json: Value = serde_json::from_slice(&output).expect("json result");

        let code = json["Code"].as_u64().expect("numeric code") as u32;
        (code, json["Ret"].clone())
    }

    /// Switches to a new, real transaction.
    pub(crate) fn next_tx(&mut self) -> TxHash {
        let tx_hash = generate_hash();
        self.ledger.set_tx_hash(tx_hash);
        tx_hash
    }

    /// The data fields of the last log, after the code.
    pub(crate) fn last_log_fields(&self) -> Vec<Vec<u8>> {
        let log = self.ledger.logs().last().expect("a log was emitted");
        Rlp::new(&log.data)
            .iter()
            .skip(1)
            .map(|item| item.as_raw().to_vec())
            .collect()
    }

    /// The topic of the last log.
    pub(crate) fn last_log_topic(&self) -> H256 {
        self.ledger.logs().last().expect("a log was emitted").topics[0]
    }

    /// Allots a bubble of `size` for `creator` and returns its id.
    pub(crate) fn allot(&mut self, creator: Address, size: u8) -> BubbleId {
        let code = self.tx(creator, BubbleCall::AllotBubble { size_code: size });
        assert_eq!(code, 0, "allotment failed");

        rlp::decode(&self.last_log_fields()[0]).expect("bubble id field")
    }

    pub(crate) fn basics(&self, bubble_id: BubbleId) -> BubbleBasics {
        self.store
            .get_basics(&bubble_id)
            .unwrap()
            .expect("bubble exists")
    }

    pub(crate) fn state(&self, bubble_id: BubbleId) -> BubbleState {
        self.store
            .get_status(&bubble_id)
            .unwrap()
            .expect("bubble exists")
            .state
    }

    /// The primary sub-ledger operator of the bubble.
    pub(crate) fn operator(&self, bubble_id: BubbleId) -> Address {
        self.basics(bubble_id).operators_l2[0].op_addr
    }

    /// Moves the bubble to `state` on behalf of its operator.
    pub(crate) fn advance(&mut self, bubble_id: BubbleId, state: BubbleState) {
        let operator = self.operator(bubble_id);
        let code = self.tx(operator, BubbleCall::UpdateBubbleState { bubble_id, state });
        assert_eq!(code, 0, "state update failed");
    }

    /// Creates an account holding `amount` of native currency.
    pub(crate) fn funded_account(&mut self, amount: U256) -> Address {
        let account = generate_address();
        self.ledger.set_balance(account, amount);
        account
    }

    /// Deploys an emulated token and mints `amount` of it to `holder`.
    pub(crate) fn token_for(&mut self, holder: Address, amount: U256) -> Address {
        let token = generate_address();
        self.ledger.deploy_token(token);
        self.ledger.mint_token(token, holder, amount);
        token
    }

    pub(crate) fn custody(&self) -> Address {
        self.cfg.accounts.custody
    }

    pub(crate) fn balance(&self, account: &Address) -> U256 {
        self.ledger.balance(account)
    }
}
