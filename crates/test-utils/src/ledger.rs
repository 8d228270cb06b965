//! An in-memory [`EvmHost`] with just enough of a virtual machine to exercise the bubble contract.
//!
//! Token contracts understand `transfer(address,uint256)` and keep their balances in the
//! ledger. Any other contract accepts every call and returns nothing, unless it has been told to
//! revert. Every executed frame is recorded so tests can inspect what was called and with which
//! caller.

use std::collections::{BTreeMap, BTreeSet};

use bubble_primitives::{
    constants::{ABI_WORD_LEN, SELECTOR_LEN, TOKEN_TRANSFER_SIGNATURE},
    hashing::{function_selector, keccak256},
    host::{BlockContext, CallFrame, CallOutcome, EvmHost, ExecError, Log},
    types::{Address, TxHash},
};
use primitive_types::{H256, U256};

/// Gas reported as used by every emulated call.
pub const EMULATED_CALL_GAS: u64 = 5_000;

/// Placeholder code installed for emulated token contracts.
pub const TOKEN_CODE: &[u8] = b"emulated-erc20";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LedgerState {
    balances: BTreeMap<Address, U256>,
    code: BTreeMap<Address, Vec<u8>>,
    /// token -> holder -> balance
    tokens: BTreeMap<Address, BTreeMap<Address, U256>>,
    logs: Vec<Log>,
}

/// See the module documentation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    block: BlockContext,
    tx_hash: TxHash,
    origin: Address,
    nonces: BTreeMap<Address, u64>,
    state: LedgerState,
    snapshots: Vec<LedgerState>,
    reverting: BTreeSet<Address>,
    calls: Vec<CallFrame>,
}

impl InMemoryLedger {
    /// Creates an empty ledger executing `tx_hash` in block `block`.
    pub fn new(block: BlockContext, tx_hash: TxHash) -> Self {
        Self {
            block,
            tx_hash,
            ..Default::default()
        }
    }

    /// Switches to a new transaction.
    pub fn set_tx_hash(&mut self, tx_hash: TxHash) {
        self.tx_hash = tx_hash;
    }

    /// Sets the signer of the current transaction.
    pub fn set_origin(&mut self, origin: Address) {
        self.origin = origin;
    }

    /// Sets the current block.
    pub fn set_block(&mut self, block: BlockContext) {
        self.block = block;
    }

    /// Sets the nonce of `address`.
    pub fn set_nonce(&mut self, address: Address, nonce: u64) {
        self.nonces.insert(address, nonce);
    }

    /// Sets the native balance of `address`.
    pub fn set_balance(&mut self, address: Address, amount: U256) {
        self.state.balances.insert(address, amount);
    }

    /// Installs an emulated token contract at `token`.
    pub fn deploy_token(&mut self, token: Address) {
        self.state.code.insert(token, TOKEN_CODE.to_vec());
        self.state.tokens.entry(token).or_default();
    }

    /// Credits `amount` of `token` to `holder`.
    pub fn mint_token(&mut self, token: Address, holder: Address, amount: U256) {
        let balance = self
            .state
            .tokens
            .entry(token)
            .or_default()
            .entry(holder)
            .or_default();
        *balance = balance.saturating_add(amount);
    }

    /// The balance of `token` held by `holder`.
    pub fn token_balance(&self, token: &Address, holder: &Address) -> U256 {
        self.state
            .tokens
            .get(token)
            .and_then(|holders| holders.get(holder))
            .copied()
            .unwrap_or_default()
    }

    /// Installs arbitrary code at `address`.
    pub fn deploy_code(&mut self, address: Address, code: Vec<u8>) {
        self.state.code.insert(address, code);
    }

    /// Makes every call executing the code of `address` revert.
    pub fn revert_calls_to(&mut self, address: Address) {
        self.reverting.insert(address);
    }

    /// All frames executed so far, in order.
    pub fn calls(&self) -> &[CallFrame] {
        &self.calls
    }

    /// All logs emitted and not reverted.
    pub fn logs(&self) -> &[Log] {
        &self.state.logs
    }

    fn execute_transfer(&mut self, frame: &CallFrame) -> Result<CallOutcome, ExecError> {
        let (to, amount) = decode_transfer(&frame.input).ok_or(ExecError::Reverted {
            output: b"malformed transfer".to_vec(),
            gas_used: EMULATED_CALL_GAS,
        })?;

        let holders = self.state.tokens.entry(frame.address).or_default();
        let from_balance = holders.get(&frame.caller).copied().unwrap_or_default();
        if from_balance < amount {
            return Err(ExecError::Reverted {
                output: b"insufficient token balance".to_vec(),
                gas_used: EMULATED_CALL_GAS,
            });
        }

        holders.insert(frame.caller, from_balance - amount);
        let to_balance = holders.entry(to).or_default();
        *to_balance = to_balance.saturating_add(amount);

        let mut output = vec![0u8; ABI_WORD_LEN];
        output[ABI_WORD_LEN - 1] = 1;

        Ok(CallOutcome {
            output,
            gas_used: EMULATED_CALL_GAS,
        })
    }
}

fn decode_transfer(input: &[u8]) -> Option<(Address, U256)> {
    if input.len() != SELECTOR_LEN + 2 * ABI_WORD_LEN {
        return None;
    }
    if input[..SELECTOR_LEN] != function_selector(TOKEN_TRANSFER_SIGNATURE) {
        return None;
    }

    let to_word = &input[SELECTOR_LEN..SELECTOR_LEN + ABI_WORD_LEN];
    let amount_word = &input[SELECTOR_LEN + ABI_WORD_LEN..];

    Some((
        Address::from_slice(&to_word[ABI_WORD_LEN - 20..]),
        U256::from_big_endian(amount_word),
    ))
}

impl EvmHost for InMemoryLedger {
    fn block(&self) -> BlockContext {
        self.block
    }

    fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    fn origin(&self) -> Address {
        self.origin
    }

    fn nonce(&self, address: &Address) -> u64 {
        self.nonces.get(address).copied().unwrap_or_default()
    }

    fn balance(&self, address: &Address) -> U256 {
        self.state
            .balances
            .get(address)
            .copied()
            .unwrap_or_default()
    }

    fn add_balance(&mut self, address: &Address, amount: U256) {
        let balance = self.state.balances.entry(*address).or_default();
        *balance = balance.saturating_add(amount);
    }

    fn sub_balance(&mut self, address: &Address, amount: U256) {
        let balance = self.state.balances.entry(*address).or_default();
        *balance = balance.saturating_sub(amount);
    }

    fn code(&self, address: &Address) -> Vec<u8> {
        self.state.code.get(address).cloned().unwrap_or_default()
    }

    fn code_hash(&self, address: &Address) -> H256 {
        keccak256(self.code(address))
    }

    fn snapshot(&mut self) -> usize {
        self.snapshots.push(self.state.clone());
        self.snapshots.len() - 1
    }

    fn revert_to_snapshot(&mut self, id: usize) {
        if let Some(state) = self.snapshots.get(id).cloned() {
            self.state = state;
            self.snapshots.truncate(id);
        }
    }

    fn call(&mut self, frame: CallFrame) -> Result<CallOutcome, ExecError> {
        self.calls.push(frame.clone());

        if self.reverting.contains(&frame.code_address) {
            return Err(ExecError::Reverted {
                output: Vec::new(),
                gas_used: EMULATED_CALL_GAS,
            });
        }
        if frame.gas < EMULATED_CALL_GAS {
            return Err(ExecError::OutOfGas);
        }

        if self.state.tokens.contains_key(&frame.code_address) {
            return self.execute_transfer(&frame);
        }

        Ok(CallOutcome {
            output: Vec::new(),
            gas_used: EMULATED_CALL_GAS,
        })
    }

    fn add_log(&mut self, log: Log) {
        self.state.logs.push(log);
    }
}
