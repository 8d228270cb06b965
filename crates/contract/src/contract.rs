//! The entry point of the bubble contract.

use std::fmt::Debug;

use bubble_db::{BubbleStore, KvStore};
use bubble_params::BubbleParams;
use bubble_primitives::{
    bubble::{BubbleBasics, BubbleStatus, OperatorL1, OperatorL2},
    host::{CallFrame, EvmHost},
    tasks::CrossChainTask,
    types::{is_estimation, Address, BubbleId},
};
use tracing::{debug, error, info, warn};

use crate::{
    config::{ContractCfg, Services},
    dispatch::{BubbleCall, Selector},
    errors::{BubbleError, ContractError, ContractResult, FatalError},
    gas::GasMeter,
    receipt::TxReceipt,
};

/// The gas the host must reserve for `input`.
pub fn required_gas(params: &BubbleParams, input: &[u8]) -> u64 {
    if input.is_empty() {
        return 0;
    }

    params.gas.bubble_gas
}

/// One invocation of the bubble contract.
///
/// Built per inbound call with exclusive access to the host and the store; dropped once the
/// call has run.
pub struct BubbleContract<'a, H, S> {
    pub(crate) cfg: &'a ContractCfg,
    pub(crate) host: &'a mut H,
    pub(crate) store: &'a mut BubbleStore<S>,
    pub(crate) services: Services<'a>,
    pub(crate) caller: Address,
    pub(crate) gas: GasMeter,
}

impl<H, S> Debug for BubbleContract<'_, H, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BubbleContract")
            .field("caller", &self.caller)
            .field("gas", &self.gas)
            .finish_non_exhaustive()
    }
}

impl<'a, H: EvmHost, S: KvStore> BubbleContract<'a, H, S> {
    /// Prepares an invocation by `caller` with `gas_limit` available.
    pub fn new(
        cfg: &'a ContractCfg,
        host: &'a mut H,
        store: &'a mut BubbleStore<S>,
        services: Services<'a>,
        caller: Address,
        gas_limit: u64,
    ) -> Self {
        Self {
            cfg,
            host,
            store,
            services,
            caller,
            gas: GasMeter::new(gas_limit),
        }
    }

    /// Gas consumed so far.
    pub const fn gas_used(&self) -> u64 {
        self.gas.used()
    }

    /// Decodes and executes a raw input.
    ///
    /// Returns `None` for an empty input and for every transaction executed in estimation mode.
    pub fn run(&mut self, input: &[u8]) -> Result<Option<Vec<u8>>, FatalError> {
        if input.is_empty() {
            return Ok(None);
        }

        let call = BubbleCall::decode(input)?;
        self.execute(call)
    }

    /// Executes a decoded call.
    pub fn execute(&mut self, call: BubbleCall) -> Result<Option<Vec<u8>>, FatalError> {
        let selector = call.selector();
        debug!(%selector, caller = ?self.caller, tx_hash = ?self.host.tx_hash(), "executing bubble call");

        match call {
            BubbleCall::AllotBubble { size_code } => {
                let result = self.allot_bubble(size_code);
                self.finish_tx(selector, result)
            }
            BubbleCall::UpdateBubbleState { bubble_id, state } => {
                let result = self.update_bubble_state(bubble_id, state);
                self.finish_tx(selector, result)
            }
            BubbleCall::StakingToken { bubble_id, asset } => {
                let result = self.staking_token(bubble_id, asset);
                self.finish_tx(selector, result)
            }
            BubbleCall::WithdrewToken { bubble_id } => {
                let result = self.withdrew_token(bubble_id);
                self.finish_tx(selector, result)
            }
            BubbleCall::SettleBubble {
                l2_settle_tx_hash,
                bubble_id,
                settlement,
            } => {
                let result = self.settle_bubble(l2_settle_tx_hash, bubble_id, settlement);
                self.finish_tx(selector, result)
            }
            BubbleCall::RemoteDeploy {
                bubble_id,
                address,
                amount,
                data,
            } => {
                let result = self.remote_deploy(bubble_id, address, amount, data);
                self.finish_tx(selector, result)
            }
            BubbleCall::RemoteCall {
                bubble_id,
                contract,
                data,
            } => {
                let result = self.remote_call(bubble_id, contract, data);
                self.finish_tx(selector, result)
            }
            BubbleCall::RemoteCallExecutor {
                caller,
                remote_tx_hash,
                bubble_id,
                contract,
                data,
            } => {
                let result =
                    self.remote_call_executor(caller, remote_tx_hash, bubble_id, contract, data);
                self.finish_tx(selector, result)
            }
            BubbleCall::RemoteClear { bubble_id, address } => {
                let result = self.remote_clear(bubble_id, address);
                self.finish_tx(selector, result)
            }
            BubbleCall::GetBubbleInfo { bubble_id } => self.get_bubble_info(bubble_id).map(Some),
            BubbleCall::GetL1HashByL2Hash {
                bubble_id,
                l2_tx_hash,
            } => self.get_l1_hash_by_l2_hash(bubble_id, l2_tx_hash).map(Some),
            BubbleCall::GetBubTxHashList { bubble_id, tx_type } => {
                self.get_bub_tx_hash_list(bubble_id, tx_type).map(Some)
            }
            BubbleCall::GetAccAsset { bubble_id, account } => {
                self.get_acc_asset(bubble_id, account).map(Some)
            }
        }
    }

    /// Turns the outcome of a transaction into its output and log.
    fn finish_tx(
        &mut self,
        selector: Selector,
        result: ContractResult<Option<TxReceipt>>,
    ) -> Result<Option<Vec<u8>>, FatalError> {
        let receipt = match result {
            Ok(None) => {
                debug!(%selector, "estimation finished without writes");
                return Ok(None);
            }
            Ok(Some(receipt)) => {
                info!(%selector, caller = ?self.caller, "bubble call succeeded");
                receipt
            }
            Err(ContractError::Business(err)) => {
                error!(%selector, code = err.code(), %err, "bubble call failed");
                TxReceipt::failure(selector, &err)
            }
            Err(ContractError::Fatal(err)) => {
                error!(%selector, %err, "bubble call aborted");
                return Err(err);
            }
        };

        self.host.add_log(receipt.log(self.cfg.accounts.contract));

        Ok(Some(receipt.output()))
    }

    // ── Shared helpers ───────────────────────────────────────────────

    pub(crate) fn is_estimation(&self) -> bool {
        is_estimation(&self.host.tx_hash())
    }

    /// Loads the basics and status of a bubble.
    ///
    /// Both records must be present and readable, otherwise the bubble does not exist.
    pub(crate) fn load_bubble(
        &self,
        bubble_id: &BubbleId,
    ) -> ContractResult<(BubbleBasics, BubbleStatus)> {
        let basics = self.store.get_basics(bubble_id);
        let status = self.store.get_status(bubble_id);

        match (basics, status) {
            (Ok(Some(basics)), Ok(Some(status))) => Ok((basics, status)),
            (Err(err), _) | (_, Err(err)) => {
                warn!(%bubble_id, %err, "unreadable bubble record");
                Err(BubbleError::BubbleNotExist.into())
            }
            _ => Err(BubbleError::BubbleNotExist.into()),
        }
    }

    pub(crate) fn primary_l1(basics: &BubbleBasics) -> ContractResult<&OperatorL1> {
        basics
            .primary_l1()
            .ok_or_else(|| FatalError::MissingOperators(basics.bubble_id).into())
    }

    pub(crate) fn primary_l2(basics: &BubbleBasics) -> ContractResult<&OperatorL2> {
        basics
            .primary_l2()
            .ok_or_else(|| FatalError::MissingOperators(basics.bubble_id).into())
    }

    pub(crate) fn post_task(&self, task: impl Into<CrossChainTask>) -> ContractResult<()> {
        let task = task.into();
        info!(%task, rpc = task.route().0, "posting cross-chain task");

        Ok(self.services.tasks.post(task)?)
    }

    /// Builds a frame executing the code at `target` on behalf of `caller`.
    pub(crate) fn frame(&self, caller: Address, target: Address, input: Vec<u8>) -> CallFrame {
        CallFrame {
            caller,
            address: target,
            code_address: target,
            code_hash: self.host.code_hash(&target),
            code: self.host.code(&target),
            input,
            value: Default::default(),
            gas: self.gas.remaining(),
        }
    }

    /// Executes `frame`, charging the gas it used to this invocation.
    ///
    /// A failed call returns the failure message.
    pub(crate) fn call_vm(&mut self, frame: CallFrame) -> ContractResult<Result<Vec<u8>, String>> {
        let limit = frame.gas;

        match self.host.call(frame) {
            Ok(outcome) => {
                self.gas.charge(outcome.gas_used)?;
                Ok(Ok(outcome.output))
            }
            Err(err) => {
                self.gas.charge(err.gas_used(limit))?;
                Ok(Err(err.to_string()))
            }
        }
    }
}
