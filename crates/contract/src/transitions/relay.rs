//! The remote contract relay: deployments into bubbles and calls across the two ledgers.

use bubble_db::KvStore;
use bubble_primitives::{
    asset::ContractInfo,
    host::EvmHost,
    tasks::{RemoteCallTask, RemoteDeployTask},
    types::{Address, BubbleId, TxHash},
};
use primitive_types::U256;
use tracing::{debug, info, warn};

use crate::{
    contract::BubbleContract,
    dispatch::Selector,
    errors::{BubbleError, ContractResult, FatalError},
    receipt::TxReceipt,
};

impl<H: EvmHost, S: KvStore> BubbleContract<'_, H, S> {
    /// Registers `address` in the bubble, escrowing `amount` for it, and has the operators
    /// deploy it on the sub-ledger.
    pub(crate) fn remote_deploy(
        &mut self,
        bubble_id: BubbleId,
        address: Address,
        amount: U256,
        data: Vec<u8>,
    ) -> ContractResult<Option<TxReceipt>> {
        self.gas.charge(self.cfg.params.gas.remote_deploy)?;

        let (basics, status) = self.load_bubble(&bubble_id)?;
        let config = self
            .cfg
            .params
            .size_config(basics.size)
            .map_err(FatalError::from)?;
        if amount < config.min_staking_amount {
            return Err(BubbleError::StakingAmountTooLow.into());
        }
        if self.host.balance(&self.caller) < amount {
            return Err(BubbleError::AccountNoEnough.into());
        }
        if !status.state.accepts_deploy() {
            return Err(BubbleError::BubbleIsPreRelease.into());
        }

        let code = match self.store.get_byte_code(&bubble_id, &address)? {
            Some(code) if !code.is_empty() => code,
            _ => self.host.code(&address),
        };
        if code.is_empty() {
            return Err(BubbleError::EmptyContractCode.into());
        }
        if self.store.get_contract(&bubble_id, &address)?.is_some() {
            return Err(BubbleError::ContractIsExist.into());
        }
        let rpc = Self::primary_l2(&basics)?.rpc.clone();
        let op_addr = Self::primary_l1(&basics)?.op_addr;

        if self.is_estimation() {
            return Ok(None);
        }

        let custody = self.cfg.accounts.custody;
        self.host.sub_balance(&self.caller, amount);
        self.host.add_balance(&custody, amount);

        self.store.put_byte_code(&bubble_id, &address, code)?;
        self.store.put_contract(
            &bubble_id,
            &ContractInfo {
                creator: self.caller,
                address,
                amount,
            },
        )?;
        info!(%bubble_id, ?address, %amount, "registered remote contract");

        if basics.is_l1_operator(&self.cfg.local_node) {
            self.post_task(RemoteDeployTask {
                tx_hash: self.host.tx_hash(),
                block_hash: self.host.block().hash,
                bubble_id,
                address,
                data,
                rpc,
                op_addr,
            })?;
        }

        Ok(Some(
            TxReceipt::success(Selector::RemoteDeploy)
                .with(&bubble_id)
                .with(&address),
        ))
    }

    pub(crate) fn remote_call(
        &mut self,
        bubble_id: BubbleId,
        contract: Address,
        data: Vec<u8>,
    ) -> ContractResult<Option<TxReceipt>> {
        self.gas.charge(self.cfg.params.gas.remote_call)?;

        let (basics, _) = self.load_bubble(&bubble_id)?;
        if self.store.get_contract(&bubble_id, &contract)?.is_none() {
            return Err(BubbleError::ContractNotExist.into());
        }

        if self.is_estimation() {
            return Ok(None);
        }

        if basics.is_l1_operator(&self.cfg.local_node) {
            self.post_task(RemoteCallTask {
                tx_hash: self.host.tx_hash(),
                caller: self.host.origin(),
                bubble_id,
                contract,
                data,
                rpc: Self::primary_l2(&basics)?.rpc.clone(),
                op_addr: Self::primary_l1(&basics)?.op_addr,
            })?;
        }

        Ok(Some(
            TxReceipt::success(Selector::RemoteCall)
                .with(&bubble_id)
                .with(&contract),
        ))
    }

    /// Executes on the parent chain a call made on the sub-ledger, as `caller`.
    ///
    /// Only the primary sub-ledger operator may relay. Unlike the other transactions the call is
    /// also executed, and its receipt returned, in estimation mode.
    pub(crate) fn remote_call_executor(
        &mut self,
        caller: Address,
        remote_tx_hash: TxHash,
        bubble_id: BubbleId,
        contract: Address,
        data: Vec<u8>,
    ) -> ContractResult<Option<TxReceipt>> {
        self.gas.charge(self.cfg.params.gas.remote_call_executor)?;

        let (basics, _) = self.load_bubble(&bubble_id)?;
        if Self::primary_l2(&basics)?.op_addr != self.caller {
            return Err(BubbleError::SenderIsNotOperator.into());
        }
        if self.host.code(&contract).is_empty() {
            return Err(BubbleError::EmptyContractCode.into());
        }

        debug!(%bubble_id, ?caller, ?contract, ?remote_tx_hash, "relaying remote call");
        let frame = self.frame(caller, contract, data);
        let output = match self.call_vm(frame)? {
            Ok(output) => output,
            Err(reason) if self.is_estimation() => {
                return Err(FatalError::Estimation(reason).into());
            }
            Err(reason) => {
                warn!(%bubble_id, ?contract, %reason, "relayed call failed");
                return Err(BubbleError::ContractReturns(reason).into());
            }
        };

        Ok(Some(
            TxReceipt::success(Selector::RemoteCallExecutor)
                .with(&bubble_id)
                .with(&remote_tx_hash)
                .with(&output),
        ))
    }

    /// Removes a registration and returns its escrow to the creator.
    pub(crate) fn remote_clear(
        &mut self,
        bubble_id: BubbleId,
        address: Address,
    ) -> ContractResult<Option<TxReceipt>> {
        self.gas.charge(self.cfg.params.gas.remote_clear)?;

        let info = self
            .store
            .get_contract(&bubble_id, &address)?
            .ok_or(BubbleError::ContractNotExist)?;
        if info.creator != self.caller {
            return Err(BubbleError::SenderIsNotCreator.into());
        }
        let custody = self.cfg.accounts.custody;
        if self.host.balance(&custody) < info.amount {
            warn!(%bubble_id, ?address, amount = %info.amount, "custody cannot return the escrow");
            return Err(BubbleError::AccountNoEnough.into());
        }

        if self.is_estimation() {
            return Ok(None);
        }

        self.store.delete_contract(&bubble_id, &address)?;
        self.host.sub_balance(&custody, info.amount);
        self.host.add_balance(&info.creator, info.amount);
        info!(%bubble_id, ?address, amount = %info.amount, "cleared remote contract");

        Ok(Some(
            TxReceipt::success(Selector::RemoteClear)
                .with(&bubble_id)
                .with(&address)
                .with(&info.amount),
        ))
    }
}
