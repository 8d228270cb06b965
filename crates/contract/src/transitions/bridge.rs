//! The asset bridge: staking into and withdrawing from bubbles.

use bubble_db::KvStore;
use bubble_primitives::{
    asset::AccountAsset,
    bubble::BubTxType,
    host::EvmHost,
    tasks::MintTokenTask,
    types::{Address, BubbleId},
};
use tracing::{debug, warn};

use crate::{
    contract::BubbleContract,
    dispatch::Selector,
    erc20,
    errors::{BubbleError, ContractResult, FatalError},
    receipt::TxReceipt,
};

impl<H: EvmHost, S: KvStore> BubbleContract<'_, H, S> {
    pub(crate) fn staking_token(
        &mut self,
        bubble_id: BubbleId,
        asset: AccountAsset,
    ) -> ContractResult<Option<TxReceipt>> {
        self.gas.charge(self.cfg.params.gas.staking_token)?;

        if asset.account != self.caller {
            return Err(BubbleError::StakingAccount.into());
        }
        let (basics, status) = self.load_bubble(&bubble_id)?;
        if !status.state.accepts_stake() {
            return Err(BubbleError::BubbleIsReleased.into());
        }
        if self.host.balance(&self.caller) < asset.native_amount {
            return Err(BubbleError::AccountNoEnough.into());
        }
        let primary = Self::primary_l1(&basics)?;
        let (primary_node, op_addr) = (primary.node_id, primary.op_addr);
        let rpc = Self::primary_l2(&basics)?.rpc.clone();

        debug!(%bubble_id, account = ?asset.account, tokens = asset.token_assets.len(), "staking");
        self.transfer_assets(self.caller, self.cfg.accounts.custody, &asset)?;

        if self.is_estimation() {
            return Ok(None);
        }

        let tx_hash = self.host.tx_hash();
        self.store.add_acc_asset(&bubble_id, &asset)?;
        self.store
            .push_tx_hash(&bubble_id, BubTxType::StakingToken, tx_hash)?;

        if primary_node == self.cfg.local_node {
            self.post_task(MintTokenTask {
                tx_hash,
                bubble_id,
                acc_asset: asset.clone(),
                rpc,
                op_addr,
            })?;
        }

        Ok(Some(
            TxReceipt::success(Selector::StakingToken)
                .with(&bubble_id)
                .with(&asset),
        ))
    }

    pub(crate) fn withdrew_token(&mut self, bubble_id: BubbleId) -> ContractResult<Option<TxReceipt>> {
        self.gas.charge(self.cfg.params.gas.withdrew_token)?;

        let (_, status) = self.load_bubble(&bubble_id)?;
        if !status.state.accepts_withdrawal() {
            return Err(BubbleError::BubbleIsNotReleased.into());
        }
        let asset = self
            .store
            .get_acc_asset(&bubble_id, &self.caller)?
            .ok_or(BubbleError::AccountAssetNotExist)?;

        debug!(%bubble_id, account = ?asset.account, "withdrawing");
        self.transfer_assets(self.cfg.accounts.custody, self.caller, &asset)?;

        if self.is_estimation() {
            return Ok(None);
        }

        self.store.store_acc_asset(&bubble_id, &asset.zeroed())?;
        self.store
            .push_tx_hash(&bubble_id, BubTxType::WithdrewToken, self.host.tx_hash())?;

        Ok(Some(
            TxReceipt::success(Selector::WithdrewToken)
                .with(&bubble_id)
                .with(&asset),
        ))
    }

    /// Moves the native amount and every token of `asset` from `from` to `to`.
    ///
    /// Either everything moves or, on failure, nothing does.
    fn transfer_assets(
        &mut self,
        from: Address,
        to: Address,
        asset: &AccountAsset,
    ) -> ContractResult<()> {
        let snapshot = self.host.snapshot();

        let result = self.forward_assets(from, to, asset);
        if result.is_err() {
            self.host.revert_to_snapshot(snapshot);
        }

        result
    }

    fn forward_assets(
        &mut self,
        from: Address,
        to: Address,
        asset: &AccountAsset,
    ) -> ContractResult<()> {
        // native funds never leave an account, custody included, beyond its balance
        if self.host.balance(&from) < asset.native_amount {
            warn!(?from, amount = %asset.native_amount, "native balance short of the transfer");
            return Err(BubbleError::AccountNoEnough.into());
        }
        self.host.sub_balance(&from, asset.native_amount);
        self.host.add_balance(&to, asset.native_amount);

        for token in &asset.token_assets {
            if self.host.code(&token.token_addr).is_empty() {
                return Err(BubbleError::TokenNotExist(token.token_addr).into());
            }

            let input = erc20::transfer_calldata(&to, &token.balance);
            let frame = self.frame(from, token.token_addr, input);
            if let Err(reason) = self.call_vm(frame)? {
                if self.is_estimation() {
                    return Err(FatalError::Estimation(reason).into());
                }

                warn!(token = ?token.token_addr, ?from, ?to, %reason, "token transfer failed");
                return Err(BubbleError::TokenTransferFailed(token.token_addr).into());
            }
        }

        Ok(())
    }
}
