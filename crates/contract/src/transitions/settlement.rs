//! Settlement of the balances reported by a bubble's sub-ledger.

use std::collections::BTreeSet;

use bubble_db::KvStore;
use bubble_primitives::{
    asset::SettlementInfo,
    bubble::BubTxType,
    host::EvmHost,
    types::{BubbleId, TxHash},
};
use tracing::info;

use crate::{
    contract::BubbleContract,
    dispatch::Selector,
    errors::{BubbleError, ContractResult},
    receipt::TxReceipt,
};

impl<H: EvmHost, S: KvStore> BubbleContract<'_, H, S> {
    /// Replaces the assets of every account of the bubble with the reported snapshot.
    ///
    /// The snapshot must cover each account with an asset record exactly once.
    pub(crate) fn settle_bubble(
        &mut self,
        l2_settle_tx_hash: TxHash,
        bubble_id: BubbleId,
        settlement: SettlementInfo,
    ) -> ContractResult<Option<TxReceipt>> {
        self.gas.charge(self.cfg.params.gas.settle_bubble)?;

        let (basics, status) = self.load_bubble(&bubble_id)?;
        if !status.state.accepts_settlement() {
            return Err(BubbleError::BubbleIsReleased.into());
        }
        if Self::primary_l2(&basics)?.op_addr != self.caller {
            return Err(BubbleError::NotSubChainOperator.into());
        }

        let accounts = self.store.get_acc_list(&bubble_id)?;
        if accounts.len() != settlement.acc_assets.len() {
            return Err(BubbleError::SettleAccListMismatch.into());
        }
        let mut seen = BTreeSet::new();
        for asset in &settlement.acc_assets {
            if !seen.insert(asset.account) {
                return Err(BubbleError::SettleAccListMismatch.into());
            }
            if self
                .store
                .get_acc_asset(&bubble_id, &asset.account)?
                .is_none()
            {
                return Err(BubbleError::SettleAccNotExist(asset.account).into());
            }
        }

        if self.is_estimation() {
            return Ok(None);
        }

        for asset in &settlement.acc_assets {
            self.store.store_acc_asset(&bubble_id, asset)?;
        }
        let tx_hash = self.host.tx_hash();
        self.store
            .put_l1_hash(&bubble_id, l2_settle_tx_hash, tx_hash)?;
        self.store
            .push_tx_hash(&bubble_id, BubTxType::SettleBubble, tx_hash)?;
        info!(%bubble_id, accounts = accounts.len(), ?l2_settle_tx_hash, "bubble settled");

        Ok(Some(
            TxReceipt::success(Selector::SettleBubble)
                .with(&bubble_id)
                .with(&l2_settle_tx_hash),
        ))
    }
}
