//! Allotment and lifecycle of bubbles.

use bubble_db::KvStore;
use bubble_primitives::{
    bubble::{BubbleBasics, BubbleState, BubbleStatus, OperatorL1, OperatorL2},
    constants::BASIS_POINTS,
    host::{CandidateNode, EvmHost, NodeRole},
    types::{BubbleId, SizeCode},
};
use primitive_types::H256;
use tracing::{debug, info, warn};

use crate::{
    contract::BubbleContract,
    dispatch::Selector,
    errors::{BubbleError, ContractError, ContractResult},
    receipt::TxReceipt,
    vrf::{self, VrfSelector},
};

/// The free candidates a new bubble may be staffed from.
#[derive(Debug)]
struct FreePools {
    l1: Vec<CandidateNode>,
    l2: Vec<CandidateNode>,
    l1_needed: usize,
    l2_needed: usize,
}

/// `occupied / total` in basis points; an empty pool counts as fully used.
fn use_ratio(occupied: usize, total: usize) -> u32 {
    if total == 0 {
        return BASIS_POINTS;
    }

    (occupied as u128 * BASIS_POINTS as u128 / total as u128) as u32
}

impl<H: EvmHost, S: KvStore> BubbleContract<'_, H, S> {
    /// Hands out a bubble of `size_code`: a new one while the candidate pool has room, otherwise
    /// one of the existing bubbles of that size.
    pub(crate) fn allot_bubble(&mut self, size_code: SizeCode) -> ContractResult<Option<TxReceipt>> {
        self.gas.charge(self.cfg.params.gas.allot_bubble)?;

        let block = self.host.block();
        let candidates = self.services.node_pool.candidates(&block.hash)?;
        let ratio = self.node_use_ratio(&candidates)?;
        let nonces = self.services.nonce_history.load(&block.parent_hash)?;
        let seed = vrf::seed(&nonces, self.host.nonce(&self.caller));

        debug!(size_code, ratio, max = self.cfg.params.max_node_use_ratio_bps, "allotting bubble");

        if ratio < self.cfg.params.max_node_use_ratio_bps {
            match self.try_create_bubble(size_code, candidates, seed) {
                Ok(None) => return Ok(None),
                Ok(Some(bubble_id)) => {
                    info!(%bubble_id, size_code, "created bubble");
                    return Ok(Some(
                        TxReceipt::success(Selector::AllotBubble).with(&bubble_id),
                    ));
                }
                Err(ContractError::Business(err)) => {
                    warn!(size_code, %err, "cannot create bubble, electing an existing one");
                }
                Err(fatal) => return Err(fatal),
            }
        }

        let bubble_id = self.elect_bubble(size_code, seed)?;
        info!(%bubble_id, size_code, "elected bubble");

        Ok(Some(
            TxReceipt::success(Selector::AllotBubble).with(&bubble_id),
        ))
    }

    /// Advances the lifecycle of a bubble on behalf of its primary sub-ledger operator.
    pub(crate) fn update_bubble_state(
        &mut self,
        bubble_id: BubbleId,
        state: BubbleState,
    ) -> ContractResult<Option<TxReceipt>> {
        self.gas.charge(self.cfg.params.gas.update_state)?;

        let (basics, mut status) = self.load_bubble(&bubble_id)?;
        if Self::primary_l2(&basics)?.op_addr != self.caller {
            return Err(BubbleError::SenderIsNotOperator.into());
        }

        let from = status.state;
        if !matches!(state, BubbleState::PreRelease | BubbleState::Released) {
            return Err(BubbleError::InvalidStateTransition { from, to: state }.into());
        }
        status
            .advance(state, self.host.block().number)
            .map_err(|(from, to)| BubbleError::InvalidStateTransition { from, to })?;

        if self.is_estimation() {
            return Ok(None);
        }

        self.store.put_status(&status)?;
        if state == BubbleState::Released {
            self.release_nodes(&basics)?;
        }
        info!(%bubble_id, %from, to = %state, "bubble state updated");

        Ok(Some(
            TxReceipt::success(Selector::UpdateBubbleState)
                .with(&bubble_id)
                .with(&state),
        ))
    }

    fn node_use_ratio(&self, candidates: &[CandidateNode]) -> ContractResult<u32> {
        let mut occupied = 0;
        for node in candidates {
            if self.store.node_bubble(&node.node_id)?.is_some() {
                occupied += 1;
            }
        }

        Ok(use_ratio(occupied, candidates.len()))
    }

    /// Checks that the size class exists and that enough free candidates of each role remain.
    fn check_elements(
        &self,
        size_code: SizeCode,
        candidates: Vec<CandidateNode>,
    ) -> ContractResult<FreePools> {
        let config = self
            .cfg
            .params
            .size_config(size_code)
            .map_err(|_| BubbleError::UnknownSizeCode(size_code))?;

        let mut pools = FreePools {
            l1: Vec::new(),
            l2: Vec::new(),
            l1_needed: config.l1_operators as usize,
            l2_needed: config.l2_operators as usize,
        };
        for node in candidates {
            if self.store.node_bubble(&node.node_id)?.is_some() {
                continue;
            }
            match node.role {
                NodeRole::L1Operator => pools.l1.push(node),
                NodeRole::L2Operator => pools.l2.push(node),
            }
        }

        if pools.l1.len() < pools.l1_needed || pools.l2.len() < pools.l2_needed {
            return Err(BubbleError::InsufficientNodes(size_code).into());
        }

        Ok(pools)
    }

    /// Creates a bubble staffed from the free candidates.
    ///
    /// Returns `None` in estimation mode once the element check has passed.
    fn try_create_bubble(
        &mut self,
        size_code: SizeCode,
        candidates: Vec<CandidateNode>,
        seed: H256,
    ) -> ContractResult<Option<BubbleId>> {
        let pools = self.check_elements(size_code, candidates)?;
        if self.is_estimation() {
            return Ok(None);
        }

        let mut selector = VrfSelector::new(seed);
        let l1 = selector
            .pick(pools.l1, pools.l1_needed)
            .ok_or(BubbleError::InsufficientNodes(size_code))?;
        let l2_pool: Vec<CandidateNode> = pools
            .l2
            .into_iter()
            .filter(|node| !l1.iter().any(|picked| picked.node_id == node.node_id))
            .collect();
        let l2 = selector
            .pick(l2_pool, pools.l2_needed)
            .ok_or(BubbleError::InsufficientNodes(size_code))?;

        let block = self.host.block();
        let bubble_id = self.store.next_bubble_id()?;
        let basics = BubbleBasics {
            bubble_id,
            creator: self.caller,
            size: size_code,
            created_block_number: block.number,
            created_block_hash: block.hash,
            operators_l1: l1
                .into_iter()
                .map(|node| OperatorL1 {
                    node_id: node.node_id,
                    op_addr: node.op_addr,
                })
                .collect(),
            operators_l2: l2
                .into_iter()
                .map(|node| OperatorL2 {
                    node_id: node.node_id,
                    rpc: node.rpc,
                    op_addr: node.op_addr,
                })
                .collect(),
        };

        self.store.put_basics(&basics)?;
        self.store
            .put_status(&BubbleStatus::created(bubble_id, block.number))?;
        self.store.index_bubble_size(size_code, bubble_id)?;
        for node_id in basics.node_ids() {
            self.store.occupy_node(node_id, &bubble_id)?;
        }

        Ok(Some(bubble_id))
    }

    /// Picks one of the electable bubbles of `size_code`.
    fn elect_bubble(&mut self, size_code: SizeCode, seed: H256) -> ContractResult<BubbleId> {
        let mut electable = Vec::new();
        for bubble_id in self.store.bubbles_of_size(size_code)? {
            match self.store.get_status(&bubble_id)? {
                Some(status) if status.state.is_electable() => electable.push(status),
                _ => {}
            }
        }

        let mut status = VrfSelector::new(seed)
            .pick(electable, 1)
            .and_then(|mut picked| picked.pop())
            .ok_or(BubbleError::NoEligibleBubble(size_code))?;

        if status.state == BubbleState::Created && !self.is_estimation() {
            status
                .advance(BubbleState::Active, self.host.block().number)
                .map_err(|(from, to)| BubbleError::InvalidStateTransition { from, to })?;
            self.store.put_status(&status)?;
        }

        Ok(status.bubble_id)
    }

    fn release_nodes(&mut self, basics: &BubbleBasics) -> ContractResult<()> {
        for node_id in basics.node_ids() {
            if self.store.node_bubble(node_id)? == Some(basics.bubble_id) {
                self.store.release_node(node_id)?;
            }
        }

        Ok(())
    }
}
