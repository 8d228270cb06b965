//! Bubble records: the immutable basics, the mutable lifecycle status, and the transaction-type
//! tags used by the history index.

use std::fmt::Display;

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

use crate::types::{Address, BlockNumber, BubbleId, NodeId, SizeCode, TxHash};

/// The lifecycle state of a bubble.
///
/// The states are ordinal and a bubble only ever moves forward through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BubbleState {
    /// Freshly created, not yet handed out by an election.
    Created = 0,
    /// Handed out by at least one allotment and serving accounts.
    Active = 1,
    /// About to be released; no new remote deployments are accepted.
    PreRelease = 2,
    /// Released; only withdrawals are possible.
    Released = 3,
}

impl BubbleState {
    /// Whether assets may be staked into a bubble in this state.
    pub const fn accepts_stake(&self) -> bool {
        !matches!(self, BubbleState::Released)
    }

    /// Whether staked assets may be withdrawn from a bubble in this state.
    pub const fn accepts_withdrawal(&self) -> bool {
        matches!(self, BubbleState::Released)
    }

    /// Whether a settlement may be submitted for a bubble in this state.
    pub const fn accepts_settlement(&self) -> bool {
        !matches!(self, BubbleState::Released)
    }

    /// Whether new contracts may be deployed into a bubble in this state.
    pub fn accepts_deploy(&self) -> bool {
        *self < BubbleState::PreRelease
    }

    /// Whether the bubble can be handed out by an election.
    pub const fn is_electable(&self) -> bool {
        matches!(self, BubbleState::Created | BubbleState::Active)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: BubbleState) -> bool {
        next > *self
    }
}

impl Display for BubbleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state_str = match self {
            BubbleState::Created => "Created",
            BubbleState::Active => "Active",
            BubbleState::PreRelease => "PreRelease",
            BubbleState::Released => "Released",
        };
        write!(f, "{}", state_str)
    }
}

impl TryFrom<u8> for BubbleState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BubbleState::Created),
            1 => Ok(BubbleState::Active),
            2 => Ok(BubbleState::PreRelease),
            3 => Ok(BubbleState::Released),
            other => Err(other),
        }
    }
}

impl Encodable for BubbleState {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append(&(*self as u8));
    }
}

impl Decodable for BubbleState {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        BubbleState::try_from(rlp.as_val::<u8>()?)
            .map_err(|_| DecoderError::Custom("unknown bubble state"))
    }
}

/// An operator of the bubble on the parent chain (L1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OperatorL1 {
    /// The node that runs the operator.
    pub node_id: NodeId,
    /// The address the operator transacts from.
    pub op_addr: Address,
}

impl Encodable for OperatorL1 {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.node_id);
        s.append(&self.op_addr);
    }
}

impl Decodable for OperatorL1 {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        expect_list_len(rlp, 2)?;
        Ok(Self {
            node_id: rlp.val_at(0)?,
            op_addr: rlp.val_at(1)?,
        })
    }
}

/// An operator of the bubble on the sub-ledger (L2).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OperatorL2 {
    /// The node that runs the operator.
    pub node_id: NodeId,
    /// The RPC endpoint cross-chain tasks are routed to.
    pub rpc: String,
    /// The address the operator transacts from.
    pub op_addr: Address,
}

impl Encodable for OperatorL2 {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.node_id);
        s.append(&self.rpc);
        s.append(&self.op_addr);
    }
}

impl Decodable for OperatorL2 {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        expect_list_len(rlp, 3)?;
        Ok(Self {
            node_id: rlp.val_at(0)?,
            rpc: rlp.val_at(1)?,
            op_addr: rlp.val_at(2)?,
        })
    }
}

/// The immutable part of a bubble, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BubbleBasics {
    /// The id of the bubble.
    pub bubble_id: BubbleId,
    /// The account whose allotment created the bubble.
    pub creator: Address,
    /// The size class of the bubble.
    pub size: SizeCode,
    /// The block in which the bubble was created.
    pub created_block_number: BlockNumber,
    /// The hash of the block in which the bubble was created.
    pub created_block_hash: TxHash,
    /// The parent-chain operators, ordered; index 0 is the primary.
    pub operators_l1: Vec<OperatorL1>,
    /// The sub-ledger operators, ordered; index 0 is the primary.
    pub operators_l2: Vec<OperatorL2>,
}

impl BubbleBasics {
    /// The operator authoritative for mint tasks and task routing on the parent chain.
    // NOTE: operator rotation would hook in here; the primary is always the first entry today.
    pub fn primary_l1(&self) -> Option<&OperatorL1> {
        self.operators_l1.first()
    }

    /// The operator authoritative for settlement and executor relays on the sub-ledger.
    pub fn primary_l2(&self) -> Option<&OperatorL2> {
        self.operators_l2.first()
    }

    /// Whether `node_id` is among the parent-chain operators of this bubble.
    pub fn is_l1_operator(&self, node_id: &NodeId) -> bool {
        self.operators_l1.iter().any(|op| op.node_id == *node_id)
    }

    /// All nodes (L1 and L2) serving this bubble.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.operators_l1
            .iter()
            .map(|op| &op.node_id)
            .chain(self.operators_l2.iter().map(|op| &op.node_id))
    }
}

impl Encodable for BubbleBasics {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(7);
        s.append(&self.bubble_id);
        s.append(&self.creator);
        s.append(&self.size);
        s.append(&self.created_block_number);
        s.append(&self.created_block_hash);
        s.append_list(&self.operators_l1);
        s.append_list(&self.operators_l2);
    }
}

impl Decodable for BubbleBasics {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        expect_list_len(rlp, 7)?;
        Ok(Self {
            bubble_id: rlp.val_at(0)?,
            creator: rlp.val_at(1)?,
            size: rlp.val_at(2)?,
            created_block_number: rlp.val_at(3)?,
            created_block_hash: rlp.val_at(4)?,
            operators_l1: rlp.list_at(5)?,
            operators_l2: rlp.list_at(6)?,
        })
    }
}

/// The mutable lifecycle status of a bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BubbleStatus {
    /// The id of the bubble.
    pub bubble_id: BubbleId,
    /// The current state.
    pub state: BubbleState,
    /// The block in which the current state was entered.
    pub since_block: BlockNumber,
}

impl BubbleStatus {
    /// Creates the status of a freshly created bubble.
    pub const fn created(bubble_id: BubbleId, block: BlockNumber) -> Self {
        Self {
            bubble_id,
            state: BubbleState::Created,
            since_block: block,
        }
    }

    /// Moves the status forward to `next`.
    ///
    /// Returns the rejected pair of states if the transition is not forward.
    pub fn advance(
        &mut self,
        next: BubbleState,
        block: BlockNumber,
    ) -> Result<(), (BubbleState, BubbleState)> {
        if !self.state.can_transition_to(next) {
            return Err((self.state, next));
        }

        self.state = next;
        self.since_block = block;

        Ok(())
    }
}

impl Encodable for BubbleStatus {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.bubble_id);
        s.append(&self.state);
        s.append(&self.since_block);
    }
}

impl Decodable for BubbleStatus {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        expect_list_len(rlp, 3)?;
        Ok(Self {
            bubble_id: rlp.val_at(0)?,
            state: rlp.val_at(1)?,
            since_block: rlp.val_at(2)?,
        })
    }
}

/// The combined view of a bubble returned by queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bubble {
    /// The immutable basics.
    pub basics: BubbleBasics,
    /// The current state.
    pub state: BubbleState,
}

/// The kind of transaction recorded in a bubble's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BubTxType {
    /// Assets staked into the bubble.
    StakingToken = 0,
    /// Assets withdrawn from a released bubble.
    WithdrewToken = 1,
    /// Settlement submitted by the sub-ledger operator.
    SettleBubble = 2,
}

impl Display for BubTxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BubTxType::StakingToken => write!(f, "StakingToken"),
            BubTxType::WithdrewToken => write!(f, "WithdrewToken"),
            BubTxType::SettleBubble => write!(f, "SettleBubble"),
        }
    }
}

impl TryFrom<u8> for BubTxType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BubTxType::StakingToken),
            1 => Ok(BubTxType::WithdrewToken),
            2 => Ok(BubTxType::SettleBubble),
            other => Err(other),
        }
    }
}

impl Encodable for BubTxType {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append(&(*self as u8));
    }
}

impl Decodable for BubTxType {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        BubTxType::try_from(rlp.as_val::<u8>()?)
            .map_err(|_| DecoderError::Custom("unknown bubble tx type"))
    }
}

/// Fails unless `rlp` is a list of exactly `len` items.
pub(crate) fn expect_list_len(rlp: &Rlp<'_>, len: usize) -> Result<(), DecoderError> {
    if !rlp.is_list() {
        return Err(DecoderError::RlpExpectedToBeList);
    }
    if rlp.item_count()? != len {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    Ok(())
}
