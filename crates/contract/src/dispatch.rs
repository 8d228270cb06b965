//! Decoding of inbound calls.
//!
//! An input is an RLP list of byte strings. The first one holds the RLP encoding of the `u16`
//! selector and each following one holds the RLP encoding of one argument.

use std::fmt::Display;

use bubble_primitives::{
    asset::{AccountAsset, SettlementInfo},
    bubble::{BubTxType, BubbleState},
    types::{Address, BubbleId, SizeCode, TxHash},
};
use primitive_types::U256;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The operations of the contract, keyed by their numeric selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Selector {
    /// `allotBubble(sizeCode)`
    AllotBubble = 8001,
    /// `updateBubbleState(bubbleID, state)`
    UpdateBubbleState = 8002,
    /// `stakingToken(bubbleID, accountAsset)`
    StakingToken = 8003,
    /// `withdrewToken(bubbleID)`
    WithdrewToken = 8004,
    /// `settleBubble(l2SettleTxHash, bubbleID, settlementInfo)`
    SettleBubble = 8005,
    /// `remoteDeploy(bubbleID, address, amount, data)`
    RemoteDeploy = 8006,
    /// `remoteCall(bubbleID, contract, data)`
    RemoteCall = 8007,
    /// `remoteCallExecutor(caller, remoteTxHash, bubbleID, contract, data)`
    RemoteCallExecutor = 8008,
    /// `remoteClear(bubbleID, address)`
    RemoteClear = 8009,
    /// `getBubbleInfo(bubbleID)`
    GetBubbleInfo = 8100,
    /// `getL1HashByL2Hash(bubbleID, l2TxHash)`
    GetL1HashByL2Hash = 8101,
    /// `getBubTxHashList(bubbleID, txType)`
    GetBubTxHashList = 8102,
    /// `getAccAsset(bubbleID, account)`
    GetAccAsset = 8103,
}

impl Selector {
    /// Whether the operation is a read-only query.
    pub const fn is_query(&self) -> bool {
        (*self as u16) >= 8100
    }

    /// The number of arguments the operation takes.
    pub const fn arity(&self) -> usize {
        match self {
            Selector::AllotBubble | Selector::WithdrewToken | Selector::GetBubbleInfo => 1,
            Selector::UpdateBubbleState
            | Selector::StakingToken
            | Selector::RemoteClear
            | Selector::GetL1HashByL2Hash
            | Selector::GetBubTxHashList
            | Selector::GetAccAsset => 2,
            Selector::SettleBubble | Selector::RemoteCall => 3,
            Selector::RemoteDeploy => 4,
            Selector::RemoteCallExecutor => 5,
        }
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Selector::AllotBubble => "allotBubble",
            Selector::UpdateBubbleState => "updateBubbleState",
            Selector::StakingToken => "stakingToken",
            Selector::WithdrewToken => "withdrewToken",
            Selector::SettleBubble => "settleBubble",
            Selector::RemoteDeploy => "remoteDeploy",
            Selector::RemoteCall => "remoteCall",
            Selector::RemoteCallExecutor => "remoteCallExecutor",
            Selector::RemoteClear => "remoteClear",
            Selector::GetBubbleInfo => "getBubbleInfo",
            Selector::GetL1HashByL2Hash => "getL1HashByL2Hash",
            Selector::GetBubTxHashList => "getBubTxHashList",
            Selector::GetAccAsset => "getAccAsset",
        };
        write!(f, "{name}")
    }
}

impl TryFrom<u16> for Selector {
    type Error = DecodeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            8001 => Selector::AllotBubble,
            8002 => Selector::UpdateBubbleState,
            8003 => Selector::StakingToken,
            8004 => Selector::WithdrewToken,
            8005 => Selector::SettleBubble,
            8006 => Selector::RemoteDeploy,
            8007 => Selector::RemoteCall,
            8008 => Selector::RemoteCallExecutor,
            8009 => Selector::RemoteClear,
            8100 => Selector::GetBubbleInfo,
            8101 => Selector::GetL1HashByL2Hash,
            8102 => Selector::GetBubTxHashList,
            8103 => Selector::GetAccAsset,
            other => return Err(DecodeError::UnknownSelector(other)),
        })
    }
}

/// Errors raised while decoding an input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input is not well-formed RLP, or an argument has the wrong shape.
    #[error("rlp: {0}")]
    Rlp(#[from] DecoderError),

    /// The input is an empty list.
    #[error("missing selector")]
    MissingSelector,

    /// The selector is not known.
    #[error("unknown selector {0}")]
    UnknownSelector(u16),

    /// The number of arguments does not match the operation.
    #[error("{selector} takes {expected} arguments, got {got}")]
    Arity {
        /// The decoded operation.
        selector: Selector,
        /// The number of arguments it takes.
        expected: usize,
        /// The number of arguments supplied.
        got: usize,
    },
}

/// A decoded inbound call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BubbleCall {
    /// Hands out a bubble of the requested size, creating one if capacity allows.
    AllotBubble {
        /// The requested size class.
        size_code: SizeCode,
    },
    /// Advances the lifecycle of a bubble.
    UpdateBubbleState {
        /// The bubble.
        bubble_id: BubbleId,
        /// The state to move to.
        state: BubbleState,
    },
    /// Stakes native and token assets into a bubble.
    StakingToken {
        /// The bubble.
        bubble_id: BubbleId,
        /// The staked assets; the account must be the caller.
        asset: AccountAsset,
    },
    /// Withdraws the caller's assets from a released bubble.
    WithdrewToken {
        /// The bubble.
        bubble_id: BubbleId,
    },
    /// Records the final balances reported by the sub-ledger operator.
    SettleBubble {
        /// Hash of the settlement transaction on the sub-ledger.
        l2_settle_tx_hash: TxHash,
        /// The bubble.
        bubble_id: BubbleId,
        /// The reported balances.
        settlement: SettlementInfo,
    },
    /// Registers a contract in a bubble and asks its operator to deploy it.
    RemoteDeploy {
        /// The bubble.
        bubble_id: BubbleId,
        /// The contract.
        address: Address,
        /// The amount escrowed for the deployment.
        amount: U256,
        /// Deployment payload.
        #[serde(with = "hex::serde")]
        data: Vec<u8>,
    },
    /// Asks a bubble's operator to invoke a registered contract.
    RemoteCall {
        /// The bubble.
        bubble_id: BubbleId,
        /// The contract.
        contract: Address,
        /// Call payload.
        #[serde(with = "hex::serde")]
        data: Vec<u8>,
    },
    /// Relays the execution of a sub-ledger call back onto the parent chain.
    RemoteCallExecutor {
        /// The account on whose behalf the call executes.
        caller: Address,
        /// The sub-ledger transaction being relayed.
        remote_tx_hash: TxHash,
        /// The bubble.
        bubble_id: BubbleId,
        /// The contract.
        contract: Address,
        /// Call payload.
        #[serde(with = "hex::serde")]
        data: Vec<u8>,
    },
    /// Removes a contract registration and returns its escrow.
    RemoteClear {
        /// The bubble.
        bubble_id: BubbleId,
        /// The contract.
        address: Address,
    },
    /// Returns the basics and state of a bubble.
    GetBubbleInfo {
        /// The bubble.
        bubble_id: BubbleId,
    },
    /// Returns the parent-chain hash of a settlement.
    GetL1HashByL2Hash {
        /// The bubble.
        bubble_id: BubbleId,
        /// Hash of the settlement transaction on the sub-ledger.
        l2_tx_hash: TxHash,
    },
    /// Returns a bubble's transaction history of one type.
    GetBubTxHashList {
        /// The bubble.
        bubble_id: BubbleId,
        /// The type of transactions.
        tx_type: BubTxType,
    },
    /// Returns an account's asset in a bubble.
    GetAccAsset {
        /// The bubble.
        bubble_id: BubbleId,
        /// The account.
        account: Address,
    },
}

/// Sequential reader of the argument list.
struct Args<'a> {
    items: &'a [Vec<u8>],
    next: usize,
}

impl Args<'_> {
    fn take<T: Decodable>(&mut self) -> Result<T, DecodeError> {
        let raw = self
            .items
            .get(self.next)
            .ok_or(DecoderError::RlpIsTooShort)?;
        self.next += 1;

        Ok(rlp::decode(raw)?)
    }
}

/// Builds an input from already encoded arguments.
struct ArgsBuilder {
    items: Vec<Vec<u8>>,
}

impl ArgsBuilder {
    fn new(selector: Selector) -> Self {
        Self {
            items: vec![rlp::encode(&(selector as u16)).to_vec()],
        }
    }

    fn arg<T: Encodable>(mut self, value: &T) -> Self {
        self.items.push(rlp::encode(value).to_vec());
        self
    }

    fn finish(self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(self.items.len());
        for item in &self.items {
            stream.append(item);
        }
        stream.out().to_vec()
    }
}

impl BubbleCall {
    /// The operation of the call.
    pub const fn selector(&self) -> Selector {
        match self {
            BubbleCall::AllotBubble { .. } => Selector::AllotBubble,
            BubbleCall::UpdateBubbleState { .. } => Selector::UpdateBubbleState,
            BubbleCall::StakingToken { .. } => Selector::StakingToken,
            BubbleCall::WithdrewToken { .. } => Selector::WithdrewToken,
            BubbleCall::SettleBubble { .. } => Selector::SettleBubble,
            BubbleCall::RemoteDeploy { .. } => Selector::RemoteDeploy,
            BubbleCall::RemoteCall { .. } => Selector::RemoteCall,
            BubbleCall::RemoteCallExecutor { .. } => Selector::RemoteCallExecutor,
            BubbleCall::RemoteClear { .. } => Selector::RemoteClear,
            BubbleCall::GetBubbleInfo { .. } => Selector::GetBubbleInfo,
            BubbleCall::GetL1HashByL2Hash { .. } => Selector::GetL1HashByL2Hash,
            BubbleCall::GetBubTxHashList { .. } => Selector::GetBubTxHashList,
            BubbleCall::GetAccAsset { .. } => Selector::GetAccAsset,
        }
    }

    /// Decodes an input.
    pub fn decode(input: &[u8]) -> Result<Self, DecodeError> {
        let rlp = Rlp::new(input);
        // `as_list` yields an empty list for non-list or truncated inputs
        rlp.item_count()?;
        let items: Vec<Vec<u8>> = rlp.as_list()?;
        let (raw_selector, items) = items.split_first().ok_or(DecodeError::MissingSelector)?;

        let selector = Selector::try_from(rlp::decode::<u16>(raw_selector)?)?;
        if items.len() != selector.arity() {
            return Err(DecodeError::Arity {
                selector,
                expected: selector.arity(),
                got: items.len(),
            });
        }

        let mut args = Args { items, next: 0 };
        let call = match selector {
            Selector::AllotBubble => BubbleCall::AllotBubble {
                size_code: args.take()?,
            },
            Selector::UpdateBubbleState => BubbleCall::UpdateBubbleState {
                bubble_id: args.take()?,
                state: args.take()?,
            },
            Selector::StakingToken => BubbleCall::StakingToken {
                bubble_id: args.take()?,
                asset: args.take()?,
            },
            Selector::WithdrewToken => BubbleCall::WithdrewToken {
                bubble_id: args.take()?,
            },
            Selector::SettleBubble => BubbleCall::SettleBubble {
                l2_settle_tx_hash: args.take()?,
                bubble_id: args.take()?,
                settlement: args.take()?,
            },
            Selector::RemoteDeploy => BubbleCall::RemoteDeploy {
                bubble_id: args.take()?,
                address: args.take()?,
                amount: args.take()?,
                data: args.take()?,
            },
            Selector::RemoteCall => BubbleCall::RemoteCall {
                bubble_id: args.take()?,
                contract: args.take()?,
                data: args.take()?,
            },
            Selector::RemoteCallExecutor => BubbleCall::RemoteCallExecutor {
                caller: args.take()?,
                remote_tx_hash: args.take()?,
                bubble_id: args.take()?,
                contract: args.take()?,
                data: args.take()?,
            },
            Selector::RemoteClear => BubbleCall::RemoteClear {
                bubble_id: args.take()?,
                address: args.take()?,
            },
            Selector::GetBubbleInfo => BubbleCall::GetBubbleInfo {
                bubble_id: args.take()?,
            },
            Selector::GetL1HashByL2Hash => BubbleCall::GetL1HashByL2Hash {
                bubble_id: args.take()?,
                l2_tx_hash: args.take()?,
            },
            Selector::GetBubTxHashList => BubbleCall::GetBubTxHashList {
                bubble_id: args.take()?,
                tx_type: args.take()?,
            },
            Selector::GetAccAsset => BubbleCall::GetAccAsset {
                bubble_id: args.take()?,
                account: args.take()?,
            },
        };

        Ok(call)
    }

    /// Encodes the call into an input.
    pub fn encode(&self) -> Vec<u8> {
        let builder = ArgsBuilder::new(self.selector());

        let builder = match self {
            BubbleCall::AllotBubble { size_code } => builder.arg(size_code),
            BubbleCall::UpdateBubbleState { bubble_id, state } => {
                builder.arg(bubble_id).arg(state)
            }
            BubbleCall::StakingToken { bubble_id, asset } => builder.arg(bubble_id).arg(asset),
            BubbleCall::WithdrewToken { bubble_id } => builder.arg(bubble_id),
            BubbleCall::SettleBubble {
                l2_settle_tx_hash,
                bubble_id,
                settlement,
            } => builder.arg(l2_settle_tx_hash).arg(bubble_id).arg(settlement),
            BubbleCall::RemoteDeploy {
                bubble_id,
                address,
                amount,
                data,
            } => builder.arg(bubble_id).arg(address).arg(amount).arg(data),
            BubbleCall::RemoteCall {
                bubble_id,
                contract,
                data,
            } => builder.arg(bubble_id).arg(contract).arg(data),
            BubbleCall::RemoteCallExecutor {
                caller,
                remote_tx_hash,
                bubble_id,
                contract,
                data,
            } => builder
                .arg(caller)
                .arg(remote_tx_hash)
                .arg(bubble_id)
                .arg(contract)
                .arg(data),
            BubbleCall::RemoteClear { bubble_id, address } => builder.arg(bubble_id).arg(address),
            BubbleCall::GetBubbleInfo { bubble_id } => builder.arg(bubble_id),
            BubbleCall::GetL1HashByL2Hash {
                bubble_id,
                l2_tx_hash,
            } => builder.arg(bubble_id).arg(l2_tx_hash),
            BubbleCall::GetBubTxHashList { bubble_id, tx_type } => {
                builder.arg(bubble_id).arg(tx_type)
            }
            BubbleCall::GetAccAsset { bubble_id, account } => builder.arg(bubble_id).arg(account),
        };

        builder.finish()
    }
}
