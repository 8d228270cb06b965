//! Type specifications of the rows the bubble store persists.
//!
//! Each row spec ties a key type to a value type and to the storage key derivation in
//! [`bubble_primitives::keys`]. Values are RLP-encoded.

use bubble_primitives::{
    asset::{AccountAsset, ContractInfo},
    bubble::{BubTxType, BubbleBasics, BubbleStatus},
    keys,
    types::{Address, BubbleId, NodeId, SizeCode, TxHash},
};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// Type specification for a row of the bubble store.
pub trait KVRowSpec {
    /// Name of the row, used in errors and logs.
    const NAME: &'static str;

    /// Type of the key.
    type Key;

    /// Type of the value.
    type Value: Encodable + Decodable;

    /// Derives the storage key.
    fn key(key: &Self::Key) -> Vec<u8>;
}

/// An RLP list of homogeneous items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RlpList<T>(pub Vec<T>);

impl<T: Encodable> Encodable for RlpList<T> {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append_list(&self.0);
    }
}

impl<T: Decodable> Decodable for RlpList<T> {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        Ok(Self(rlp.as_list()?))
    }
}

macro_rules! row_spec {
    ($(#[$doc:meta])* $name:ident, $label:literal, $key:ty => $value:ty, |$k:ident| $derive:expr) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name;

        impl KVRowSpec for $name {
            const NAME: &'static str = $label;
            type Key = $key;
            type Value = $value;

            fn key($k: &Self::Key) -> Vec<u8> {
                $derive
            }
        }
    };
}

row_spec!(
    /// Bubble id → basics.
    BasicsRowSpec, "basics", BubbleId => BubbleBasics, |id| keys::bubble_basics(id)
);

row_spec!(
    /// Bubble id → lifecycle status.
    StatusRowSpec, "status", BubbleId => BubbleStatus, |id| keys::bubble_status(id)
);

row_spec!(
    /// Bubble id → accounts that have an asset record, in order of first stake.
    AccListRowSpec, "account list", BubbleId => RlpList<Address>, |id| keys::acc_list(id)
);

row_spec!(
    /// (bubble id, account) → asset.
    AccAssetRowSpec, "account asset", (BubbleId, Address) => AccountAsset,
    |k| keys::acc_asset(&k.0, &k.1)
);

row_spec!(
    /// (bubble id, sub-ledger settlement hash) → parent-chain settlement hash.
    L1HashRowSpec, "settlement hash", (BubbleId, TxHash) => TxHash,
    |k| keys::l1_hash_by_l2_hash(&k.0, &k.1)
);

row_spec!(
    /// (bubble id, tx type) → transaction hashes, append-only.
    TxHashListRowSpec, "tx hash list", (BubbleId, BubTxType) => RlpList<TxHash>,
    |k| keys::tx_hash_list(&k.0, k.1)
);

row_spec!(
    /// (bubble id, contract address) → registration.
    ContractRowSpec, "contract", (BubbleId, Address) => ContractInfo,
    |k| keys::bub_contract(&k.0, &k.1)
);

row_spec!(
    /// (bubble id, contract address) → cached bytecode.
    ByteCodeRowSpec, "bytecode", (BubbleId, Address) => Vec<u8>,
    |k| keys::byte_code(&k.0, &k.1)
);

row_spec!(
    /// Size code → ids of the bubbles of that size.
    SizeIndexRowSpec, "size index", SizeCode => RlpList<BubbleId>, |size| keys::bubbles_by_size(*size)
);

row_spec!(
    /// Node id → the bubble the node currently serves.
    NodeBubbleRowSpec, "node occupancy", NodeId => BubbleId, |node| keys::node_bubble(node)
);

row_spec!(
    /// The last allocated bubble id.
    CounterRowSpec, "bubble counter", () => BubbleId, |_unit| keys::BUBBLE_COUNTER_KEY.to_vec()
);
