//! Typed access to the bubble records.

use bubble_primitives::{
    asset::{AccountAsset, ContractInfo},
    bubble::{BubTxType, BubbleBasics, BubbleStatus},
    types::{Address, BubbleId, NodeId, SizeCode, TxHash},
};
use tracing::trace;

use crate::{
    errors::{DbError, DbResult},
    row_spec::{
        AccAssetRowSpec, AccListRowSpec, BasicsRowSpec, ByteCodeRowSpec, ContractRowSpec,
        CounterRowSpec, KVRowSpec, L1HashRowSpec, NodeBubbleRowSpec, RlpList, SizeIndexRowSpec,
        StatusRowSpec, TxHashListRowSpec,
    },
    traits::KvStore,
};

/// The bubble records on top of a [`KvStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BubbleStore<S> {
    kv: S,
}

impl<S: KvStore> BubbleStore<S> {
    /// Wraps a key/value store.
    pub const fn new(kv: S) -> Self {
        Self { kv }
    }

    /// The underlying key/value store.
    pub const fn kv(&self) -> &S {
        &self.kv
    }

    /// Unwraps the underlying key/value store.
    pub fn into_inner(self) -> S {
        self.kv
    }

    fn get<R: KVRowSpec>(&self, key: &R::Key) -> DbResult<Option<R::Value>> {
        let Some(raw) = self.kv.get(&R::key(key)).map_err(DbError::backend)? else {
            return Ok(None);
        };

        rlp::decode(&raw)
            .map(Some)
            .map_err(|reason| DbError::Decode {
                row: R::NAME,
                reason,
            })
    }

    fn put<R: KVRowSpec>(&mut self, key: &R::Key, value: &R::Value) -> DbResult<()> {
        trace!(row = R::NAME, "writing row");
        self.kv
            .put(&R::key(key), rlp::encode(value).to_vec())
            .map_err(DbError::backend)
    }

    fn delete<R: KVRowSpec>(&mut self, key: &R::Key) -> DbResult<()> {
        trace!(row = R::NAME, "deleting row");
        self.kv.delete(&R::key(key)).map_err(DbError::backend)
    }

    // ── Bubbles ──────────────────────────────────────────────────────

    /// Gets, if present, the basics of a bubble.
    pub fn get_basics(&self, bubble_id: &BubbleId) -> DbResult<Option<BubbleBasics>> {
        self.get::<BasicsRowSpec>(bubble_id)
    }

    /// Stores the basics of a bubble.
    pub fn put_basics(&mut self, basics: &BubbleBasics) -> DbResult<()> {
        self.put::<BasicsRowSpec>(&basics.bubble_id, basics)
    }

    /// Gets, if present, the lifecycle status of a bubble.
    pub fn get_status(&self, bubble_id: &BubbleId) -> DbResult<Option<BubbleStatus>> {
        self.get::<StatusRowSpec>(bubble_id)
    }

    /// Stores the lifecycle status of a bubble.
    pub fn put_status(&mut self, status: &BubbleStatus) -> DbResult<()> {
        self.put::<StatusRowSpec>(&status.bubble_id, status)
    }

    /// Allocates the next bubble id. The first id is `1`.
    pub fn next_bubble_id(&mut self) -> DbResult<BubbleId> {
        let last = self.get::<CounterRowSpec>(&())?.unwrap_or_default();
        let next = last + BubbleId::one();
        self.put::<CounterRowSpec>(&(), &next)?;

        Ok(next)
    }

    /// The ids of all bubbles of the given size, in order of creation.
    pub fn bubbles_of_size(&self, size: SizeCode) -> DbResult<Vec<BubbleId>> {
        Ok(self
            .get::<SizeIndexRowSpec>(&size)?
            .map(|list| list.0)
            .unwrap_or_default())
    }

    /// Adds a bubble to the index of its size class.
    pub fn index_bubble_size(&mut self, size: SizeCode, bubble_id: BubbleId) -> DbResult<()> {
        let mut ids = self.bubbles_of_size(size)?;
        if !ids.contains(&bubble_id) {
            ids.push(bubble_id);
        }

        self.put::<SizeIndexRowSpec>(&size, &RlpList(ids))
    }

    // ── Node occupancy ───────────────────────────────────────────────

    /// Gets, if any, the bubble the node is serving.
    pub fn node_bubble(&self, node_id: &NodeId) -> DbResult<Option<BubbleId>> {
        self.get::<NodeBubbleRowSpec>(node_id)
    }

    /// Marks the node as serving the bubble.
    pub fn occupy_node(&mut self, node_id: &NodeId, bubble_id: &BubbleId) -> DbResult<()> {
        self.put::<NodeBubbleRowSpec>(node_id, bubble_id)
    }

    /// Marks the node as free.
    pub fn release_node(&mut self, node_id: &NodeId) -> DbResult<()> {
        self.delete::<NodeBubbleRowSpec>(node_id)
    }

    // ── Accounts ─────────────────────────────────────────────────────

    /// The accounts with an asset record in the bubble, in order of first stake.
    pub fn get_acc_list(&self, bubble_id: &BubbleId) -> DbResult<Vec<Address>> {
        Ok(self
            .get::<AccListRowSpec>(bubble_id)?
            .map(|list| list.0)
            .unwrap_or_default())
    }

    /// Gets, if present, a copy of the asset of `account` in the bubble.
    pub fn get_acc_asset(
        &self,
        bubble_id: &BubbleId,
        account: &Address,
    ) -> DbResult<Option<AccountAsset>> {
        self.get::<AccAssetRowSpec>(&(*bubble_id, *account))
    }

    /// Adds a staked asset to the account's record, creating it and registering the account on
    /// first stake.
    pub fn add_acc_asset(&mut self, bubble_id: &BubbleId, asset: &AccountAsset) -> DbResult<()> {
        let merged = match self.get_acc_asset(bubble_id, &asset.account)? {
            Some(mut held) => {
                held.accumulate(asset);
                held
            }
            None => {
                self.register_account(bubble_id, &asset.account)?;
                asset.clone()
            }
        };

        self.put::<AccAssetRowSpec>(&(*bubble_id, asset.account), &merged)
    }

    /// Replaces the account's record with `asset`.
    pub fn store_acc_asset(&mut self, bubble_id: &BubbleId, asset: &AccountAsset) -> DbResult<()> {
        if self.get_acc_asset(bubble_id, &asset.account)?.is_none() {
            self.register_account(bubble_id, &asset.account)?;
        }

        self.put::<AccAssetRowSpec>(&(*bubble_id, asset.account), asset)
    }

    fn register_account(&mut self, bubble_id: &BubbleId, account: &Address) -> DbResult<()> {
        let mut accounts = self.get_acc_list(bubble_id)?;
        if accounts.contains(account) {
            return Ok(());
        }
        accounts.push(*account);

        self.put::<AccListRowSpec>(bubble_id, &RlpList(accounts))
    }

    // ── Hash indices ─────────────────────────────────────────────────

    /// Appends a transaction hash to the bubble's history of the given type.
    pub fn push_tx_hash(
        &mut self,
        bubble_id: &BubbleId,
        tx_type: BubTxType,
        tx_hash: TxHash,
    ) -> DbResult<()> {
        let mut hashes = self.get_tx_hashes(bubble_id, tx_type)?;
        hashes.push(tx_hash);

        self.put::<TxHashListRowSpec>(&(*bubble_id, tx_type), &RlpList(hashes))
    }

    /// The bubble's history of the given type, oldest first.
    pub fn get_tx_hashes(&self, bubble_id: &BubbleId, tx_type: BubTxType) -> DbResult<Vec<TxHash>> {
        Ok(self
            .get::<TxHashListRowSpec>(&(*bubble_id, tx_type))?
            .map(|list| list.0)
            .unwrap_or_default())
    }

    /// Records the parent-chain hash of the settlement identified by `l2_hash`.
    pub fn put_l1_hash(
        &mut self,
        bubble_id: &BubbleId,
        l2_hash: TxHash,
        l1_hash: TxHash,
    ) -> DbResult<()> {
        self.put::<L1HashRowSpec>(&(*bubble_id, l2_hash), &l1_hash)
    }

    /// Gets, if recorded, the parent-chain hash of the settlement identified by `l2_hash`.
    pub fn get_l1_hash(&self, bubble_id: &BubbleId, l2_hash: TxHash) -> DbResult<Option<TxHash>> {
        self.get::<L1HashRowSpec>(&(*bubble_id, l2_hash))
    }

    // ── Contracts ────────────────────────────────────────────────────

    /// Gets, if registered, the contract at `address` in the bubble.
    pub fn get_contract(
        &self,
        bubble_id: &BubbleId,
        address: &Address,
    ) -> DbResult<Option<ContractInfo>> {
        self.get::<ContractRowSpec>(&(*bubble_id, *address))
    }

    /// Registers a contract in the bubble.
    pub fn put_contract(&mut self, bubble_id: &BubbleId, info: &ContractInfo) -> DbResult<()> {
        self.put::<ContractRowSpec>(&(*bubble_id, info.address), info)
    }

    /// Removes the registration of the contract at `address` from the bubble.
    pub fn delete_contract(&mut self, bubble_id: &BubbleId, address: &Address) -> DbResult<()> {
        self.delete::<ContractRowSpec>(&(*bubble_id, *address))
    }

    /// Gets, if cached, the bytecode of `address` in the bubble.
    pub fn get_byte_code(&self, bubble_id: &BubbleId, address: &Address) -> DbResult<Option<Vec<u8>>> {
        self.get::<ByteCodeRowSpec>(&(*bubble_id, *address))
    }

    /// Caches the bytecode of `address` in the bubble.
    pub fn put_byte_code(
        &mut self,
        bubble_id: &BubbleId,
        address: &Address,
        code: Vec<u8>,
    ) -> DbResult<()> {
        self.put::<ByteCodeRowSpec>(&(*bubble_id, *address), &code)
    }
}

#[cfg(test)]
mod tests {
    use bubble_primitives::{
        asset::AccTokenAsset,
        bubble::BubbleState,
    };
    use bubble_test_utils::prelude::{generate_address, generate_hash, generate_node_id};
    use primitive_types::U256;

    use super::*;
    use crate::{inmemory::InMemoryKv, persistent::SledKv};

    fn asset(account: Address, native: u64, tokens: &[(Address, u64)]) -> AccountAsset {
        AccountAsset {
            account,
            native_amount: U256::from(native),
            token_assets: tokens
                .iter()
                .map(|(token_addr, balance)| AccTokenAsset {
                    token_addr: *token_addr,
                    balance: U256::from(*balance),
                })
                .collect(),
        }
    }

    #[test]
    fn bubble_ids_start_at_one() {
        let mut store = BubbleStore::new(InMemoryKv::new());

        assert_eq!(store.next_bubble_id().unwrap(), U256::from(1u64));
        assert_eq!(store.next_bubble_id().unwrap(), U256::from(2u64));
    }

    #[test]
    fn add_acc_asset_accumulates_and_registers_once() {
        let mut store = BubbleStore::new(InMemoryKv::new());
        let id = U256::one();
        let alice = generate_address();
        let token = generate_address();

        store.add_acc_asset(&id, &asset(alice, 10, &[(token, 1)])).unwrap();
        store.add_acc_asset(&id, &asset(alice, 5, &[(token, 2)])).unwrap();

        assert_eq!(store.get_acc_list(&id).unwrap(), vec![alice]);
        assert_eq!(
            store.get_acc_asset(&id, &alice).unwrap(),
            Some(asset(alice, 15, &[(token, 3)]))
        );
    }

    #[test]
    fn store_acc_asset_replaces() {
        let mut store = BubbleStore::new(InMemoryKv::new());
        let id = U256::one();
        let alice = generate_address();

        store.add_acc_asset(&id, &asset(alice, 10, &[])).unwrap();
        store.store_acc_asset(&id, &asset(alice, 3, &[])).unwrap();

        assert_eq!(
            store.get_acc_asset(&id, &alice).unwrap(),
            Some(asset(alice, 3, &[]))
        );
        assert_eq!(store.get_acc_list(&id).unwrap().len(), 1);
    }

    #[test]
    fn tx_hash_history_is_per_type_and_ordered() {
        let mut store = BubbleStore::new(InMemoryKv::new());
        let id = U256::one();
        let (h1, h2, h3) = (generate_hash(), generate_hash(), generate_hash());

        store.push_tx_hash(&id, BubTxType::StakingToken, h1).unwrap();
        store.push_tx_hash(&id, BubTxType::StakingToken, h2).unwrap();
        store.push_tx_hash(&id, BubTxType::SettleBubble, h3).unwrap();

        assert_eq!(
            store.get_tx_hashes(&id, BubTxType::StakingToken).unwrap(),
            vec![h1, h2]
        );
        assert_eq!(
            store.get_tx_hashes(&id, BubTxType::SettleBubble).unwrap(),
            vec![h3]
        );
        assert!(store
            .get_tx_hashes(&id, BubTxType::WithdrewToken)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn occupancy_can_be_released() {
        let mut store = BubbleStore::new(InMemoryKv::new());
        let node = generate_node_id();

        store.occupy_node(&node, &U256::from(4u64)).unwrap();
        assert_eq!(store.node_bubble(&node).unwrap(), Some(U256::from(4u64)));

        store.release_node(&node).unwrap();
        assert_eq!(store.node_bubble(&node).unwrap(), None);
    }

    #[test]
    fn corrupt_row_is_a_decode_error() {
        let id = U256::one();
        let mut kv = InMemoryKv::new();
        kv.put(&bubble_primitives::keys::bubble_status(&id), vec![0xff, 0x00])
            .unwrap();

        let store = BubbleStore::new(kv);

        assert!(matches!(
            store.get_status(&id),
            Err(DbError::Decode { row: "status", .. })
        ));
    }

    #[test]
    fn records_persist_in_sled() {
        let dir = tempfile::tempdir().unwrap();
        let id = U256::from(9u64);
        let status = BubbleStatus {
            bubble_id: id,
            state: BubbleState::Active,
            since_block: 12,
        };

        {
            let mut store = BubbleStore::new(SledKv::open(dir.path()).unwrap());
            store.put_status(&status).unwrap();
            store.index_bubble_size(2, id).unwrap();
            store.index_bubble_size(2, id).unwrap();
            store.kv().flush().unwrap();
        }

        let store = BubbleStore::new(SledKv::open(dir.path()).unwrap());
        assert_eq!(store.get_status(&id).unwrap(), Some(status));
        assert_eq!(store.bubbles_of_size(2).unwrap(), vec![id]);
    }
}
