//! Read-only queries. They never write, never post tasks and never abort the call.

use bubble_db::KvStore;
use bubble_primitives::{
    bubble::{BubTxType, Bubble},
    host::EvmHost,
    types::{Address, BubbleId, TxHash},
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    contract::BubbleContract,
    errors::{BubbleError, ContractError, ContractResult, FatalError},
    receipt::QueryResult,
};

impl<H: EvmHost, S: KvStore> BubbleContract<'_, H, S> {
    pub(crate) fn get_bubble_info(&self, bubble_id: BubbleId) -> Result<Vec<u8>, FatalError> {
        let result = self
            .load_bubble(&bubble_id)
            .map(|(basics, status)| Bubble {
                basics,
                state: status.state,
            });

        Self::respond(result)
    }

    pub(crate) fn get_l1_hash_by_l2_hash(
        &self,
        bubble_id: BubbleId,
        l2_tx_hash: TxHash,
    ) -> Result<Vec<u8>, FatalError> {
        let result = self
            .store
            .get_l1_hash(&bubble_id, l2_tx_hash)
            .map_err(ContractError::from)
            .and_then(|hash| hash.ok_or_else(|| BubbleError::L1HashNotFound.into()));

        Self::respond(result)
    }

    pub(crate) fn get_bub_tx_hash_list(
        &self,
        bubble_id: BubbleId,
        tx_type: BubTxType,
    ) -> Result<Vec<u8>, FatalError> {
        let result = self
            .store
            .get_tx_hashes(&bubble_id, tx_type)
            .map_err(ContractError::from);

        Self::respond(result)
    }

    pub(crate) fn get_acc_asset(
        &self,
        bubble_id: BubbleId,
        account: Address,
    ) -> Result<Vec<u8>, FatalError> {
        let result = self
            .store
            .get_acc_asset(&bubble_id, &account)
            .map_err(ContractError::from)
            .and_then(|asset| asset.ok_or_else(|| BubbleError::AccountAssetNotExist.into()));

        Self::respond(result)
    }

    fn respond<T: Serialize>(result: ContractResult<T>) -> Result<Vec<u8>, FatalError> {
        let response = match result {
            Ok(value) => QueryResult::success(&value)?,
            Err(ContractError::Business(err)) => {
                debug!(%err, "query rejected");
                QueryResult::failure(&err)
            }
            Err(ContractError::Fatal(err)) => {
                warn!(%err, "query failed");
                QueryResult::failure(&BubbleError::QueryFailed(err.to_string()))
            }
        };

        response.to_bytes()
    }
}
