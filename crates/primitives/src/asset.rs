//! Custody records: per-account assets staked into a bubble, settlement batches and remotely
//! deployed contracts.

use primitive_types::U256;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

use crate::{bubble::expect_list_len, types::Address};

/// A token balance held in custody for an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccTokenAsset {
    /// The address of the token contract.
    pub token_addr: Address,
    /// The amount of tokens.
    pub balance: U256,
}

impl Encodable for AccTokenAsset {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.token_addr);
        s.append(&self.balance);
    }
}

impl Decodable for AccTokenAsset {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        expect_list_len(rlp, 2)?;
        Ok(Self {
            token_addr: rlp.val_at(0)?,
            balance: rlp.val_at(1)?,
        })
    }
}

/// The assets of one account inside one bubble.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountAsset {
    /// The owner of the assets.
    pub account: Address,
    /// The native amount.
    pub native_amount: U256,
    /// The token balances, in the order they were first staked.
    pub token_assets: Vec<AccTokenAsset>,
}

impl AccountAsset {
    /// Creates an asset with no native amount and no tokens.
    pub const fn empty(account: Address) -> Self {
        Self {
            account,
            native_amount: U256::zero(),
            token_assets: Vec::new(),
        }
    }

    /// Returns a copy with every balance set to zero, keeping the list of tokens.
    pub fn zeroed(&self) -> Self {
        Self {
            account: self.account,
            native_amount: U256::zero(),
            token_assets: self
                .token_assets
                .iter()
                .map(|token| AccTokenAsset {
                    token_addr: token.token_addr,
                    balance: U256::zero(),
                })
                .collect(),
        }
    }

    /// Adds the balances of `other` to this asset.
    ///
    /// Tokens not yet held are appended in the order they appear in `other`. Sums saturate at
    /// [`U256::MAX`].
    pub fn accumulate(&mut self, other: &AccountAsset) {
        self.native_amount = self.native_amount.saturating_add(other.native_amount);

        for incoming in &other.token_assets {
            match self
                .token_assets
                .iter_mut()
                .find(|held| held.token_addr == incoming.token_addr)
            {
                Some(held) => held.balance = held.balance.saturating_add(incoming.balance),
                None => self.token_assets.push(incoming.clone()),
            }
        }
    }

    /// Whether the asset holds nothing.
    pub fn is_zero(&self) -> bool {
        self.native_amount.is_zero() && self.token_assets.iter().all(|t| t.balance.is_zero())
    }
}

impl Encodable for AccountAsset {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.account);
        s.append(&self.native_amount);
        s.append_list(&self.token_assets);
    }
}

impl Decodable for AccountAsset {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        expect_list_len(rlp, 3)?;
        Ok(Self {
            account: rlp.val_at(0)?,
            native_amount: rlp.val_at(1)?,
            token_assets: rlp.list_at(2)?,
        })
    }
}

/// The final balances reported by a bubble's sub-ledger operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SettlementInfo {
    /// One snapshot per account known to the bubble.
    pub acc_assets: Vec<AccountAsset>,
}

impl Encodable for SettlementInfo {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(1);
        s.append_list(&self.acc_assets);
    }
}

impl Decodable for SettlementInfo {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        expect_list_len(rlp, 1)?;
        Ok(Self {
            acc_assets: rlp.list_at(0)?,
        })
    }
}

/// A contract deployed into a bubble through the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContractInfo {
    /// The account that deployed the contract.
    pub creator: Address,
    /// The address of the contract.
    pub address: Address,
    /// The amount held in escrow for the deployment.
    pub amount: U256,
}

impl Encodable for ContractInfo {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.creator);
        s.append(&self.address);
        s.append(&self.amount);
    }
}

impl Decodable for ContractInfo {
    fn decode(rlp: &Rlp<'_>) -> Result<Self, DecoderError> {
        expect_list_len(rlp, 3)?;
        Ok(Self {
            creator: rlp.val_at(0)?,
            address: rlp.val_at(1)?,
            amount: rlp.val_at(2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use primitive_types::H160;

    use super::*;

    fn token(byte: u8, amount: u64) -> AccTokenAsset {
        AccTokenAsset {
            token_addr: H160::repeat_byte(byte),
            balance: U256::from(amount),
        }
    }

    #[test]
    fn accumulate_merges_known_tokens_and_appends_new_ones() {
        let account = H160::repeat_byte(0xaa);
        let mut held = AccountAsset {
            account,
            native_amount: U256::from(10u64),
            token_assets: vec![token(1, 5)],
        };
        let incoming = AccountAsset {
            account,
            native_amount: U256::from(3u64),
            token_assets: vec![token(2, 7), token(1, 1)],
        };

        held.accumulate(&incoming);

        assert_eq!(held.native_amount, U256::from(13u64));
        assert_eq!(held.token_assets, vec![token(1, 6), token(2, 7)]);
    }

    #[test]
    fn zeroed_keeps_token_list() {
        let asset = AccountAsset {
            account: H160::repeat_byte(0xaa),
            native_amount: U256::from(10u64),
            token_assets: vec![token(1, 5), token(2, 9)],
        };

        let zeroed = asset.zeroed();

        assert!(zeroed.is_zero());
        assert_eq!(zeroed.account, asset.account);
        assert_eq!(zeroed.token_assets, vec![token(1, 0), token(2, 0)]);
    }

    #[test]
    fn settlement_rlp_is_lossless() {
        let info = SettlementInfo {
            acc_assets: vec![
                AccountAsset::empty(H160::repeat_byte(1)),
                AccountAsset {
                    account: H160::repeat_byte(2),
                    native_amount: U256::MAX,
                    token_assets: vec![token(3, 1)],
                },
            ],
        };

        let decoded: SettlementInfo = rlp::decode(&rlp::encode(&info)).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn json_uses_pascal_case() {
        let json = serde_json::to_value(AccountAsset::empty(H160::zero())).unwrap();
        assert!(json.get("NativeAmount").is_some());
        assert!(json.get("TokenAssets").is_some());
    }
}
