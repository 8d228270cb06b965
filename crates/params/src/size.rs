//! Size classes of bubbles.

use bubble_primitives::types::SizeCode;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// The configuration of a bubble size class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeConfig {
    /// The code callers use to request this size.
    pub code: SizeCode,

    /// Number of parent-chain operators a bubble of this size gets.
    pub l1_operators: u32,

    /// Number of sub-ledger operators a bubble of this size gets.
    pub l2_operators: u32,

    /// The least amount a remote deployment into a bubble of this size must escrow.
    #[serde(with = "decimal_u256")]
    pub min_staking_amount: U256,
}

/// (De)serializes a [`U256`] as a decimal string, since TOML integers are only 64 bits wide.
mod decimal_u256 {
    use primitive_types::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_dec_str(raw.trim()).map_err(|e| D::Error::custom(format!("{raw}: {e:?}")))
    }
}
