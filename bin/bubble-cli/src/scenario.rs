//! Scenarios: the initial ledger state of a simulation and the calls to run against it.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use bubble_contract::BubbleCall;
use bubble_primitives::{
    hashing::keccak256,
    host::{BlockContext, CandidateNode},
    types::{Address, BlockNumber},
};
use bubble_test_utils::ledger::InMemoryLedger;
use primitive_types::U256;
use serde::Deserialize;

/// Hex-encoded bytes, without a `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub(crate) struct HexBytes(#[serde(with = "hex::serde")] pub(crate) Vec<u8>);

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Funding {
    pub(crate) address: Address,
    pub(crate) amount: U256,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Token {
    pub(crate) address: Address,
    #[serde(default)]
    pub(crate) holders: Vec<Funding>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Contract {
    pub(crate) address: Address,
    pub(crate) code: HexBytes,
}

/// One call of the scenario.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Step {
    /// The immediate caller of the contract.
    pub(crate) caller: Address,

    /// The signer of the transaction; the caller when unset.
    #[serde(default)]
    pub(crate) origin: Option<Address>,

    /// Runs the call as a gas estimation.
    #[serde(default)]
    pub(crate) estimate: bool,

    pub(crate) call: BubbleCall,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Scenario {
    /// The block every step executes in.
    #[serde(default = "default_block_number")]
    pub(crate) block_number: BlockNumber,

    /// The candidates of the node pool.
    pub(crate) nodes: Vec<CandidateNode>,

    /// The VRF nonce history.
    #[serde(default)]
    pub(crate) nonces: Vec<HexBytes>,

    #[serde(default)]
    pub(crate) accounts: Vec<Funding>,

    #[serde(default)]
    pub(crate) tokens: Vec<Token>,

    #[serde(default)]
    pub(crate) contracts: Vec<Contract>,

    pub(crate) steps: Vec<Step>,
}

const fn default_block_number() -> BlockNumber {
    1
}

impl Scenario {
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

        Self::from_json_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub(crate) fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The block the steps execute in, with hashes derived from its number.
    pub(crate) fn block(&self) -> BlockContext {
        let hash_of = |number: BlockNumber| keccak256(number.to_be_bytes());

        BlockContext {
            number: self.block_number,
            hash: hash_of(self.block_number),
            parent_hash: hash_of(self.block_number.saturating_sub(1)),
        }
    }

    pub(crate) fn nonces(&self) -> Vec<Vec<u8>> {
        self.nonces.iter().map(|nonce| nonce.0.clone()).collect()
    }

    /// Builds the ledger in its initial state.
    pub(crate) fn ledger(&self) -> InMemoryLedger {
        let mut ledger = InMemoryLedger::new(self.block(), Default::default());

        for Funding { address, amount } in &self.accounts {
            ledger.set_balance(*address, *amount);
        }
        for token in &self.tokens {
            ledger.deploy_token(token.address);
            for Funding { address, amount } in &token.holders {
                ledger.mint_token(token.address, *address, *amount);
            }
        }
        for contract in &self.contracts {
            ledger.deploy_code(contract.address, contract.code.0.clone());
        }

        ledger
    }
}

#[cfg(test)]
mod tests {
    use bubble_primitives::host::EvmHost;

    use super::*;

    const SAMPLE: &str = include_str!("../samples/scenario.json");

    #[test]
    fn sample_scenario_builds_ledger() {
        let scenario = Scenario::from_json_str(SAMPLE).unwrap();
        let ledger = scenario.ledger();

        assert_eq!(scenario.nodes.len(), 2);
        assert!(!scenario.steps.is_empty());
        for funding in &scenario.accounts {
            assert_eq!(ledger.balance(&funding.address), funding.amount);
        }
        for contract in &scenario.contracts {
            assert_eq!(ledger.code(&contract.address), contract.code.0);
        }
        assert_ne!(ledger.block().hash, ledger.block().parent_hash);
    }

    #[test]
    fn steps_default_to_real_transactions() {
        let scenario = Scenario::from_json_str(
            r#"{
                "nodes": [],
                "steps": [{
                    "caller": "0x00000000000000000000000000000000000000aa",
                    "call": {"method": "allotBubble", "sizeCode": 1}
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.block_number, 1);
        assert!(!scenario.steps[0].estimate);
        assert_eq!(scenario.steps[0].origin, None);
        assert_eq!(
            scenario.steps[0].call,
            BubbleCall::AllotBubble { size_code: 1 }
        );
    }
}
