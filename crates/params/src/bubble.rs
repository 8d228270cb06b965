//! The top-level parameters of the bubble contract.

use std::collections::BTreeSet;

use bubble_primitives::{
    constants::BASIS_POINTS,
    types::{Address, SizeCode},
};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::{
    default::{
        BUBBLE_CONTRACT_ADDRESS, LARGE_MIN_STAKING, MAX_NODE_USE_RATIO_BPS, MEDIUM_MIN_STAKING,
        SMALL_MIN_STAKING,
    },
    errors::ParamsError,
    gas::GasSchedule,
    size::SizeConfig,
};

/// The parameters shared by every node executing the bubble contract.
///
/// These parameters are consensus-critical meaning that all nodes must agree on them, or they
/// will diverge on the outcome of allotments, deployments and gas accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BubbleParams {
    /// The node use ratio (in basis points) at or above which allotments elect an existing
    /// bubble instead of creating a new one.
    pub max_node_use_ratio_bps: u32,

    /// The address of the contract; logs are emitted from it.
    pub contract_address: Address,

    /// The system account that holds staked and escrowed funds.
    pub custody_address: Address,

    /// The gas schedule.
    #[serde(default)]
    pub gas: GasSchedule,

    /// The size classes callers may request.
    pub size_classes: Vec<SizeConfig>,
}

impl Default for BubbleParams {
    fn default() -> Self {
        let size_class = |code, operators, min: &str| SizeConfig {
            code,
            l1_operators: operators,
            l2_operators: operators,
            // the literals above are valid decimal strings
            min_staking_amount: U256::from_dec_str(min).unwrap_or_default(),
        };

        Self {
            max_node_use_ratio_bps: MAX_NODE_USE_RATIO_BPS,
            contract_address: BUBBLE_CONTRACT_ADDRESS,
            custody_address: BUBBLE_CONTRACT_ADDRESS,
            gas: GasSchedule::default(),
            size_classes: vec![
                size_class(1, 1, SMALL_MIN_STAKING),
                size_class(2, 3, MEDIUM_MIN_STAKING),
                size_class(3, 5, LARGE_MIN_STAKING),
            ],
        }
    }
}

impl BubbleParams {
    /// Parses and validates the parameters from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ParamsError> {
        let params: Self = toml::from_str(raw).map_err(|e| ParamsError::Parse(e.to_string()))?;
        params.validate()?;

        Ok(params)
    }

    /// Checks that the parameters are internally consistent.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.max_node_use_ratio_bps > BASIS_POINTS {
            return Err(ParamsError::RatioOutOfRange {
                max: BASIS_POINTS,
                got: self.max_node_use_ratio_bps,
            });
        }

        let mut seen = BTreeSet::new();
        for config in &self.size_classes {
            if !seen.insert(config.code) {
                return Err(ParamsError::DuplicateSizeCode(config.code));
            }
            if config.l1_operators == 0 || config.l2_operators == 0 {
                return Err(ParamsError::NoOperators(config.code));
            }
        }

        Ok(())
    }

    /// Returns the configuration of the size class `code`.
    pub fn size_config(&self, code: SizeCode) -> Result<&SizeConfig, ParamsError> {
        self.size_classes
            .iter()
            .find(|config| config.code == code)
            .ok_or(ParamsError::UnknownSizeCode(code))
    }
}
