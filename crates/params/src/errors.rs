//! Errors for the bubble parameters.

use bubble_primitives::types::SizeCode;
use thiserror::Error;

/// Error while loading or validating the bubble parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// The parameters could not be parsed.
    #[error("invalid params toml: {0}")]
    Parse(String),

    /// The same size code is configured more than once.
    #[error("size class {0} is configured more than once")]
    DuplicateSizeCode(SizeCode),

    /// A size class has no operators of one of the roles.
    #[error("size class {0} must have at least one operator of each role")]
    NoOperators(SizeCode),

    /// The use ratio ceiling exceeds 100%.
    #[error("max node use ratio must not exceed {max} bps, got {got}")]
    RatioOutOfRange {
        /// The highest allowed value.
        max: u32,
        /// The configured value.
        got: u32,
    },

    /// The requested size class is not configured.
    #[error("size class {0} is not configured")]
    UnknownSizeCode(SizeCode),
}
