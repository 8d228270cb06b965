//! Gas accounting of a single contract invocation.

use tracing::trace;

use crate::errors::FatalError;

/// Tracks the gas consumed by one invocation against its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasMeter {
    limit: u64,
    used: u64,
}

impl GasMeter {
    /// Creates a meter with nothing consumed yet.
    pub const fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Consumes `amount`, failing without consuming anything if the limit would be exceeded.
    pub fn charge(&mut self, amount: u64) -> Result<(), FatalError> {
        let used = self
            .used
            .checked_add(amount)
            .filter(|used| *used <= self.limit)
            .ok_or(FatalError::OutOfGas)?;

        trace!(amount, used, limit = self.limit, "charged gas");
        self.used = used;

        Ok(())
    }

    /// Gas still available.
    pub const fn remaining(&self) -> u64 {
        self.limit - self.used
    }

    /// Gas consumed so far.
    pub const fn used(&self) -> u64 {
        self.used
    }
}
