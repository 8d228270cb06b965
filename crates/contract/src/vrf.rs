//! VRF-seeded selection of operators and bubbles.
//!
//! The seed mixes the parent chain's historical VRF nonces with the caller's account nonce, so
//! every node derives the same picks while the caller cannot choose them in advance.

use bubble_primitives::hashing::keccak256;
use primitive_types::{H256, U256};
use rlp::RlpStream;

/// Derives the selection seed: `keccak256(rlp([parent_nonces..., caller_nonce]))`.
pub(crate) fn seed(parent_nonces: &[Vec<u8>], caller_nonce: u64) -> H256 {
    let mut stream = RlpStream::new_list(parent_nonces.len() + 1);
    for nonce in parent_nonces {
        stream.append(nonce);
    }
    stream.append(&caller_nonce);

    keccak256(stream.out())
}

/// Draws without replacement from pools using a seed.
///
/// The k-th draw of a selector picks index `keccak256(seed ‖ be_u64(k)) mod remaining`.
#[derive(Debug, Clone)]
pub(crate) struct VrfSelector {
    seed: H256,
    draws: u64,
}

impl VrfSelector {
    pub(crate) const fn new(seed: H256) -> Self {
        Self { seed, draws: 0 }
    }

    fn next_index(&mut self, len: usize) -> usize {
        let mut preimage = [0u8; 40];
        preimage[..32].copy_from_slice(self.seed.as_bytes());
        preimage[32..].copy_from_slice(&self.draws.to_be_bytes());
        self.draws += 1;

        let draw = U256::from_big_endian(keccak256(preimage).as_bytes());
        (draw % U256::from(len)).low_u64() as usize
    }

    /// Picks `n` distinct items from `pool`, in draw order.
    ///
    /// Returns `None` if the pool holds fewer than `n` items.
    pub(crate) fn pick<T>(&mut self, mut pool: Vec<T>, n: usize) -> Option<Vec<T>> {
        if pool.len() < n {
            return None;
        }

        let mut picked = Vec::with_capacity(n);
        for _ in 0..n {
            let idx = self.next_index(pool.len());
            picked.push(pool.remove(idx));
        }

        Some(picked)
    }
}
