// Copyright (c) 2022 MASSA LABS <info@massa.net>

/// Length of a block random seed
pub const RANDOM_SEED_LENGTH: usize = 48;

/// Metadata of a block as seen by contracts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub timestamp: u64,
    pub nonce: u64,
    pub round: u64,
    pub epoch: u32,
    pub random_seed: [u8; RANDOM_SEED_LENGTH],
}

impl Default for BlockInfo {
    fn default() -> Self {
        BlockInfo {
            timestamp: 0,
            nonce: 0,
            round: 0,
            epoch: 0,
            random_seed: [0; RANDOM_SEED_LENGTH],
        }
    }
}

impl BlockInfo {
    /// Copies `seed` into the fixed-size seed, truncating or zero-padding it
    pub fn set_random_seed(&mut self, seed: &[u8]) {
        let mut random_seed = [0u8; RANDOM_SEED_LENGTH];
        let length = seed.len().min(RANDOM_SEED_LENGTH);
        random_seed[..length].copy_from_slice(&seed[..length]);
        self.random_seed = random_seed;
    }
}
