// Random names for staging folders on the remote side.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CHARACTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-";
const NAME_LENGTH: usize = 8;

/// Endless sequence of short random names.
///
/// The generator owns its RNG and remembers which process seeded it. If it
/// is ever driven from another process (after a fork) it reseeds first, so
/// parent and child never hand out the same sequence.
pub struct RandomNameSequence {
    rng: StdRng,
    pid: u32,
}

impl RandomNameSequence {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            pid: std::process::id(),
        }
    }

    /// Deterministic sequence for tests and reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            pid: std::process::id(),
        }
    }

    /// Name of a fresh staging folder, `temp-` followed by the next token.
    pub fn staging_prefix(&mut self) -> String {
        format!("temp-{}", self.next_name())
    }

    fn rng(&mut self) -> &mut StdRng {
        let pid = std::process::id();
        if pid != self.pid {
            self.rng = StdRng::from_entropy();
            self.pid = pid;
        }
        &mut self.rng
    }

    fn next_name(&mut self) -> String {
        let rng = self.rng();
        (0..NAME_LENGTH)
            .map(|_| char::from(CHARACTERS[rng.gen_range(0..CHARACTERS.len())]))
            .collect()
    }
}

impl Default for RandomNameSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for RandomNameSequence {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_name())
    }
}
