//! Deterministic simulation environment.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use securescan_core::Environment;

/// Seeded environment with a virtual clock.
///
/// `sleep` advances the clock instantly instead of blocking, so simulated
/// jitter and timeouts cost no wall time. All randomness, including RSA
/// key generation inside the actors, draws from one ChaCha20 stream, so a
/// seed pins the entire run. Clones share state.
#[derive(Clone)]
pub struct SimEnv {
    inner: Arc<Mutex<Inner>>,
    origin: Instant,
}

struct Inner {
    rng: ChaCha20Rng,
    offset: Duration,
}

impl SimEnv {
    /// Create an environment seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                rng: ChaCha20Rng::seed_from_u64(seed),
                offset: Duration::ZERO,
            })),
            origin: Instant::now(),
        }
    }

    /// Advance the virtual clock without going through `sleep`. Used by
    /// timeout tests.
    pub fn advance(&self, duration: Duration) {
        self.lock().offset += duration;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("sim env lock poisoned")
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        self.origin + self.lock().offset
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.lock().rng.fill_bytes(buffer);
    }
}
