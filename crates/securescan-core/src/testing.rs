//! Seeded environment for core-level tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::env::Environment;

/// Deterministic environment: seeded RNG and a virtual clock that `sleep`
/// advances instantly. Clones share state.
#[derive(Clone)]
pub(crate) struct TestEnv {
    inner: Rc<RefCell<Inner>>,
    origin: Instant,
}

struct Inner {
    rng: ChaCha20Rng,
    offset: Duration,
}

impl TestEnv {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                rng: ChaCha20Rng::seed_from_u64(seed),
                offset: Duration::ZERO,
            })),
            origin: Instant::now(),
        }
    }

    /// Advance the virtual clock without sleeping.
    pub(crate) fn advance(&self, duration: Duration) {
        self.inner.borrow_mut().offset += duration;
    }
}

impl Environment for TestEnv {
    fn now(&self) -> Instant {
        self.origin + self.inner.borrow().offset
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.inner.borrow_mut().rng.fill_bytes(buffer);
    }
}
