//! Production environment backed by the operating system.

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::OsRng;
use rand::RngCore;
use securescan_core::Environment;

/// Real clock, blocking sleep, OS entropy.
///
/// Used by the CLI when no seed is given, so reported handshake timings
/// reflect actual wall-clock cost.
#[derive(Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        OsRng.fill_bytes(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_monotonic() {
        let env = SystemEnv::new();
        let a = env.now();
        let b = env.now();
        assert!(b >= a);
    }

    #[test]
    fn entropy_is_not_constant() {
        let env = SystemEnv::new();
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        env.random_bytes(&mut a);
        env.random_bytes(&mut b);
        assert_ne!(a, b);
    }
}
