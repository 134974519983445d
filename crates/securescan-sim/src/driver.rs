//! Sequential exchange driver.
//!
//! The driver picks a random (station, access point) pair and runs one
//! complete beacon/probe/response exchange to resolution before starting
//! the next. Every frame an actor sends is appended to the world's
//! history, including frames of exchanges that later fail; the history is
//! exactly what an eavesdropper would capture.

use std::time::Duration;

use securescan_core::{AccessPoint, Environment, HandshakeError, Protocol, Station};
use securescan_proto::Frame;
use tracing::{debug, warn};

use crate::config::SimConfig;
use crate::report::SimReport;
use crate::world::World;
use crate::OracleFn;

/// How often a not-sent iteration is retried with a fresh random pair
/// before it is written off as failed. Only the standard protocol can
/// decline to probe, so this bound is never hit in secure runs.
const MAX_NOT_SENT_RETRIES: usize = 100;

/// Resolution of one driven exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The handshake ran to verification.
    Completed {
        /// Whether the station ended up trusting the responder
        trusted: bool,
        /// Environment time from beacon to verified response
        duration: Duration,
    },
    /// The station declined to probe (standard protocol, untrusted SSID).
    NotSent,
}

/// A configured simulation run over one world.
pub struct Simulation<E: Environment> {
    config: SimConfig,
    env: E,
    world: World,
    handshake_times: Vec<Duration>,
    failed_exchanges: usize,
}

impl<E: Environment> Simulation<E> {
    /// Validate the configuration and build the world.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid configuration parameter.
    pub fn new(config: SimConfig, env: E) -> Result<Self, String> {
        config.validate()?;
        let world = World::build(&config, &env);
        Ok(Self { config, env, world, handshake_times: Vec::new(), failed_exchanges: 0 })
    }

    /// The world being simulated.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Drive one exchange between a random station and access point.
    ///
    /// On completion, asserts the protocol's central invariant: the
    /// verification outcome equals the trust relationship wired at world
    /// construction. A mismatch is a protocol bug, not a runtime
    /// condition, so it panics.
    ///
    /// # Errors
    ///
    /// Propagates any [`HandshakeError`] raised by either actor. The
    /// world stays usable; only the failed exchange's pending entry was
    /// consumed.
    pub fn run_exchange(&mut self) -> Result<ExchangeOutcome, HandshakeError> {
        let station_idx = (self.env.random_u64() % self.config.stations as u64) as usize;
        let ap_idx = (self.env.random_u64() % self.config.access_points as u64) as usize;
        let started = self.env.now();

        let (station, ap) = self.world.actors_mut(station_idx, ap_idx);
        // The plaintext protocol decides trust by SSID alone; the secure
        // variant checks the full identity pair.
        let trusted_before = match self.config.protocol {
            Protocol::Standard => station.trusts_ssid(ap.ssid()),
            Protocol::SecureScan => station.trusts(ap.ssid(), ap.public_key_der()),
        };

        let mut frames = Vec::with_capacity(3);
        let result = Self::drive(station, ap, &self.env, &mut frames);

        for frame in frames {
            self.log_frame(&frame);
            self.world.record(frame);
        }

        match result? {
            Some(trusted) => {
                assert_eq!(
                    trusted, trusted_before,
                    "verification outcome diverged from the wired trust relationship"
                );
                let duration = self.env.now().duration_since(started);
                Ok(ExchangeOutcome::Completed { trusted, duration })
            },
            None => Ok(ExchangeOutcome::NotSent),
        }
    }

    fn drive(
        station: &mut Station,
        ap: &mut AccessPoint,
        env: &E,
        frames: &mut Vec<Frame>,
    ) -> Result<Option<bool>, HandshakeError> {
        let beacon = ap.send_beacon(env);
        frames.push(beacon.clone());

        let request = match station.send_probe_request(&beacon, env)? {
            Some(request) => request,
            None => return Ok(None),
        };
        frames.push(request.clone());

        let response = match ap.send_probe_response(&request, env)? {
            Some(response) => response,
            None => return Ok(None),
        };
        frames.push(response.clone());

        let verification = station.verify_probe_response(&response, env)?;
        Ok(Some(verification.trusted))
    }

    /// Run the configured number of iterations and summarise.
    ///
    /// A not-sent exchange retries the iteration with a fresh random
    /// pair; handshake errors and exhausted retries are counted as failed
    /// iterations and the run continues.
    pub fn run(&mut self) -> SimReport {
        for iteration in 0..self.config.iterations {
            let mut attempts = 0;
            loop {
                match self.run_exchange() {
                    Ok(ExchangeOutcome::Completed { trusted, duration }) => {
                        debug!(iteration, trusted, ?duration, "exchange completed");
                        self.handshake_times.push(duration);
                        break;
                    },
                    Ok(ExchangeOutcome::NotSent) => {
                        attempts += 1;
                        if attempts >= MAX_NOT_SENT_RETRIES {
                            warn!(iteration, "no probe sent after {MAX_NOT_SENT_RETRIES} attempts");
                            self.failed_exchanges += 1;
                            break;
                        }
                    },
                    Err(err) => {
                        warn!(iteration, %err, recoverable = err.is_recoverable(), "exchange failed");
                        self.failed_exchanges += 1;
                        break;
                    },
                }
            }
        }
        self.report()
    }

    /// Check a world-level invariant after (or between) runs.
    ///
    /// # Errors
    ///
    /// Returns the oracle's description of the violated invariant.
    pub fn verify(&self, oracle: OracleFn) -> Result<(), String> {
        oracle(&self.world)
    }

    fn report(&self) -> SimReport {
        let mean_handshake_time = if self.handshake_times.is_empty() {
            Duration::ZERO
        } else {
            self.handshake_times.iter().sum::<Duration>() / self.handshake_times.len() as u32
        };

        SimReport {
            protocol: self.config.protocol,
            stations: self.config.stations,
            access_points: self.config.access_points,
            connection_probability: self.config.connection_probability,
            iterations: self.config.iterations,
            total_probe_requests: self.world.total_probe_requests(),
            unique_probe_requests: self.world.unique_probe_requests(),
            mean_handshake_time,
            failed_exchanges: self.failed_exchanges,
            classifier_accuracy: None,
        }
    }

    fn log_frame(&self, frame: &Frame) {
        if self.config.verbose {
            tracing::info!("\n{frame}");
        } else {
            tracing::debug!("\n{frame}");
        }
    }
}
