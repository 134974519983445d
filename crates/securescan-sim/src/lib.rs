//! Simulation harness for the SecureScan discovery handshake.
//!
//! This crate drives the pure state machines from `securescan-core`
//! through complete beacon/probe/response exchanges and records every
//! frame, producing the history and timing data the downstream privacy
//! analysis consumes.
//!
//! # Determinism
//!
//! Every run is parameterised by an [`Environment`]: [`SimEnv`] gives a
//! seeded RNG and a virtual clock, so the same seed reproduces the same
//! frame history byte for byte; [`SystemEnv`] gives the real clock and OS
//! entropy for wall-clock measurements.
//!
//! # Oracles
//!
//! After a run, [`Simulation::verify`] checks world-level invariants with
//! oracle functions ([`oracle`]): no dangling pending exchanges, a
//! well-formed frame history, and unique rotating addresses across probe
//! requests.
//!
//! [`Environment`]: securescan_core::Environment

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod driver;
pub mod oracle;
pub mod report;
pub mod sim_env;
pub mod system_env;
pub mod world;

pub use config::SimConfig;
pub use driver::{ExchangeOutcome, Simulation};
pub use oracle::OracleFn;
pub use report::SimReport;
pub use sim_env::SimEnv;
pub use system_env::SystemEnv;
pub use world::World;
