//! World-level invariant checks.
//!
//! An oracle inspects the final world and either accepts it or describes
//! the violated invariant. Runs are verified after the fact rather than
//! instrumented during, so the driver stays identical between tested and
//! untested executions.

use std::collections::HashSet;

use securescan_proto::{FrameContents, FrameType};

use crate::world::World;

/// A single world-level check.
pub type OracleFn = Box<dyn FnOnce(&World) -> Result<(), String>>;

/// Every exchange that was opened was also resolved: no station holds a
/// pending entry once the run is over.
#[must_use]
pub fn no_pending_exchanges() -> OracleFn {
    Box::new(|world| {
        for station in world.stations() {
            if station.pending_len() > 0 {
                return Err(format!(
                    "station {} finished with {} unresolved exchanges",
                    station.id(),
                    station.pending_len()
                ));
            }
        }
        Ok(())
    })
}

/// The frame history respects causality: a probe request needs a prior
/// beacon, and responses never outnumber requests at any point.
#[must_use]
pub fn history_well_formed() -> OracleFn {
    Box::new(|world| {
        let mut beacons = 0usize;
        let mut requests = 0usize;
        let mut responses = 0usize;

        for frame in world.history() {
            match frame.frame_type {
                FrameType::Beacon => beacons += 1,
                FrameType::ProbeRequest => {
                    if beacons == 0 {
                        return Err("probe request recorded before any beacon".into());
                    }
                    requests += 1;
                },
                FrameType::ProbeResponse => {
                    responses += 1;
                    if responses > requests {
                        return Err(format!(
                            "response #{responses} recorded with only {requests} requests"
                        ));
                    }
                },
            }
        }

        if requests > beacons {
            return Err(format!("{requests} requests but only {beacons} beacons"));
        }
        Ok(())
    })
}

/// No two encrypted probe requests share a source address: the rotation
/// policy held for the whole run. Plaintext probes are exempt; reusing
/// the stable address is exactly the standard protocol's leak.
#[must_use]
pub fn rotating_addresses_unique() -> OracleFn {
    Box::new(|world| {
        let mut seen = HashSet::new();
        for frame in world.probe_requests() {
            if matches!(frame.contents, FrameContents::Fragments(_))
                && !seen.insert(&frame.source)
            {
                return Err(format!(
                    "rotating address {} reused across probe requests",
                    frame.source
                ));
            }
        }
        Ok(())
    })
}

/// Run every oracle, failing on the first violation.
#[must_use]
pub fn all_of(oracles: Vec<OracleFn>) -> OracleFn {
    Box::new(move |world| {
        for oracle in oracles {
            oracle(world)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim_env::SimEnv;
    use bytes::Bytes;
    use securescan_core::Environment;
    use securescan_proto::{ActorId, Addr, Frame};

    fn empty_world(env: &SimEnv) -> World {
        World::build(&SimConfig::default(), env)
    }

    fn frame(env: &SimEnv, frame_type: FrameType, source: Addr, contents: FrameContents) -> Frame {
        Frame::new(frame_type, env.now(), source, Addr::broadcast(), ActorId(0), contents)
    }

    #[test]
    fn fresh_world_passes_all_oracles() {
        let env = SimEnv::new(0);
        let world = empty_world(&env);
        all_of(vec![no_pending_exchanges(), history_well_formed(), rotating_addresses_unique()])(
            &world,
        )
        .unwrap();
    }

    #[test]
    fn request_without_beacon_is_flagged() {
        let env = SimEnv::new(1);
        let mut world = empty_world(&env);
        let source = Addr::from_bytes([1, 2, 3, 4, 5, 6]);
        world.record(frame(
            &env,
            FrameType::ProbeRequest,
            source,
            FrameContents::Plain(Bytes::from_static(b"homewifi")),
        ));

        assert!(history_well_formed()(&world).is_err());
    }

    #[test]
    fn reused_rotating_address_is_flagged() {
        let env = SimEnv::new(2);
        let mut world = empty_world(&env);
        let source = Addr::from_bytes([9, 9, 9, 9, 9, 9]);
        let ciphertext = FrameContents::Fragments(vec![Bytes::from_static(b"opaque")]);

        world.record(frame(&env, FrameType::Beacon, Addr::from_bytes([0; 6]), ciphertext.clone()));
        world.record(frame(&env, FrameType::ProbeRequest, source.clone(), ciphertext.clone()));
        world.record(frame(&env, FrameType::ProbeRequest, source, ciphertext));

        assert!(rotating_addresses_unique()(&world).is_err());
        // Stable-address reuse in plaintext probes is allowed.
        let mut plain_world = empty_world(&env);
        let stable = Addr::from_bytes([7; 6]);
        let ssid = FrameContents::Plain(Bytes::from_static(b"homewifi"));
        plain_world.record(frame(&env, FrameType::Beacon, stable.clone(), ssid.clone()));
        plain_world.record(frame(&env, FrameType::ProbeRequest, stable.clone(), ssid.clone()));
        plain_world.record(frame(&env, FrameType::ProbeRequest, stable, ssid));
        rotating_addresses_unique()(&plain_world).unwrap();
    }
}
