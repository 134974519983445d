//! Simulated network state: actors and the frame history.

use std::collections::HashSet;

use securescan_core::{AccessPoint, Environment, Station};
use securescan_proto::{ActorId, Frame, FrameType};

use crate::config::SimConfig;

/// Every actor in the simulation plus the append-only frame history.
///
/// Single-threaded by design: each actor has one logical owner (the
/// driver), and history entries are appended in the order frames are
/// sent. A concurrent driver would need per-actor locks, which the
/// simulation model deliberately avoids.
pub struct World {
    stations: Vec<Station>,
    access_points: Vec<AccessPoint>,
    history: Vec<Frame>,
}

impl World {
    /// Create all actors and wire trust relationships.
    ///
    /// Stations get actor ids `0..stations`; access points follow. Each
    /// (station, access point) pair is wired as trusted with the
    /// configured probability, drawn from the environment's RNG so a
    /// seeded run reproduces the same topology.
    #[must_use]
    pub fn build<E: Environment>(config: &SimConfig, env: &E) -> Self {
        let mut stations: Vec<Station> = (0..config.stations)
            .map(|i| Station::new(ActorId(i as u32), config.protocol, config.station, env))
            .collect();
        let access_points: Vec<AccessPoint> = (0..config.access_points)
            .map(|i| {
                AccessPoint::new(ActorId((config.stations + i) as u32), config.protocol, env)
            })
            .collect();

        for station in &mut stations {
            for ap in &access_points {
                if env.random_f64() < config.connection_probability {
                    station.save_ap(ap);
                }
            }
        }

        Self { stations, access_points, history: Vec::new() }
    }

    /// All stations.
    #[must_use]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// All access points.
    #[must_use]
    pub fn access_points(&self) -> &[AccessPoint] {
        &self.access_points
    }

    /// The complete frame history, in send order.
    #[must_use]
    pub fn history(&self) -> &[Frame] {
        &self.history
    }

    /// Append a frame to the history.
    pub fn record(&mut self, frame: Frame) {
        self.history.push(frame);
    }

    /// Mutable access to one station and one access point at once; the
    /// driver holds both for the duration of an exchange.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub(crate) fn actors_mut(
        &mut self,
        station: usize,
        access_point: usize,
    ) -> (&mut Station, &mut AccessPoint) {
        (&mut self.stations[station], &mut self.access_points[access_point])
    }

    /// All probe request frames in the history.
    pub fn probe_requests(&self) -> impl Iterator<Item = &Frame> {
        self.history.iter().filter(|f| f.frame_type == FrameType::ProbeRequest)
    }

    /// Number of probe requests sent.
    #[must_use]
    pub fn total_probe_requests(&self) -> usize {
        self.probe_requests().count()
    }

    /// Number of distinct probe request payloads.
    ///
    /// Under the secure protocol every request is encrypted with fresh
    /// randomness, so this should equal the total; under the standard
    /// protocol repeated plaintext probes collapse. The ratio between the
    /// two is the unlinkability signal the analysis layer measures.
    #[must_use]
    pub fn unique_probe_requests(&self) -> usize {
        self.probe_requests().map(|f| &f.contents).collect::<HashSet<_>>().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim_env::SimEnv;
    use securescan_core::Protocol;

    #[test]
    fn build_creates_the_configured_actors() {
        let env = SimEnv::new(1);
        let config = SimConfig { stations: 3, access_points: 2, ..SimConfig::default() };
        let world = World::build(&config, &env);

        assert_eq!(world.stations().len(), 3);
        assert_eq!(world.access_points().len(), 2);
        assert!(world.history().is_empty());

        // Actor ids are disjoint across the two populations.
        let station_ids: Vec<u32> = world.stations().iter().map(|s| s.id().0).collect();
        let ap_ids: Vec<u32> = world.access_points().iter().map(|a| a.id().0).collect();
        assert_eq!(station_ids, vec![0, 1, 2]);
        assert_eq!(ap_ids, vec![3, 4]);
    }

    #[test]
    fn certain_probability_wires_every_pair() {
        let env = SimEnv::new(2);
        let config = SimConfig {
            stations: 2,
            access_points: 2,
            connection_probability: 1.0,
            protocol: Protocol::SecureScan,
            ..SimConfig::default()
        };
        let world = World::build(&config, &env);

        for station in world.stations() {
            for ap in world.access_points() {
                assert!(station.trusts(ap.ssid(), ap.public_key_der()));
            }
        }
    }

    #[test]
    fn zero_probability_wires_nothing() {
        let env = SimEnv::new(3);
        let config =
            SimConfig { connection_probability: 0.0, ..SimConfig::default() };
        let world = World::build(&config, &env);
        let station = &world.stations()[0];
        let ap = &world.access_points()[0];
        assert!(!station.trusts(ap.ssid(), ap.public_key_der()));
    }
}
