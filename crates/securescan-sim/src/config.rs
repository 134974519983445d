//! Simulation parameters.

use securescan_core::{Protocol, StationConfig};

/// Parameters for one simulation run.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Discovery protocol spoken by every actor in the run.
    pub protocol: Protocol,
    /// Number of stations.
    pub stations: usize,
    /// Number of access points.
    pub access_points: usize,
    /// Probability that a given (station, access point) pair is wired as
    /// trusted when the world is built.
    pub connection_probability: f64,
    /// Number of completed exchanges to drive.
    pub iterations: usize,
    /// Dump every frame at info level instead of debug.
    pub verbose: bool,
    /// Timing parameters applied to every station.
    pub station: StationConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::SecureScan,
            stations: 1,
            access_points: 1,
            connection_probability: 0.5,
            iterations: 100,
            verbose: false,
            station: StationConfig::default(),
        }
    }
}

impl SimConfig {
    /// Check the parameters for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid parameter.
    pub fn validate(&self) -> Result<(), String> {
        if self.stations == 0 {
            return Err("stations must be at least 1".into());
        }
        if self.access_points == 0 {
            return Err("access points must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.connection_probability) {
            return Err(format!(
                "connection probability must be within [0, 1], got {}",
                self.connection_probability
            ));
        }
        if self.iterations == 0 {
            return Err("iterations must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert!(SimConfig { stations: 0, ..SimConfig::default() }.validate().is_err());
        assert!(SimConfig { access_points: 0, ..SimConfig::default() }.validate().is_err());
        assert!(SimConfig { iterations: 0, ..SimConfig::default() }.validate().is_err());
        assert!(SimConfig { connection_probability: 1.5, ..SimConfig::default() }
            .validate()
            .is_err());
        assert!(SimConfig { connection_probability: -0.1, ..SimConfig::default() }
            .validate()
            .is_err());
    }
}
