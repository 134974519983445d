//! Run summary and CSV export.
//!
//! The CSV schema is shared with the downstream analysis tooling, which
//! merges rows from standard and secure runs and fills in the classifier
//! accuracy column after linking probes back to devices.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use securescan_core::Protocol;

/// Summary of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimReport {
    /// Protocol the run was driven under.
    pub protocol: Protocol,
    /// Number of stations.
    pub stations: usize,
    /// Number of access points.
    pub access_points: usize,
    /// Configured trust-wiring probability.
    pub connection_probability: f64,
    /// Configured iteration count.
    pub iterations: usize,
    /// Probe requests sent across the whole run.
    pub total_probe_requests: usize,
    /// Distinct probe request payloads.
    pub unique_probe_requests: usize,
    /// Mean beacon-to-verification time over completed exchanges.
    pub mean_handshake_time: Duration,
    /// Iterations that ended in a handshake error or were never sent.
    pub failed_exchanges: usize,
    /// Filled in by the analysis layer, never by the simulator.
    pub classifier_accuracy: Option<f64>,
}

impl SimReport {
    /// Column header of the shared CSV schema.
    pub const CSV_HEADER: &'static str =
        "protocol,s,a,p,classifier_accuracy,standard_t,secure_scan_t,upr";

    /// Unique-payload ratio: 1.0 means every probe request was distinct.
    #[must_use]
    pub fn unique_probe_ratio(&self) -> f64 {
        if self.total_probe_requests == 0 {
            0.0
        } else {
            self.unique_probe_requests as f64 / self.total_probe_requests as f64
        }
    }

    /// Render one row of the shared CSV schema.
    ///
    /// The timing lands in the column matching the protocol; the other
    /// stays empty so rows from both protocols merge cleanly. `upr` is
    /// the unique probe-request count; the analysis layer works on its
    /// logarithm, so the column carries counts, not the ratio.
    #[must_use]
    pub fn csv_row(&self) -> String {
        let timing = format!("{:.6}", self.mean_handshake_time.as_secs_f64());
        let (standard_t, secure_scan_t) = match self.protocol {
            Protocol::Standard => (timing.as_str(), ""),
            Protocol::SecureScan => ("", timing.as_str()),
        };
        let accuracy =
            self.classifier_accuracy.map_or_else(String::new, |a| format!("{a:.4}"));

        format!(
            "{},{},{},{},{},{},{},{}",
            self.protocol,
            self.stations,
            self.access_points,
            self.connection_probability,
            accuracy,
            standard_t,
            secure_scan_t,
            self.unique_probe_requests,
        )
    }

    /// Append this run's row to `path`, writing the header first if the
    /// file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn append_csv(&self, path: &Path) -> io::Result<()> {
        let fresh = !path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if fresh {
            writeln!(file, "{}", Self::CSV_HEADER)?;
        }
        writeln!(file, "{}", self.csv_row())
    }
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Protocol: \t\t{}", self.protocol)?;
        writeln!(
            f,
            "Topology: \t\t{} stations, {} access points, p = {}",
            self.stations, self.access_points, self.connection_probability
        )?;
        writeln!(
            f,
            "Iterations: \t\t{} ({} failed)",
            self.iterations, self.failed_exchanges
        )?;
        writeln!(
            f,
            "Probe requests: \t{} ({} unique, ratio {:.4})",
            self.total_probe_requests,
            self.unique_probe_requests,
            self.unique_probe_ratio()
        )?;
        write!(f, "Mean handshake time: \t{:?}", self.mean_handshake_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(protocol: Protocol) -> SimReport {
        SimReport {
            protocol,
            stations: 2,
            access_points: 3,
            connection_probability: 0.5,
            iterations: 10,
            total_probe_requests: 10,
            unique_probe_requests: 10,
            mean_handshake_time: Duration::from_millis(250),
            failed_exchanges: 0,
            classifier_accuracy: None,
        }
    }

    #[test]
    fn secure_row_fills_the_secure_column() {
        let row = sample(Protocol::SecureScan).csv_row();
        assert_eq!(row, "secure_scan,2,3,0.5,,,0.250000,10");
    }

    #[test]
    fn standard_row_fills_the_standard_column() {
        let mut report = sample(Protocol::Standard);
        report.unique_probe_requests = 3;
        let row = report.csv_row();
        assert_eq!(row, "standard,2,3,0.5,,0.250000,,3");
    }

    #[test]
    fn upr_column_is_a_count() {
        // Downstream tooling takes log(upr); the column must carry the
        // raw unique count, never the ratio.
        let report = sample(Protocol::SecureScan);
        assert!(report.csv_row().ends_with(",10"));
        assert_eq!(report.unique_probe_ratio(), 1.0);
    }

    #[test]
    fn empty_run_has_zero_ratio() {
        let mut report = sample(Protocol::SecureScan);
        report.total_probe_requests = 0;
        report.unique_probe_requests = 0;
        assert_eq!(report.unique_probe_ratio(), 0.0);
    }

    #[test]
    fn append_writes_header_once() {
        let path = std::env::temp_dir()
            .join(format!("securescan-report-{}.csv", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let report = sample(Protocol::SecureScan);
        report.append_csv(&path).unwrap();
        report.append_csv(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SimReport::CSV_HEADER);
        assert_eq!(lines[1], lines[2]);
    }
}
