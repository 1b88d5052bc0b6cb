//! Baseline constants for sweeps, noise and the record file format.

use std::f64::consts::PI;

/// Default sweep density in points per frequency decade.
pub const DEFAULT_POINTS_PER_DECADE: usize = 10;
/// Default excitation amplitude in volts used by the current/voltage noise models.
pub const DEFAULT_EXCITATION_VOLTAGE: f64 = 0.01;
/// Largest serial number that can be allocated per date and directory.
pub const MAX_SERIAL: u32 = 9999;
/// Line terminating the metadata header of a record file.
pub const HEADER_SENTINEL: &str = "---";
/// Data source tag written for simulated records.
pub const SIMULATION_SOURCE: &str = "simulation";
/// Extension of record files.
pub const RECORD_EXTENSION: &str = "csv";

/// Returns the angular frequency corresponding to a linear frequency `hz`.
#[inline]
#[must_use]
pub fn angular_frequency(hz: f64) -> f64 {
    2.0 * PI * hz
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn angular_frequency_of_one_hertz() {
        assert_relative_eq!(angular_frequency(1.0), 2.0 * PI, max_relative = 1.0e-15);
    }
}
