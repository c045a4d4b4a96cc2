//! Telemetry data model shared by the simulator and the analysis engine.
//!
//! One [`TelemetryRecord`] per sample, owned by the caller (simulator or
//! file loader); the analysis engine only reads records and returns new,
//! independently-owned aggregates.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flight phase of the payload.
///
/// The variant order is the physical order of the mission; transitions along
/// a telemetry sequence are monotone in this order (`Ord` derives from the
/// declaration order) and [`FlightPhase::Ground`] is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum FlightPhase {
    /// Carried upward by the launch vehicle.
    #[default]
    Ascent,
    /// Separated from the vehicle, falling without drag device.
    FreeFall,
    /// Parachute opening; short, high-deceleration band below the deploy
    /// altitude.
    ParachuteDeploying,
    /// Stable descent under canopy.
    Descent,
    /// Landed; near-zero motion.
    Ground,
}

impl FlightPhase {
    /// Canonical wire name as used in the `fase` column of the tabular schema.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FlightPhase::Ascent => "ascent",
            FlightPhase::FreeFall => "free_fall",
            FlightPhase::ParachuteDeploying => "parachute_deploying",
            FlightPhase::Descent => "descent",
            FlightPhase::Ground => "ground",
        }
    }

    /// Whether this phase can never be left.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == FlightPhase::Ground
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascent" => Ok(FlightPhase::Ascent),
            "free_fall" => Ok(FlightPhase::FreeFall),
            "parachute_deploying" => Ok(FlightPhase::ParachuteDeploying),
            "descent" => Ok(FlightPhase::Descent),
            "ground" => Ok(FlightPhase::Ground),
            other => Err(format!("unknown flight phase '{other}'")),
        }
    }
}

/// One telemetry sample.
///
/// Temperature is read by three independent sensors and relative humidity by
/// two; the redundancy feeds the cross-validation in
/// [`crate::validation::cross_validate`]. Naming follows the flight hardware:
/// the primary environmental sensor (HS300x class), the CO₂ sensor's
/// internal thermometer (SCD40 class), and the barometer's thermometer
/// (LPS22HB class, mounted near the processor and biased warm).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Elapsed seconds since mission/simulation start; monotonically
    /// non-decreasing along a sequence.
    pub time_s: f64,
    /// Latitude in degrees. `(0, 0)` together with `longitude` is the
    /// "no GPS fix" sentinel.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude above ground level (m); the primary vertical coordinate.
    pub altitude_agl: f64,
    /// Altitude above mean sea level (m).
    pub altitude_msl: f64,
    /// GPS satellites in view.
    pub satellites: u32,
    /// Temperature from the primary environmental sensor (°C).
    pub temp_primary_c: f64,
    /// Temperature from the CO₂ sensor's thermometer (°C).
    pub temp_co2_sensor_c: f64,
    /// Temperature from the barometer's thermometer (°C); reads warm.
    pub temp_baro_sensor_c: f64,
    /// Relative humidity from the primary sensor (%).
    pub hum_primary_pct: f64,
    /// Relative humidity from the CO₂ sensor (%).
    pub hum_co2_sensor_pct: f64,
    /// Barometric pressure (hPa).
    pub pressure_hpa: f64,
    /// CO₂ concentration (ppm).
    pub co2_ppm: f64,
    /// Particulate matter ≤ 1.0 µm (µg/m³).
    pub pm1_0: f64,
    /// Particulate matter ≤ 2.5 µm (µg/m³).
    pub pm2_5: f64,
    /// Particulate matter ≤ 10 µm (µg/m³).
    pub pm10: f64,
    /// Accelerometer reading (m/s², body frame).
    pub accel: Vector3<f64>,
    /// Gyroscope reading (°/s, body frame).
    pub gyro: Vector3<f64>,
    /// Flight phase at sampling time.
    pub phase: FlightPhase,
}

impl TelemetryRecord {
    /// Whether the record carries a GPS fix.
    ///
    /// `(0, 0)` is the reserved no-fix sentinel and must be filtered before
    /// any geospatial use; altitude-profile computation does not require a
    /// fix and should not apply this filter.
    #[must_use]
    pub fn has_gps_fix(&self) -> bool {
        self.latitude != 0.0 || self.longitude != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_is_mission_order() {
        assert!(FlightPhase::Ascent < FlightPhase::FreeFall);
        assert!(FlightPhase::FreeFall < FlightPhase::ParachuteDeploying);
        assert!(FlightPhase::ParachuteDeploying < FlightPhase::Descent);
        assert!(FlightPhase::Descent < FlightPhase::Ground);
        assert!(FlightPhase::Ground.is_terminal());
        assert!(!FlightPhase::Descent.is_terminal());
    }

    #[test]
    fn test_phase_round_trips_through_wire_name() {
        for phase in [
            FlightPhase::Ascent,
            FlightPhase::FreeFall,
            FlightPhase::ParachuteDeploying,
            FlightPhase::Descent,
            FlightPhase::Ground,
        ] {
            assert_eq!(phase.as_str().parse::<FlightPhase>(), Ok(phase));
        }
        assert!("caida_libre".parse::<FlightPhase>().is_err());
    }

    #[test]
    fn test_gps_fix_sentinel() {
        let mut record = TelemetryRecord {
            time_s: 0.0,
            latitude: 0.0,
            longitude: 0.0,
            altitude_agl: 100.0,
            altitude_msl: 750.0,
            satellites: 0,
            temp_primary_c: 12.0,
            temp_co2_sensor_c: 12.1,
            temp_baro_sensor_c: 12.4,
            hum_primary_pct: 55.0,
            hum_co2_sensor_pct: 54.0,
            pressure_hpa: 930.0,
            co2_ppm: 420.0,
            pm1_0: 3.0,
            pm2_5: 5.0,
            pm10: 8.0,
            accel: Vector3::zeros(),
            gyro: Vector3::zeros(),
            phase: FlightPhase::Descent,
        };
        assert!(!record.has_gps_fix());

        record.latitude = 40.4052;
        record.longitude = -3.9931;
        assert!(record.has_gps_fix());
    }
}
