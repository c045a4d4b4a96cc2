//! Whole-flight mission report.
//!
//! Rolls one telemetry sequence into a single [`FlightReport`]: per-channel
//! statistics, per-phase dwell times, ground-track drift, the binned
//! vertical profile with its layer assessment, cross-sensor validation, and
//! a worst-case emission-source classification.

use crate::classify::{self, AirQuality, RiskTier, SourceSignature};
use crate::core_types::config::AnalysisConfig;
use crate::core_types::record::{FlightPhase, TelemetryRecord};
use crate::detector::{self, ProfileSummary};
use crate::error::{CoreError, Result};
use crate::profile::{self, AltitudeBin};
use crate::validation::{self, CrossValidation};

/// Meters of ground distance per degree of latitude.
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Mean, minimum, and maximum of one channel over the flight.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ChannelStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ChannelStats {
    fn over(records: &[TelemetryRecord], channel: impl Fn(&TelemetryRecord) -> f64) -> ChannelStats {
        let mut sum = 0.0;
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for record in records {
            let value = channel(record);
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        ChannelStats {
            mean: sum / records.len() as f64,
            min,
            max,
        }
    }
}

/// Time spent in one flight phase.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PhaseDwell {
    pub phase: FlightPhase,
    pub seconds: f64,
}

/// Post-flight mission report.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FlightReport {
    pub samples: usize,
    pub duration_s: f64,
    pub max_altitude_agl_m: f64,
    pub max_altitude_msl_m: f64,
    /// Primary thermometer.
    pub temperature_c: ChannelStats,
    /// CO₂-sensor thermometer.
    pub temp_co2_sensor_c: ChannelStats,
    /// Barometer thermometer.
    pub temp_baro_sensor_c: ChannelStats,
    pub humidity_pct: ChannelStats,
    pub pressure_hpa: ChannelStats,
    pub co2_ppm: ChannelStats,
    pub pm2_5: ChannelStats,
    pub pm10: ChannelStats,
    /// Phases in mission order with the time spent in each; phases never
    /// entered are omitted.
    pub phase_dwell: Vec<PhaseDwell>,
    /// Ground-track distance between the first and last GPS fix, meters.
    pub drift_distance_m: f64,
    /// Source classification of the worst measurement triple seen.
    pub peak_signature: SourceSignature,
    pub peak_risk: RiskTier,
    pub co2_quality: AirQuality,
    pub pm25_quality: AirQuality,
    pub cross_validation: CrossValidation,
    pub bins: Vec<AltitudeBin>,
    pub layers: ProfileSummary,
}

/// Build the full mission report for one flight.
///
/// # Errors
///
/// Returns [`CoreError::InsufficientData`] when `records` is empty and
/// [`CoreError::InvalidConfiguration`] when the analysis config is
/// rejected.
pub fn flight_report(records: &[TelemetryRecord], config: &AnalysisConfig) -> Result<FlightReport> {
    config.validate()?;
    if records.is_empty() {
        return Err(CoreError::InsufficientData { needed: 1, got: 0 });
    }

    let bins = profile::build_profile(records, config)?;
    let layers = detector::detect_layers(&bins, config);
    let cross_validation = validation::cross_validate(records, config)?;

    let co2 = ChannelStats::over(records, |r| r.co2_ppm);
    let pm2_5 = ChannelStats::over(records, |r| r.pm2_5);
    let pm10 = ChannelStats::over(records, |r| r.pm10);
    let (peak_signature, peak_risk) = classify::classify(co2.max, pm2_5.max, pm10.max);

    Ok(FlightReport {
        samples: records.len(),
        duration_s: records[records.len() - 1].time_s - records[0].time_s,
        max_altitude_agl_m: records.iter().map(|r| r.altitude_agl).fold(f64::MIN, f64::max),
        max_altitude_msl_m: records.iter().map(|r| r.altitude_msl).fold(f64::MIN, f64::max),
        temperature_c: ChannelStats::over(records, |r| r.temp_primary_c),
        temp_co2_sensor_c: ChannelStats::over(records, |r| r.temp_co2_sensor_c),
        temp_baro_sensor_c: ChannelStats::over(records, |r| r.temp_baro_sensor_c),
        humidity_pct: ChannelStats::over(records, |r| r.hum_primary_pct),
        pressure_hpa: ChannelStats::over(records, |r| r.pressure_hpa),
        phase_dwell: phase_dwell(records),
        drift_distance_m: drift_distance_m(records),
        co2_quality: classify::co2_air_quality(co2.max),
        pm25_quality: classify::pm25_air_quality(pm2_5.max),
        co2_ppm: co2,
        pm2_5,
        pm10,
        peak_signature,
        peak_risk,
        cross_validation,
        bins,
        layers,
    })
}

/// Attribute the time between consecutive samples to the later sample's
/// phase, in mission order.
fn phase_dwell(records: &[TelemetryRecord]) -> Vec<PhaseDwell> {
    const ORDER: [FlightPhase; 5] = [
        FlightPhase::Ascent,
        FlightPhase::FreeFall,
        FlightPhase::ParachuteDeploying,
        FlightPhase::Descent,
        FlightPhase::Ground,
    ];
    let mut seconds = [0.0_f64; 5];
    for pair in records.windows(2) {
        let dt = pair[1].time_s - pair[0].time_s;
        if let Some(slot) = ORDER.iter().position(|p| *p == pair[1].phase) {
            seconds[slot] += dt;
        }
    }
    ORDER
        .iter()
        .zip(seconds)
        .filter(|(_, s)| *s > 0.0)
        .map(|(phase, s)| PhaseDwell {
            phase: *phase,
            seconds: s,
        })
        .collect()
}

/// Equirectangular ground distance between the first and last GPS fix.
fn drift_distance_m(records: &[TelemetryRecord]) -> f64 {
    let mut fixes = records.iter().filter(|r| r.has_gps_fix());
    let Some(first) = fixes.next() else {
        return 0.0;
    };
    let last = fixes.last().unwrap_or(first);
    let mean_lat = f64::midpoint(first.latitude, last.latitude).to_radians();
    let north = (last.latitude - first.latitude) * METERS_PER_DEG_LAT;
    let east = (last.longitude - first.longitude) * METERS_PER_DEG_LAT * mean_lat.cos();
    north.hypot(east)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(time: f64, altitude: f64, phase: FlightPhase) -> TelemetryRecord {
        TelemetryRecord {
            time_s: time,
            latitude: 40.0,
            longitude: -3.9,
            altitude_agl: altitude,
            altitude_msl: altitude + 650.0,
            temp_primary_c: 12.0,
            temp_co2_sensor_c: 12.1,
            temp_baro_sensor_c: 12.4,
            hum_primary_pct: 55.0,
            hum_co2_sensor_pct: 54.0,
            pressure_hpa: 950.0,
            co2_ppm: 430.0,
            pm1_0: 4.0,
            pm2_5: 6.0,
            pm10: 9.0,
            phase,
            ..TelemetryRecord::default()
        }
    }

    fn short_flight() -> Vec<TelemetryRecord> {
        vec![
            record(0.0, 120.0, FlightPhase::Descent),
            record(1.0, 110.0, FlightPhase::Descent),
            record(2.0, 100.0, FlightPhase::Descent),
            record(3.0, 60.0, FlightPhase::Descent),
            record(4.0, 50.0, FlightPhase::Descent),
            record(5.0, 0.0, FlightPhase::Ground),
            record(6.0, 0.0, FlightPhase::Ground),
        ]
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let result = flight_report(&[], &AnalysisConfig::default());
        assert!(matches!(result, Err(CoreError::InsufficientData { .. })));
    }

    #[test]
    fn test_report_basics() {
        let report = flight_report(&short_flight(), &AnalysisConfig::default()).unwrap();
        assert_eq!(report.samples, 7);
        assert_relative_eq!(report.duration_s, 6.0);
        assert_relative_eq!(report.max_altitude_agl_m, 120.0);
        assert_relative_eq!(report.temperature_c.mean, 12.0);
        assert_relative_eq!(report.temp_baro_sensor_c.mean, 12.4);
        assert_eq!(report.peak_signature, SourceSignature::CleanAir);
        assert_eq!(report.peak_risk, RiskTier::Minimal);
        assert_eq!(report.co2_quality, AirQuality::Excellent);
    }

    #[test]
    fn test_phase_dwell_in_mission_order() {
        let report = flight_report(&short_flight(), &AnalysisConfig::default()).unwrap();
        let phases: Vec<FlightPhase> = report.phase_dwell.iter().map(|d| d.phase).collect();
        assert_eq!(phases, vec![FlightPhase::Descent, FlightPhase::Ground]);
        assert_relative_eq!(report.phase_dwell[0].seconds, 4.0);
        assert_relative_eq!(report.phase_dwell[1].seconds, 2.0);
    }

    #[test]
    fn test_drift_distance() {
        let mut records = short_flight();
        // Move the landing point 0.001 degrees north of the start
        for r in &mut records {
            r.latitude = 40.0 + r.time_s / 6.0 * 0.001;
        }
        let report = flight_report(&records, &AnalysisConfig::default()).unwrap();
        assert_relative_eq!(report.drift_distance_m, 111.32, epsilon = 0.01);
    }

    #[test]
    fn test_no_gps_fix_means_no_drift() {
        let mut records = short_flight();
        for r in &mut records {
            r.latitude = 0.0;
            r.longitude = 0.0;
        }
        let report = flight_report(&records, &AnalysisConfig::default()).unwrap();
        assert_relative_eq!(report.drift_distance_m, 0.0);
    }
}
