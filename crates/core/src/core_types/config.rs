//! Explicit, immutable configuration for the simulator and the analyzer.
//!
//! Every threshold that used to live as a module-level constant in the
//! flight scripts is a field here, so mutually inconsistent threshold sets
//! can be tested side by side instead of being hard-coded. Configurations
//! are validated once, up front; a rejected configuration aborts the run
//! before any simulation or analysis happens.

use crate::core_types::record::FlightPhase;
use crate::error::{CoreError, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Noise model for one physical sensor: an independent uniform jitter draw
/// plus a fixed systematic bias.
///
/// Secondary sensors measuring the same quantity get a small non-zero bias
/// so that downstream cross-validation has realistic disagreement to work
/// with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorNoise {
    /// Half-width of the uniform jitter; each reading adds a draw from
    /// `[-jitter, jitter]`.
    pub jitter: f64,
    /// Fixed systematic offset added to every reading.
    pub bias: f64,
}

impl SensorNoise {
    /// Unbiased sensor with the given jitter half-width.
    #[must_use]
    pub fn jitter(jitter: f64) -> Self {
        SensorNoise { jitter, bias: 0.0 }
    }

    /// Biased sensor.
    #[must_use]
    pub fn biased(jitter: f64, bias: f64) -> Self {
        SensorNoise { jitter, bias }
    }
}

/// Per-sensor noise parameters for the full sensor suite.
///
/// Defaults are calibrated to the datasheet precision of the flight
/// hardware: the primary hygrometer/thermometer, the CO₂ sensor's internal
/// thermometer (slight positive drift), and the barometer thermometer
/// (reads ~0.4 °C warm from processor heat).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Primary temperature sensor (°C).
    pub temp_primary: SensorNoise,
    /// CO₂-sensor thermometer (°C).
    pub temp_co2_sensor: SensorNoise,
    /// Barometer thermometer (°C).
    pub temp_baro_sensor: SensorNoise,
    /// Primary humidity sensor (%).
    pub hum_primary: SensorNoise,
    /// CO₂-sensor hygrometer (%).
    pub hum_co2_sensor: SensorNoise,
    /// Pressure jitter half-width (hPa).
    pub pressure_jitter_hpa: f64,
    /// CO₂ jitter, asymmetric around the baseline (ppm).
    pub co2_jitter_min_ppm: f64,
    /// Upper CO₂ jitter bound (ppm).
    pub co2_jitter_max_ppm: f64,
    /// PM2.5 jitter, asymmetric — local turbulence spikes upward (µg/m³).
    pub pm25_jitter_min: f64,
    /// Upper PM2.5 jitter bound (µg/m³).
    pub pm25_jitter_max: f64,
    /// PM1.0 as a multiplicative fraction of PM2.5, drawn per sample.
    pub pm1_ratio_min: f64,
    /// Upper bound of the PM1.0/PM2.5 ratio.
    pub pm1_ratio_max: f64,
    /// PM10 as a multiplicative factor of PM2.5, drawn per sample.
    pub pm10_ratio_min: f64,
    /// Upper bound of the PM10/PM2.5 ratio.
    pub pm10_ratio_max: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        NoiseConfig {
            temp_primary: SensorNoise::jitter(0.3),
            temp_co2_sensor: SensorNoise::biased(0.4, 0.1),
            temp_baro_sensor: SensorNoise::biased(0.3, 0.4),
            hum_primary: SensorNoise::jitter(2.0),
            hum_co2_sensor: SensorNoise::biased(2.5, -1.0),
            pressure_jitter_hpa: 0.5,
            co2_jitter_min_ppm: -10.0,
            co2_jitter_max_ppm: 15.0,
            pm25_jitter_min: -5.0,
            pm25_jitter_max: 8.0,
            pm1_ratio_min: 0.55,
            pm1_ratio_max: 0.80,
            pm10_ratio_min: 1.2,
            pm10_ratio_max: 1.6,
        }
    }
}

impl NoiseConfig {
    /// Validate jitter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] when a jitter half-width
    /// is negative or an asymmetric jitter/ratio range is inverted.
    pub fn validate(&self) -> Result<()> {
        let sensors = [
            ("temp_primary", self.temp_primary),
            ("temp_co2_sensor", self.temp_co2_sensor),
            ("temp_baro_sensor", self.temp_baro_sensor),
            ("hum_primary", self.hum_primary),
            ("hum_co2_sensor", self.hum_co2_sensor),
        ];
        for (name, sensor) in sensors {
            if sensor.jitter < 0.0 {
                return Err(CoreError::invalid_config(format!(
                    "{name} jitter must be non-negative, got {}",
                    sensor.jitter
                )));
            }
        }
        let ranges = [
            ("co2 jitter", self.co2_jitter_min_ppm, self.co2_jitter_max_ppm),
            ("pm2.5 jitter", self.pm25_jitter_min, self.pm25_jitter_max),
            ("pm1.0 ratio", self.pm1_ratio_min, self.pm1_ratio_max),
            ("pm10 ratio", self.pm10_ratio_min, self.pm10_ratio_max),
        ];
        for (name, min, max) in ranges {
            if min > max {
                return Err(CoreError::invalid_config(format!(
                    "{name} range [{min}, {max}] is inverted"
                )));
            }
        }
        if self.pressure_jitter_hpa < 0.0 {
            return Err(CoreError::invalid_config(
                "pressure jitter must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Flight-dynamics configuration for the simulator.
///
/// All phase transitions are driven by the *physical* altitude crossing
/// these thresholds, never by elapsed time, so they hold under sensor noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightConfig {
    /// Launch site latitude (degrees).
    pub launch_latitude: f64,
    /// Launch site longitude (degrees).
    pub launch_longitude: f64,
    /// Altitude AGL at which the simulation starts (m).
    pub start_altitude_agl: f64,
    /// Phase at simulation start: [`FlightPhase::Ascent`] for a rocket
    /// carry, [`FlightPhase::FreeFall`] for a drop start.
    pub start_phase: FlightPhase,
    /// Separation altitude ending the ascent (m AGL).
    pub separation_altitude_m: f64,
    /// Parachute-deploy altitude (m AGL).
    pub deploy_altitude_m: f64,
    /// Depth of the deploying band below the deploy altitude (m); the
    /// payload is in [`FlightPhase::ParachuteDeploying`] while inside it.
    pub deploy_band_m: f64,
    /// Climb rate during ascent (m/s).
    pub ascent_velocity_ms: f64,
    /// Sink rate in free fall (m/s).
    pub free_fall_velocity_ms: f64,
    /// Sink rate while the canopy opens (m/s).
    pub deploy_velocity_ms: f64,
    /// Sink rate under full canopy (m/s).
    pub descent_velocity_ms: f64,
    /// Vertical turbulence half-width added to each altitude step (m).
    pub turbulence_m: f64,
    /// Horizontal wind vector (m/s, x = east, y = north, z unused).
    pub wind_ms: Vector3<f64>,
    /// Sampling interval Δt (s).
    pub sample_interval_s: f64,
    /// Number of extra ground-phase records emitted after landing.
    pub ground_dwell_steps: u32,
    /// Seed for the simulator's random source; a fixed seed reproduces the
    /// record sequence exactly.
    pub seed: u64,
}

impl Default for FlightConfig {
    /// Drop-start descent from 1000 m AGL, the baseline mission scenario.
    fn default() -> Self {
        FlightConfig {
            launch_latitude: 40.4052,
            launch_longitude: -3.9931,
            start_altitude_agl: 1000.0,
            start_phase: FlightPhase::FreeFall,
            separation_altitude_m: 1500.0,
            deploy_altitude_m: 900.0,
            deploy_band_m: 20.0,
            ascent_velocity_ms: 12.0,
            free_fall_velocity_ms: 25.0,
            deploy_velocity_ms: 18.0,
            descent_velocity_ms: 9.0,
            turbulence_m: 0.4,
            wind_ms: Vector3::new(1.5, 2.5, 0.0),
            sample_interval_s: 1.0,
            ground_dwell_steps: 5,
            seed: 42,
        }
    }
}

impl FlightConfig {
    /// Signed vertical velocity for a phase (m/s, positive up).
    #[must_use]
    pub fn vertical_velocity_ms(&self, phase: FlightPhase) -> f64 {
        match phase {
            FlightPhase::Ascent => self.ascent_velocity_ms,
            FlightPhase::FreeFall => -self.free_fall_velocity_ms,
            FlightPhase::ParachuteDeploying => -self.deploy_velocity_ms,
            FlightPhase::Descent => -self.descent_velocity_ms,
            FlightPhase::Ground => 0.0,
        }
    }

    /// Validate threshold ordering and step parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] when the altitude
    /// thresholds are out of physical order (e.g. deploy at or above
    /// separation), a velocity is not positive, or the sampling interval is
    /// not positive.
    pub fn validate(&self) -> Result<()> {
        if self.deploy_altitude_m >= self.separation_altitude_m {
            return Err(CoreError::invalid_config(format!(
                "deploy altitude {} m must be below separation altitude {} m",
                self.deploy_altitude_m, self.separation_altitude_m
            )));
        }
        if self.deploy_altitude_m <= 0.0 {
            return Err(CoreError::invalid_config(format!(
                "deploy altitude must be above ground, got {} m",
                self.deploy_altitude_m
            )));
        }
        if self.deploy_band_m <= 0.0 || self.deploy_band_m >= self.deploy_altitude_m {
            return Err(CoreError::invalid_config(format!(
                "deploy band {} m must be positive and end above ground",
                self.deploy_band_m
            )));
        }
        if self.start_altitude_agl <= 0.0 {
            return Err(CoreError::invalid_config(format!(
                "start altitude must be positive, got {} m",
                self.start_altitude_agl
            )));
        }
        if self.start_phase == FlightPhase::Ascent
            && self.start_altitude_agl >= self.separation_altitude_m
        {
            return Err(CoreError::invalid_config(
                "ascent start requires a start altitude below the separation altitude",
            ));
        }
        let velocities = [
            ("ascent", self.ascent_velocity_ms),
            ("free-fall", self.free_fall_velocity_ms),
            ("deploy", self.deploy_velocity_ms),
            ("descent", self.descent_velocity_ms),
        ];
        for (name, v) in velocities {
            if v <= 0.0 {
                return Err(CoreError::invalid_config(format!(
                    "{name} velocity must be positive, got {v} m/s"
                )));
            }
        }
        if self.sample_interval_s <= 0.0 {
            return Err(CoreError::invalid_config(format!(
                "sampling interval must be positive, got {} s",
                self.sample_interval_s
            )));
        }
        if self.turbulence_m < 0.0 {
            return Err(CoreError::invalid_config(
                "turbulence half-width must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Thresholds for the vertical-profile builder and the layer detector.
///
/// The flight scripts carried at least three inconsistent threshold sets;
/// here they are explicit inputs with the post-flight analysis defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Altitude bin width (m).
    pub bin_width_m: f64,
    /// Minimum samples per bin; smaller bins are discarded as statistically
    /// unreliable.
    pub min_samples_per_bin: usize,
    /// Positive temperature gradient above which a bin is flagged as a
    /// thermal inversion (°C per m). The default is 0.5 °C over a 50 m bin.
    pub inversion_gradient_c_per_m: f64,
    /// Mean PM2.5 above which a bin is flagged as an accumulation layer
    /// (µg/m³).
    pub pm25_layer_threshold: f64,
    /// CO₂ range across bins below which the profile counts as well mixed
    /// (ppm).
    pub co2_mixing_range_ppm: f64,
    /// Absolute temperature disagreement between any two sensors that
    /// triggers a cross-validation alarm (°C).
    pub temp_delta_alarm_c: f64,
    /// Absolute humidity disagreement that triggers an alarm (%).
    pub hum_delta_alarm_pct: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            bin_width_m: 50.0,
            min_samples_per_bin: 2,
            inversion_gradient_c_per_m: 0.01,
            pm25_layer_threshold: 15.0,
            co2_mixing_range_ppm: 20.0,
            temp_delta_alarm_c: 3.0,
            hum_delta_alarm_pct: 8.0,
        }
    }
}

impl AnalysisConfig {
    /// Validate bin geometry and thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] when the bin width is not
    /// positive, the minimum sample count is zero, or a threshold is
    /// negative.
    pub fn validate(&self) -> Result<()> {
        if self.bin_width_m <= 0.0 {
            return Err(CoreError::invalid_config(format!(
                "bin width must be positive, got {} m",
                self.bin_width_m
            )));
        }
        if self.min_samples_per_bin == 0 {
            return Err(CoreError::invalid_config(
                "minimum samples per bin must be at least 1",
            ));
        }
        if self.inversion_gradient_c_per_m <= 0.0 {
            return Err(CoreError::invalid_config(
                "inversion gradient threshold must be positive (inversions are rising temperature)",
            ));
        }
        if self.pm25_layer_threshold < 0.0 || self.co2_mixing_range_ppm < 0.0 {
            return Err(CoreError::invalid_config(
                "pollutant thresholds must be non-negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        FlightConfig::default().validate().unwrap();
        NoiseConfig::default().validate().unwrap();
        AnalysisConfig::default().validate().unwrap();
    }

    #[test]
    fn test_deploy_above_separation_rejected() {
        let config = FlightConfig {
            deploy_altitude_m: 1600.0,
            ..FlightConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("deploy altitude"));
    }

    #[test]
    fn test_zero_bin_width_rejected() {
        let config = AnalysisConfig {
            bin_width_m: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_phase_velocities_signed() {
        let config = FlightConfig::default();
        assert!(config.vertical_velocity_ms(FlightPhase::Ascent) > 0.0);
        assert!(config.vertical_velocity_ms(FlightPhase::FreeFall) < 0.0);
        assert_eq!(config.vertical_velocity_ms(FlightPhase::Ground), 0.0);
        // Free fall is the fastest descent, canopy the slowest
        assert!(
            config.vertical_velocity_ms(FlightPhase::FreeFall)
                < config.vertical_velocity_ms(FlightPhase::Descent)
        );
    }
}
