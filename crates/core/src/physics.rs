//! Sensor physics model.
//!
//! Pure functions computing noiseless "true" atmospheric values from
//! altitude and an [`AtmosphereProfile`], plus the per-sensor noise draws
//! that turn them into realistic readings. The functions never fail:
//! outputs are always finite and clamped to physically valid ranges.
//!
//! # Model
//!
//! - Temperature: piecewise linear lapse, `T(h) = T_ground − (h/1000)·Γ`,
//!   with the lapse rate replaced inside a configured inversion band. The
//!   piecewise function is continuous in value at the band boundaries: each
//!   segment starts from the previous segment's ending temperature.
//! - Pressure: barometric formula `P(h) = P0 · exp(−h_msl / 8500)` with an
//!   8.5 km scale height.
//! - Humidity: rises slowly with altitude, clamped to [10, 95] % after
//!   noise.
//! - Pollutants: altitude-band lookup with uniform jitter; PM1.0 and PM10
//!   are derived from PM2.5 by per-sample multiplicative ratios.

use crate::core_types::atmosphere::AtmosphereProfile;
use crate::core_types::config::{NoiseConfig, SensorNoise};
use crate::core_types::record::FlightPhase;
use nalgebra::Vector3;
use rand::Rng;

/// Barometric scale height (m) for the exponential pressure model.
pub const PRESSURE_SCALE_HEIGHT_M: f64 = 8500.0;

/// Physical humidity bounds for any emitted reading (%).
pub const HUMIDITY_RANGE_PCT: (f64, f64) = (10.0, 95.0);

/// Global CO₂ background used above/below every configured pollution band (ppm).
pub const BACKGROUND_CO2_PPM: f64 = 420.0;

/// PM2.5 background used outside every configured pollution band (µg/m³).
pub const BACKGROUND_PM25: f64 = 5.0;

/// Standard gravity (m/s²), for phase-dependent IMU synthesis.
const GRAVITY_MS2: f64 = 9.81;

/// Noiseless temperature at an altitude, honoring the inversion band.
///
/// Outside the inversion the normal lapse applies from the ground up.
/// Inside `[base, top]` the band's own lapse rate applies, continuing from
/// the temperature at the band base; above the top the normal lapse resumes
/// from the band-top temperature, so the profile has no jump
/// discontinuities.
#[must_use]
pub fn true_temperature_c(profile: &AtmosphereProfile, altitude_agl: f64) -> f64 {
    let normal = profile.lapse_rate_c_per_km;
    let Some(inv) = profile.inversion else {
        return profile.ground_temp_c - (altitude_agl / 1000.0) * normal;
    };

    if altitude_agl < inv.base {
        profile.ground_temp_c - (altitude_agl / 1000.0) * normal
    } else if altitude_agl < inv.top {
        let temp_at_base = profile.ground_temp_c - (inv.base / 1000.0) * normal;
        temp_at_base - ((altitude_agl - inv.base) / 1000.0) * inv.lapse_rate_c_per_km
    } else {
        let temp_at_base = profile.ground_temp_c - (inv.base / 1000.0) * normal;
        let temp_at_top = temp_at_base - ((inv.top - inv.base) / 1000.0) * inv.lapse_rate_c_per_km;
        temp_at_top - ((altitude_agl - inv.top) / 1000.0) * normal
    }
}

/// Noiseless barometric pressure at an altitude above mean sea level (hPa).
#[must_use]
pub fn pressure_hpa(profile: &AtmosphereProfile, altitude_msl: f64) -> f64 {
    profile.sea_level_pressure_hpa * (-altitude_msl / PRESSURE_SCALE_HEIGHT_M).exp()
}

/// Barometric altitude from a pressure reading (m MSL).
///
/// The inverse the flight firmware applies to its pressure sensor,
/// `h = 44330 · (1 − (P/P0)^0.1903)`; exposed for cross-checking GPS
/// altitude against the barometric estimate.
#[must_use]
pub fn barometric_altitude_m(sea_level_pressure_hpa: f64, pressure_hpa: f64) -> f64 {
    44330.0 * (1.0 - (pressure_hpa / sea_level_pressure_hpa).powf(0.1903))
}

/// Noiseless relative humidity at an altitude (%), before clamping.
#[must_use]
pub fn true_humidity_pct(profile: &AtmosphereProfile, altitude_agl: f64) -> f64 {
    profile.ground_humidity_pct + (altitude_agl / 1000.0) * profile.humidity_rise_pct_per_km
}

/// One full environment sample: true values plus per-sensor noisy readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentSample {
    /// Noise-free temperature the sensor readings scatter around (°C).
    pub temp_true_c: f64,
    /// Primary temperature reading (°C).
    pub temp_primary_c: f64,
    /// CO₂-sensor thermometer reading (°C).
    pub temp_co2_sensor_c: f64,
    /// Barometer thermometer reading (°C).
    pub temp_baro_sensor_c: f64,
    /// Primary humidity reading (%), clamped to the physical range.
    pub hum_primary_pct: f64,
    /// CO₂-sensor humidity reading (%), clamped to the physical range.
    pub hum_co2_sensor_pct: f64,
    /// Pressure reading (hPa).
    pub pressure_hpa: f64,
    /// CO₂ reading (ppm).
    pub co2_ppm: f64,
    /// PM1.0 reading (µg/m³).
    pub pm1_0: f64,
    /// PM2.5 reading (µg/m³).
    pub pm2_5: f64,
    /// PM10 reading (µg/m³).
    pub pm10: f64,
}

/// Uniform draw over `[lo, hi]`, degenerate ranges collapsing to `lo`.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if lo < hi {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

/// One reading from a sensor: true value + bias + independent jitter draw.
fn read_sensor<R: Rng + ?Sized>(rng: &mut R, true_value: f64, sensor: SensorNoise) -> f64 {
    true_value + sensor.bias + uniform(rng, -sensor.jitter, sensor.jitter)
}

/// Sample the full environmental sensor suite at an altitude.
///
/// Each sensor gets an independent noise draw, so two sensors measuring the
/// same quantity disagree by their combined jitter plus the difference of
/// their systematic biases — which is what the downstream cross-validation
/// keys on.
pub fn sample_environment<R: Rng + ?Sized>(
    profile: &AtmosphereProfile,
    noise: &NoiseConfig,
    altitude_agl: f64,
    altitude_msl: f64,
    rng: &mut R,
) -> EnvironmentSample {
    let temp_true_c = true_temperature_c(profile, altitude_agl);
    let temp_primary_c = read_sensor(rng, temp_true_c, noise.temp_primary);
    let temp_co2_sensor_c = read_sensor(rng, temp_true_c, noise.temp_co2_sensor);
    let temp_baro_sensor_c = read_sensor(rng, temp_true_c, noise.temp_baro_sensor);

    let hum_true = true_humidity_pct(profile, altitude_agl);
    let (hum_lo, hum_hi) = HUMIDITY_RANGE_PCT;
    let hum_primary_pct = read_sensor(rng, hum_true, noise.hum_primary).clamp(hum_lo, hum_hi);
    let hum_co2_sensor_pct = read_sensor(rng, hum_true, noise.hum_co2_sensor).clamp(hum_lo, hum_hi);

    let pressure = pressure_hpa(profile, altitude_msl)
        + uniform(rng, -noise.pressure_jitter_hpa, noise.pressure_jitter_hpa);

    let (baseline_co2, baseline_pm25) = profile
        .pollution_at(altitude_agl)
        .map_or((BACKGROUND_CO2_PPM, BACKGROUND_PM25), |band| {
            (band.baseline_co2, band.baseline_pm25)
        });

    let co2_ppm =
        (baseline_co2 + uniform(rng, noise.co2_jitter_min_ppm, noise.co2_jitter_max_ppm)).max(0.0);
    let pm2_5 = (baseline_pm25 + uniform(rng, noise.pm25_jitter_min, noise.pm25_jitter_max)).max(0.0);
    let pm1_0 = pm2_5 * uniform(rng, noise.pm1_ratio_min, noise.pm1_ratio_max);
    let pm10 = pm2_5 * uniform(rng, noise.pm10_ratio_min, noise.pm10_ratio_max);

    EnvironmentSample {
        temp_true_c,
        temp_primary_c,
        temp_co2_sensor_c,
        temp_baro_sensor_c,
        hum_primary_pct,
        hum_co2_sensor_pct,
        pressure_hpa: pressure,
        co2_ppm,
        pm1_0,
        pm2_5,
        pm10,
    }
}

/// Synthesize accelerometer and gyroscope readings for a flight phase.
///
/// Returns `(accel m/s², gyro °/s)` in the body frame. Free fall reads near
/// 0 g with fast tumbling; the canopy opening is a hard vertical jerk; the
/// stable descent and the ground read ~1 g with little rotation.
pub fn sample_imu<R: Rng + ?Sized>(
    phase: FlightPhase,
    rng: &mut R,
) -> (Vector3<f64>, Vector3<f64>) {
    let g = GRAVITY_MS2;
    match phase {
        FlightPhase::Ascent => (
            Vector3::new(
                uniform(rng, -0.5, 0.5),
                uniform(rng, -0.5, 0.5),
                uniform(rng, g, 1.2 * g),
            ),
            Vector3::new(
                uniform(rng, -5.0, 5.0),
                uniform(rng, -5.0, 5.0),
                uniform(rng, -10.0, 10.0),
            ),
        ),
        FlightPhase::FreeFall => (
            Vector3::new(
                uniform(rng, -1.5, 1.5),
                uniform(rng, -1.5, 1.5),
                uniform(rng, -0.5, 0.5),
            ),
            Vector3::new(
                uniform(rng, -100.0, 100.0),
                uniform(rng, -100.0, 100.0),
                uniform(rng, -150.0, 150.0),
            ),
        ),
        FlightPhase::ParachuteDeploying => (
            Vector3::new(
                uniform(rng, -2.0, 2.0),
                uniform(rng, -2.0, 2.0),
                uniform(rng, 1.5 * g, 2.0 * g),
            ),
            Vector3::new(
                uniform(rng, -50.0, 50.0),
                uniform(rng, -50.0, 50.0),
                uniform(rng, -80.0, 80.0),
            ),
        ),
        FlightPhase::Descent => (
            Vector3::new(
                uniform(rng, -0.3, 0.3),
                uniform(rng, -0.3, 0.3),
                uniform(rng, 0.95 * g, 1.05 * g),
            ),
            Vector3::new(
                uniform(rng, -10.0, 10.0),
                uniform(rng, -10.0, 10.0),
                uniform(rng, -15.0, 15.0),
            ),
        ),
        FlightPhase::Ground => (
            Vector3::new(
                uniform(rng, -0.1, 0.1),
                uniform(rng, -0.1, 0.1),
                uniform(rng, 0.98 * g, 1.02 * g),
            ),
            Vector3::new(
                uniform(rng, -2.0, 2.0),
                uniform(rng, -2.0, 2.0),
                uniform(rng, -2.0, 2.0),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_temperature_continuous_at_inversion_boundaries() {
        let profile = AtmosphereProfile::inversion_scenario();
        let inv = profile.inversion.unwrap();

        for boundary in [inv.base, inv.top] {
            let below = true_temperature_c(&profile, boundary - 1e-6);
            let above = true_temperature_c(&profile, boundary + 1e-6);
            assert_relative_eq!(below, above, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_temperature_rises_inside_inversion() {
        let profile = AtmosphereProfile::inversion_scenario();
        // Inside the band: warmer higher up
        assert!(true_temperature_c(&profile, 300.0) > true_temperature_c(&profile, 250.0));
        // Outside: normal cooling with height
        assert!(true_temperature_c(&profile, 100.0) > true_temperature_c(&profile, 150.0));
        assert!(true_temperature_c(&profile, 500.0) > true_temperature_c(&profile, 600.0));
    }

    #[test]
    fn test_temperature_without_inversion_is_linear() {
        let profile = AtmosphereProfile::well_mixed();
        let t0 = true_temperature_c(&profile, 0.0);
        let t1000 = true_temperature_c(&profile, 1000.0);
        assert_relative_eq!(t0 - t1000, profile.lapse_rate_c_per_km, epsilon = 1e-9);
    }

    #[test]
    fn test_pressure_decays_and_inverts() {
        let profile = AtmosphereProfile::inversion_scenario();
        let p0 = pressure_hpa(&profile, 0.0);
        let p1650 = pressure_hpa(&profile, 1650.0);
        assert_relative_eq!(p0, profile.sea_level_pressure_hpa, epsilon = 1e-9);
        assert!(p1650 < p0);

        // Barometric inverse recovers altitude within the model mismatch
        // between the exponential and the ISA power-law formulas (~1.5%)
        let recovered = barometric_altitude_m(profile.sea_level_pressure_hpa, p1650);
        assert!(
            (recovered - 1650.0).abs() < 50.0,
            "recovered {recovered} m from 1650 m"
        );
    }

    #[test]
    fn test_environment_sample_clamped_and_finite() {
        let profile = AtmosphereProfile::inversion_scenario();
        let noise = NoiseConfig::default();
        let mut rng = StdRng::seed_from_u64(7);

        for step in 0..500 {
            let agl = f64::from(step) * 2.0;
            let sample =
                sample_environment(&profile, &noise, agl, agl + profile.terrain_elevation_m, &mut rng);
            assert!(sample.hum_primary_pct >= HUMIDITY_RANGE_PCT.0);
            assert!(sample.hum_primary_pct <= HUMIDITY_RANGE_PCT.1);
            assert!(sample.co2_ppm >= 0.0);
            assert!(sample.pm1_0 >= 0.0 && sample.pm2_5 >= 0.0 && sample.pm10 >= 0.0);
            assert!(sample.pressure_hpa.is_finite() && sample.temp_primary_c.is_finite());
            // Derived particulate channels respect the configured ratios
            if sample.pm2_5 > 0.0 {
                let r1 = sample.pm1_0 / sample.pm2_5;
                let r10 = sample.pm10 / sample.pm2_5;
                assert!(r1 >= noise.pm1_ratio_min && r1 <= noise.pm1_ratio_max);
                assert!(r10 >= noise.pm10_ratio_min && r10 <= noise.pm10_ratio_max);
            }
        }
    }

    #[test]
    fn test_sensor_bias_shows_in_expectation() {
        let profile = AtmosphereProfile::well_mixed();
        let noise = NoiseConfig::default();
        let mut rng = StdRng::seed_from_u64(11);

        let n = 2000;
        let mut sum_primary = 0.0;
        let mut sum_baro = 0.0;
        for _ in 0..n {
            let s = sample_environment(&profile, &noise, 100.0, 750.0, &mut rng);
            sum_primary += s.temp_primary_c;
            sum_baro += s.temp_baro_sensor_c;
        }
        let mean_delta = (sum_baro - sum_primary) / f64::from(n);
        // The barometer thermometer carries a +0.4 °C systematic bias
        assert!(
            (mean_delta - noise.temp_baro_sensor.bias).abs() < 0.05,
            "mean bias {mean_delta} vs configured {}",
            noise.temp_baro_sensor.bias
        );
    }

    #[test]
    fn test_zero_jitter_is_exactly_deterministic() {
        let mut rng = StdRng::seed_from_u64(0);
        let sensor = SensorNoise::biased(0.0, 0.25);
        assert_eq!(read_sensor(&mut rng, 10.0, sensor), 10.25);
    }

    #[test]
    fn test_free_fall_imu_reads_near_zero_g() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let (accel, _gyro) = sample_imu(FlightPhase::FreeFall, &mut rng);
            assert!(accel.z.abs() < 1.0, "free fall should read near 0 g");
            let (accel, _gyro) = sample_imu(FlightPhase::Descent, &mut rng);
            assert!((accel.z - GRAVITY_MS2).abs() < 1.0, "descent should read ~1 g");
        }
    }
}
