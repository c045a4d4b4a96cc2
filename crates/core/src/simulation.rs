//! Flight-phase state machine and telemetry simulator.
//!
//! [`FlightSimulator`] drives the physical altitude forward in time through
//! the phase sequence `ascent → free_fall → parachute_deploying → descent →
//! ground`, querying the sensor physics model at each step to emit one
//! [`TelemetryRecord`]. Phase transitions are decided by
//! [`next_phase`], a pure function of the *noise-free* altitude crossing
//! configured thresholds — never of elapsed time and never of a noisy
//! readout — so the phase order holds under any sensor noise.
//!
//! All randomness flows through one seedable source: for a fixed seed and
//! configuration two runs produce identical record sequences.

use crate::core_types::atmosphere::AtmosphereProfile;
use crate::core_types::config::{FlightConfig, NoiseConfig};
use crate::core_types::record::{FlightPhase, TelemetryRecord};
use crate::error::Result;
use crate::physics;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Meters of ground distance per degree of latitude.
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// GPS position jitter per sample (degrees).
const GPS_JITTER_DEG: f64 = 1e-5;

/// Phase transition function.
///
/// Purely threshold-driven: compares the physical altitude against the
/// configured separation, deploy, deploy-band, and ground thresholds. The
/// result is always the current phase or its immediate successor, so the
/// emitted phase sequence is monotone in the mission order and
/// [`FlightPhase::Ground`] is terminal.
#[must_use]
pub fn next_phase(current: FlightPhase, altitude_agl: f64, config: &FlightConfig) -> FlightPhase {
    match current {
        FlightPhase::Ascent if altitude_agl >= config.separation_altitude_m => {
            FlightPhase::FreeFall
        }
        FlightPhase::FreeFall if altitude_agl <= config.deploy_altitude_m => {
            FlightPhase::ParachuteDeploying
        }
        FlightPhase::ParachuteDeploying
            if altitude_agl <= config.deploy_altitude_m - config.deploy_band_m =>
        {
            FlightPhase::Descent
        }
        FlightPhase::Descent if altitude_agl <= 0.0 => FlightPhase::Ground,
        other => other,
    }
}

/// Telemetry simulator for one flight.
///
/// Owns its running state (altitude, position, phase, elapsed time)
/// exclusively; the atmosphere profile and configurations are immutable
/// inputs. Call [`FlightSimulator::step`] for one record at a time or
/// [`FlightSimulator::run`] for the whole flight.
#[derive(Debug)]
pub struct FlightSimulator {
    config: FlightConfig,
    profile: AtmosphereProfile,
    noise: NoiseConfig,
    rng: StdRng,
    /// Physical (noise-free) altitude driving phase transitions (m AGL).
    altitude_agl: f64,
    latitude: f64,
    longitude: f64,
    elapsed_s: f64,
    phase: FlightPhase,
    dwell_remaining: u32,
    finished: bool,
}

impl FlightSimulator {
    /// Create a simulator after validating every configuration input.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidConfiguration`] when the flight
    /// config, atmosphere profile, or noise config is rejected; nothing is
    /// simulated in that case.
    pub fn new(config: FlightConfig, profile: AtmosphereProfile, noise: NoiseConfig) -> Result<Self> {
        config.validate()?;
        profile.validate()?;
        noise.validate()?;

        let rng = StdRng::seed_from_u64(config.seed);
        Ok(FlightSimulator {
            altitude_agl: config.start_altitude_agl,
            latitude: config.launch_latitude,
            longitude: config.launch_longitude,
            elapsed_s: 0.0,
            phase: config.start_phase,
            dwell_remaining: config.ground_dwell_steps,
            finished: false,
            rng,
            config,
            profile,
            noise,
        })
    }

    /// Current flight phase.
    #[must_use]
    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    /// Current physical altitude (m AGL).
    #[must_use]
    pub fn altitude_agl(&self) -> f64 {
        self.altitude_agl
    }

    /// Advance one time step and emit the resulting record.
    ///
    /// Returns `None` once the flight is over: after touching the ground
    /// the simulator emits the configured number of ground-dwell records
    /// with near-zero motion, then ends.
    pub fn step(&mut self) -> Option<TelemetryRecord> {
        if self.finished {
            return None;
        }
        if self.phase == FlightPhase::Ground {
            if self.dwell_remaining == 0 {
                self.finished = true;
                return None;
            }
            self.dwell_remaining -= 1;
            self.elapsed_s += self.config.sample_interval_s;
            return Some(self.emit_ground_record());
        }

        let dt = self.config.sample_interval_s;
        self.elapsed_s += dt;

        // Advance the physical altitude with phase velocity plus turbulence
        let turb = self.config.turbulence_m;
        self.altitude_agl += self.config.vertical_velocity_ms(self.phase) * dt
            + physics::uniform(&mut self.rng, -turb, turb);
        self.altitude_agl = self.altitude_agl.max(0.0);

        // Horizontal wind drift, scaled from meters to degrees
        let lat_rad = self.latitude.to_radians();
        self.latitude += self.config.wind_ms.y * dt / METERS_PER_DEG_LAT
            + physics::uniform(&mut self.rng, -GPS_JITTER_DEG, GPS_JITTER_DEG);
        self.longitude += self.config.wind_ms.x * dt / (METERS_PER_DEG_LAT * lat_rad.cos())
            + physics::uniform(&mut self.rng, -GPS_JITTER_DEG, GPS_JITTER_DEG);

        let next = next_phase(self.phase, self.altitude_agl, &self.config);
        if next != self.phase {
            info!(
                from = %self.phase,
                to = %next,
                altitude_agl = self.altitude_agl,
                elapsed_s = self.elapsed_s,
                "flight phase transition"
            );
            self.phase = next;
        }
        debug!(
            phase = %self.phase,
            altitude_agl = self.altitude_agl,
            elapsed_s = self.elapsed_s,
            "simulation step"
        );

        Some(self.sample_record())
    }

    /// Run the remaining flight to completion.
    pub fn run(&mut self) -> Vec<TelemetryRecord> {
        let mut records = Vec::new();
        while let Some(record) = self.step() {
            records.push(record);
        }
        records
    }

    /// Sample every sensor at the current state and build one record.
    fn sample_record(&mut self) -> TelemetryRecord {
        let altitude_msl = self.profile.terrain_elevation_m + self.altitude_agl;
        let env = physics::sample_environment(
            &self.profile,
            &self.noise,
            self.altitude_agl,
            altitude_msl,
            &mut self.rng,
        );
        let (accel, gyro) = physics::sample_imu(self.phase, &mut self.rng);

        TelemetryRecord {
            time_s: self.elapsed_s,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude_agl: self.altitude_agl,
            altitude_msl,
            satellites: self.rng.random_range(8..=12),
            temp_primary_c: env.temp_primary_c,
            temp_co2_sensor_c: env.temp_co2_sensor_c,
            temp_baro_sensor_c: env.temp_baro_sensor_c,
            hum_primary_pct: env.hum_primary_pct,
            hum_co2_sensor_pct: env.hum_co2_sensor_pct,
            pressure_hpa: env.pressure_hpa,
            co2_ppm: env.co2_ppm,
            pm1_0: env.pm1_0,
            pm2_5: env.pm2_5,
            pm10: env.pm10,
            accel,
            gyro,
            phase: self.phase,
        }
    }

    /// One post-landing dwell record: altitude pinned to the ground, GPS
    /// jitter only.
    fn emit_ground_record(&mut self) -> TelemetryRecord {
        self.altitude_agl = 0.0;
        let mut record = self.sample_record();
        record.latitude += physics::uniform(&mut self.rng, -GPS_JITTER_DEG, GPS_JITTER_DEG);
        record.longitude += physics::uniform(&mut self.rng, -GPS_JITTER_DEG, GPS_JITTER_DEG);
        record
    }
}
