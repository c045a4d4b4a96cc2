//! Atmospheric-sounding core for the Caelum CanSat mission.
//!
//! Two halves share one telemetry model:
//!
//! - **Simulation** ([`simulation`], [`physics`]): a deterministic flight
//!   simulator that drives a payload through the drop profile
//!   (`ascent → free_fall → parachute_deploying → descent → ground`) over a
//!   configurable atmosphere, synthesizing every on-board sensor with
//!   realistic per-sensor noise and bias. Used to rehearse the mission and
//!   to generate ground-truth datasets for the analysis side.
//! - **Analysis** ([`profile`], [`detector`], [`classify`], [`validation`],
//!   [`summary`]): post-flight processing of a telemetry sequence into a
//!   binned vertical profile, thermal-inversion and pollutant-accumulation
//!   layers, an emission-source classification, cross-sensor consistency
//!   checks, and one mission report.
//!
//! [`schema`] carries the ground-station wire format so recorded missions
//! load into the same [`TelemetryRecord`] the simulator emits.
//!
//! # Example
//!
//! ```
//! use caelum_core::{
//!     AnalysisConfig, AtmosphereProfile, FlightConfig, FlightSimulator, NoiseConfig,
//! };
//!
//! # fn main() -> caelum_core::Result<()> {
//! let mut sim = FlightSimulator::new(
//!     FlightConfig::default(),
//!     AtmosphereProfile::inversion_scenario(),
//!     NoiseConfig::default(),
//! )?;
//! let records = sim.run();
//! let report = caelum_core::flight_report(&records, &AnalysisConfig::default())?;
//! assert!(report.layers.accumulation_count > 0);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod core_types;
pub mod detector;
pub mod error;
pub mod physics;
pub mod profile;
pub mod schema;
pub mod simulation;
pub mod summary;
pub mod validation;

pub use classify::{classify, AirQuality, RiskTier, SignatureRule, SourceSignature};
pub use core_types::{
    AnalysisConfig, AtmosphereProfile, FlightConfig, FlightPhase, InversionBand, NoiseConfig,
    PollutionBand, SensorNoise, TelemetryRecord,
};
pub use detector::{detect_layers, BinAssessment, MixingClass, ProfileSummary};
pub use error::{CoreError, Result};
pub use profile::{build_profile, AltitudeBin};
pub use schema::TelemetryRow;
pub use simulation::{next_phase, FlightSimulator};
pub use summary::{flight_report, ChannelStats, FlightReport, PhaseDwell};
pub use validation::{cross_validate, CrossValidation, SensorAgreement};
