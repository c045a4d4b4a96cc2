//! Core data model and configuration types

pub mod atmosphere;
pub mod config;
pub mod record;

pub use atmosphere::{AtmosphereProfile, InversionBand, PollutionBand};
pub use config::{AnalysisConfig, FlightConfig, NoiseConfig, SensorNoise};
pub use record::{FlightPhase, TelemetryRecord};
