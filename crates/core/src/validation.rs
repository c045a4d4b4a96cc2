//! Cross-sensor consistency checks.
//!
//! The payload carries redundant thermometers and hygrometers; systematic
//! disagreement between them is the first sign of a failing or drifting
//! sensor. Each pair is scored by the mean and worst absolute difference
//! over the whole flight, with an alarm when the mean crosses the
//! configured tolerance.

use crate::core_types::config::AnalysisConfig;
use crate::core_types::record::TelemetryRecord;
use crate::error::{CoreError, Result};
use tracing::warn;

/// Agreement score for one redundant sensor pair.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SensorAgreement {
    pub mean_abs_delta: f64,
    pub max_abs_delta: f64,
    /// Set when `mean_abs_delta` exceeds the configured tolerance.
    pub alarm: bool,
}

impl SensorAgreement {
    fn from_deltas(deltas: impl Iterator<Item = f64>, tolerance: f64) -> SensorAgreement {
        let mut sum = 0.0;
        let mut max = 0.0_f64;
        let mut count = 0_usize;
        for delta in deltas {
            let abs = delta.abs();
            sum += abs;
            max = max.max(abs);
            count += 1;
        }
        let mean = sum / count as f64;
        SensorAgreement {
            mean_abs_delta: mean,
            max_abs_delta: max,
            alarm: mean > tolerance,
        }
    }
}

/// Agreement scores for every redundant pair on the payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CrossValidation {
    /// Primary thermometer against the CO₂ sensor's internal one.
    pub temp_primary_vs_co2: SensorAgreement,
    /// Primary thermometer against the barometer's internal one.
    pub temp_primary_vs_baro: SensorAgreement,
    /// The two hygrometers.
    pub humidity: SensorAgreement,
}

impl CrossValidation {
    /// True when any pair raised its alarm.
    #[must_use]
    pub fn any_alarm(&self) -> bool {
        self.temp_primary_vs_co2.alarm
            || self.temp_primary_vs_baro.alarm
            || self.humidity.alarm
    }
}

/// Score every redundant sensor pair over a flight.
///
/// # Errors
///
/// Returns [`CoreError::InsufficientData`] when `records` is empty, and
/// [`CoreError::InvalidConfiguration`] when the analysis config is
/// rejected.
pub fn cross_validate(
    records: &[TelemetryRecord],
    config: &AnalysisConfig,
) -> Result<CrossValidation> {
    config.validate()?;
    if records.is_empty() {
        return Err(CoreError::InsufficientData { needed: 1, got: 0 });
    }

    let validation = CrossValidation {
        temp_primary_vs_co2: SensorAgreement::from_deltas(
            records.iter().map(|r| r.temp_primary_c - r.temp_co2_sensor_c),
            config.temp_delta_alarm_c,
        ),
        temp_primary_vs_baro: SensorAgreement::from_deltas(
            records.iter().map(|r| r.temp_primary_c - r.temp_baro_sensor_c),
            config.temp_delta_alarm_c,
        ),
        humidity: SensorAgreement::from_deltas(
            records.iter().map(|r| r.hum_primary_pct - r.hum_co2_sensor_pct),
            config.hum_delta_alarm_pct,
        ),
    };

    if validation.any_alarm() {
        warn!(
            temp_co2_mean = validation.temp_primary_vs_co2.mean_abs_delta,
            temp_baro_mean = validation.temp_primary_vs_baro.mean_abs_delta,
            humidity_mean = validation.humidity.mean_abs_delta,
            "cross-sensor disagreement above tolerance"
        );
    }
    Ok(validation)
}
