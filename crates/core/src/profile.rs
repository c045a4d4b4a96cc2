//! Vertical profile construction.
//!
//! Collapses a telemetry sequence into fixed-width altitude bins so the
//! detector can reason about the atmosphere as a stack of layers instead of
//! a noisy time series. Binning is keyed on altitude above ground, so
//! ascent and descent samples through the same layer land in the same bin.

use crate::core_types::config::AnalysisConfig;
use crate::core_types::record::TelemetryRecord;
use crate::error::{CoreError, Result};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Per-bin aggregate of every averaged channel.
///
/// `bin_floor` is the inclusive lower edge of the bin in meters above
/// ground; the bin spans `[bin_floor, bin_floor + bin_width)`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AltitudeBin {
    pub bin_floor: f64,
    pub mean_temp_c: f64,
    pub mean_humidity_pct: f64,
    pub mean_pressure_hpa: f64,
    pub mean_co2_ppm: f64,
    pub mean_pm1_0: f64,
    pub mean_pm2_5: f64,
    pub mean_pm10: f64,
    pub max_co2_ppm: f64,
    pub max_pm2_5: f64,
    pub max_pm10: f64,
    pub sample_count: usize,
}

/// Running sums for one bin before the mean pass.
#[derive(Debug, Clone, Default)]
struct BinAccumulator {
    temp_c: f64,
    humidity_pct: f64,
    pressure_hpa: f64,
    co2_ppm: f64,
    pm1_0: f64,
    pm2_5: f64,
    pm10: f64,
    max_co2_ppm: f64,
    max_pm2_5: f64,
    max_pm10: f64,
    count: usize,
}

impl BinAccumulator {
    fn push(&mut self, record: &TelemetryRecord) {
        self.temp_c += record.temp_primary_c;
        self.humidity_pct += record.hum_primary_pct;
        self.pressure_hpa += record.pressure_hpa;
        self.co2_ppm += record.co2_ppm;
        self.pm1_0 += record.pm1_0;
        self.pm2_5 += record.pm2_5;
        self.pm10 += record.pm10;
        self.max_co2_ppm = self.max_co2_ppm.max(record.co2_ppm);
        self.max_pm2_5 = self.max_pm2_5.max(record.pm2_5);
        self.max_pm10 = self.max_pm10.max(record.pm10);
        self.count += 1;
    }

    fn finish(&self, bin_floor: f64) -> AltitudeBin {
        let n = self.count as f64;
        AltitudeBin {
            bin_floor,
            mean_temp_c: self.temp_c / n,
            mean_humidity_pct: self.humidity_pct / n,
            mean_pressure_hpa: self.pressure_hpa / n,
            mean_co2_ppm: self.co2_ppm / n,
            mean_pm1_0: self.pm1_0 / n,
            mean_pm2_5: self.pm2_5 / n,
            mean_pm10: self.pm10 / n,
            max_co2_ppm: self.max_co2_ppm,
            max_pm2_5: self.max_pm2_5,
            max_pm10: self.max_pm10,
            sample_count: self.count,
        }
    }
}

/// Bin a telemetry sequence into a vertical profile sorted by altitude.
///
/// Bins with fewer than `min_samples_per_bin` records are dropped rather
/// than reported with an unreliable mean. Records at exactly a bin edge
/// belong to the upper bin.
///
/// # Errors
///
/// Returns [`CoreError::InsufficientData`] when `records` is empty. A
/// non-empty input that yields zero surviving bins is not an error; the
/// caller sees an empty profile.
pub fn build_profile(
    records: &[TelemetryRecord],
    config: &AnalysisConfig,
) -> Result<Vec<AltitudeBin>> {
    config.validate()?;
    if records.is_empty() {
        return Err(CoreError::InsufficientData { needed: 1, got: 0 });
    }

    let width = config.bin_width_m;
    let mut accumulators: FxHashMap<i64, BinAccumulator> = FxHashMap::default();
    for record in records {
        let key = (record.altitude_agl / width).floor() as i64;
        accumulators.entry(key).or_default().push(record);
    }

    let mut bins: Vec<AltitudeBin> = accumulators
        .into_par_iter()
        .filter(|(_, acc)| acc.count >= config.min_samples_per_bin)
        .map(|(key, acc)| acc.finish(key as f64 * width))
        .collect();
    bins.sort_by(|a, b| a.bin_floor.total_cmp(&b.bin_floor));
    debug!(
        records = records.len(),
        bins = bins.len(),
        bin_width_m = width,
        "vertical profile built"
    );
    Ok(bins)
}
