//! Thermal inversion and pollutant accumulation detection.
//!
//! Works on the binned vertical profile from [`crate::profile`]. A thermal
//! inversion shows up as temperature *rising* with altitude between two
//! adjacent bins; a pollutant accumulation layer is a bin whose mean PM2.5
//! sits above the configured threshold. Contiguous flagged bins merge into
//! altitude ranges so a three-bin inversion reads as one layer, not three.

use crate::core_types::config::AnalysisConfig;
use crate::profile::AltitudeBin;
use tracing::info;

/// Flags attached to one altitude bin.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BinAssessment {
    pub bin_floor: f64,
    /// Temperature change from the bin below divided by the configured bin
    /// width (°C per meter); `None` for the lowest bin, which has no bin to
    /// compare against. Gaps left by dropped sparse bins do not enter the
    /// divisor.
    pub gradient_c_per_m: Option<f64>,
    pub inversion: bool,
    pub accumulation: bool,
}

/// Verdict on how well mixed the boundary layer is, from the spread of
/// per-bin mean CO₂.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MixingClass {
    /// CO₂ nearly uniform with altitude.
    WellMixed,
    /// CO₂ varies beyond the mixing threshold; layers are not exchanging.
    Stratified,
    /// Fewer than two usable bins.
    InsufficientData,
}

/// Full assessment of one vertical profile.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProfileSummary {
    pub bins: Vec<BinAssessment>,
    pub inversion_count: usize,
    /// Merged `[base, top)` altitude ranges of contiguous inversion bins.
    pub inversion_ranges: Vec<(f64, f64)>,
    pub accumulation_count: usize,
    pub accumulation_ranges: Vec<(f64, f64)>,
    /// Spread of per-bin mean CO₂ (max minus min), ppm.
    pub co2_range_ppm: f64,
    pub mixing: MixingClass,
}

/// Assess a binned profile for inversions, accumulation layers, and CO₂
/// stratification.
///
/// A profile with fewer than two bins yields an empty summary with
/// [`MixingClass::InsufficientData`]; too little data to say anything is
/// an answer here, not an error.
#[must_use]
pub fn detect_layers(bins: &[AltitudeBin], config: &AnalysisConfig) -> ProfileSummary {
    // A single bin supports neither a gradient nor a layer claim: the
    // summary carries no flags at all, only the insufficient-data verdict
    if bins.len() < 2 {
        return ProfileSummary {
            bins: bins
                .iter()
                .map(|bin| BinAssessment {
                    bin_floor: bin.bin_floor,
                    gradient_c_per_m: None,
                    inversion: false,
                    accumulation: false,
                })
                .collect(),
            inversion_count: 0,
            inversion_ranges: Vec::new(),
            accumulation_count: 0,
            accumulation_ranges: Vec::new(),
            co2_range_ppm: 0.0,
            mixing: MixingClass::InsufficientData,
        };
    }

    let mut assessments = Vec::with_capacity(bins.len());
    for (index, bin) in bins.iter().enumerate() {
        // The lowest bin has nothing below it to form a gradient with, so
        // it can never be flagged as an inversion. The divisor is the
        // configured bin width, not the floor spacing: a gap left by a
        // dropped sparse bin must not dilute the gradient of the bin above.
        let gradient = (index > 0).then(|| {
            let below = &bins[index - 1];
            (bin.mean_temp_c - below.mean_temp_c) / config.bin_width_m
        });
        let inversion = gradient.is_some_and(|g| g > config.inversion_gradient_c_per_m);
        let accumulation = bin.mean_pm2_5 > config.pm25_layer_threshold;
        assessments.push(BinAssessment {
            bin_floor: bin.bin_floor,
            gradient_c_per_m: gradient,
            inversion,
            accumulation,
        });
    }

    let inversion_ranges = merge_ranges(bins, &assessments, config.bin_width_m, |a| a.inversion);
    let accumulation_ranges =
        merge_ranges(bins, &assessments, config.bin_width_m, |a| a.accumulation);

    let co2_min = bins.iter().map(|b| b.mean_co2_ppm).fold(f64::MAX, f64::min);
    let co2_max = bins.iter().map(|b| b.mean_co2_ppm).fold(f64::MIN, f64::max);
    let co2_range_ppm = co2_max - co2_min;
    let mixing = if co2_range_ppm < config.co2_mixing_range_ppm {
        MixingClass::WellMixed
    } else {
        MixingClass::Stratified
    };

    let inversion_count = assessments.iter().filter(|a| a.inversion).count();
    let accumulation_count = assessments.iter().filter(|a| a.accumulation).count();
    if inversion_count > 0 {
        info!(
            inversion_count,
            ranges = ?inversion_ranges,
            "thermal inversion detected"
        );
    }

    ProfileSummary {
        bins: assessments,
        inversion_count,
        inversion_ranges,
        accumulation_count,
        accumulation_ranges,
        co2_range_ppm,
        mixing,
    }
}

/// Merge contiguous flagged bins into `[base, top)` altitude ranges.
///
/// Contiguity is by bin adjacency in altitude: flagged bins separated by a
/// gap (a dropped sparse bin, or an unflagged bin) start a new range.
fn merge_ranges(
    bins: &[AltitudeBin],
    assessments: &[BinAssessment],
    bin_width: f64,
    flagged: impl Fn(&BinAssessment) -> bool,
) -> Vec<(f64, f64)> {
    let mut ranges: Vec<(f64, f64)> = Vec::new();
    for (bin, assessment) in bins.iter().zip(assessments) {
        if !flagged(assessment) {
            continue;
        }
        let top = bin.bin_floor + bin_width;
        match ranges.last_mut() {
            Some(last) if (last.1 - bin.bin_floor).abs() < f64::EPSILON => last.1 = top,
            _ => ranges.push((bin.bin_floor, top)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bin(floor: f64, temp: f64, co2: f64, pm25: f64) -> AltitudeBin {
        AltitudeBin {
            bin_floor: floor,
            mean_temp_c: temp,
            mean_humidity_pct: 50.0,
            mean_pressure_hpa: 1000.0,
            mean_co2_ppm: co2,
            mean_pm1_0: pm25 * 0.6,
            mean_pm2_5: pm25,
            mean_pm10: pm25 * 1.4,
            max_co2_ppm: co2,
            max_pm2_5: pm25,
            max_pm10: pm25 * 1.4,
            sample_count: 5,
        }
    }

    #[test]
    fn test_monotone_cooling_profile_has_no_flags() {
        let bins: Vec<AltitudeBin> = (0..10)
            .map(|i| bin(f64::from(i) * 50.0, 15.0 - f64::from(i) * 0.3, 420.0, 5.0))
            .collect();
        let summary = detect_layers(&bins, &AnalysisConfig::default());
        assert_eq!(summary.inversion_count, 0);
        assert!(summary.inversion_ranges.is_empty());
        assert_eq!(summary.accumulation_count, 0);
        assert_eq!(summary.mixing, MixingClass::WellMixed);
    }

    #[test]
    fn test_warming_bins_flagged_and_merged() {
        // Warming at +1 °C per 50 m between 200 and 350 m
        let bins = vec![
            bin(0.0, 15.0, 420.0, 5.0),
            bin(50.0, 14.7, 420.0, 5.0),
            bin(100.0, 14.4, 420.0, 5.0),
            bin(150.0, 14.1, 420.0, 5.0),
            bin(200.0, 15.1, 420.0, 5.0),
            bin(250.0, 16.1, 420.0, 5.0),
            bin(300.0, 17.1, 420.0, 5.0),
            bin(350.0, 16.5, 420.0, 5.0),
        ];
        let summary = detect_layers(&bins, &AnalysisConfig::default());
        assert_eq!(summary.inversion_count, 3);
        assert_eq!(summary.inversion_ranges, vec![(200.0, 350.0)]);
    }

    #[test]
    fn test_first_bin_never_flagged_as_inversion() {
        let bins = vec![bin(0.0, 10.0, 420.0, 5.0), bin(50.0, 9.0, 420.0, 5.0)];
        let summary = detect_layers(&bins, &AnalysisConfig::default());
        assert!(summary.bins[0].gradient_c_per_m.is_none());
        assert!(!summary.bins[0].inversion);
    }

    #[test]
    fn test_gradient_value() {
        let bins = vec![bin(0.0, 10.0, 420.0, 5.0), bin(50.0, 11.0, 420.0, 5.0)];
        let summary = detect_layers(&bins, &AnalysisConfig::default());
        let gradient = summary.bins[1].gradient_c_per_m.unwrap();
        assert_relative_eq!(gradient, 0.02);
        assert!(summary.bins[1].inversion);
    }

    #[test]
    fn test_gap_from_dropped_bin_does_not_dilute_gradient() {
        // The 100 m bin was dropped by the min-sample filter; warming of
        // 0.75 °C across the gap is still 0.015 °C per 50 m bin, above
        // threshold
        let bins = vec![
            bin(0.0, 15.0, 420.0, 5.0),
            bin(50.0, 14.7, 420.0, 5.0),
            bin(150.0, 15.45, 420.0, 5.0),
        ];
        let summary = detect_layers(&bins, &AnalysisConfig::default());
        assert_relative_eq!(summary.bins[2].gradient_c_per_m.unwrap(), 0.015);
        assert!(summary.bins[2].inversion);
        assert_eq!(summary.inversion_count, 1);
        assert_eq!(summary.inversion_ranges, vec![(150.0, 200.0)]);
    }

    #[test]
    fn test_co2_spread_at_threshold_is_stratified() {
        // Spread exactly equal to the mixing threshold is not "below" it
        let bins = vec![bin(0.0, 15.0, 440.0, 5.0), bin(50.0, 14.7, 420.0, 5.0)];
        let summary = detect_layers(&bins, &AnalysisConfig::default());
        assert_relative_eq!(summary.co2_range_ppm, 20.0);
        assert_eq!(summary.mixing, MixingClass::Stratified);
    }

    #[test]
    fn test_accumulation_layer_separate_from_inversion() {
        let bins = vec![
            bin(0.0, 15.0, 430.0, 5.0),
            bin(50.0, 14.7, 440.0, 20.0),
            bin(100.0, 14.4, 450.0, 25.0),
            bin(150.0, 14.1, 430.0, 5.0),
        ];
        let summary = detect_layers(&bins, &AnalysisConfig::default());
        assert_eq!(summary.inversion_count, 0);
        assert_eq!(summary.accumulation_count, 2);
        assert_eq!(summary.accumulation_ranges, vec![(50.0, 150.0)]);
    }

    #[test]
    fn test_disjoint_flagged_bins_yield_two_ranges() {
        let bins = vec![
            bin(0.0, 15.0, 420.0, 20.0),
            bin(50.0, 14.7, 420.0, 5.0),
            bin(100.0, 14.4, 420.0, 20.0),
        ];
        let summary = detect_layers(&bins, &AnalysisConfig::default());
        assert_eq!(
            summary.accumulation_ranges,
            vec![(0.0, 50.0), (100.0, 150.0)]
        );
    }

    #[test]
    fn test_co2_stratification() {
        let bins = vec![bin(0.0, 15.0, 480.0, 5.0), bin(50.0, 14.7, 420.0, 5.0)];
        let summary = detect_layers(&bins, &AnalysisConfig::default());
        assert_relative_eq!(summary.co2_range_ppm, 60.0);
        assert_eq!(summary.mixing, MixingClass::Stratified);
    }

    #[test]
    fn test_single_bin_is_insufficient_not_an_error() {
        let bins = vec![bin(0.0, 15.0, 420.0, 30.0)];
        let summary = detect_layers(&bins, &AnalysisConfig::default());
        assert_eq!(summary.mixing, MixingClass::InsufficientData);
        assert_eq!(summary.inversion_count, 0);
        // Even a high-PM lone bin yields no layer claim
        assert_eq!(summary.accumulation_count, 0);
    }
}
