//! Emission-source signature classification and air-quality ratings.
//!
//! Maps a (CO₂, PM2.5, PM10) measurement triple to the most likely emission
//! source via an ordered rule table. Rules are checked top-down and the
//! first match wins, so the table reads from most to least specific; the
//! final catch-all guarantees every triple classifies.

use std::fmt;
use std::ops::Range;

/// Most likely emission source for a measurement triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSignature {
    /// Open flame or smoldering: CO₂ and fine particulates both extreme.
    ActiveCombustion,
    /// Stationary diesel engine: high CO₂ with heavy fine particulates.
    DieselGenerator,
    /// Road traffic plume: elevated CO₂ and moderate particulates.
    VehicularTraffic,
    /// Resuspended mineral dust: coarse particulates without a CO₂ source.
    MineralDust,
    /// Background atmosphere.
    CleanAir,
    /// No single source dominates.
    MixedIndustrial,
}

impl SourceSignature {
    /// Human-readable label for reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SourceSignature::ActiveCombustion => "active combustion",
            SourceSignature::DieselGenerator => "diesel generator",
            SourceSignature::VehicularTraffic => "vehicular traffic",
            SourceSignature::MineralDust => "mineral dust",
            SourceSignature::CleanAir => "clean air",
            SourceSignature::MixedIndustrial => "mixed industrial",
        }
    }
}

impl fmt::Display for SourceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Health-risk tier attached to a classified signature. Ordered from least
/// to most severe so tiers compare with `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Minimal,
    Low,
    Moderate,
    High,
    Severe,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskTier::Minimal => "minimal",
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
            RiskTier::Severe => "severe",
        };
        f.write_str(name)
    }
}

/// One row of the classification table. `None` bounds are unconstrained.
#[derive(Debug, Clone, Copy)]
pub struct SignatureRule {
    pub co2_min: Option<f64>,
    pub co2_max: Option<f64>,
    pub pm25_min: Option<f64>,
    pub pm25_max: Option<f64>,
    pub pm10_min: Option<f64>,
    pub signature: SourceSignature,
    pub risk: RiskTier,
}

impl SignatureRule {
    fn matches(&self, co2_ppm: f64, pm2_5: f64, pm10: f64) -> bool {
        self.co2_min.is_none_or(|min| co2_ppm >= min)
            && self.co2_max.is_none_or(|max| co2_ppm < max)
            && self.pm25_min.is_none_or(|min| pm2_5 >= min)
            && self.pm25_max.is_none_or(|max| pm2_5 < max)
            && self.pm10_min.is_none_or(|min| pm10 >= min)
    }
}

/// Default rule table, most specific first. The trailing catch-all has no
/// bounds, so classification is total.
pub const DEFAULT_RULES: [SignatureRule; 6] = [
    SignatureRule {
        co2_min: Some(700.0),
        co2_max: None,
        pm25_min: Some(100.0),
        pm25_max: None,
        pm10_min: None,
        signature: SourceSignature::ActiveCombustion,
        risk: RiskTier::Severe,
    },
    SignatureRule {
        co2_min: Some(600.0),
        co2_max: None,
        pm25_min: Some(80.0),
        pm25_max: None,
        pm10_min: None,
        signature: SourceSignature::DieselGenerator,
        risk: RiskTier::High,
    },
    SignatureRule {
        co2_min: Some(500.0),
        co2_max: None,
        pm25_min: Some(40.0),
        pm25_max: None,
        pm10_min: None,
        signature: SourceSignature::VehicularTraffic,
        risk: RiskTier::Moderate,
    },
    SignatureRule {
        co2_min: None,
        co2_max: Some(480.0),
        pm25_min: None,
        pm25_max: None,
        pm10_min: Some(60.0),
        signature: SourceSignature::MineralDust,
        risk: RiskTier::Moderate,
    },
    SignatureRule {
        co2_min: None,
        co2_max: Some(450.0),
        pm25_min: None,
        pm25_max: Some(12.0),
        pm10_min: None,
        signature: SourceSignature::CleanAir,
        risk: RiskTier::Minimal,
    },
    SignatureRule {
        co2_min: None,
        co2_max: None,
        pm25_min: None,
        pm25_max: None,
        pm10_min: None,
        signature: SourceSignature::MixedIndustrial,
        risk: RiskTier::Low,
    },
];

/// Classify a measurement triple against the default rule table.
#[must_use]
pub fn classify(co2_ppm: f64, pm2_5: f64, pm10: f64) -> (SourceSignature, RiskTier) {
    classify_with(&DEFAULT_RULES, co2_ppm, pm2_5, pm10)
}

/// Classify against a caller-supplied rule table, first match wins.
///
/// Falls back to [`SourceSignature::MixedIndustrial`] at [`RiskTier::Low`]
/// when no rule matches, so a table without a catch-all still classifies
/// every input.
#[must_use]
pub fn classify_with(
    rules: &[SignatureRule],
    co2_ppm: f64,
    pm2_5: f64,
    pm10: f64,
) -> (SourceSignature, RiskTier) {
    rules
        .iter()
        .find(|rule| rule.matches(co2_ppm, pm2_5, pm10))
        .map_or(
            (SourceSignature::MixedIndustrial, RiskTier::Low),
            |rule| (rule.signature, rule.risk),
        )
}

/// CO₂ concentration bands (ppm) used for the air-quality rating.
pub mod co2_ranges {
    use std::ops::Range;

    pub const EXCELLENT: Range<f64> = 0.0..450.0;
    pub const GOOD: Range<f64> = 450.0..600.0;
    pub const MODERATE: Range<f64> = 600.0..1000.0;
    pub const POOR: Range<f64> = 1000.0..1500.0;
    // >= 1500 ppm rates Dangerous
}

/// PM2.5 concentration bands (µg/m³) used for the air-quality rating.
pub mod pm25_ranges {
    use std::ops::Range;

    pub const EXCELLENT: Range<f64> = 0.0..12.0;
    pub const GOOD: Range<f64> = 12.0..35.0;
    pub const MODERATE: Range<f64> = 35.0..55.0;
    pub const POOR: Range<f64> = 55.0..150.0;
    // >= 150 µg/m³ rates Dangerous
}

/// Coarse air-quality rating of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQuality {
    Excellent,
    Good,
    Moderate,
    Poor,
    Dangerous,
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AirQuality::Excellent => "excellent",
            AirQuality::Good => "good",
            AirQuality::Moderate => "moderate",
            AirQuality::Poor => "poor",
            AirQuality::Dangerous => "dangerous",
        };
        f.write_str(name)
    }
}

fn rate(bands: &[(Range<f64>, AirQuality)], value: f64) -> AirQuality {
    bands
        .iter()
        .find(|(range, _)| range.contains(&value))
        .map_or(AirQuality::Dangerous, |(_, quality)| *quality)
}

/// Rate a CO₂ concentration (ppm).
#[must_use]
pub fn co2_air_quality(co2_ppm: f64) -> AirQuality {
    rate(
        &[
            (co2_ranges::EXCELLENT, AirQuality::Excellent),
            (co2_ranges::GOOD, AirQuality::Good),
            (co2_ranges::MODERATE, AirQuality::Moderate),
            (co2_ranges::POOR, AirQuality::Poor),
        ],
        co2_ppm,
    )
}

/// Rate a PM2.5 concentration (µg/m³).
#[must_use]
pub fn pm25_air_quality(pm2_5: f64) -> AirQuality {
    rate(
        &[
            (pm25_ranges::EXCELLENT, AirQuality::Excellent),
            (pm25_ranges::GOOD, AirQuality::Good),
            (pm25_ranges::MODERATE, AirQuality::Moderate),
            (pm25_ranges::POOR, AirQuality::Poor),
        ],
        pm2_5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_extreme_plume_classifies_most_severe() {
        let (signature, risk) = classify(900.0, 120.0, 150.0);
        assert_eq!(signature, SourceSignature::ActiveCombustion);
        assert_eq!(risk, RiskTier::Severe);
    }

    #[test]
    fn test_background_air_classifies_clean() {
        let (signature, risk) = classify(410.0, 5.0, 8.0);
        assert_eq!(signature, SourceSignature::CleanAir);
        assert_eq!(risk, RiskTier::Minimal);
    }

    #[test]
    fn test_rule_order_prefers_most_specific() {
        // Satisfies the diesel and traffic rules too; combustion wins
        assert_eq!(classify(750.0, 110.0, 120.0).0, SourceSignature::ActiveCombustion);
        // Diesel-level CO₂ short of combustion particulates
        assert_eq!(classify(650.0, 90.0, 100.0).0, SourceSignature::DieselGenerator);
        assert_eq!(classify(520.0, 45.0, 60.0).0, SourceSignature::VehicularTraffic);
    }

    #[test]
    fn test_dust_needs_coarse_particles_without_co2() {
        assert_eq!(classify(440.0, 20.0, 80.0).0, SourceSignature::MineralDust);
        // Same particulates with a CO₂ source present: not dust
        assert_eq!(classify(550.0, 20.0, 80.0).0, SourceSignature::MixedIndustrial);
    }

    #[test]
    fn test_fallthrough_is_mixed() {
        let (signature, risk) = classify(480.0, 25.0, 30.0);
        assert_eq!(signature, SourceSignature::MixedIndustrial);
        assert_eq!(risk, RiskTier::Low);
    }

    #[test]
    fn test_classification_is_total() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let co2 = rng.random_range(0.0..2500.0);
            let pm25 = rng.random_range(0.0..300.0);
            let pm10 = rng.random_range(0.0..400.0);
            // Every triple gets an answer; no rule gap panics or misses
            let _ = classify(co2, pm25, pm10);
        }
    }

    #[test]
    fn test_empty_rule_table_still_classifies() {
        let (signature, risk) = classify_with(&[], 500.0, 20.0, 30.0);
        assert_eq!(signature, SourceSignature::MixedIndustrial);
        assert_eq!(risk, RiskTier::Low);
    }

    #[test]
    fn test_air_quality_band_edges() {
        assert_eq!(co2_air_quality(449.9), AirQuality::Excellent);
        assert_eq!(co2_air_quality(450.0), AirQuality::Good);
        assert_eq!(co2_air_quality(1500.0), AirQuality::Dangerous);
        assert_eq!(pm25_air_quality(11.9), AirQuality::Excellent);
        assert_eq!(pm25_air_quality(35.0), AirQuality::Moderate);
        assert_eq!(pm25_air_quality(200.0), AirQuality::Dangerous);
    }

    #[test]
    fn test_risk_tiers_ordered() {
        assert!(RiskTier::Minimal < RiskTier::Low);
        assert!(RiskTier::High < RiskTier::Severe);
    }
}
