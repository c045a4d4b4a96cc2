//! Atmospheric profile configuration.
//!
//! An [`AtmosphereProfile`] bundles the ground meteorology, the lapse-rate
//! structure (including an optional thermal-inversion band), and the
//! background pollutant levels by altitude band. It is supplied as
//! configuration and never mutated at runtime; the sensor physics model in
//! [`crate::physics`] reads it to produce noiseless "true" values.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Background pollutant levels for one altitude band.
///
/// Bands are half-open `[alt_min, alt_max)` in meters above ground level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutionBand {
    /// Lower bound of the band (m AGL, inclusive).
    pub alt_min: f64,
    /// Upper bound of the band (m AGL, exclusive).
    pub alt_max: f64,
    /// Baseline CO₂ concentration in the band (ppm).
    pub baseline_co2: f64,
    /// Baseline PM2.5 concentration in the band (µg/m³).
    pub baseline_pm25: f64,
    /// Human-readable description of the band.
    pub label: String,
}

impl PollutionBand {
    /// Convenience constructor.
    #[must_use]
    pub fn new(
        alt_min: f64,
        alt_max: f64,
        baseline_co2: f64,
        baseline_pm25: f64,
        label: &str,
    ) -> Self {
        PollutionBand {
            alt_min,
            alt_max,
            baseline_co2,
            baseline_pm25,
            label: label.to_string(),
        }
    }
}

/// A thermal-inversion band where the lapse rate reverses.
///
/// Inside `[base, top]` the temperature *rises* with altitude instead of
/// falling, trapping particulates below the top of the band. The segment is
/// continuous in value at both boundaries: the temperature at `base` equals
/// the normal-lapse temperature at `base`, and the segment above `top`
/// resumes the normal lapse from the band-top temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InversionBand {
    /// Bottom of the inversion layer (m AGL).
    pub base: f64,
    /// Top of the inversion layer (m AGL).
    pub top: f64,
    /// Lapse rate inside the band (°C per km). Negative values make the
    /// temperature rise with altitude, which is what defines an inversion.
    pub lapse_rate_c_per_km: f64,
}

/// Immutable atmospheric configuration for a flight.
///
/// Combines ground meteorology, lapse-rate structure, and the pollution
/// profile. Presets follow the calibration of the mission flight scenarios;
/// any field can be overridden before the profile is handed to a simulator
/// or analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereProfile {
    /// Air temperature at ground level (°C).
    pub ground_temp_c: f64,
    /// Normal lapse rate (°C per km); ~6.5 for the dry-adiabatic standard.
    pub lapse_rate_c_per_km: f64,
    /// Relative humidity at ground level (%).
    pub ground_humidity_pct: f64,
    /// Humidity increase with altitude (% per km).
    pub humidity_rise_pct_per_km: f64,
    /// Sea-level pressure (hPa).
    pub sea_level_pressure_hpa: f64,
    /// Terrain elevation above mean sea level (m); AGL + this = MSL.
    pub terrain_elevation_m: f64,
    /// Optional thermal-inversion band.
    pub inversion: Option<InversionBand>,
    /// Background pollutant levels by altitude band (m AGL).
    pub bands: Vec<PollutionBand>,
}

impl AtmosphereProfile {
    /// Thermal-inversion scenario: early-spring launch from a 650 m plateau
    /// with an inversion between 200 and 350 m AGL trapping particulates.
    ///
    /// CO₂ is held at the ~420 ppm global background across the whole
    /// profile — at sounding altitudes ground sources are not detectable, so
    /// any CO₂ structure in the data comes from sensor noise alone.
    #[must_use]
    pub fn inversion_scenario() -> Self {
        AtmosphereProfile {
            ground_temp_c: 12.0,
            lapse_rate_c_per_km: 6.5,
            ground_humidity_pct: 55.0,
            humidity_rise_pct_per_km: 8.0,
            sea_level_pressure_hpa: 1018.0,
            terrain_elevation_m: 650.0,
            inversion: Some(InversionBand {
                base: 200.0,
                top: 350.0,
                lapse_rate_c_per_km: -3.0,
            }),
            bands: vec![
                PollutionBand::new(700.0, 1000.0, 420.0, 5.0, "free troposphere, well mixed"),
                PollutionBand::new(500.0, 700.0, 420.0, 8.0, "transition, slight regional influence"),
                PollutionBand::new(350.0, 500.0, 420.0, 12.0, "inversion top, accumulation onset"),
                PollutionBand::new(200.0, 350.0, 420.0, 48.0, "inversion layer, peak accumulation"),
                PollutionBand::new(100.0, 200.0, 420.0, 30.0, "below inversion, particulate gradient"),
                PollutionBand::new(0.0, 100.0, 420.0, 22.0, "surface layer, traffic and dust"),
            ],
        }
    }

    /// Clean, well-mixed atmosphere with no inversion and uniform low
    /// particulate background. Useful as the negative-control scenario.
    #[must_use]
    pub fn well_mixed() -> Self {
        AtmosphereProfile {
            ground_temp_c: 20.0,
            lapse_rate_c_per_km: 6.5,
            ground_humidity_pct: 50.0,
            humidity_rise_pct_per_km: 8.0,
            sea_level_pressure_hpa: 1013.25,
            terrain_elevation_m: 650.0,
            inversion: None,
            bands: vec![PollutionBand::new(
                0.0,
                2000.0,
                420.0,
                5.0,
                "clean background, well mixed",
            )],
        }
    }

    /// Background pollutant levels at an altitude, by band lookup.
    ///
    /// Returns `None` above/below every configured band; callers fall back
    /// to the clean-air defaults in [`crate::physics`].
    #[must_use]
    pub fn pollution_at(&self, altitude_agl: f64) -> Option<&PollutionBand> {
        self.bands
            .iter()
            .find(|band| altitude_agl >= band.alt_min && altitude_agl < band.alt_max)
    }

    /// Validate physical consistency.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] when the inversion band is
    /// inverted or degenerate, a pollution band has `alt_min >= alt_max`, or
    /// the sea-level pressure is not positive.
    pub fn validate(&self) -> Result<()> {
        if self.sea_level_pressure_hpa <= 0.0 {
            return Err(CoreError::invalid_config(format!(
                "sea-level pressure must be positive, got {} hPa",
                self.sea_level_pressure_hpa
            )));
        }
        if self.lapse_rate_c_per_km <= 0.0 {
            return Err(CoreError::invalid_config(format!(
                "normal lapse rate must be positive (cooling with height), got {} °C/km",
                self.lapse_rate_c_per_km
            )));
        }
        if let Some(inv) = self.inversion {
            if inv.base < 0.0 || inv.top <= inv.base {
                return Err(CoreError::invalid_config(format!(
                    "inversion band [{}, {}] m is out of physical order",
                    inv.base, inv.top
                )));
            }
        }
        for band in &self.bands {
            if band.alt_max <= band.alt_min {
                return Err(CoreError::invalid_config(format!(
                    "pollution band '{}' has alt_min {} >= alt_max {}",
                    band.label, band.alt_min, band.alt_max
                )));
            }
        }
        Ok(())
    }
}

impl Default for AtmosphereProfile {
    fn default() -> Self {
        AtmosphereProfile::inversion_scenario()
    }
}
