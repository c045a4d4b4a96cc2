//! Ground-station wire schema.
//!
//! The radio downlink and on-board SD log use a flat comma-separated row
//! whose column names predate this crate and are kept verbatim (Spanish
//! abbreviations included) so recorded missions stay loadable.
//! [`TelemetryRow`] mirrors that layout one to one; conversion to
//! [`TelemetryRecord`] is where malformed input is rejected.

use crate::core_types::record::{FlightPhase, TelemetryRecord};
use crate::error::{CoreError, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Barometric readings below this are treated as sensor artifacts
/// (pressure spikes during deployment produce impossible altitudes).
const ALTITUDE_ARTIFACT_FLOOR_M: f64 = -50.0;

/// One downlink row in wire order.
///
/// Column names match the ground-station CSV header exactly; `fase` is the
/// phase in its wire spelling and is only validated when converting to a
/// [`TelemetryRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRow {
    pub timestamp: f64,
    /// Wall-clock stamp written by the ground station; carried opaquely and
    /// left empty on rows synthesized from a [`TelemetryRecord`].
    pub datetime: String,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub alt_mar: f64,
    pub sats: u32,
    pub temp_hs: f64,
    pub hum_hs: f64,
    pub temp_scd: f64,
    pub hum_scd: f64,
    pub temp_lps: f64,
    pub presion: f64,
    pub co2: f64,
    pub pm1_0: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
    pub fase: String,
}

/// Number of comma-separated fields in one wire row.
pub const FIELD_COUNT: usize = 24;

impl TelemetryRow {
    /// Parse one row from its comma-separated fields.
    ///
    /// `row` is the 1-based row number used in error reports.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedRecord`] naming the offending column
    /// when the field count is wrong or a field fails to parse.
    pub fn from_fields(fields: &[&str], row: usize) -> Result<TelemetryRow> {
        if fields.len() != FIELD_COUNT {
            return Err(CoreError::MalformedRecord {
                row,
                reason: format!("expected {FIELD_COUNT} fields, got {}", fields.len()),
            });
        }
        let f = |index: usize, name: &str| -> Result<f64> {
            fields[index]
                .trim()
                .parse()
                .map_err(|_| CoreError::MalformedRecord {
                    row,
                    reason: format!("column `{name}`: unparseable value `{}`", fields[index]),
                })
        };
        let sats = fields[6]
            .trim()
            .parse()
            .map_err(|_| CoreError::MalformedRecord {
                row,
                reason: format!("column `sats`: unparseable value `{}`", fields[6]),
            })?;

        Ok(TelemetryRow {
            timestamp: f(0, "timestamp")?,
            datetime: fields[1].trim().to_owned(),
            lat: f(2, "lat")?,
            lon: f(3, "lon")?,
            alt: f(4, "alt")?,
            alt_mar: f(5, "alt_mar")?,
            sats,
            temp_hs: f(7, "temp_hs")?,
            hum_hs: f(8, "hum_hs")?,
            temp_scd: f(9, "temp_scd")?,
            hum_scd: f(10, "hum_scd")?,
            temp_lps: f(11, "temp_lps")?,
            presion: f(12, "presion")?,
            co2: f(13, "co2")?,
            pm1_0: f(14, "pm1_0")?,
            pm2_5: f(15, "pm2_5")?,
            pm10: f(16, "pm10")?,
            accel_x: f(17, "accel_x")?,
            accel_y: f(18, "accel_y")?,
            accel_z: f(19, "accel_z")?,
            gyro_x: f(20, "gyro_x")?,
            gyro_y: f(21, "gyro_y")?,
            gyro_z: f(22, "gyro_z")?,
            fase: fields[23].trim().to_owned(),
        })
    }

    /// Convert to the in-memory record, validating the phase name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedRecord`] when `fase` is not a known
    /// phase name.
    pub fn into_record(self, row: usize) -> Result<TelemetryRecord> {
        let phase: FlightPhase =
            self.fase
                .parse()
                .map_err(|reason: String| CoreError::MalformedRecord { row, reason })?;
        Ok(TelemetryRecord {
            time_s: self.timestamp,
            latitude: self.lat,
            longitude: self.lon,
            altitude_agl: self.alt,
            altitude_msl: self.alt_mar,
            satellites: self.sats,
            temp_primary_c: self.temp_hs,
            temp_co2_sensor_c: self.temp_scd,
            temp_baro_sensor_c: self.temp_lps,
            hum_primary_pct: self.hum_hs,
            hum_co2_sensor_pct: self.hum_scd,
            pressure_hpa: self.presion,
            co2_ppm: self.co2,
            pm1_0: self.pm1_0,
            pm2_5: self.pm2_5,
            pm10: self.pm10,
            accel: Vector3::new(self.accel_x, self.accel_y, self.accel_z),
            gyro: Vector3::new(self.gyro_x, self.gyro_y, self.gyro_z),
            phase,
        })
    }
}

impl From<&TelemetryRecord> for TelemetryRow {
    fn from(record: &TelemetryRecord) -> TelemetryRow {
        TelemetryRow {
            timestamp: record.time_s,
            datetime: String::new(),
            lat: record.latitude,
            lon: record.longitude,
            alt: record.altitude_agl,
            alt_mar: record.altitude_msl,
            sats: record.satellites,
            temp_hs: record.temp_primary_c,
            hum_hs: record.hum_primary_pct,
            temp_scd: record.temp_co2_sensor_c,
            hum_scd: record.hum_co2_sensor_pct,
            temp_lps: record.temp_baro_sensor_c,
            presion: record.pressure_hpa,
            co2: record.co2_ppm,
            pm1_0: record.pm1_0,
            pm2_5: record.pm2_5,
            pm10: record.pm10,
            accel_x: record.accel.x,
            accel_y: record.accel.y,
            accel_z: record.accel.z,
            gyro_x: record.gyro.x,
            gyro_y: record.gyro.y,
            gyro_z: record.gyro.z,
            fase: record.phase.as_str().to_owned(),
        }
    }
}

/// Convert parsed rows to records, skipping malformed ones.
///
/// A recorded mission commonly has a handful of corrupted rows (radio
/// dropouts mid-packet); those are logged and skipped rather than failing
/// the whole load. Returns the surviving records and the skip count.
#[must_use]
pub fn records_from_rows(rows: Vec<TelemetryRow>) -> (Vec<TelemetryRecord>, usize) {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0_usize;
    for (index, telemetry_row) in rows.into_iter().enumerate() {
        match telemetry_row.into_record(index + 1) {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!(row = index + 1, %error, "skipping malformed telemetry row");
                skipped += 1;
            }
        }
    }
    (records, skipped)
}

/// Drop records whose barometric altitude is an obvious pressure-spike
/// artifact.
#[must_use]
pub fn without_altitude_artifacts(records: Vec<TelemetryRecord>) -> Vec<TelemetryRecord> {
    records
        .into_iter()
        .filter(|r| r.altitude_agl >= ALTITUDE_ARTIFACT_FLOOR_M)
        .collect()
}

/// Keep only records with a GPS fix.
#[must_use]
pub fn with_gps_fix(records: &[TelemetryRecord]) -> Vec<TelemetryRecord> {
    records.iter().filter(|r| r.has_gps_fix()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE_ROW: &str = "12.0,2026-04-18T10:32:12,40.4052,-3.9931,880.0,1530.0,9,11.2,58.3,11.5,57.1,11.7,915.2,430.0,18.0,30.0,42.0,0.1,-0.05,9.8,1.2,-0.8,0.3,descent";

    fn parse(line: &str, row: usize) -> Result<TelemetryRow> {
        let fields: Vec<&str> = line.split(',').collect();
        TelemetryRow::from_fields(&fields, row)
    }

    #[test]
    fn test_parse_sample_row() {
        let telemetry_row = parse(SAMPLE_ROW, 1).unwrap();
        assert_relative_eq!(telemetry_row.alt, 880.0);
        assert_eq!(telemetry_row.sats, 9);
        assert_eq!(telemetry_row.fase, "descent");

        let record = telemetry_row.into_record(1).unwrap();
        assert_eq!(record.phase, FlightPhase::Descent);
        assert_relative_eq!(record.accel.z, 9.8);
        assert!(record.has_gps_fix());
    }

    #[test]
    fn test_row_round_trips_through_record() {
        let telemetry_row = parse(SAMPLE_ROW, 1).unwrap();
        let record = telemetry_row.clone().into_record(1).unwrap();
        // The wall-clock stamp is not carried by the record
        let mut rebuilt = TelemetryRow::from(&record);
        assert_eq!(rebuilt.datetime, "");
        rebuilt.datetime = telemetry_row.datetime.clone();
        assert_eq!(rebuilt, telemetry_row);
    }

    #[test]
    fn test_wrong_field_count_names_the_row() {
        let error = parse("1.0,2.0,3.0", 7).unwrap_err();
        match error {
            CoreError::MalformedRecord { row, reason } => {
                assert_eq!(row, 7);
                assert!(reason.contains("expected 24"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_field_names_the_column() {
        let line = SAMPLE_ROW.replace("915.2", "??");
        let error = parse(&line, 3).unwrap_err();
        match error {
            CoreError::MalformedRecord { reason, .. } => {
                assert!(reason.contains("presion"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_phase_rejected() {
        let line = SAMPLE_ROW.replace("descent", "reentry");
        let telemetry_row = parse(&line, 1).unwrap();
        assert!(telemetry_row.into_record(1).is_err());
    }

    #[test]
    fn test_malformed_rows_skipped_not_fatal() {
        let good = parse(SAMPLE_ROW, 1).unwrap();
        let mut bad = good.clone();
        bad.fase = "reentry".to_owned();
        let (records, skipped) = records_from_rows(vec![good, bad]);
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_altitude_artifact_filter() {
        let artifact = TelemetryRecord {
            altitude_agl: -120.0,
            ..TelemetryRecord::default()
        };
        let slight = TelemetryRecord {
            altitude_agl: -3.0,
            ..TelemetryRecord::default()
        };
        let kept = without_altitude_artifacts(vec![artifact, slight]);
        // Small negative readings are normal barometric noise at ground
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].altitude_agl, -3.0);
    }

    #[test]
    fn test_gps_fix_filter_drops_sentinel() {
        let no_fix = TelemetryRecord::default();
        let fix = TelemetryRecord {
            latitude: 40.4,
            longitude: -3.9,
            ..TelemetryRecord::default()
        };
        let kept = with_gps_fix(&[no_fix, fix]);
        assert_eq!(kept.len(), 1);
    }
}
