// src/gps/data.rs
//! Decoded fix data structures

use chrono::{DateTime, NaiveTime, Utc};

/// A numeric field that may have arrived as unparseable text.
///
/// NMEA receivers occasionally emit garbage in the speed/course fields;
/// rather than silently dropping the value, the raw text is kept and every
/// consumer has to decide what to do with it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Numeric(f64),
    Unparsed(String),
}

impl FieldValue {
    /// Parse a raw field, falling back to the original text on failure.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(value) => FieldValue::Numeric(value),
            Err(_) => {
                log::debug!("could not parse numeric field {:?}", raw);
                FieldValue::Unparsed(raw.to_string())
            }
        }
    }

    /// Numeric value, if this field parsed as one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Numeric(value) => Some(*value),
            FieldValue::Unparsed(_) => None,
        }
    }
}

/// One decoded position/motion snapshot from a single NMEA sentence.
///
/// Fields a sentence type does not carry stay `None`; they are never
/// defaulted to fabricated values. Latitude/longitude are signed decimal
/// degrees (south and west negative).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fix {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub time_of_day: Option<NaiveTime>,
    pub velocity: Option<FieldValue>,  // knots, as transmitted
    pub heading: Option<FieldValue>,   // degrees, 0-360
    pub altitude: Option<f64>,         // meters
    pub lat_text: Option<String>,      // human-readable "DEG MIN HEMI" (GGA)
    pub lon_text: Option<String>,
    pub valid: Option<bool>,           // GGA fix quality mapped to a flag
}

impl Fix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this fix carries a usable signed-decimal position.
    pub fn has_position(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Velocity in knots, when present and numeric.
    pub fn velocity_knots(&self) -> Option<f64> {
        self.velocity.as_ref().and_then(FieldValue::as_f64)
    }

    /// Heading in degrees, when present and numeric.
    pub fn heading_degrees(&self) -> Option<f64> {
        self.heading.as_ref().and_then(FieldValue::as_f64)
    }
}
