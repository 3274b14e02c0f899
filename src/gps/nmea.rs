// src/gps/nmea.rs
//! NMEA sentence parsing
//!
//! One decoder per supported sentence type. Decode failures never
//! panic: a sentence with the wrong shape or an unbuildable timestamp
//! simply produces no fix, and the ingestion loop moves on.

use super::data::{FieldValue, Fix};
use chrono::{NaiveDate, NaiveTime};

/// The closed set of sentence types this tracker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceKind {
    /// Recommended minimum: position, time, date, speed, course.
    Rmc,
    /// Track made good and ground speed.
    Vtg,
    /// Fix data: position, time of day, quality, altitude.
    Gga,
}

impl SentenceKind {
    /// Identify a sentence by the trailing three characters of its tag,
    /// accepting any talker prefix ($GPRMC, $GNRMC, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.ends_with("RMC") {
            Some(SentenceKind::Rmc)
        } else if tag.ends_with("VTG") {
            Some(SentenceKind::Vtg)
        } else if tag.ends_with("GGA") {
            Some(SentenceKind::Gga)
        } else {
            None
        }
    }
}

/// Parse a single NMEA sentence into a fix.
///
/// Returns `None` for unrecognized tags, field-count mismatches, and
/// sentences whose timestamp cannot be constructed.
pub fn parse_sentence(line: &str) -> Option<Fix> {
    let parts: Vec<&str> = line.split(',').collect();

    match SentenceKind::from_tag(parts[0])? {
        SentenceKind::Rmc => parse_rmc(&parts),
        SentenceKind::Vtg => parse_vtg(&parts),
        SentenceKind::Gga => parse_gga(&parts),
    }
}

/// Parse an RMC (Recommended Minimum Course) sentence.
fn parse_rmc(parts: &[&str]) -> Option<Fix> {
    if parts.len() < 10 {
        return None;
    }

    let time = match parse_time_of_day(parts[1]) {
        Some(time) => time,
        None => {
            log::warn!("unbuildable time field {:?}, dropping sentence", parts[1]);
            return None;
        }
    };

    let date = match parse_date(parts[9]) {
        Some(date) => date,
        None => {
            log::warn!("unbuildable date field {:?}, dropping sentence", parts[9]);
            return None;
        }
    };

    let mut fix = Fix::new();
    fix.latitude = Some(parse_coordinate(parts[3], parts[4]));
    fix.longitude = Some(parse_coordinate(parts[5], parts[6]));
    fix.time_of_day = Some(time);
    fix.timestamp = Some(date.and_time(time).and_utc());

    // Empty speed/course fields stay absent; they are not zero.
    if !parts[7].is_empty() {
        fix.velocity = Some(FieldValue::parse(parts[7]));
    }
    if !parts[8].is_empty() {
        fix.heading = Some(FieldValue::parse(parts[8]));
    }

    Some(fix)
}

/// Parse a VTG (Track Made Good and Ground Speed) sentence.
///
/// Only the ground speed in knots (field 5) is taken; VTG carries no
/// position or time.
fn parse_vtg(parts: &[&str]) -> Option<Fix> {
    if parts.len() < 6 {
        return None;
    }

    let mut fix = Fix::new();
    fix.velocity = Some(FieldValue::parse(parts[5]));
    Some(fix)
}

/// Parse a GGA (Global Positioning System Fix Data) sentence.
///
/// Requires exactly 14 fields. Position is kept in human-readable
/// "DEG MIN HEMI" form rather than the signed-decimal form used for RMC.
fn parse_gga(parts: &[&str]) -> Option<Fix> {
    if parts.len() != 14 {
        return None;
    }

    let time = match parse_hhmmss(parts[1]) {
        Some(time) => time,
        None => {
            log::warn!("unbuildable time field {:?}, dropping sentence", parts[1]);
            return None;
        }
    };

    // Altitude has to be numeric; anything else fails the sentence.
    let altitude = match parts[9].parse::<f64>() {
        Ok(altitude) => altitude,
        Err(_) => {
            log::warn!("non-numeric altitude field {:?}, dropping sentence", parts[9]);
            return None;
        }
    };

    let quality = parts[6].parse::<u8>().unwrap_or_else(|_| {
        log::debug!("unparseable fix quality {:?}", parts[6]);
        0
    });

    let mut fix = Fix::new();
    fix.time_of_day = Some(time);
    fix.lat_text = Some(degrees_minutes_text(parts[2], 2, parts[3]));
    fix.lon_text = Some(degrees_minutes_text(parts[4], 3, parts[5]));
    fix.valid = Some((1..=5).contains(&quality));
    fix.altitude = Some(altitude);
    Some(fix)
}

/// Decode an HHMMSS[.sss] time-of-day field.
///
/// Strings shorter than six characters substitute midnight (the original
/// receiver emits these during cold start); six-or-more characters that do
/// not form a valid clock time are a decode failure.
fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    if raw.len() < 6 {
        log::warn!("invalid time string {:?}, substituting 00:00:00", raw);
        return Some(NaiveTime::MIN);
    }
    parse_hhmmss(raw)
}

/// Decode a fixed-width HHMMSS[.sss] string, ignoring fractional seconds.
fn parse_hhmmss(raw: &str) -> Option<NaiveTime> {
    let hour = raw.get(0..2)?.parse().ok()?;
    let minute = raw.get(2..4)?.parse().ok()?;
    let second = raw.get(4..6)?.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Decode a DDMMYY date field. Two-digit years map into 2000-2099.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 6 {
        return None;
    }
    let day = raw.get(0..2)?.parse().ok()?;
    let month = raw.get(2..4)?.parse().ok()?;
    let year: i32 = raw.get(4..6)?.parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Convert an NMEA "DDMM.mmm" coordinate plus hemisphere letter into
/// signed decimal degrees (south and west negative).
fn parse_coordinate(value: &str, hemisphere: &str) -> f64 {
    let magnitude = degrees_minutes(value).unwrap_or_else(|| {
        log::debug!("coordinate {:?} has no usable degrees/minutes form", value);
        0.0
    });

    if hemisphere.eq_ignore_ascii_case("S") || hemisphere.eq_ignore_ascii_case("W") {
        -magnitude
    } else {
        magnitude
    }
}

/// Split a "DD..MM.mmm" string at the two digits before the decimal point
/// and combine as degrees + minutes/60.
fn degrees_minutes(value: &str) -> Option<f64> {
    let dot = value.find('.')?;
    if dot < 2 {
        return None;
    }
    let degrees: f64 = value.get(..dot - 2)?.parse().ok()?;
    let minutes: f64 = value.get(dot - 2..)?.parse().ok()?;
    Some(degrees + minutes / 60.0)
}

/// Reformat a raw coordinate field as "DEG MIN HEMI" display text.
fn degrees_minutes_text(value: &str, degree_width: usize, hemisphere: &str) -> String {
    match (value.get(..degree_width), value.get(degree_width..)) {
        (Some(degrees), Some(minutes)) => format!("{} {} {}", degrees, minutes, hemisphere),
        _ => format!("{} {}", value, hemisphere),
    }
}
