// src/gps/geo.rs
//! Great-circle distance and elapsed time between fixes

use super::data::Fix;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two fixes (haversine).
///
/// Passing a fix without a position is a caller error: it is reported and
/// the distance comes back as 0 so the tracker never sees a fault.
pub fn distance(a: &Fix, b: &Fix) -> f64 {
    let (Some(lat_a), Some(lon_a)) = (a.latitude, a.longitude) else {
        log::warn!("distance called with a positionless fix");
        return 0.0;
    };
    let (Some(lat_b), Some(lon_b)) = (b.latitude, b.longitude) else {
        log::warn!("distance called with a positionless fix");
        return 0.0;
    };

    let phi_a = lat_a.to_radians();
    let phi_b = lat_b.to_radians();
    let d_phi = (lat_b - lat_a).to_radians();
    let d_lambda = (lon_b - lon_a).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Absolute difference between two fixes' timestamps in whole minutes.
///
/// Both fixes must carry a full timestamp; when one does not, the error is
/// reported and `None` comes back for the caller to treat as "unknown".
pub fn elapsed_minutes(a: &Fix, b: &Fix) -> Option<i64> {
    let (Some(ts_a), Some(ts_b)) = (a.timestamp, b.timestamp) else {
        log::warn!("elapsed_minutes called with an untimestamped fix");
        return None;
    };

    Some(ts_b.signed_duration_since(ts_a).num_minutes().abs())
}
