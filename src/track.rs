// src/track.rs
//! Travel path recording
//!
//! A `Track` consumes decoded fixes one at a time and decides whether the
//! receiver has started moving, whether a new vertex is worth recording,
//! or whether the trip is over. The distance threshold filters GPS jitter;
//! the first displacement has to clear five times the threshold so a
//! parked receiver's noise never starts a trip.

use crate::gps::{geo, Fix};

/// Default minimum displacement between recorded vertices, meters.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 20.0;
/// Default motionless time before the trip is declared over, minutes.
pub const DEFAULT_STOP_TIME_MIN: i64 = 10;

/// Multiplier on `min_distance` for the first displacement out of `Pending`.
const START_FACTOR: f64 = 5.0;

/// Where the tracker is in the life of the current trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// No vertices yet.
    Empty,
    /// One vertex recorded, waiting to confirm genuine motion.
    Pending,
    /// Recording vertices on the displacement threshold.
    Active,
    /// Motion ceased; terminal for this trip.
    Stopped,
}

/// Path accumulator for one trip.
#[derive(Debug, Clone)]
pub struct Track {
    state: TrackState,
    vertices: Vec<Fix>,
    min_distance: f64, // meters
    stop_time: i64,    // minutes
}

impl Track {
    pub fn new(min_distance: f64, stop_time: i64) -> Self {
        Self {
            state: TrackState::Empty,
            vertices: Vec::new(),
            min_distance,
            stop_time,
        }
    }

    /// Feed one decoded fix to the tracker.
    ///
    /// Fixes without a position (VTG-only fixes, decode degradations) are
    /// reported and ignored; no input ever faults the state machine.
    pub fn add_point(&mut self, fix: Fix) {
        if !fix.has_position() {
            log::debug!("ignoring fix without a position");
            return;
        }

        match self.state {
            TrackState::Empty => {
                self.vertices.push(fix);
                self.state = TrackState::Pending;
            }
            TrackState::Pending => {
                // Displacement is measured from the recorded vertex, not
                // from the latest fix seen.
                if geo::distance(&fix, &self.vertices[0]) > START_FACTOR * self.min_distance {
                    self.vertices.push(fix);
                    self.state = TrackState::Active;
                }
            }
            TrackState::Active => {
                let Some(last) = self.vertices.last() else {
                    return;
                };
                if geo::distance(&fix, last) >= self.min_distance {
                    self.vertices.push(fix);
                } else if geo::elapsed_minutes(&fix, last)
                    .map_or(false, |idle| idle > self.stop_time)
                {
                    log::info!(
                        "no displacement for more than {} minutes, trip over",
                        self.stop_time
                    );
                    self.state = TrackState::Stopped;
                }
            }
            TrackState::Stopped => {
                log::debug!("trip already stopped, ignoring fix");
            }
        }
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    /// Whether the tracker is currently recording motion.
    pub fn is_active(&self) -> bool {
        self.state == TrackState::Active
    }

    /// Recorded vertices, in insertion (= chronological) order.
    pub fn vertices(&self) -> &[Fix] {
        &self.vertices
    }

    /// Total great-circle length of the recorded path, meters.
    pub fn total_distance(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|pair| geo::distance(&pair[0], &pair[1]))
            .sum()
    }

    /// Diagnostic rendering: comma-joined `{lat, lng}` records.
    pub fn render(&self) -> String {
        self.vertices
            .iter()
            .map(|v| {
                format!(
                    "{{lat: {}, lng: {}}}",
                    v.latitude.unwrap_or_default(),
                    v.longitude.unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DISTANCE_M, DEFAULT_STOP_TIME_MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    // At R = 6 371 000 m one degree of latitude is about 111.2 km, so
    // 0.001 degrees is about 111 m.
    fn fix_at(latitude: f64, minute: u32) -> Fix {
        Fix {
            latitude: Some(latitude),
            longitude: Some(-104.756631),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 23, 12, minute, 0).single(),
            ..Fix::default()
        }
    }

    #[test]
    fn test_first_fix_goes_pending() {
        let mut track = Track::default();
        assert_eq!(track.state(), TrackState::Empty);

        track.add_point(fix_at(38.9708, 0));
        assert_eq!(track.state(), TrackState::Pending);
        assert_eq!(track.vertices().len(), 1);
        assert!(!track.is_active());
    }

    #[test]
    fn test_jitter_does_not_start_a_trip() {
        let mut track = Track::default();
        track.add_point(fix_at(38.9708, 0));

        // ~55 m, under the 5 x 20 m start gate.
        track.add_point(fix_at(38.9713, 1));
        assert_eq!(track.state(), TrackState::Pending);
        assert_eq!(track.vertices().len(), 1);
    }

    #[test]
    fn test_real_displacement_activates() {
        let mut track = Track::default();
        track.add_point(fix_at(38.9708, 0));

        // ~111 m, over the start gate.
        track.add_point(fix_at(38.9718, 1));
        assert_eq!(track.state(), TrackState::Active);
        assert_eq!(track.vertices().len(), 2);
        assert!(track.is_active());
    }

    #[test]
    fn test_active_appends_on_min_distance() {
        let mut track = Track::default();
        track.add_point(fix_at(38.9708, 0));
        track.add_point(fix_at(38.9718, 1));

        // ~33 m from the last vertex: appended.
        track.add_point(fix_at(38.9721, 2));
        assert_eq!(track.vertices().len(), 3);
        assert_eq!(track.state(), TrackState::Active);

        // ~11 m, recent: neither appended nor stopped.
        track.add_point(fix_at(38.9722, 3));
        assert_eq!(track.vertices().len(), 3);
        assert_eq!(track.state(), TrackState::Active);
    }

    #[test]
    fn test_idle_past_stop_time_ends_the_trip() {
        let mut track = Track::default();
        track.add_point(fix_at(38.9708, 0));
        track.add_point(fix_at(38.9718, 1));

        // ~11 m displacement, 15 minutes after the last vertex.
        track.add_point(fix_at(38.9719, 16));
        assert_eq!(track.state(), TrackState::Stopped);
        assert_eq!(track.vertices().len(), 2);
        assert!(!track.is_active());
    }

    #[test]
    fn test_displacement_always_appends_regardless_of_elapsed_time() {
        let mut track = Track::default();
        track.add_point(fix_at(38.9708, 0));
        track.add_point(fix_at(38.9718, 1));

        // ~111 m but half an hour later: still appended, still active.
        track.add_point(fix_at(38.9728, 31));
        assert_eq!(track.state(), TrackState::Active);
        assert_eq!(track.vertices().len(), 3);
    }

    #[test]
    fn test_stopped_is_terminal() {
        let mut track = Track::default();
        track.add_point(fix_at(38.9708, 0));
        track.add_point(fix_at(38.9718, 1));
        track.add_point(fix_at(38.9719, 16));
        assert_eq!(track.state(), TrackState::Stopped);

        track.add_point(fix_at(38.9808, 17));
        assert_eq!(track.state(), TrackState::Stopped);
        assert_eq!(track.vertices().len(), 2);
    }

    #[test]
    fn test_positionless_fix_is_ignored() {
        let mut track = Track::default();
        track.add_point(Fix::default());
        assert_eq!(track.state(), TrackState::Empty);
        assert!(track.vertices().is_empty());
    }

    #[test]
    fn test_untimestamped_fix_never_stops_the_trip() {
        let mut track = Track::default();
        track.add_point(fix_at(38.9708, 0));
        track.add_point(fix_at(38.9718, 1));

        let mut nearby = fix_at(38.9719, 0);
        nearby.timestamp = None;
        track.add_point(nearby);
        assert_eq!(track.state(), TrackState::Active);
        assert_eq!(track.vertices().len(), 2);
    }

    #[test]
    fn test_render_lists_vertices() {
        let mut track = Track::default();
        track.add_point(fix_at(38.9708, 0));

        let rendered = track.render();
        assert!(rendered.contains("lat: 38.9708"));
        assert!(rendered.contains("lng: -104.756631"));
    }

    #[test]
    fn test_total_distance_sums_segments() {
        let mut track = Track::default();
        track.add_point(fix_at(38.9708, 0));
        track.add_point(fix_at(38.9718, 1));
        track.add_point(fix_at(38.9728, 2));

        // Two ~111 m legs.
        let total = track.total_distance();
        assert!((210.0..235.0).contains(&total), "unexpected total {}", total);
    }
}
