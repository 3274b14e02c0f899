// src/lib.rs
//! GPS Trip Tracker Library
//!
//! Decodes NMEA-0183 sentences from a serial positioning receiver and
//! assembles the resulting fixes into a simplified travel path.

pub mod config;
pub mod error;
pub mod gps;
pub mod server;
pub mod track;

// Re-export main types for convenience
pub use error::{GpsError, Result};
pub use gps::{FieldValue, Fix};
pub use server::GpsServer;
pub use track::{Track, TrackState};
