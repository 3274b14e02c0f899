// src/gps/mod.rs
//! GPS data handling and parsing

pub mod data;
pub mod geo;
pub mod nmea;

pub use data::{FieldValue, Fix};
