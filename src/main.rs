// src/main.rs
//! GPS Tracker - records a travel path from a serial NMEA receiver

use clap::Parser;
use gps_tracker::{
    config::TrackerConfig,
    server::{self, GpsServer},
    GpsError, Result, Track,
};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "gps-tracker",
    about = "Record a travel path from a serial NMEA receiver"
)]
struct Cli {
    /// Serial device to read from
    #[arg(short, long)]
    port: Option<String>,

    /// Serial baudrate
    #[arg(short, long)]
    baudrate: Option<u32>,

    /// Minimum displacement between recorded vertices, meters
    #[arg(long)]
    min_distance: Option<f64>,

    /// Motionless minutes before the trip is declared over
    #[arg(long)]
    stop_time: Option<i64>,

    /// Transport read timeout, seconds
    #[arg(long)]
    read_timeout: Option<u64>,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.list_ports {
        return server::list_serial_ports();
    }

    let mut config = TrackerConfig::load().unwrap_or_default();
    if let Some(port) = cli.port {
        config.serial_port = port;
    }
    if let Some(baudrate) = cli.baudrate {
        config.baudrate = baudrate;
    }
    if let Some(min_distance) = cli.min_distance {
        config.min_distance = min_distance;
    }
    if let Some(stop_time) = cli.stop_time {
        config.stop_time = stop_time;
    }
    if let Some(read_timeout) = cli.read_timeout {
        config.read_timeout_secs = read_timeout;
    }

    println!(
        "Tracking from {} at {} baud (min distance {} m, stop time {} min)",
        config.serial_port, config.baudrate, config.min_distance, config.stop_time
    );
    println!("Press Ctrl-C to finish.");

    let server = GpsServer::new(Duration::from_secs(config.read_timeout_secs));
    let fixes = server.start(&config.serial_port, config.baudrate).await?;
    let tracker = server::spawn_tracker(fixes, Track::new(config.min_distance, config.stop_time));

    tokio::signal::ctrl_c().await?;
    server.stop();

    let track = tracker
        .await
        .map_err(|e| GpsError::Other(format!("Tracker task failed: {}", e)))?;

    println!(
        "Recorded {} vertices over {:.0} m (active: {})",
        track.vertices().len(),
        track.total_distance(),
        track.is_active()
    );
    if !track.vertices().is_empty() {
        println!("{}", track.render());
    }

    Ok(())
}
