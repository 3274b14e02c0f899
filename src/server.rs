// src/server.rs
//! Serial ingestion and fix hand-off
//!
//! One reader task per data source. The task suspends only at the timed
//! line read; a timeout, transport error, or EOF ends the session (the
//! surrounding supervisor owns reconnects, not this loop). Decoded fixes
//! go to a bounded channel on a best-effort basis.

use crate::{
    error::{GpsError, Result},
    gps::{nmea, Fix},
    track::Track,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_serial::SerialPortBuilderExt;

/// Capacity of the fix hand-off channel. The producer never blocks on it;
/// when the consumer falls behind, fixes are dropped.
pub const CHANNEL_CAPACITY: usize = 64;

/// Spawns and controls the serial reader task.
pub struct GpsServer {
    running: Arc<AtomicBool>,
    read_timeout: Duration,
}

impl GpsServer {
    pub fn new(read_timeout: Duration) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            read_timeout,
        }
    }

    /// Open the serial port and spawn the reader task.
    ///
    /// The returned receiver yields every successfully decoded fix; it
    /// closes when the reader task ends.
    pub async fn start(&self, port: &str, baudrate: u32) -> Result<mpsc::Receiver<Fix>> {
        let serial = tokio_serial::new(port, baudrate)
            .timeout(Duration::from_millis(1000))
            .open_native_async()
            .map_err(|e| {
                GpsError::Connection(format!("Failed to open serial port {}: {}", port, e))
            })?;

        log::info!("Connected to {} at {} baud", port, baudrate);

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let running = Arc::clone(&self.running);
        let read_timeout = self.read_timeout;

        tokio::spawn(async move {
            read_loop(BufReader::new(serial), tx, running, read_timeout).await;
        });

        Ok(rx)
    }

    /// Ask the reader task to stop after its current read.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Read lines until the transport fails, times out, or reaches EOF,
/// pushing every decoded fix to the hand-off channel.
///
/// Generic over the reader so tests can drive it with in-memory input.
pub async fn read_loop<R>(
    mut reader: R,
    tx: mpsc::Sender<Fix>,
    running: Arc<AtomicBool>,
    read_timeout: Duration,
) where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();

    while running.load(Ordering::Relaxed) {
        line.clear();
        match tokio::time::timeout(read_timeout, reader.read_line(&mut line)).await {
            Err(_) => {
                log::warn!("transport read timed out after {:?}", read_timeout);
                break;
            }
            Ok(Err(e)) => {
                log::warn!("transport read failed: {}", e);
                break;
            }
            Ok(Ok(0)) => break, // EOF
            Ok(Ok(_)) => {}
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Undecodable lines are skipped, never fatal.
        if let Some(fix) = nmea::parse_sentence(trimmed) {
            match tx.try_send(fix) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::debug!("hand-off channel full, dropping fix");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("consumer gone, ending reader");
                    break;
                }
            }
        }
    }
}

/// Spawn the task that owns the track.
///
/// All path mutation happens on this one task; everyone else talks to it
/// through the fix channel. The final track comes back when the channel
/// closes.
pub fn spawn_tracker(mut rx: mpsc::Receiver<Fix>, mut track: Track) -> JoinHandle<Track> {
    tokio::spawn(async move {
        while let Some(fix) = rx.recv().await {
            track.add_point(fix);
        }
        track
    })
}

/// List available serial ports.
pub fn list_serial_ports() -> Result<()> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| GpsError::Other(format!("Failed to list serial ports: {}", e)))?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {} - {:?}", port.port_name, port.port_type);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackState;

    async fn run_reader(input: &'static [u8]) -> Vec<Fix> {
        let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));

        read_loop(
            BufReader::new(input),
            tx,
            running,
            Duration::from_secs(5),
        )
        .await;

        let mut fixes = Vec::new();
        while let Ok(fix) = rx.try_recv() {
            fixes.push(fix);
        }
        fixes
    }

    #[tokio::test]
    async fn test_read_loop_decodes_supported_sentences() {
        let input: &[u8] = b"\
$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230324,003.1,W*6A\n\
$GPGSV,3,1,12,01,40,083,46,02,17,308,41*75\n\
not an nmea line\n\
$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K*48\n";

        let fixes = run_reader(input).await;
        assert_eq!(fixes.len(), 2);
        assert!(fixes[0].has_position());
        assert!(!fixes[1].has_position());
        assert_eq!(fixes[1].velocity_knots(), Some(5.5));
    }

    #[tokio::test]
    async fn test_read_loop_ends_at_eof() {
        let fixes = run_reader(b"").await;
        assert!(fixes.is_empty());
    }

    #[tokio::test]
    async fn test_read_loop_skips_malformed_lines() {
        // A malformed date kills that sentence, not the loop.
        let input: &[u8] = b"\
$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,BADBAD,003.1,W*6A\n\
$GPRMC,123520,A,4807.038,N,01131.000,E,022.4,084.4,230324,003.1,W*6A\n";

        let fixes = run_reader(input).await;
        assert_eq!(fixes.len(), 1);
    }

    #[tokio::test]
    async fn test_tracker_task_returns_track_on_channel_close() {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = spawn_tracker(rx, Track::default());

        let mut fix = Fix::new();
        fix.latitude = Some(38.9708);
        fix.longitude = Some(-104.756631);
        tx.send(fix).await.unwrap();
        drop(tx);

        let track = handle.await.unwrap();
        assert_eq!(track.state(), TrackState::Pending);
        assert_eq!(track.vertices().len(), 1);
    }
}
