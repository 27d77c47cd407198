//! # Telemetry Reader
//!
//! Background task that polls the serial link, parses sensor-data blocks and
//! publishes the resulting [`TelemetryState`].
//!
//! ## Control Flow
//!
//! 1. Every poll interval, read whatever bytes are pending
//! 2. Frame the bytes into blocks on the dash separator
//! 3. Parse each sensor-data block and fold it into the owned state
//! 4. Publish a fresh copy of the state on the watch channel
//!
//! Read errors are logged and the loop carries on at the next tick. The
//! task stops when its shutdown signal fires (or the handle is dropped), and
//! the serial port is released when the task returns.

use std::io;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::framer::BlockFramer;
use super::port_trait::TelemetrySource;
use crate::config::Config;
use crate::telemetry::parser::{is_sensor_block, parse_sensor_data};
use crate::telemetry::recorder::TelemetryRecorder;
use crate::telemetry::TelemetryState;

/// Counters reported when the reader stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub polls: u64,
    pub bytes: u64,
    pub records: u64,
    pub read_errors: u64,
}

/// Serial telemetry reader
///
/// Sole owner and writer of the telemetry state.
pub struct TelemetryReader<S> {
    source: S,
    framer: BlockFramer,
    state: TelemetryState,
    updates: watch::Sender<TelemetryState>,
    recorder: Option<TelemetryRecorder>,
    poll_interval: Duration,
    settle: Duration,
    stats: ReaderStats,
}

impl<S: TelemetrySource> TelemetryReader<S> {
    /// Create a reader publishing on `updates`
    pub fn new(source: S, config: &Config, updates: watch::Sender<TelemetryState>) -> Self {
        Self {
            source,
            framer: BlockFramer::new(config.serial.max_pending_bytes),
            state: TelemetryState::new(config.display.history_len),
            updates,
            recorder: None,
            poll_interval: Duration::from_millis(config.serial.poll_interval_ms),
            settle: Duration::from_millis(config.serial.settle_ms),
            stats: ReaderStats::default(),
        }
    }

    /// Also write every parsed record to `recorder`
    pub fn with_recorder(mut self, recorder: TelemetryRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Drain the source once and publish any change
    ///
    /// When a poll finds no new bytes, any unterminated block is flushed:
    /// the sender has gone quiet, so the tail is as complete as it will get.
    ///
    /// # Returns
    ///
    /// Number of non-empty records applied
    ///
    /// # Errors
    ///
    /// Returns the source's read error; the state is left untouched
    pub async fn poll_once(&mut self) -> io::Result<usize> {
        self.stats.polls += 1;
        let bytes = self.source.read_available().await?;

        let blocks = if bytes.is_empty() {
            self.framer.finish().into_iter().collect()
        } else {
            self.stats.bytes += bytes.len() as u64;
            self.framer.push(&bytes)
        };

        let mut applied = 0;
        for block in &blocks {
            if self.handle_block(block) {
                applied += 1;
            }
        }

        if applied > 0 {
            self.stats.records += applied as u64;
            self.updates.send_replace(self.state.clone());
            debug!("Applied {} telemetry records", applied);
        }

        Ok(applied)
    }

    fn handle_block(&mut self, block: &str) -> bool {
        if !is_sensor_block(block) {
            return false;
        }

        let record = parse_sensor_data(block);
        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.record(&record) {
                warn!("Failed to record telemetry: {}", e);
            }
        }

        self.state.apply(&record)
    }

    /// Poll until `shutdown` fires or its sender is dropped
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) -> ReaderStats {
        if !self.settle.is_zero() {
            debug!("Waiting {}ms for the receiver to settle", self.settle.as_millis());
            tokio::select! {
                _ = &mut shutdown => return self.stats,
                _ = tokio::time::sleep(self.settle) => {}
            }
        }

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Telemetry reader polling every {}ms",
            self.poll_interval.as_millis()
        );

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Telemetry reader stopping");
                    break;
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        self.stats.read_errors += 1;
                        warn!("Serial read error: {}", e);
                    }
                }
            }
        }

        info!(
            "Telemetry reader stopped after {} polls, {} bytes, {} records, {} read errors",
            self.stats.polls, self.stats.bytes, self.stats.records, self.stats.read_errors
        );
        self.stats
    }

    /// Latest state held by the reader
    pub fn state(&self) -> &TelemetryState {
        &self.state
    }
}

/// Handle to a running reader task
#[derive(Debug)]
pub struct ReaderHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<ReaderStats>,
}

impl ReaderHandle {
    /// Spawn `reader` on `runtime`
    pub fn spawn<S>(runtime: &Handle, reader: TelemetryReader<S>) -> Self
    where
        S: TelemetrySource + 'static,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = runtime.spawn(reader.run(shutdown_rx));
        Self {
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    /// Signal the reader to stop and wait up to `timeout` for it
    ///
    /// A reader that does not finish in time is aborted.
    ///
    /// # Returns
    ///
    /// The reader's counters, or `None` if it had to be aborted or panicked
    pub async fn stop(mut self, timeout: Duration) -> Option<ReaderStats> {
        if let Some(shutdown) = self.shutdown.take() {
            // Err means the task already exited.
            let _ = shutdown.send(());
        }

        let abort = self.task.abort_handle();
        match tokio::time::timeout(timeout, self.task).await {
            Ok(Ok(stats)) => Some(stats),
            Ok(Err(e)) => {
                warn!("Telemetry reader task failed: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    "Telemetry reader did not stop within {}ms, aborting",
                    timeout.as_millis()
                );
                abort.abort();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::port_trait::mocks::MockSource;
    use crate::telemetry::{Channel, Reading};

    const SEP: &str = "-----------------------";

    fn test_config() -> Config {
        let mut config = Config::default();
        config.serial.poll_interval_ms = 5;
        config.serial.settle_ms = 0;
        config
    }

    fn new_reader(source: MockSource) -> (TelemetryReader<MockSource>, watch::Receiver<TelemetryState>) {
        let (tx, rx) = watch::channel(TelemetryState::default());
        (TelemetryReader::new(source, &test_config(), tx), rx)
    }

    #[tokio::test]
    async fn test_poll_without_data_publishes_nothing() {
        let source = MockSource::new();
        let (mut reader, rx) = new_reader(source);

        assert_eq!(reader.poll_once().await.unwrap(), 0);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_poll_applies_sensor_blocks() {
        let source = MockSource::new();
        source.push_bytes(format!(
            "{SEP}\nSENSOR DATA\nTemp: 23.5\nAlt: 12.0\n{SEP}\nRECEIVED SENSOR DATA\nAlt: 13.0\n{SEP}"
        ));
        let (mut reader, mut rx) = new_reader(source);

        assert_eq!(reader.poll_once().await.unwrap(), 2);

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.latest().get(Channel::Temp), Some(Reading::Value(23.5)));
        assert_eq!(state.buffer(Channel::Alt).unwrap().to_vec(), vec![12.0, 13.0]);
    }

    #[tokio::test]
    async fn test_blocks_without_marker_are_ignored() {
        let source = MockSource::new();
        source.push_bytes(format!("{SEP}\nBOOT\nAlt: 99.0\n{SEP}"));
        let (mut reader, rx) = new_reader(source);

        assert_eq!(reader.poll_once().await.unwrap(), 0);
        assert!(!rx.has_changed().unwrap());
        assert!(reader.state().buffer(Channel::Alt).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_block_across_polls_is_applied_once_complete() {
        let source = MockSource::new();
        source.push_bytes("SENSOR DATA\nAccel (m/s²): 1.0, -2");
        source.push_bytes(format!(".5, 9.81\n{SEP}"));
        let (mut reader, _rx) = new_reader(source);

        assert_eq!(reader.poll_once().await.unwrap(), 0);
        assert_eq!(reader.poll_once().await.unwrap(), 1);

        let state = reader.state();
        assert_eq!(state.latest().get(Channel::Ay), Some(Reading::Value(-2.5)));
        assert_eq!(state.buffer(Channel::Az).unwrap().to_vec(), vec![9.81]);
    }

    #[tokio::test]
    async fn test_idle_poll_flushes_unterminated_block() {
        let source = MockSource::new();
        source.push_bytes(format!("{SEP}\nSENSOR DATA\nAlt: 7.0\n"));
        let (mut reader, _rx) = new_reader(source);

        assert_eq!(reader.poll_once().await.unwrap(), 0);
        assert_eq!(reader.poll_once().await.unwrap(), 1);
        assert_eq!(reader.state().latest().get(Channel::Alt), Some(Reading::Value(7.0)));
    }

    #[tokio::test]
    async fn test_read_error_leaves_state_untouched() {
        let source = MockSource::new();
        source.push_error(io::ErrorKind::BrokenPipe);
        let (mut reader, _rx) = new_reader(source);

        assert!(reader.poll_once().await.is_err());
        assert_eq!(reader.state().records_applied(), 0);
    }

    #[tokio::test]
    async fn test_run_keeps_polling_after_errors_and_stops_on_signal() {
        let source = MockSource::new();
        source.push_error(io::ErrorKind::TimedOut);
        source.push_bytes(format!("SENSOR DATA\nGyro (°/s): 90.0, 0.0, -45.0\n{SEP}"));
        let (reader, mut rx) = new_reader(source.clone());

        let handle = ReaderHandle::spawn(&Handle::current(), reader);

        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("reader should publish within 2s")
            .unwrap();
        let orientation = rx.borrow().orientation();
        assert_eq!(orientation.x_deg, 90.0);
        assert_eq!(orientation.z_deg, -45.0);

        let stats = handle.stop(Duration::from_secs(2)).await.unwrap();
        assert_eq!(stats.read_errors, 1);
        assert_eq!(stats.records, 1);
        assert!(stats.polls >= 2);
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test]
    async fn test_dropping_handle_sender_stops_reader() {
        let source = MockSource::new();
        let (reader, _rx) = new_reader(source.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(reader.run(shutdown_rx));
        drop(shutdown_tx);

        let stats = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("reader should stop when its handle is gone")
            .unwrap();
        assert_eq!(stats.records, 0);
    }
}
