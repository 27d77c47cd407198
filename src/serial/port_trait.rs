//! Trait abstraction for telemetry byte sources to enable testing

use async_trait::async_trait;
use std::io;

/// Trait for reading raw telemetry bytes
#[async_trait]
pub trait TelemetrySource: Send {
    /// Read every byte currently waiting
    ///
    /// Returns an empty vector when nothing is pending.
    async fn read_available(&mut self) -> io::Result<Vec<u8>>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock telemetry source replaying scripted reads
    ///
    /// Once the script is exhausted every read returns no bytes.
    #[derive(Clone)]
    pub struct MockSource {
        pub reads: Arc<Mutex<VecDeque<io::Result<Vec<u8>>>>>,
        pub read_count: Arc<Mutex<usize>>,
    }

    impl MockSource {
        pub fn new() -> Self {
            Self {
                reads: Arc::new(Mutex::new(VecDeque::new())),
                read_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn push_bytes(&self, bytes: impl Into<Vec<u8>>) {
            self.reads.lock().unwrap().push_back(Ok(bytes.into()));
        }

        pub fn push_error(&self, kind: io::ErrorKind) {
            self.reads
                .lock()
                .unwrap()
                .push_back(Err(io::Error::new(kind, "Mock read error")));
        }

        pub fn remaining(&self) -> usize {
            self.reads.lock().unwrap().len()
        }

        pub fn read_count(&self) -> usize {
            *self.read_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl TelemetrySource for MockSource {
        async fn read_available(&mut self) -> io::Result<Vec<u8>> {
            *self.read_count.lock().unwrap() += 1;
            self.reads
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}
