//! Log capture helpers shared by integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::io;
use std::sync::{Arc, Mutex};

use reqscope_core::log::{self, LogLevel};
use tracing::subscriber::DefaultGuard;

/// In-memory log sink.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Install a thread-scoped subscriber writing into this capture.
    pub fn install(&self, level: LogLevel) -> DefaultGuard {
        let sink = self.clone();
        tracing::subscriber::set_default(log::subscriber(level, move || sink.clone()))
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that fails every write.
pub struct BrokenPipe;

impl io::Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }
}

pub fn install_broken(level: LogLevel) -> DefaultGuard {
    tracing::subscriber::set_default(log::subscriber(level, || BrokenPipe))
}
