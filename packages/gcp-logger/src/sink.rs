//! Output destinations for formatted log lines.
//!
//! A [`SinkSpec`] describes where lines should go; [`SinkSpec::open`] turns it
//! into a [`Sink`] that implements `MakeWriter` for the fmt layer. Opening is
//! the only step that can fail (file sinks), and that failure surfaces as a
//! [`ConfigurationError`].

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::ConfigurationError;

/// Where a logger writes its lines.
#[derive(Debug, Clone, Default)]
pub enum SinkSpec {
    #[default]
    Stdout,
    Stderr,
    /// Append to a file, creating it if missing.
    File(PathBuf),
    /// Keep lines in memory.
    Memory(SharedBuffer),
}

impl SinkSpec {
    pub(crate) fn open(&self) -> Result<Sink, ConfigurationError> {
        match self {
            SinkSpec::Stdout => Ok(Sink::Stdout),
            SinkSpec::Stderr => Ok(Sink::Stderr),
            SinkSpec::Memory(buf) => Ok(Sink::Memory(buf.clone())),
            SinkSpec::File(path) => OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map(|file| Sink::File(Arc::new(Mutex::new(file))))
                .map_err(|source| ConfigurationError::SinkUnavailable {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

/// Opened sink handed to the fmt layer.
#[derive(Clone)]
pub(crate) enum Sink {
    Stdout,
    Stderr,
    File(Arc<Mutex<File>>),
    Memory(SharedBuffer),
}

pub(crate) enum SinkWriter {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
    File(Arc<Mutex<File>>),
    Memory(SharedBuffer),
}

impl<'a> MakeWriter<'a> for Sink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            Sink::Stdout => SinkWriter::Stdout(io::stdout()),
            Sink::Stderr => SinkWriter::Stderr(io::stderr()),
            Sink::File(file) => SinkWriter::File(Arc::clone(file)),
            Sink::Memory(buf) => SinkWriter::Memory(buf.clone()),
        }
    }
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::Stdout(out) => out.write(buf),
            SinkWriter::Stderr(err) => err.write(buf),
            SinkWriter::File(file) => file.lock().write(buf),
            SinkWriter::Memory(mem) => mem.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::Stdout(out) => out.flush(),
            SinkWriter::Stderr(err) => err.flush(),
            SinkWriter::File(file) => file.lock().flush(),
            SinkWriter::Memory(_) => Ok(()),
        }
    }
}

/// Clonable in-memory buffer that collects formatted lines.
///
/// All clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Lines parsed as JSON; lines that fail to parse are skipped.
    pub fn json_lines(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
