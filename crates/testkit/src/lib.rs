#![warn(missing_docs)]
//! Deterministic testing surfaces: per-frame event stream and metrics reports.

mod metrics;

use anyhow::Result;
use portalfx_core::FrameTick;
use portalfx_portal::FrameStats;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use metrics::*;

/// One line of the frame event stream.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Frame at which the event occurred.
    pub tick: FrameTick,
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Frame statistics, when the event came from an integration pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<&'a FrameStats>,
}

impl<'a> EventRecord<'a> {
    /// Record for a completed integration pass.
    pub fn frame(stats: &'a FrameStats) -> Self {
        Self {
            tick: stats.tick,
            kind: "Frame",
            stats: Some(stats),
        }
    }

    /// Record for a one-off event with no payload.
    pub fn marker(tick: FrameTick, kind: &'a str) -> Self {
        Self {
            tick,
            kind,
            stats: None,
        }
    }
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: BufWriter<File>,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self {
            file: BufWriter::new(file),
        })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}
