use anyhow::{anyhow, Result};
#[cfg(feature = "webhook")]
pub mod webhook;

use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use skycast_core::{Alert, AlertSink, Severity};

/// Emits alerts as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait::async_trait]
impl AlertSink for LogSink {
    async fn notify(&mut self, alert: &Alert) -> Result<()> {
        match alert.severity {
            Severity::Warning => tracing::warn!(
                kind = ?alert.kind,
                description = %alert.description,
                "{}", alert.title
            ),
            Severity::Info => tracing::info!(
                kind = ?alert.kind,
                description = %alert.description,
                "{}", alert.title
            ),
        }
        Ok(())
    }
}

/// Appends one JSON line per alert to `<dir>/alerts.jsonl`
pub struct FsSink {
    file: PathBuf,
}

impl FsSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        create_dir_all(dir)?;
        Ok(Self {
            file: dir.join("alerts.jsonl"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file
    }
}

#[async_trait::async_trait]
impl AlertSink for FsSink {
    async fn notify(&mut self, alert: &Alert) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        let line = serde_json::to_string(alert)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        Ok(())
    }
}

/// Delivers every alert to each inner sink in turn.
///
/// All sinks are attempted even when one fails; the first failure is
/// returned.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn AlertSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl AlertSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: Box<dyn AlertSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait::async_trait]
impl AlertSink for FanoutSink {
    async fn notify(&mut self, alert: &Alert) -> Result<()> {
        let mut errors = Vec::new();
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.notify(alert).await {
                errors.push(e);
            }
        }
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            n => Err(anyhow!("{} sinks failed, first: {}", n, errors[0])),
        }
    }
}
