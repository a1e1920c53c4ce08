use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::error;

/// Minimum spacing between two delivered alerts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownWindow {
    seconds: u64,
}

impl CooldownWindow {
    pub fn new(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Seconds still to wait before another alert, or `None` when one is allowed.
    ///
    /// A last-alert time in the future (clock stepped back) keeps blocking until
    /// the wall clock catches up.
    pub fn remaining(&self, last_alert_time: f64, now: f64) -> Option<f64> {
        let elapsed = now - last_alert_time;
        let window = self.seconds as f64;
        (elapsed < window).then(|| window - elapsed)
    }

    pub fn next_allowed(&self, last_alert_time: f64) -> f64 {
        last_alert_time + self.seconds as f64
    }
}

/// Timestamp of the last delivered alert, kept as a single float in a text file
#[derive(Debug, Clone)]
pub struct CooldownStore {
    path: PathBuf,
}

impl CooldownStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last alert time, or 0 when the file is absent, unreadable or malformed.
    pub fn last_alert_time(&self) -> f64 {
        match self.read() {
            Ok(Some(timestamp)) => timestamp,
            Ok(None) => 0.0,
            Err(e) => {
                error!("Failed to read last alert time from {}: {:#}", self.path.display(), e);
                0.0
            }
        }
    }

    /// `Ok(None)` when no alert has been recorded yet
    pub fn read(&self) -> Result<Option<f64>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", self.path.display()));
            }
        };

        let timestamp: f64 = contents
            .trim()
            .parse()
            .with_context(|| format!("Invalid timestamp {:?}", contents.trim()))?;
        if !timestamp.is_finite() {
            anyhow::bail!("Invalid timestamp {:?}", contents.trim());
        }

        Ok(Some(timestamp))
    }

    pub fn record(&self, timestamp: f64) -> Result<()> {
        fs::write(&self.path, timestamp.to_string())
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}
