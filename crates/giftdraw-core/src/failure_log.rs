//! Append-only record of draws that could not be completed.
//!
//! One JSON object per line, so the file can be tailed or fed to `jq`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::Diagnosis;

/// One infeasible draw attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub timestamp: DateTime<Utc>,
    pub snapshot_digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    pub diagnosis: Diagnosis,
}

impl FailureEntry {
    pub fn new(snapshot_digest: &str, requested_by: Option<&str>, diagnosis: Diagnosis) -> Self {
        Self {
            timestamp: Utc::now(),
            snapshot_digest: snapshot_digest.to_string(),
            requested_by: requested_by.map(str::to_string),
            diagnosis,
        }
    }
}

/// JSON-lines failure log at a fixed path.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, creating the file and its parent directories.
    pub fn append(&self, entry: &FailureEntry) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {:?}", parent))?;
        }
        let line = serde_json::to_string(entry).context("serialize failure entry")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {:?}", self.path))?;
        writeln!(file, "{line}").with_context(|| format!("write {:?}", self.path))?;
        Ok(())
    }

    /// Read every entry back, oldest first. A missing file is an empty log.
    pub fn read_all(&self) -> Result<Vec<FailureEntry>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("read {:?}", self.path)),
        };
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .enumerate()
            .map(|(i, l)| {
                serde_json::from_str(l)
                    .with_context(|| format!("parse line {} of {:?}", i + 1, self.path))
            })
            .collect()
    }
}
