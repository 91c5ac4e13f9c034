// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Filing ledger: one JSON line per document filed by a confirmation run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::Result;

/// Archive folder inside the intake location
pub const ARCHIVE_DIR: &str = "processed";

const LEDGER_FILE: &str = "history.jsonl";

/// A single filed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingEntry {
    pub id: String,
    pub batch_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub original_path: PathBuf,
    pub archived_path: PathBuf,
    pub output_path: PathBuf,
    pub classification: String,
    pub file_hash: String,
}

/// Append-only ledger stored under the archive folder
pub struct FilingLog {
    path: PathBuf,
}

impl FilingLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Ledger for an intake folder
    pub fn in_intake(intake: &Path) -> Self {
        Self::new(intake.join(ARCHIVE_DIR).join(LEDGER_FILE))
    }

    /// Append an entry to the ledger
    pub fn append(&self, entry: &FilingEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Read all ledger entries, oldest first
    pub fn read_all(&self) -> Result<Vec<FilingEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse filing entry: {}", e);
                }
            }
        }

        Ok(entries)
    }

    /// Get the most recent N entries (newest first)
    pub fn get_recent(&self, count: usize) -> Result<Vec<FilingEntry>> {
        let mut entries = self.read_all()?;
        entries.reverse();
        entries.truncate(count);
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Content hash recorded with every entry
pub fn calculate_file_hash(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    Ok(blake3::hash(&data).to_hex().to_string())
}
