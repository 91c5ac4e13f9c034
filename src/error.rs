// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Archivist

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Archivist operations
pub type Result<T> = std::result::Result<T, ArchivistError>;

/// Archivist error types
#[derive(Error, Debug)]
pub enum ArchivistError {
    #[error("Config file not found at {0:?}")]
    ConfigMissing(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Text extraction failed for {file}: {message}")]
    Extraction { file: String, message: String },

    #[error("Classification service error: {0}")]
    Classification(String),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Batch {submitted} is no longer pending (current batch is {expected})")]
    StaleBatch { expected: Uuid, submitted: Uuid },

    #[error("Invalid {field} {value:?} for {filename}")]
    InvalidField { filename: String, field: &'static str, value: String },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl ArchivistError {
    /// True for failures of the external classification call
    pub fn is_service_failure(&self) -> bool {
        matches!(self, Self::Classification(_) | Self::Api(_))
    }
}
