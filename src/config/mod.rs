// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Archivist
//!
//! Two files are involved. `config.json` lives in the intake folder and
//! carries the credential plus the static vocabulary; it is required.
//! `archivist.json` holds application settings (folders, web server,
//! workflow policies) and falls back to defaults when absent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{ArchivistError, Result};

/// Name of the intake configuration file
pub const INTAKE_CONFIG_FILE: &str = "config.json";

/// Static configuration read from the intake folder
#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct IntakeConfig {
    /// Credential for the classification service
    pub api_key: String,

    /// Known originators of documents
    pub sources: Vec<String>,

    /// Known recipients
    pub destinations: Vec<String>,

    /// Category labels, also used as output subfolders
    pub classifications: Vec<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Characters of extracted text sent to the service; the rest is dropped
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

// Keep the credential out of logs
impl fmt::Debug for IntakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntakeConfig")
            .field("api_key", &"<redacted>")
            .field("sources", &self.sources)
            .field("destinations", &self.destinations)
            .field("classifications", &self.classifications)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("max_text_chars", &self.max_text_chars)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl IntakeConfig {
    /// Path of the configuration file inside an intake folder
    pub fn path_in(intake: &Path) -> PathBuf {
        intake.join(INTAKE_CONFIG_FILE)
    }

    /// Load `config.json` from the intake folder.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error: there are no
    /// sensible defaults for a credential or a vocabulary.
    pub fn load(intake: &Path) -> Result<Self> {
        let path = Self::path_in(intake);
        if !path.exists() {
            return Err(ArchivistError::ConfigMissing(path));
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ArchivistError::Config(format!("Failed to parse {:?}: {}", path, e)))?;

        if config.max_text_chars == 0 {
            return Err(ArchivistError::Config(
                "max_text_chars must be greater than zero".to_string(),
            ));
        }

        tracing::debug!(
            "Loaded intake config: {} sources, {} destinations, {} classifications",
            config.sources.len(),
            config.destinations.len(),
            config.classifications.len()
        );
        Ok(config)
    }

    /// Template written by `archivist init`
    pub fn template() -> Self {
        Self {
            api_key: "sk-...".to_string(),
            sources: vec!["Electricity Company".to_string()],
            destinations: vec!["Jane Doe".to_string()],
            classifications: vec!["Utilities".to_string(), "Health".to_string()],
            model: default_model(),
            api_url: default_api_url(),
            max_text_chars: default_max_text_chars(),
            timeout_secs: default_timeout(),
        }
    }

    /// Save configuration to the intake folder
    pub fn save(&self, intake: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path_in(intake), content)?;
        Ok(())
    }
}

/// Application settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Folder scanned for new documents
    #[serde(default = "default_intake_dir")]
    pub intake_dir: PathBuf,

    /// Root of the classified output tree
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

/// Policies for behaviors that have more than one reasonable answer
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub learn_source_field: LearnSourceField,
    #[serde(default)]
    pub edit_fallback: EditFallback,
}

/// What a classification run does when one document fails
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run; results gathered so far stay queued
    #[default]
    FailFast,
    /// Record the failure on the batch and continue with the next document
    Isolate,
}

/// Which confirmed field the "learn this source" flag appends
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LearnSourceField {
    #[default]
    Source,
    /// Appends the destination field instead of the source
    Destination,
}

/// Value used when a submitted edit omits a field
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EditFallback {
    /// Keep the value produced by the classifier
    #[default]
    Classified,
    /// Use an empty string
    Empty,
}

fn default_model() -> String { "gpt-4o-2024-08-06".to_string() }
fn default_api_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_max_text_chars() -> usize { 2500 }
fn default_timeout() -> u64 { 120 }
fn default_intake_dir() -> PathBuf { PathBuf::from("./input") }
fn default_output_dir() -> PathBuf { PathBuf::from("./output") }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 5000 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            intake_dir: default_intake_dir(),
            output_dir: default_output_dir(),
            web: WebConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| ArchivistError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
