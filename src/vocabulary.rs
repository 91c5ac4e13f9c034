// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Learned vocabulary persisted next to the intake config

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::IntakeConfig;
use crate::Result;

/// Name of the side file holding learned vocabulary
pub const VOCABULARY_FILE: &str = "additional_data.json";

/// Append-only vocabulary grown from confirmed reviews
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyData {
    #[serde(default)]
    pub additional_sources: Vec<String>,
    #[serde(default)]
    pub description_suggestions: Vec<String>,
}

impl VocabularyData {
    /// Path of the side file inside an intake folder
    pub fn path_in(intake: &Path) -> PathBuf {
        intake.join(VOCABULARY_FILE)
    }

    /// Load learned vocabulary, or an empty set on first run
    pub fn load(intake: &Path) -> Result<Self> {
        let path = Self::path_in(intake);
        if !path.exists() {
            debug!("No vocabulary file at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrite the side file with the full vocabulary
    pub fn save(&self, intake: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path_in(intake), content)?;
        debug!(
            "Saved vocabulary: {} sources, {} descriptions",
            self.additional_sources.len(),
            self.description_suggestions.len()
        );
        Ok(())
    }

    /// Append a source unless already present. Returns true if appended.
    pub fn learn_source(&mut self, source: &str) -> bool {
        let added = append_unique(&mut self.additional_sources, source);
        if added {
            info!("Learned source: {}", source);
        }
        added
    }

    /// Append a description phrasing unless already present. Returns true if appended.
    pub fn learn_description(&mut self, description: &str) -> bool {
        let added = append_unique(&mut self.description_suggestions, description);
        if added {
            info!("Learned description: {}", description);
        }
        added
    }
}

// Exact membership only; case and whitespace variants count as new entries.
// Blank values are never learned.
fn append_unique(list: &mut Vec<String>, value: &str) -> bool {
    if value.trim().is_empty() || list.iter().any(|v| v == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

/// Merged vocabulary offered to the classification service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
    pub classifications: Vec<String>,
    pub description_suggestions: Vec<String>,
}

impl Vocabulary {
    /// Static config first, learned entries after
    pub fn merge(config: &IntakeConfig, learned: &VocabularyData) -> Self {
        let mut sources = config.sources.clone();
        sources.extend(learned.additional_sources.iter().cloned());

        Self {
            sources,
            destinations: config.destinations.clone(),
            classifications: config.classifications.clone(),
            description_suggestions: learned.description_suggestions.clone(),
        }
    }
}
