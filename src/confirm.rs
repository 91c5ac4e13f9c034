// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Confirmation runs: apply review edits, file the documents, learn vocabulary
//!
//! A run is fail-fast. The first error stops the loop; documents already
//! copied and archived stay where they are (and are listed in the filing
//! ledger), the vocabulary file is not rewritten and the batch is not cleared.

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{EditFallback, LearnSourceField, WorkflowConfig};
use crate::history::{calculate_file_hash, FilingEntry, FilingLog, ARCHIVE_DIR};
use crate::naming::output_filename;
use crate::queue::{ClassificationResult, ReviewBatch};
use crate::vocabulary::VocabularyData;
use crate::{ArchivistError, Result};

/// Reviewer input for one queued document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryEdit {
    pub date: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub description: Option<String>,
    pub classification: Option<String>,
    #[serde(default)]
    pub learn_source: bool,
    #[serde(default)]
    pub learn_description: bool,
}

/// Everything the review surface submits for one confirmation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmSubmission {
    /// Batch the edits were made against; checked when present
    #[serde(default)]
    pub batch_id: Option<Uuid>,
    /// Edits keyed by intake filename
    #[serde(default)]
    pub edits: HashMap<String, EntryEdit>,
}

impl ConfirmSubmission {
    /// Decode flat form fields such as `date_<filename>` and `add_source_<filename>`
    pub fn from_form(fields: &HashMap<String, String>) -> Self {
        let mut submission = Self::default();

        for (key, value) in fields {
            if key == "batch_id" {
                submission.batch_id = Uuid::parse_str(value).ok();
                continue;
            }

            if let Some(name) = key.strip_prefix("add_source_") {
                submission.edit(name).learn_source = !value.is_empty();
            } else if let Some(name) = key.strip_prefix("add_description_") {
                submission.edit(name).learn_description = !value.is_empty();
            } else if let Some(name) = key.strip_prefix("date_") {
                submission.edit(name).date = Some(value.clone());
            } else if let Some(name) = key.strip_prefix("source_") {
                submission.edit(name).source = Some(value.clone());
            } else if let Some(name) = key.strip_prefix("destination_") {
                submission.edit(name).destination = Some(value.clone());
            } else if let Some(name) = key.strip_prefix("description_") {
                submission.edit(name).description = Some(value.clone());
            } else if let Some(name) = key.strip_prefix("classification_") {
                submission.edit(name).classification = Some(value.clone());
            } else {
                debug!("Ignoring unknown form field: {}", key);
            }
        }

        submission
    }

    fn edit(&mut self, filename: &str) -> &mut EntryEdit {
        self.edits.entry(filename.to_string()).or_default()
    }
}

/// Field values after applying edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedFields {
    pub date: String,
    pub source: String,
    pub destination: String,
    pub description: String,
    pub classification: String,
}

impl ConfirmedFields {
    /// Merge a queued result with the reviewer's edit
    pub fn resolve(queued: &ClassificationResult, edit: Option<&EntryEdit>, fallback: EditFallback) -> Self {
        let pick = |edited: Option<&String>, original: &str| match (edited, fallback) {
            (Some(value), _) => value.clone(),
            (None, EditFallback::Classified) => original.to_string(),
            (None, EditFallback::Empty) => String::new(),
        };

        Self {
            date: pick(edit.and_then(|e| e.date.as_ref()), &queued.date),
            source: pick(edit.and_then(|e| e.source.as_ref()), &queued.source),
            destination: pick(edit.and_then(|e| e.destination.as_ref()), &queued.destination),
            description: pick(edit.and_then(|e| e.description.as_ref()), &queued.description),
            classification: pick(edit.and_then(|e| e.classification.as_ref()), &queued.classification),
        }
    }

    pub fn output_filename(&self) -> String {
        output_filename(&self.date, &self.source, &self.destination, &self.description)
    }
}

/// One document moved through the output and archive folders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiledDocument {
    pub filename: String,
    pub output_path: PathBuf,
    pub archived_path: PathBuf,
}

/// Outcome of a confirmation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmReport {
    pub batch_id: Uuid,
    /// Shared by every document of the run; `None` when nothing was filed
    pub archive_dir: Option<PathBuf>,
    pub filed: Vec<FiledDocument>,
    pub learned_sources: Vec<String>,
    pub learned_descriptions: Vec<String>,
}

/// Applies reviewed classifications to the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmationProcessor {
    workflow: WorkflowConfig,
}

impl ConfirmationProcessor {
    pub fn new(workflow: WorkflowConfig) -> Self {
        Self { workflow }
    }

    /// File every queued document, then save vocabulary and clear the batch
    pub fn confirm(
        &self,
        intake: &Path,
        output: &Path,
        batch: &mut ReviewBatch,
        submission: &ConfirmSubmission,
    ) -> Result<ConfirmReport> {
        if let Some(submitted) = submission.batch_id {
            if submitted != batch.id {
                return Err(ArchivistError::StaleBatch { expected: batch.id, submitted });
            }
        }

        let mut report = ConfirmReport {
            batch_id: batch.id,
            archive_dir: None,
            filed: Vec::new(),
            learned_sources: Vec::new(),
            learned_descriptions: Vec::new(),
        };

        if batch.is_empty() {
            debug!("Nothing to confirm in batch {}", batch.id);
            return Ok(report);
        }

        let mut vocabulary = VocabularyData::load(intake)?;
        let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let archive_dir = intake.join(ARCHIVE_DIR).join(&timestamp);
        let ledger = FilingLog::in_intake(intake);
        report.archive_dir = Some(archive_dir.clone());

        info!("Confirming {} documents (batch {})", batch.len(), batch.id);

        for queued in &batch.results {
            let edit = submission.edits.get(&queued.filename);
            let fields = ConfirmedFields::resolve(queued, edit, self.workflow.edit_fallback);
            check_folder_name(&queued.filename, &fields.classification)?;

            if edit.is_some_and(|e| e.learn_source) {
                let value = match self.workflow.learn_source_field {
                    LearnSourceField::Source => &fields.source,
                    LearnSourceField::Destination => &fields.destination,
                };
                if vocabulary.learn_source(value) {
                    report.learned_sources.push(value.clone());
                }
            }

            if edit.is_some_and(|e| e.learn_description)
                && vocabulary.learn_description(&fields.description)
            {
                report.learned_descriptions.push(fields.description.clone());
            }

            let original = intake.join(&queued.filename);
            let file_hash = calculate_file_hash(&original)?;

            let dest_dir = output.join(&fields.classification);
            std::fs::create_dir_all(&dest_dir)?;
            let output_path = dest_dir.join(fields.output_filename());
            if output_path.exists() {
                warn!("Overwriting existing output {:?}", output_path);
            }
            std::fs::copy(&original, &output_path)?;
            info!("Filed {} as {:?}", queued.filename, output_path);

            std::fs::create_dir_all(&archive_dir)?;
            let archived_path = archive_dir.join(&queued.filename);
            move_file(&original, &archived_path)?;
            debug!("Archived {} to {:?}", queued.filename, archived_path);

            ledger.append(&FilingEntry {
                id: Uuid::new_v4().to_string(),
                batch_id: batch.id,
                timestamp: Utc::now(),
                original_path: original,
                archived_path: archived_path.clone(),
                output_path: output_path.clone(),
                classification: fields.classification.clone(),
                file_hash,
            })?;

            report.filed.push(FiledDocument {
                filename: queued.filename.clone(),
                output_path,
                archived_path,
            });
        }

        vocabulary.save(intake)?;
        batch.clear();

        info!(
            "Batch {} confirmed: {} filed, {} sources and {} descriptions learned",
            report.batch_id,
            report.filed.len(),
            report.learned_sources.len(),
            report.learned_descriptions.len()
        );
        Ok(report)
    }
}

// The classification becomes a single folder under the output root
fn check_folder_name(filename: &str, classification: &str) -> Result<()> {
    let valid = !classification.is_empty()
        && classification != "."
        && classification != ".."
        && !classification.contains(['/', '\\']);

    if valid {
        Ok(())
    } else {
        Err(ArchivistError::InvalidField {
            filename: filename.to_string(),
            field: "classification",
            value: classification.to_string(),
        })
    }
}

/// Rename, falling back to copy and delete across filesystems
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)?;
    Ok(())
}
