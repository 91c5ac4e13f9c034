// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Classification runs over the intake folder

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::classifier::{Classification, Classifier, ClassifierProvider, OpenAiProvider};
use crate::config::{FailurePolicy, IntakeConfig};
use crate::extract::{is_document, truncate_chars, PdfTextExtractor, TextExtractor};
use crate::queue::{ClassificationResult, ReviewBatch};
use crate::vocabulary::{Vocabulary, VocabularyData};
use crate::Result;

/// Outcome of a classification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub classified: usize,
    pub failed: usize,
}

/// Extracts, classifies and queues every document in an intake folder
#[derive(Clone)]
pub struct ClassificationOrchestrator {
    extractor: Arc<dyn TextExtractor>,
    provider: Arc<dyn ClassifierProvider>,
    policy: FailurePolicy,
}

impl ClassificationOrchestrator {
    /// PDF extraction and the OpenAI service
    pub fn new(policy: FailurePolicy) -> Self {
        Self::with_collaborators(Arc::new(PdfTextExtractor::new()), Arc::new(OpenAiProvider), policy)
    }

    pub fn with_collaborators(
        extractor: Arc<dyn TextExtractor>,
        provider: Arc<dyn ClassifierProvider>,
        policy: FailurePolicy,
    ) -> Self {
        Self { extractor, provider, policy }
    }

    /// Classify the intake folder into `batch`, replacing whatever it held.
    ///
    /// A missing config fails before the batch is touched. Under
    /// [`FailurePolicy::FailFast`] a document failure is returned as-is and
    /// the batch keeps the results gathered before it.
    pub async fn run_batch(&self, intake: &Path, batch: &mut ReviewBatch) -> Result<BatchSummary> {
        let config = IntakeConfig::load(intake)?;
        let learned = VocabularyData::load(intake)?;
        let vocabulary = Vocabulary::merge(&config, &learned);
        let classifier = self.provider.connect(&config)?;

        batch.reset();

        let documents = list_documents(intake)?;
        info!(
            "Classifying {} documents with {} (batch {})",
            documents.len(),
            classifier.name(),
            batch.id
        );

        for path in documents {
            let filename = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    warn!("Skipping document with non UTF-8 name: {:?}", path);
                    continue;
                }
            };

            let outcome = self
                .classify_document(&path, &config, &vocabulary, classifier.as_ref())
                .await;

            match outcome {
                Ok(result) => {
                    info!(
                        "{}: {} / {} / {} / {}",
                        filename, result.date, result.source, result.destination, result.classification
                    );
                    batch.push(ClassificationResult::new(filename, result));
                }
                Err(e) => match self.policy {
                    FailurePolicy::FailFast => {
                        error!("Classification of {} failed, aborting batch: {}", filename, e);
                        return Err(e);
                    }
                    FailurePolicy::Isolate => {
                        warn!("Classification of {} failed: {}", filename, e);
                        batch.push_failure(filename, e);
                    }
                },
            }
        }

        Ok(BatchSummary {
            batch_id: batch.id,
            classified: batch.len(),
            failed: batch.failures.len(),
        })
    }

    async fn classify_document(
        &self,
        path: &Path,
        config: &IntakeConfig,
        vocabulary: &Vocabulary,
        classifier: &dyn Classifier,
    ) -> Result<Classification> {
        let text = self.extractor.extract(path)?;
        let prefix = truncate_chars(&text, config.max_text_chars);
        classifier.classify(prefix, vocabulary).await
    }
}

/// Top-level documents of the intake folder, sorted by name
pub fn list_documents(intake: &Path) -> Result<Vec<PathBuf>> {
    let mut documents: Vec<PathBuf> = std::fs::read_dir(intake)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", intake, e);
                None
            }
        })
        .filter(|p| is_document(p))
        .collect();
    documents.sort();
    Ok(documents)
}
