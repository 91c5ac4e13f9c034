// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! In-memory collaborators for tests

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::classifier::{Classification, Classifier, ClassifierProvider};
use crate::config::IntakeConfig;
use crate::extract::TextExtractor;
use crate::vocabulary::Vocabulary;
use crate::{ArchivistError, Result};

/// Treats documents as plain text; text starting with `UNREADABLE` fails
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let text = std::fs::read_to_string(path)?;
        if text.starts_with("UNREADABLE") {
            return Err(ArchivistError::Extraction {
                file: path.display().to_string(),
                message: "unreadable".to_string(),
            });
        }
        Ok(text)
    }
}

/// Returns a fixed classification; text containing `SERVICE_DOWN` fails
#[derive(Clone, Default)]
pub struct FakeClassifier {
    pub answer: Classification,
    pub seen_texts: Arc<Mutex<Vec<String>>>,
    pub seen_vocabulary: Arc<Mutex<Option<Vocabulary>>>,
}

impl FakeClassifier {
    pub fn answering(answer: Classification) -> Self {
        Self {
            answer,
            ..Default::default()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.seen_texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    fn name(&self) -> &str {
        "fake"
    }

    async fn classify(&self, text: &str, vocabulary: &Vocabulary) -> Result<Classification> {
        self.seen_texts.lock().unwrap().push(text.to_string());
        *self.seen_vocabulary.lock().unwrap() = Some(vocabulary.clone());
        if text.contains("SERVICE_DOWN") {
            return Err(ArchivistError::Classification("service down".to_string()));
        }
        Ok(self.answer.clone())
    }
}

impl ClassifierProvider for FakeClassifier {
    fn connect(&self, _config: &IntakeConfig) -> Result<Box<dyn Classifier>> {
        Ok(Box::new(self.clone()))
    }
}

pub fn electric_bill() -> Classification {
    Classification {
        date: "20240101".into(),
        source: "Acme Corp".into(),
        destination: "Jane Doe".into(),
        description: "Electric bill".into(),
        classification: "Utilities".into(),
    }
}

/// Intake folder with a valid config.json, plus an empty output folder
pub struct Workspace {
    _dir: TempDir,
    pub intake: std::path::PathBuf,
    pub output: std::path::PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let intake = dir.path().join("input");
        let output = dir.path().join("output");
        std::fs::create_dir_all(&intake).unwrap();
        std::fs::create_dir_all(&output).unwrap();

        let mut config = IntakeConfig::template();
        config.sources = vec!["Acme Corp".into()];
        config.destinations = vec!["Jane Doe".into()];
        config.classifications = vec!["Utilities".into()];
        config.save(&intake).unwrap();

        Self { _dir: dir, intake, output }
    }

    /// Workspace whose intake folder has no config.json
    pub fn without_config() -> Self {
        let ws = Self::new();
        std::fs::remove_file(ws.intake.join("config.json")).unwrap();
        ws
    }

    pub fn add_document(&self, name: &str, text: &str) {
        std::fs::write(self.intake.join(name), text).unwrap();
    }
}
