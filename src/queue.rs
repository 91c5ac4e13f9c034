// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Review queue holding one batch of classifications awaiting confirmation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::Classification;

/// Classification of one intake document, editable until confirmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Intake file name, unique within a batch
    pub filename: String,
    pub date: String,
    pub source: String,
    pub destination: String,
    pub description: String,
    pub classification: String,
}

impl ClassificationResult {
    pub fn new(filename: impl Into<String>, c: Classification) -> Self {
        Self {
            filename: filename.into(),
            date: c.date,
            source: c.source,
            destination: c.destination,
            description: c.description,
            classification: c.classification,
        }
    }
}

/// A document that could not be classified under the isolate policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub filename: String,
    pub error: String,
}

/// One batch: produced by a classification run, consumed by a confirmation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewBatch {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub results: Vec<ClassificationResult>,
    #[serde(default)]
    pub failures: Vec<DocumentFailure>,
}

impl ReviewBatch {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Discard everything and start a new batch under a fresh id
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Drop pending results once they have been filed
    pub fn clear(&mut self) {
        self.results.clear();
        self.failures.clear();
    }

    pub fn push(&mut self, result: ClassificationResult) {
        self.results.push(result);
    }

    pub fn push_failure(&mut self, filename: impl Into<String>, error: impl ToString) {
        self.failures.push(DocumentFailure {
            filename: filename.into(),
            error: error.to_string(),
        });
    }

    pub fn get(&self, filename: &str) -> Option<&ClassificationResult> {
        self.results.iter().find(|r| r.filename == filename)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl Default for ReviewBatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str) -> ClassificationResult {
        ClassificationResult::new(name, Classification {
            date: "20240101".into(),
            ..Default::default()
        })
    }

    #[test]
    fn reset_replaces_contents_and_id() {
        let mut batch = ReviewBatch::new();
        let first_id = batch.id;
        batch.push(result("a.pdf"));
        batch.push_failure("b.pdf", "boom");

        batch.reset();

        assert!(batch.is_empty());
        assert!(batch.failures.is_empty());
        assert_ne!(batch.id, first_id);
    }

    #[test]
    fn clear_keeps_id() {
        let mut batch = ReviewBatch::new();
        let id = batch.id;
        batch.push(result("a.pdf"));
        batch.clear();
        assert!(batch.is_empty());
        assert_eq!(batch.id, id);
    }

    #[test]
    fn results_keep_insertion_order() {
        let mut batch = ReviewBatch::new();
        batch.push(result("b.pdf"));
        batch.push(result("a.pdf"));

        let names: Vec<_> = batch.results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "a.pdf"]);
        assert_eq!(batch.get("a.pdf").unwrap().date, "20240101");
        assert!(batch.get("c.pdf").is_none());
    }
}
