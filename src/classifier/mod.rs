// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Classification service abstraction and prompt construction

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::IntakeConfig;
use crate::vocabulary::Vocabulary;
use crate::Result;

pub use openai::OpenAiClassifier;

/// Structured metadata inferred for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Expected as `YYYYMMDD`
    pub date: String,
    pub source: String,
    pub destination: String,
    pub description: String,
    pub classification: String,
}

/// A service that turns document text into a [`Classification`]
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Classify already-truncated document text against a closed vocabulary
    async fn classify(&self, text: &str, vocabulary: &Vocabulary) -> Result<Classification>;
}

/// Builds a classifier once the intake configuration is known
pub trait ClassifierProvider: Send + Sync {
    fn connect(&self, config: &IntakeConfig) -> Result<Box<dyn Classifier>>;
}

/// Provider for the OpenAI chat completions service
pub struct OpenAiProvider;

impl ClassifierProvider for OpenAiProvider {
    fn connect(&self, config: &IntakeConfig) -> Result<Box<dyn Classifier>> {
        Ok(Box::new(OpenAiClassifier::new(config)?))
    }
}

/// System prompt listing the candidate vocabulary
pub fn system_prompt(vocabulary: &Vocabulary) -> String {
    let destinations = vocabulary.destinations.join(", ");
    let classifications = vocabulary.classifications.join(", ");
    let descriptions = vocabulary.description_suggestions.join(", ");
    let sources = vocabulary.sources.join(", ");

    format!(
        r#"Act as a document management agent that is responsible for classifying documents at home.
Names of a person should always be put in this order, the first name then the last name.
Possible destinations are: "{destinations}".
Possible classifications are: "{classifications}".
If the content of the document matches the following description suggestions please use the same format: {descriptions}.
Sources is normally a company or other entity that is the origin of the document. Examples are {sources}.
Sources should never be a name from this list: {destinations}. It is better to leave the source blank than to use a name from the destination list.
The date is the date of the document in the format YYYYMMDD.

Here is an example of an output:
{{
 "date": "20240523",
 "source": "Dr. Jerry Brandt",
 "destination": "David Ney",
 "description": "Ordonnance médicale pour kinésithérapie",
 "classification": "Gesundheit"
}}"#
    )
}

/// User prompt wrapping the document text
pub fn user_prompt(text: &str) -> String {
    format!("DOCUMENT: {}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_lists_vocabulary() {
        let vocab = Vocabulary {
            sources: vec!["Acme Corp".into(), "City Hall".into()],
            destinations: vec!["Jane Doe".into()],
            classifications: vec!["Utilities".into(), "Health".into()],
            description_suggestions: vec!["Electric bill".into()],
        };

        let prompt = system_prompt(&vocab);
        assert!(prompt.contains("Examples are Acme Corp, City Hall."));
        assert!(prompt.contains(r#"Possible destinations are: "Jane Doe"."#));
        assert!(prompt.contains(r#"Possible classifications are: "Utilities, Health"."#));
        assert!(prompt.contains("please use the same format: Electric bill."));
        assert!(prompt.contains(r#""date": "20240523""#));
    }

    #[test]
    fn user_prompt_carries_text() {
        assert_eq!(user_prompt("hello"), "DOCUMENT: hello");
    }
}
