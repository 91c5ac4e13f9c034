// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! OpenAI chat completions client with structured output

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{system_prompt, user_prompt, Classification, Classifier};
use crate::config::IntakeConfig;
use crate::vocabulary::Vocabulary;
use crate::{ArchivistError, Result};

/// OpenAI classification client
pub struct OpenAiClassifier {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: Value,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiClassifier {
    /// Create a new client from the intake configuration
    pub fn new(config: &IntakeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Check that the service is reachable and accepts the credential
    pub async fn health_check(&self) -> Result<()> {
        let url = self.models_url();

        let response = self.client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ArchivistError::Classification(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        Ok(())
    }

    /// Model used for classification
    pub fn model(&self) -> &str {
        &self.model
    }

    fn models_url(&self) -> String {
        match self.api_url.find("/chat/completions") {
            Some(idx) => format!("{}/models", &self.api_url[..idx]),
            None => format!("{}/models", self.api_url),
        }
    }
}

/// Strict JSON schema for the five classification fields
fn response_format() -> Value {
    let field = json!({ "type": "string" });
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "DocumentClassificationResponse",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "date": field,
                    "source": field,
                    "destination": field,
                    "description": field,
                    "classification": field,
                },
                "required": ["date", "source", "destination", "description", "classification"],
                "additionalProperties": false,
            }
        }
    })
}

fn parse_response(body: &str) -> Result<Classification> {
    let response: ChatResponse = serde_json::from_str(body)?;

    let message = response.choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| ArchivistError::Classification("Response contained no choices".to_string()))?;

    if let Some(refusal) = message.refusal {
        return Err(ArchivistError::Classification(format!("Model refused: {}", refusal)));
    }

    let content = message.content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ArchivistError::Classification("Response contained no content".to_string()))?;

    serde_json::from_str(&content).map_err(|e| {
        ArchivistError::Classification(format!("Malformed classification record: {}", e))
    })
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    async fn classify(&self, text: &str, vocabulary: &Vocabulary) -> Result<Classification> {
        let system = system_prompt(vocabulary);
        let user = user_prompt(text);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &system },
                ChatMessage { role: "user", content: &user },
            ],
            response_format: response_format(),
        };

        debug!("Sending classification request: model={}", self.model);

        let response = self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ArchivistError::Classification(format!(
                "Service returned status {}: {}",
                status, body
            )));
        }

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(api_url: &str) -> OpenAiClassifier {
        let mut config = IntakeConfig::template();
        config.api_url = api_url.to_string();
        OpenAiClassifier::new(&config).unwrap()
    }

    #[test]
    fn parses_structured_content() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": r#"{"date":"20240101","source":"Acme Corp","destination":"Jane Doe","description":"Electric bill","classification":"Utilities"}"#
                }
            }]
        })
        .to_string();

        let result = parse_response(&body).unwrap();
        assert_eq!(result.source, "Acme Corp");
        assert_eq!(result.classification, "Utilities");
    }

    #[test]
    fn refusal_is_a_classification_error() {
        let body = json!({
            "choices": [{ "message": { "content": null, "refusal": "no" } }]
        })
        .to_string();

        assert!(matches!(parse_response(&body), Err(ArchivistError::Classification(_))));
    }

    #[test]
    fn missing_field_is_a_classification_error() {
        let body = json!({
            "choices": [{ "message": { "content": r#"{"date":"20240101"}"# } }]
        })
        .to_string();

        assert!(matches!(parse_response(&body), Err(ArchivistError::Classification(_))));
    }

    #[test]
    fn empty_choices_is_an_error() {
        assert!(parse_response(r#"{"choices": []}"#).is_err());
    }

    #[test]
    fn schema_requires_every_field() {
        let format = response_format();
        let required = format["json_schema"]["schema"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 5);
        assert_eq!(format["json_schema"]["strict"], true);
    }

    #[test]
    fn models_url_derives_from_completions_url() {
        let c = classifier("https://api.openai.com/v1/chat/completions/");
        assert_eq!(c.models_url(), "https://api.openai.com/v1/models");

        let c = classifier("http://localhost:8080/v1");
        assert_eq!(c.models_url(), "http://localhost:8080/v1/models");
    }
}
