// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI for reviewing and confirming classifications

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use minijinja::{context, Environment};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{AppConfig, IntakeConfig};
use crate::confirm::{ConfirmReport, ConfirmSubmission, ConfirmationProcessor};
use crate::orchestrator::{BatchSummary, ClassificationOrchestrator};
use crate::queue::ReviewBatch;
use crate::vocabulary::{Vocabulary, VocabularyData};
use crate::ArchivistError;

const REVIEW_TEMPLATE: &str = "review.html";

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub orchestrator: ClassificationOrchestrator,
    pub processor: ConfirmationProcessor,
    /// The single pending batch; the lock serializes classify and confirm runs
    pub batch: Mutex<ReviewBatch>,
    templates: Environment<'static>,
}

impl AppState {
    pub fn new(config: AppConfig, orchestrator: ClassificationOrchestrator) -> crate::Result<Self> {
        let mut templates = Environment::new();
        templates.add_template(REVIEW_TEMPLATE, include_str!("templates/review.html"))?;

        Ok(Self {
            processor: ConfirmationProcessor::new(config.workflow),
            config,
            orchestrator,
            batch: Mutex::new(ReviewBatch::new()),
            templates,
        })
    }

    async fn classify(&self) -> crate::Result<BatchSummary> {
        let mut batch = self.batch.lock().await;
        self.orchestrator.run_batch(&self.config.intake_dir, &mut batch).await
    }

    async fn confirm(&self, submission: &ConfirmSubmission) -> crate::Result<ConfirmReport> {
        let mut batch = self.batch.lock().await;
        self.processor
            .confirm(&self.config.intake_dir, &self.config.output_dir, &mut batch, submission)
    }

    // Vocabulary for the page's suggestion lists; empty until config.json exists
    fn vocabulary(&self) -> Vocabulary {
        let intake = &self.config.intake_dir;
        match (IntakeConfig::load(intake), VocabularyData::load(intake)) {
            (Ok(config), Ok(learned)) => Vocabulary::merge(&config, &learned),
            _ => Vocabulary::default(),
        }
    }
}

/// Error response carrying the underlying failure
pub struct WebError(ArchivistError);

impl From<ArchivistError> for WebError {
    fn from(e: ArchivistError) -> Self {
        Self(e)
    }
}

impl WebError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ArchivistError::ConfigMissing(_)
            | ArchivistError::Config(_)
            | ArchivistError::InvalidField { .. } => StatusCode::BAD_REQUEST,
            ArchivistError::StaleBatch { .. } => StatusCode::CONFLICT,
            ArchivistError::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            e if e.is_service_failure() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!("Request failed ({}): {}", status, self.0);
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

type WebResult<T> = std::result::Result<T, WebError>;

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(review_page))
        .route("/classify", post(classify_form))
        .route("/confirm", post(confirm_form))
        // API endpoints
        .route("/api/results", get(api_get_results))
        .route("/api/classify", post(api_classify))
        .route("/api/confirm", post(api_confirm))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Page Handlers ===

async fn review_page(State(state): State<Arc<AppState>>) -> WebResult<Html<String>> {
    let vocabulary = state.vocabulary();
    let batch = state.batch.lock().await;

    let template = state.templates.get_template(REVIEW_TEMPLATE).map_err(ArchivistError::from)?;
    let html = template
        .render(context! {
            batch => &*batch,
            vocabulary => context! {
                sources => vocabulary.sources,
                destinations => vocabulary.destinations,
                classifications => vocabulary.classifications,
                description_suggestions => vocabulary.description_suggestions,
            },
        })
        .map_err(ArchivistError::from)?;

    Ok(Html(html))
}

async fn classify_form(State(state): State<Arc<AppState>>) -> WebResult<Redirect> {
    let summary = state.classify().await?;
    info!("Batch {} ready: {} classified, {} failed", summary.batch_id, summary.classified, summary.failed);
    Ok(Redirect::to("/"))
}

async fn confirm_form(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> WebResult<Redirect> {
    let submission = ConfirmSubmission::from_form(&fields);
    state.confirm(&submission).await?;
    Ok(Redirect::to("/"))
}

// === API Handlers ===

async fn api_get_results(State(state): State<Arc<AppState>>) -> Json<ReviewBatch> {
    let batch = state.batch.lock().await;
    Json(batch.clone())
}

async fn api_classify(State(state): State<Arc<AppState>>) -> WebResult<Json<BatchSummary>> {
    Ok(Json(state.classify().await?))
}

async fn api_confirm(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<ConfirmSubmission>,
) -> WebResult<Json<ConfirmReport>> {
    Ok(Json(state.confirm(&submission).await?))
}

/// Start the web server
pub async fn start_server(config: AppConfig) -> crate::Result<()> {
    let orchestrator = ClassificationOrchestrator::new(config.workflow.failure_policy);
    let state = Arc::new(AppState::new(config.clone(), orchestrator)?);

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Review UI available at http://{}", addr);
    info!("Intake: {:?}, output: {:?}", config.intake_dir, config.output_dir);

    let router = create_router(state);
    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{electric_bill, FakeClassifier, PlainTextExtractor, Workspace};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn state_for(ws: &Workspace) -> Arc<AppState> {
        let config = AppConfig {
            intake_dir: ws.intake.clone(),
            output_dir: ws.output.clone(),
            ..Default::default()
        };
        let orchestrator = ClassificationOrchestrator::with_collaborators(
            Arc::new(PlainTextExtractor),
            Arc::new(FakeClassifier::answering(electric_bill())),
            config.workflow.failure_policy,
        );
        Arc::new(AppState::new(config, orchestrator).unwrap())
    }

    async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, String) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn post(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn results_start_empty() {
        let ws = Workspace::new();
        let state = state_for(&ws);

        let (status, body) = send(&state, Request::get("/api/results").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        let batch: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(batch["results"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn classify_then_review_page_lists_document() {
        let ws = Workspace::new();
        ws.add_document("invoice1.pdf", "electricity");
        let state = state_for(&ws);

        let (status, body) = send(&state, post("/api/classify")).await;
        assert_eq!(status, StatusCode::OK);
        let summary: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary["classified"], 1);

        let (status, page) = send(&state, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("date_invoice1.pdf"));
        assert!(page.contains("Electric bill"));
        assert!(page.contains(&state.batch.lock().await.id.to_string()));
    }

    #[tokio::test]
    async fn classify_form_redirects() {
        let ws = Workspace::new();
        ws.add_document("a.pdf", "text");
        let state = state_for(&ws);

        let response = create_router(state.clone()).oneshot(post("/classify")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(state.batch.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn confirm_form_files_documents() {
        let ws = Workspace::new();
        ws.add_document("invoice1.pdf", "electricity");
        let state = state_for(&ws);
        send(&state, post("/api/classify")).await;

        let batch_id = state.batch.lock().await.id;
        let form = format!(
            "batch_id={}&date_invoice1.pdf=20240101&source_invoice1.pdf=Acme+Corp\
             &destination_invoice1.pdf=Jane+Doe&description_invoice1.pdf=Electric+bill\
             &classification_invoice1.pdf=Utilities&add_source_invoice1.pdf=on",
            batch_id
        );
        let request = Request::post("/confirm")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();

        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        assert!(ws
            .output
            .join("Utilities/20240101-Acme_Corp-Jane_Doe-Electric_bill.pdf")
            .exists());
        assert!(!ws.intake.join("invoice1.pdf").exists());
        assert!(state.batch.lock().await.is_empty());
        assert_eq!(
            VocabularyData::load(&ws.intake).unwrap().additional_sources,
            vec!["Acme Corp"]
        );
    }

    #[tokio::test]
    async fn stale_confirm_is_a_conflict() {
        let ws = Workspace::new();
        ws.add_document("a.pdf", "text");
        let state = state_for(&ws);
        send(&state, post("/api/classify")).await;

        let body = serde_json::json!({ "batch_id": uuid::Uuid::new_v4(), "edits": {} }).to_string();
        let request = Request::post("/api/confirm")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("error"));
        assert_eq!(state.batch.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_config_is_a_bad_request() {
        let ws = Workspace::without_config();
        let state = state_for(&ws);

        let (status, body) = send(&state, post("/api/classify")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("config.json"));
    }

    #[tokio::test]
    async fn api_confirm_returns_report() {
        let ws = Workspace::new();
        ws.add_document("a.pdf", "text");
        let state = state_for(&ws);
        send(&state, post("/api/classify")).await;

        let request = Request::post("/api/confirm")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"edits": {"a.pdf": {"learn_description": true}}}"#))
            .unwrap();

        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        let report: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(report["filed"].as_array().unwrap().len(), 1);
        assert_eq!(report["learned_descriptions"][0], "Electric bill");
    }
}
