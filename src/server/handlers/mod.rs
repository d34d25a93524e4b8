use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::error::ApiError;
use crate::RagError;
use crate::pipeline::RagPipeline;

const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RagPipeline>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub filename: String,
    pub chunks: usize,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("Uploaded file has no filename"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ApiError::bad_request("Missing file field in upload"))?;
    debug!("Received upload {} ({} bytes)", filename, bytes.len());

    let pipeline = Arc::clone(&state.pipeline);
    let outcome = tokio::task::spawn_blocking(move || pipeline.upload(&filename, &bytes))
        .await
        .map_err(|e| ApiError::internal(format!("Upload task failed: {}", e)))??;

    info!("Indexed {} ({} chunks)", outcome.filename, outcome.chunks);
    Ok(Json(UploadResponse {
        status: "indexed",
        filename: outcome.filename,
        chunks: outcome.chunks,
    }))
}

pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let question = request
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing question"))?;

    let pipeline = Arc::clone(&state.pipeline);
    let result = tokio::task::spawn_blocking(move || pipeline.ask(&question))
        .await
        .map_err(|e| ApiError::internal(format!("Ask task failed: {}", e)))?;

    match result {
        Ok(answer) => Ok(Json(AskResponse {
            question: answer.question,
            answer: answer.answer,
        })
        .into_response()),
        Err(err @ RagError::NoDocumentsIndexed) => {
            Ok(Json(json!({ "error": err.to_string() })).into_response())
        }
        Err(err) => Err(err.into()),
    }
}
