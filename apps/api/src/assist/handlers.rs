use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assist::import::{read_upload, UploadedDocument};
use crate::assist::Assistant;
use crate::errors::AppError;
use crate::resume::model::ResumeData;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub text: String,
    pub instruction: String,
}

#[derive(Debug, Serialize)]
pub struct RefineResponse {
    pub text: String,
}

fn assistant(state: &AppState) -> Result<Arc<dyn Assistant>, AppError> {
    state
        .assistant
        .clone()
        .ok_or_else(|| AppError::Unavailable("AI assistance is not configured".to_string()))
}

/// POST /api/v1/ai/refine
pub async fn handle_refine(
    State(state): State<AppState>,
    Json(req): Json<RefineRequest>,
) -> Result<Json<RefineResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    if req.instruction.trim().is_empty() {
        return Err(AppError::Validation("instruction must not be empty".to_string()));
    }
    let assistant = assistant(&state)?;
    let text = assistant.refine(&req.text, &req.instruction).await?;
    Ok(Json(RefineResponse { text }))
}

/// POST /api/v1/ai/import
/// Multipart upload with a single `file` field (PDF, plain text, PNG or JPEG).
pub async fn handle_import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeData>, AppError> {
    let assistant = assistant(&state)?;

    let mut upload: Option<(Option<String>, Option<String>, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        upload = Some((file_name, content_type, bytes));
        break;
    }
    let (file_name, content_type, bytes) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    info!(
        file = file_name.as_deref().unwrap_or("-"),
        bytes = bytes.len(),
        "importing resume document"
    );

    let document = tokio::task::spawn_blocking(move || {
        read_upload(file_name.as_deref(), content_type.as_deref(), &bytes)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in import: {e}")))??;

    let resume = match document {
        UploadedDocument::Text(text) => assistant.extract_resume(&text).await?,
        UploadedDocument::Image { format, data } => {
            assistant
                .extract_resume_from_image(format.media_type(), &data)
                .await?
        }
    };
    if resume.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No resume content could be found in the document".to_string(),
        ));
    }
    Ok(Json(resume))
}
