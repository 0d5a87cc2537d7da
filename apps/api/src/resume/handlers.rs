use axum::{
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::resume::model::{parse_resume_json, ResumeData};
use crate::resume::print::{render_print_document, PrintOptions};
use crate::resume::templates::Template;

#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    pub resume: ResumeData,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub options: PrintOptions,
}

/// POST /api/v1/resume/import
/// Body is the raw text of an exported resume file.
pub async fn handle_import(body: String) -> Result<Json<ResumeData>, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::Validation("Request body is empty".to_string()));
    }
    Ok(Json(parse_resume_json(&body)?))
}

/// POST /api/v1/resume/export
pub async fn handle_export(Json(resume): Json<ResumeData>) -> Result<impl IntoResponse, AppError> {
    let body = serde_json::to_string_pretty(&resume.normalize())
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"resume.json\""),
        ],
        body,
    ))
}

/// POST /api/v1/resume/print
pub async fn handle_print(Json(req): Json<PrintRequest>) -> Html<String> {
    let template = Template::from_name(&req.template);
    Html(render_print_document(&req.resume, template, &req.options))
}
