use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::document::DocumentTree;
use crate::errors::AppError;
use crate::pagination::{paginate, render_pages, PageFragment, PaginateError, PaginationOutcome};
use crate::resume::model::ResumeData;
use crate::resume::templates::Template;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub resume: ResumeData,
    #[serde(default)]
    pub template: String,
}

impl PreviewRequest {
    fn into_tree(self) -> (Template, DocumentTree) {
        let template = Template::from_name(&self.template);
        let tree = template.render(&self.resume);
        (template, tree)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginateResponse {
    pub template: Template,
    pub pages: Vec<PageFragment>,
    pub class_list: String,
    pub block_count: usize,
    pub measurements: usize,
    /// All pages rendered as fixed-size, clipped A4 sheets.
    pub html: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// 0 until the first pass completes.
    pub generation: u64,
    pub pages: Vec<PageFragment>,
    pub completed_at: Option<DateTime<Utc>>,
    /// The rendered pages, or the placeholder page when there are none.
    pub html: String,
}

/// POST /api/v1/preview/paginate
pub async fn handle_paginate(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<PaginateResponse>, AppError> {
    let (template, tree) = req.into_tree();
    let config = state.pagination.clone();
    let probes = state.probes.clone();

    // CPU-bound pass; keep it off the async executor.
    let outcome = tokio::task::spawn_blocking(move || -> Result<PaginationOutcome, PaginateError> {
        let mut probe = probes.create()?;
        paginate(&tree, &config, probe.as_mut())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pagination: {e}")))??;

    let html = render_pages(&outcome.fragments, &outcome.class_list, &state.pagination.format);
    Ok(Json(PaginateResponse {
        template,
        pages: outcome.fragments,
        class_list: outcome.class_list,
        block_count: outcome.block_count,
        measurements: outcome.measurements,
        html,
    }))
}

/// PUT /api/v1/preview/draft
pub async fn handle_submit_draft(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (template, tree) = req.into_tree();
    state
        .preview
        .submit(tree)
        .map_err(|e| AppError::Unavailable(e.to_string()))?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "scheduled", "template": template })),
    ))
}

/// Longest a preview request waits for a newer page set.
const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(25);

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    /// Wait until a generation newer than this one is published.
    pub after: Option<u64>,
}

/// GET /api/v1/preview
/// With `?after=N`, holds the request until generation N+1 or later is published
/// (or the long-poll timeout passes, returning the current pages).
pub async fn handle_get_preview(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Json<PreviewResponse> {
    if let Some(after) = query.after {
        let mut pages = state.preview.subscribe();
        let newer = async {
            loop {
                let generation = pages.borrow().generation;
                if generation > after || pages.changed().await.is_err() {
                    break;
                }
            }
        };
        // A timeout just answers with the current pages.
        let _ = tokio::time::timeout(LONG_POLL_TIMEOUT, newer).await;
    }
    let pages = state.preview.latest();
    let html = render_pages(&pages.fragments, &pages.class_list, &state.pagination.format);
    Json(PreviewResponse {
        generation: pages.generation,
        pages: pages.fragments.clone(),
        completed_at: pages.completed_at,
        html,
    })
}
