pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::assist::handlers as assist;
use crate::pagination::handlers as preview;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Preview
        .route("/api/v1/preview", get(preview::handle_get_preview))
        .route("/api/v1/preview/paginate", post(preview::handle_paginate))
        .route("/api/v1/preview/draft", put(preview::handle_submit_draft))
        // Resume files and printing
        .route("/api/v1/resume/import", post(resume::handle_import))
        .route("/api/v1/resume/export", post(resume::handle_export))
        .route("/api/v1/resume/print", post(resume::handle_print))
        // AI assistance
        .route("/api/v1/ai/refine", post(assist::handle_refine))
        .route("/api/v1/ai/import", post(assist::handle_import))
        .with_state(state)
}
