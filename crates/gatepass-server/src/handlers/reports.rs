// ── Read-only endpoints: listings, lookups, statistics, health ──

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use gatepass_core::{Attendee, Token, TokenStats};

use crate::error::ApiError;
use crate::state::AppState;

use super::parse_id;

// ── GET /api/codes ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CodeListResponse {
    pub success: bool,
    pub codes: Vec<Token>,
    pub total: usize,
}

pub async fn list_codes(State(state): State<AppState>) -> Result<Json<CodeListResponse>, ApiError> {
    let codes = state.service.list_all().await?;
    let total = codes.len();
    Ok(Json(CodeListResponse {
        success: true,
        codes,
        total,
    }))
}

// ── GET /api/code/{id} ──────────────────────────────────────────────

pub async fn code_info(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw_id)?;
    let code = state.service.query(id).await?;
    Ok(Json(json!({ "success": true, "code": code })).into_response())
}

// ── GET /api/stats ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: TokenStats,
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.service.stats().await?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

// ── GET /api/attendees ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AttendeeListResponse {
    pub success: bool,
    pub attendees: Vec<Attendee>,
    pub total: usize,
}

pub async fn attendees(
    State(state): State<AppState>,
) -> Result<Json<AttendeeListResponse>, ApiError> {
    let attendees = state.service.list_initialized().await?;
    let total = attendees.len();
    Ok(Json(AttendeeListResponse {
        success: true,
        attendees,
        total,
    }))
}

// ── GET /health ─────────────────────────────────────────────────────

pub async fn health(State(state): State<AppState>) -> Response {
    match state.service.store().ping().await {
        Ok(()) => Json(json!({
            "status": "healthy",
            "database": "connected",
            "timestamp": Utc::now().to_rfc3339(),
        }))
        .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": err.to_string(),
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )
            .into_response(),
    }
}
