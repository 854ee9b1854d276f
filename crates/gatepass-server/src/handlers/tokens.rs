// ── Mutating endpoints: issuance, initialization, redemption ──
//
// Wire envelopes here are frozen by the deployed scanner frontend:
// `/api/scan` in particular answers 200 with a status field for domain
// rejections, reserving error codes for malformed requests and
// infrastructure failures.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use gatepass_core::{BulkIssuer, CoreError, Token, TokenId};

use crate::error::ApiError;
use crate::state::AppState;

use super::parse_id;

// ── POST /api/generate ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub count: Option<u32>,
    pub max_scans: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct IssuedCode {
    pub code_id: TokenId,
    pub qr_number: u32,
    pub qr_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_image_base64: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub message: String,
    pub codes: Vec<IssuedCode>,
}

pub async fn generate(
    State(state): State<AppState>,
    body: Option<Json<GenerateRequest>>,
) -> Result<Response, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();

    let count = req.count.unwrap_or(state.default_batch_size);
    let max_scans = req.max_scans.unwrap_or(state.default_max_scans);
    if count == 0 {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Invalid count: must be at least 1",
        ));
    }
    if max_scans == 0 {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Invalid max_scans: must be at least 1",
        ));
    }

    let issuer = BulkIssuer::new(&state.service);
    match issuer.issue_batch(count, max_scans).await {
        Ok(tokens) => {
            let codes = render_codes(&state, &tokens)?;
            Ok(Json(GenerateResponse {
                success: true,
                message: format!("Generated {} QR codes", codes.len()),
                codes,
            })
            .into_response())
        }
        // Fail-fast batch: report the durable prefix alongside the error.
        // A renderer failure here must not swallow the completed count --
        // the prefix is already persisted whether or not it has badges.
        Err(partial) => {
            let codes = match render_codes(&state, &partial.issued) {
                Ok(codes) => codes,
                Err(render_err) => {
                    tracing::error!(
                        completed = partial.completed,
                        error = %render_err.message,
                        "issued prefix could not be rendered"
                    );
                    Vec::new()
                }
            };
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": partial.to_string(),
                    "completed": partial.completed,
                    "codes": codes,
                })),
            )
                .into_response())
        }
    }
}

fn render_codes(state: &AppState, tokens: &[Token]) -> Result<Vec<IssuedCode>, ApiError> {
    tokens
        .iter()
        .map(|token| {
            let badge = state
                .renderer
                .render(token.id, token.sequence)
                .map_err(|e| ApiError::internal(e.to_string()))?;
            Ok(IssuedCode {
                code_id: token.id,
                qr_number: token.sequence,
                qr_url: badge.target_url,
                qr_image_base64: badge.image_base64,
            })
        })
        .collect()
}

// ── POST /api/init ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InitRequest {
    pub code_id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub success: bool,
    pub message: String,
    pub name: String,
}

pub async fn initialize(
    State(state): State<AppState>,
    Json(req): Json<InitRequest>,
) -> Result<Json<InitResponse>, ApiError> {
    let id = parse_id(&req.code_id)?;
    let name = state.service.initialize(id, &req.name).await?;
    Ok(Json(InitResponse {
        success: true,
        message: "QR initialized successfully".into(),
        name,
    }))
}

// ── POST /api/scan ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub code_id: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScanResponse {
    Valid {
        name: String,
        scans_left: u32,
        qr_number: u32,
    },
    Invalid {
        reason: String,
    },
}

pub async fn scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let Ok(id) = req.code_id.parse::<TokenId>() else {
        return Ok(Json(ScanResponse::Invalid {
            reason: "QR code not found".into(),
        }));
    };

    match state.service.redeem(id).await {
        Ok(redemption) => Ok(Json(ScanResponse::Valid {
            name: redemption.name,
            scans_left: redemption.scans_left,
            qr_number: redemption.sequence,
        })),
        Err(CoreError::NotFound { .. }) => Ok(Json(ScanResponse::Invalid {
            reason: "QR code not found".into(),
        })),
        Err(CoreError::NotInitialized { .. }) => Ok(Json(ScanResponse::Invalid {
            reason: "QR code not initialized".into(),
        })),
        Err(CoreError::QuotaExceeded { max_scans }) => Ok(Json(ScanResponse::Invalid {
            reason: format!("Maximum scans ({max_scans}) already used"),
        })),
        Err(other) => Err(other.into()),
    }
}
