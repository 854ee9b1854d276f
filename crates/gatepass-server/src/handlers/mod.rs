// ── Request handlers ──

pub mod reports;
pub mod tokens;

use axum::http::StatusCode;

use gatepass_core::TokenId;

use crate::error::ApiError;

/// Parse a wire-level id. An unparseable id is indistinguishable from
/// an unknown one as far as callers are concerned.
pub(crate) fn parse_id(raw: &str) -> Result<TokenId, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::new(StatusCode::NOT_FOUND, format!("Token not found: {raw}"))
    })
}
