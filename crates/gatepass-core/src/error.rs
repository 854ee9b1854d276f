// ── Core error types ──
//
// User-facing errors from gatepass-core. Callers map these onto their
// transport (the HTTP layer turns NotFound into 404, validation and
// state errors into 400, and so on). Storage failures are wrapped, not
// exposed raw.

use thiserror::Error;

use crate::model::TokenId;
use crate::store::StoreError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Token not found: {id}")]
    NotFound { id: TokenId },

    // ── Validation errors ────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    // ── State errors ─────────────────────────────────────────────────
    #[error("Token {id} is already initialized")]
    AlreadyInitialized { id: TokenId },

    #[error("Token {id} has not been initialized")]
    NotInitialized { id: TokenId },

    #[error("Maximum scans ({max_scans}) already used")]
    QuotaExceeded { max_scans: u32 },

    // ── Concurrency errors ───────────────────────────────────────────
    #[error("Token {id} was modified concurrently; retries exhausted")]
    ConcurrentUpdate { id: TokenId },

    // ── Storage errors (wrapped) ─────────────────────────────────────
    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),
}
