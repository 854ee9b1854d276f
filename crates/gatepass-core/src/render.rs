// ── Rendering collaborator seams ──
//
// Image and document production live outside the core. The core hands
// collaborators nothing but the token's identity and its batch sequence,
// and consumes back an opaque artifact or storage handle.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::TokenId;

#[derive(Debug, Error)]
#[error("rendering failed: {reason}")]
pub struct RenderError {
    pub reason: String,
}

impl RenderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Scannable artifact for one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBadge {
    /// URL the badge encodes; scanning lands the guest on the
    /// initialization page for this token.
    pub target_url: String,
    /// Base64 PNG when the renderer produces pixels; `None` for
    /// URL-only renderers.
    pub image_base64: Option<String>,
}

/// Turns a token identity into a scannable badge.
pub trait BadgeRenderer: Send + Sync {
    fn render(&self, id: TokenId, sequence: u32) -> Result<RenderedBadge, RenderError>;
}

/// Storage handle for an embedded document (e.g. a printable invitation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    pub filename: String,
    pub path: PathBuf,
}

/// Overlays a badge onto a template document and stores the result.
pub trait DocumentEmbedder: Send + Sync {
    fn embed(
        &self,
        id: TokenId,
        sequence: u32,
        badge: &RenderedBadge,
    ) -> Result<DocumentHandle, RenderError>;
}
