// ── URL-only badge renderer ──

use gatepass_core::{BadgeRenderer, RenderError, RenderedBadge, TokenId};

/// Renderer that produces the initialization URL a QR badge would
/// encode, without rasterizing an image. Pixel production is delegated
/// to the frontend (or a future renderer behind the same trait).
#[derive(Debug, Clone)]
pub struct InitUrlRenderer {
    base_url: String,
}

impl InitUrlRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url: String = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

impl BadgeRenderer for InitUrlRenderer {
    fn render(&self, id: TokenId, _sequence: u32) -> Result<RenderedBadge, RenderError> {
        Ok(RenderedBadge {
            target_url: format!("{}/init?code={id}", self.base_url),
            image_base64: None,
        })
    }
}
