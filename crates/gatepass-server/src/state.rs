// ── Shared handler state ──
//
// Built once at process start and injected into every handler through
// axum's `State` extractor. There are no module-level singletons; the
// service and renderer live exactly as long as the router.

use std::sync::Arc;

use gatepass_core::{BadgeRenderer, TokenService};

/// Everything a request handler needs.
#[derive(Clone)]
pub struct AppState {
    pub service: TokenService,
    pub renderer: Arc<dyn BadgeRenderer>,
    /// Batch size when an issuance request omits `count`.
    pub default_batch_size: u32,
    /// Scan quota when an issuance request omits `max_scans`.
    pub default_max_scans: u32,
}

impl AppState {
    pub fn new(
        service: TokenService,
        renderer: Arc<dyn BadgeRenderer>,
        default_batch_size: u32,
        default_max_scans: u32,
    ) -> Self {
        Self {
            service,
            renderer,
            default_batch_size,
            default_max_scans,
        }
    }
}
