// gatepass-core: Token lifecycle state machine, storage abstraction, and
// attendance reporting. Everything above this crate (HTTP, CLI, rendering)
// is glue around the operations defined here.

pub mod error;
pub mod issuer;
pub mod lifecycle;
pub mod model;
pub mod render;
pub mod stats;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use issuer::{BulkIssuer, PartialBatchFailure};
pub use lifecycle::TokenService;
pub use render::{BadgeRenderer, DocumentEmbedder, DocumentHandle, RenderError, RenderedBadge};
pub use stats::TokenStats;
pub use store::{MemoryStore, StoreError, TokenStore, Versioned};

// Re-export model types at the crate root for ergonomics.
pub use model::{Attendee, Redemption, Token, TokenId, TokenState};
