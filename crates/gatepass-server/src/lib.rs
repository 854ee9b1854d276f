// gatepass-server: REST surface over gatepass-core. Thin by design --
// handlers translate wire shapes to core operations and map core errors
// onto status codes; no business rules live here.

pub mod error;
pub mod handlers;
pub mod render;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use render::InitUrlRenderer;
pub use routes::router;
pub use state::AppState;
