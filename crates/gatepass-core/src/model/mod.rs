// ── Domain model ──

mod token;
mod token_id;

pub use token::{Attendee, Redemption, Token, TokenState};
pub use token_id::TokenId;
