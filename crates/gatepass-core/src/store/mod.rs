// ── Storage abstraction ──
//
// The lifecycle service depends on this trait, never on a concrete
// engine. The one capability that matters is the versioned conditional
// update: without it two concurrent redemptions can both observe the
// same scan_count and double-admit a guest.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Token, TokenId};

pub use memory::MemoryStore;

/// A record paired with the store's version counter for that key.
///
/// The version observed at read time is the ticket for a conditional
/// update: [`TokenStore::update`] applies only if the stored version
/// still matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Errors surfaced by a token store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("no record for token {id}")]
    Missing { id: TokenId },

    #[error("token {id} already exists")]
    Duplicate { id: TokenId },

    #[error("write conflict on token {id}: record changed since read")]
    Conflict { id: TokenId },

    #[error("storage backend unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Durable keyed storage for token records.
///
/// Implementations must guarantee that `update` is atomic with respect
/// to concurrent updates of the same key — the compare step and the
/// write must be indivisible. `scan` may return a point-in-time snapshot
/// that is not transactionally consistent with concurrent writes.
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    /// Persist a brand-new record. Fails with [`StoreError::Duplicate`]
    /// if the id is already present.
    async fn insert(&self, token: Token) -> Result<(), StoreError>;

    /// Fetch the current record and its version, if present.
    async fn get(&self, id: TokenId) -> Result<Option<Versioned<Token>>, StoreError>;

    /// Conditional update: replace the record only if its stored version
    /// equals `expected_version`. Fails with [`StoreError::Conflict`] if
    /// the record changed since the read, [`StoreError::Missing`] if it
    /// disappeared.
    async fn update(
        &self,
        id: TokenId,
        expected_version: u64,
        token: Token,
    ) -> Result<(), StoreError>;

    /// Full scan of all records (snapshot semantics).
    async fn scan(&self) -> Result<Vec<Token>, StoreError>;

    /// Cheap liveness probe for health reporting.
    async fn ping(&self) -> Result<(), StoreError>;
}
