// ── In-process token store ──
//
// DashMap-backed implementation. Per-shard write locks make each
// versioned update atomic: the version compare and the replacement
// happen under the same shard guard.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::model::{Token, TokenId};

use super::{StoreError, TokenStore, Versioned};

/// In-memory [`TokenStore`] with versioned conditional updates.
///
/// Suitable for a single-process deployment and for tests. Versions
/// start at 1 on insert and bump on every successful update.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<TokenId, Versioned<Token>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert(&self, token: Token) -> Result<(), StoreError> {
        match self.records.entry(token.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate { id: token.id }),
            Entry::Vacant(slot) => {
                slot.insert(Versioned {
                    version: 1,
                    value: token,
                });
                Ok(())
            }
        }
    }

    async fn get(&self, id: TokenId) -> Result<Option<Versioned<Token>>, StoreError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn update(
        &self,
        id: TokenId,
        expected_version: u64,
        token: Token,
    ) -> Result<(), StoreError> {
        // get_mut holds the shard write lock across compare and replace.
        let Some(mut slot) = self.records.get_mut(&id) else {
            return Err(StoreError::Missing { id });
        };
        if slot.version != expected_version {
            return Err(StoreError::Conflict { id });
        }
        slot.version += 1;
        slot.value = token;
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<Token>, StoreError> {
        Ok(self.records.iter().map(|r| r.value().value.clone()).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
