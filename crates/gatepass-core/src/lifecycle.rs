// ── Token lifecycle service ──
//
// The main entry point for consumers. Owns no token state across calls:
// every mutation re-reads the current record, computes the successor
// state, and writes back through the store's versioned conditional
// update. A lost race is retried a bounded number of times so that a
// legitimate redemption arriving just behind a concurrent one still
// succeeds while quota remains.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{Attendee, Redemption, Token, TokenId};
use crate::stats::{self, TokenStats};
use crate::store::{StoreError, TokenStore, Versioned};

/// Bounded retries for a lost conditional update before surfacing
/// [`CoreError::ConcurrentUpdate`].
const CAS_MAX_RETRIES: usize = 3;

/// Token lifecycle operations over an abstract store.
///
/// Cheaply cloneable; constructed once at process start and passed by
/// reference to every request handler.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn TokenStore>,
}

impl TokenService {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    // ── Creation ─────────────────────────────────────────────────────

    /// Allocate a fresh token in the Created state and persist it.
    pub async fn create(&self, sequence: u32, max_scans: u32) -> Result<Token, CoreError> {
        let token = Token::new(sequence, max_scans);
        self.store.insert(token.clone()).await?;
        debug!(id = %token.id, sequence, "token created");
        Ok(token)
    }

    // ── Initialization ───────────────────────────────────────────────

    /// Bind a guest name to an uninitialized token. Returns the bound
    /// name. Exactly one of any set of concurrent callers wins; the
    /// rest observe [`CoreError::AlreadyInitialized`].
    pub async fn initialize(&self, id: TokenId, name: &str) -> Result<String, CoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput {
                field: "name".into(),
                reason: "must not be empty".into(),
            });
        }

        for attempt in 0..CAS_MAX_RETRIES {
            let Versioned {
                version,
                value: mut token,
            } = self
                .store
                .get(id)
                .await?
                .ok_or(CoreError::NotFound { id })?;

            if token.is_initialized() {
                return Err(CoreError::AlreadyInitialized { id });
            }

            token.guest_name = Some(trimmed.to_owned());
            token.initialized_at = Some(Utc::now());

            match self.store.update(id, version, token).await {
                Ok(()) => {
                    info!(%id, name = trimmed, "token initialized");
                    return Ok(trimmed.to_owned());
                }
                // Someone else wrote first; re-read decides whether they
                // bound a name or merely raced us some other way.
                Err(StoreError::Conflict { .. }) => {
                    debug!(%id, attempt, "initialize lost conditional update; retrying");
                }
                Err(StoreError::Missing { .. }) => return Err(CoreError::NotFound { id }),
                Err(e) => return Err(e.into()),
            }
        }

        Err(CoreError::ConcurrentUpdate { id })
    }

    // ── Redemption ───────────────────────────────────────────────────

    /// Consume one unit of scan quota. The scan_count increment and the
    /// scan_history append land in the same conditional write, so an
    /// accepted redemption is never half-recorded and scan_count can
    /// never exceed max_scans regardless of caller concurrency.
    pub async fn redeem(&self, id: TokenId) -> Result<Redemption, CoreError> {
        for attempt in 0..CAS_MAX_RETRIES {
            let Versioned {
                version,
                value: mut token,
            } = self
                .store
                .get(id)
                .await?
                .ok_or(CoreError::NotFound { id })?;

            let Some(name) = token.guest_name.clone() else {
                return Err(CoreError::NotInitialized { id });
            };

            if token.is_exhausted() {
                return Err(CoreError::QuotaExceeded {
                    max_scans: token.max_scans,
                });
            }

            token.scan_count += 1;
            token.scan_history.push(Utc::now());

            match self.store.update(id, version, token.clone()).await {
                Ok(()) => {
                    info!(
                        %id,
                        sequence = token.sequence,
                        scan_count = token.scan_count,
                        "token redeemed"
                    );
                    return Ok(Redemption {
                        name,
                        scans_left: token.scans_left(),
                        sequence: token.sequence,
                    });
                }
                Err(StoreError::Conflict { .. }) => {
                    debug!(%id, attempt, "redeem lost conditional update; retrying");
                }
                Err(StoreError::Missing { .. }) => return Err(CoreError::NotFound { id }),
                Err(e) => return Err(e.into()),
            }
        }

        Err(CoreError::ConcurrentUpdate { id })
    }

    // ── Read-only queries ────────────────────────────────────────────

    /// Current full snapshot of one token.
    pub async fn query(&self, id: TokenId) -> Result<Token, CoreError> {
        self.store
            .get(id)
            .await?
            .map(|v| v.value)
            .ok_or(CoreError::NotFound { id })
    }

    /// All tokens, ordered by batch sequence.
    pub async fn list_all(&self) -> Result<Vec<Token>, CoreError> {
        let mut tokens = self.store.scan().await?;
        tokens.sort_by_key(|t| t.sequence);
        Ok(tokens)
    }

    /// Initialized tokens projected for attendance display, ordered by
    /// initialization time.
    pub async fn list_initialized(&self) -> Result<Vec<Attendee>, CoreError> {
        let tokens = self.store.scan().await?;
        let mut attendees: Vec<Attendee> = tokens
            .into_iter()
            .filter_map(|t| {
                let name = t.guest_name?;
                let initialized_at = t.initialized_at?;
                Some(Attendee {
                    name,
                    sequence: t.sequence,
                    initialized_at,
                    scan_count: t.scan_count,
                    max_scans: t.max_scans,
                })
            })
            .collect();
        attendees.sort_by_key(|a| a.initialized_at);
        Ok(attendees)
    }

    /// Aggregate counts over a point-in-time store snapshot.
    pub async fn stats(&self) -> Result<TokenStats, CoreError> {
        let tokens = self.store.scan().await?;
        Ok(stats::aggregate(&tokens))
    }
}
