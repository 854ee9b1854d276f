// ── Token record ──
//
// The sole durable entity. Wire field names (`code_id`, `qr_number`, ...)
// are fixed by the deployed scanner frontend and must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TokenId;

/// A single-use-limited admission token.
///
/// Mutated only through [`crate::TokenService`]: `initialize` binds a guest
/// name exactly once, `redeem` consumes scan quota. Everything else is
/// immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "code_id")]
    pub id: TokenId,

    /// Position within the issuance batch, dense from 1. Printed on the
    /// physical invitation for human lookup.
    #[serde(rename = "qr_number")]
    pub sequence: u32,

    /// Unset until initialization; immutable once bound.
    #[serde(rename = "name")]
    pub guest_name: Option<String>,

    pub scan_count: u32,

    pub max_scans: u32,

    pub created_at: DateTime<Utc>,

    pub initialized_at: Option<DateTime<Utc>>,

    /// One entry appended per accepted redemption, in the same write that
    /// bumps `scan_count`.
    #[serde(default)]
    pub scan_history: Vec<DateTime<Utc>>,
}

impl Token {
    /// Fresh token in the Created state.
    pub fn new(sequence: u32, max_scans: u32) -> Self {
        Self {
            id: TokenId::generate(),
            sequence,
            guest_name: None,
            scan_count: 0,
            max_scans,
            created_at: Utc::now(),
            initialized_at: None,
            scan_history: Vec::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.guest_name.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.scan_count >= self.max_scans
    }

    pub fn scans_left(&self) -> u32 {
        self.max_scans.saturating_sub(self.scan_count)
    }

    /// Derived lifecycle state.
    pub fn state(&self) -> TokenState {
        if !self.is_initialized() {
            TokenState::Created
        } else if self.scan_count == 0 {
            TokenState::Initialized
        } else if self.is_exhausted() {
            TokenState::Exhausted
        } else {
            TokenState::Redeemed
        }
    }
}

/// Lifecycle states, derived from the record rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    Created,
    Initialized,
    Redeemed,
    Exhausted,
}

/// Result of one accepted redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redemption {
    pub name: String,
    pub scans_left: u32,
    #[serde(rename = "qr_number")]
    pub sequence: u32,
}

/// Read-only projection of an initialized token for attendance listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attendee {
    pub name: String,
    #[serde(rename = "qr_number")]
    pub sequence: u32,
    pub initialized_at: DateTime<Utc>,
    pub scan_count: u32,
    pub max_scans: u32,
}
