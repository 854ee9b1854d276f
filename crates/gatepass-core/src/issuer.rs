// ── Bulk issuance ──
//
// Creates N tokens as one logical batch with dense sequence numbers.
// Creations are independent: there is no cross-token transaction, and a
// failure mid-batch leaves the already-created prefix durable. The
// caller gets that prefix back inside the error.

use thiserror::Error;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::lifecycle::TokenService;
use crate::model::Token;

/// Bulk issuance stopped early: `issued` holds the durable prefix.
#[derive(Debug, Error)]
#[error("batch issuance stopped after {completed} of {requested} tokens")]
pub struct PartialBatchFailure {
    pub completed: u32,
    pub requested: u32,
    pub issued: Vec<Token>,
    #[source]
    pub source: CoreError,
}

/// Issues batches of tokens through a [`TokenService`].
pub struct BulkIssuer<'a> {
    service: &'a TokenService,
}

impl<'a> BulkIssuer<'a> {
    pub fn new(service: &'a TokenService) -> Self {
        Self { service }
    }

    /// Create `count` tokens with sequence numbers `1..=count`, in order.
    ///
    /// Fail-fast: the first creation error aborts the batch without
    /// cleanup. Tokens created before the failure stay in the store and
    /// are returned in [`PartialBatchFailure::issued`].
    pub async fn issue_batch(
        &self,
        count: u32,
        max_scans: u32,
    ) -> Result<Vec<Token>, PartialBatchFailure> {
        let mut issued = Vec::with_capacity(count as usize);

        for sequence in 1..=count {
            match self.service.create(sequence, max_scans).await {
                Ok(token) => issued.push(token),
                Err(source) => {
                    warn!(
                        sequence,
                        requested = count,
                        error = %source,
                        "bulk issuance aborted"
                    );
                    return Err(PartialBatchFailure {
                        completed: sequence - 1,
                        requested: count,
                        issued,
                        source,
                    });
                }
            }
        }

        info!(count, max_scans, "batch issued");
        Ok(issued)
    }
}
