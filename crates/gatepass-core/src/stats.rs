// ── Attendance statistics ──

use serde::Serialize;

use crate::model::Token;

/// Aggregate counts over a point-in-time snapshot of the store.
///
/// Not transactionally consistent with concurrent writes; good enough
/// for monitoring dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenStats {
    pub total: u64,
    /// Tokens with a bound guest name.
    pub initialized: u64,
    /// Tokens redeemed at least once.
    pub used: u64,
    /// Tokens with no quota left, judged against each token's own limit.
    pub exhausted: u64,
    pub unused: u64,
}

/// Pure fold over a token snapshot.
pub fn aggregate(tokens: &[Token]) -> TokenStats {
    let mut stats = TokenStats {
        total: tokens.len() as u64,
        ..TokenStats::default()
    };

    for token in tokens {
        if token.is_initialized() {
            stats.initialized += 1;
        }
        if token.scan_count > 0 {
            stats.used += 1;
        }
        if token.is_exhausted() {
            stats.exhausted += 1;
        }
    }
    stats.unused = stats.total - stats.used;
    stats
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::lifecycle::TokenService;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_snapshot_is_all_zero() {
        assert_eq!(aggregate(&[]), TokenStats::default());
    }

    #[tokio::test]
    async fn counts_follow_the_lifecycle() {
        let svc = TokenService::new(Arc::new(MemoryStore::new()));

        // 3 created, 2 initialized, 1 redeemed once (quota 2).
        let a = svc.create(1, 2).await.unwrap();
        let b = svc.create(2, 2).await.unwrap();
        svc.create(3, 2).await.unwrap();

        svc.initialize(a.id, "Ada").await.unwrap();
        svc.initialize(b.id, "Grace").await.unwrap();
        svc.redeem(a.id).await.unwrap();

        let stats = svc.stats().await.unwrap();
        assert_eq!(
            stats,
            TokenStats {
                total: 3,
                initialized: 2,
                used: 1,
                exhausted: 0,
                unused: 2,
            }
        );
    }

    #[tokio::test]
    async fn exhaustion_respects_per_token_quota() {
        let svc = TokenService::new(Arc::new(MemoryStore::new()));

        let single = svc.create(1, 1).await.unwrap();
        svc.initialize(single.id, "One Scan").await.unwrap();
        svc.redeem(single.id).await.unwrap();

        let double = svc.create(2, 2).await.unwrap();
        svc.initialize(double.id, "Two Scans").await.unwrap();
        svc.redeem(double.id).await.unwrap();

        let stats = svc.stats().await.unwrap();
        assert_eq!(stats.used, 2);
        // Only the max_scans=1 token is spent.
        assert_eq!(stats.exhausted, 1);
    }
}
