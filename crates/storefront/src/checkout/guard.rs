//! Per-session guard against concurrent checkout submissions.
//!
//! A double-clicked "Comprar" button sends two POSTs carrying the same
//! session cookie. The first to arrive claims the session; the second is
//! turned away until the first finishes. Claims expire on their own so a
//! crashed request cannot lock a shopper out.

use std::time::Duration;

use moka::future::Cache;

/// How long a claim survives if it is never released.
pub const DEFAULT_CLAIM_TTL: Duration = Duration::from_secs(60);

/// Upper bound on simultaneously tracked sessions.
const MAX_TRACKED_SESSIONS: u64 = 10_000;

/// Set of sessions with a checkout currently in flight.
#[derive(Clone)]
pub struct InFlightCheckouts {
    claims: Cache<String, ()>,
}

impl InFlightCheckouts {
    /// Create a guard whose claims expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            claims: Cache::builder()
                .max_capacity(MAX_TRACKED_SESSIONS)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Claim `key`. Returns `false` if another submission holds it.
    pub async fn try_claim(&self, key: &str) -> bool {
        self.claims.entry_by_ref(key).or_insert(()).await.is_fresh()
    }

    /// Release a claim taken with [`Self::try_claim`].
    pub async fn release(&self, key: &str) {
        self.claims.invalidate(key).await;
    }
}

impl Default for InFlightCheckouts {
    fn default() -> Self {
        Self::new(DEFAULT_CLAIM_TTL)
    }
}
