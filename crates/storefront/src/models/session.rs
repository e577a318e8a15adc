//! Session-related types.
//!
//! Types stored in the shopper's session: the backend cart session token,
//! the mirrored cart state, and the checkout flow.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a backend session token stays usable. WooGraphQL guest session
/// JWTs live for 7 days; a token older than that is discarded rather than
/// sent, so the shopper silently starts a fresh cart instead of hitting
/// backend auth errors.
const BACKEND_SESSION_TTL_DAYS: i64 = 7;

/// The `woocommerce-session` token tying this shopper to a backend cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSession {
    /// Opaque token as received from the backend.
    pub token: String,
    /// When the token was first received.
    pub created_at: DateTime<Utc>,
}

impl BackendSession {
    /// Wrap a freshly received token.
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token,
            created_at: Utc::now(),
        }
    }

    /// Whether the token has outlived its validity window at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::days(BACKEND_SESSION_TTL_DAYS)
    }

    /// Whether the token has outlived its validity window.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Session keys for shopper state.
pub mod keys {
    /// Key for the backend cart session token.
    pub const BACKEND_SESSION: &str = "backend_session";

    /// Key for the mirrored cart state.
    pub const CART_STATE: &str = "cart_state";

    /// Key for the checkout flow state machine.
    pub const CHECKOUT_FLOW: &str = "checkout_flow";

    /// Key for the order summary shown on the confirmation page.
    pub const LAST_ORDER: &str = "last_order";
}
