//! Bearer token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{BusinessId, UserId};

/// JWT claims carried by every operator request.
///
/// Tokens are issued by the session service; this service only reads them
/// to learn who is verifying and which business the request belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (operator user ID).
    pub sub: Uuid,
    /// Business the operator is acting for.
    pub biz: Uuid,
    /// Operator role within the business.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an operator.
    #[must_use]
    pub fn new(user_id: Uuid, business_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            biz: business_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the operator's user ID.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }

    /// Returns the business ID.
    #[must_use]
    pub const fn business_id(&self) -> BusinessId {
        BusinessId::from_uuid(self.biz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_correct_fields() {
        let user_id = Uuid::new_v4();
        let business_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(user_id, business_id, "finance", expires_at);

        assert_eq!(claims.user_id().into_inner(), user_id);
        assert_eq!(claims.business_id().into_inner(), business_id);
        assert_eq!(claims.role, "finance");
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }
}
