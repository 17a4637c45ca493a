//! Session management for authentication

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::types::AuthUser;
use crate::error::Error;

/// Session returned by the token and sign-up endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: i64,

    /// Unix timestamp; filled in on receipt when the server omits it
    #[serde(default)]
    pub expires_at: Option<i64>,

    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Claims the marketplace reads from an access token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Auth user id
    pub sub: String,

    #[serde(default)]
    pub exp: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Option<String>,
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

impl Session {
    /// Fill in `expires_at` from `expires_in` if the server did not send it.
    pub(crate) fn stamped(mut self) -> Self {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(now_secs() + self.expires_in);
        }
        self
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => now_secs() >= expires_at,
            None => false,
        }
    }

    /// Decode the access token claims.
    ///
    /// The signature is not checked here; the backend verifies every request.
    pub fn claims(&self) -> Result<TokenClaims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<TokenClaims>(
            &self.access_token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn session_with_token(token: String, expires_at: Option<i64>) -> Session {
        Session {
            access_token: token,
            refresh_token: "refresh".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at,
            user: serde_json::from_value(json!({ "id": "u-1" })).unwrap(),
        }
    }

    #[test]
    fn claims_are_decoded_without_the_secret() {
        let token = encode(
            &Header::default(),
            &json!({ "sub": "u-1", "exp": 4_000_000_000i64, "aud": "authenticated", "email": "ana@uni.edu" }),
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap();

        let claims = session_with_token(token, None).claims().unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email.as_deref(), Some("ana@uni.edu"));
    }

    #[test]
    fn stamped_sets_expiry_and_past_expiry_is_expired() {
        let fresh = session_with_token("t".into(), None).stamped();
        assert!(fresh.expires_at.is_some());
        assert!(!fresh.is_expired());

        let stale = session_with_token("t".into(), Some(1));
        assert!(stale.is_expired());
    }
}
