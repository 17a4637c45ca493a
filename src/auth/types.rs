//! Types for authentication and user management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::session::Session;

/// User as known to the auth service (not the marketplace profile)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub app_metadata: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub user_metadata: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub created_at: Option<String>,
}

impl AuthUser {
    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata
            .get(key)
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Display name supplied by an OAuth provider
    pub fn full_name(&self) -> Option<&str> {
        self.metadata_str("full_name")
            .or_else(|| self.metadata_str("name"))
    }

    /// Avatar supplied by an OAuth provider
    pub fn avatar_url(&self) -> Option<&str> {
        self.metadata_str("avatar_url")
    }

    /// Name to use for a new profile: provider name, else the email local part.
    pub fn profile_name(&self) -> String {
        if let Some(name) = self.full_name() {
            return name.to_string();
        }
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .unwrap_or("usuario")
            .to_string()
    }
}

/// Sign-up answers with a session when confirmation is off, or with the bare
/// user when a confirmation email was sent.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(Session),
    Pending(AuthUser),
}

impl SignUpResponse {
    pub fn user(&self) -> &AuthUser {
        match self {
            SignUpResponse::Session(session) => &session.user,
            SignUpResponse::Pending(user) => user,
        }
    }
}

/// External identity providers offered on the login screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            other => Err(crate::error::Error::validation(
                "provider",
                format!("unsupported provider {}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_name_prefers_metadata_then_email() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "1",
            "email": "maria.lopez@uni.edu",
            "user_metadata": { "full_name": "María López" }
        }))
        .unwrap();
        assert_eq!(user.profile_name(), "María López");

        let bare: AuthUser =
            serde_json::from_value(json!({ "id": "2", "email": "pedro@uni.edu" })).unwrap();
        assert_eq!(bare.profile_name(), "pedro");
        assert!(bare.avatar_url().is_none());
    }

    #[test]
    fn sign_up_response_distinguishes_pending_users() {
        let pending: SignUpResponse =
            serde_json::from_value(json!({ "id": "u-9", "email": "a@b.c" })).unwrap();
        assert!(matches!(pending, SignUpResponse::Pending(_)));

        let session: SignUpResponse = serde_json::from_value(json!({
            "access_token": "tok",
            "expires_in": 3600,
            "user": { "id": "u-9" }
        }))
        .unwrap();
        assert_eq!(session.user().id, "u-9");
        assert!(matches!(session, SignUpResponse::Session(_)));
    }
}
