use log::{info, warn};

use crate::auth::{AuthUser, OAuthProvider, SignUpResponse};
use crate::error::{Error, Result};
use crate::models::{NewUser, RecordId, User};
use crate::services::logged;
use crate::validation;
use crate::Marketplace;

/// Shown instead of the raw policy error when the profile insert is refused
pub const ROW_LEVEL_SECURITY_HINT: &str =
    "check the row-level security policies on Usuarios: a signed-in user must be allowed to insert their own row";

/// Sign-in, sign-up and the profile row that goes with each auth user
pub struct AccountService<'a> {
    market: &'a Marketplace,
}

impl<'a> AccountService<'a> {
    pub(crate) fn new(market: &'a Marketplace) -> Self {
        Self { market }
    }

    async fn profile(&self, id: &RecordId) -> Result<Option<User>> {
        self.market
            .from(User::TABLE)
            .select("*")
            .eq("id", id)
            .maybe_single()
            .await
    }

    async fn insert_profile(&self, row: NewUser) -> Result<()> {
        let result = self
            .market
            .from(User::TABLE)
            .insert(vec![row])
            .execute_no_return()
            .await;
        logged("creating profile", result).map_err(with_policy_hint)
    }

    /// Sign in with email and password. `None` when the account has no
    /// marketplace profile.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Option<User>> {
        let email = validation::email(email)?;
        validation::require_text("password", password)?;

        let result = self.market.auth().sign_in_with_password(&email, password).await;
        let session = logged("signing in", result)?;
        self.profile(&RecordId::from(session.user.id)).await
    }

    /// Create the auth account and its profile row, then read the profile back.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User> {
        let email = validation::email(email)?;
        validation::password(password)?;
        let name = validation::require_text("nombre", name)?;

        let result = self.market.auth().sign_up(&email, password).await;
        let response = logged("signing up", result)?;
        if let SignUpResponse::Pending(_) = response {
            info!("profile for {} is created before email confirmation", email);
        }
        let id = RecordId::from(response.user().id.as_str());

        self.insert_profile(NewUser {
            id: id.clone(),
            name,
            email: Some(email),
            avatar: None,
        })
        .await?;

        self.profile(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("profile {}", id)))
    }

    /// URL that starts the provider's sign-in page. Falls back to the
    /// configured redirect when none is given.
    pub fn oauth_url(&self, provider: OAuthProvider, redirect_to: Option<&str>) -> String {
        let redirect_to = redirect_to.or(self.market.config().oauth_redirect.as_deref());
        self.market.auth().oauth_sign_in_url(provider, redirect_to)
    }

    /// Finish an OAuth sign-in with the code from the callback
    pub async fn complete_oauth(&self, code: &str) -> Result<User> {
        let code = validation::require_text("code", code)?;
        let result = self.market.auth().exchange_code_for_session(&code).await;
        let session = logged("exchanging OAuth code", result)?;
        self.ensure_profile(&session.user).await
    }

    /// Fetch the profile of an auth user, creating it from provider metadata
    /// on first sign-in.
    pub async fn ensure_profile(&self, auth_user: &AuthUser) -> Result<User> {
        let id = RecordId::from(auth_user.id.as_str());
        if let Some(user) = self.profile(&id).await? {
            return Ok(user);
        }

        self.insert_profile(NewUser {
            id: id.clone(),
            name: auth_user.profile_name(),
            email: auth_user.email.clone(),
            avatar: auth_user.avatar_url().map(str::to_string),
        })
        .await?;
        info!("created profile {} on first sign-in", id);

        self.profile(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("profile {}", id)))
    }

    pub async fn reset_password(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        let email = validation::email(email)?;
        let redirect_to = redirect_to.or(self.market.config().reset_redirect.as_deref());
        let result = self.market.auth().reset_password_for_email(&email, redirect_to).await;
        logged("requesting password reset", result)
    }

    pub async fn update_password(&self, password: &str) -> Result<()> {
        validation::password(password)?;
        let result = self.market.auth().update_password(password).await;
        logged("updating password", result).map(|_| ())
    }

    /// Sign out. The local session is dropped even if the server call fails.
    pub async fn sign_out(&self) -> Result<()> {
        if let Err(err) = self.market.auth().sign_out().await {
            warn!("server sign-out failed, local session cleared anyway: {}", err);
            return Err(err);
        }
        Ok(())
    }

    /// Profile of the session user, or `None` when signed out
    pub async fn current_user(&self) -> Result<Option<User>> {
        match self.market.auth().get_user().await? {
            Some(auth_user) => self.ensure_profile(&auth_user).await.map(Some),
            None => Ok(None),
        }
    }
}

fn with_policy_hint(err: Error) -> Error {
    if err.is_row_level_security() {
        Error::Database(format!("{} ({})", ROW_LEVEL_SECURITY_HINT, err))
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_errors_gain_a_hint() {
        let err = with_policy_hint(Error::database(
            "new row violates row-level security policy for table \"Usuarios\"",
        ));
        assert!(err.to_string().contains("check the row-level security policies"));

        let other = with_policy_hint(Error::database("duplicate key"));
        assert_eq!(other.to_string(), "Database error: duplicate key");
    }
}
