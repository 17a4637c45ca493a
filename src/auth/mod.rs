//! Authentication against the hosted auth service

mod session;
mod types;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};
use reqwest::Client;
use serde_json::json;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;

pub use session::*;
pub use types::*;

/// Client for the auth service. Holds the current session, which the
/// database and storage clients borrow their bearer token from.
pub struct Auth {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: Arc<RwLock<Option<Session>>>,

    options: ClientOptions,
}

impl Auth {
    pub(crate) fn new(url: &str, key: &str, client: Client, options: ClientOptions) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(RwLock::new(None)),
            options,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn read_session(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.session.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_session(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.session.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn store(&self, session: &Session) {
        if self.options.persist_session {
            *self.write_session() = Some(session.clone());
        }
    }

    fn require_token(&self) -> Result<String, Error> {
        self.access_token().ok_or_else(|| Error::auth("Not logged in"))
    }

    /// Sign up a new user with email and password
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, Error> {
        let url = self.get_auth_url("/signup");

        let result = Fetch::post(&self.client, &url)
            .api_key(&self.key, &self.key)
            .json(&json!({ "email": email, "password": password }))?
            .execute::<SignUpResponse>()
            .await
            .map_err(auth_error)?;

        let result = match result {
            SignUpResponse::Session(session) => {
                let session = session.stamped();
                self.store(&session);
                SignUpResponse::Session(session)
            }
            pending => {
                info!("sign-up for {} awaits email confirmation", email);
                pending
            }
        };

        Ok(result)
    }

    /// Sign in a user with email and password
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
        let url = self.get_auth_url("/token?grant_type=password");

        let session = Fetch::post(&self.client, &url)
            .api_key(&self.key, &self.key)
            .json(&json!({ "email": email, "password": password }))?
            .execute::<Session>()
            .await
            .map_err(auth_error)?
            .stamped();

        self.store(&session);
        debug!("signed in as {}", session.user.id);
        Ok(session)
    }

    /// URL that starts an OAuth redirect flow with the given provider
    pub fn oauth_sign_in_url(&self, provider: OAuthProvider, redirect_to: Option<&str>) -> String {
        let mut url = format!(
            "{}?provider={}",
            self.get_auth_url("/authorize"),
            provider.as_str()
        );
        if let Some(redirect_to) = redirect_to {
            url.push_str(&format!("&redirect_to={}", urlencoding::encode(redirect_to)));
        }
        url
    }

    /// Exchange the code from an OAuth callback for a session
    pub async fn exchange_code_for_session(&self, code: &str) -> Result<Session, Error> {
        let url = self.get_auth_url("/token?grant_type=authorization_code");

        let session = Fetch::post(&self.client, &url)
            .api_key(&self.key, &self.key)
            .json(&json!({ "code": code }))?
            .execute::<Session>()
            .await
            .map_err(auth_error)?
            .stamped();

        self.store(&session);
        Ok(session)
    }

    /// Sign out the current user. The local session is dropped even when the
    /// remote call fails.
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.get_auth_url("/logout");
        let token = self.access_token();
        *self.write_session() = None;
        let token = token.ok_or_else(|| Error::auth("Not logged in"))?;

        Fetch::post(&self.client, &url)
            .api_key(&self.key, &token)
            .execute_checked()
            .await
            .map(|_| ())
            .map_err(auth_error)
    }

    /// Send a password-reset email
    pub async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), Error> {
        let mut url = self.get_auth_url("/recover");
        if let Some(redirect_to) = redirect_to {
            url.push_str(&format!("?redirect_to={}", urlencoding::encode(redirect_to)));
        }

        Fetch::post(&self.client, &url)
            .api_key(&self.key, &self.key)
            .json(&json!({ "email": email }))?
            .execute_checked()
            .await
            .map_err(auth_error)?;

        Ok(())
    }

    /// Get the auth user behind the current session, or `None` when signed out.
    pub async fn get_user(&self) -> Result<Option<AuthUser>, Error> {
        let token = match self.access_token() {
            Some(token) => token,
            None => return Ok(None),
        };

        let user = Fetch::get(&self.client, &self.get_auth_url("/user"))
            .api_key(&self.key, &token)
            .execute::<AuthUser>()
            .await
            .map_err(auth_error)?;

        Ok(Some(user))
    }

    /// Change the password of the signed-in user
    pub async fn update_password(&self, password: &str) -> Result<AuthUser, Error> {
        let token = self.require_token()?;

        let user = Fetch::put(&self.client, &self.get_auth_url("/user"))
            .api_key(&self.key, &token)
            .json(&json!({ "password": password }))?
            .execute::<AuthUser>()
            .await
            .map_err(auth_error)?;

        Ok(user)
    }

    /// Get the current session
    pub fn session(&self) -> Option<Session> {
        self.read_session().clone()
    }

    /// Replace the current session, for example one restored from disk
    pub fn set_session(&self, session: Session) {
        *self.write_session() = Some(session.stamped());
    }

    /// Access token of a live session
    pub fn access_token(&self) -> Option<String> {
        self.read_session()
            .as_ref()
            .filter(|session| !session.is_expired())
            .map(|session| session.access_token.clone())
    }

    /// Token to send as bearer: the session token, or the anon key when signed out.
    pub(crate) fn bearer(&self) -> String {
        self.access_token().unwrap_or_else(|| self.key.clone())
    }
}

fn auth_error(err: Error) -> Error {
    match err {
        Error::Api { message, .. } => Error::Auth(message),
        other => other,
    }
}
