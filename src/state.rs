//! Shared application state: the signed-in user and the interface language

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::watch;

use crate::error::Result;
use crate::i18n::{translate, translate_with, Language};
use crate::models::User;
use crate::prefs::Preferences;
use crate::Marketplace;

struct Inner {
    user: watch::Sender<Option<User>>,
    language: watch::Sender<Language>,
    loading: watch::Sender<bool>,
    prefs: Preferences,
}

/// Cheap to clone; every clone sees the same state. Subscribers are told of
/// every change.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    /// State with the language restored from `prefs` and no user yet
    pub fn restore(prefs: Preferences) -> Self {
        let language = prefs.language();
        debug!("restored language {}", language);
        Self {
            inner: Arc::new(Inner {
                user: watch::channel(None).0,
                language: watch::channel(language).0,
                loading: watch::channel(true).0,
                prefs,
            }),
        }
    }

    pub fn prefs(&self) -> &Preferences {
        &self.inner.prefs
    }

    pub fn user(&self) -> Option<User> {
        self.inner.user.borrow().clone()
    }

    pub fn set_user(&self, user: Option<User>) {
        self.inner.user.send_replace(user);
    }

    pub fn subscribe_user(&self) -> watch::Receiver<Option<User>> {
        self.inner.user.subscribe()
    }

    pub fn language(&self) -> Language {
        *self.inner.language.borrow()
    }

    /// Switch language and remember it for the next start
    pub fn set_language(&self, language: Language) -> Result<()> {
        self.inner.language.send_replace(language);
        self.inner.prefs.set_language(language)
    }

    pub fn subscribe_language(&self) -> watch::Receiver<Language> {
        self.inner.language.subscribe()
    }

    /// True until the stored session has been checked
    pub fn is_loading(&self) -> bool {
        *self.inner.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.inner.loading.subscribe()
    }

    pub fn translate(&self, key: &str, fallback: Option<&str>) -> String {
        translate(self.language(), key, fallback)
    }

    pub fn translate_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        translate_with(self.language(), key, args)
    }

    /// Load the profile behind the current session. Loading ends whatever the
    /// outcome; on failure the user stays signed out.
    pub async fn restore_session(&self, market: &Marketplace) -> Result<Option<User>> {
        let result = market.accounts().current_user().await;
        match &result {
            Ok(user) => self.set_user(user.clone()),
            Err(err) => {
                warn!("could not restore the session: {}", err);
                self.set_user(None);
            }
        }
        self.inner.loading.send_replace(false);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User {
            id: "u-1".into(),
            name: name.into(),
            email: None,
            is_admin: None,
            avatar: None,
        }
    }

    #[test]
    fn language_comes_from_preferences_and_is_saved() {
        let prefs = Preferences::in_memory();
        prefs.set_language(Language::En).unwrap();

        let state = AppState::restore(prefs.clone());
        assert_eq!(state.language(), Language::En);
        assert_eq!(state.translate("cart.title", None), "Cart");

        state.set_language(Language::Es).unwrap();
        assert_eq!(prefs.language(), Language::Es);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let state = AppState::restore(Preferences::in_memory());
        let mut users = state.subscribe_user();
        assert!(state.is_loading());

        let clone = state.clone();
        clone.set_user(Some(user("Ana")));

        users.changed().await.unwrap();
        assert_eq!(users.borrow().as_ref().map(|u| u.name.clone()), Some("Ana".to_string()));
        assert_eq!(state.user().unwrap().name, "Ana");
    }
}
