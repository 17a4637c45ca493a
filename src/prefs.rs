//! Small persistent key/value store for per-device settings

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::checkout::SavedCard;
use crate::error::Result;
use crate::i18n::Language;

/// Outcome shown once on the next visit to the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseBanner {
    pub message: String,
    pub status: PurchaseStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Stored {
    /// Kept as text so an unknown value can fall back to the default
    #[serde(default)]
    language: Option<String>,

    #[serde(default)]
    remembered_email: Option<String>,

    #[serde(default)]
    saved_card: Option<SavedCard>,

    #[serde(default)]
    last_purchase: Option<PurchaseBanner>,
}

/// Preferences backed by a JSON file, or held in memory only.
/// Clones share the same data.
#[derive(Debug, Clone)]
pub struct Preferences {
    path: Option<PathBuf>,
    data: Arc<Mutex<Stored>>,
}

impl Preferences {
    /// Open the store at `path`. A missing file is an empty store, and so is
    /// a corrupt one after a warning.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                warn!("ignoring unreadable preferences at {}: {}", path.display(), err);
                Stored::default()
            }),
            Err(err) if err.kind() == IoErrorKind::NotFound => Stored::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path: Some(path),
            data: Arc::new(Mutex::new(data)),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Arc::new(Mutex::new(Stored::default())),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Stored> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update(&self, change: impl FnOnce(&mut Stored)) -> Result<()> {
        let mut data = self.lock();
        change(&mut data);
        self.flush(&data)
    }

    fn flush(&self, data: &Stored) -> Result<()> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(data)?)?;
        fs::rename(&tmp, path)?;
        debug!("saved preferences to {}", path.display());
        Ok(())
    }

    /// Stored language; unknown values give the default
    pub fn language(&self) -> Language {
        self.lock()
            .language
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_language(&self, language: Language) -> Result<()> {
        self.update(|data| data.language = Some(language.as_str().to_string()))
    }

    pub fn remembered_email(&self) -> Option<String> {
        self.lock().remembered_email.clone()
    }

    pub fn set_remembered_email(&self, email: Option<&str>) -> Result<()> {
        self.update(|data| data.remembered_email = email.map(str::to_string))
    }

    pub fn saved_card(&self) -> Option<SavedCard> {
        self.lock().saved_card.clone()
    }

    pub fn set_saved_card(&self, card: Option<SavedCard>) -> Result<()> {
        self.update(|data| data.saved_card = card)
    }

    pub fn last_purchase(&self) -> Option<PurchaseBanner> {
        self.lock().last_purchase.clone()
    }

    pub fn set_last_purchase(&self, banner: PurchaseBanner) -> Result<()> {
        self.update(|data| data.last_purchase = Some(banner))
    }

    /// Read the banner and clear it
    pub fn take_last_purchase(&self) -> Result<Option<PurchaseBanner>> {
        let mut data = self.lock();
        let banner = data.last_purchase.take();
        if banner.is_some() {
            self.flush(&data)?;
        }
        Ok(banner)
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::in_memory()
    }
}
