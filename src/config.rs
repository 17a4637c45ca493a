//! Configuration options for the marketplace client

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Bucket that holds product photos
pub const DEFAULT_PHOTO_BUCKET: &str = "ImagenesProductos";

/// Value sent in the `X-Client-Info` header
pub const CLIENT_INFO: &str = concat!("feria-market/", env!("CARGO_PKG_VERSION"));

/// Transport options for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema, sent as `Accept-Profile`/`Content-Profile`
    pub db_schema: String,

    /// Whether the signed-in session is kept in memory between calls
    pub persist_session: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            persist_session: true,
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set whether to keep the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }
}

/// Everything needed to talk to the marketplace backend
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Project URL, without a trailing slash
    pub url: Url,

    /// Anonymous API key
    pub anon_key: String,

    /// Storage bucket for product photos
    pub photo_bucket: String,

    /// IVA applied on top of the cart subtotal
    pub tax_rate: f64,

    /// Flat shipping fee charged on non-empty carts
    pub shipping_fee: f64,

    /// Where password-reset emails send the user back to
    pub reset_redirect: Option<String>,

    /// Where OAuth providers send the user back to
    pub oauth_redirect: Option<String>,

    /// File backing the local preferences
    pub preferences_path: Option<PathBuf>,

    pub options: ClientOptions,
}

impl MarketConfig {
    /// Creates a new configuration, validating the URL and key.
    pub fn new(url: &str, anon_key: &str) -> Result<Self> {
        let url = Url::parse(url.trim_end_matches('/'))?;
        if anon_key.is_empty() {
            return Err(Error::config("anon key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
            photo_bucket: DEFAULT_PHOTO_BUCKET.to_string(),
            tax_rate: 0.15,
            shipping_fee: 3.5,
            reset_redirect: None,
            oauth_redirect: None,
            preferences_path: None,
            options: ClientOptions::default(),
        })
    }

    /// Builds a configuration from the process environment.
    ///
    /// `MARKET_URL` and `MARKET_ANON_KEY` win over the `SUPABASE_*` names.
    /// Optional: `MARKET_PHOTO_BUCKET`, `MARKET_TAX_RATE`, `MARKET_SHIPPING_FEE`,
    /// `MARKET_RESET_REDIRECT`, `MARKET_OAUTH_REDIRECT`, `MARKET_PREFERENCES`.
    pub fn from_env() -> Result<Self> {
        let url = env_any(&["MARKET_URL", "SUPABASE_URL"])
            .ok_or_else(|| Error::config("MARKET_URL or SUPABASE_URL must be set"))?;
        let key = env_any(&["MARKET_ANON_KEY", "SUPABASE_ANON_KEY"])
            .ok_or_else(|| Error::config("MARKET_ANON_KEY or SUPABASE_ANON_KEY must be set"))?;

        let mut config = Self::new(&url, &key)?;
        if let Some(bucket) = env_any(&["MARKET_PHOTO_BUCKET"]) {
            config.photo_bucket = bucket;
        }
        if let Some(rate) = env_any(&["MARKET_TAX_RATE"]) {
            config.tax_rate = parse_amount("MARKET_TAX_RATE", &rate)?;
        }
        if let Some(fee) = env_any(&["MARKET_SHIPPING_FEE"]) {
            config.shipping_fee = parse_amount("MARKET_SHIPPING_FEE", &fee)?;
        }
        config.reset_redirect = env_any(&["MARKET_RESET_REDIRECT"]);
        config.oauth_redirect = env_any(&["MARKET_OAUTH_REDIRECT"]);
        config.preferences_path = env_any(&["MARKET_PREFERENCES"]).map(PathBuf::from);
        Ok(config)
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_photo_bucket(mut self, bucket: &str) -> Self {
        self.photo_bucket = bucket.to_string();
        self
    }

    pub fn with_pricing(mut self, tax_rate: f64, shipping_fee: f64) -> Self {
        self.tax_rate = tax_rate;
        self.shipping_fee = shipping_fee;
        self
    }

    pub fn with_reset_redirect(mut self, url: &str) -> Self {
        self.reset_redirect = Some(url.to_string());
        self
    }

    pub fn with_oauth_redirect(mut self, url: &str) -> Self {
        self.oauth_redirect = Some(url.to_string());
        self
    }

    pub fn with_preferences_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.preferences_path = Some(path.into());
        self
    }

    /// Base URL as a string without the trailing slash `Url` adds.
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn parse_amount(name: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{} is not a number: {}", name, raw)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::config(format!("{} must be a non-negative number", name)));
    }
    Ok(value)
}
