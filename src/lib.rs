//! Student marketplace client
//!
//! Typed access to the marketplace backend: products, categories, fairs,
//! participation, threaded comments, the cart and a simulated checkout, plus
//! the language catalog and shared application state a front end needs.

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod fetch;
pub mod i18n;
pub mod models;
pub mod postgrest;
pub mod prefs;
pub mod pricing;
pub mod services;
pub mod state;
pub mod storage;
pub mod threads;
pub mod validation;

use reqwest::Client;

use crate::auth::Auth;
use crate::config::MarketConfig;
use crate::error::Result;
use crate::postgrest::PostgrestClient;
use crate::pricing::PriceRules;
use crate::services::*;
use crate::storage::StorageClient;

/// The main entry point: one per backend project
pub struct Marketplace {
    config: MarketConfig,

    /// The base URL, without a trailing slash
    url: String,

    /// HTTP client shared by every request
    http_client: Client,

    /// Auth client holding the current session
    auth: Auth,
}

impl Marketplace {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```
    /// use feria_market::{config::MarketConfig, Marketplace};
    ///
    /// let config = MarketConfig::new("https://your-project.supabase.co", "your-anon-key").unwrap();
    /// let market = Marketplace::new(config).unwrap();
    /// let products = market.from("Producto");
    /// ```
    pub fn new(config: MarketConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        let url = config.base_url();

        let auth = Auth::new(&url, &config.anon_key, http_client.clone(), config.options.clone());

        Ok(Self {
            config,
            url,
            http_client,
            auth,
        })
    }

    /// Create a client from `MARKET_*`/`SUPABASE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(MarketConfig::from_env()?)
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn price_rules(&self) -> PriceRules {
        PriceRules::from(&self.config)
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Query builder for a table, authorized as the current session
    pub fn from(&self, table: &str) -> PostgrestClient {
        PostgrestClient::new(
            &self.url,
            &self.config.anon_key,
            &self.auth.bearer(),
            &self.config.options.db_schema,
            table,
            self.http_client.clone(),
        )
    }

    /// Object storage, authorized as the current session
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(
            &self.url,
            &self.config.anon_key,
            &self.auth.bearer(),
            self.http_client.clone(),
        )
    }

    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(self)
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(self)
    }

    pub fn products(&self) -> ProductService<'_> {
        ProductService::new(self)
    }

    pub fn categories(&self) -> CategoryService<'_> {
        CategoryService::new(self)
    }

    pub fn fairs(&self) -> FairService<'_> {
        FairService::new(self)
    }

    pub fn participations(&self) -> ParticipationService<'_> {
        ParticipationService::new(self)
    }

    pub fn comments(&self) -> CommentService<'_> {
        CommentService::new(self)
    }

    pub fn cart(&self) -> CartService<'_> {
        CartService::new(self)
    }

    pub fn photos(&self) -> PhotoService<'_> {
        PhotoService::new(self)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::checkout::{CardForm, Checkout, PaymentGateway, SimulatedGateway};
    pub use crate::config::{ClientOptions, MarketConfig};
    pub use crate::error::{Error, ErrorKind};
    pub use crate::i18n::Language;
    pub use crate::models::*;
    pub use crate::prefs::Preferences;
    pub use crate::state::AppState;
    pub use crate::threads::{CommentNode, CommentThread};
    pub use crate::Marketplace;
}
