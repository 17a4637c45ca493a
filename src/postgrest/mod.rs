//! Database operations through the PostgREST API

mod filter;
mod query;
mod types;

use reqwest::Client;
use serde::Serialize;

pub use filter::*;
pub use query::*;
pub use types::*;

/// Client for one table or view
pub struct PostgrestClient {
    target: Target,
}

impl PostgrestClient {
    /// `token` is sent as the bearer; pass the anon key when signed out.
    pub(crate) fn new(
        base_url: &str,
        key: &str,
        token: &str,
        schema: &str,
        table: &str,
        client: Client,
    ) -> Self {
        Self {
            target: Target {
                url: format!("{}/rest/v1/{}", base_url, table),
                key: key.to_string(),
                token: token.to_string(),
                schema: schema.to_string(),
                client,
            },
        }
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(self.target.clone(), columns)
    }

    /// Insert one row or an array of rows
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(self.target.clone(), values)
    }

    /// Update rows matching the filters added to the builder
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(self.target.clone(), values)
    }

    /// Delete rows matching the filters added to the builder
    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.target.clone())
    }
}
