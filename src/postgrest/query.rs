//! Query builders for PostgrestClient

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};
use crate::postgrest::filter::*;
use crate::postgrest::types::*;

/// Connection details shared by every builder
#[derive(Clone)]
pub(crate) struct Target {
    pub url: String,
    pub key: String,
    pub token: String,
    pub schema: String,
    pub client: Client,
}

impl Target {
    fn read<'a>(&'a self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        fetch
            .api_key(&self.key, &self.token)
            .header("Accept-Profile", &self.schema)
    }

    fn write<'a>(&'a self, fetch: FetchBuilder<'a>, returning: ReturnOption) -> FetchBuilder<'a> {
        fetch
            .api_key(&self.key, &self.token)
            .header("Content-Profile", &self.schema)
            .header("Prefer", returning.prefer())
    }
}

/// Ordered query parameters. PostgREST accepts a column more than once, so
/// this is a list rather than a map.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter to the query
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Replace every parameter with this key
    pub fn set_param(&mut self, key: &str, value: &str) {
        self.params.retain(|(k, _)| k != key);
        self.add_param(key, value);
    }

    pub fn filter(&mut self, column: &str, op: FilterOperator, value: &str) {
        self.add_param(column, &op.apply(value));
    }

    pub fn get_params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn has_filters(&self) -> bool {
        self.params.iter().any(|(k, _)| k != "select")
    }
}

/// Filter methods shared by select, update and delete
macro_rules! filter_methods {
    () => {
        /// Filter rows where column equals a value
        pub fn eq<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
            self.query.filter(column, FilterOperator::Eq, &value.to_string());
            self
        }

        /// Filter rows where column does not equal a value
        pub fn neq<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
            self.query.filter(column, FilterOperator::Neq, &value.to_string());
            self
        }

        /// Filter rows where column is in a list of values
        pub fn in_list<V: ToString>(&mut self, column: &str, values: &[V]) -> &mut Self {
            let values: Vec<String> = values.iter().map(|v| quote_value(&v.to_string())).collect();
            self.query
                .filter(column, FilterOperator::In, &format!("({})", values.join(",")));
            self
        }
    };
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    target: Target,
    query: QueryBuilder,
}

impl SelectBuilder {
    pub(crate) fn new(target: Target, columns: &str) -> Self {
        let mut query = QueryBuilder::new();
        query.add_param("select", columns);
        Self { target, query }
    }

    filter_methods!();

    /// Filter rows where column is greater than or equal to a value
    pub fn gte<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
        self.query.filter(column, FilterOperator::Gte, &value.to_string());
        self
    }

    /// Filter rows where column is less than or equal to a value
    pub fn lte<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
        self.query.filter(column, FilterOperator::Lte, &value.to_string());
        self
    }

    /// Filter rows where column matches a pattern (case insensitive)
    pub fn ilike(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.query.filter(column, FilterOperator::ILike, pattern);
        self
    }

    /// Filter rows where column is null
    pub fn is_null(&mut self, column: &str) -> &mut Self {
        self.query.filter(column, FilterOperator::Is, "null");
        self
    }

    /// Match any of several `column.op.value` conditions
    pub fn or(&mut self, conditions: &[(&str, FilterOperator, &str)]) -> &mut Self {
        let rendered: Vec<String> = conditions
            .iter()
            .map(|(column, op, value)| format!("{}.{}", column, op.apply(&quote_value(value))))
            .collect();
        self.query.add_param("or", &format!("({})", rendered.join(",")));
        self
    }

    /// Order the results by a column
    pub fn order(&mut self, column: &str, order: SortOrder) -> &mut Self {
        self.query
            .add_param("order", &format!("{}.{}", column, order.as_str()));
        self
    }

    /// Limit the number of rows returned
    pub fn limit(&mut self, count: u32) -> &mut Self {
        self.query.set_param("limit", &count.to_string());
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        self.query.get_params()
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        let fetch = Fetch::get(&self.target.client, &self.target.url).query(self.query.get_params());
        self.target
            .read(fetch)
            .execute::<Vec<T>>()
            .await
            .map_err(database_error)
    }

    /// Zero or one row. More than one row is an error.
    pub async fn maybe_single<T: DeserializeOwned>(&mut self) -> Result<Option<T>, Error> {
        self.limit(2);
        let mut rows = self.execute::<T>().await?;
        if rows.len() > 1 {
            return Err(Error::database("expected at most one row, got several"));
        }
        Ok(rows.pop())
    }

    /// Exactly one row
    pub async fn single<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        self.maybe_single::<T>()
            .await?
            .ok_or_else(|| Error::not_found("row"))
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    target: Target,
    values: T,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(target: Target, values: T) -> Self {
        Self { target, values }
    }

    /// Execute the insert and return the inserted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let fetch = Fetch::post(&self.target.client, &self.target.url);
        self.target
            .write(fetch, ReturnOption::Representation)
            .json(&self.values)?
            .execute::<Vec<R>>()
            .await
            .map_err(database_error)
    }

    /// Execute the insert of a single row and return it
    pub async fn execute_one<R: DeserializeOwned>(&self) -> Result<R, Error> {
        first_row(self.execute::<R>().await?)
    }

    /// Execute the insert without returning the inserted data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        let fetch = Fetch::post(&self.target.client, &self.target.url);
        self.target
            .write(fetch, ReturnOption::Minimal)
            .json(&self.values)?
            .execute_checked()
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    target: Target,
    values: T,
    query: QueryBuilder,
}

impl<T: Serialize> UpdateBuilder<T> {
    pub(crate) fn new(target: Target, values: T) -> Self {
        Self {
            target,
            values,
            query: QueryBuilder::new(),
        }
    }

    filter_methods!();

    /// Execute the update and return the updated rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        guard_unfiltered(&self.query, "update")?;
        let fetch = Fetch::patch(&self.target.client, &self.target.url).query(self.query.get_params());
        self.target
            .write(fetch, ReturnOption::Representation)
            .json(&self.values)?
            .execute::<Vec<R>>()
            .await
            .map_err(database_error)
    }

    /// Execute an update expected to touch one row, or none
    pub async fn execute_one<R: DeserializeOwned>(&self) -> Result<Option<R>, Error> {
        Ok(self.execute::<R>().await?.into_iter().next())
    }

    /// Execute the update without returning the updated data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        guard_unfiltered(&self.query, "update")?;
        let fetch = Fetch::patch(&self.target.client, &self.target.url).query(self.query.get_params());
        self.target
            .write(fetch, ReturnOption::Minimal)
            .json(&self.values)?
            .execute_checked()
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    target: Target,
    query: QueryBuilder,
}

impl DeleteBuilder {
    pub(crate) fn new(target: Target) -> Self {
        Self {
            target,
            query: QueryBuilder::new(),
        }
    }

    filter_methods!();

    /// Execute the delete without returning the deleted data
    pub async fn execute(&self) -> Result<(), Error> {
        guard_unfiltered(&self.query, "delete")?;
        let fetch = Fetch::delete(&self.target.client, &self.target.url).query(self.query.get_params());
        self.target
            .write(fetch, ReturnOption::Minimal)
            .execute_checked()
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

/// Refuse table-wide writes; every caller in this crate targets rows.
fn guard_unfiltered(query: &QueryBuilder, operation: &str) -> Result<(), Error> {
    if query.has_filters() {
        Ok(())
    } else {
        Err(Error::validation(
            "filter",
            format!("{} without a filter would touch every row", operation),
        ))
    }
}

fn first_row<R>(rows: Vec<R>) -> Result<R, Error> {
    rows.into_iter()
        .next()
        .ok_or_else(|| Error::database("no row returned"))
}

fn database_error(err: Error) -> Error {
    match err {
        Error::Api { status: 404, message } => Error::NotFound(message),
        Error::Api { message, .. } => Error::Database(message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target {
            url: "http://localhost/rest/v1/Producto".into(),
            key: "anon".into(),
            token: "anon".into(),
            schema: "public".into(),
            client: Client::new(),
        }
    }

    #[test]
    fn select_keeps_filter_order_and_repeats() {
        let mut select = SelectBuilder::new(target(), "*");
        select
            .eq("usuario_id", "u-1")
            .eq("id_producto", 7)
            .order("nombre_producto", SortOrder::Asc)
            .limit(10)
            .limit(2);

        let params = select.params();
        assert_eq!(params[0], ("select".to_string(), "*".to_string()));
        assert_eq!(params[1], ("usuario_id".to_string(), "eq.u-1".to_string()));
        assert_eq!(params[2], ("id_producto".to_string(), "eq.7".to_string()));
        assert_eq!(params[3], ("order".to_string(), "nombre_producto.asc".to_string()));
        assert_eq!(params.iter().filter(|(k, _)| k == "limit").count(), 1);
        assert_eq!(params[4], ("limit".to_string(), "2".to_string()));
    }

    #[test]
    fn or_and_in_quote_reserved_values() {
        let mut select = SelectBuilder::new(target(), "*");
        select
            .or(&[
                ("nombre_producto", FilterOperator::ILike, "*mesa, silla*"),
                ("descripcion_producto", FilterOperator::ILike, "*x*"),
            ])
            .in_list("id", &["a", "b c"]);

        let params = select.params();
        assert_eq!(
            params[1].1,
            "(nombre_producto.ilike.\"*mesa, silla*\",descripcion_producto.ilike.*x*)"
        );
        assert_eq!(params[2].1, "in.(a,\"b c\")");
    }

    #[test]
    fn unfiltered_writes_are_refused() {
        let query = QueryBuilder::new();
        assert!(guard_unfiltered(&query, "delete").is_err());

        let mut query = QueryBuilder::new();
        query.filter("id", FilterOperator::Eq, "1");
        assert!(guard_unfiltered(&query, "delete").is_ok());
    }
}
