//! The query layer: a connection wrapped once in the instrumented executor,
//! plus filter/order compilation, CRUD generation and shaped queries.
//!
//! ```ignore
//! use sqlkit::{Db, FilterSpec, Row};
//!
//! let db = Db::new(client);
//! let id = db
//!     .insert("city", &Row::new().with("name", "Beijing").with("country", "CN"))
//!     .await?
//!     .into_value();
//! let changed = db
//!     .update_where("city", &Row::new().with("population", 21_540_000), &FilterSpec::new().with("name", "Beijing"))
//!     .await?
//!     .into_value();
//! ```

mod config;
mod query;
mod read;
mod write;


pub use config::DbConfig;
pub use write::Upserted;

use crate::client::{Executor, QueryOutput};
use crate::condition::{FilterSpec, compile_where};
use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};
use crate::ident::escape_identifier;
use crate::introspect::Catalog;
use crate::monitor::{InstrumentedClient, MonitorConfig, QueryMonitor};
use crate::order::{OrderSpec, compile_order};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A connection augmented with the declarative query layer.
///
/// Every statement goes through an [`InstrumentedClient`] built here, once.
pub struct Db<C> {
    client: InstrumentedClient<C>,
    identifier_quote: Option<char>,
}

impl<C: Executor> Db<C> {
    /// Wrap `client` with the default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, DbConfig::default())
    }

    pub fn with_config(client: C, config: DbConfig) -> Self {
        Self {
            client: InstrumentedClient::new(client).with_config(config.monitor),
            identifier_quote: config.identifier_quote,
        }
    }

    pub fn with_monitor_config(mut self, config: MonitorConfig) -> Self {
        *self.client.config_mut() = config;
        self
    }

    /// Set the monitor receiving query, slow and error events.
    pub fn with_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.client = self.client.with_monitor(monitor);
        self
    }

    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.client = self.client.with_monitor_arc(monitor);
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        self.client.config()
    }

    /// Adjust monitoring at runtime.
    pub fn config_mut(&mut self) -> &mut MonitorConfig {
        self.client.config_mut()
    }

    /// Change the slow-query threshold; `None` turns slow events off.
    pub fn set_slow_query_threshold(&mut self, threshold: Option<Duration>) {
        self.client.config_mut().slow_query_threshold = threshold;
    }

    /// The instrumented executor all statements run through.
    pub fn client(&self) -> &InstrumentedClient<C> {
        &self.client
    }

    /// The wrapped connection.
    pub fn inner(&self) -> &C {
        self.client.inner()
    }

    pub fn into_inner(self) -> C {
        self.client.into_inner()
    }

    pub fn dialect(&self) -> Dialect {
        self.client.dialect()
    }

    pub fn quote_char(&self) -> char {
        self.identifier_quote
            .unwrap_or_else(|| self.dialect().quote_char())
    }

    /// Quote `name` unless it is already a bare identifier.
    pub fn escape_identifier(&self, name: &str) -> String {
        escape_identifier(name, self.quote_char())
    }

    /// Render `value` as a literal using the connection's escaper.
    pub fn escape_value(&self, value: &Value) -> String {
        self.client.escape_value(value)
    }

    pub fn escape_str(&self, value: &str) -> String {
        self.escape_value(&Value::String(value.to_string()))
    }

    /// Compile a filter spec. An empty spec gives `""`.
    pub fn where_clause(&self, spec: &FilterSpec) -> String {
        compile_where(spec, self.quote_char(), |s| self.escape_str(s))
    }

    /// Compile an order spec. An empty spec gives `""`.
    pub fn order_clause(&self, spec: &OrderSpec) -> String {
        compile_order(spec, self.quote_char())
    }

    pub(crate) async fn run(&self, tag: &str, sql: &str) -> OrmResult<QueryOutput> {
        self.client.execute_tagged(tag, sql).await
    }

    /// Report `error` on the error-event channel and return it.
    pub(crate) fn fail<T>(&self, error: OrmError) -> OrmResult<T> {
        self.client.report_error(&error);
        Err(error)
    }

    pub(crate) fn catalog(&self) -> Catalog<impl Fn(&str) -> String + '_> {
        Catalog::new(self.dialect(), self.quote_char(), |s: &str| self.escape_str(s))
    }
}
