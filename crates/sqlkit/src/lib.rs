//! # sqlkit
//!
//! A declarative query layer over a raw SQL connection.
//!
//! ## Features
//!
//! - **Filter grammar**: a field → value map compiles to one flat `AND` predicate
//!   (`">=10"`, `"(a,b)"`, `"1..5"`, `"sm?th*"`, plain equality)
//! - **Schema-driven writes**: `insert` / `update_by_key` / `upsert` read the live
//!   column metadata and only write columns the table actually has
//! - **Safe defaults**: DELETE and filtered UPDATE refuse an empty predicate
//! - **Introspection**: columns, keys, constraints, tables, indexes and server state
//! - **Result shapers**: row / scalar / column / keyed map / key-value projections
//! - **Query monitoring**: every statement timed through an instrumented executor,
//!   with query, slow and error events
//!
//! ## Example
//!
//! ```ignore
//! use sqlkit::{Db, FilterSpec, OrderSpec, Row};
//!
//! let db = Db::new(pool.get().await?);
//!
//! // SELECT id, name FROM city WHERE population >= '1000000' ORDER BY name asc
//! let cities = db
//!     .select(
//!         "city",
//!         &["id", "name"],
//!         &FilterSpec::new().with("population", ">=1000000"),
//!         &OrderSpec::new().asc("name"),
//!     )
//!     .await?
//!     .into_value();
//!
//! // INSERT or UPDATE keyed on the first primary/unique column present
//! db.upsert("city", &Row::new().with("id", 1).with("name", "Kyiv")).await?;
//!
//! // Refused: an empty filter would delete every row
//! assert!(db.delete("city", &FilterSpec::new()).await.is_err());
//! ```

pub mod client;
pub mod condition;
pub mod db;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod introspect;
pub mod monitor;
pub mod order;
pub mod row;
pub mod shape;
pub mod statement;

pub use client::{Executor, QueryOutput};
pub use condition::{FilterSpec, FilterValue, compile_where};
pub use db::{Db, DbConfig, Upserted};
pub use dialect::Dialect;
pub use error::{OrmError, OrmResult};
pub use ident::{DEFAULT_QUOTE, escape_identifier, is_bare_identifier};
pub use introspect::{ColumnMetadata, Columns, KeyRole};
pub use monitor::{
    ChannelMonitor, CompositeMonitor, DbEvent, InstrumentedClient, LoggingMonitor, MonitorConfig,
    NoopMonitor, QueryContext, QueryMonitor, QueryResult, QueryType,
};
pub use order::{OrderSpec, compile_order};
pub use row::Row;
pub use shape::{column_shape, hash_shape, hash_shape_by, key_value_shape, row_shape, scalar_shape};
pub use statement::{Executed, Limit, SqlStatement, format_params};

#[cfg(feature = "tracing")]
pub use monitor::TracingMonitor;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
