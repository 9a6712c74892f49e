//! # dynq
//!
//! Table-agnostic, parameterized read queries for PostgreSQL.
//!
//! Callers name a table, a projection and optionally filter conditions or a
//! page, and get rows back as ordered `column -> value` records. Table and
//! column names are checked against a strict character set before they are
//! written into SQL; every value is a bound parameter.
//!
//! ## Overview
//!
//! - **Validation** ([`validate`]): pure checks on identifiers, condition
//!   structure and pagination. A failed check is [`DynqError::InvalidArgument`]
//!   and nothing is sent to the database.
//! - **Building** ([`builder`]): four statement shapes rendered into [`Sql`].
//! - **Execution** ([`GenericClient`]): any tokio-postgres client,
//!   transaction or deadpool pool.
//! - **Service** ([`DynamicQuery`]): the four operations tying these together.
//!
//! ```ignore
//! use dynq::{ConditionGroup, DynamicQuery};
//!
//! let dq = DynamicQuery::new(dynq::create_pool(&database_url)?);
//!
//! // (id = 1 AND age = 25) OR (id = 3 AND age = 35)
//! let rows = dq
//!     .query_with_conditions(
//!         "test_user",
//!         &["id", "name", "age"],
//!         &[
//!             ConditionGroup::new().eq("id", 1).eq("age", 25),
//!             ConditionGroup::new().eq("id", 3).eq("age", 35),
//!         ],
//!     )
//!     .await?;
//!
//! for row in &rows {
//!     println!("{:?}", row.get_ignore_case("name"));
//! }
//! ```

pub mod builder;
pub mod client;
pub mod condition;
pub mod error;
pub mod ident;
pub mod monitor;
pub mod row;
pub mod service;
pub mod sql;
pub mod validate;
pub mod value;

pub use client::GenericClient;
pub use condition::{ConditionGroup, ConditionValue};
pub use error::{DynqError, DynqResult};
pub use ident::{ColumnName, TableName};
pub use monitor::SqlLogger;
pub use row::{FromRow, Row};
pub use service::DynamicQuery;
pub use sql::Sql;
pub use validate::Pagination;
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{PoolConfig, Recycling, create_pool, create_pool_with_config};
