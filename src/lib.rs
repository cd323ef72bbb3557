//! # influxql-builder
//!
//! Programmatic construction of InfluxQL statements. Instead of concatenating
//! strings, callers configure a mutable [`Query`] and render it whenever they
//! need the text.
//!
//! ## Features
//!
//! - **Select builder**: fields, functions, tag grouping, time ranges,
//!   pagination, fill, ordering and `into` redirection
//! - **Conditions**: single comparisons, value lists, maps and raw
//!   expressions, with a relation that can be changed after the fact
//! - **Composition**: subqueries, multi-statement output and continuous
//!   queries
//! - **Administration**: database, retention policy and schema statements
//!
//! ## Modules
//!
//! - [`query`]: Query state, conditions and rendering
//! - [`admin`]: Stateless administrative statements
//! - [`config`]: Defaults and logging configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use influxql_builder::{FunctionCall, Query, Where};
//!
//! let mut ql = Query::with_database("mydb");
//! ql.add_measurement("http")
//!     .add_function(FunctionCall::new("bottom").arg("use").arg(3).alias("bot3Use"))
//!     .add_field("spdy")
//!     .add_condition(Where::eq("code", 400));
//!
//! assert_eq!(
//!     ql.to_select(),
//!     "select \"spdy\",bottom(\"use\",3) as \"bot3Use\" from \"mydb\"..\"http\" where \"code\" = 400"
//! );
//! ```

pub mod admin;
pub mod config;
pub mod query;

// Re-export top-level types for convenience
pub use query::{
    Fill, FunctionCall, MapModifier, Mode, Operator, Order, Query, QueryDocument, QueryError,
    QueryResult, Relation, TimeBound, Value, Where,
};

pub use admin::{RetentionPolicy, RetentionPolicyUpdate};

pub use config::{Config, ConfigError, LoggingConfig, QueryDefaults};
