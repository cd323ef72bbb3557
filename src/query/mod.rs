//! InfluxQL query construction
//!
//! A mutable [`Query`] collects the parts of a select statement and renders
//! them into InfluxQL text on demand:
//!
//! - **Builder**: query state and its mutators
//! - **Condition**: WHERE clause groups and their combination rules
//! - **Render**: clause serialization, subqueries, multi-statements and
//!   continuous queries
//! - **Document**: TOML/JSON query descriptions
//!
//! # Rendered statement
//!
//! ```text
//! select <fields,functions> [into <target>] from <measurements>
//! [where <conditions>] [group by <tags> [fill(<fill>)]]
//! [order by time desc] [limit n] [slimit n] [offset n] [soffset n]
//! ```
//!
//! # Example
//!
//! ```rust
//! use influxql_builder::query::{FunctionCall, Query, Where};
//!
//! let mut query = Query::with_database("mydb");
//! query
//!     .add_measurement("http")
//!     .add_function(FunctionCall::new("count").arg("use"))
//!     .add_condition(Where::any_of("spdy", ["1", "2"]))
//!     .add_group("time(5m)")
//!     .set_start("-3h");
//!
//! assert_eq!(
//!     query.to_select(),
//!     "select count(\"use\") from \"mydb\"..\"http\" \
//!      where (\"spdy\" = '1' or \"spdy\" = '2') and time >= now() - 3h \
//!      group by time(5m)"
//! );
//! ```

mod builder;
mod condition;
mod document;
mod error;
mod function;
pub mod quote;
mod render;
mod time;
mod value;

pub use builder::{ContinuousQuery, IntoTarget, Mode, Query};
pub use condition::{Conditions, MapModifier, Operator, Relation, Where};
pub use document::{
    ClauseDocument, ConditionDocument, ContinuousQueryDocument, DocumentValue, FunctionDocument,
    IntoDocument, QueryDocument, StageDocument, StageMode,
};
pub use error::{QueryError, QueryResult};
pub use function::FunctionCall;
pub use time::{Fill, Order, TimeBound};
pub use value::Value;
