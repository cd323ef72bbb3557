//! Query documents
//!
//! A query can be described in TOML or JSON and turned into a [`Query`].
//! This is what the `influxql render` command reads.
//!
//! ```toml
//! database = "mydb"
//! measurements = ["http"]
//! fields = ["status"]
//! groups = ["spdy", "time(5m)"]
//! start = "-3h"
//!
//! [[functions]]
//! name = "count"
//! args = ["use"]
//!
//! [[conditions]]
//! field = "code"
//! value = 400
//!
//! [[conditions]]
//! field = "spdy"
//! any = ["1", "2"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::builder::Query;
use super::condition::{MapModifier, Operator, Relation, Where};
use super::error::{QueryError, QueryResult};
use super::function::FunctionCall;
use super::time::{Fill, Order};
use super::value::Value;
use crate::config::QueryDefaults;

/// A complete query description
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryDocument {
    pub database: Option<String>,
    pub retention_policy: Option<String>,
    #[serde(flatten)]
    pub clauses: ClauseDocument,
    /// Follow-up statements built after `sub_query` / `multi_query`
    #[serde(default)]
    pub then: Vec<StageDocument>,
}

/// Clauses of one statement
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClauseDocument {
    #[serde(default)]
    pub measurements: Vec<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    /// field → alias
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub functions: Vec<FunctionDocument>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<ConditionDocument>,
    pub relation: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<u64>,
    pub slimit: Option<u64>,
    pub offset: Option<u64>,
    pub soffset: Option<u64>,
    pub fill: Option<DocumentValue>,
    pub order: Option<String>,
    pub into: Option<IntoDocument>,
    pub cq: Option<ContinuousQueryDocument>,
}

/// A statement that follows the previous one
#[derive(Debug, Clone, Deserialize)]
pub struct StageDocument {
    pub mode: StageMode,
    #[serde(flatten)]
    pub clauses: ClauseDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageMode {
    /// Select from the previous statement
    SubQuery,
    /// Emit after the previous statement
    MultiQuery,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FunctionDocument {
    Named {
        name: String,
        #[serde(default)]
        args: Vec<DocumentValue>,
        alias: Option<String>,
    },
    Call {
        call: String,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConditionDocument {
    AnyOf {
        field: String,
        any: Vec<DocumentValue>,
    },
    Single {
        field: String,
        value: DocumentValue,
        op: Option<String>,
    },
    /// Entries are applied in key order
    Map {
        all: BTreeMap<String, DocumentValue>,
        op: Option<String>,
    },
    Raw {
        raw: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntoDocument {
    pub measurement: String,
    pub database: Option<String>,
    pub retention_policy: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContinuousQueryDocument {
    pub name: String,
    pub every: Option<String>,
    #[serde(rename = "for")]
    pub for_duration: Option<String>,
}

/// Scalar as written in a document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DocumentValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<DocumentValue> for Value {
    fn from(value: DocumentValue) -> Self {
        match value {
            DocumentValue::Boolean(b) => Value::Boolean(b),
            DocumentValue::Integer(n) => Value::Integer(n),
            DocumentValue::Float(n) => Value::Float(n),
            DocumentValue::String(s) => Value::String(s),
        }
    }
}

impl DocumentValue {
    fn to_fill(&self) -> QueryResult<Fill> {
        match self {
            Self::Integer(n) => Ok(Fill::Integer(*n)),
            Self::Float(n) => Ok(Fill::Float(*n)),
            Self::String(s) => s.parse(),
            Self::Boolean(b) => Err(QueryError::InvalidFill(b.to_string())),
        }
    }
}

impl FunctionDocument {
    fn to_call(&self) -> FunctionCall {
        let (call, alias) = match self {
            Self::Named { name, args, alias } => (
                FunctionCall::new(name).args(args.iter().cloned().map(Value::from)),
                alias,
            ),
            Self::Call { call, alias } => (FunctionCall::raw(call), alias),
        };
        match alias {
            Some(alias) => call.alias(alias),
            None => call,
        }
    }
}

impl ConditionDocument {
    fn to_where(&self) -> QueryResult<Where> {
        let condition = match self {
            Self::AnyOf { field, any } => {
                Where::any_of(field.clone(), any.iter().cloned().map(Value::from))
            }
            Self::Single { field, value, op } => {
                let value = Value::from(value.clone());
                match op {
                    Some(op) => Where::FieldValueOp(field.clone(), value, op.parse::<Operator>()?),
                    None => Where::FieldValue(field.clone(), value),
                }
            }
            Self::Map { all, op } => {
                let entries: Vec<(String, Value)> = all
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                    .collect();
                match op {
                    Some(op) => Where::FieldMapOp(entries, op.parse::<MapModifier>()?),
                    None => Where::FieldMap(entries),
                }
            }
            Self::Raw { raw } => Where::raw(raw.clone()),
        };
        Ok(condition)
    }
}

impl ClauseDocument {
    /// Apply every clause to `query`
    pub fn apply(&self, query: &mut Query) -> QueryResult<()> {
        for measurement in &self.measurements {
            query.add_measurement(measurement.clone());
        }
        query
            .add_fields(self.fields.iter().cloned())
            .add_fields_as(self.aliases.clone())
            .add_groups(self.groups.iter().cloned());

        for function in &self.functions {
            query.add_function(function.to_call());
        }
        for condition in &self.conditions {
            query.add_condition(condition.to_where()?);
        }

        if let Some(relation) = &self.relation {
            query.set_relation(relation.parse::<Relation>()?);
        }
        if let Some(start) = &self.start {
            query.set_start(start.as_str());
        }
        if let Some(end) = &self.end {
            query.set_end(end.as_str());
        }
        if let Some(n) = self.limit {
            query.set_limit(n);
        }
        if let Some(n) = self.slimit {
            query.set_slimit(n);
        }
        if let Some(n) = self.offset {
            query.set_offset(n);
        }
        if let Some(n) = self.soffset {
            query.set_soffset(n);
        }
        if let Some(fill) = &self.fill {
            query.set_fill(fill.to_fill()?);
        }
        if let Some(order) = &self.order {
            query.set_order(order.parse::<Order>()?);
        }
        if let Some(into) = &self.into {
            query.set_into(into.measurement.clone());
            if let Some(db) = &into.database {
                query.set_into_database(db.clone());
            }
            if let Some(rp) = &into.retention_policy {
                query.set_into_retention_policy(rp.clone());
            }
        }
        if let Some(cq) = &self.cq {
            query.set_cq_name(cq.name.clone());
            if let Some(every) = &cq.every {
                query.set_cq_every(every.clone());
            }
            if let Some(duration) = &cq.for_duration {
                query.set_cq_for(duration.clone());
            }
        }

        Ok(())
    }
}

impl QueryDocument {
    pub fn from_toml(text: &str) -> QueryResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> QueryResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a document, choosing the format from the file extension
    pub fn load(path: &Path) -> QueryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Build the described query, falling back to `defaults` for anything
    /// the document leaves unset
    pub fn to_query(&self, defaults: &QueryDefaults) -> QueryResult<Query> {
        let mut query = Query::new();

        if let Some(db) = self.database.as_ref().or(defaults.database.as_ref()) {
            query.set_database(db.clone());
        }
        if let Some(rp) = self
            .retention_policy
            .as_ref()
            .or(defaults.retention_policy.as_ref())
        {
            query.set_retention_policy(rp.clone());
        }
        let relation = defaults.relation.parse::<Relation>()?;
        query.set_relation(relation);
        self.clauses.apply(&mut query)?;

        for stage in &self.then {
            match stage.mode {
                StageMode::SubQuery => query.sub_query(),
                StageMode::MultiQuery => query.multi_query(),
            };
            // each stage starts from the configured relation
            query.set_relation(relation);
            stage.clauses.apply(&mut query)?;
        }

        tracing::debug!(stages = self.then.len(), "Built query from document");
        Ok(query)
    }
}
